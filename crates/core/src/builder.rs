//! Full-subtree tree construction
//!
//! The builder walks the catalog from a chosen root, fetching children
//! one parent at a time, and only hands out a tree once every node in the
//! subtree is in memory. Construction is two-phase: every fetched record
//! is admitted as a childless node first, then a second pass links each
//! node into its parent's `children`.

use crate::category::{CategoryId, CategoryNode, CategoryRecord};
use crate::error::TreeError;
use crate::fetch::{CategoryFetcher, FetchStrategy};
use crate::session::BuildTicket;
use crate::tree::{CategoryTree, ParentMap};
use ahash::AHashMap;
use futures::stream::{self, StreamExt, TryStreamExt};
use tracing::{debug, info};

/// Builds a `CategoryTree` by walking a `CategoryFetcher`
pub struct TreeBuilder<F> {
    fetcher: F,
    strategy: FetchStrategy,
}

impl<F: CategoryFetcher> TreeBuilder<F> {
    /// Create a builder that fetches sequentially
    pub fn new(fetcher: F) -> Self {
        Self {
            fetcher,
            strategy: FetchStrategy::Sequential,
        }
    }

    /// Set the fetch strategy
    pub fn with_strategy(mut self, strategy: FetchStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Build the complete subtree below `root`
    pub async fn build(&self, root: &CategoryId) -> Result<CategoryTree, TreeError> {
        self.run(root, None).await
    }

    /// Build for a session ticket; stops with `Cancelled` once the ticket is superseded
    pub async fn build_for(&self, ticket: &BuildTicket) -> Result<CategoryTree, TreeError> {
        self.run(ticket.root(), Some(ticket)).await
    }

    async fn run(&self, root: &CategoryId, ticket: Option<&BuildTicket>) -> Result<CategoryTree, TreeError> {
        let mut admitted = Admitted::new(root.clone());

        match self.strategy {
            FetchStrategy::Sequential => self.walk_sequential(&mut admitted, ticket).await?,
            FetchStrategy::Parallel { max_in_flight } => {
                self.walk_parallel(&mut admitted, ticket, max_in_flight.get()).await?
            }
        }

        check_current(root, ticket)?;
        let tree = admitted.assemble()?;
        info!("Built category tree for root {} ({} nodes)", root, tree.len());
        Ok(tree)
    }

    /// Depth-first: a root-level node's whole subtree is fetched before its next sibling
    async fn walk_sequential(&self, admitted: &mut Admitted, ticket: Option<&BuildTicket>) -> Result<(), TreeError> {
        let root = admitted.root.clone();
        let mut stack = vec![root.clone()];

        while let Some(parent) = stack.pop() {
            check_current(&root, ticket)?;
            let records = self.fetch(&parent).await?;
            let mut ids = Vec::with_capacity(records.len());
            for record in records {
                ids.push(admitted.admit(&parent, record)?);
            }
            stack.extend(ids.into_iter().rev());
        }

        Ok(())
    }

    /// Level by level, each level fanned out with at most `max_in_flight` fetches
    async fn walk_parallel(
        &self,
        admitted: &mut Admitted,
        ticket: Option<&BuildTicket>,
        max_in_flight: usize,
    ) -> Result<(), TreeError> {
        let root = admitted.root.clone();
        let mut frontier = vec![root.clone()];

        while !frontier.is_empty() {
            check_current(&root, ticket)?;
            debug!("Fetching {} parents (max {} in flight)", frontier.len(), max_in_flight);

            // `buffered` keeps results in frontier order, so sibling order is stable
            let wave: Vec<(CategoryId, Vec<CategoryRecord>)> = stream::iter(frontier.iter().cloned())
                .map(|parent| async move {
                    let records = self.fetch(&parent).await?;
                    Ok::<_, TreeError>((parent, records))
                })
                .buffered(max_in_flight)
                .try_collect()
                .await?;

            let mut next = Vec::new();
            for (parent, records) in wave {
                for record in records {
                    next.push(admitted.admit(&parent, record)?);
                }
            }
            frontier = next;
        }

        Ok(())
    }

    async fn fetch(&self, parent: &CategoryId) -> Result<Vec<CategoryRecord>, TreeError> {
        debug!("Fetching children of {}", parent);
        self.fetcher
            .children(Some(parent))
            .await
            .map_err(|e| TreeError::fetch_failure(Some(parent), e))
    }
}

fn check_current(root: &CategoryId, ticket: Option<&BuildTicket>) -> Result<(), TreeError> {
    match ticket {
        Some(t) if !t.is_current() => Err(TreeError::Cancelled { root: root.clone() }),
        _ => Ok(()),
    }
}

/// Phase one state: records seen so far, not yet linked
struct Admitted {
    root: CategoryId,
    nodes: AHashMap<CategoryId, CategoryNode>,
    parent_map: ParentMap,
    order: Vec<CategoryId>,
}

impl Admitted {
    fn new(root: CategoryId) -> Self {
        Self {
            root,
            nodes: AHashMap::new(),
            parent_map: ParentMap::new(),
            order: Vec::new(),
        }
    }

    /// Record `record` as a child of `fetched_under`
    fn admit(&mut self, fetched_under: &CategoryId, record: CategoryRecord) -> Result<CategoryId, TreeError> {
        let id = record.id.clone();

        if id == self.root || self.nodes.contains_key(&id) {
            return Err(TreeError::DuplicateCategory {
                id,
                root: self.root.clone(),
            });
        }

        if let Some(declared) = &record.parent_id {
            if declared != fetched_under {
                return Err(TreeError::InconsistentCatalogReference {
                    id,
                    parent_id: declared.clone(),
                });
            }
        }

        let parent = if *fetched_under == self.root {
            None
        } else {
            Some(fetched_under.clone())
        };

        self.parent_map.insert(id.clone(), parent);
        self.nodes.insert(id.clone(), CategoryNode::from_record(record));
        self.order.push(id.clone());
        Ok(id)
    }

    fn assemble(self) -> Result<CategoryTree, TreeError> {
        CategoryTree::assemble(self.root, self.order, self.nodes, self.parent_map)
    }
}
