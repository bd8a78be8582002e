//! Show a category tree with check states

use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use pricetree_cli::{render, Config};
use pricetree_core::{CatalogSession, CategoryId};

use crate::util;

pub async fn run(config: &Config, root: CategoryId, vendor: Option<&str>, expand: &[String], all: bool) -> Result<()> {
    let mut session = util::load_session(config, &root, vendor).await?;

    if all {
        expand_all(&mut session)?;
    }
    for id in expand {
        expand_to(&mut session, &CategoryId::from(id.as_str()))?;
    }
    if vendor.is_some() {
        expand_selected(&mut session)?;
    }

    let tree = session.tree()?;
    render::print_tree(tree, session.selection()?);
    println!(
        "\n{} categories, {} leaves, {} selected leaves",
        tree.len(),
        tree.leaf_ids().len(),
        session.selected_leaf_ids()?.len().cyan()
    );
    Ok(())
}

/// Expand `id` and every collapsed ancestor so it is visible
pub fn expand_to(session: &mut CatalogSession, id: &CategoryId) -> Result<()> {
    let tree = session.tree()?;
    if !tree.contains(id) {
        anyhow::bail!("Unknown category: {}", id);
    }
    let mut path: Vec<CategoryId> = tree.ancestors(id).into_iter().collect();
    path.push(id.clone());

    for step in path {
        let collapsed = session.tree()?.node(&step).is_some_and(|n| !n.expanded && !n.is_leaf());
        if collapsed {
            session
                .toggle_expand(&step)
                .with_context(|| format!("Failed to expand {step}"))?;
        }
    }
    Ok(())
}

pub fn expand_all(session: &mut CatalogSession) -> Result<()> {
    let collapsed: Vec<CategoryId> = session
        .tree()?
        .preorder()
        .into_iter()
        .filter(|n| !n.is_leaf() && !n.expanded)
        .map(|n| n.id.clone())
        .collect();
    for id in collapsed {
        session.toggle_expand(&id)?;
    }
    Ok(())
}

/// Expand the lineage of every selected leaf
pub fn expand_selected(session: &mut CatalogSession) -> Result<()> {
    for leaf in session.selected_leaf_ids()? {
        let parents: Vec<CategoryId> = session.tree()?.ancestors(&leaf).into_iter().collect();
        for parent in parents {
            expand_to(session, &parent)?;
        }
    }
    Ok(())
}
