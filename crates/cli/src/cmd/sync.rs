//! Edit a vendor's selection and post its active leaves

use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use pricetree_cli::{render, ClientError, Config};
use pricetree_core::{CatalogSession, CategoryId};

use super::tree;
use crate::util;

/// Selection changes applied in order: select, deselect, toggle
#[derive(Debug, Default)]
pub struct SelectionEdits {
    pub select: Vec<String>,
    pub deselect: Vec<String>,
    pub toggle: Vec<String>,
    /// Start from an empty selection
    pub clear: bool,
}

pub async fn run(config: &Config, vendor: &str, root: CategoryId, edits: SelectionEdits, dry_run: bool) -> Result<()> {
    let stored = (!edits.clear).then_some(vendor);
    let mut session = util::load_session(config, &root, stored).await?;

    apply_edits(&mut session, &edits)?;
    let request = session.sync_request(vendor)?;

    tree::expand_selected(&mut session)?;
    render::print_tree(session.tree()?, session.selection()?);

    let leaves: Vec<&str> = request.active_leaf_category_ids.iter().map(CategoryId::as_str).collect();
    println!("\n{} {}", "Active leaves:".bold(), leaves.join(", "));

    if dry_run {
        println!("{}", "Dry run: nothing was synced".yellow());
        return Ok(());
    }

    let report = match util::api_client(config)?.sync(&request).await {
        Ok(report) => report,
        Err(err) => {
            let context = failure_context(vendor, &err);
            return Err(anyhow::Error::new(err).context(context));
        }
    };

    println!(
        "{} Synced: {} created, {} updated, {} reactivated, {} deactivated, {} unchanged",
        "✓".green(),
        report.created,
        report.updated,
        report.reactivated,
        report.deactivated,
        report.unchanged
    );
    Ok(())
}

/// A rejected sync never wrote anything; a lost response may have
fn failure_context(vendor: &str, err: &ClientError) -> String {
    match err {
        ClientError::Rejected { .. } => format!("Sync rejected for vendor {vendor}; the stored tree was not changed"),
        _ => format!("Sync failed for vendor {vendor}; run 'ptree nodes' to check whether it was applied"),
    }
}

pub fn apply_edits(session: &mut CatalogSession, edits: &SelectionEdits) -> Result<()> {
    for id in &edits.select {
        session
            .select(&CategoryId::from(id.as_str()))
            .with_context(|| format!("Cannot select {id}"))?;
    }
    for id in &edits.deselect {
        session
            .deselect(&CategoryId::from(id.as_str()))
            .with_context(|| format!("Cannot deselect {id}"))?;
    }
    for id in &edits.toggle {
        session
            .toggle_select(&CategoryId::from(id.as_str()))
            .with_context(|| format!("Cannot toggle {id}"))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pricetree_core::{CategoryRecord, StaticFetcher, TreeBuilder};

    async fn sports_session(leaves: &[CategoryId]) -> CatalogSession {
        let fetcher = StaticFetcher::new(vec![
            CategoryRecord::new("badminton", "Badminton", Some("sports".into())),
            CategoryRecord::new("swimming", "Swimming", Some("sports".into())),
            CategoryRecord::new("hourly", "Hourly", Some("swimming".into())),
        ]);
        let builder = TreeBuilder::new(fetcher);
        let mut session = CatalogSession::new();
        let ticket = session.begin_build("sports".into());
        let tree = builder.build_for(&ticket).await.unwrap();
        session.install_with_leaves(&ticket, tree, leaves).unwrap();
        session
    }

    #[tokio::test]
    async fn test_edits_apply_on_top_of_stored_leaves() {
        let mut session = sports_session(&["hourly".into()]).await;
        let edits = SelectionEdits {
            select: vec!["badminton".to_string()],
            deselect: vec!["hourly".to_string()],
            ..SelectionEdits::default()
        };
        apply_edits(&mut session, &edits).unwrap();

        let request = session.sync_request("v1").unwrap();
        assert_eq!(request.active_leaf_category_ids, vec![CategoryId::from("badminton")]);
        assert!(!session.selection().unwrap().contains(&"swimming".into()));
    }

    #[test]
    fn test_failure_context_only_promises_no_change_on_rejection() {
        let rejected = ClientError::Rejected {
            status: 422,
            code: "SYNC_REJECTED".to_string(),
            message: "unknown vendor".to_string(),
        };
        assert!(failure_context("v1", &rejected).contains("was not changed"));

        let lost = ClientError::InvalidBaseUrl("nowhere".to_string());
        let context = failure_context("v1", &lost);
        assert!(!context.contains("was not changed"));
        assert!(context.contains("ptree nodes"));
    }

    #[tokio::test]
    async fn test_unknown_id_is_an_error() {
        let mut session = sports_session(&[]).await;
        let edits = SelectionEdits {
            toggle: vec!["tennis".to_string()],
            ..SelectionEdits::default()
        };
        assert!(apply_edits(&mut session, &edits).is_err());
    }
}
