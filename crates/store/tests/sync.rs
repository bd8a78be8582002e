//! Reconciliation of active leaves into stored vendor trees

use pricetree_core::{CategoryId, CategoryRecord, FetchStrategy, SyncRequest, TreeBuilder};
use pricetree_store::{
    NodeSource, Pricebook, PricingStatus, StoreError, SyncRejection, VendorEdit, VendorPriceNode,
};
use tempfile::TempDir;

fn id(s: &str) -> CategoryId {
    CategoryId::from(s)
}

fn rec(id: &str, name: &str, parent: Option<&str>) -> CategoryRecord {
    CategoryRecord::new(id, name, parent.map(CategoryId::from))
}

fn catalog() -> Vec<CategoryRecord> {
    vec![
        rec("sports", "Sports Academies", None),
        rec("badminton", "Badminton", Some("sports")),
        rec("swimming", "Swimming", Some("sports")),
        rec("hourly", "Hourly", Some("swimming")),
        rec("monthly", "Monthly", Some("swimming")),
        rec("music", "Music", None),
        rec("guitar", "Guitar", Some("music")),
    ]
}

fn setup() -> (TempDir, Pricebook) {
    let dir = TempDir::new().unwrap();
    let book = Pricebook::open(dir.path()).unwrap();
    book.catalog().replace_all(catalog()).unwrap();
    book.register_vendor("v1", "Vendor One").unwrap();
    (dir, book)
}

fn request(leaves: &[&str]) -> SyncRequest {
    SyncRequest::new("v1", id("sports"), leaves.iter().map(|l| id(l)).collect())
}

fn node(book: &Pricebook, category: &str) -> VendorPriceNode {
    book.node("v1", &id("sports"), &id(category)).unwrap().unwrap()
}

#[test]
fn test_sync_reconstructs_ancestors() {
    let (_dir, book) = setup();
    let report = book.sync(&request(&["hourly", "badminton"])).unwrap();
    assert_eq!(report.created, 3);

    let nodes = book.nodes("v1", &id("sports")).unwrap();
    let categories: Vec<_> = nodes.iter().map(|n| n.category_id.as_str()).collect();
    // (level, sequence): badminton and swimming are level 1, hourly level 2
    assert_eq!(categories, vec!["badminton", "swimming", "hourly"]);

    let swimming = node(&book, "swimming");
    let hourly = node(&book, "hourly");
    assert_eq!(swimming.level, 1);
    assert!(!swimming.is_leaf);
    assert_eq!(swimming.parent_vendor_price_node_id, None);
    assert_eq!(hourly.level, 2);
    assert!(hourly.is_leaf);
    assert_eq!(hourly.parent_vendor_price_node_id, Some(swimming.id));
    assert_eq!(hourly.parent_category_id, Some(id("swimming")));
    assert_eq!(hourly.source, NodeSource::MasterSync);
    assert!(hourly.is_active());
}

#[test]
fn test_repeat_sync_creates_no_duplicates() {
    let (_dir, book) = setup();
    book.sync(&request(&["hourly", "badminton"])).unwrap();
    let before = book.nodes("v1", &id("sports")).unwrap();

    let report = book.sync(&request(&["hourly", "badminton", "hourly"])).unwrap();
    assert_eq!(report.created, 0);
    assert_eq!(report.writes(), 0);
    assert_eq!(report.unchanged, 3);

    let after = book.nodes("v1", &id("sports")).unwrap();
    assert_eq!(before, after);
}

#[test]
fn test_deselected_nodes_are_deactivated_then_reactivated() {
    let (_dir, book) = setup();
    book.sync(&request(&["hourly", "badminton"])).unwrap();
    book.edit_node(
        "v1",
        &id("sports"),
        &id("hourly"),
        &VendorEdit {
            terms: Some("weekday mornings".to_string()),
            ..VendorEdit::price(250.0)
        },
    )
    .unwrap();

    let report = book.sync(&request(&["badminton"])).unwrap();
    assert_eq!(report.deactivated, 2);
    assert_eq!(report.unchanged, 1);

    let hourly = node(&book, "hourly");
    assert_eq!(hourly.pricing_status, PricingStatus::Inactive);
    assert_eq!(hourly.price, Some(250.0));
    assert_eq!(book.active_leaf_ids("v1", &id("sports")).unwrap(), vec![id("badminton")]);

    let report = book.sync(&request(&["hourly", "badminton"])).unwrap();
    assert_eq!(report.reactivated, 2);
    let hourly = node(&book, "hourly");
    assert!(hourly.is_active());
    assert_eq!(hourly.price, Some(250.0));
    assert_eq!(hourly.terms, "weekday mornings");
    assert_eq!(hourly.source, NodeSource::VendorEdit);
}

#[test]
fn test_master_sync_nodes_reset_to_defaults() {
    let (_dir, book) = setup();
    book.sync(&request(&["badminton"])).unwrap();
    let created = node(&book, "badminton");

    book.sync(&request(&["badminton"])).unwrap();
    let again = node(&book, "badminton");
    assert_eq!(created.id, again.id);
    assert_eq!(again.price, None);
    assert!(again.visible_to_user && again.visible_to_vendor);
}

#[test]
fn test_rejected_sync_leaves_store_unchanged() {
    let (_dir, book) = setup();
    book.sync(&request(&["hourly"])).unwrap();
    let before = book.nodes("v1", &id("sports")).unwrap();

    let cases = [
        (request(&["badminton", "nope"]), SyncRejection::UnknownCategory(id("nope"))),
        (request(&["badminton", "swimming"]), SyncRejection::NotALeaf(id("swimming"))),
        (
            request(&["badminton", "guitar"]),
            SyncRejection::OutsideRoot {
                category: id("guitar"),
                root: id("sports"),
            },
        ),
        (
            SyncRequest::new("stranger", id("sports"), vec![id("badminton")]),
            SyncRejection::UnknownVendor("stranger".to_string()),
        ),
        (
            SyncRequest::new("v1", id("ghost"), vec![id("badminton")]),
            SyncRejection::UnknownRoot(id("ghost")),
        ),
    ];

    for (req, expected) in cases {
        match book.sync(&req) {
            Err(StoreError::SyncRejected(rejection)) => assert_eq!(rejection, expected),
            other => panic!("expected rejection {expected:?}, got {other:?}"),
        }
    }
    assert_eq!(book.nodes("v1", &id("sports")).unwrap(), before);
}

#[test]
fn test_price_only_on_leaves() {
    let (_dir, book) = setup();
    book.sync(&request(&["hourly"])).unwrap();

    let err = book
        .edit_node("v1", &id("sports"), &id("swimming"), &VendorEdit::price(10.0))
        .unwrap_err();
    assert!(matches!(err, StoreError::PriceOnNonLeaf(c) if c == id("swimming")));

    let err = book
        .edit_node("v1", &id("sports"), &id("badminton"), &VendorEdit::price(10.0))
        .unwrap_err();
    assert!(matches!(err, StoreError::NodeNotFound { .. }));

    let edited = book
        .edit_node("v1", &id("sports"), &id("hourly"), &VendorEdit::price(99.0))
        .unwrap();
    assert_eq!(edited.price, Some(99.0));
    assert_eq!(edited.source, NodeSource::VendorEdit);
}

#[test]
fn test_price_tree_and_children_index() {
    let (_dir, book) = setup();
    book.sync(&request(&["monthly", "hourly", "badminton"])).unwrap();

    let tree = book.price_tree("v1", &id("sports")).unwrap();
    let top: Vec<_> = tree.iter().map(|t| t.node.category_id.as_str()).collect();
    assert_eq!(top, vec!["badminton", "swimming"]);
    let under_swimming: Vec<_> = tree[1].children.iter().map(|t| t.node.category_id.as_str()).collect();
    assert_eq!(under_swimming, vec!["hourly", "monthly"]);

    let swimming = node(&book, "swimming");
    let children = book.children("v1", &id("sports"), Some(swimming.id)).unwrap();
    assert_eq!(children.len(), 2);
    assert!(children.iter().all(|c| c.parent_vendor_price_node_id == Some(swimming.id)));

    assert_eq!(
        book.active_leaf_ids("v1", &id("sports")).unwrap(),
        vec![id("badminton"), id("hourly"), id("monthly")]
    );
}

#[test]
fn test_vendor_trees_are_isolated() {
    let (_dir, book) = setup();
    book.register_vendor("v10", "Vendor Ten").unwrap();
    book.sync(&request(&["badminton"])).unwrap();
    book.sync(&SyncRequest::new("v10", id("sports"), vec![id("hourly")])).unwrap();

    assert_eq!(book.nodes("v1", &id("sports")).unwrap().len(), 1);
    assert_eq!(book.nodes("v10", &id("sports")).unwrap().len(), 2);
}

#[test]
fn test_catalog_move_refreshes_structure() {
    let (_dir, book) = setup();
    book.sync(&request(&["hourly"])).unwrap();

    // Hourly moves from Swimming to directly under the root
    let mut moved = catalog();
    for record in &mut moved {
        if record.id.as_str() == "hourly" {
            record.parent_id = Some(id("sports"));
            record.name = "Hourly Pass".to_string();
        }
    }
    book.catalog().replace_all(moved).unwrap();

    let report = book.sync(&request(&["hourly"])).unwrap();
    assert_eq!(report.updated, 1);
    assert_eq!(report.deactivated, 1);

    let hourly = node(&book, "hourly");
    assert_eq!(hourly.level, 1);
    assert_eq!(hourly.name, "Hourly Pass");
    assert_eq!(hourly.parent_vendor_price_node_id, None);

    let top = book.children("v1", &id("sports"), None).unwrap();
    let names: Vec<_> = top.iter().map(|n| n.category_id.as_str()).collect();
    assert_eq!(names, vec!["swimming", "hourly"]);
}

#[test]
fn test_edited_leaf_that_gains_children_loses_its_price() {
    let (_dir, book) = setup();
    book.sync(&request(&["badminton"])).unwrap();
    book.edit_node(
        "v1",
        &id("sports"),
        &id("badminton"),
        &VendorEdit {
            terms: Some("per court".to_string()),
            ..VendorEdit::price(40.0)
        },
    )
    .unwrap();

    let mut grown = catalog();
    grown.push(rec("singles", "Singles", Some("badminton")));
    book.catalog().replace_all(grown).unwrap();

    let report = book.sync(&request(&["singles"])).unwrap();
    assert_eq!(report.created, 1);
    assert_eq!(report.updated, 1);

    let badminton = node(&book, "badminton");
    assert!(!badminton.is_leaf);
    assert_eq!(badminton.price, None);
    assert_eq!(badminton.source, NodeSource::VendorEdit);
    assert_eq!(badminton.terms, "per court");

    let singles = node(&book, "singles");
    assert!(singles.is_leaf);
    assert_eq!(singles.parent_vendor_price_node_id, Some(badminton.id));
}

#[test]
fn test_reopen_preserves_nodes() {
    let dir = TempDir::new().unwrap();
    {
        let book = Pricebook::open(dir.path()).unwrap();
        book.catalog().replace_all(catalog()).unwrap();
        book.register_vendor("v1", "Vendor One").unwrap();
        book.sync(&request(&["hourly"])).unwrap();
        book.flush().unwrap();
    }

    let book = Pricebook::open(dir.path()).unwrap();
    assert_eq!(book.active_leaf_ids("v1", &id("sports")).unwrap(), vec![id("hourly")]);
    assert_eq!(book.vendor("v1").unwrap().unwrap().name, "Vendor One");
}

#[tokio::test]
async fn test_local_tree_build_from_catalog() {
    let (_dir, book) = setup();
    let builder = TreeBuilder::new(book.catalog().clone()).with_strategy(FetchStrategy::parallel(4));
    let tree = builder.build(&id("sports")).await.unwrap();

    assert_eq!(tree.root_ids(), &[id("badminton"), id("swimming")]);
    assert_eq!(tree.len(), 4);
}
