//! Selection closure behavior over built trees

use pricetree_core::{
    selected_leaf_ids, CategoryId, CategoryRecord, CategoryTree, Selection, StaticFetcher, TreeBuilder,
};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

fn id(s: &str) -> CategoryId {
    CategoryId::from(s)
}

fn names(ids: &[CategoryId]) -> Vec<&str> {
    ids.iter().map(CategoryId::as_str).collect()
}

async fn sports_tree() -> CategoryTree {
    let fetcher = StaticFetcher::new(vec![
        CategoryRecord::new("Badminton", "Badminton", Some(id("Sports Academies"))),
        CategoryRecord::new("Swimming", "Swimming", Some(id("Sports Academies"))),
        CategoryRecord::new("Hourly", "Hourly", Some(id("Swimming"))),
    ]);
    TreeBuilder::new(fetcher).build(&id("Sports Academies")).await.unwrap()
}

/// A tree of the given depth where every non-leaf has `fanout` children
async fn uniform_tree(depth: usize, fanout: usize) -> CategoryTree {
    let mut records = Vec::new();
    let mut frontier = vec!["root".to_string()];
    for _ in 0..depth {
        let mut next = Vec::new();
        for parent in &frontier {
            for i in 0..fanout {
                let child = format!("{parent}.{i}");
                records.push(CategoryRecord::new(child.as_str(), child.as_str(), Some(id(parent))));
                next.push(child);
            }
        }
        frontier = next;
    }
    TreeBuilder::new(StaticFetcher::new(records)).build(&id("root")).await.unwrap()
}

fn assert_closure_invariants(tree: &CategoryTree, sel: &Selection) {
    for selected in sel.ids() {
        if let Some(parent) = tree.parent_of(&selected) {
            assert!(sel.contains(parent), "{selected} selected without parent {parent}");
        }
        let children = tree.children_of(&selected);
        if !children.is_empty() {
            assert!(
                children.iter().any(|c| sel.contains(c)),
                "{selected} selected with no selected child"
            );
        }
    }
}

#[tokio::test]
async fn test_sports_academies_scenario() {
    let tree = sports_tree().await;
    let mut sel = Selection::new();

    sel.toggle_select(&tree, &id("Hourly")).unwrap();
    let mut selected = names(&sel.ids()).into_iter().map(String::from).collect::<Vec<_>>();
    selected.sort();
    assert_eq!(selected, vec!["Hourly", "Swimming"]);
    assert_eq!(names(&selected_leaf_ids(&tree, &sel)), vec!["Hourly"]);

    sel.toggle_select(&tree, &id("Badminton")).unwrap();
    assert_eq!(sel.len(), 3);
    assert_eq!(names(&selected_leaf_ids(&tree, &sel)), vec!["Hourly", "Badminton"]);

    sel.toggle_select(&tree, &id("Hourly")).unwrap();
    assert_eq!(names(&sel.ids()), vec!["Badminton"]);
    assert_eq!(names(&selected_leaf_ids(&tree, &sel)), vec!["Badminton"]);
}

#[tokio::test]
async fn test_select_covers_descendants_and_ancestors() {
    let tree = uniform_tree(3, 3).await;
    let mut sel = Selection::new();
    let target = id("root.1.2");

    sel.select(&tree, &target).unwrap();

    assert!(sel.contains(&target));
    for d in tree.descendants(&target) {
        assert!(sel.contains(&d));
    }
    for a in tree.ancestors(&target) {
        assert!(sel.contains(&a));
    }
    // root.1.2 subtree (1 + 3) plus its one ancestor
    assert_eq!(sel.len(), 5);
}

#[tokio::test]
async fn test_deselect_keeps_ancestor_with_other_selected_branch() {
    let tree = uniform_tree(3, 2).await;
    let mut sel = Selection::new();

    sel.select(&tree, &id("root.0.0.0")).unwrap();
    sel.select(&tree, &id("root.0.1.1")).unwrap();
    sel.deselect(&tree, &id("root.0.0.0")).unwrap();

    // root.0.0 lost its only selected child, root.0 still has root.0.1
    assert!(!sel.contains(&id("root.0.0")));
    assert!(sel.contains(&id("root.0")));
    assert!(sel.contains(&id("root.0.1")));
    assert_eq!(names(&selected_leaf_ids(&tree, &sel)), vec!["root.0.1.1"]);
}

#[tokio::test]
async fn test_root_level_toggle_touches_only_its_subtree() {
    let tree = uniform_tree(2, 2).await;
    let mut sel = Selection::new();

    sel.toggle_select(&tree, &id("root.1")).unwrap();
    assert_eq!(sel.len(), 3);
    assert!(!sel.contains(&id("root.0")));

    sel.toggle_select(&tree, &id("root.1")).unwrap();
    assert!(sel.is_empty());
}

#[tokio::test]
async fn test_select_and_deselect_are_idempotent() {
    let tree = uniform_tree(3, 2).await;
    let mut sel = Selection::new();

    sel.select(&tree, &id("root.0")).unwrap();
    sel.deselect(&tree, &id("root.0.1.0")).unwrap();
    let before = sel.clone();

    // root.0 is selected (partially): selecting it again changes nothing
    sel.select(&tree, &id("root.0")).unwrap();
    assert_eq!(sel, before);

    // root.1 is not selected: deselecting it changes nothing
    sel.deselect(&tree, &id("root.1")).unwrap();
    assert_eq!(sel, before);
}

#[tokio::test]
async fn test_random_toggle_sequences_preserve_closure() {
    let tree = uniform_tree(4, 3).await;
    let all: Vec<CategoryId> = tree.preorder().into_iter().map(|n| n.id.clone()).collect();

    for seed in 0..20u64 {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut sel = Selection::new();

        for _ in 0..rng.gen_range(1..60) {
            let target = all.choose(&mut rng).unwrap();
            let was_selected = sel.contains(target);
            sel.toggle_select(&tree, target).unwrap();

            if was_selected {
                assert!(!sel.contains(target));
                for d in tree.descendants(target) {
                    assert!(!sel.contains(&d));
                }
                for a in tree.ancestors(target) {
                    let has_child = tree.children_of(&a).iter().any(|c| sel.contains(c));
                    assert_eq!(sel.contains(&a), has_child, "ancestor {a} after deselecting {target}");
                }
            } else {
                assert!(sel.contains(target));
                for d in tree.descendants(target) {
                    assert!(sel.contains(&d));
                }
                for a in tree.ancestors(target) {
                    assert!(sel.contains(&a));
                }
            }
            assert_closure_invariants(&tree, &sel);
        }

        let leaves = selected_leaf_ids(&tree, &sel);
        for leaf in &leaves {
            assert!(tree.node(leaf).unwrap().children.is_empty());
        }

        // The leaves alone are enough to reconstruct the whole selection
        let restored = Selection::from_leaves(&tree, &leaves);
        let mut expected = sel.ids();
        let mut actual = restored.ids();
        expected.sort();
        actual.sort();
        assert_eq!(actual, expected, "seed {seed}");
    }
}

#[tokio::test]
async fn test_from_leaves_skips_unknown_and_non_leaf_ids() {
    let tree = sports_tree().await;
    let sel = Selection::from_leaves(&tree, &[id("Swimming"), id("Gone"), id("Badminton")]);
    assert_eq!(names(&sel.ids()), vec!["Badminton"]);
}
