//! Terminal rendering of category and price trees

use owo_colors::OwoColorize;
use pricetree_core::{CategoryId, CategoryTree, CheckState, Selection};
use pricetree_store::{PriceTreeNode, PricingStatus};

/// One visible row of a category tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeLine {
    pub depth: usize,
    pub id: CategoryId,
    pub name: String,
    pub state: CheckState,
    pub has_children: bool,
    pub expanded: bool,
}

/// Visible rows in pre-order; children of collapsed nodes are hidden
pub fn tree_lines(tree: &CategoryTree, selection: &Selection) -> Vec<TreeLine> {
    let mut lines = Vec::new();
    let mut stack: Vec<(&CategoryId, usize)> = tree.root_ids().iter().rev().map(|id| (id, 1)).collect();

    while let Some((id, depth)) = stack.pop() {
        let Some(node) = tree.node(id) else { continue };
        lines.push(TreeLine {
            depth,
            id: id.clone(),
            name: node.data.name.clone(),
            state: selection.check_state(tree, id),
            has_children: !node.is_leaf(),
            expanded: node.expanded,
        });
        if node.expanded {
            stack.extend(node.children.iter().rev().map(|c| (c, depth + 1)));
        }
    }
    lines
}

fn check_box(state: CheckState) -> String {
    match state {
        CheckState::Checked => "[x]".green().to_string(),
        CheckState::Partial => "[~]".yellow().to_string(),
        CheckState::Unchecked => "[ ]".dimmed().to_string(),
    }
}

pub fn print_tree(tree: &CategoryTree, selection: &Selection) {
    println!("{}", tree.root().bold());
    for line in tree_lines(tree, selection) {
        let marker = match (line.has_children, line.expanded) {
            (false, _) => " ",
            (true, true) => "▾",
            (true, false) => "▸",
        };
        println!(
            "{}{} {} {} {}",
            "  ".repeat(line.depth),
            marker,
            check_box(line.state),
            line.name,
            format!("({})", line.id).dimmed()
        );
    }
}

pub fn print_price_tree(nodes: &[PriceTreeNode]) {
    fn walk(nodes: &[PriceTreeNode], depth: usize) {
        for entry in nodes {
            let node = &entry.node;
            let price = match node.price {
                Some(p) => format!("{p:.2}").green().to_string(),
                None if node.is_leaf => "unpriced".yellow().to_string(),
                None => String::new(),
            };
            let status = match node.pricing_status {
                PricingStatus::Active => String::new(),
                PricingStatus::Inactive => "inactive".red().to_string(),
            };
            println!(
                "{}{} {} {} {}",
                "  ".repeat(depth),
                node.name,
                format!("({})", node.category_id).dimmed(),
                price,
                status
            );
            walk(&entry.children, depth + 1);
        }
    }
    walk(nodes, 1);
}
