//! Tree assembly.
//!
//! Links flat, access-filtered entries into root-level entries with nested
//! children. Index-based: an id-to-entry map plus an id-to-children map are
//! built in one pass, then the tree is materialized by lookup, so no shared
//! mutable aliasing is involved.

use std::collections::HashMap;

use crate::entry::MenuEntry;

/// Assemble filtered flat entries into an ordered tree.
///
/// - Duplicate ids keep the first occurrence; later ones are discarded.
/// - Entries whose parent id is missing from the input (denied or never
///   declared) are dropped silently, along with anything beneath them.
/// - Every sibling list, the root list included, is ordered by ascending
///   weight. The relative order of equal weights is unspecified.
pub fn assemble(entries: Vec<MenuEntry>) -> Vec<MenuEntry> {
    let mut order: Vec<String> = Vec::with_capacity(entries.len());
    let mut by_id: HashMap<String, MenuEntry> = HashMap::with_capacity(entries.len());
    for entry in entries {
        if by_id.contains_key(&entry.id) {
            // First occurrence wins.
            continue;
        }
        order.push(entry.id.clone());
        by_id.insert(entry.id.clone(), entry);
    }

    let mut children: HashMap<String, Vec<String>> = HashMap::new();
    let mut roots: Vec<String> = Vec::new();
    for id in &order {
        match by_id[id].parent.clone() {
            None => roots.push(id.clone()),
            Some(parent) if by_id.contains_key(&parent) => {
                children.entry(parent).or_default().push(id.clone());
            }
            // Orphan: parent was filtered out or never existed.
            Some(_) => {}
        }
    }

    // Parent links form a forest rooted at the root list; parent cycles are
    // reachable from no root and fall out. Walk breadth-first so parents
    // precede children, then attach bottom-up in reverse. Iterative, so a
    // pathologically deep parent chain cannot overflow the stack.
    let mut visit: Vec<String> = roots;
    let mut i = 0;
    while i < visit.len() {
        if let Some(kids) = children.get(&visit[i]) {
            visit.extend(kids.iter().cloned());
        }
        i += 1;
    }

    let mut built: HashMap<String, Vec<MenuEntry>> = HashMap::new();
    let mut out: Vec<MenuEntry> = Vec::new();
    for id in visit.iter().rev() {
        let mut entry = by_id[id].clone();
        let mut kids = built.remove(id).unwrap_or_default();
        kids.sort_by_key(|e| e.weight);
        entry.children = kids;
        match entry.parent.clone() {
            Some(parent) => built.entry(parent).or_default().push(entry),
            None => out.push(entry),
        }
    }
    out.sort_by_key(|e| e.weight);
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn entry(id: &str) -> MenuEntry {
        MenuEntry::new(id, id)
    }

    #[test]
    fn roots_and_children_link_by_id() {
        let tree = assemble(vec![
            entry("reports"),
            entry("reports-index").with_parent("reports"),
            entry("reports-export").with_parent("reports"),
            entry("tools"),
        ]);

        assert_eq!(tree.len(), 2);
        let reports = tree.iter().find(|e| e.id == "reports").unwrap();
        assert_eq!(reports.children.len(), 2);
        let tools = tree.iter().find(|e| e.id == "tools").unwrap();
        assert!(tools.children.is_empty());
    }

    #[test]
    fn weights_order_siblings_ascending() {
        let tree = assemble(vec![
            entry("five").with_weight(5),
            entry("one").with_weight(1),
            entry("three").with_weight(3),
        ]);
        let ids: Vec<&str> = tree.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["one", "three", "five"]);
    }

    #[test]
    fn nested_sibling_lists_are_ordered_too() {
        let tree = assemble(vec![
            entry("root"),
            entry("b").with_parent("root").with_weight(2),
            entry("a").with_parent("root").with_weight(1),
        ]);
        let ids: Vec<&str> = tree[0].children.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn equal_weights_both_survive() {
        let tree = assemble(vec![
            entry("left").with_weight(2),
            entry("right").with_weight(2),
        ]);
        // Relative order is unspecified for ties; assert membership only.
        assert_eq!(tree.len(), 2);
        assert!(tree.iter().any(|e| e.id == "left"));
        assert!(tree.iter().any(|e| e.id == "right"));
    }

    #[test]
    fn orphans_are_dropped_not_promoted() {
        let tree = assemble(vec![
            entry("visible"),
            entry("stray").with_parent("denied-parent"),
            entry("stray-child").with_parent("stray"),
        ]);
        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0].id, "visible");
    }

    #[test]
    fn duplicate_ids_first_occurrence_wins() {
        let first = MenuEntry::new("dup", "First");
        let second = MenuEntry::new("dup", "Second");
        let tree = assemble(vec![first, second]);
        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0].title, "First");
    }

    #[test]
    fn self_parented_entry_is_unreachable() {
        let tree = assemble(vec![entry("loop").with_parent("loop"), entry("root")]);
        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0].id, "root");
    }

    #[test]
    fn parent_cycle_is_dropped() {
        let tree = assemble(vec![
            entry("a").with_parent("b"),
            entry("b").with_parent("a"),
            entry("root"),
        ]);
        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0].id, "root");
    }

    #[test]
    fn empty_input_yields_empty_tree() {
        assert!(assemble(Vec::new()).is_empty());
    }

    #[test]
    fn very_deep_parent_chains_assemble() {
        const DEPTH: usize = 50_000;
        let mut entries = vec![entry("n0")];
        for i in 1..DEPTH {
            entries.push(entry(&format!("n{i}")).with_parent(format!("n{}", i - 1)));
        }

        let tree = assemble(entries);
        assert_eq!(tree.len(), 1);

        let mut depth = 1;
        let mut node = &tree[0];
        while let Some(child) = node.children.first() {
            depth += 1;
            node = child;
        }
        assert_eq!(depth, DEPTH);

        // Dismantle iteratively; dropping this many nested levels in one go
        // would recurse through the drop glue.
        let mut stack = tree;
        while let Some(mut node) = stack.pop() {
            stack.append(&mut node.children);
        }
    }
}
