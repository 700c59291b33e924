//! Menu hierarchy construction from a flat record set.
//!
//! Menus form a self-referential tree via an optional parent id. The builder
//! is a pure function over an already-fetched, already-filtered snapshot: it
//! never fetches, so any visibility or permission filtering must happen
//! *before* calling it. Filtering after construction would hide the children
//! of a visible node, because partitioning happens on the input set as given.

use crate::types::DbId;

/// A flat record that can participate in tree construction.
pub trait TreeItem {
    fn id(&self) -> DbId;
    fn parent_id(&self) -> Option<DbId>;
    fn sort_order(&self) -> i32;
}

/// A node in the constructed tree: the item plus its ordered children.
#[derive(Debug, Clone)]
pub struct TreeNode<T> {
    pub item: T,
    pub children: Vec<TreeNode<T>>,
}

/// Build the forest of items whose `parent_id` equals `parent`, recursing to
/// populate children of arbitrary depth.
///
/// Siblings are sorted by `sort_order` ascending; the sort is stable, so ties
/// keep their input order (callers order input by primary key). An item whose
/// parent id does not appear in the input set is unreachable from any root
/// and is silently dropped. Empty input produces an empty forest.
///
/// The caller must not hand in a cyclic parent chain; cycles are rejected at
/// write time with [`creates_cycle`].
pub fn build_tree<T: TreeItem + Clone>(items: &[T], parent: Option<DbId>) -> Vec<TreeNode<T>> {
    let mut level: Vec<&T> = items
        .iter()
        .filter(|m| m.parent_id() == parent)
        .collect();
    level.sort_by_key(|m| m.sort_order());

    level
        .into_iter()
        .map(|m| TreeNode {
            item: m.clone(),
            children: build_tree(items, Some(m.id())),
        })
        .collect()
}

/// Check whether re-parenting `node_id` under `new_parent_id` would close a
/// cycle in the parent chain.
///
/// Walks the chain upward from the proposed parent through `(id, parent_id)`
/// pairs. A visited set bounds the walk even if the existing data is already
/// cyclic. Attaching a node to itself counts as a cycle.
pub fn creates_cycle(
    links: &[(DbId, Option<DbId>)],
    node_id: DbId,
    new_parent_id: Option<DbId>,
) -> bool {
    let mut current = new_parent_id;
    let mut visited = std::collections::HashSet::new();

    while let Some(id) = current {
        if id == node_id {
            return true;
        }
        if !visited.insert(id) {
            // Pre-existing cycle above the attachment point.
            return true;
        }
        current = links
            .iter()
            .find(|(link_id, _)| *link_id == id)
            .and_then(|(_, parent)| *parent);
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Item {
        id: DbId,
        parent_id: Option<DbId>,
        sort_order: i32,
    }

    impl TreeItem for Item {
        fn id(&self) -> DbId {
            self.id
        }
        fn parent_id(&self) -> Option<DbId> {
            self.parent_id
        }
        fn sort_order(&self) -> i32 {
            self.sort_order
        }
    }

    fn item(id: DbId, parent_id: Option<DbId>, sort_order: i32) -> Item {
        Item {
            id,
            parent_id,
            sort_order,
        }
    }

    /// Pre-order flatten of a forest into item ids.
    fn flatten(nodes: &[TreeNode<Item>], out: &mut Vec<DbId>) {
        for node in nodes {
            out.push(node.item.id);
            flatten(&node.children, out);
        }
    }

    #[test]
    fn empty_input_produces_empty_forest() {
        let tree = build_tree::<Item>(&[], None);
        assert!(tree.is_empty());
    }

    #[test]
    fn flat_roots_are_sorted_by_sort_order() {
        let items = vec![item(1, None, 3), item(2, None, 1), item(3, None, 2)];
        let tree = build_tree(&items, None);

        let ids: Vec<DbId> = tree.iter().map(|n| n.item.id).collect();
        assert_eq!(ids, vec![2, 3, 1]);
        assert!(tree.iter().all(|n| n.children.is_empty()));
    }

    #[test]
    fn sort_is_stable_on_ties() {
        // Equal sort_order: input (primary key) order must be preserved.
        let items = vec![item(10, None, 1), item(11, None, 1), item(12, None, 1)];
        let tree = build_tree(&items, None);

        let ids: Vec<DbId> = tree.iter().map(|n| n.item.id).collect();
        assert_eq!(ids, vec![10, 11, 12]);
    }

    #[test]
    fn children_are_nested_under_their_parent() {
        let items = vec![
            item(1, None, 1),
            item(2, Some(1), 2),
            item(3, Some(1), 1),
            item(4, Some(3), 1),
        ];
        let tree = build_tree(&items, None);

        assert_eq!(tree.len(), 1);
        let root = &tree[0];
        assert_eq!(root.item.id, 1);

        // Children sorted by sort_order within the sibling group.
        let child_ids: Vec<DbId> = root.children.iter().map(|n| n.item.id).collect();
        assert_eq!(child_ids, vec![3, 2]);

        // Grandchild under id 3.
        assert_eq!(root.children[0].children.len(), 1);
        assert_eq!(root.children[0].children[0].item.id, 4);
    }

    #[test]
    fn preorder_flatten_contains_each_reachable_item_once() {
        let items = vec![
            item(1, None, 2),
            item(2, None, 1),
            item(3, Some(1), 1),
            item(4, Some(2), 1),
            item(5, Some(4), 1),
        ];
        let tree = build_tree(&items, None);

        let mut ids = Vec::new();
        flatten(&tree, &mut ids);
        assert_eq!(ids, vec![2, 4, 5, 1, 3]);

        let mut sorted = ids.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted.len(), items.len(), "every item appears exactly once");
    }

    #[test]
    fn item_with_absent_parent_is_dropped() {
        // Id 3 declares parent 99 which is not in the working set, so it is
        // unreachable from any root and must be omitted.
        let items = vec![item(1, None, 1), item(3, Some(99), 1)];
        let tree = build_tree(&items, None);

        let mut ids = Vec::new();
        flatten(&tree, &mut ids);
        assert_eq!(ids, vec![1]);
    }

    #[test]
    fn self_parent_is_a_cycle() {
        let links = vec![(1, None)];
        assert!(creates_cycle(&links, 1, Some(1)));
    }

    #[test]
    fn reparenting_under_own_descendant_is_a_cycle() {
        // 1 -> 2 -> 3; moving 1 under 3 would close the loop.
        let links = vec![(1, None), (2, Some(1)), (3, Some(2))];
        assert!(creates_cycle(&links, 1, Some(3)));
        assert!(creates_cycle(&links, 1, Some(2)));
    }

    #[test]
    fn reparenting_to_sibling_branch_is_not_a_cycle() {
        let links = vec![(1, None), (2, Some(1)), (3, None), (4, Some(3))];
        assert!(!creates_cycle(&links, 2, Some(4)));
        assert!(!creates_cycle(&links, 2, None));
    }

    #[test]
    fn walk_terminates_on_pre_existing_cycle() {
        // Corrupt data: 5 and 6 already point at each other. The visited set
        // must stop the walk and report a cycle.
        let links = vec![(5, Some(6)), (6, Some(5))];
        assert!(creates_cycle(&links, 7, Some(5)));
    }
}
