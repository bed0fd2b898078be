use crate::model::tree::{NodeId, NodeMap};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TreeEvent {
    AddedToForest(NodeId),
    AddedToParent(NodeId),
    RemovingFromParent(NodeId),
    RemovedFromForest(NodeId),
}

/// Tracks, for every container that has had one, which child was last made
/// active under it.
///
/// The pointers are repaired as the tree changes: when the active child leaves
/// its parent, a neighbouring sibling takes over, and a parent left without
/// children forgets its pointer.
#[derive(Default, Debug)]
pub struct Selection {
    nodes: slotmap::SecondaryMap<NodeId, NodeId>,
}

impl Selection {
    /// Follows last-active pointers down from `root` as far as they go.
    pub fn current_selection(&self, root: NodeId) -> NodeId {
        let mut node = root;
        while let Some(&child) = self.nodes.get(node) {
            node = child;
        }
        node
    }

    pub fn last_active(&self, map: &NodeMap, node: NodeId) -> Option<NodeId> {
        let result = self.nodes.get(node).copied();
        if let Some(child) = result {
            debug_assert_eq!(child.parent(map), Some(node));
        }
        result
    }

    /// Marks `node` as active all the way up to its root.
    pub fn select(&mut self, map: &NodeMap, selection: NodeId) {
        let mut node = selection;
        while let Some(parent) = node.parent(map) {
            self.nodes.insert(parent, node);
            node = parent;
        }
    }

    pub fn handle_event(&mut self, map: &NodeMap, event: TreeEvent) {
        use TreeEvent::*;
        match event {
            AddedToForest(_) | AddedToParent(_) => {}
            RemovingFromParent(node) => {
                let Some(parent) = node.parent(map) else {
                    return;
                };
                if self.nodes.get(parent) == Some(&node) {
                    match node.next_sibling(map).or(node.prev_sibling(map)) {
                        Some(new_selection) => {
                            self.nodes.insert(parent, new_selection);
                        }
                        None => {
                            self.nodes.remove(parent);
                        }
                    }
                }
            }
            RemovedFromForest(node) => {
                self.nodes.remove(node);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::tree::{Observer, Tree};

    struct Selected(Selection);

    impl Observer for Selected {
        fn added_to_forest(&mut self, map: &NodeMap, node: NodeId) {
            self.0.handle_event(map, TreeEvent::AddedToForest(node))
        }

        fn added_to_parent(&mut self, map: &NodeMap, node: NodeId) {
            self.0.handle_event(map, TreeEvent::AddedToParent(node))
        }

        fn removing_from_parent(&mut self, map: &NodeMap, node: NodeId) {
            self.0.handle_event(map, TreeEvent::RemovingFromParent(node))
        }

        fn removed_from_forest(&mut self, map: &NodeMap, node: NodeId) {
            self.0.handle_event(map, TreeEvent::RemovedFromForest(node))
        }
    }

    fn child(tree: &mut Tree<Selected>, parent: NodeId) -> NodeId {
        tree.mk_node().detach(tree).insert_at(parent, usize::MAX)
    }

    #[test]
    fn select_marks_whole_path() {
        let mut tree = Tree::with_observer(Selected(Selection::default()));
        let root = tree.mk_node();
        let a = child(&mut tree, root);
        let b = child(&mut tree, root);
        let b1 = child(&mut tree, b);

        assert_eq!(root, tree.data.0.current_selection(root));
        tree.data.0.select(&tree.map, b1);
        assert_eq!(Some(b), tree.data.0.last_active(&tree.map, root));
        assert_eq!(Some(b1), tree.data.0.last_active(&tree.map, b));
        assert_eq!(b1, tree.data.0.current_selection(root));

        tree.data.0.select(&tree.map, a);
        assert_eq!(Some(a), tree.data.0.last_active(&tree.map, root));
        assert_eq!(Some(b1), tree.data.0.last_active(&tree.map, b));
        assert_eq!(a, tree.data.0.current_selection(root));
    }

    #[test]
    fn removing_active_child_moves_selection_to_sibling() {
        let mut tree = Tree::with_observer(Selected(Selection::default()));
        let root = tree.mk_node();
        let a = child(&mut tree, root);
        let b = child(&mut tree, root);
        let c = child(&mut tree, root);

        tree.data.0.select(&tree.map, b);
        b.detach(&mut tree).remove();
        assert_eq!(Some(c), tree.data.0.last_active(&tree.map, root));

        c.detach(&mut tree).make_root();
        assert_eq!(Some(a), tree.data.0.last_active(&tree.map, root));

        a.detach(&mut tree).remove();
        assert_eq!(None, tree.data.0.last_active(&tree.map, root));
    }

    #[test]
    fn removed_parent_forgets_selection() {
        let mut tree = Tree::with_observer(Selected(Selection::default()));
        let root = tree.mk_node();
        let a = child(&mut tree, root);
        let a1 = child(&mut tree, a);
        tree.data.0.select(&tree.map, a1);

        a.detach(&mut tree).remove();
        assert_eq!(None, tree.data.0.last_active(&tree.map, root));
        assert!(tree.data.0.nodes.get(a).is_none());
    }
}
