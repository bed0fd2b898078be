use std::iter;

use slotmap::SlotMap;

/// N-ary tree.
///
/// The tree only knows about structure. Anything attached to a node lives in
/// the observer `O`, which is told about every structural change so it can
/// keep its per-node data in sync.
pub struct Tree<O> {
    pub map: NodeMap,
    pub data: O,
}

impl Tree<()> {
    pub fn new() -> Self { Self::with_observer(()) }
}

impl Default for Tree<()> {
    fn default() -> Self { Self::new() }
}

impl<O: Observer> Tree<O> {
    pub fn with_observer(data: O) -> Self { Tree { map: NodeMap::new(), data } }

    /// Creates a new node with no parent.
    pub fn mk_node(&mut self) -> NodeId {
        let id = self.map.map.insert(Node::default());
        self.data.added_to_forest(&self.map, id);
        id
    }
}

/// Map that holds the structure of the tree.
///
/// Multiple trees can be contained within a map. This is what lets a branch
/// move from one display's tree to another without copying.
pub struct NodeMap {
    map: SlotMap<NodeId, Node>,
}

impl NodeMap {
    fn new() -> NodeMap { NodeMap { map: SlotMap::default() } }

    pub fn len(&self) -> usize { self.map.len() }

    pub fn is_empty(&self) -> bool { self.map.is_empty() }

    pub fn contains(&self, id: NodeId) -> bool { self.map.contains_key(id) }

    /// Links the unlinked node `id` under `parent`, in front of `next` or at
    /// the back when `next` is `None`.
    fn link(&mut self, id: NodeId, parent: NodeId, next: Option<NodeId>) {
        if id == parent || !self.contains(id) || !self.contains(parent) {
            return;
        }
        debug_assert!(next.is_none_or(|next| self.map[next].parent == Some(parent)));
        let prev = match next {
            Some(next) => self.map[next].prev_sibling,
            None => self.map[parent].last_child,
        };

        let node = &mut self.map[id];
        node.parent = Some(parent);
        node.prev_sibling = prev;
        node.next_sibling = next;

        match prev {
            Some(prev) => self.map[prev].next_sibling = Some(id),
            None => self.map[parent].first_child = Some(id),
        }
        match next {
            Some(next) => self.map[next].prev_sibling = Some(id),
            None => self.map[parent].last_child = Some(id),
        }
    }

    /// Takes `id` out of its parent's child list. Its own children stay.
    fn unlink(&mut self, id: NodeId) {
        let Some(node) = self.map.get_mut(id) else {
            return;
        };
        let parent = node.parent.take();
        let prev = node.prev_sibling.take();
        let next = node.next_sibling.take();

        if let Some(prev) = prev.and_then(|prev| self.map.get_mut(prev)) {
            prev.next_sibling = next;
        }
        if let Some(next) = next.and_then(|next| self.map.get_mut(next)) {
            next.prev_sibling = prev;
        }
        if let Some(parent) = parent.and_then(|parent| self.map.get_mut(parent)) {
            if parent.first_child == Some(id) {
                parent.first_child = next;
            }
            if parent.last_child == Some(id) {
                parent.last_child = prev;
            }
        }
    }
}

slotmap::new_key_type! {
    /// Represents a node somewhere in the tree.
    ///
    /// Ids are never reused, so an id of a removed node stays invalid.
    pub struct NodeId;
}

impl NodeId {
    #[track_caller]
    pub fn detach<'a, O: Observer>(self, tree: &'a mut Tree<O>) -> DetachedNode<'a, O> {
        DetachedNode { id: self, tree }
    }

    pub fn parent(self, map: &NodeMap) -> Option<NodeId> {
        map.map.get(self).and_then(|n| n.parent)
    }

    pub fn children(self, map: &NodeMap) -> impl Iterator<Item = NodeId> + '_ {
        iter::successors(self.first_child(map), move |child| child.next_sibling(map))
    }

    pub fn child_count(self, map: &NodeMap) -> usize { self.children(map).count() }

    pub fn child_at(self, map: &NodeMap, index: usize) -> Option<NodeId> {
        self.children(map).nth(index)
    }

    /// Position of this node among its siblings.
    pub fn index_in_parent(self, map: &NodeMap) -> Option<usize> {
        let parent = self.parent(map)?;
        parent.children(map).position(|child| child == self)
    }

    /// Children before parents, siblings in order. Empty for a missing node.
    pub fn traverse_postorder(self, map: &NodeMap) -> impl Iterator<Item = NodeId> + '_ {
        let top = self;
        let start = map.contains(top).then(|| top.leftmost_leaf(map));
        iter::successors(start, move |&node| {
            if node == top {
                return None;
            }
            match node.next_sibling(map) {
                Some(next) => Some(next.leftmost_leaf(map)),
                None => node.parent(map),
            }
        })
    }

    /// Parents before children, siblings in order. Empty for a missing node.
    pub fn traverse_preorder(self, map: &NodeMap) -> impl Iterator<Item = NodeId> + '_ {
        let top = self;
        let start = map.contains(top).then_some(top);
        iter::successors(start, move |&node| {
            node.first_child(map).or_else(|| {
                node.ancestors(map)
                    .take_while(|&ancestor| ancestor != top)
                    .find_map(|ancestor| ancestor.next_sibling(map))
            })
        })
    }

    /// Returns an iterator over all ancestors of the current node, including itself.
    pub fn ancestors(self, map: &NodeMap) -> impl Iterator<Item = NodeId> + '_ {
        let start = map.contains(self).then_some(self);
        iter::successors(start, move |node| node.parent(map))
    }

    pub fn is_ancestor_of(self, other: NodeId, map: &NodeMap) -> bool {
        other.ancestors(map).any(|ancestor| ancestor == self)
    }

    pub fn next_sibling(self, map: &NodeMap) -> Option<NodeId> {
        map.map.get(self).and_then(|n| n.next_sibling)
    }

    pub fn prev_sibling(self, map: &NodeMap) -> Option<NodeId> {
        map.map.get(self).and_then(|n| n.prev_sibling)
    }

    pub fn first_child(self, map: &NodeMap) -> Option<NodeId> {
        map.map.get(self).and_then(|n| n.first_child)
    }

    pub fn last_child(self, map: &NodeMap) -> Option<NodeId> {
        map.map.get(self).and_then(|n| n.last_child)
    }

    pub fn is_empty(self, map: &NodeMap) -> bool { self.first_child(map).is_none() }

    fn leftmost_leaf(self, map: &NodeMap) -> NodeId {
        iter::successors(Some(self), |node| node.first_child(map)).last().unwrap_or(self)
    }
}

pub trait Observer
where Self: Sized {
    fn added_to_forest(&mut self, map: &NodeMap, node: NodeId);
    fn added_to_parent(&mut self, map: &NodeMap, node: NodeId);
    fn removing_from_parent(&mut self, map: &NodeMap, node: NodeId);
    fn removed_from_forest(&mut self, map: &NodeMap, node: NodeId);
}

impl Observer for () {
    fn added_to_forest(&mut self, _forest: &NodeMap, _node: NodeId) {}

    fn added_to_parent(&mut self, _forest: &NodeMap, _node: NodeId) {}

    fn removing_from_parent(&mut self, _forest: &NodeMap, _node: NodeId) {}

    fn removed_from_forest(&mut self, _forest: &NodeMap, _node: NodeId) {}
}

/// A node that is about to be moved or removed.
///
/// Nothing happens to the node until one of the consuming methods is called.
#[must_use = "Detached nodes should be reattached to the tree, made a root, or removed"]
pub struct DetachedNode<'a, O> {
    id: NodeId,
    tree: &'a mut Tree<O>,
}

impl<'a, O: Observer> DetachedNode<'a, O> {
    /// Inserts the node so that it ends up at `position` among `parent`'s
    /// children. Positions past the end append.
    #[track_caller]
    pub(crate) fn insert_at(self, parent: NodeId, position: usize) -> NodeId {
        let DetachedNode { id, tree } = self;
        debug_assert!(
            !id.is_ancestor_of(parent, &tree.map),
            "attaching {id:?} under its own subtree"
        );
        let old_parent = id.parent(&tree.map);
        let parent_changed = old_parent != Some(parent);
        if old_parent.is_some() && parent_changed {
            tree.data.removing_from_parent(&tree.map, id);
        }
        tree.map.unlink(id);
        let next = parent.child_at(&tree.map, position);
        tree.map.link(id, parent, next);
        if parent_changed {
            tree.data.added_to_parent(&tree.map, id);
        }
        id
    }

    /// Unlinks the node from its parent, leaving it (and its subtree) as a root.
    pub(crate) fn make_root(mut self) -> NodeId { self.unlink_from_parent() }

    /// Unlinks the node and deletes it together with everything below it.
    /// Observers hear about the node before its descendants.
    pub(crate) fn remove(mut self) {
        let id = self.unlink_from_parent();
        let doomed: Vec<_> = id.traverse_preorder(&self.tree.map).collect();
        for node in doomed {
            self.tree.map.map.remove(node);
            self.tree.data.removed_from_forest(&self.tree.map, node);
        }
    }

    fn unlink_from_parent(&mut self) -> NodeId {
        if self.id.parent(&self.tree.map).is_some() {
            self.tree.data.removing_from_parent(&self.tree.map, self.id);
            self.tree.map.unlink(self.id);
        }
        self.id
    }
}

#[derive(Default, PartialEq, Debug)]
struct Node {
    parent: Option<NodeId>,
    prev_sibling: Option<NodeId>,
    next_sibling: Option<NodeId>,
    first_child: Option<NodeId>,
    last_child: Option<NodeId>,
}
