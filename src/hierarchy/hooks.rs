use crate::model::tree::{NodeId, NodeMap};

/// Callbacks a collaborator can install on a single container.
///
/// All callbacks run synchronously inside the structural operation that
/// triggers them, once the tree is consistent again.
pub trait ContainerHooks {
    /// Asked by [`remove_if_possible`](super::Hierarchy::remove_if_possible)
    /// for the container and every descendant. Any `true` keeps the whole
    /// subtree attached and marks the container as pending removal.
    fn should_defer_removal(&self, _node: NodeId) -> bool { false }

    /// The container now lives under a different display. Called after the
    /// move, with `map` already reflecting it.
    fn on_display_changed(&mut self, _map: &NodeMap, _node: NodeId, _display: NodeId) {}

    /// The container is being destroyed. Its children are already gone; the
    /// container itself is still linked to its parent.
    fn on_removed(&mut self, _map: &NodeMap, _node: NodeId) {}
}
