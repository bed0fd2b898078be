use slotmap::SecondaryMap;
use tracing::{debug, instrument, trace};

use super::container::{Container, ContainerKind, DisplayId, TaskId, WindowingMode};
use super::error::{HierarchyError, Result};
use super::geometry::{Point, Rect};
use super::hooks::ContainerHooks;
use crate::common::collections::HashMap;
use crate::common::config::{Config, Settings};
use crate::model::selection::{Selection, TreeEvent};
use crate::model::tree::{self, NodeId, NodeMap, Tree};

/// Result of [`Hierarchy::remove_if_possible`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RemovalOutcome {
    /// The container and its subtree are gone.
    Removed,
    /// Something in the subtree asked to keep it around. The container is
    /// still attached and marked pending removal.
    Deferred,
}

/// The window container hierarchy.
///
/// Owns every display, stack, task and activity and is the only way to
/// change how they are arranged. All methods are meant to be called from a
/// single coordination context; hooks run synchronously inside them.
pub struct Hierarchy {
    pub(super) tree: Tree<Components>,
    pub(super) settings: Settings,
}

static_assertions::assert_not_impl_any!(Hierarchy: Send, Sync);
static_assertions::assert_impl_all!(NodeId: Copy, Send, Sync);

#[derive(Default)]
pub(super) struct Components {
    pub(super) containers: SecondaryMap<NodeId, Container>,
    pub(super) hooks: SecondaryMap<NodeId, Box<dyn ContainerHooks>>,
    pub(super) selection: Selection,
    pub(super) displays: HashMap<DisplayId, NodeId>,
    pub(super) tasks: HashMap<TaskId, NodeId>,
}

impl Components {
    fn dispatch_event(&mut self, map: &NodeMap, event: TreeEvent) {
        self.selection.handle_event(map, event);
    }
}

impl tree::Observer for Components {
    fn added_to_forest(&mut self, map: &NodeMap, node: NodeId) {
        self.dispatch_event(map, TreeEvent::AddedToForest(node))
    }

    fn added_to_parent(&mut self, map: &NodeMap, node: NodeId) {
        self.dispatch_event(map, TreeEvent::AddedToParent(node))
    }

    fn removing_from_parent(&mut self, map: &NodeMap, node: NodeId) {
        self.dispatch_event(map, TreeEvent::RemovingFromParent(node))
    }

    fn removed_from_forest(&mut self, map: &NodeMap, node: NodeId) {
        self.dispatch_event(map, TreeEvent::RemovedFromForest(node));
        self.hooks.remove(node);
        if let Some(container) = self.containers.remove(node) {
            match container.kind() {
                ContainerKind::Display { display_id } => {
                    self.displays.remove(display_id);
                }
                ContainerKind::Task { task_id, .. } => {
                    self.tasks.remove(task_id);
                }
                ContainerKind::Stack | ContainerKind::Activity { .. } => {}
            }
        }
    }
}

impl Default for Hierarchy {
    fn default() -> Self { Hierarchy::new(Config::default().settings) }
}

impl Hierarchy {
    pub fn new(settings: Settings) -> Self {
        Hierarchy {
            tree: Tree::with_observer(Components::default()),
            settings,
        }
    }

    pub fn settings(&self) -> &Settings { &self.settings }

    /// Structural view of the hierarchy.
    pub fn map(&self) -> &NodeMap { &self.tree.map }

    pub(super) fn insert_container(&mut self, kind: ContainerKind) -> NodeId {
        let node = self.tree.mk_node();
        self.tree.data.containers.insert(node, Container::new(kind));
        node
    }

    /// Creates a detached stack.
    pub fn create_stack(&mut self) -> NodeId {
        let node = self.insert_container(ContainerKind::Stack);
        trace!(?node, "created stack");
        node
    }

    /// Creates a detached activity record.
    pub fn create_activity(&mut self, name: impl Into<String>) -> NodeId {
        let name = name.into();
        trace!(%name, "creating activity");
        self.insert_container(ContainerKind::Activity { name })
    }

    /// Installs the callbacks for `node`, replacing any previous ones.
    pub fn set_hooks(&mut self, node: NodeId, hooks: impl ContainerHooks + 'static) -> Result<()> {
        self.ensure_live(node)?;
        self.tree.data.hooks.insert(node, Box::new(hooks));
        Ok(())
    }

    // -- Structural operations --

    /// Inserts a detached container under `parent` at `position`. Positions
    /// past the end append.
    #[instrument(skip(self))]
    pub fn attach(&mut self, node: NodeId, parent: NodeId, position: usize) -> Result<()> {
        self.ensure_live(node)?;
        if let Some(current) = node.parent(&self.tree.map) {
            return Err(HierarchyError::InvalidOperation(format!(
                "{node:?} is already attached to {current:?}; detach or reparent it instead"
            )));
        }
        self.validate_placement(node, parent)?;

        let old_display = self.display_of(node);
        node.detach(&mut self.tree).insert_at(parent, position);
        self.finish_move(node, old_display);
        debug!(?node, ?parent, position, "attached");
        Ok(())
    }

    /// Removes `node` from its parent. The subtree below it stays intact.
    /// Detaching a detached container does nothing.
    ///
    /// A container pending removal stays with its parent until it is removed
    /// or reparented.
    pub fn detach(&mut self, node: NodeId) -> Result<()> {
        self.ensure_live(node)?;
        let Some(parent) = node.parent(&self.tree.map) else {
            trace!(?node, "already detached");
            return Ok(());
        };
        if self.is_removal_pending(node) {
            return Err(HierarchyError::InvalidOperation(format!(
                "{node:?} is pending removal and cannot be detached from {parent:?}"
            )));
        }
        node.detach(&mut self.tree).make_root();
        self.refresh_geometry(node);
        debug!(?node, ?parent, "detached");
        Ok(())
    }

    /// Moves `node` under `new_parent` at `position` in one step.
    ///
    /// With `move_parents`, the last-active pointers of every ancestor on the
    /// new path are pointed at `node`. Moving to a different display notifies
    /// every container in the moved subtree once, after the move.
    #[instrument(skip(self))]
    pub fn reparent(
        &mut self,
        node: NodeId,
        new_parent: NodeId,
        position: usize,
        move_parents: bool,
        reason: &str,
    ) -> Result<()> {
        self.ensure_live(node)?;
        if !self.contains(new_parent) {
            return Err(HierarchyError::missing_target(new_parent));
        }
        let old_parent = node.parent(&self.tree.map);
        if old_parent == Some(new_parent) {
            return Err(HierarchyError::InvalidArgument(format!(
                "{node:?} is already a child of {new_parent:?}"
            )));
        }
        if self.display_of(new_parent).is_none() {
            return Err(HierarchyError::InvalidArgument(format!(
                "reparent target {new_parent:?} is not attached to a display"
            )));
        }
        self.validate_placement(node, new_parent)?;

        let old_display = self.display_of(node);
        node.detach(&mut self.tree).insert_at(new_parent, position);
        if let Some(container) = self.tree.data.containers.get_mut(node) {
            container.removal_pending = false;
        }
        if move_parents {
            self.tree.data.selection.select(&self.tree.map, node);
        }
        self.finish_move(node, old_display);
        debug!(?node, ?old_parent, ?new_parent, position, "reparented");
        Ok(())
    }

    /// Moves `node` to `position` among its current siblings.
    pub fn position_child_at(&mut self, node: NodeId, position: usize) -> Result<()> {
        self.ensure_live(node)?;
        let Some(parent) = node.parent(&self.tree.map) else {
            return Err(HierarchyError::InvalidOperation(format!(
                "{node:?} has no parent to be positioned in"
            )));
        };
        node.detach(&mut self.tree).insert_at(parent, position);
        trace!(?node, ?parent, position, "repositioned");
        Ok(())
    }

    /// Removes `node` and everything below it unless any container in the
    /// subtree defers removal, in which case `node` is only marked pending.
    #[instrument(skip(self))]
    pub fn remove_if_possible(&mut self, node: NodeId, reason: &str) -> Result<RemovalOutcome> {
        self.ensure_live(node)?;
        if self.should_defer_removal(node) {
            if let Some(container) = self.tree.data.containers.get_mut(node) {
                container.removal_pending = true;
            }
            debug!(?node, "removal deferred");
            return Ok(RemovalOutcome::Deferred);
        }
        self.remove_subtree(node);
        Ok(RemovalOutcome::Removed)
    }

    /// Removes `node` and everything below it, ignoring deferral.
    #[instrument(skip(self))]
    pub fn remove_immediately(&mut self, node: NodeId) -> Result<()> {
        self.ensure_live(node)?;
        self.remove_subtree(node);
        Ok(())
    }

    pub fn set_bounds(&mut self, node: NodeId, bounds: Rect) -> Result<()> {
        self.container_mut(node)?.requested_bounds = bounds;
        self.refresh_geometry(node);
        trace!(?node, ?bounds, "set bounds");
        Ok(())
    }

    /// Sets or clears the rectangle the surface is anchored to, without
    /// changing the container's bounds.
    pub fn set_override_displayed_bounds(
        &mut self,
        node: NodeId,
        bounds: Option<Rect>,
    ) -> Result<()> {
        let container = self.container_mut(node)?;
        container.override_displayed_bounds = bounds;
        container.update_surface_position();
        trace!(?node, ?bounds, "set override displayed bounds");
        Ok(())
    }

    pub fn set_windowing_mode(&mut self, node: NodeId, mode: WindowingMode) -> Result<()> {
        if mode == WindowingMode::Freeform && !self.settings.freeform_enabled {
            return Err(HierarchyError::InvalidOperation(
                "freeform windowing is disabled".to_string(),
            ));
        }
        self.container_mut(node)?.requested_mode = mode;
        self.refresh_geometry(node);
        trace!(?node, %mode, "set windowing mode");
        Ok(())
    }

    // -- Read accessors --

    pub fn contains(&self, node: NodeId) -> bool { self.tree.data.containers.contains_key(node) }

    pub fn container(&self, node: NodeId) -> Option<&Container> {
        self.tree.data.containers.get(node)
    }

    pub fn kind(&self, node: NodeId) -> Option<&ContainerKind> {
        self.container(node).map(Container::kind)
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> { node.parent(&self.tree.map) }

    pub fn children(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        node.children(&self.tree.map)
    }

    pub fn child_count(&self, node: NodeId) -> usize { node.child_count(&self.tree.map) }

    pub fn child_at(&self, node: NodeId, index: usize) -> Option<NodeId> {
        node.child_at(&self.tree.map, index)
    }

    /// Topmost child, i.e. the last in stacking order.
    pub fn top_child(&self, node: NodeId) -> Option<NodeId> { node.last_child(&self.tree.map) }

    pub fn index_in_parent(&self, node: NodeId) -> Option<usize> {
        node.index_in_parent(&self.tree.map)
    }

    pub fn bounds(&self, node: NodeId) -> Option<Rect> { self.container(node).map(Container::bounds) }

    pub fn requested_bounds(&self, node: NodeId) -> Option<Rect> {
        self.container(node).map(Container::requested_bounds)
    }

    pub fn override_displayed_bounds(&self, node: NodeId) -> Option<Rect> {
        self.container(node).and_then(Container::override_displayed_bounds)
    }

    pub fn last_surface_position(&self, node: NodeId) -> Option<Point> {
        self.container(node).map(Container::last_surface_position)
    }

    /// The windowing mode in effect: the closest one set on the container or
    /// an ancestor, falling back to fullscreen.
    pub fn windowing_mode(&self, node: NodeId) -> Option<WindowingMode> {
        if !self.contains(node) {
            return None;
        }
        let mode = node
            .ancestors(&self.tree.map)
            .filter_map(|n| self.container(n))
            .map(Container::requested_windowing_mode)
            .find(|mode| !mode.is_undefined())
            .unwrap_or(WindowingMode::Fullscreen);
        Some(mode)
    }

    pub fn is_removal_pending(&self, node: NodeId) -> bool {
        self.container(node).is_some_and(Container::is_removal_pending)
    }

    pub fn last_active_child(&self, node: NodeId) -> Option<NodeId> {
        self.tree.data.selection.last_active(&self.tree.map, node)
    }

    /// Follows last-active pointers down from `node` as far as they go.
    pub fn active_descendant(&self, node: NodeId) -> NodeId {
        self.tree.data.selection.current_selection(node)
    }

    /// The display `node` currently lives under, if any. A display is its
    /// own display.
    pub fn display_of(&self, node: NodeId) -> Option<NodeId> {
        node.ancestors(&self.tree.map)
            .find(|&n| self.kind(n).is_some_and(ContainerKind::is_display))
    }

    // -- Internals --

    fn ensure_live(&self, node: NodeId) -> Result<()> {
        if self.contains(node) { Ok(()) } else { Err(HierarchyError::removed(node)) }
    }

    fn container_mut(&mut self, node: NodeId) -> Result<&mut Container> {
        self.tree.data.containers.get_mut(node).ok_or_else(|| HierarchyError::removed(node))
    }

    fn validate_placement(&self, node: NodeId, parent: NodeId) -> Result<()> {
        let Some(parent_kind) = self.kind(parent) else {
            return Err(HierarchyError::missing_target(parent));
        };
        if node.is_ancestor_of(parent, &self.tree.map) {
            return Err(HierarchyError::InvalidArgument(format!(
                "cannot place {node:?} inside its own subtree"
            )));
        }
        let Some(kind) = self.kind(node) else {
            return Err(HierarchyError::removed(node));
        };
        if !parent_kind.can_contain(kind) {
            return Err(HierarchyError::InvalidArgument(format!(
                "a {} cannot contain a {}",
                parent_kind.name(),
                kind.name()
            )));
        }
        Ok(())
    }

    fn finish_move(&mut self, node: NodeId, old_display: Option<NodeId>) {
        self.refresh_geometry(node);
        let Some(new_display) = self.display_of(node) else {
            return;
        };
        if old_display != Some(new_display) {
            debug!(?node, ?old_display, ?new_display, "display changed");
            self.notify_display_changed(node, new_display);
        }
    }

    fn notify_display_changed(&mut self, top: NodeId, display: NodeId) {
        let map = &self.tree.map;
        let hooks = &mut self.tree.data.hooks;
        for node in top.traverse_preorder(map) {
            if let Some(hooks) = hooks.get_mut(node) {
                hooks.on_display_changed(map, node, display);
            }
        }
    }

    fn should_defer_removal(&self, top: NodeId) -> bool {
        top.traverse_preorder(&self.tree.map).any(|node| {
            self.tree.data.hooks.get(node).is_some_and(|hooks| hooks.should_defer_removal(node))
        })
    }

    /// Tears the subtree down leaves first, so no container is ever removed
    /// while it still has children attached.
    fn remove_subtree(&mut self, top: NodeId) {
        let doomed: Vec<_> = top.traverse_postorder(&self.tree.map).collect();
        for &node in &doomed {
            let map = &self.tree.map;
            if let Some(hooks) = self.tree.data.hooks.get_mut(node) {
                hooks.on_removed(map, node);
            }
            node.detach(&mut self.tree).remove();
        }
        debug!(?top, count = doomed.len(), "removed subtree");
    }

    /// Re-derives effective bounds and surface positions for `top` and
    /// everything below it. Parents are visited before their children.
    pub(super) fn refresh_geometry(&mut self, top: NodeId) {
        let order: Vec<_> = top.traverse_preorder(&self.tree.map).collect();
        for node in order {
            let parent_bounds = self.parent(node).and_then(|p| self.bounds(p));
            let Some(mode) = self.windowing_mode(node) else {
                continue;
            };
            if let Some(container) = self.tree.data.containers.get_mut(node) {
                container.resolve_geometry(parent_bounds, mode);
            }
        }
    }
}
