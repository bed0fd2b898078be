use tracing::debug;

use super::container::{ContainerKind, DisplayId};
use super::engine::Hierarchy;
use super::error::{HierarchyError, Result};
use super::geometry::Rect;
use crate::model::tree::NodeId;

impl Hierarchy {
    /// Creates the root container for a display. New displays get the
    /// configured default windowing mode.
    pub fn create_display(&mut self, display_id: DisplayId, bounds: Rect) -> Result<NodeId> {
        if self.tree.data.displays.contains_key(&display_id) {
            return Err(HierarchyError::InvalidArgument(format!(
                "{display_id} already exists"
            )));
        }
        let node = self.insert_container(ContainerKind::Display { display_id });
        let mode = self.settings.default_windowing_mode;
        if let Some(container) = self.tree.data.containers.get_mut(node) {
            container.requested_mode = mode;
            container.requested_bounds = bounds;
        }
        self.tree.data.displays.insert(display_id, node);
        self.refresh_geometry(node);
        debug!(%display_id, ?node, ?bounds, %mode, "created display");
        Ok(node)
    }

    /// Creates a display sized from the configured default dimensions.
    pub fn create_default_display(&mut self, display_id: DisplayId) -> Result<NodeId> {
        let bounds = self.settings.default_display_bounds();
        self.create_display(display_id, bounds)
    }

    pub fn display(&self, display_id: DisplayId) -> Option<NodeId> {
        self.tree.data.displays.get(&display_id).copied()
    }

    /// All displays, ordered by id.
    pub fn displays(&self) -> Vec<(DisplayId, NodeId)> {
        let mut displays: Vec<_> =
            self.tree.data.displays.iter().map(|(&id, &node)| (id, node)).collect();
        displays.sort_unstable_by_key(|&(id, _)| id);
        displays
    }

    /// Stacks on `display`, bottom to top.
    pub fn stacks(&self, display: NodeId) -> Vec<NodeId> {
        if !self.kind(display).is_some_and(ContainerKind::is_display) {
            return Vec::new();
        }
        self.children(display).collect()
    }

    pub fn stack_count(&self, display: NodeId) -> usize { self.stacks(display).len() }

    /// Id of the display `node` lives on.
    pub fn display_id_of(&self, node: NodeId) -> Option<DisplayId> {
        match self.kind(self.display_of(node)?)? {
            ContainerKind::Display { display_id } => Some(*display_id),
            _ => None,
        }
    }

    /// Every task on `display`, in stack order.
    pub fn tasks_on_display(&self, display: NodeId) -> Vec<NodeId> {
        self.stacks(display)
            .into_iter()
            .flat_map(|stack| self.children(stack))
            .filter(|&node| self.kind(node).is_some_and(ContainerKind::is_task))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use test_log::test;

    use super::*;
    use crate::common::config::Settings;
    use crate::hierarchy::{TaskId, UserId, WindowingMode};

    #[test]
    fn display_lifecycle() {
        let mut h = Hierarchy::default();
        let d1 = h.create_default_display(DisplayId(1)).unwrap();
        let d0 = h.create_display(DisplayId(0), Rect::from_size(800, 600)).unwrap();

        assert_eq!(vec![(DisplayId(0), d0), (DisplayId(1), d1)], h.displays());
        assert_eq!(Some(d1), h.display(DisplayId(1)));
        assert_eq!(Some(Rect::from_size(1920, 1080)), h.bounds(d1));
        assert_eq!(Some(Rect::from_size(800, 600)), h.bounds(d0));
        assert_eq!(Some(WindowingMode::Fullscreen), h.windowing_mode(d0));

        h.remove_immediately(d0).unwrap();
        assert_eq!(None, h.display(DisplayId(0)));
        assert_eq!(vec![(DisplayId(1), d1)], h.displays());
    }

    #[test]
    fn duplicate_display_id_is_rejected() {
        let mut h = Hierarchy::default();
        h.create_default_display(DisplayId(3)).unwrap();
        let err = h.create_default_display(DisplayId(3)).unwrap_err();
        assert!(err.is_invalid_argument(), "{err}");
        assert_eq!(1, h.displays().len());
    }

    #[test]
    fn display_uses_configured_mode() {
        let settings = Settings {
            default_windowing_mode: WindowingMode::Freeform,
            ..Settings::default()
        };
        let mut h = Hierarchy::new(settings);
        let display = h.create_default_display(DisplayId(0)).unwrap();
        let stack = h.create_stack();
        h.attach(stack, display, 0).unwrap();
        assert_eq!(Some(WindowingMode::Freeform), h.windowing_mode(stack));
        assert_eq!(
            Some(WindowingMode::Undefined),
            h.container(stack).map(|c| c.requested_windowing_mode())
        );
    }

    #[test]
    fn stacks_and_tasks_on_display() {
        let mut h = Hierarchy::default();
        let display = h.create_default_display(DisplayId(0)).unwrap();
        let bottom = h.create_stack();
        let top = h.create_stack();
        h.attach(bottom, display, 0).unwrap();
        h.attach(top, display, usize::MAX).unwrap();

        let t1 = h.create_task(TaskId(1), UserId(0)).unwrap();
        let t2 = h.create_task(TaskId(2), UserId(0)).unwrap();
        h.attach(t2, top, 0).unwrap();
        h.attach(t1, bottom, 0).unwrap();

        assert_eq!(vec![bottom, top], h.stacks(display));
        assert_eq!(2, h.stack_count(display));
        assert_eq!(vec![t1, t2], h.tasks_on_display(display));
        assert_eq!(Some(DisplayId(0)), h.display_id_of(t2));
        assert_eq!(Some(display), h.display_of(display));

        assert!(h.stacks(top).is_empty());
        h.detach(top).unwrap();
        assert_eq!(None, h.display_id_of(t2));
        assert_eq!(1, h.stack_count(display));
    }
}
