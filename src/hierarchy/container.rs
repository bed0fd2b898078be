use std::fmt;

use serde::{Deserialize, Serialize};

use super::geometry::{Point, Rect};

/// Windowing mode of a container.
///
/// `Undefined` means "inherit from the parent". The remaining modes decide
/// whether a container's own bounds are used or it simply fills its parent.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum_macros::VariantNames,
    strum_macros::Display
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum WindowingMode {
    #[default]
    Undefined,
    Fullscreen,
    Pinned,
    SplitScreenPrimary,
    SplitScreenSecondary,
    Freeform,
}

impl WindowingMode {
    pub fn is_undefined(self) -> bool { self == WindowingMode::Undefined }

    /// Whether a container in this mode is placed at its own bounds rather
    /// than filling its parent.
    pub fn honors_bounds(self) -> bool {
        use WindowingMode::*;
        match self {
            Pinned | SplitScreenPrimary | SplitScreenSecondary | Freeform => true,
            Undefined | Fullscreen => false,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DisplayId(pub u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(pub u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UserId(pub u32);

impl fmt::Display for DisplayId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "display#{}", self.0) }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "task#{}", self.0) }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "user#{}", self.0) }
}

/// What a container is, with the data only that kind carries.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ContainerKind {
    Display { display_id: DisplayId },
    Stack,
    Task { task_id: TaskId, user_id: UserId },
    Activity { name: String },
}

impl ContainerKind {
    pub fn name(&self) -> &'static str {
        match self {
            ContainerKind::Display { .. } => "display",
            ContainerKind::Stack => "stack",
            ContainerKind::Task { .. } => "task",
            ContainerKind::Activity { .. } => "activity",
        }
    }

    pub fn is_display(&self) -> bool { matches!(self, ContainerKind::Display { .. }) }

    pub fn is_stack(&self) -> bool { matches!(self, ContainerKind::Stack) }

    pub fn is_task(&self) -> bool { matches!(self, ContainerKind::Task { .. }) }

    pub fn is_activity(&self) -> bool { matches!(self, ContainerKind::Activity { .. }) }

    /// Displays hold stacks, stacks hold tasks, tasks hold activities.
    pub fn can_contain(&self, child: &ContainerKind) -> bool {
        use ContainerKind::*;
        matches!(
            (self, child),
            (Display { .. }, Stack) | (Stack, Task { .. }) | (Task { .. }, Activity { .. })
        )
    }
}

/// State shared by every container in the hierarchy.
#[derive(Clone, Debug)]
pub struct Container {
    kind: ContainerKind,
    pub(super) requested_mode: WindowingMode,
    pub(super) requested_bounds: Rect,
    bounds: Rect,
    pub(super) override_displayed_bounds: Option<Rect>,
    last_surface_position: Point,
    pub(super) removal_pending: bool,
}

impl Container {
    pub(super) fn new(kind: ContainerKind) -> Self {
        Container {
            kind,
            requested_mode: WindowingMode::Undefined,
            requested_bounds: Rect::default(),
            bounds: Rect::default(),
            override_displayed_bounds: None,
            last_surface_position: Point::default(),
            removal_pending: false,
        }
    }

    pub fn kind(&self) -> &ContainerKind { &self.kind }

    /// The windowing mode set on this container, which may be `Undefined`.
    pub fn requested_windowing_mode(&self) -> WindowingMode { self.requested_mode }

    pub fn requested_bounds(&self) -> Rect { self.requested_bounds }

    /// Bounds after applying the windowing mode.
    pub fn bounds(&self) -> Rect { self.bounds }

    pub fn override_displayed_bounds(&self) -> Option<Rect> { self.override_displayed_bounds }

    pub fn last_surface_position(&self) -> Point { self.last_surface_position }

    pub fn is_removal_pending(&self) -> bool { self.removal_pending }

    /// The rectangle the surface is anchored to.
    pub fn displayed_bounds(&self) -> Rect { self.override_displayed_bounds.unwrap_or(self.bounds) }

    fn honors_requested_bounds(&self, mode: WindowingMode) -> bool {
        self.kind.is_display() || (mode.honors_bounds() && !self.requested_bounds.is_empty())
    }

    /// Recomputes effective bounds from the request, the resolved windowing
    /// mode and the parent's effective bounds, then the surface position.
    pub(super) fn resolve_geometry(&mut self, parent_bounds: Option<Rect>, mode: WindowingMode) {
        self.bounds = match parent_bounds {
            Some(parent) if !self.honors_requested_bounds(mode) => parent,
            _ => self.requested_bounds,
        };
        self.update_surface_position();
    }

    pub(super) fn update_surface_position(&mut self) {
        self.last_surface_position = self.displayed_bounds().top_left();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task() -> ContainerKind {
        ContainerKind::Task { task_id: TaskId(1), user_id: UserId(0) }
    }

    #[test]
    fn containment_rules() {
        let display = ContainerKind::Display { display_id: DisplayId(0) };
        let activity = ContainerKind::Activity { name: "main".into() };
        assert!(display.can_contain(&ContainerKind::Stack));
        assert!(ContainerKind::Stack.can_contain(&task()));
        assert!(task().can_contain(&activity));

        assert!(!display.can_contain(&task()));
        assert!(!ContainerKind::Stack.can_contain(&ContainerKind::Stack));
        assert!(!task().can_contain(&task()));
        assert!(!activity.can_contain(&activity));
        assert!(!ContainerKind::Stack.can_contain(&display));
    }

    #[test]
    fn windowing_mode_names() {
        assert_eq!("split_screen_primary", WindowingMode::SplitScreenPrimary.to_string());
        assert!(WindowingMode::Freeform.honors_bounds());
        assert!(!WindowingMode::Fullscreen.honors_bounds());
        assert!(WindowingMode::default().is_undefined());
    }

    #[test]
    fn fullscreen_fills_parent() {
        let mut container = Container::new(task());
        container.requested_bounds = Rect::new(10, 10, 100, 200);
        container.resolve_geometry(Some(Rect::from_size(800, 600)), WindowingMode::Fullscreen);
        assert_eq!(Rect::from_size(800, 600), container.bounds());
        assert_eq!(Point::new(0, 0), container.last_surface_position());
    }

    #[test]
    fn freeform_uses_requested_bounds() {
        let mut container = Container::new(task());
        container.requested_bounds = Rect::new(10, 10, 100, 200);
        container.resolve_geometry(Some(Rect::from_size(800, 600)), WindowingMode::Freeform);
        assert_eq!(Rect::new(10, 10, 100, 200), container.bounds());
        assert_eq!(Point::new(10, 10), container.last_surface_position());
    }

    #[test]
    fn freeform_without_request_fills_parent() {
        let mut container = Container::new(task());
        container.resolve_geometry(Some(Rect::from_size(800, 600)), WindowingMode::Freeform);
        assert_eq!(Rect::from_size(800, 600), container.bounds());
    }

    #[test]
    fn override_takes_precedence_for_surface_position() {
        let mut container = Container::new(task());
        container.requested_bounds = Rect::new(10, 10, 100, 200);
        container.resolve_geometry(None, WindowingMode::Fullscreen);
        container.override_displayed_bounds = Some(Rect::new(20, 30, 110, 220));
        container.update_surface_position();
        assert_eq!(Point::new(20, 30), container.last_surface_position());
        assert_eq!(Rect::new(10, 10, 100, 200), container.bounds());
    }
}
