mod container;
mod display;
mod engine;
mod error;
mod geometry;
mod hooks;
mod task;

pub use container::{Container, ContainerKind, DisplayId, TaskId, UserId, WindowingMode};
pub use engine::{Hierarchy, RemovalOutcome};
pub use error::{HierarchyError, Result};
pub use geometry::{Point, Rect};
pub use hooks::ContainerHooks;

pub use crate::model::tree::{NodeId as ContainerId, NodeMap};
