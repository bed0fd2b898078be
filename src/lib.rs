//! An ordered tree of window containers: displays hold stacks, stacks hold
//! tasks and tasks hold activity records.
//!
//! [`hierarchy::Hierarchy`] owns the tree and is the only way to change it.

pub mod common;
pub mod hierarchy;
pub mod model;
