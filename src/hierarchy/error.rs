use thiserror::Error;

use crate::model::tree::NodeId;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HierarchyError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),
}

impl HierarchyError {
    pub(crate) fn removed(node: NodeId) -> Self {
        HierarchyError::InvalidOperation(format!("container {node:?} has been removed"))
    }

    pub(crate) fn missing_target(node: NodeId) -> Self {
        HierarchyError::InvalidArgument(format!("container {node:?} does not exist"))
    }

    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, HierarchyError::InvalidArgument(_))
    }

    pub fn is_invalid_operation(&self) -> bool {
        matches!(self, HierarchyError::InvalidOperation(_))
    }
}

pub type Result<T> = std::result::Result<T, HierarchyError>;
