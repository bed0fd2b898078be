use tracing::debug;

use super::container::{ContainerKind, TaskId, UserId};
use super::engine::Hierarchy;
use super::error::{HierarchyError, Result};
use crate::model::tree::NodeId;

impl Hierarchy {
    /// Creates a detached task.
    pub fn create_task(&mut self, task_id: TaskId, user_id: UserId) -> Result<NodeId> {
        if self.tree.data.tasks.contains_key(&task_id) {
            return Err(HierarchyError::InvalidArgument(format!("{task_id} already exists")));
        }
        let node = self.insert_container(ContainerKind::Task { task_id, user_id });
        self.tree.data.tasks.insert(task_id, node);
        debug!(%task_id, %user_id, ?node, "created task");
        Ok(node)
    }

    pub fn task(&self, task_id: TaskId) -> Option<NodeId> {
        self.tree.data.tasks.get(&task_id).copied()
    }

    pub fn task_id_of(&self, node: NodeId) -> Option<TaskId> {
        match self.kind(node)? {
            ContainerKind::Task { task_id, .. } => Some(*task_id),
            _ => None,
        }
    }

    pub fn user_id_of(&self, node: NodeId) -> Option<UserId> {
        match self.kind(node)? {
            ContainerKind::Task { user_id, .. } => Some(*user_id),
            _ => None,
        }
    }

    /// Activities of `task`, bottom to top.
    pub fn activities(&self, task: NodeId) -> Vec<NodeId> {
        if self.task_id_of(task).is_none() {
            return Vec::new();
        }
        self.children(task).collect()
    }

    /// Tasks belonging to `user_id`, ordered by task id.
    pub fn tasks_for_user(&self, user_id: UserId) -> Vec<NodeId> {
        let mut tasks: Vec<_> = self
            .tree
            .data
            .tasks
            .iter()
            .filter(|&(_, &node)| self.user_id_of(node) == Some(user_id))
            .map(|(&id, &node)| (id, node))
            .collect();
        tasks.sort_unstable_by_key(|&(id, _)| id);
        tasks.into_iter().map(|(_, node)| node).collect()
    }
}
