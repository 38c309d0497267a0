//! Workflow wire messages
//!
//! These are the payloads exchanged with remote worker agents. They carry
//! plain data only; encoding and transport belong to the server and agent.

use crate::State;
use serde::{Deserialize, Serialize};

/// Snapshot of where a workflow's execution currently is
///
/// Produced from a `Workflow` resource's progress pointer. Deliberately
/// lossy: it never carries full task or action bodies.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowContext {
    /// Workflow resource name
    pub workflow_id: String,

    /// Address of the worker executing the current task
    pub current_worker: String,

    /// Name of the task containing the current action
    pub current_task: String,

    /// Name of the current action
    pub current_action: String,

    /// Global 0-based index of the current action across all tasks
    pub current_action_index: i64,

    /// State of the current action
    pub current_action_state: State,

    /// Total number of actions in the workflow
    pub total_number_of_actions: i64,
}

/// One dispatchable unit of work, flattened from a `(task, action)` pair
///
/// Task identity (name, worker address) is denormalized onto each entry so
/// a worker can execute it without the surrounding status tree.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowAction {
    /// Name of the task this action belongs to
    pub task_name: String,

    /// Action name
    pub name: String,

    /// Container image to run
    pub image: String,

    /// Action timeout in seconds
    pub timeout: i64,

    /// Command to execute in the container
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub command: Vec<String>,

    /// Address of the worker assigned to the owning task
    pub worker_id: String,

    /// Merged volume mounts: task defaults first, then action-specific
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub volumes: Vec<String>,

    /// Merged environment as sorted `KEY=VALUE` strings
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub environment: Vec<String>,

    /// PID namespace mode (e.g. "host")
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub pid: String,
}

/// Ordered list of flattened actions for dispatch to a worker
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowActionList {
    /// Actions in execution order (task order, then action order)
    #[serde(default)]
    pub action_list: Vec<WorkflowAction>,
}
