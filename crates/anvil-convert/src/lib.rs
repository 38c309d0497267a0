//! Workflow conversions
//!
//! Pure transforms between the three representations of a provisioning
//! workflow:
//!
//! - the persisted `Workflow` CRD resource,
//! - the declarative `Template` document it instantiates,
//! - the wire messages exchanged with worker agents.
//!
//! Every function here is stateless and side-effect free. An absent input
//! propagates as an absent output; none of the conversions can fail. The
//! caller (reconciler, gRPC handler) owns the surrounding lifecycle.

use anvil_crd::{ActionStatus, TaskStatus, Template, Workflow, WorkflowStatus};
use anvil_proto::{State, WorkflowAction, WorkflowActionList, WorkflowContext};
use std::collections::HashMap;
use tracing::trace;

/// Project a workflow's progress pointer into a `WorkflowContext` message.
///
/// The context carries only the pointer fields, never task or action bodies.
/// Returns `None` when no workflow is given.
pub fn workflow_to_context(wf: Option<&Workflow>) -> Option<WorkflowContext> {
    let wf = wf?;
    Some(WorkflowContext {
        workflow_id: wf.metadata.name.clone(),
        current_worker: wf.current_worker().to_string(),
        current_task: wf.current_task().to_string(),
        current_action: wf.current_action().to_string(),
        current_action_index: wf.current_action_index() as i64,
        current_action_state: wf.current_action_state(),
        total_number_of_actions: wf.total_number_of_actions() as i64,
    })
}

/// Derive the initial `WorkflowStatus` from a template document.
///
/// Walks tasks and actions in document order, carrying their shapes over
/// verbatim and forcing every action to Pending. Returns `None` when no
/// template is given.
pub fn template_to_status(template: Option<&Template>) -> Option<WorkflowStatus> {
    let template = template?;
    let tasks = template
        .spec
        .tasks
        .iter()
        .map(|task| TaskStatus {
            name: task.name.clone(),
            worker_addr: task.worker_addr.clone(),
            volumes: task.volumes.clone(),
            environment: task.environment.clone(),
            actions: task
                .actions
                .iter()
                .map(|action| ActionStatus {
                    name: action.name.clone(),
                    image: action.image.clone(),
                    timeout: action.timeout,
                    command: action.command.clone(),
                    volumes: action.volumes.clone(),
                    environment: action.environment.clone(),
                    // Nothing has run yet, whatever the document says.
                    status: State::Pending,
                    pid: action.pid.clone(),
                    started_at: None,
                    seconds: None,
                    message: None,
                })
                .collect(),
        })
        .collect();

    trace!(
        template = %template.metadata.name,
        actions = template.total_actions(),
        "derived initial workflow status"
    );

    Some(WorkflowStatus {
        state: State::Pending,
        global_timeout: template.spec.global_timeout,
        tasks,
    })
}

/// Flatten a workflow's status tree into a `WorkflowActionList` for dispatch.
///
/// Emits one entry per `(task, action)` pair in status order. Task identity
/// is denormalized onto each entry; environments and volumes are merged per
/// [`merge_environment`] and [`merge_volumes`]. Returns `None` when no
/// workflow is given.
pub fn workflow_to_action_list(wf: Option<&Workflow>) -> Option<WorkflowActionList> {
    let wf = wf?;
    let mut action_list = Vec::with_capacity(wf.total_number_of_actions());
    for task in wf.tasks() {
        for action in &task.actions {
            action_list.push(WorkflowAction {
                task_name: task.name.clone(),
                name: action.name.clone(),
                image: action.image.clone(),
                timeout: action.timeout,
                command: action.command.clone(),
                worker_id: task.worker_addr.clone(),
                volumes: merge_volumes(&task.volumes, &action.volumes),
                environment: merge_environment(&task.environment, &action.environment),
                pid: action.pid.clone(),
            });
        }
    }

    trace!(
        workflow = %wf.metadata.name,
        actions = action_list.len(),
        "flattened workflow into action list"
    );

    Some(WorkflowActionList { action_list })
}

/// Merge task-default and action-specific environments into wire form.
///
/// Task defaults are overlaid by action entries; on key collision the
/// action's value wins. The result is serialized as `KEY=VALUE` strings
/// sorted lexicographically by the full string, so repeated calls on the
/// same input produce the same ordered list.
pub fn merge_environment(
    task_env: &HashMap<String, String>,
    action_env: &HashMap<String, String>,
) -> Vec<String> {
    let mut merged = task_env.clone();
    merged.extend(
        action_env
            .iter()
            .map(|(k, v)| (k.clone(), v.clone())),
    );

    let mut env: Vec<String> = merged
        .into_iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect();
    env.sort();
    env
}

/// Merge task-default and action-specific volume mounts.
///
/// Task volumes come first, then action volumes, concatenated as-is.
/// Duplicate mounts pass through; target-path dedup is left to the runtime
/// on the worker.
pub fn merge_volumes(task_volumes: &[String], action_volumes: &[String]) -> Vec<String> {
    let mut volumes = task_volumes.to_vec();
    volumes.extend(action_volumes.iter().cloned());
    volumes
}
