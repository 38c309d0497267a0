//! Workflow CRD types
//!
//! A Workflow is the persisted record of a Template being executed against
//! one or more machines. Its status tree is first populated from the
//! Template (see `anvil-convert`) and thereafter mutated by the reconciler
//! as worker agents report action results.

use crate::{CrdError, ObjectMeta, Result, TypeMeta};
use anvil_proto::State;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Workflow resource representing a provisioning job
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Workflow {
    /// Type metadata (apiVersion, kind)
    #[serde(flatten)]
    pub type_meta: TypeMeta,

    /// Object metadata (name, namespace, labels)
    pub metadata: ObjectMeta,

    /// Workflow specification
    pub spec: WorkflowSpec,

    /// Workflow status, set by the controller
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<WorkflowStatus>,
}

impl Workflow {
    /// Create a new Workflow
    pub fn new(
        name: impl Into<String>,
        hardware_ref: impl Into<String>,
        template_ref: impl Into<String>,
    ) -> Self {
        Self {
            type_meta: TypeMeta::workflow(),
            metadata: ObjectMeta::new(name),
            spec: WorkflowSpec {
                hardware_ref: hardware_ref.into(),
                template_ref: template_ref.into(),
                hardware_map: HashMap::new(),
            },
            status: None,
        }
    }

    /// Add a hardware mapping for template variable substitution
    pub fn with_hardware_map(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.spec.hardware_map.insert(key.into(), value.into());
        self
    }

    /// Validate the workflow
    pub fn validate(&self) -> Result<()> {
        if self.metadata.name.is_empty() {
            return Err(CrdError::MissingField("metadata.name".to_string()));
        }

        if self.spec.hardware_ref.is_empty() {
            return Err(CrdError::MissingField("spec.hardwareRef".to_string()));
        }

        if self.spec.template_ref.is_empty() {
            return Err(CrdError::MissingField("spec.templateRef".to_string()));
        }

        Ok(())
    }

    /// Tasks from the status tree, empty if status is unset
    pub fn tasks(&self) -> &[TaskStatus] {
        self.status.as_ref().map(|s| s.tasks.as_slice()).unwrap_or(&[])
    }

    /// Total number of actions across all tasks
    pub fn total_number_of_actions(&self) -> usize {
        self.tasks().iter().map(|t| t.actions.len()).sum()
    }

    /// Whether every action has reached a terminal state
    pub fn is_complete(&self) -> bool {
        let mut any = false;
        for task in self.tasks() {
            for action in &task.actions {
                any = true;
                if action.status.is_active() {
                    return false;
                }
            }
        }
        any
    }

    /// The current action with its owning task and global 0-based index
    ///
    /// The current action is the first one, in (task, action) order, that is
    /// pending or running. Once every action is terminal the pointer rests on
    /// the last action. Returns `None` when the status tree holds no actions.
    fn current_position(&self) -> Option<(usize, &TaskStatus, &ActionStatus)> {
        let mut last = None;
        let mut index = 0usize;
        for task in self.tasks() {
            for action in &task.actions {
                if action.status.is_active() {
                    return Some((index, task, action));
                }
                last = Some((index, task, action));
                index += 1;
            }
        }
        last
    }

    /// Address of the worker executing the current task
    pub fn current_worker(&self) -> &str {
        self.current_position()
            .map(|(_, task, _)| task.worker_addr.as_str())
            .unwrap_or("")
    }

    /// Name of the task containing the current action
    pub fn current_task(&self) -> &str {
        self.current_position()
            .map(|(_, task, _)| task.name.as_str())
            .unwrap_or("")
    }

    /// Name of the current action
    pub fn current_action(&self) -> &str {
        self.current_position()
            .map(|(_, _, action)| action.name.as_str())
            .unwrap_or("")
    }

    /// Global 0-based index of the current action across all tasks
    pub fn current_action_index(&self) -> usize {
        self.current_position().map(|(i, _, _)| i).unwrap_or(0)
    }

    /// State of the current action, Pending when there is none
    pub fn current_action_state(&self) -> State {
        self.current_position()
            .map(|(_, _, action)| action.status)
            .unwrap_or_default()
    }
}

/// Workflow specification
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowSpec {
    /// Reference to the Hardware resource being provisioned
    pub hardware_ref: String,

    /// Reference to the Template resource this workflow instantiates
    pub template_ref: String,

    /// Template variable substitutions,
    /// e.g. {"device_1": "00:11:22:33:44:55"}
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub hardware_map: HashMap<String, String>,
}

/// Workflow status
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowStatus {
    /// Overall workflow state
    #[serde(default)]
    pub state: State,

    /// Timeout for the entire workflow, in seconds
    #[serde(default)]
    pub global_timeout: i64,

    /// Task statuses, in execution order
    #[serde(default)]
    pub tasks: Vec<TaskStatus>,
}

/// Status of one task within a workflow
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TaskStatus {
    /// Task name
    pub name: String,

    /// Worker address, resolved from the template's worker field
    pub worker_addr: String,

    /// Default volume mounts inherited by this task's actions
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub volumes: Vec<String>,

    /// Default environment variables inherited by this task's actions
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub environment: HashMap<String, String>,

    /// Action statuses, in execution order
    #[serde(default)]
    pub actions: Vec<ActionStatus>,
}

/// Status of one action within a task
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ActionStatus {
    /// Action name
    pub name: String,

    /// Container image to run
    pub image: String,

    /// Action timeout in seconds
    #[serde(default)]
    pub timeout: i64,

    /// Command to execute in the container
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub command: Vec<String>,

    /// Volume mounts specific to this action
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub volumes: Vec<String>,

    /// Environment variables specific to this action
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub environment: HashMap<String, String>,

    /// Execution state
    #[serde(default)]
    pub status: State,

    /// PID namespace mode (e.g. "host")
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub pid: String,

    /// Start time, set when the action begins
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<chrono::DateTime<chrono::Utc>>,

    /// Wall-clock duration in seconds, set on completion
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seconds: Option<i64>,

    /// Outcome message, set on failure or timeout
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ActionStatus {
    /// Mark the action as running
    pub fn start(&mut self) {
        self.status = State::Running;
        self.started_at = Some(chrono::Utc::now());
    }

    /// Mark the action as completed successfully
    pub fn complete(&mut self) {
        self.status = State::Success;
        self.record_duration();
    }

    /// Mark the action as failed
    pub fn fail(&mut self, message: impl Into<String>) {
        self.status = State::Failed;
        self.message = Some(message.into());
        self.record_duration();
    }

    fn record_duration(&mut self) {
        if let Some(started) = self.started_at {
            self.seconds = Some(
                chrono::Utc::now()
                    .signed_duration_since(started)
                    .num_seconds(),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn action(name: &str, status: State) -> ActionStatus {
        ActionStatus {
            name: name.to_string(),
            image: "img".to_string(),
            timeout: 60,
            command: Vec::new(),
            volumes: Vec::new(),
            environment: HashMap::new(),
            status,
            pid: String::new(),
            started_at: None,
            seconds: None,
            message: None,
        }
    }

    fn two_task_workflow() -> Workflow {
        let mut wf = Workflow::new("os-install-123", "machine-1", "ubuntu-2404");
        wf.status = Some(WorkflowStatus {
            state: State::Running,
            global_timeout: 1800,
            tasks: vec![
                TaskStatus {
                    name: "disk setup".to_string(),
                    worker_addr: "00:11:22:33:44:55".to_string(),
                    volumes: Vec::new(),
                    environment: HashMap::new(),
                    actions: vec![
                        action("partition", State::Success),
                        action("stream image", State::Running),
                    ],
                },
                TaskStatus {
                    name: "boot".to_string(),
                    worker_addr: "00:11:22:33:44:55".to_string(),
                    volumes: Vec::new(),
                    environment: HashMap::new(),
                    actions: vec![action("kexec", State::Pending)],
                },
            ],
        });
        wf
    }

    #[test]
    fn test_workflow_validation() {
        let wf = Workflow::new("test", "hw", "template");
        assert!(wf.validate().is_ok());

        let wf = Workflow::new("", "hw", "template");
        assert!(matches!(wf.validate(), Err(CrdError::MissingField(_))));

        let wf = Workflow::new("test", "hw", "");
        assert!(matches!(wf.validate(), Err(CrdError::MissingField(_))));
    }

    #[test]
    fn test_current_pointer_tracks_first_active_action() {
        let wf = two_task_workflow();

        assert_eq!(wf.current_task(), "disk setup");
        assert_eq!(wf.current_action(), "stream image");
        assert_eq!(wf.current_action_index(), 1);
        assert_eq!(wf.current_action_state(), State::Running);
        assert_eq!(wf.current_worker(), "00:11:22:33:44:55");
        assert_eq!(wf.total_number_of_actions(), 3);
        assert!(!wf.is_complete());
    }

    #[test]
    fn test_pointer_rests_on_last_action_when_done() {
        let mut wf = two_task_workflow();
        let status = wf.status.as_mut().unwrap();
        for task in &mut status.tasks {
            for action in &mut task.actions {
                action.status = State::Success;
            }
        }

        assert!(wf.is_complete());
        assert_eq!(wf.current_task(), "boot");
        assert_eq!(wf.current_action(), "kexec");
        assert_eq!(wf.current_action_index(), 2);
        assert_eq!(wf.current_action_state(), State::Success);
    }

    #[test]
    fn test_pointer_defaults_without_status() {
        let wf = Workflow::new("test", "hw", "template");

        assert_eq!(wf.current_worker(), "");
        assert_eq!(wf.current_task(), "");
        assert_eq!(wf.current_action(), "");
        assert_eq!(wf.current_action_index(), 0);
        assert_eq!(wf.current_action_state(), State::Pending);
        assert_eq!(wf.total_number_of_actions(), 0);
        assert!(!wf.is_complete());
    }

    #[test]
    fn test_action_status_lifecycle() {
        let mut a = action("stream image", State::Pending);

        a.start();
        assert_eq!(a.status, State::Running);
        assert!(a.started_at.is_some());

        a.complete();
        assert_eq!(a.status, State::Success);
        assert!(a.seconds.is_some());

        let mut b = action("kexec", State::Pending);
        b.start();
        b.fail("kexec syscall failed");
        assert_eq!(b.status, State::Failed);
        assert_eq!(b.message, Some("kexec syscall failed".to_string()));
    }

    #[test]
    fn test_workflow_serialization_round_trip() {
        let wf = two_task_workflow();
        let json = serde_json::to_string_pretty(&wf).unwrap();
        let parsed: Workflow = serde_json::from_str(&json).unwrap();
        assert_eq!(wf, parsed);
        assert!(json.contains("\"STATE_RUNNING\""));
    }

    #[test]
    fn test_workflow_tinkerbell_compatible_format() {
        let doc = r#"{
            "apiVersion": "anvil.dev/v1alpha1",
            "kind": "Workflow",
            "metadata": { "name": "os-install-00-11-22-33-44-55" },
            "spec": {
                "hardwareRef": "machine-00-11-22-33-44-55",
                "templateRef": "ubuntu-2404",
                "hardwareMap": { "device_1": "00:11:22:33:44:55" }
            },
            "status": {
                "state": "STATE_RUNNING",
                "globalTimeout": 1800,
                "tasks": [
                    {
                        "name": "os installation",
                        "workerAddr": "00:11:22:33:44:55",
                        "actions": [
                            {
                                "name": "stream image",
                                "image": "quay.io/tinkerbell/actions/image2disk",
                                "timeout": 600,
                                "status": "STATE_RUNNING"
                            }
                        ]
                    }
                ]
            }
        }"#;

        let wf: Workflow = serde_json::from_str(doc).unwrap();
        assert_eq!(wf.spec.template_ref, "ubuntu-2404");
        assert_eq!(wf.current_action(), "stream image");
        assert_eq!(wf.current_action_state(), State::Running);
    }
}
