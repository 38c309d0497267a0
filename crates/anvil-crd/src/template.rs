//! Template CRD types
//!
//! A Template is the human-authored, declarative description of a
//! provisioning workflow: ordered tasks, each an ordered list of actions
//! executed on one worker. Templates carry no execution state; a Workflow
//! resource's status is first derived from one (see `anvil-convert`).

use crate::{CrdError, ObjectMeta, Result, TypeMeta};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Template resource defining a provisioning workflow structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    /// Type metadata (apiVersion, kind)
    #[serde(flatten)]
    pub type_meta: TypeMeta,

    /// Object metadata (name, namespace, labels)
    pub metadata: ObjectMeta,

    /// Template specification
    pub spec: TemplateSpec,
}

impl Template {
    /// Create a new Template
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            type_meta: TypeMeta::template(),
            metadata: ObjectMeta::new(name),
            spec: TemplateSpec::default(),
        }
    }

    /// Add a task to the template
    pub fn with_task(mut self, task: Task) -> Self {
        self.spec.tasks.push(task);
        self
    }

    /// Set the global timeout in seconds
    pub fn with_global_timeout(mut self, seconds: i64) -> Self {
        self.spec.global_timeout = seconds;
        self
    }

    /// Validate the template structure
    pub fn validate(&self) -> Result<()> {
        if self.metadata.name.is_empty() {
            return Err(CrdError::MissingField("metadata.name".to_string()));
        }

        if self.spec.tasks.is_empty() {
            return Err(CrdError::MissingField("spec.tasks".to_string()));
        }

        for (i, task) in self.spec.tasks.iter().enumerate() {
            task.validate().map_err(|e| CrdError::InvalidFieldValue {
                field: format!("spec.tasks[{}]", i),
                message: e.to_string(),
            })?;
        }

        Ok(())
    }

    /// Total number of actions across all tasks
    pub fn total_actions(&self) -> usize {
        self.spec.tasks.iter().map(|t| t.actions.len()).sum()
    }
}

/// Template specification
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct TemplateSpec {
    /// Template format version
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// Timeout for the entire workflow, in seconds
    #[serde(default)]
    pub global_timeout: i64,

    /// Tasks to execute, in order
    #[serde(default)]
    pub tasks: Vec<Task>,
}

/// A named group of actions executed on one worker
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Task name
    pub name: String,

    /// Worker address, typically a MAC or a template variable
    /// like "{{.device_1}}"
    pub worker_addr: String,

    /// Default volume mounts inherited by every action in this task
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub volumes: Vec<String>,

    /// Default environment variables inherited by every action in this task
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub environment: HashMap<String, String>,

    /// Actions to execute, in order
    pub actions: Vec<Action>,
}

impl Task {
    /// Create a new task
    pub fn new(name: impl Into<String>, worker_addr: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            worker_addr: worker_addr.into(),
            volumes: Vec::new(),
            environment: HashMap::new(),
            actions: Vec::new(),
        }
    }

    /// Add an action to the task
    pub fn with_action(mut self, action: Action) -> Self {
        self.actions.push(action);
        self
    }

    /// Add a default volume mount
    pub fn with_volume(mut self, volume: impl Into<String>) -> Self {
        self.volumes.push(volume.into());
        self
    }

    /// Add a default environment variable
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.environment.insert(key.into(), value.into());
        self
    }

    /// Validate the task structure
    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(CrdError::MissingField("name".to_string()));
        }

        if self.worker_addr.is_empty() {
            return Err(CrdError::MissingField("workerAddr".to_string()));
        }

        if self.actions.is_empty() {
            return Err(CrdError::MissingField("actions".to_string()));
        }

        for (i, action) in self.actions.iter().enumerate() {
            action.validate().map_err(|e| CrdError::InvalidFieldValue {
                field: format!("actions[{}]", i),
                message: e.to_string(),
            })?;
        }

        Ok(())
    }
}

/// A single executable step in a provisioning workflow
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Action {
    /// Action name
    pub name: String,

    /// Container image to run,
    /// e.g. "quay.io/tinkerbell/actions/image2disk:latest"
    pub image: String,

    /// Action timeout in seconds
    #[serde(default)]
    pub timeout: i64,

    /// Command to execute in the container
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub command: Vec<String>,

    /// Volume mounts specific to this action, appended to the task defaults
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub volumes: Vec<String>,

    /// Environment variables for this action; override task defaults on
    /// key collision
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub environment: HashMap<String, String>,

    /// PID namespace mode (e.g. "host")
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub pid: String,
}

impl Action {
    /// Create a new action
    pub fn new(name: impl Into<String>, image: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            image: image.into(),
            timeout: 0,
            command: Vec::new(),
            volumes: Vec::new(),
            environment: HashMap::new(),
            pid: String::new(),
        }
    }

    /// Set the timeout in seconds
    pub fn with_timeout(mut self, seconds: i64) -> Self {
        self.timeout = seconds;
        self
    }

    /// Add an environment variable
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.environment.insert(key.into(), value.into());
        self
    }

    /// Add a volume mount
    pub fn with_volume(mut self, volume: impl Into<String>) -> Self {
        self.volumes.push(volume.into());
        self
    }

    /// Validate the action structure
    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(CrdError::MissingField("name".to_string()));
        }

        if self.image.is_empty() {
            return Err(CrdError::MissingField("image".to_string()));
        }

        Ok(())
    }
}
