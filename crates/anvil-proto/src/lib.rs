//! Anvil Wire Protocol Types
//!
//! Message shapes exchanged between the Anvil server and remote worker
//! agents during bare metal provisioning.
//!
//! # Messages
//!
//! - `WorkflowContext` - progress snapshot of a running workflow
//! - `WorkflowAction` / `WorkflowActionList` - flattened work dispatch payload
//! - `State` - shared action-state table (string labels and integer codes)
//!
//! Encoding and transport are owned by the server and agent crates; this
//! crate defines data shapes only.

pub mod state;
pub mod workflow;

pub use state::*;
pub use workflow::*;
