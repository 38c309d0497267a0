//! Anvil CRD Types
//!
//! CRD-compatible resource types for bare metal provisioning.
//!
//! # API Group
//!
//! All types use the `anvil.dev/v1alpha1` API group.
//!
//! # Resources
//!
//! - `Template` - declarative provisioning workflow documents (tasks, actions)
//! - `Workflow` - persisted execution state of a template on hardware
//!
//! Persistence and watch mechanics live in the store; these types only
//! define shapes, structural validation, and derived progress accessors.
//!
//! # Credit
//!
//! The shapes are compatible with Tinkerbell (tinkerbell.org) workflows.

pub mod error;
pub mod metadata;
pub mod template;
pub mod workflow;

pub use error::*;
pub use metadata::*;
pub use template::*;
pub use workflow::*;

/// API version for all Anvil CRDs
pub const API_VERSION: &str = "anvil.dev/v1alpha1";

/// API group for all Anvil CRDs
pub const API_GROUP: &str = "anvil.dev";
