// SPDX-License-Identifier: MIT

//! Rule sets: permission expressions per entity action, and workflow
//! triggers with conditions
//!
//! This module provides:
//! - `RulesLoader` - reads rule sets from YAML
//! - `RuleValidator` - compiles every expression at load time
//! - `PermissionChecker` - evaluates rules per request, failing closed

mod checker;
pub mod loader;
pub mod types;
mod validator;

pub use checker::{AccessContext, PermissionChecker, RequestInfo};
pub use loader::RulesLoader;
pub use types::{EntityDefinition, PermissionRule, RuleSet, TriggerDefinition, WorkflowDefinition};
pub use validator::{RuleValidator, ValidationIssue};
