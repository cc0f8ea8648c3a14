// SPDX-License-Identifier: MIT

//! YAML schema types for rules files
//!
//! A rules file lists entities with their permission expressions and
//! workflows with their trigger conditions.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::BTreeMap;

/// Top-level rules definition
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct RuleSet {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub entities: Vec<EntityDefinition>,
    #[serde(default)]
    pub workflows: Vec<WorkflowDefinition>,
}

/// An entity and who may do what with it
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct EntityDefinition {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Action name (`read`, `update`, ...) to permission rule
    #[serde(default)]
    pub permissions: BTreeMap<String, PermissionRule>,
}

/// Permission rule (expression string or a plain boolean)
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(untagged)]
pub enum PermissionRule {
    Always(bool),
    Expression(String),
}

impl PermissionRule {
    /// The rule as expression source
    pub fn expression(&self) -> Cow<'_, str> {
        match self {
            PermissionRule::Always(true) => Cow::Borrowed("true"),
            PermissionRule::Always(false) => Cow::Borrowed("false"),
            PermissionRule::Expression(expr) => Cow::Borrowed(expr),
        }
    }
}

/// A workflow started by an entity event
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct WorkflowDefinition {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub trigger: TriggerDefinition,
}

/// When a workflow runs
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct TriggerDefinition {
    /// Event name, e.g. `created`, `updated`
    pub event: String,
    /// Restrict to one entity; any entity when absent
    #[serde(default)]
    pub entity: Option<String>,
    /// Extra condition evaluated against the access context
    #[serde(default)]
    pub condition: Option<String>,
}

impl RuleSet {
    /// Look up an entity by name
    pub fn entity(&self, name: &str) -> Option<&EntityDefinition> {
        self.entities.iter().find(|e| e.name == name)
    }
}

impl EntityDefinition {
    /// Look up the rule for an action
    pub fn permission(&self, action: &str) -> Option<&PermissionRule> {
        self.permissions.get(action)
    }
}

impl TriggerDefinition {
    /// Whether this trigger listens for `event` on `entity`
    pub fn matches(&self, entity: &str, event: &str) -> bool {
        self.event == event && self.entity.as_deref().map_or(true, |e| e == entity)
    }
}
