// SPDX-License-Identifier: MIT

//! Request-time permission checks against a validated rule set

use chrono::{DateTime, Utc};
use serde_json::{json, Value};

use super::types::RuleSet;
use super::validator::RuleValidator;
use crate::error::PermitError;
use crate::expression::{self, Context, Limits};

/// Who is asking, about which record, through which request
#[derive(Debug, Clone, Default)]
pub struct AccessContext {
    pub user: Option<Value>,
    pub entity: Option<Value>,
    pub request: Option<RequestInfo>,
}

/// Request metadata exposed to expressions as `request.*`
#[derive(Debug, Clone)]
pub struct RequestInfo {
    pub method: String,
    pub path: String,
    pub timestamp: DateTime<Utc>,
}

impl AccessContext {
    /// No authenticated user
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Authenticated user record
    pub fn for_user(user: Value) -> Self {
        Self {
            user: Some(user),
            ..Self::default()
        }
    }

    /// The record being accessed
    pub fn with_entity(mut self, entity: Value) -> Self {
        self.entity = Some(entity);
        self
    }

    /// Attach request metadata, stamped with the current time
    pub fn with_request(mut self, method: impl Into<String>, path: impl Into<String>) -> Self {
        self.request = Some(RequestInfo {
            method: method.into(),
            path: path.into(),
            timestamp: Utc::now(),
        });
        self
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.as_ref().is_some_and(|u| !u.is_null())
    }

    /// Build the evaluation context: `user`, `entity`, `authenticated`, `request`
    pub fn to_context(&self) -> Context {
        let mut ctx = Context::new().with("authenticated", json!(self.is_authenticated()));
        if let Some(user) = &self.user {
            ctx.insert("user", user.clone());
        }
        if let Some(entity) = &self.entity {
            ctx.insert("entity", entity.clone());
        }
        if let Some(request) = &self.request {
            ctx.insert(
                "request",
                json!({
                    "method": request.method,
                    "path": request.path,
                    "timestamp": request.timestamp.to_rfc3339(),
                }),
            );
        }
        ctx
    }
}

/// Answers permission questions from a rule set
///
/// Construction validates every expression. At request time anything
/// unexpected (unknown entity or action, evaluation failure) denies access.
#[derive(Debug, Clone)]
pub struct PermissionChecker {
    rules: RuleSet,
    limits: Limits,
}

impl PermissionChecker {
    pub fn new(rules: RuleSet) -> Result<Self, PermitError> {
        Self::with_limits(rules, Limits::default())
    }

    pub fn with_limits(rules: RuleSet, limits: Limits) -> Result<Self, PermitError> {
        let issues = RuleValidator::with_limits(limits).validate(&rules);
        if !issues.is_empty() {
            return Err(PermitError::InvalidRules(issues));
        }
        Ok(Self { rules, limits })
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// May the caller perform `action` on `entity`?
    pub fn can(&self, entity: &str, action: &str, access: &AccessContext) -> bool {
        let Some(rule) = self
            .rules
            .entity(entity)
            .and_then(|e| e.permission(action))
        else {
            log::debug!("No permission rule for {}.{}, denying", entity, action);
            return false;
        };

        let source = rule.expression();
        let result = expression::evaluate_with(&source, &access.to_context(), &self.limits);
        if !result.success {
            log::warn!(
                "Permission rule {}.{} failed to evaluate: {}",
                entity,
                action,
                result.error.as_deref().unwrap_or("unknown error")
            );
        }
        result.is_true()
    }

    /// Names of workflows triggered by `event` on `entity`
    pub fn triggered_workflows(
        &self,
        entity: &str,
        event: &str,
        access: &AccessContext,
    ) -> Vec<&str> {
        let ctx = access.to_context();
        self.rules
            .workflows
            .iter()
            .filter(|w| w.trigger.matches(entity, event))
            .filter(|w| match &w.trigger.condition {
                None => true,
                Some(condition) => expression::evaluate_with(condition, &ctx, &self.limits).is_true(),
            })
            .map(|w| w.name.as_str())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::loader::RulesLoader;

    const RULES: &str = r#"
entities:
  - name: Ticket
    permissions:
      create: authenticated
      read: true
      update: "user.role == 'admin' || user.id == entity.ownerId"
      delete: "user.role == 'admin' && request.method == 'DELETE'"
workflows:
  - name: escalate
    trigger:
      event: updated
      entity: Ticket
      condition: "entity.priority == 'high'"
  - name: audit
    trigger:
      event: updated
"#;

    fn checker() -> PermissionChecker {
        PermissionChecker::new(RulesLoader::parse_yaml(RULES).unwrap()).unwrap()
    }

    #[test]
    fn test_anonymous_access() {
        let checker = checker();
        let anon = AccessContext::anonymous().with_entity(json!({"ownerId": 7}));
        assert!(checker.can("Ticket", "read", &anon));
        assert!(!checker.can("Ticket", "create", &anon));
        assert!(!checker.can("Ticket", "update", &anon));
    }

    #[test]
    fn test_two_absent_paths_compare_equal() {
        // Neither `user` nor `entity` is present, so both sides are undefined
        let checker = checker();
        assert!(checker.can("Ticket", "update", &AccessContext::anonymous()));
    }

    #[test]
    fn test_owner_and_admin() {
        let checker = checker();
        let ticket = json!({"ownerId": 7, "priority": "low"});

        let owner = AccessContext::for_user(json!({"id": 7, "role": "member"})).with_entity(ticket.clone());
        assert!(checker.can("Ticket", "update", &owner));

        let stranger = AccessContext::for_user(json!({"id": 8, "role": "member"})).with_entity(ticket.clone());
        assert!(!checker.can("Ticket", "update", &stranger));

        let admin = AccessContext::for_user(json!({"id": 1, "role": "admin"})).with_entity(ticket);
        assert!(checker.can("Ticket", "update", &admin));
    }

    #[test]
    fn test_request_metadata() {
        let checker = checker();
        let admin = AccessContext::for_user(json!({"role": "admin"}));
        assert!(!checker.can("Ticket", "delete", &admin));
        assert!(checker.can("Ticket", "delete", &admin.clone().with_request("DELETE", "/tickets/1")));
    }

    #[test]
    fn test_unknown_entity_or_action_is_denied() {
        let checker = checker();
        let admin = AccessContext::for_user(json!({"role": "admin"}));
        assert!(!checker.can("Invoice", "read", &admin));
        assert!(!checker.can("Ticket", "archive", &admin));
    }

    #[test]
    fn test_null_user_is_not_authenticated() {
        let access = AccessContext::for_user(Value::Null);
        assert!(!access.is_authenticated());
        assert!(!checker().can("Ticket", "create", &access));
    }

    #[test]
    fn test_context_shape() {
        let access = AccessContext::for_user(json!({"id": 3}))
            .with_entity(json!({"id": 9}))
            .with_request("GET", "/tickets/9");
        let ctx = access.to_context();
        assert_eq!(ctx.get("authenticated"), Some(&json!(true)));
        assert_eq!(ctx.get("user"), Some(&json!({"id": 3})));
        assert_eq!(ctx.get("entity"), Some(&json!({"id": 9})));
        let request = ctx.get("request").unwrap();
        assert_eq!(request["method"], "GET");
        assert_eq!(request["path"], "/tickets/9");
        assert!(DateTime::parse_from_rfc3339(request["timestamp"].as_str().unwrap()).is_ok());
    }

    #[test]
    fn test_triggered_workflows() {
        let checker = checker();
        let high = AccessContext::anonymous().with_entity(json!({"priority": "high"}));
        assert_eq!(
            checker.triggered_workflows("Ticket", "updated", &high),
            vec!["escalate", "audit"]
        );

        let low = AccessContext::anonymous().with_entity(json!({"priority": "low"}));
        assert_eq!(checker.triggered_workflows("Ticket", "updated", &low), vec!["audit"]);
        assert!(checker.triggered_workflows("Ticket", "created", &low).is_empty());
    }

    #[test]
    fn test_invalid_rules_are_rejected() {
        let rules = RulesLoader::parse_yaml(
            r#"
entities:
  - name: Ticket
    permissions:
      read: "user.role = 'admin'"
"#,
        )
        .unwrap();
        match PermissionChecker::new(rules) {
            Err(PermitError::InvalidRules(issues)) => assert_eq!(issues.len(), 1),
            other => panic!("Expected InvalidRules, got {:?}", other.map(|_| ())),
        }
    }
}
