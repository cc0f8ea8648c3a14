//! Rules loader - YAML file loading and parsing
//!
//! JSON documents load too, since YAML is a superset of JSON.

use super::types::RuleSet;
use crate::error::PermitError;
use std::fs;
use std::path::Path;

/// Loads rule sets from YAML files
pub struct RulesLoader;

impl RulesLoader {
    pub fn new() -> Self {
        Self
    }

    /// Load a rule set from a YAML file
    pub fn load_rules<P: AsRef<Path>>(&self, path: P) -> Result<RuleSet, PermitError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(PermitError::RulesNotFound(path.display().to_string()));
        }
        let content = fs::read_to_string(path)?;
        let rules = Self::parse_yaml(&content)?;
        log::info!(
            "Loaded {} entities and {} workflows from {}",
            rules.entities.len(),
            rules.workflows.len(),
            path.display()
        );
        Ok(rules)
    }

    /// Parse a rule set from a YAML string
    pub fn parse_yaml(content: &str) -> Result<RuleSet, PermitError> {
        let rules: RuleSet = serde_yaml::from_str(content)?;
        Ok(rules)
    }
}

impl Default for RulesLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::types::PermissionRule;

    #[test]
    fn test_parse_entities() {
        let yaml = r#"
name: helpdesk
entities:
  - name: Ticket
    description: "Support ticket"
    permissions:
      read: "authenticated"
      update: "user.role == 'admin' || user.id == entity.ownerId"
      delete: false
"#;
        let rules = RulesLoader::parse_yaml(yaml).unwrap();
        assert_eq!(rules.name.as_deref(), Some("helpdesk"));
        assert_eq!(rules.entities.len(), 1);
        assert!(rules.workflows.is_empty());

        let ticket = &rules.entities[0];
        assert_eq!(ticket.name, "Ticket");
        assert_eq!(
            ticket.permission("read"),
            Some(&PermissionRule::Expression("authenticated".to_string()))
        );
        assert_eq!(ticket.permission("delete"), Some(&PermissionRule::Always(false)));
    }

    #[test]
    fn test_parse_workflows() {
        let yaml = r#"
workflows:
  - name: escalate
    trigger:
      event: updated
      entity: Ticket
      condition: "entity.priority == 'high'"
  - name: audit
    trigger:
      event: deleted
"#;
        let rules = RulesLoader::parse_yaml(yaml).unwrap();
        assert_eq!(rules.workflows.len(), 2);

        let escalate = &rules.workflows[0];
        assert_eq!(escalate.trigger.event, "updated");
        assert_eq!(escalate.trigger.entity.as_deref(), Some("Ticket"));
        assert_eq!(
            escalate.trigger.condition.as_deref(),
            Some("entity.priority == 'high'")
        );

        let audit = &rules.workflows[1];
        assert!(audit.trigger.entity.is_none());
        assert!(audit.trigger.condition.is_none());
    }

    #[test]
    fn test_parse_json_document() {
        let json = r#"{"entities": [{"name": "Note", "permissions": {"read": true}}]}"#;
        let rules = RulesLoader::parse_yaml(json).unwrap();
        assert_eq!(rules.entities[0].permission("read"), Some(&PermissionRule::Always(true)));
    }

    #[test]
    fn test_empty_document_is_empty_rule_set() {
        let rules = RulesLoader::parse_yaml("{}").unwrap();
        assert!(rules.entities.is_empty());
        assert!(rules.workflows.is_empty());
    }

    #[test]
    fn test_invalid_yaml_returns_error() {
        let yaml = r#"
entities:
  - name:
      - invalid structure
"#;
        let result = RulesLoader::parse_yaml(yaml);
        assert!(matches!(result, Err(PermitError::Yaml(_))));
    }

    #[test]
    fn test_missing_file() {
        let result = RulesLoader::new().load_rules("definitely/not/here.yaml");
        assert!(matches!(result, Err(PermitError::RulesNotFound(_))));
    }
}
