//! Resolves a temperature source and instance to a destination path.

use serde_json::Value;
use tracing::{debug, trace};

use crate::config::placeholders;
use crate::mapping::{normalize_code, MappingRule, MappingTable, Selector};
use crate::message::DecodedMessage;

/// A rule applied to one message. Built per message and never cached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedMapping {
    /// Source code substituted into the template
    pub source: String,
    pub instance: u32,
    /// Name of the matching rule
    pub name: Option<String>,
    /// Base path with placeholders substituted
    pub resolved_path: String,
}

impl ResolvedMapping {
    /// Full path of a leaf below the base path.
    pub fn leaf_path(&self, leaf: &str) -> String {
        format!("{}.{}", self.resolved_path, leaf)
    }

    /// Human-readable label: the rule name, or the source code.
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.source)
    }
}

/// Find the first matching rule and instantiate its path template.
///
/// Returns `None` when no rule matches; that is not an error.
pub fn resolve(table: &MappingTable, source: &Value, instance: u32) -> Option<ResolvedMapping> {
    let Some(source) = normalize_code(source) else {
        trace!("Source {} is neither a number nor a name", source);
        return None;
    };

    let Some(rule) = table.find(&source) else {
        trace!("No temperature mapping for source {}", source);
        return None;
    };

    Some(instantiate(rule, &source, instance))
}

/// Resolve the source and instance fields of a decoded message.
pub fn resolve_message(table: &MappingTable, msg: &DecodedMessage) -> Option<ResolvedMapping> {
    match (&msg.source, msg.instance) {
        (Some(source), Some(instance)) => resolve(table, source, instance),
        _ => {
            trace!("Message without source or instance ignored");
            None
        }
    }
}

fn instantiate(rule: &MappingRule, source: &str, instance: u32) -> ResolvedMapping {
    // The wildcard has no code of its own, so it carries the incoming one.
    let source = match &rule.source {
        Selector::Wildcard => source.to_string(),
        Selector::Code(code) => code.clone(),
    };

    let resolved_path = render_path(&rule.path, &source, instance, rule.name.as_deref());

    ResolvedMapping {
        source,
        instance,
        name: rule.name.clone(),
        resolved_path,
    }
}

/// Substitute placeholders in a path template.
///
/// Order is fixed: `${source}`, `${instance}`, `${name}`. A placeholder with
/// no value is left as literal text.
pub fn render_path(template: &str, source: &str, instance: u32, name: Option<&str>) -> String {
    let mut path = template
        .replace(placeholders::SOURCE, source)
        .replace(placeholders::INSTANCE, &instance.to_string());

    if let Some(name) = name {
        path = path.replace(placeholders::NAME, name);
    }

    if path.contains("${") {
        debug!("Unresolved placeholder left in path {}", path);
    }

    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn table(rules: Vec<MappingRule>) -> MappingTable {
        MappingTable::new(rules).unwrap()
    }

    #[test]
    fn test_default_sea_temperature() {
        let resolved = resolve(&MappingTable::defaults(), &json!(0), 2).unwrap();
        assert_eq!(resolved.resolved_path, "environment.water.2");
        assert_eq!(resolved.leaf_path("temperature"), "environment.water.2.temperature");
        assert_eq!(resolved.source, "0");
        assert_eq!(resolved.label(), "Sea Temperature");
    }

    #[test]
    fn test_symbolic_source_matches_by_name() {
        let resolved = resolve(&MappingTable::defaults(), &json!("Sea Temperature"), 2).unwrap();
        assert_eq!(resolved.resolved_path, "environment.water.2");
        assert_eq!(resolved.source, "0");
    }

    #[test]
    fn test_string_numeric_source() {
        let resolved = resolve(&MappingTable::defaults(), &json!("3"), 0).unwrap();
        assert_eq!(resolved.resolved_path, "environment.inside.engineRoom.0");
    }

    #[test]
    fn test_unknown_source_uses_wildcard() {
        let resolved = resolve(&MappingTable::defaults(), &json!(99), 5).unwrap();
        assert_eq!(resolved.resolved_path, "sensors.temperature.99.5");
        assert_eq!(resolved.name, None);
        assert_eq!(resolved.label(), "99");
    }

    #[test]
    fn test_both_spellings_of_code_seven() {
        let defaults = MappingTable::defaults();
        for source in [json!(7), json!("Refrigeration Temperature"), json!("Refridgeration Temperature")] {
            let resolved = resolve(&defaults, &source, 1).unwrap();
            assert_eq!(resolved.resolved_path, "environment.inside.refrigerator.1");
        }
        // First rule for code 7 wins on a numeric source
        let resolved = resolve(&defaults, &json!(7), 1).unwrap();
        assert_eq!(resolved.name.as_deref(), Some("Refrigeration Temperature"));
    }

    #[test]
    fn test_exact_rule_before_wildcard_wins() {
        let t = table(vec![
            MappingRule::new("3", "exact.${instance}"),
            MappingRule::wildcard("wild.${source}"),
        ]);
        assert_eq!(resolve(&t, &json!(3), 1).unwrap().resolved_path, "exact.1");
        assert_eq!(resolve(&t, &json!(4), 1).unwrap().resolved_path, "wild.4");
    }

    #[test]
    fn test_wildcard_first_shadows_everything() {
        let t = table(vec![
            MappingRule::wildcard("wild"),
            MappingRule::new("3", "exact"),
        ]);
        assert_eq!(resolve(&t, &json!(3), 1).unwrap().resolved_path, "wild");
    }

    #[test]
    fn test_no_match_without_wildcard() {
        let t = table(vec![MappingRule::new("0", "water")]);
        assert_eq!(resolve(&t, &json!(1), 0), None);
        assert_eq!(resolve(&t, &json!("Outside Temperature"), 0), None);
    }

    #[test]
    fn test_invalid_source_value() {
        assert_eq!(resolve(&MappingTable::defaults(), &json!(null), 0), None);
        assert_eq!(resolve(&MappingTable::defaults(), &json!([1]), 0), None);
    }

    #[test]
    fn test_resolve_message_requires_source_and_instance() {
        let defaults = MappingTable::defaults();
        let mut msg = DecodedMessage::new(0, 1);
        assert!(resolve_message(&defaults, &msg).is_some());

        msg.instance = None;
        assert!(resolve_message(&defaults, &msg).is_none());

        let msg = DecodedMessage {
            instance: Some(1),
            ..Default::default()
        };
        assert!(resolve_message(&defaults, &msg).is_none());
    }

    #[test]
    fn test_render_replaces_every_occurrence() {
        let path = render_path(
            "${source}.${instance}.${source}.${name}.${instance}",
            "4",
            2,
            Some("cabin"),
        );
        assert_eq!(path, "4.2.4.cabin.2");
    }

    #[test]
    fn test_render_leaves_missing_name_literal() {
        let path = render_path("sensors.${name}.${instance}", "4", 2, None);
        assert_eq!(path, "sensors.${name}.2");
    }

    #[test]
    fn test_name_placeholder_from_rule() {
        let t = table(vec![MappingRule::new("4", "cabin.${name}.${instance}").with_name("main")]);
        assert_eq!(resolve(&t, &json!(4), 0).unwrap().resolved_path, "cabin.main.0");
    }
}
