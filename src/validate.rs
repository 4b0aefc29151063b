use std::{fmt, sync::LazyLock};

use anyhow::{Context, Result};
use jsonschema::{Validator, validator_for};
use regex::Regex;
use serde_json::Value;

use crate::document::SiteDocument;

const LINK_FIELDS: &[&str] = &["href", "ctaHref", "buttonHref"];

static LINK_TARGET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:/[^\s]*|#[^\s]*|https?://[^\s/]+[^\s]*|mailto:[^\s@]+@[^\s]+|tel:\+?[0-9 ()-]+)$")
        .expect("link target pattern is valid")
});

/// One problem found when checking a document before it is saved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    pub pointer: String,
    pub message: String,
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pointer = if self.pointer.is_empty() {
            "<root>"
        } else {
            &self.pointer
        };
        write!(f, "{pointer}: {}", self.message)
    }
}

impl std::error::Error for ValidationIssue {}

/// JSON Schema of a site document, generated from the Rust types.
pub fn site_schema() -> Value {
    serde_json::to_value(schemars::schema_for!(SiteDocument)).unwrap_or_default()
}

pub fn site_validator() -> Result<Validator> {
    validator_for(&site_schema()).context("failed to compile site document schema")
}

/// Checks the structure against the schema, then lints every link target.
pub fn validate_document(validator: &Validator, value: &Value) -> Vec<ValidationIssue> {
    let mut issues: Vec<ValidationIssue> = validator
        .iter_errors(value)
        .map(|error| ValidationIssue {
            pointer: error.instance_path.to_string(),
            message: error.to_string(),
        })
        .collect();
    lint_links(value, String::new(), &mut issues);
    issues
}

fn lint_links(value: &Value, pointer: String, issues: &mut Vec<ValidationIssue>) {
    match value {
        Value::Object(map) => {
            for (name, child) in map {
                let child_pointer = format!("{pointer}/{}", escape_token(name));
                if LINK_FIELDS.contains(&name.as_str())
                    && let Value::String(target) = child
                    && !LINK_TARGET.is_match(target)
                {
                    issues.push(ValidationIssue {
                        pointer: child_pointer,
                        message: format!("'{target}' is not a route, anchor or URL"),
                    });
                    continue;
                }
                lint_links(child, child_pointer, issues);
            }
        }
        Value::Array(items) => {
            for (index, child) in items.iter().enumerate() {
                lint_links(child, format!("{pointer}/{index}"), issues);
            }
        }
        _ => {}
    }
}

fn escape_token(token: &str) -> String {
    token.replace('~', "~0").replace('/', "~1")
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn check(value: &Value) -> Vec<ValidationIssue> {
        let validator = site_validator().expect("schema compiles");
        validate_document(&validator, value)
    }

    #[test]
    fn accepts_a_complete_document() {
        let doc = json!({
            "headerNav": [
                {"label": "Jobs", "href": "/jobs", "subItems": [
                    {"label": "Remote", "href": "/jobs?remote=1"}
                ]},
                {"label": "Blog", "href": "https://example.com/blog"}
            ],
            "blocks": [
                {"type": "hero", "headline": "Hire faster", "ctaLabel": "Start", "ctaHref": "#signup"},
                {"type": "faq", "title": "FAQ", "items": [{"question": "Cost?", "answer": "Free"}]}
            ],
            "footer": [
                {"title": "Contact", "links": [{"label": "Email", "href": "mailto:team@example.com"}]}
            ]
        });
        assert_eq!(check(&doc), Vec::new());
    }

    #[test]
    fn reports_schema_violations_with_pointers() {
        let doc = json!({"headerNav": [{"label": "Jobs"}]});
        let issues = check(&doc);
        assert!(
            issues.iter().any(|issue| issue.pointer == "/headerNav/0"),
            "missing href should be reported at the item: {issues:?}"
        );
    }

    #[test]
    fn lints_link_targets() {
        let doc = json!({
            "footer": [{"title": "Links", "links": [{"label": "Bad", "href": "not a url"}]}]
        });
        let issues = check(&doc);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].pointer, "/footer/0/links/0/href");
        assert!(issues[0].to_string().contains("not a url"));
    }

    #[test]
    fn unknown_block_types_fail_validation() {
        let doc = json!({"blocks": [{"type": "carousel"}]});
        assert!(!check(&doc).is_empty());
    }

    #[test]
    fn root_issues_display_a_placeholder_pointer() {
        let issue = ValidationIssue {
            pointer: String::new(),
            message: "expected object".to_string(),
        };
        assert_eq!(issue.to_string(), "<root>: expected object");
    }
}
