use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::placeholder::PLACEHOLDER_BOUNDARY;

/// How a question should be asked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionKind {
    #[default]
    Text,
    Number,
    Confirm,
    List,
    Checkbox,
    Autocomplete,
}

/// One question, either declared in a template manifest or synthesized for a
/// discovered placeholder.
///
/// Field names follow the manifest format (`defaultFrom` in camelCase).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub name: String,

    #[serde(rename = "type", default)]
    pub kind: QuestionKind,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(default)]
    pub required: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,

    /// Key into the default resolver registry, e.g. `git.user.name`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_from: Option<String>,

    /// Choices for `list`, `checkbox` and `autocomplete`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
}

impl Question {
    /// Required free-text question for a placeholder with no manifest entry.
    pub fn synthesized(variable: impl Into<String>) -> Self {
        let name = variable.into();
        Self {
            message: Some(format!("Enter value for {name}:")),
            name,
            kind: QuestionKind::Text,
            required: true,
            default: None,
            default_from: None,
            options: Vec::new(),
        }
    }

    /// Text shown to the user.
    pub fn prompt_text(&self) -> String {
        self.message
            .clone()
            .unwrap_or_else(|| format!("Enter value for {}:", self.name))
    }
}

/// Contents of a template's `.questions.json` / `.questions.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuestionManifest {
    pub questions: Vec<Question>,
}

impl QuestionManifest {
    pub fn new(questions: Vec<Question>) -> Self {
        Self { questions }
    }

    /// Names of all declared questions with placeholder markers stripped.
    pub fn variable_names(&self) -> impl Iterator<Item = String> + '_ {
        self.questions
            .iter()
            .map(|q| normalize_question_name(&q.name))
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}

/// Strip placeholder markers from a manifest question name.
///
/// Manifest authors may write `____projectName____` or `__projectName__`;
/// both refer to the variable `projectName`.
pub fn normalize_question_name(name: &str) -> String {
    for marker in [PLACEHOLDER_BOUNDARY, "__"] {
        if name.len() > 2 * marker.len() && name.starts_with(marker) && name.ends_with(marker) {
            return name[marker.len()..name.len() - marker.len()].to_owned();
        }
    }
    name.to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_full_boundary() {
        assert_eq!(normalize_question_name("____projectName____"), "projectName");
    }

    #[test]
    fn strips_short_boundary() {
        assert_eq!(normalize_question_name("__author__"), "author");
    }

    #[test]
    fn leaves_plain_names() {
        assert_eq!(normalize_question_name("license"), "license");
        assert_eq!(normalize_question_name("__half"), "__half");
    }

    #[test]
    fn bare_markers_are_not_stripped_to_nothing() {
        assert_eq!(normalize_question_name("________"), "________");
        assert_eq!(normalize_question_name("____"), "____");
    }

    #[test]
    fn kind_defaults_to_text_when_missing() {
        let q: Question = serde_json::from_str(r#"{"name": "x"}"#).unwrap();
        assert_eq!(q.kind, QuestionKind::Text);
        assert!(!q.required);
    }

    #[test]
    fn parses_manifest_fields() {
        let q: Question = serde_json::from_str(
            r#"{"name": "license", "type": "list", "message": "License?",
                "options": ["MIT", "Apache-2.0"], "default": "MIT",
                "defaultFrom": "git.user.name", "required": true}"#,
        )
        .unwrap();
        assert_eq!(q.kind, QuestionKind::List);
        assert_eq!(q.options, vec!["MIT", "Apache-2.0"]);
        assert_eq!(q.default, Some(Value::from("MIT")));
        assert_eq!(q.default_from.as_deref(), Some("git.user.name"));
        assert!(q.required);
    }

    #[test]
    fn synthesized_question_is_required_text() {
        let q = Question::synthesized("moduleName");
        assert!(q.required);
        assert_eq!(q.kind, QuestionKind::Text);
        assert_eq!(q.prompt_text(), "Enter value for moduleName:");
    }
}
