//! Question manifest loading.
//!
//! `.questions.json` is tried first, then `.questions.toml`. A manifest that
//! cannot be read or parsed is skipped with a warning and the next form is
//! tried. `.questions.js` is recognized but never executed.

use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use sprout_core::domain::{DomainError, QuestionManifest, SCRIPT_MANIFEST_FILE};

const JSON_MANIFEST: &str = ".questions.json";
const TOML_MANIFEST: &str = ".questions.toml";

/// The manifest at the root of `template_root`, if any usable one exists.
pub fn load_manifest(template_root: &Path) -> Option<QuestionManifest> {
    let json = template_root.join(JSON_MANIFEST);
    if json.is_file() {
        match read_manifest(&json, |raw| {
            serde_json::from_str::<serde_json::Value>(raw)
                .map_err(|e| e.to_string())
                .and_then(|value| {
                    if value.get("questions").is_some_and(|q| q.is_array()) {
                        from_json_value(value)
                    } else {
                        Err("expected an object with a \"questions\" array".into())
                    }
                })
        }) {
            Ok(manifest) => return Some(manifest),
            Err(e) => warn!(file = JSON_MANIFEST, error = %e, "Failed to parse question manifest"),
        }
    }

    let toml_path = template_root.join(TOML_MANIFEST);
    if toml_path.is_file() {
        match read_manifest(&toml_path, |raw| {
            toml::from_str::<QuestionManifest>(raw).map_err(|e| e.to_string())
        }) {
            Ok(manifest) => return Some(manifest),
            Err(e) => warn!(file = TOML_MANIFEST, error = %e, "Failed to parse question manifest"),
        }
    }

    if template_root.join(SCRIPT_MANIFEST_FILE).is_file() {
        warn!(
            file = SCRIPT_MANIFEST_FILE,
            "Script manifests cannot be evaluated; use .questions.json or .questions.toml"
        );
    }

    None
}

fn read_manifest(
    path: &Path,
    parse: impl FnOnce(&str) -> Result<QuestionManifest, String>,
) -> Result<QuestionManifest, DomainError> {
    let raw = fs::read_to_string(path).map_err(|e| DomainError::InvalidManifest(e.to_string()))?;
    let manifest = parse(&raw).map_err(DomainError::InvalidManifest)?;
    debug!(path = %path.display(), questions = manifest.len(), "Loaded question manifest");
    Ok(manifest)
}

fn from_json_value<T: DeserializeOwned>(value: serde_json::Value) -> Result<T, String> {
    serde_json::from_value(value).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sprout_core::domain::QuestionKind;
    use tempfile::TempDir;

    #[test]
    fn loads_json_manifest_with_default_type() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join(".questions.json"),
            r#"{"questions": [{"name": "____author____", "message": "Author?"},
                              {"name": "license", "type": "list", "options": ["MIT"]}]}"#,
        )
        .unwrap();

        let manifest = load_manifest(temp.path()).unwrap();
        assert_eq!(manifest.len(), 2);
        assert_eq!(manifest.questions[0].kind, QuestionKind::Text);
        assert_eq!(manifest.questions[1].kind, QuestionKind::List);
    }

    #[test]
    fn loads_toml_manifest() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join(".questions.toml"),
            r#"
[[questions]]
name = "projectName"
required = true

[[questions]]
name = "year"
defaultFrom = "date.year"
"#,
        )
        .unwrap();

        let manifest = load_manifest(temp.path()).unwrap();
        assert_eq!(manifest.len(), 2);
        assert!(manifest.questions[0].required);
        assert_eq!(manifest.questions[1].default_from.as_deref(), Some("date.year"));
    }

    #[test]
    fn json_wins_over_toml() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(".questions.json"), r#"{"questions": [{"name": "fromJson"}]}"#).unwrap();
        fs::write(temp.path().join(".questions.toml"), "[[questions]]\nname = \"fromToml\"\n").unwrap();

        let manifest = load_manifest(temp.path()).unwrap();
        assert_eq!(manifest.questions[0].name, "fromJson");
    }

    #[test]
    fn malformed_json_is_absent() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(".questions.json"), "{ not json").unwrap();
        assert!(load_manifest(temp.path()).is_none());
    }

    #[test]
    fn json_without_questions_array_is_absent() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(".questions.json"), r#"{"questions": "nope"}"#).unwrap();
        assert!(load_manifest(temp.path()).is_none());
    }

    #[test]
    fn malformed_json_falls_back_to_toml() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(".questions.json"), "[]").unwrap();
        fs::write(temp.path().join(".questions.toml"), "[[questions]]\nname = \"x\"\n").unwrap();
        assert_eq!(load_manifest(temp.path()).unwrap().questions[0].name, "x");
    }

    #[test]
    fn script_manifest_is_not_loaded() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(".questions.js"), "module.exports = {questions: []}").unwrap();
        assert!(load_manifest(temp.path()).is_none());
    }
}
