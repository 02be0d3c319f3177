use crate::domain::entities::question::{Question, QuestionManifest, normalize_question_name};
use crate::domain::placeholder::ReplacerSet;

/// Root-level manifest file names, in lookup order.
pub const MANIFEST_FILES: &[&str] = &[".questions.json", ".questions.toml"];

/// Script manifest that is recognized but never evaluated.
pub const SCRIPT_MANIFEST_FILE: &str = ".questions.js";

/// Whether a template-relative path is a root manifest file.
///
/// Only the template root counts; a `.questions.json` deeper in the tree is
/// an ordinary file.
pub fn is_root_manifest(relative: &str) -> bool {
    relative == SCRIPT_MANIFEST_FILE || MANIFEST_FILES.contains(&relative)
}

/// Everything discovered in a template tree.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractedVariables {
    /// Variables found in relative paths.
    pub file_replacers: ReplacerSet,
    /// Variables found in file bodies.
    pub content_replacers: ReplacerSet,
    pub manifest: Option<QuestionManifest>,
}

impl ExtractedVariables {
    /// Every known variable name: path variables, body variables, then
    /// manifest names with markers stripped. No duplicates.
    pub fn variable_names(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        let mut push = |name: String| {
            if !names.contains(&name) {
                names.push(name);
            }
        };

        for v in self.file_replacers.variables() {
            push(v.to_owned());
        }
        for v in self.content_replacers.variables() {
            push(v.to_owned());
        }
        if let Some(manifest) = &self.manifest {
            for v in manifest.variable_names() {
                push(v);
            }
        }
        names
    }

    /// Questions to ask, in order: manifest questions (names normalized),
    /// then one synthesized question per path variable and per body
    /// variable not already covered.
    pub fn questions(&self) -> Vec<Question> {
        let mut questions = Vec::new();
        let mut asked: Vec<String> = Vec::new();

        if let Some(manifest) = &self.manifest {
            for q in &manifest.questions {
                let mut q = q.clone();
                q.name = normalize_question_name(&q.name);
                asked.push(q.name.clone());
                questions.push(q);
            }
        }

        let discovered = self
            .file_replacers
            .variables()
            .chain(self.content_replacers.variables());
        for variable in discovered {
            if asked.iter().any(|a| a == variable) {
                continue;
            }
            asked.push(variable.to_owned());
            questions.push(Question::synthesized(variable));
        }

        questions
    }

    pub fn is_empty(&self) -> bool {
        self.file_replacers.is_empty()
            && self.content_replacers.is_empty()
            && self.manifest.as_ref().is_none_or(QuestionManifest::is_empty)
    }
}
