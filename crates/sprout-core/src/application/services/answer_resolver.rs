//! Answer resolution: supplied answers, defaults and prompts reconciled
//! against the variables a template declares.

use serde_json::Value;
use tracing::{debug, info, instrument};

use crate::{
    application::{ApplicationError, ports::Prompter},
    domain::{
        AnswerMap, DefaultResolverRegistry, DomainError, ExtractedVariables, Question,
        answers::{expand_for_variables, prepopulate},
    },
    error::SproutResult,
};

pub struct AnswerResolver {
    prompter: Option<Box<dyn Prompter>>,
    defaults: DefaultResolverRegistry,
}

impl AnswerResolver {
    /// Resolver without a prompter; interactive resolution fails with
    /// `AdapterNotConfigured` if anything is left to ask.
    pub fn new(defaults: DefaultResolverRegistry) -> Self {
        Self {
            prompter: None,
            defaults,
        }
    }

    pub fn with_prompter(mut self, prompter: Box<dyn Prompter>) -> Self {
        self.prompter = Some(prompter);
        self
    }

    pub fn defaults(&self) -> &DefaultResolverRegistry {
        &self.defaults
    }

    /// Questions for `extracted`, with `defaultFrom` keys resolved.
    pub fn generate_questions(&self, extracted: &ExtractedVariables) -> Vec<Question> {
        let mut questions = extracted.questions();
        for question in &mut questions {
            if question.default.is_some() {
                continue;
            }
            let Some(key) = question.default_from.as_deref() else {
                continue;
            };
            match self.defaults.resolve(key) {
                Some(value) => question.default = Some(Value::String(value)),
                None => debug!(question = %question.name, key, "No default from resolver"),
            }
        }
        questions
    }

    /// Produce a value for every variable of `extracted` that can get one.
    ///
    /// Fails with `MissingRequiredAnswers` naming every required question
    /// left without a value.
    #[instrument(skip_all, fields(supplied = supplied.len(), interactive = interactive))]
    pub fn resolve(
        &self,
        extracted: &ExtractedVariables,
        supplied: &AnswerMap,
        interactive: bool,
    ) -> SproutResult<AnswerMap> {
        let questions = self.generate_questions(extracted);
        if questions.is_empty() {
            return Ok(supplied.clone());
        }

        let mut resolved = prepopulate(supplied, &questions);

        let unanswered: Vec<Question> = questions
            .iter()
            .filter(|q| !resolved.has_value(&q.name))
            .cloned()
            .collect();

        if !unanswered.is_empty() {
            if interactive {
                let prompter = self
                    .prompter
                    .as_ref()
                    .ok_or(ApplicationError::AdapterNotConfigured { name: "prompter" })?;
                info!(count = unanswered.len(), "Prompting for missing answers");
                let given = prompter.prompt(&resolved, &unanswered)?;
                resolved.merge(&given);
            } else {
                for q in &unanswered {
                    if let Some(default) = &q.default {
                        resolved.insert(q.name.clone(), default.clone());
                    }
                }
            }
        }

        let missing: Vec<String> = questions
            .iter()
            .filter(|q| q.required && !resolved.has_value(&q.name))
            .map(|q| q.name.clone())
            .collect();
        if !missing.is_empty() {
            return Err(DomainError::MissingRequiredAnswers { names: missing }.into());
        }

        let mut merged = supplied.clone();
        merged.merge(&resolved);
        let variables = extracted.variable_names();
        Ok(expand_for_variables(
            &merged,
            variables.iter().map(String::as_str),
        ))
    }
}
