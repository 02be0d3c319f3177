//! Terminal prompts, built on `dialoguer`.

use dialoguer::{Confirm, FuzzySelect, Input, MultiSelect, Select, theme::ColorfulTheme};
use serde_json::Value;

use sprout_core::{
    application::{ApplicationError, ports::Prompter},
    domain::{AnswerMap, Question, QuestionKind, render_value},
    error::SproutResult,
};

/// Asks each question on the controlling terminal.
#[derive(Default)]
pub struct TerminalPrompter {
    theme: ColorfulTheme,
}

impl TerminalPrompter {
    pub fn new() -> Self {
        Self::default()
    }

    fn ask(&self, question: &Question) -> Result<Value, dialoguer::Error> {
        let prompt = question.prompt_text();
        let default = question.default.as_ref();

        match question.kind {
            QuestionKind::Text => {
                let mut input = Input::<String>::with_theme(&self.theme)
                    .with_prompt(prompt)
                    .allow_empty(!question.required);
                if let Some(d) = default {
                    input = input.default(render_value(d));
                }
                Ok(Value::String(input.interact_text()?))
            }
            QuestionKind::Number => {
                let mut input = Input::<f64>::with_theme(&self.theme).with_prompt(prompt);
                if let Some(d) = default.and_then(Value::as_f64) {
                    input = input.default(d);
                }
                let n = input.interact_text()?;
                Ok(number_value(n))
            }
            QuestionKind::Confirm => {
                let answer = Confirm::with_theme(&self.theme)
                    .with_prompt(prompt)
                    .default(default.and_then(Value::as_bool).unwrap_or(false))
                    .interact()?;
                Ok(Value::Bool(answer))
            }
            QuestionKind::List => {
                let index = Select::with_theme(&self.theme)
                    .with_prompt(prompt)
                    .items(&question.options)
                    .default(default_index(question))
                    .interact()?;
                Ok(Value::String(question.options[index].clone()))
            }
            QuestionKind::Autocomplete => {
                let index = FuzzySelect::with_theme(&self.theme)
                    .with_prompt(prompt)
                    .items(&question.options)
                    .default(default_index(question))
                    .interact()?;
                Ok(Value::String(question.options[index].clone()))
            }
            QuestionKind::Checkbox => {
                let checked = default_selection(question);
                let indices = MultiSelect::with_theme(&self.theme)
                    .with_prompt(prompt)
                    .items(&question.options)
                    .defaults(&checked)
                    .interact()?;
                Ok(Value::Array(
                    indices
                        .into_iter()
                        .map(|i| Value::String(question.options[i].clone()))
                        .collect(),
                ))
            }
        }
    }
}

impl Prompter for TerminalPrompter {
    fn prompt(&self, initial: &AnswerMap, questions: &[Question]) -> SproutResult<AnswerMap> {
        let mut answers = initial.clone();
        for question in questions {
            if question.options.is_empty()
                && matches!(
                    question.kind,
                    QuestionKind::List | QuestionKind::Checkbox | QuestionKind::Autocomplete
                )
            {
                return Err(ApplicationError::PromptFailed {
                    reason: format!("question '{}' has no options", question.name),
                }
                .into());
            }

            let value = self.ask(question).map_err(|e| ApplicationError::PromptFailed {
                reason: e.to_string(),
            })?;
            answers.insert(question.name.clone(), value);
        }
        Ok(answers)
    }
}

/// Let the user pick one of `names`.
pub fn select_template(names: &[String]) -> SproutResult<String> {
    let index = Select::with_theme(&ColorfulTheme::default())
        .with_prompt("Select a template")
        .items(names)
        .default(0)
        .interact()
        .map_err(|e| ApplicationError::PromptFailed {
            reason: e.to_string(),
        })?;
    Ok(names[index].clone())
}

/// Integral numbers stay integers in the answer map.
fn number_value(n: f64) -> Value {
    if n.fract() == 0.0 && n.abs() < i64::MAX as f64 {
        Value::from(n as i64)
    } else {
        Value::from(n)
    }
}

fn default_index(question: &Question) -> usize {
    question
        .default
        .as_ref()
        .map(render_value)
        .and_then(|d| question.options.iter().position(|o| *o == d))
        .unwrap_or(0)
}

fn default_selection(question: &Question) -> Vec<bool> {
    let chosen: Vec<String> = match &question.default {
        Some(Value::Array(items)) => items.iter().map(render_value).collect(),
        Some(other) => vec![render_value(other)],
        None => Vec::new(),
    };
    question
        .options
        .iter()
        .map(|o| chosen.contains(o))
        .collect()
}
