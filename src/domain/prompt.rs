use serde::{Deserialize, Serialize};

use crate::domain::error::{AppError, Result};

pub const DEFAULT_PROMPT_TEMPLATE: &str = "You are given this table of data as a dataframe. {question}\n\n{table}";

/// Prompt template with `{question}` and `{table}` placeholders
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PromptTemplate(String);

impl Default for PromptTemplate {
    fn default() -> Self {
        Self(DEFAULT_PROMPT_TEMPLATE.to_string())
    }
}

impl PromptTemplate {
    pub fn new(template: impl Into<String>) -> Result<Self> {
        let template = template.into();
        if !template.contains("{table}") {
            return Err(AppError::ValidationError(
                "Prompt template must contain a {table} placeholder".to_string(),
            ));
        }
        Ok(Self(template))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn render(&self, question: &str, table: &str) -> Result<String> {
        let question = question.trim();
        if question.is_empty() {
            return Err(AppError::ValidationError("Question is empty".to_string()));
        }

        Ok(self
            .0
            .replace("{question}", question)
            .replace("{table}", table))
    }
}
