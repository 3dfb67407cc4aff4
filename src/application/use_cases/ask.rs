use tracing::{debug, warn};

use crate::application::use_cases::model_catalog::GenerativeModel;
use crate::domain::error::Result;
use crate::domain::prompt::PromptTemplate;
use crate::domain::table::DataFrame;
use crate::infrastructure::response::clean_llm_response;
use crate::shared::token_counter::TokenCounter;

/// Ask a question about a table preview.
pub struct AskUseCase {
    template: PromptTemplate,
    preview_rows: usize,
}

impl Default for AskUseCase {
    fn default() -> Self {
        Self::new(PromptTemplate::default(), 10)
    }
}

impl AskUseCase {
    pub fn new(template: PromptTemplate, preview_rows: usize) -> Self {
        Self {
            template,
            preview_rows,
        }
    }

    /// Prompt text sent for `question`: the template filled with the first
    /// `preview_rows` rows rendered as markdown.
    pub fn build_prompt(&self, frame: &DataFrame, question: &str) -> Result<String> {
        let table = frame.head(self.preview_rows).to_markdown();
        self.template.render(question, &table)
    }

    pub async fn execute(
        &self,
        model: &GenerativeModel,
        frame: &DataFrame,
        question: &str,
    ) -> Result<String> {
        let prompt = self.build_prompt(frame, question)?;

        let estimated_tokens = TokenCounter::estimate_tokens(&prompt);
        debug!(
            model = model.name(),
            preview_rows = self.preview_rows.min(frame.num_rows()),
            estimated_tokens,
            "Built prompt"
        );
        if !TokenCounter::fits(&prompt, model.descriptor().input_token_limit) {
            warn!(
                model = model.name(),
                estimated_tokens,
                "Prompt may exceed the model input limit"
            );
        }

        let raw_result = model.generate_content(&prompt).await?;
        Ok(clean_llm_response(&raw_result))
    }
}
