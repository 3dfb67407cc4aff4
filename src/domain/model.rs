use serde::{Deserialize, Serialize};

/// A selectable remote model as reported by the models endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelDescriptor {
    /// Full resource name, e.g. `models/gemini-1.5-flash-latest`
    pub name: String,

    #[serde(default)]
    pub display_name: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub input_token_limit: Option<u64>,

    #[serde(default)]
    pub output_token_limit: Option<u64>,

    #[serde(default)]
    pub supported_generation_methods: Vec<String>,
}

impl ModelDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            display_name: None,
            description: None,
            input_token_limit: None,
            output_token_limit: None,
            supported_generation_methods: Vec::new(),
        }
    }

    /// Name without the `models/` resource prefix
    pub fn short_name(&self) -> &str {
        self.name.strip_prefix("models/").unwrap_or(&self.name)
    }

    pub fn supports_generate_content(&self) -> bool {
        self.supported_generation_methods
            .iter()
            .any(|m| m == "generateContent")
    }
}

/// Normalise a user-supplied model name to its `models/...` resource form.
pub fn normalize_model_name(name: &str) -> String {
    let trimmed = name.trim();
    if trimmed.starts_with("models/") || trimmed.starts_with("tunedModels/") {
        trimmed.to_string()
    } else {
        format!("models/{}", trimmed)
    }
}
