pub mod error;
pub mod llm_config;
pub mod model;
pub mod prompt;

// Tabular dataset loaded from archive entries
pub mod table;
