pub mod use_cases;

pub use use_cases::ask::AskUseCase;
pub use use_cases::file_parser::FileParser;
pub use use_cases::model_catalog::{GenerativeModel, ModelCatalog};
