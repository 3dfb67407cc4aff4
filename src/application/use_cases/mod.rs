pub mod ask;
pub mod file_parser;
pub mod model_catalog;
