// Command module - templates, substitution, and tokenization

pub mod catalog;
pub mod template;
pub mod tokenize;

pub use catalog::CommandCatalog;
pub use template::VariableSet;
pub use tokenize::tokenize;
