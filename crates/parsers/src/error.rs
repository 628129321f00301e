use thiserror::Error;

pub type Result<T> = std::result::Result<T, ParserError>;

#[derive(Error, Debug)]
pub enum ParserError {
    #[error("Failed to configure tree-sitter language: {0}")]
    LanguageError(#[from] tree_sitter::LanguageError),

    #[error("Failed to parse {0}")]
    ParseFailed(String),
}
