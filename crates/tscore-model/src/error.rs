use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ModelError {
    #[error("pseudocount must be a positive finite number, got {0}")]
    InvalidPseudocount(String),
    #[error("parameter '{key}' must be an integer, got '{value}'")]
    InvalidInteger { key: String, value: String },
}

pub type Result<T> = std::result::Result<T, ModelError>;
