//! Error types for proxy generation.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CodegenError {
    #[error("Method {class}::{method} declares no parameter to delegate with")]
    MissingParameter { class: String, method: String },

    #[error("Failed to write generated code: {0}")]
    Io(#[from] std::io::Error),
}

pub type CodegenResult<T> = Result<T, CodegenError>;

impl CodegenError {
    pub fn missing_parameter(class: &str, method: &str) -> Self {
        Self::MissingParameter {
            class: class.to_string(),
            method: method.to_string(),
        }
    }
}
