use thiserror::Error;

#[derive(Error, Debug)]
pub enum TweaksError {
    #[error("Template syntax error on line {line}: {message}")]
    TemplateSyntax { line: usize, message: String },

    #[error("Template error: {0}")]
    Template(#[from] minijinja::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Form error: {0}")]
    Form(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("{0} template(s) failed to compile")]
    CheckFailed(usize),
}

pub type Result<T> = std::result::Result<T, TweaksError>;
