use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ShcovError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("\"{}\" does not exist, aborting!", .0.display())]
    NotFound(PathBuf),

    #[error("Invalid path rewrite '{0}': expected ORIGINAL:REPLACEMENT")]
    InvalidRewrite(String),

    #[error("Invalid shell command '{command}': {reason}")]
    InvalidShell { command: String, reason: String },

    #[error("XML write error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ShcovError>;
