use std::path::Path;

use crate::error::SignatureError;
use crate::schema::types::{CallFile, SignatureFile};

/// Parse a YAML signature file into a [`SignatureFile`].
///
/// Only the YAML structure is checked here. Type literals are parsed by
/// [`validate_signatures`](crate::schema::validate_signatures).
///
/// # Errors
///
/// Returns [`SignatureError::Io`] if the file cannot be read,
/// or [`SignatureError::Yaml`] if the YAML is malformed.
pub fn parse_signatures(path: &Path) -> Result<SignatureFile, SignatureError> {
    let content = std::fs::read_to_string(path)?;
    parse_signatures_str(&content)
}

/// Parse a YAML signature file from a string.
pub fn parse_signatures_str(yaml: &str) -> Result<SignatureFile, SignatureError> {
    let file: SignatureFile = serde_yaml::from_str(yaml)?;
    Ok(file)
}

/// Parse a YAML file of recorded calls.
///
/// # Errors
///
/// Same as [`parse_signatures`].
pub fn parse_calls(path: &Path) -> Result<CallFile, SignatureError> {
    let content = std::fs::read_to_string(path)?;
    parse_calls_str(&content)
}

pub fn parse_calls_str(yaml: &str) -> Result<CallFile, SignatureError> {
    let file: CallFile = serde_yaml::from_str(yaml)?;
    Ok(file)
}
