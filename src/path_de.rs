use serde::de::DeserializeOwned;
use serde_json::Value;

/// Decode failure with the JSON path where it happened.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("at JSON path {path} → {message}")]
pub struct DecodeError {
    pub path: String,
    pub message: String,
}

impl<E: std::fmt::Display> From<serde_path_to_error::Error<E>> for DecodeError {
    fn from(err: serde_path_to_error::Error<E>) -> Self {
        let path = err.path().to_string();
        DecodeError { path, message: err.into_inner().to_string() }
    }
}

/// Deserialize with JSON-path context in error messages.
pub fn from_str_with_path<T: DeserializeOwned>(src: &str) -> Result<T, DecodeError> {
    let de = &mut serde_json::Deserializer::from_str(src);
    Ok(serde_path_to_error::deserialize::<_, T>(de)?)
}

/// Same as [`from_str_with_path`] for an already-parsed document.
pub fn from_value_with_path<T: DeserializeOwned>(value: Value) -> Result<T, DecodeError> {
    Ok(serde_path_to_error::deserialize::<_, T>(value)?)
}
