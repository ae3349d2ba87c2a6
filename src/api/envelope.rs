use serde::Deserialize;

use super::error::RemoteError;

/// `{ "success": bool, "data": ..., "message": ... }` wrapper used by every endpoint.
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default = "Option::default")]
    pub data: Option<T>,
    #[serde(default)]
    pub message: Option<String>,
}

impl<T> Envelope<T> {
    /// Unwraps `data`, turning an explicit `success: false` into `on_failure(message)`.
    pub fn into_data(
        self,
        on_failure: impl FnOnce(Option<String>) -> RemoteError,
    ) -> Result<T, RemoteError> {
        if self.success == Some(false) {
            return Err(on_failure(self.message));
        }
        self.data
            .ok_or_else(|| RemoteError::Decode("response carries no data".to_string()))
    }
}

/// Best-effort `message` from an error body.
pub fn error_message(body: &str) -> String {
    serde_json::from_str::<Envelope<serde_json::Value>>(body)
        .ok()
        .and_then(|envelope| envelope.message)
        .unwrap_or_else(|| body.trim().chars().take(200).collect())
}
