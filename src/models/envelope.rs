use serde::Deserialize;

/// Response wrapper used by every backend endpoint.
///
/// The backend reports failure both through HTTP status codes and through
/// a falsy `status` flag in an otherwise-200 body, so callers must check
/// both before touching `data`.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    pub status: bool,
    #[serde(default)]
    pub message: Option<String>,
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    /// Extract the payload, or the server-supplied message on a falsy envelope.
    pub fn into_data(self) -> Result<T, String> {
        if self.status {
            self.data
                .ok_or_else(|| "Response envelope missing data".to_string())
        } else {
            Err(self
                .message
                .unwrap_or_else(|| "Request rejected by server".to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_success() {
        let json = r#"{"status": true, "data": [1, 2, 3]}"#;
        let env: Envelope<Vec<i64>> = serde_json::from_str(json).unwrap();
        assert_eq!(env.into_data().unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn test_envelope_failure_carries_message() {
        let json = r#"{"status": false, "message": "Invalid credentials"}"#;
        let env: Envelope<Vec<i64>> = serde_json::from_str(json).unwrap();
        assert_eq!(env.into_data().unwrap_err(), "Invalid credentials");
    }

    #[test]
    fn test_envelope_failure_without_message() {
        let json = r#"{"status": false}"#;
        let env: Envelope<Vec<i64>> = serde_json::from_str(json).unwrap();
        assert!(env.into_data().is_err());
    }
}
