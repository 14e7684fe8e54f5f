use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ClientError {
    #[error("{0}")]
    Validation(String),
    #[error("Server error ({status}): {detail}")]
    Server { status: u16, detail: String },
    #[error("{0}")]
    Rejected(String),
}

/// Text shown in the transcript for a failed operation. Transport errors keep
/// their top level description only.
pub fn user_facing(err: &anyhow::Error) -> String {
    if let Some(client_err) = err.downcast_ref::<ClientError>() {
        return client_err.to_string();
    }
    if let Some(req_err) = err.downcast_ref::<reqwest::Error>() {
        if req_err.is_timeout() {
            return "The request timed out".to_string();
        }
        if req_err.is_connect() {
            return "Could not reach the server".to_string();
        }
    }

    return err.to_string();
}
