use omniq_core::error::Error;
use reqwest::StatusCode;

/// Failures of the request layer, i.e. before a stream was handed out.
#[derive(Debug, thiserror::Error)]
pub enum OpenAiError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("OpenAI returned non-success status {status}: {body}")]
    Api { status: StatusCode, body: String },
}

impl OpenAiError {
    /// HTTP status the server answered with, if it answered at all.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            OpenAiError::Api { status, .. } => Some(*status),
            OpenAiError::Http(err) => err.status(),
        }
    }
}

impl From<OpenAiError> for Error {
    fn from(value: OpenAiError) -> Self {
        Error::Request(Box::new(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_maps_to_request_error() {
        let err: Error = OpenAiError::Api {
            status: StatusCode::UNAUTHORIZED,
            body: "{\"error\":\"bad key\"}".into(),
        }
        .into();

        let Error::Request(source) = err else {
            panic!("expected request error");
        };
        let source = source.downcast_ref::<OpenAiError>().unwrap();
        assert_eq!(source.status(), Some(StatusCode::UNAUTHORIZED));
        assert!(source.to_string().contains("401"));
    }
}
