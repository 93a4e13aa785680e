use std::{env, time::Duration};

use omniq_core::{
    decoder::DecoderConfig,
    error::{Error, Result},
};
use reqwest::{
    Client as HttpClient,
    header::{AUTHORIZATION, HeaderValue},
};

use crate::client::OpenAiClient;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";
pub const BASE_URL_ENV: &str = "OPENAI_BASE_URL";

const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Builder for [`OpenAiClient`].
///
/// # Typical usage
///
/// ```rust,no_run
/// use omniq_openai::OpenAiClientBuilder;
///
/// let client = OpenAiClientBuilder::new_from_env()
///     .build()
///     .expect("OPENAI_API_KEY must be set");
/// ```
///
/// No total request timeout is set by default: a streamed completion may
/// legitimately run for minutes. Only connecting is bounded.
#[derive(Debug, Default)]
pub struct OpenAiClientBuilder {
    pub(crate) api_key: Option<String>,
    pub(crate) base_url: Option<String>,
    pub(crate) timeout: Option<Duration>,
    pub(crate) decoder: DecoderConfig,
    pub(crate) http: Option<HttpClient>,
}

impl OpenAiClientBuilder {
    /// Create an *empty* builder. Remember to supply an API key manually.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load `OPENAI_API_KEY` and, if present, `OPENAI_BASE_URL` from the
    /// environment.
    ///
    /// Never fails. Missing keys only surface during [`Self::build`].
    pub fn new_from_env() -> Self {
        Self {
            api_key: env::var(API_KEY_ENV).ok(),
            base_url: env::var(BASE_URL_ENV).ok(),
            ..Self::default()
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Point the client at any OpenAI-compatible server.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Upper bound for a whole request, including reading the stream.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_decoder_config(mut self, decoder: DecoderConfig) -> Self {
        self.decoder = decoder;
        self
    }

    /// Use a preconfigured `reqwest::Client` (proxies, custom TLS, …). The
    /// builder's timeout is ignored in that case.
    pub fn with_http_client(mut self, http: HttpClient) -> Self {
        self.http = Some(http);
        self
    }

    /// Finalise the builder.
    ///
    /// # Errors
    ///
    /// * [`Error::InvalidConfig`] – the API key is missing or not a valid
    ///   header value, or the HTTP client could not be built.
    pub fn build(self) -> Result<OpenAiClient> {
        let api_key = self
            .api_key
            .filter(|key| !key.is_empty())
            .ok_or_else(|| Error::InvalidConfig(format!("missing env variable: `{API_KEY_ENV}`")))?;

        let mut auth = HeaderValue::from_str(&format!("Bearer {api_key}"))
            .map_err(|_| Error::InvalidConfig(format!("invalid {AUTHORIZATION} header value")))?;
        auth.set_sensitive(true);

        let http = match self.http {
            Some(http) => http,
            None => {
                let mut builder = HttpClient::builder().connect_timeout(DEFAULT_CONNECT_TIMEOUT);
                if let Some(timeout) = self.timeout {
                    builder = builder.timeout(timeout);
                }
                builder
                    .build()
                    .map_err(|err| Error::InvalidConfig(format!("building reqwest client: {err}")))?
            }
        };

        let base = self
            .base_url
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_owned())
            .trim_end_matches('/')
            .to_owned();

        Ok(OpenAiClient::from_parts(http, auth, base, self.decoder))
    }
}
