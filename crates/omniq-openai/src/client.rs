use omniq_core::{
    connection::StreamConnection,
    decoder::{DecoderConfig, StreamDecoder},
    error::Result,
    sequence::ChunkSequence,
};
use reqwest::{
    Client as HttpClient, Response,
    header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue},
};

use crate::{
    api_v1::ChatCompletionRequest, config::OpenAiClientBuilder, error::OpenAiError,
    parser::OpenAiChunkParser,
};

/// HTTP client for the *streaming* side of OpenAI’s `chat/completions`
/// endpoint.
///
/// * One request ▶ one [`ChunkSequence`] owning the response body.
/// * Shares a single `reqwest::Client`, so cloning `OpenAiClient` is cheap.
#[derive(Clone)]
pub struct OpenAiClient {
    http: HttpClient,
    auth: HeaderValue,
    base: String,
    decoder: DecoderConfig,
}

impl OpenAiClient {
    pub fn builder() -> OpenAiClientBuilder {
        OpenAiClientBuilder::new()
    }

    /// Shorthand for `OpenAiClientBuilder::new_from_env().build()`.
    pub fn from_env() -> Result<Self> {
        OpenAiClientBuilder::new_from_env().build()
    }

    pub(crate) fn from_parts(
        http: HttpClient,
        auth: HeaderValue,
        base: String,
        decoder: DecoderConfig,
    ) -> Self {
        Self {
            http,
            auth,
            base,
            decoder,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base
    }

    pub fn decoder_config(&self) -> &DecoderConfig {
        &self.decoder
    }

    /// Start a **streaming** chat completion.
    ///
    /// The `stream` flag is forced on. Once the server accepted the request
    /// the returned [`ChunkSequence`] exclusively owns the response body.
    ///
    /// # Errors
    ///
    /// [`omniq_core::Error::Request`] if the request could not be sent or the
    /// server answered with a non-success status. Nothing is left open in
    /// that case.
    pub async fn chat_completions_create(
        &self,
        mut request: ChatCompletionRequest,
    ) -> Result<ChunkSequence> {
        request.stream = Some(true);

        let resp = self.open_stream(&request).await?;
        let decoder = StreamDecoder::new(self.decoder.clone(), OpenAiChunkParser);

        Ok(ChunkSequence::new(
            StreamConnection::new(resp.bytes_stream()),
            decoder,
        ))
    }

    async fn open_stream(
        &self,
        request: &ChatCompletionRequest,
    ) -> std::result::Result<Response, OpenAiError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(AUTHORIZATION, self.auth.clone());
        headers.insert(ACCEPT, HeaderValue::from_static("text/event-stream"));

        let url = format!("{}/chat/completions", self.base);
        let resp = self.http.post(url).headers(headers).json(request).send().await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();

            #[cfg(feature = "tracing")]
            tracing::warn!(%status, model = %request.model, "streaming request rejected");

            return Err(OpenAiError::Api { status, body });
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(model = %request.model, "streaming request accepted");

        Ok(resp)
    }
}

impl std::fmt::Debug for OpenAiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiClient")
            .field("base", &self.base)
            .field("decoder", &self.decoder)
            .finish_non_exhaustive()
    }
}
