use std::{
    fmt::{self, Formatter},
    sync::{Arc, LazyLock},
};

use reqwest::{
    Client, ClientBuilder, RequestBuilder, Response,
    header::{HeaderMap, HeaderName, HeaderValue, InvalidHeaderValue},
};
use serde::{Deserialize, Serialize};
use snafu::{ResultExt, Snafu};
use tracing::{Level, Span, instrument};
use url::Url;

use crate::embedding::{
    BatchContentEmbeddingResponse, BatchEmbedContentsRequest, ContentEmbeddingResponse,
    EmbedBuilder, EmbedContentRequest,
};
use crate::generation::{ContentBuilder, GenerateContentRequest, GenerationResponse};

static DEFAULT_BASE_URL: LazyLock<Url> = LazyLock::new(|| {
    Url::parse("https://generativelanguage.googleapis.com/v1beta/")
        .expect("unreachable error: failed to parse default base URL")
});

/// A Gemini model name in its `models/<id>` resource form.
///
/// Bare identifiers such as `gemini-2.5-flash` are normalized on construction,
/// so `Model::from("gemini-2.5-flash")` and `Model::from("models/gemini-2.5-flash")`
/// are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Model(String);

impl Model {
    pub fn new(name: impl AsRef<str>) -> Self {
        let name = name.as_ref().trim();
        if name.starts_with("models/") || name.starts_with("tunedModels/") {
            Self(name.to_string())
        } else {
            Self(format!("models/{name}"))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The model id without the `models/` prefix.
    pub fn id(&self) -> &str {
        self.0.strip_prefix("models/").unwrap_or(&self.0)
    }
}

impl Default for Model {
    fn default() -> Self {
        Self::new("gemini-2.5-flash")
    }
}

impl From<String> for Model {
    fn from(model: String) -> Self {
        Self::new(model)
    }
}

impl From<&str> for Model {
    fn from(model: &str) -> Self {
        Self::new(model)
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    #[snafu(display("failed to parse API key"))]
    InvalidApiKey { source: InvalidHeaderValue },

    #[snafu(display("failed to build HTTP client"))]
    BuildClient { source: reqwest::Error },

    #[snafu(display("failed to construct URL (probably incorrect model name): {suffix}"))]
    ConstructUrl { source: url::ParseError, suffix: String },

    #[snafu(display("failed to perform request"))]
    PerformRequest { source: reqwest::Error },

    #[snafu(display(
        "bad response from server; code {code}; description: {}",
        description.as_deref().unwrap_or("none")
    ))]
    BadResponse {
        /// HTTP status code
        code: u16,
        /// HTTP error description
        description: Option<String>,
    },

    #[snafu(display("failed to decode JSON response"))]
    DecodeResponse { source: reqwest::Error },
}

/// Internal client for making requests to the Gemini API
pub struct GeminiClient {
    http_client: Client,
    pub model: Model,
    base_url: Url,
}

impl GeminiClient {
    fn with_base_url(
        client_builder: ClientBuilder,
        api_key: &str,
        model: Model,
        base_url: Url,
    ) -> Result<Self, Error> {
        let headers = HeaderMap::from_iter([(
            HeaderName::from_static("x-goog-api-key"),
            HeaderValue::from_str(api_key).context(InvalidApiKeySnafu)?,
        )]);

        let http_client =
            client_builder.default_headers(headers).build().context(BuildClientSnafu)?;

        Ok(Self { http_client, model, base_url })
    }

    /// Check the response status code and return an error if it is not successful
    #[tracing::instrument(skip_all, err)]
    async fn check_response(response: Response) -> Result<Response, Error> {
        let status = response.status();
        if !status.is_success() {
            let description = response.text().await.ok();
            BadResponseSnafu { code: status.as_u16(), description }.fail()
        } else {
            Ok(response)
        }
    }

    /// Performs an HTTP request with the shared status check, handing the
    /// successful response to `deserializer`.
    #[tracing::instrument(skip_all)]
    async fn perform_request<
        B: FnOnce(&Client) -> RequestBuilder,
        D: AsyncFn(Response) -> Result<T, Error>,
        T,
    >(
        &self,
        builder: B,
        deserializer: D,
    ) -> Result<T, Error> {
        let request = builder(&self.http_client);
        tracing::debug!("request built successfully");
        let response = request.send().await.context(PerformRequestSnafu)?;
        tracing::debug!("response received successfully");
        let response = Self::check_response(response).await?;
        tracing::debug!("response ok");
        deserializer(response).await
    }

    #[tracing::instrument(skip(self, body), fields(request.type = "post", request.url = %url))]
    async fn post_json<Req: serde::Serialize, Res: serde::de::DeserializeOwned>(
        &self,
        url: Url,
        body: &Req,
    ) -> Result<Res, Error> {
        self.perform_request(
            |c| c.post(url).json(body),
            async |r| r.json().await.context(DecodeResponseSnafu),
        )
        .await
    }

    /// Generate content
    #[instrument(skip_all, fields(
        model = %self.model,
        messages.parts.count = request.contents.len(),
        usage.prompt_tokens,
        usage.candidates_tokens,
        usage.total_tokens,
    ), ret(level = Level::TRACE), err)]
    pub(crate) async fn generate_content_raw(
        &self,
        request: GenerateContentRequest,
    ) -> Result<GenerationResponse, Error> {
        let url = self.build_url("generateContent")?;
        let response: GenerationResponse = self.post_json(url, &request).await?;

        if let Some(usage) = &response.usage_metadata {
            #[rustfmt::skip]
            Span::current()
                .record("usage.prompt_tokens", usage.prompt_token_count)
                .record("usage.candidates_tokens", usage.candidates_token_count)
                .record("usage.total_tokens", usage.total_token_count);

            tracing::debug!("generation usage evaluated");
        }

        Ok(response)
    }

    /// Embed content
    #[instrument(skip_all, fields(
        model = %self.model,
        task.type = request.task_type.as_ref().map(|t| format!("{t:?}")),
        task.output.dimensionality = request.output_dimensionality,
    ))]
    pub(crate) async fn embed_content(
        &self,
        request: EmbedContentRequest,
    ) -> Result<ContentEmbeddingResponse, Error> {
        let url = self.build_url("embedContent")?;
        self.post_json(url, &request).await
    }

    /// Batch embed content
    #[instrument(skip_all, fields(model = %self.model, batch.size = request.requests.len()))]
    pub(crate) async fn embed_content_batch(
        &self,
        request: BatchEmbedContentsRequest,
    ) -> Result<BatchContentEmbeddingResponse, Error> {
        let url = self.build_url("batchEmbedContents")?;
        self.post_json(url, &request).await
    }

    #[tracing::instrument(skip(self), ret(level = Level::DEBUG))]
    fn build_url(&self, endpoint: &str) -> Result<Url, Error> {
        let suffix = format!("{}:{endpoint}", self.model);
        self.base_url.join(&suffix).context(ConstructUrlSnafu { suffix })
    }
}

/// A builder for the [`Gemini`] client.
///
/// ```no_run
/// use docqa_gemini::GeminiBuilder;
/// use reqwest::ClientBuilder;
/// use std::time::Duration;
///
/// # fn run() -> Result<(), docqa_gemini::Error> {
/// let gemini = GeminiBuilder::new("YOUR_API_KEY")
///     .with_model("gemini-2.5-pro")
///     .with_http_client(ClientBuilder::new().timeout(Duration::from_secs(120)))
///     .build()?;
/// # Ok(())
/// # }
/// ```
pub struct GeminiBuilder {
    api_key: String,
    model: Model,
    client_builder: ClientBuilder,
    base_url: Url,
}

impl GeminiBuilder {
    /// Creates a new `GeminiBuilder` with the given API key.
    pub fn new<K: Into<String>>(key: K) -> Self {
        Self {
            api_key: key.into(),
            model: Model::default(),
            client_builder: ClientBuilder::default(),
            base_url: DEFAULT_BASE_URL.clone(),
        }
    }

    /// Sets the model for the client.
    pub fn with_model<M: Into<Model>>(mut self, model: M) -> Self {
        self.model = model.into();
        self
    }

    /// Sets a custom `reqwest::ClientBuilder`.
    pub fn with_http_client(mut self, client_builder: ClientBuilder) -> Self {
        self.client_builder = client_builder;
        self
    }

    /// Sets a custom base URL for the API.
    pub fn with_base_url(mut self, base_url: Url) -> Self {
        self.base_url = base_url;
        self
    }

    /// Builds the `Gemini` client.
    pub fn build(self) -> Result<Gemini, Error> {
        Ok(Gemini {
            client: Arc::new(GeminiClient::with_base_url(
                self.client_builder,
                &self.api_key,
                self.model,
                self.base_url,
            )?),
        })
    }
}

/// Client for the Gemini API
#[derive(Clone)]
pub struct Gemini {
    client: Arc<GeminiClient>,
}

impl Gemini {
    /// Create a new client for the default model.
    pub fn new<K: AsRef<str>>(api_key: K) -> Result<Self, Error> {
        Self::with_model(api_key, Model::default())
    }

    /// Create a new client for a specific model.
    pub fn with_model<K: AsRef<str>, M: Into<Model>>(api_key: K, model: M) -> Result<Self, Error> {
        GeminiBuilder::new(api_key.as_ref()).with_model(model).build()
    }

    /// The model every request from this client targets.
    pub fn model(&self) -> &Model {
        &self.client.model
    }

    /// Start building a content generation request.
    pub fn generate_content(&self) -> ContentBuilder {
        ContentBuilder::new(self.client.clone())
    }

    /// Start building a content embedding request.
    pub fn embed_content(&self) -> EmbedBuilder {
        EmbedBuilder::new(self.client.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_names_are_normalized() {
        assert_eq!(Model::from("gemini-2.5-flash").as_str(), "models/gemini-2.5-flash");
        assert_eq!(Model::from("models/text-embedding-004").as_str(), "models/text-embedding-004");
        assert_eq!(Model::from("  text-embedding-004 ").id(), "text-embedding-004");
        assert_eq!(Model::from("gemini-2.5-flash"), Model::from("models/gemini-2.5-flash"));
    }

    #[test]
    fn build_url_targets_model_endpoint() {
        let gemini = Gemini::with_model("test-key", "text-embedding-004").unwrap();
        let url = gemini.client.build_url("embedContent").unwrap();
        assert_eq!(
            url.as_str(),
            "https://generativelanguage.googleapis.com/v1beta/models/text-embedding-004:embedContent"
        );
    }

    #[test]
    fn custom_base_url_is_respected() {
        let gemini = GeminiBuilder::new("test-key")
            .with_model("gemini-2.5-flash")
            .with_base_url(Url::parse("http://localhost:8080/v1beta/").unwrap())
            .build()
            .unwrap();
        let url = gemini.client.build_url("generateContent").unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/v1beta/models/gemini-2.5-flash:generateContent");
    }

    #[test]
    fn invalid_api_key_is_rejected() {
        let result = Gemini::new("bad\nkey");
        assert!(matches!(result, Err(Error::InvalidApiKey { .. })));
    }
}
