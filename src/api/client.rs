//! Core `RecipeService` trait and the `HttpRecipeService` implementation.
//!
//! `HttpRecipeService` talks JSON over HTTP to the recipe backend.  All
//! connection details come from [`ServiceConfig`]; nothing is hardcoded
//! except the endpoint paths themselves.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::ServiceConfig;
use crate::recipe::{Recipe, RecipeDetail, SynthesizedRecipe};

/// `GET`: full catalog listing.
pub const CATALOG_PATH: &str = "/recipes";
/// `POST`: catalog recipes matching a free-text prompt.
pub const SEARCH_PATH: &str = "/recipes/from-text";
/// `POST`: generate a new recipe from a free-text prompt.
pub const GENERATE_PATH: &str = "/recipes/generate";

// ---------------------------------------------------------------------------
// ServiceError
// ---------------------------------------------------------------------------

/// Errors that can occur while talking to the recipe service.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ServiceError {
    /// Transport-level failure: connection refused, reset, timed out.
    #[error("could not reach the recipe service: {0}")]
    Network(String),

    /// The service answered, but not with a usable success payload.
    #[error("unexpected response from the recipe service: {0}")]
    BadResponse(String),

    /// The requested recipe id does not exist.
    #[error("recipe not found")]
    NotFound,
}

impl From<reqwest::Error> for ServiceError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            ServiceError::BadResponse(e.to_string())
        } else if e.is_timeout() {
            ServiceError::Network(format!("request timed out: {e}"))
        } else {
            ServiceError::Network(e.to_string())
        }
    }
}

// ---------------------------------------------------------------------------
// Wire envelopes
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct PromptBody<'a> {
    prompt: &'a str,
}

/// The listing endpoint wraps its records in `{ "recipes": [...] }`; older
/// backends return the bare array.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CatalogBody {
    Wrapped {
        #[serde(default)]
        recipes: Vec<Recipe>,
    },
    Bare(Vec<Recipe>),
}

impl CatalogBody {
    fn into_recipes(self) -> Vec<Recipe> {
        match self {
            CatalogBody::Wrapped { recipes } => recipes,
            CatalogBody::Bare(recipes) => recipes,
        }
    }
}

#[derive(Debug, Deserialize)]
struct SearchBody {
    #[serde(default)]
    results: Vec<Recipe>,
}

// ---------------------------------------------------------------------------
// RecipeService trait
// ---------------------------------------------------------------------------

/// The four remote operations the client consumes.
///
/// Implementors must be `Send + Sync` so they can be shared across tasks
/// as `Arc<dyn RecipeService>`.
#[async_trait]
pub trait RecipeService: Send + Sync {
    /// Every recipe in the catalog.
    async fn list_catalog(&self) -> Result<Vec<Recipe>, ServiceError>;

    /// Catalog recipes matching `prompt`.
    async fn search_from_text(&self, prompt: &str) -> Result<Vec<Recipe>, ServiceError>;

    /// A freshly generated recipe for `prompt`.
    async fn generate(&self, prompt: &str) -> Result<SynthesizedRecipe, ServiceError>;

    /// One full recipe record.  Unknown ids yield [`ServiceError::NotFound`].
    async fn fetch_by_id(&self, id: u64) -> Result<RecipeDetail, ServiceError>;
}

// ---------------------------------------------------------------------------
// HttpRecipeService
// ---------------------------------------------------------------------------

/// JSON-over-HTTP client for the recipe backend.
pub struct HttpRecipeService {
    client: reqwest::Client,
    base_url: String,
}

impl HttpRecipeService {
    /// Build a client from application config.
    ///
    /// A `timeout_secs` of zero leaves requests unbounded.  If the builder
    /// fails a default client is used instead.
    pub fn from_config(config: &ServiceConfig) -> Self {
        let mut builder = reqwest::Client::builder();
        if config.timeout_secs > 0 {
            builder = builder.timeout(std::time::Duration::from_secs(config.timeout_secs));
        }
        let client = builder.build().unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Absolute URL for `path` (which starts with `/`).
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn post_prompt<T: DeserializeOwned>(
        &self,
        path: &str,
        prompt: &str,
    ) -> Result<T, ServiceError> {
        let response = self
            .client
            .post(self.endpoint(path))
            .json(&PromptBody { prompt })
            .send()
            .await?;
        decode(response).await
    }
}

/// Turn a response into `T`, rejecting non-2xx statuses and bad JSON.
async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ServiceError> {
    let status = response.status();
    if !status.is_success() {
        return Err(ServiceError::BadResponse(format!(
            "{} returned {status}",
            response.url().path()
        )));
    }

    let bytes = response.bytes().await?;
    serde_json::from_slice(&bytes)
        .map_err(|e| ServiceError::BadResponse(format!("malformed body: {e}")))
}

#[async_trait]
impl RecipeService for HttpRecipeService {
    async fn list_catalog(&self) -> Result<Vec<Recipe>, ServiceError> {
        let response = self.client.get(self.endpoint(CATALOG_PATH)).send().await?;
        let body: CatalogBody = decode(response).await?;
        Ok(body.into_recipes())
    }

    async fn search_from_text(&self, prompt: &str) -> Result<Vec<Recipe>, ServiceError> {
        let body: SearchBody = self.post_prompt(SEARCH_PATH, prompt).await?;
        Ok(body.results)
    }

    async fn generate(&self, prompt: &str) -> Result<SynthesizedRecipe, ServiceError> {
        self.post_prompt(GENERATE_PATH, prompt).await
    }

    async fn fetch_by_id(&self, id: u64) -> Result<RecipeDetail, ServiceError> {
        let url = self.endpoint(&format!("{CATALOG_PATH}/{id}"));
        let response = self.client.get(url).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(ServiceError::NotFound);
        }

        // Some backends answer an unknown id with `200 null`.
        let detail: Option<RecipeDetail> = decode(response).await?;
        detail.ok_or(ServiceError::NotFound)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
