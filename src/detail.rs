//! Single-recipe detail fetch.

use std::sync::Arc;

use crate::api::{RecipeService, ServiceError};
use crate::recipe::RecipeDetail;

/// Loads one full recipe by id.  No caching, no retry.
#[derive(Clone)]
pub struct RecipeDetailLoader {
    service: Arc<dyn RecipeService>,
}

impl RecipeDetailLoader {
    pub fn new(service: Arc<dyn RecipeService>) -> Self {
        Self { service }
    }

    /// Fetch recipe `id`.  Unknown ids give [`ServiceError::NotFound`].
    pub async fn load_by_id(&self, id: u64) -> Result<RecipeDetail, ServiceError> {
        log::debug!("detail: loading recipe {id}");
        let result = self.service.fetch_by_id(id).await;
        match &result {
            Ok(detail) => log::debug!("detail: loaded {:?}", detail.recipe.title),
            Err(ServiceError::NotFound) => log::info!("detail: recipe {id} not found"),
            Err(e) => log::warn!("detail: recipe {id} failed: {e}"),
        }
        result
    }
}
