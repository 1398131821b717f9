//! Client side of the external recipe service.
//!
//! * [`RecipeService`]: async trait implemented by every backend.
//! * [`HttpRecipeService`]: JSON-over-HTTP implementation (`reqwest`).
//! * [`ServiceError`]: network / bad-response / not-found.

pub mod client;

pub use client::{
    HttpRecipeService, RecipeService, ServiceError, CATALOG_PATH, GENERATE_PATH, SEARCH_PATH,
};
