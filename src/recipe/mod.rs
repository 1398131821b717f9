//! Recipe data model and the category reducer.
//!
//! * [`Recipe`] / [`RecipeDetail`]: catalog records from the recipe service.
//! * [`SynthesizedRecipe`]: a one-off generated recipe, never persisted.
//! * [`categorize`]: flat list → overlapping [`CategoryBuckets`].

pub mod categorize;
pub mod model;

pub use categorize::{categorize, Category, CategoryBuckets, QUICK_MEAL_MAX_MINUTES};
pub use model::{Ingredient, Recipe, RecipeDetail, SynthesizedRecipe};
