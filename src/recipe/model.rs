//! Recipe records as delivered by the external recipe service.
//!
//! All structs are plain serde snapshots.  The service is loose about which
//! fields it sends (and occasionally sends `null` instead of omitting a
//! field), so every optional field decodes to a neutral default rather than
//! failing the whole payload.

use serde::{Deserialize, Deserializer, Serialize};

/// Decode `null` the same way as a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// ---------------------------------------------------------------------------
// Recipe
// ---------------------------------------------------------------------------

/// A catalog recipe as returned by the listing, search and detail endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    /// Stable catalog identifier.
    pub id: u64,

    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,

    /// Image URL, only used for display.
    #[serde(default)]
    pub image: Option<String>,

    /// Total preparation time.  `None` when the service does not know.
    #[serde(default)]
    pub ready_in_minutes: Option<u32>,

    /// Price per serving in US cents.
    #[serde(default)]
    pub price_per_serving: Option<f64>,

    /// Service-side quality score, 0 – 100.
    #[serde(default)]
    pub spoonacular_score: Option<f64>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub vegetarian: bool,

    /// Free-form dish types such as `"dessert"` or `"main course"`.
    #[serde(default, deserialize_with = "null_as_default")]
    pub dish_types: Vec<String>,
}

impl Recipe {
    /// `true` when `dish_types` contains `dish_type` exactly.
    pub fn has_dish_type(&self, dish_type: &str) -> bool {
        self.dish_types.iter().any(|t| t == dish_type)
    }
}

// ---------------------------------------------------------------------------
// RecipeDetail
// ---------------------------------------------------------------------------

/// One line of a detail record's ingredient list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ingredient {
    #[serde(default)]
    pub id: Option<u64>,
    /// The ingredient line as written in the source recipe.
    #[serde(default, deserialize_with = "null_as_default")]
    pub original: String,
}

/// Full record returned by `GET /recipes/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeDetail {
    #[serde(flatten)]
    pub recipe: Recipe,

    /// HTML summary paragraph.
    #[serde(default)]
    pub summary: Option<String>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub extended_ingredients: Vec<Ingredient>,

    /// HTML instructions block.
    #[serde(default)]
    pub instructions: Option<String>,
}

// ---------------------------------------------------------------------------
// SynthesizedRecipe
// ---------------------------------------------------------------------------

/// A recipe generated on the fly for a single query.
///
/// Unlike [`Recipe`] it has no id and never enters the catalog; the search
/// session drops it as soon as the next query is submitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SynthesizedRecipe {
    pub title: String,

    /// Free-text hint such as `"Dinner"` or `"Any time"`.
    #[serde(default, deserialize_with = "null_as_default")]
    pub meal_time: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub ingredients: Vec<String>,

    /// Steps in execution order.
    #[serde(default, deserialize_with = "null_as_default")]
    pub instructions: Vec<String>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
