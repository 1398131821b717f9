//! Reduces a flat recipe list into the overlapping browse rows.
//!
//! Every row has its own predicate and every record is tested against every
//! predicate, so one recipe can show up in several rows at once.

use super::model::Recipe;

/// Inclusive upper bound on `ready_in_minutes` for the quick-meals row.
pub const QUICK_MEAL_MAX_MINUTES: u32 = 30;

// ---------------------------------------------------------------------------
// Category
// ---------------------------------------------------------------------------

/// The fixed set of browse rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Recommended,
    QuickMeals,
    Vegetarian,
    Desserts,
    MainCourse,
}

impl Category {
    /// All categories in display order.
    pub const ALL: [Category; 5] = [
        Category::Recommended,
        Category::QuickMeals,
        Category::Vegetarian,
        Category::MainCourse,
        Category::Desserts,
    ];

    /// Row heading.
    pub fn title(&self) -> &'static str {
        match self {
            Category::Recommended => "RECOMMENDED",
            Category::QuickMeals => "QUICK MEALS",
            Category::Vegetarian => "VEGETARIAN",
            Category::Desserts => "DESSERTS",
            Category::MainCourse => "MAIN COURSE",
        }
    }

    /// Membership predicate.  Depends on `recipe` alone.
    ///
    /// ```
    /// use recipe_finder::recipe::{Category, Recipe};
    ///
    /// let recipe: Recipe = serde_json::from_str(
    ///     r#"{ "id": 1, "readyInMinutes": 30, "dishTypes": ["main dish"] }"#,
    /// ).unwrap();
    ///
    /// assert!(Category::Recommended.admits(&recipe));
    /// assert!(Category::QuickMeals.admits(&recipe));
    /// assert!(Category::MainCourse.admits(&recipe));
    /// assert!(!Category::Vegetarian.admits(&recipe));
    /// assert!(!Category::Desserts.admits(&recipe));
    /// ```
    pub fn admits(&self, recipe: &Recipe) -> bool {
        match self {
            Category::Recommended => true,
            Category::QuickMeals => recipe
                .ready_in_minutes
                .is_some_and(|m| m <= QUICK_MEAL_MAX_MINUTES),
            Category::Vegetarian => recipe.vegetarian,
            Category::Desserts => recipe.has_dish_type("dessert"),
            Category::MainCourse => {
                recipe.has_dish_type("main course") || recipe.has_dish_type("main dish")
            }
        }
    }
}

// ---------------------------------------------------------------------------
// CategoryBuckets
// ---------------------------------------------------------------------------

/// Output of [`categorize`].
///
/// `recommended` always holds every input record in input order; every other
/// bucket is an order-preserving subsequence of it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryBuckets {
    pub recommended: Vec<Recipe>,
    pub quick_meals: Vec<Recipe>,
    pub vegetarian: Vec<Recipe>,
    pub desserts: Vec<Recipe>,
    pub main_course: Vec<Recipe>,
}

impl CategoryBuckets {
    /// Full contents of one bucket.
    pub fn get(&self, category: Category) -> &[Recipe] {
        match category {
            Category::Recommended => &self.recommended,
            Category::QuickMeals => &self.quick_meals,
            Category::Vegetarian => &self.vegetarian,
            Category::Desserts => &self.desserts,
            Category::MainCourse => &self.main_course,
        }
    }

    fn get_mut(&mut self, category: Category) -> &mut Vec<Recipe> {
        match category {
            Category::Recommended => &mut self.recommended,
            Category::QuickMeals => &mut self.quick_meals,
            Category::Vegetarian => &mut self.vegetarian,
            Category::Desserts => &mut self.desserts,
            Category::MainCourse => &mut self.main_course,
        }
    }

    /// A display window over one bucket: the first `limit` records, or all of
    /// them when `limit` is `None`.  Borrowed, so the bucket itself is never
    /// shortened.
    pub fn window(&self, category: Category, limit: Option<usize>) -> &[Recipe] {
        let bucket = self.get(category);
        match limit {
            Some(n) => &bucket[..n.min(bucket.len())],
            None => bucket,
        }
    }

    /// `true` when no records were categorized at all.
    pub fn is_empty(&self) -> bool {
        self.recommended.is_empty()
    }
}

/// Classify `records` into the browse rows.
///
/// Pure and deterministic: the same input always yields the same buckets in
/// the same order.
pub fn categorize(records: &[Recipe]) -> CategoryBuckets {
    let mut buckets = CategoryBuckets::default();

    for recipe in records {
        for category in Category::ALL {
            if category.admits(recipe) {
                buckets.get_mut(category).push(recipe.clone());
            }
        }
    }

    buckets
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
