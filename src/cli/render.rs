//! Plain-text rendering of search sessions and recipe records.
//!
//! Every function returns a `String`; the caller decides where it goes.

use std::fmt::Write as _;

use crate::config::DisplayConfig;
use crate::recipe::{Category, CategoryBuckets, Recipe, RecipeDetail, SynthesizedRecipe};
use crate::search::{BranchStatus, SessionState};

const SCALE: usize = 5;

// ---------------------------------------------------------------------------
// Indicators
// ---------------------------------------------------------------------------

/// Preparation time as five dots, one per started half hour.
///
/// ```
/// use recipe_finder::cli::render::time_indicator;
///
/// assert_eq!(time_indicator(Some(45)), "●●○○○");
/// assert_eq!(time_indicator(None), "○○○○○");
/// ```
pub fn time_indicator(minutes: Option<u32>) -> String {
    let filled = minutes.map_or(0, |m| (m.div_ceil(30) as usize).min(SCALE));
    scale(filled, '●', '○')
}

/// Price per serving as five dollar signs, one per started dollar.
/// Unknown (or zero) prices show two.
pub fn cost_indicator(price_cents: Option<f64>) -> String {
    let filled = match price_cents {
        Some(p) if p > 0.0 => ((p / 100.0).ceil() as usize).min(SCALE),
        _ => 2,
    };
    scale(filled, '$', '·')
}

/// 0 – 100 score as five stars, with a half star for fractions ≥ 0.5.
/// Unknown (or zero) scores show three stars.
pub fn star_rating(score: Option<f64>) -> String {
    let rating = match score {
        Some(s) if s > 0.0 => (s / 100.0 * SCALE as f64).min(SCALE as f64),
        _ => 3.0,
    };
    let full = rating.floor() as usize;
    let half = rating.fract() >= 0.5;

    (0..SCALE)
        .map(|i| {
            if i < full {
                '★'
            } else if i == full && half {
                '½'
            } else {
                '☆'
            }
        })
        .collect()
}

fn scale(filled: usize, on: char, off: char) -> String {
    (0..SCALE).map(|i| if i < filled { on } else { off }).collect()
}

// ---------------------------------------------------------------------------
// Rows
// ---------------------------------------------------------------------------

fn recipe_line(recipe: &Recipe, display: &DisplayConfig) -> String {
    if display.show_indicators {
        format!(
            "  [{:>6}] {:<40}  {}  {}  {}",
            recipe.id,
            recipe.title,
            time_indicator(recipe.ready_in_minutes),
            cost_indicator(recipe.price_per_serving),
            star_rating(recipe.spoonacular_score),
        )
    } else {
        format!("  [{:>6}] {}", recipe.id, recipe.title)
    }
}

/// All non-empty rows, recommended first and cut to the display limit.
pub fn render_rows(buckets: &CategoryBuckets, display: &DisplayConfig) -> String {
    let mut out = String::new();
    for category in Category::ALL {
        let limit = (category == Category::Recommended).then_some(display.recommended_limit);
        let row = buckets.window(category, limit);
        if row.is_empty() {
            continue;
        }
        let _ = writeln!(out, "{}", category.title());
        for recipe in row {
            let _ = writeln!(out, "{}", recipe_line(recipe, display));
        }
        out.push('\n');
    }
    out
}

pub fn render_synthesized(recipe: &SynthesizedRecipe) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", recipe.title);
    let _ = writeln!(out, "Meal Time: {}", recipe.meal_time);
    let _ = writeln!(out, "\nIngredients");
    for ingredient in &recipe.ingredients {
        let _ = writeln!(out, "  • {ingredient}");
    }
    let _ = writeln!(out, "\nInstructions");
    for (i, step) in recipe.instructions.iter().enumerate() {
        let _ = writeln!(out, "  {}. {step}", i + 1);
    }
    out
}

// ---------------------------------------------------------------------------
// Session sections
// ---------------------------------------------------------------------------

/// The generated-recipe section, independent of the list.
pub fn render_synthesis_section(state: &SessionState) -> String {
    match state.synthesis_status {
        BranchStatus::Idle => String::new(),
        BranchStatus::Loading => "Generating AI recipe…\n".to_string(),
        BranchStatus::Error => format!(
            "{}\n",
            state.synthesis_error.as_deref().unwrap_or("Recipe generation failed")
        ),
        BranchStatus::Success => state
            .synthesis_result
            .as_ref()
            .map(render_synthesized)
            .unwrap_or_default(),
    }
}

/// The category-rows section, independent of the generated recipe.
pub fn render_list_section(state: &SessionState, display: &DisplayConfig) -> String {
    match state.list_status {
        BranchStatus::Idle => String::new(),
        BranchStatus::Loading => "Loading recipes…\n".to_string(),
        BranchStatus::Error => {
            let message = state
                .list_error
                .as_deref()
                .or(state.catalog_error.as_deref())
                .unwrap_or("Recipe search failed");
            format!("Error: {message}\n")
        }
        BranchStatus::Success if state.list_result.is_empty() => {
            "No recipes found.\n".to_string()
        }
        BranchStatus::Success => render_rows(&state.list_result, display),
    }
}

/// Both sections, generated recipe first.
pub fn render_session(state: &SessionState, display: &DisplayConfig) -> String {
    let mut out = render_synthesis_section(state);
    if !out.is_empty() {
        out.push('\n');
    }
    out.push_str(&render_list_section(state, display));
    out
}

// ---------------------------------------------------------------------------
// Detail
// ---------------------------------------------------------------------------

/// Drop HTML tags and decode the handful of entities the service emits.
pub fn strip_html(html: &str) -> String {
    let mut text = String::with_capacity(html.len());
    let mut in_tag = false;
    for c in html.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if !in_tag => text.push(c),
            _ => {}
        }
    }
    text.replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&nbsp;", " ")
        .trim()
        .to_string()
}

pub fn render_detail(detail: &RecipeDetail) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", detail.recipe.title);
    if let Some(summary) = detail.summary.as_deref() {
        let _ = writeln!(out, "\n{}", strip_html(summary));
    }

    let _ = writeln!(out, "\nIngredients");
    for ingredient in &detail.extended_ingredients {
        let _ = writeln!(out, "  • {}", ingredient.original);
    }

    let instructions = detail
        .instructions
        .as_deref()
        .map(strip_html)
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "No instructions provided.".to_string());
    let _ = writeln!(out, "\nInstructions\n{instructions}");
    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
