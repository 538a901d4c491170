//! Strategy 2: section-based container scoring.
//!
//! Scores every element matching a set of "this smells like a recipe
//! container" selectors and returns the highest-scoring container,
//! stripped of its non-content chrome.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};

use crate::error::CleanupError;
use crate::prune::render_pruned;
use crate::strategy::{CleanupStrategy, StrategyName};

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SectionConfig {
    pub enabled: bool,
    pub min_score: u32,
    pub min_output_size: usize,
    /// Words whose presence in a candidate container's visible text
    /// earn it points (+10 each); matched case-insensitively.
    pub keywords: HashSet<String>,
}

impl Default for SectionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            min_score: 2,
            min_output_size: 40,
            keywords: default_keywords(),
        }
    }
}

fn default_keywords() -> HashSet<String> {
    [
        "ingredient",
        "ingredients",
        "instruction",
        "instructions",
        "direction",
        "directions",
        "step",
        "steps",
        "recipe",
        "prep time",
        "cook time",
        "servings",
        "yield",
    ]
    .into_iter()
    .map(str::to_string)
    .collect()
}

pub struct SectionStrategy {
    pub config: SectionConfig,
}

/// Candidate recipe containers, per the cascade's container-scoring
/// rules.
static CONTAINER_SELECTORS: Lazy<Vec<Selector>> = Lazy::new(|| {
    [
        "article",
        "section",
        r#"div[class*="recipe"]"#,
        r#"div[id*="recipe"]"#,
        "main",
    ]
    .iter()
    .map(|s| Selector::parse(s).expect("valid selector"))
    .collect()
});

static LIST_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("ul, ol").expect("valid selector"));
static HEADING_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("h2, h3").expect("valid selector"));

impl CleanupStrategy for SectionStrategy {
    fn name(&self) -> StrategyName {
        StrategyName::SectionBased
    }

    fn run(&self, html: &str) -> Result<Option<String>, CleanupError> {
        if !self.config.enabled {
            return Ok(None);
        }

        let document = Html::parse_document(html);
        let mut best: Option<(u32, ElementRef)> = None;

        for selector in CONTAINER_SELECTORS.iter() {
            for element in document.select(selector) {
                let score = score_container(&element, &self.config.keywords);
                if best.as_ref().map_or(true, |(s, _)| score > *s) {
                    best = Some((score, element));
                }
            }
        }

        match best {
            Some((score, element)) if score >= self.config.min_score => {
                let pruned = render_pruned(element);
                if pruned.len() >= self.config.min_output_size {
                    Ok(Some(pruned))
                } else {
                    Ok(None)
                }
            }
            _ => Ok(None),
        }
    }
}

/// Scores a candidate container against the cascade's five rules:
/// +10 per matched keyword, +20 for two or more list descendants, +10
/// for two or more `h2`/`h3` descendants, +10 when the visible text
/// exceeds 1000 characters.
fn score_container(element: &ElementRef, keywords: &HashSet<String>) -> u32 {
    let text = element.text().collect::<String>().to_ascii_lowercase();
    let mut score = 0u32;

    for keyword in keywords {
        if text.contains(keyword.as_str()) {
            score += 10;
        }
    }
    if element.select(&LIST_SELECTOR).count() >= 2 {
        score += 20;
    }
    if element.select(&HEADING_SELECTOR).count() >= 2 {
        score += 10;
    }
    if text.len() > 1000 {
        score += 10;
    }

    score
}
