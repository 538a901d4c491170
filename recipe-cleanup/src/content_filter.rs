//! Strategy 3: whole-document pruning.
//!
//! Strips elements that are never part of a recipe's content — scripts,
//! styles, navigation chrome, ads, hidden elements, comments — and
//! returns what's left of the document body. This is the cheapest
//! strategy and the least precise; it runs after structured-data and
//! section scoring have had a chance to find something smaller and
//! more confident.

use once_cell::sync::Lazy;
use scraper::{Html, Selector};

use crate::error::CleanupError;
use crate::prune::render_pruned;
use crate::strategy::{CleanupStrategy, StrategyName};

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ContentFilterConfig {
    pub enabled: bool,
    pub min_output_size: usize,
}

impl Default for ContentFilterConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            min_output_size: 60,
        }
    }
}

pub struct ContentFilterStrategy {
    pub config: ContentFilterConfig,
}

static BODY_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("body").expect("valid selector"));

impl CleanupStrategy for ContentFilterStrategy {
    fn name(&self) -> StrategyName {
        StrategyName::ContentFilter
    }

    fn run(&self, html: &str) -> Result<Option<String>, CleanupError> {
        if !self.config.enabled {
            return Ok(None);
        }

        let document = Html::parse_document(html);
        let Some(body) = document.select(&BODY_SELECTOR).next() else {
            return Ok(None);
        };

        let pruned = render_pruned(body);
        if pruned.len() < self.config.min_output_size {
            return Ok(None);
        }

        Ok(Some(pruned))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_script_and_nav() {
        let html = r#"
        <html><body>
        <nav>Home About Contact</nav>
        <script>var x = 1;</script>
        <main>Mix flour and sugar, then bake at 350 for twenty five minutes until golden.</main>
        </body></html>
        "#;
        let strategy = ContentFilterStrategy {
            config: ContentFilterConfig::default(),
        };
        let result = strategy.run(html).unwrap().unwrap();
        assert!(!result.contains("var x"));
        assert!(!result.contains("Home About Contact"));
        assert!(result.contains("Mix flour"));
    }

    #[test]
    fn strips_ad_blocks_and_attributes() {
        let html = r#"
        <html><body>
        <div class="ad-slot">Buy our pans!</div>
        <p class="recipe-text" style="color:red">Bake it at 350.</p>
        </body></html>
        "#;
        let strategy = ContentFilterStrategy {
            config: ContentFilterConfig {
                enabled: true,
                min_output_size: 0,
            },
        };
        let result = strategy.run(html).unwrap().unwrap();
        assert!(!result.contains("Buy our pans"));
        assert!(!result.contains("class="));
        assert!(!result.contains("style="));
        assert!(result.contains("Bake it at 350."));
    }

    #[test]
    fn returns_none_for_sparse_body() {
        let html = "<html><body><nav>Home</nav></body></html>";
        let strategy = ContentFilterStrategy {
            config: ContentFilterConfig {
                enabled: true,
                min_output_size: 1000,
            },
        };
        assert!(strategy.run(html).unwrap().is_none());
    }
}
