//! Cascade orchestrator: runs strategies in priority order and returns
//! the first non-empty result, recording what every strategy did along
//! the way.

use std::time::Instant;

use tracing::{debug, warn};

use crate::content_filter::{ContentFilterConfig, ContentFilterStrategy};
use crate::section::{SectionConfig, SectionStrategy};
use crate::strategy::{CleanupStrategy, StrategyName};
use crate::structured::{StructuredConfig, StructuredDataStrategy};

/// Cascade-wide configuration; each strategy also carries its own
/// config so callers can tune or disable one stage without touching the
/// others.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct CleanupConfig {
    pub enabled: bool,
    pub structured: StructuredConfig,
    pub section: SectionConfig,
    pub content_filter: ContentFilterConfig,
    pub fallback: FallbackConfig,
}

impl Default for CleanupConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            structured: StructuredConfig::default(),
            section: SectionConfig::default(),
            content_filter: ContentFilterConfig::default(),
            fallback: FallbackConfig::default(),
        }
    }
}

/// Configuration for the cascade's last resort: the original document,
/// unmodified, when every strategy declines.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct FallbackConfig {
    /// Inputs smaller than this are flagged as likely too small to
    /// carry a whole recipe, regardless of which strategy wins.
    pub min_safe_size: usize,
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self { min_safe_size: 500 }
    }
}

/// Per-strategy attempt outcome, kept for diagnostics regardless of
/// whether the strategy actually produced the cascade's final result.
#[derive(Debug, Clone)]
pub struct StrategyOutcome {
    pub strategy: StrategyName,
    pub produced_output: bool,
    pub error: Option<String>,
    pub elapsed_micros: u128,
}

#[derive(Debug, Clone)]
pub struct CleanupStats {
    pub input_len: usize,
    pub output_len: usize,
    pub winning_strategy: StrategyName,
    pub outcomes: Vec<StrategyOutcome>,
    /// Fraction of the original input removed: `1 - output_len / input_len`.
    pub reduction_ratio: f64,
    /// Whether the original input was smaller than
    /// [`FallbackConfig::min_safe_size`], regardless of which strategy won.
    pub undersized_input: bool,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct CleanupReport {
    pub html: String,
    pub stats: CleanupStats,
}

pub struct CleanupEngine {
    config: CleanupConfig,
    strategies: Vec<Box<dyn CleanupStrategy>>,
}

impl CleanupEngine {
    pub fn new(config: CleanupConfig) -> Self {
        let strategies: Vec<Box<dyn CleanupStrategy>> = vec![
            Box::new(StructuredDataStrategy {
                config: config.structured.clone(),
            }),
            Box::new(SectionStrategy {
                config: config.section.clone(),
            }),
            Box::new(ContentFilterStrategy {
                config: config.content_filter.clone(),
            }),
        ];
        Self { config, strategies }
    }

    /// Runs the cascade over `html`, returning the first strategy's
    /// non-empty output, or the original document under
    /// [`StrategyName::Fallback`] if every strategy declined.
    ///
    /// A strategy erroring is recorded and treated the same as
    /// declining — the cascade always continues to the next stage.
    pub fn clean(&self, html: &str) -> CleanupReport {
        let input_len = html.len();
        let undersized_input = input_len < self.config.fallback.min_safe_size;

        if !self.config.enabled {
            return self.finish(html.to_string(), input_len, StrategyName::Disabled, Vec::new(), undersized_input);
        }

        let mut outcomes = Vec::with_capacity(self.strategies.len());

        for strategy in &self.strategies {
            let start = Instant::now();
            match strategy.run(html) {
                Ok(Some(fragment)) if !fragment.trim().is_empty() => {
                    outcomes.push(StrategyOutcome {
                        strategy: strategy.name(),
                        produced_output: true,
                        error: None,
                        elapsed_micros: start.elapsed().as_micros(),
                    });
                    debug!(strategy = ?strategy.name(), output_len = fragment.len(), "cleanup strategy matched");
                    return self.finish(fragment, input_len, strategy.name(), outcomes, undersized_input);
                }
                Ok(_) => {
                    outcomes.push(StrategyOutcome {
                        strategy: strategy.name(),
                        produced_output: false,
                        error: None,
                        elapsed_micros: start.elapsed().as_micros(),
                    });
                }
                Err(err) => {
                    warn!(strategy = ?strategy.name(), error = %err, "cleanup strategy failed");
                    outcomes.push(StrategyOutcome {
                        strategy: strategy.name(),
                        produced_output: false,
                        error: Some(err.to_string()),
                        elapsed_micros: start.elapsed().as_micros(),
                    });
                }
            }
        }

        self.finish(html.to_string(), input_len, StrategyName::Fallback, outcomes, undersized_input)
    }

    fn finish(
        &self,
        html: String,
        input_len: usize,
        winning_strategy: StrategyName,
        outcomes: Vec<StrategyOutcome>,
        undersized_input: bool,
    ) -> CleanupReport {
        let output_len = html.len();
        let reduction_ratio = if input_len == 0 {
            0.0
        } else {
            1.0 - (output_len as f64 / input_len as f64)
        };
        let message = if undersized_input {
            format!(
                "input ({input_len} bytes) is below the configured minimum safe size ({} bytes); \
                 result may not reliably carry a recipe",
                self.config.fallback.min_safe_size
            )
        } else {
            format!("{winning_strategy:?} reduced {input_len} bytes to {output_len} bytes")
        };

        CleanupReport {
            html,
            stats: CleanupStats {
                input_len,
                output_len,
                winning_strategy,
                outcomes,
                reduction_ratio,
                undersized_input,
                message,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn falls_back_when_no_strategy_matches() {
        let engine = CleanupEngine::new(CleanupConfig {
            enabled: true,
            structured: StructuredConfig {
                enabled: false,
                min_completeness: 0,
            },
            section: SectionConfig {
                enabled: false,
                ..SectionConfig::default()
            },
            content_filter: ContentFilterConfig {
                enabled: false,
                ..ContentFilterConfig::default()
            },
            fallback: FallbackConfig::default(),
        });
        let report = engine.clean("<html><body>hi</body></html>");
        assert_eq!(report.stats.winning_strategy, StrategyName::Fallback);
        assert_eq!(report.html, "<html><body>hi</body></html>");
    }

    #[test]
    fn flags_input_smaller_than_min_safe_size() {
        let engine = CleanupEngine::new(CleanupConfig {
            enabled: false,
            fallback: FallbackConfig { min_safe_size: 1000 },
            ..CleanupConfig::default()
        });
        let report = engine.clean("<html>tiny</html>");
        assert!(report.stats.undersized_input);
        assert!(report.stats.message.contains("minimum safe size"));
    }

    #[test]
    fn reduction_ratio_reflects_shrinkage() {
        let engine = CleanupEngine::new(CleanupConfig::default());
        let html = r#"<html><body><script>noise</script><article><ul><li>flour</li><li>sugar</li></ul><ol><li>Mix</li><li>Bake</li></ol></article></body></html>"#;
        let report = engine.clean(html);
        assert!(report.stats.output_len < report.stats.input_len);
        assert!(report.stats.reduction_ratio > 0.0);
    }

    #[test]
    fn disabled_engine_short_circuits_everything() {
        let engine = CleanupEngine::new(CleanupConfig {
            enabled: false,
            ..CleanupConfig::default()
        });
        let report = engine.clean("<html></html>");
        assert_eq!(report.stats.winning_strategy, StrategyName::Disabled);
        assert!(report.stats.outcomes.is_empty());
    }

    #[test]
    fn structured_data_wins_over_later_stages() {
        let html = r#"
        <html><body>
        <script type="application/ld+json">
        {"@type": "Recipe", "name": "Soup", "recipeIngredient": ["water"], "recipeInstructions": ["Boil"]}
        </script>
        <div class="recipe">ignored fallback content</div>
        </body></html>
        "#;
        let engine = CleanupEngine::new(CleanupConfig::default());
        let report = engine.clean(html);
        assert_eq!(report.stats.winning_strategy, StrategyName::StructuredData);
    }
}
