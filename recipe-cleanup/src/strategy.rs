use crate::error::CleanupError;

/// Identifies which cascade strategy produced a cleanup result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StrategyName {
    StructuredData,
    SectionBased,
    ContentFilter,
    Fallback,
    Disabled,
}

/// A pure function mapping raw HTML to a possibly smaller fragment
/// believed to still contain the recipe. Strategies never mutate shared
/// state and never see each other's output.
pub trait CleanupStrategy: Send + Sync {
    fn name(&self) -> StrategyName;
    fn run(&self, html: &str) -> Result<Option<String>, CleanupError>;
}
