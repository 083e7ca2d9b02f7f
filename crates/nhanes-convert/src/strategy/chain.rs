//! Ordered strategy fallback.

use std::fmt;
use std::path::Path;

use nhanes_model::Table;
use tracing::{debug, warn};

use super::{LegacyStrategy, MetadataStrategy, ParseStrategy, TransportStrategy};
use crate::error::StrategyError;

/// Strategies in priority order.
pub struct StrategyChain {
    strategies: Vec<Box<dyn ParseStrategy>>,
}

/// The first strategy that parsed the file, and those that failed before it.
#[derive(Debug)]
pub struct ChainSuccess {
    pub table: Table,
    pub strategy: String,
    pub earlier_failures: Vec<StrategyError>,
}

/// Every strategy failed. Failures are in attempt order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainFailure {
    pub failures: Vec<StrategyError>,
}

impl fmt::Display for ChainFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("all strategies failed: ")?;
        for (i, failure) in self.failures.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}({})", failure.strategy, failure.message)?;
        }
        Ok(())
    }
}

impl std::error::Error for ChainFailure {}

impl StrategyChain {
    #[must_use]
    pub fn new(strategies: Vec<Box<dyn ParseStrategy>>) -> Self {
        Self { strategies }
    }

    /// Transport, then metadata, then legacy.
    #[must_use]
    pub fn standard() -> Self {
        Self::new(vec![
            Box::new(TransportStrategy),
            Box::new(MetadataStrategy),
            Box::new(LegacyStrategy),
        ])
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.strategies.iter().map(|s| s.name())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }

    /// Try each strategy in order until one succeeds.
    pub fn parse(&self, path: &Path) -> Result<ChainSuccess, ChainFailure> {
        let mut failures = Vec::new();
        for strategy in &self.strategies {
            debug!(strategy = strategy.name(), path = %path.display(), "trying strategy");
            match strategy.parse(path) {
                Ok(table) => {
                    debug!(
                        strategy = strategy.name(),
                        rows = table.row_count(),
                        columns = table.column_count(),
                        "strategy succeeded"
                    );
                    return Ok(ChainSuccess {
                        table,
                        strategy: strategy.name().to_string(),
                        earlier_failures: failures,
                    });
                }
                Err(error) => {
                    warn!(strategy = strategy.name(), error = %error.message, "strategy failed");
                    failures.push(error);
                }
            }
        }
        Err(ChainFailure { failures })
    }
}

impl Default for StrategyChain {
    fn default() -> Self {
        Self::standard()
    }
}

impl fmt::Debug for StrategyChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_order() {
        let chain = StrategyChain::standard();
        assert_eq!(
            chain.names().collect::<Vec<_>>(),
            ["transport", "metadata", "legacy"]
        );
        assert_eq!(chain.len(), 3);
    }

    #[test]
    fn test_failure_message() {
        let failure = ChainFailure {
            failures: vec![
                StrategyError::new("transport", "e1"),
                StrategyError::new("metadata", "e2"),
                StrategyError::new("legacy", "e3"),
            ],
        };
        assert_eq!(
            failure.to_string(),
            "all strategies failed: transport(e1), metadata(e2), legacy(e3)"
        );
    }

    #[test]
    fn test_empty_chain_fails() {
        let chain = StrategyChain::new(Vec::new());
        assert!(chain.is_empty());
        let failure = chain.parse(Path::new("DEMO_J.xpt")).unwrap_err();
        assert!(failure.failures.is_empty());
    }
}
