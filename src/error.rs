use thiserror::Error;

/// Reasons an `EngineProfile` cannot be used to build an engine.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProfileError {
    #[error("phase thresholds must increase: early phase ends at {early_until}, late phase starts at {late_from}")]
    PhaseOrder { early_until: u32, late_from: u32 },
    #[error("path cache capacity must be at least 1")]
    ZeroCacheCapacity,
    #[error("urgency threshold must be finite, got {0}")]
    NonFiniteThreshold(f32),
    #[error("aggression must be finite and non-negative, got {0}")]
    InvalidAggression(f32),
    #[error("unknown profile preset '{0}'")]
    UnknownPreset(String),
}
