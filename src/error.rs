use std::io;

use thiserror::Error;

/// A defect in the built-in difficulty table or jump tuning.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("stage table is empty")]
    EmptyTable,

    #[error("stage 0 must start at score 0, found {0}")]
    FirstThreshold(u64),

    #[error("stage {index}: threshold {threshold} does not exceed the previous threshold {previous}")]
    ThresholdOrder {
        index: usize,
        threshold: u64,
        previous: u64,
    },

    #[error("stage {index}: {field} = {value} is outside [0, 1]")]
    Probability {
        index: usize,
        field: &'static str,
        value: f64,
    },

    #[error("stage {index}: short and group cactus ratios sum to {sum}, above 1")]
    CactusRatios { index: usize, sum: f64 },

    #[error("stage {index}: speed must be positive, found {speed}")]
    Speed { index: usize, speed: f64 },

    #[error("stage {index}: spawn gap bounds [{min}, {max}] are invalid")]
    GapBounds { index: usize, min: f64, max: f64 },

    #[error("jump tuning: {0}")]
    Jump(&'static str),
}

/// Fatal start-up errors.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("invalid game configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("terminal error: {0}")]
    Terminal(#[from] io::Error),
}
