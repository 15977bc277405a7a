use market_data_ingestor::providers::ProviderError;
use shared_utils::config::ConfigError;
use thiserror::Error;

use crate::model::ModelError;

/// Why a symbol could not be forecast.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The vendor returned nothing for the symbol.
    #[error("no {what} available for {symbol}")]
    DataUnavailable { symbol: String, what: &'static str },

    /// Too few usable feature rows to train on.
    #[error("insufficient data for {symbol}: {rows} usable rows, need {required}")]
    InsufficientData {
        symbol: String,
        rows: usize,
        required: usize,
    },

    #[error("market data request failed for {symbol}: {source}")]
    Provider {
        symbol: String,
        #[source]
        source: ProviderError,
    },

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("analysis task for {symbol} failed: {message}")]
    Task { symbol: String, message: String },
}

impl PipelineError {
    /// `true` for "nothing to work with" outcomes that are reported as warnings.
    pub fn is_data_gap(&self) -> bool {
        matches!(
            self,
            PipelineError::DataUnavailable { .. } | PipelineError::InsufficientData { .. }
        )
    }
}
