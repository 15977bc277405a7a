//! Intraday circuit-limit probabilities.
//!
//! Five-minute bars for a symbol are turned into four features per bar, every
//! bar is labeled with the circuit (if any) its trading day closed at, and a
//! random forest retrained on each run estimates the chance that the latest bar
//! belongs to an upper- or lower-circuit day.

pub mod cli;
pub mod config;
pub mod errors;
pub mod features;
pub mod labeling;
pub mod model;
pub mod pipeline;
pub mod render;
pub mod scanner;
