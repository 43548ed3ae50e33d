//! Utility modules for site scoring
//!
//! Contains shared numeric functionality used across pipeline stages:
//! - Normalization: min-max rescaling with the degenerate-field policy
//! - Summation: compensated accumulation for score fusion and statistics

pub mod normalization;
pub mod summation;

// Re-export commonly used functions
pub use normalization::{finite_range, normalize_field};
pub use summation::{mean, stable_sum, NeumaierSum};
