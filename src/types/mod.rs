//! Type definitions for the fraud predictor

pub mod input;
pub mod prediction;

pub use input::InputVector;
pub use prediction::{Prediction, ScoreOutcome, Verdict};
