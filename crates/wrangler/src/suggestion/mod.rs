//! Suggestions for data quality improvements.
//!
//! A fixed rule engine inspects a dataset and proposes named operations,
//! each with a heuristic confidence. Suggestions carry their operation as a
//! `{name, params}` pair that resolves to a typed [`crate::Operation`].

mod generator;
mod suggestion;
mod tracker;

pub use generator::{
    generate_suggestions, SuggestionConfig, SuggestionGenerator, STANDARD_DATE_FORMAT,
};
pub use suggestion::{SuggestedOperation, Suggestion, SuggestionStatus, SuggestionType};
pub use tracker::{StatusCounts, SuggestionTracker};
