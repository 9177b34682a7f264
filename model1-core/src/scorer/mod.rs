//! Model 1 scoring: candidate cache, word scores, aggregation and projection

mod aggregate;
mod cache;
mod candidates;
mod projector;
#[cfg(test)]
mod scoring_tests;
mod word;

pub use aggregate::*;
pub use cache::*;
pub use candidates::*;
pub use projector::*;
pub use word::*;
