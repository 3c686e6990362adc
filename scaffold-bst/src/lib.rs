#![deny(missing_docs)]
//! Belief State Tracker — domain classification, slot resolution, and
//! short-TTL conversational memory for the turn pipeline.
//!
//! Runs first in the per-turn pipeline. Given a raw user message and
//! the prior [`BeliefState`] (if any), it either rewrites the message
//! into a labeled, slot-enriched form, asks a clarifying question, or
//! passes the original message through unchanged. It never calls a
//! model — classification and slot filling are rule-based.

mod belief_state;
mod config;
mod resolver;
mod tracker;

pub use belief_state::{BeliefState, EnrichedMessage};
pub use config::{DomainSpec, SlotSpec, SlotTaxonomy};
pub use resolver::{ResolverInput, SlotResolver};
pub use tracker::{clear, tick, BeliefTracker, BstOutcome, BstOutput};

use thiserror::Error;

/// Errors internal to belief tracking.
///
/// Per the turn pipeline's backward-compatibility guarantee, none of
/// these ever escape [`BeliefTracker::process`] — they're trapped at
/// the boundary and degraded to a passthrough [`BstOutput`].
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum BstError {
    /// The slot taxonomy configuration was malformed.
    #[error("invalid taxonomy: {0}")]
    InvalidTaxonomy(String),

    /// A state store read/write failed.
    #[error("state error: {0}")]
    State(String),

    /// Catch-all.
    #[error("{0}")]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}
