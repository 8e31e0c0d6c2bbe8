//! `lorikeet-perception` – turns hand landmarks into intent.
//!
//! # Modules
//!
//! - [`classifier`] – [`GestureClassifier`][classifier::GestureClassifier]:
//!   a stateless, per-frame mapping from a
//!   [`HandSkeleton`][lorikeet_types::HandSkeleton] to at most one
//!   [`GestureSymbol`][lorikeet_types::GestureSymbol], using planar
//!   fingertip-to-wrist distances and a fixed tie-break order.

pub mod classifier;

pub use classifier::{ClassifierConfig, FingerState, GestureClassifier, HandMetrics};
