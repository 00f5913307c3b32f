//! Identity-provider descriptors (data) and rejection classification (behavior).
//!
//! `descriptor` exposes the validated endpoint set used by the credential exchange, with an
//! Investec default. `strategy` classifies token-endpoint failures into [`RejectionKind`] values
//! following RFC 6749 section 5.2.

pub mod descriptor;
pub mod strategy;

pub use descriptor::*;
pub use strategy::*;
