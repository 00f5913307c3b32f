//! Credential and token models for the client-credentials exchange.

pub mod credentials;
pub mod secret;
pub mod token;

pub use credentials::*;
pub use secret::*;
pub use token::*;
