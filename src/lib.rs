//! Askroute: conversational tool router.
//!
//! Classifies a chat message, runs the matching tool chain or prompt
//! template against a model provider, and records every step so the
//! answer can be explained as a diagram.

pub mod config;
pub mod context;
pub mod error;
pub mod inference;
pub mod render;
pub mod router;
pub mod session;
pub mod templates;
pub mod tools;
pub mod types;

#[cfg(test)]
mod test_support;
