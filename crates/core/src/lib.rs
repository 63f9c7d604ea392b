//! # Chatfolio Core
//!
//! Domain types, traits, and error definitions for the Chatfolio portfolio
//! chatbot. This crate has **no framework dependencies** — it defines the
//! domain model that the provider and gateway crates implement against.
//!
//! ## Design Philosophy
//!
//! The completion backend is defined as a trait here and implemented in
//! `chatfolio-providers`. This enables:
//! - Swapping the upstream API via configuration
//! - Easy testing with mock/stub providers
//! - Keeping provider-specific error types out of the HTTP layer

pub mod error;
pub mod message;
pub mod provider;

// Re-export key types at crate root for ergonomics
pub use error::{CompletionError, ProviderError};
pub use message::{Message, Role};
pub use provider::{Provider, ProviderRequest, ProviderResponse, Usage};
