//! Local Ollama-style chat provider for PageHands.
//!
//! The local backend has no tool calling; tool turns already in a history are
//! folded into plain text.

mod api;
mod converter;
mod provider;

pub use provider::LocalProvider;
