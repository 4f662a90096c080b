//! Anthropic-style messages provider for PageHands.

mod api;
mod converter;
mod parser;
mod provider;

pub use provider::AnthropicProvider;
