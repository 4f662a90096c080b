//! OpenAI-style chat completions provider for PageHands.

mod api;
mod converter;
mod parser;
mod provider;

pub use provider::OpenAIProvider;
