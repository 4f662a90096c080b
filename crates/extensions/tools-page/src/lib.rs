//! Page tools for PageHands.
//!
//! The executor side of the orchestrator: it resolves natural-language
//! element descriptions against a [`DocumentHandle`], runs the six built-in
//! tools, and answers [`ExecutorRequest`]s arriving over a [`MessageBus`].
//!
//! ## Tools
//!
//! - `click_element` - Click an element described in natural language
//! - `fill_form` - Fill an input, textarea or select
//! - `scroll_page` - Scroll up, down, or to either end
//! - `find_text` - Highlight text matches and scroll to the first
//! - `extract_data` - Declarative, selector-based extraction
//! - `navigate` - Open a URL in the current tab
//!
//! ## Hosts
//!
//! [`MemoryDocument`] is a complete in-memory document, and [`InProcessBus`]
//! wires documents to executors inside one process.
//!
//! [`DocumentHandle`]: pagehands_protocols::page::DocumentHandle
//! [`ExecutorRequest`]: pagehands_protocols::bus::ExecutorRequest
//! [`MessageBus`]: pagehands_protocols::bus::MessageBus

pub mod actions;
mod bus;
mod debounce;
pub mod document;
mod executor;
mod resolver;
mod structure;

pub use actions::ActionContext;
pub use bus::InProcessBus;
pub use debounce::{DomChangeNotifier, PageEvent, TrailingDebounce};
pub use document::{el, DocumentBuilder, DocumentEvent, El, MemoryDocument};
pub use executor::PageExecutor;
pub use resolver::{keywords, ElementResolver, ResolveError, ResolveMethod, ResolveScope, Resolved};
pub use structure::{page_structure, selector_for, MAX_INTERACTIVE};
