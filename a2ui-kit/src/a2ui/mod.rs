//! A2UI Protocol Implementation
//!
//! A2UI (Agent-to-UI) is a declarative JSON protocol for AI agents to generate
//! rich, interactive UIs. This module implements the message-driven core a
//! renderer sits on: it owns surfaces, their component tables and data
//! models, resolves bound values, and routes user actions back out. Drawing
//! is left to the host, which looks up its handlers in a [`ComponentRegistry`].
//!
//! # Architecture
//!
//! ```text
//! A2UI JSON Messages
//!        ↓
//! decode_message ── normalizes legacy field names
//!        ↓
//! A2uiMessageProcessor ── caps, id checks, atomic commit
//!        ↓
//! ┌──────┴──────┐
//! │             │
//! DataModel  Component table
//!    │             │
//!    └──────┬──────┘
//!           ↓
//!       Resolver ── paths, scopes, FunctionLibrary
//!           ↓
//!   Host renderer (ComponentRegistry)
//!           ↓
//!    ActionDispatcher → UserAction
//! ```
//!
//! # Example
//!
//! ```rust
//! use a2ui_kit::a2ui::*;
//!
//! let processor = A2uiMessageProcessor::new();
//! processor
//!     .process_message(r#"{"createSurface": {"surfaceId": "s1", "catalogId": "standard"}}"#)
//!     .unwrap();
//! processor
//!     .process_message(r#"{"updateComponents": {"surfaceId": "s1", "components": [
//!         {"id": "root", "component": "Text", "text": "hi"}
//!     ]}}"#)
//!     .unwrap();
//!
//! let root = processor.get_component("s1", "root").unwrap();
//! let text = processor.resolve_value("s1", root.text.as_ref().unwrap(), None);
//! assert_eq!(text, "hi");
//! ```

mod action;
mod component;
mod config;
mod data_model;
mod error;
pub mod functions;
mod message;
mod path;
mod processor;
mod registry;
mod resolver;
mod safe_regex;
mod snapshot;
mod value;

pub use action::*;
pub use component::*;
pub use config::*;
pub use data_model::*;
pub use error::*;
pub use functions::{FunctionContext, FunctionImpl, FunctionLibrary};
pub use message::*;
pub use path::*;
pub use processor::*;
pub use registry::*;
pub use resolver::*;
pub use safe_regex::*;
pub use snapshot::*;
pub use value::*;
