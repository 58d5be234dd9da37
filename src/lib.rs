//! rulebot - a declarative automation rule engine
//!
//! Rules are persisted as small object-literal text documents (trigger,
//! optional condition, ordered actions, generated mappers) and evaluated
//! by a single-threaded engine. This crate provides the document
//! parser/serializer, the component registry, the staged editing model,
//! the runtime, and a CLI for checking and formatting rule files.

#![deny(unsafe_code)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod cli;
pub mod components;
pub mod config;
pub mod definition;
pub mod document;
pub mod engine;
pub mod error;
pub mod mapper;
pub mod registry;
pub mod store;

pub use cli::args::{Cli, Commands, OutputFormat};
pub use engine::{Engine, EngineState};
pub use error::RulebotError;
