//! # nl-sql-gateway
//!
//! Natural-language query gateway over a single SQLite table.
//!
//! A request's free text is translated into SQL by a text-generation
//! service, checked by a read-only safety firewall, executed against the
//! store and returned as a JSON envelope.
//!
//! # Modules
//!
//! - [`translate`] - prompt rendering and model-output parsing
//! - [`llm`] - text-generation providers (OpenAI, Anthropic, Ollama)
//! - [`validator`] - statement policy firewall
//! - [`executor`] - read-only SQLite execution
//! - [`output`] - response envelopes and CLI rendering
//! - [`gateway`] - per-request orchestration
//! - [`server`] - HTTP routes
//! - [`config`] - configuration loading
//! - [`app`] - CLI command logic
//! - [`error`] - error types and constructors

pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod executor;
pub mod gateway;
pub mod llm;
pub mod output;
pub mod server;
pub mod translate;
pub mod types;
pub mod validator;
