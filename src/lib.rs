//! skillsel - skill retrieval and selection engine.
//!
//! Given a corpus of skill documents (YAML frontmatter + Markdown body) and
//! a raw task description, the engine ranks the skills most likely to apply
//! and either auto-selects a clear winner, returns a shortlist of near-ties
//! for the caller to disambiguate, or reports no match.
//!
//! The pipeline: [`corpus::SkillStore`] loads and validates documents,
//! [`index`] builds an immutable inverted index generation over them,
//! [`query::QueryNormalizer`] turns raw text into comparable terms,
//! [`rank`] scores candidates against the index, and [`resolve`] maps the
//! ranked list to a three-way [`resolve::Decision`].
//! [`engine::SelectionEngine`] wires these together behind an atomically
//! swapped generation so queries never observe a half-built index.

pub mod analysis;
pub mod cli;
pub mod config;
pub mod corpus;
pub mod engine;
pub mod error;
pub mod index;
pub mod query;
pub mod rank;
pub mod resolve;
pub mod test_utils;

pub use config::Config;
pub use engine::{SelectionEngine, SelectionResponse};
pub use error::{Result, SelectError};
pub use resolve::Decision;
