//! Test utilities shared by unit and integration tests.
//!
//! Exposed from the library so `tests/` harnesses reuse the exact fixture
//! corpus the unit tests exercise.

pub mod fixtures;

pub use fixtures::{sample_corpus, skill_doc, write_corpus};
