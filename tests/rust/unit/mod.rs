//! Unit tests - Fast, isolated tests of public building blocks
//!
//! These tests run without fixtures on disk beyond temporary files.

mod config_loading_tests;
mod schema_loading_tests;
