//! Integration tests for the snapshot store

mod common;
mod config_loading;
mod history_navigation;
mod tree_determinism;
