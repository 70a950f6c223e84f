//! Side-effecting adapters: git, the GitHub CLI, config and templates.

pub mod config;
pub mod document;
pub mod gh;
pub mod git;
pub mod process;
pub mod store;
pub mod templates;
pub mod tracker;
