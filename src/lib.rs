//! Sprinter: hierarchical projects, sprints and work items
//!
//! A Unix-style tracker backed by a local SQLite database. Access to a
//! project is granted by membership in it or in any of its ancestors.

pub mod cli;
pub mod core;
