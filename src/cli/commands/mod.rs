//! CLI command implementations

pub mod comment;
pub mod dep;
pub mod init;
pub mod item;
pub mod label;
pub mod member;
pub mod project;
pub mod report;
pub mod sprint;
pub mod user;
