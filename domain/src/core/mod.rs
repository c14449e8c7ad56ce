//! Core domain concepts shared across all subdomains.
//!
//! - [`error::DomainError`]: registry and definition errors
//! - [`string`]: text helpers used when rendering messages

pub mod error;
pub mod string;
