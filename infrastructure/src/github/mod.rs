//! GitHub adapter
//!
//! Mutating repository operations over the REST API, authenticated with a
//! personal access token.

mod client;
mod tools;

pub use client::{FileWrite, GitHubClient, GitHubError, NewIssue};
pub use tools::{GitHubExecutor, GitHubOperation, github_tools, register_github_tools};
