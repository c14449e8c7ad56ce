//! GitHub tools: issues, comments, file writes and branches

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};
use toolbridge_application::{OperationRegistry, ToolExecutor};
use toolbridge_domain::DomainError;
use toolbridge_domain::tool::{
    Outcome, ParamType, SuccessValue, ToolDefinition, ToolFailure, ToolParameter, ValidatedArgs,
};
use tracing::debug;

use super::client::{FileWrite, GitHubClient, NewIssue};

/// Tool name constants
pub const GITHUB_CREATE_ISSUE: &str = "github_create_issue";
pub const GITHUB_ADD_ISSUE_COMMENT: &str = "github_add_issue_comment";
pub const GITHUB_CREATE_OR_UPDATE_FILE: &str = "github_create_or_update_file";
pub const GITHUB_CREATE_BRANCH: &str = "github_create_branch";

fn repo_parameters(definition: ToolDefinition) -> ToolDefinition {
    definition
        .with_parameter(ToolParameter::new("owner", "Repository owner (user or organization)", true))
        .with_parameter(ToolParameter::new("repo", "Repository name", true))
}

pub fn github_create_issue_definition() -> ToolDefinition {
    repo_parameters(ToolDefinition::new(
        GITHUB_CREATE_ISSUE,
        "Create a new issue in a GitHub repository",
    ))
    .with_parameter(ToolParameter::new("title", "Issue title", true))
    .with_parameter(ToolParameter::new("body", "Issue body (Markdown)", false))
    .with_parameter(
        ToolParameter::new("labels", "Labels to apply", false).with_type(ParamType::StringArray),
    )
}

pub fn github_add_issue_comment_definition() -> ToolDefinition {
    repo_parameters(ToolDefinition::new(
        GITHUB_ADD_ISSUE_COMMENT,
        "Add a comment to an existing issue or pull request",
    ))
    .with_parameter(
        ToolParameter::new("issue_number", "Issue or pull request number", true)
            .with_type(ParamType::Integer),
    )
    .with_parameter(ToolParameter::new("body", "Comment text (Markdown)", true))
}

pub fn github_create_or_update_file_definition() -> ToolDefinition {
    repo_parameters(ToolDefinition::new(
        GITHUB_CREATE_OR_UPDATE_FILE,
        "Create or update a single file in a GitHub repository",
    ))
    .with_parameter(ToolParameter::new("path", "Path of the file in the repository", true))
    .with_parameter(ToolParameter::new("content", "New file content (plain text)", true))
    .with_parameter(ToolParameter::new("message", "Commit message", true))
    .with_parameter(ToolParameter::new(
        "branch",
        "Branch to commit to (default: repository default branch)",
        false,
    ))
    .with_parameter(ToolParameter::new(
        "sha",
        "Blob SHA of the file being replaced; required when updating",
        false,
    ))
}

pub fn github_create_branch_definition() -> ToolDefinition {
    repo_parameters(ToolDefinition::new(
        GITHUB_CREATE_BRANCH,
        "Create a new branch in a GitHub repository",
    ))
    .with_parameter(ToolParameter::new("branch", "Name of the new branch", true))
    .with_parameter(ToolParameter::new(
        "from_branch",
        "Source branch (default: repository default branch)",
        false,
    ))
}

#[derive(Debug, Deserialize)]
struct CreateIssueInput {
    owner: String,
    repo: String,
    title: String,
    #[serde(default)]
    body: Option<String>,
    #[serde(default)]
    labels: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct CommentInput {
    owner: String,
    repo: String,
    issue_number: u64,
    body: String,
}

#[derive(Debug, Deserialize)]
struct FileInput {
    owner: String,
    repo: String,
    path: String,
    content: String,
    message: String,
    #[serde(default)]
    branch: Option<String>,
    #[serde(default)]
    sha: Option<String>,
}

#[derive(Debug, Deserialize)]
struct BranchInput {
    owner: String,
    repo: String,
    branch: String,
    #[serde(default)]
    from_branch: Option<String>,
}

fn issue_summary(issue: &Value) -> Value {
    json!({
        "number": issue["number"],
        "title": issue["title"],
        "state": issue["state"],
        "html_url": issue["html_url"],
    })
}

fn comment_summary(comment: &Value) -> Value {
    json!({
        "id": comment["id"],
        "html_url": comment["html_url"],
    })
}

fn file_summary(result: &Value) -> Value {
    json!({
        "path": result["content"]["path"],
        "sha": result["content"]["sha"],
        "commit": {
            "sha": result["commit"]["sha"],
            "html_url": result["commit"]["html_url"],
        },
    })
}

fn branch_summary(reference: &Value) -> Value {
    json!({
        "ref": reference["ref"],
        "sha": reference["object"]["sha"],
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GitHubOperation {
    CreateIssue,
    AddIssueComment,
    CreateOrUpdateFile,
    CreateBranch,
}

pub struct GitHubExecutor {
    client: Arc<GitHubClient>,
    op: GitHubOperation,
}

impl GitHubExecutor {
    pub fn new(client: Arc<GitHubClient>, op: GitHubOperation) -> Self {
        Self { client, op }
    }

    async fn run(&self, args: &ValidatedArgs) -> Result<SuccessValue, ToolFailure> {
        let client = &self.client;
        let value = match self.op {
            GitHubOperation::CreateIssue => {
                let input: CreateIssueInput = args.decode()?;
                let issue = NewIssue {
                    title: input.title,
                    body: input.body,
                    labels: input.labels,
                };
                issue_summary(&client.create_issue(&input.owner, &input.repo, &issue).await?)
            }
            GitHubOperation::AddIssueComment => {
                let input: CommentInput = args.decode()?;
                let comment = client
                    .add_issue_comment(&input.owner, &input.repo, input.issue_number, &input.body)
                    .await?;
                comment_summary(&comment)
            }
            GitHubOperation::CreateOrUpdateFile => {
                let input: FileInput = args.decode()?;
                let file = FileWrite {
                    path: input.path,
                    content: input.content,
                    message: input.message,
                    branch: input.branch,
                    sha: input.sha,
                };
                file_summary(
                    &client
                        .create_or_update_file(&input.owner, &input.repo, &file)
                        .await?,
                )
            }
            GitHubOperation::CreateBranch => {
                let input: BranchInput = args.decode()?;
                let source = match input.from_branch {
                    Some(branch) => branch,
                    None => client.default_branch(&input.owner, &input.repo).await?,
                };
                let sha = client.branch_sha(&input.owner, &input.repo, &source).await?;
                debug!(branch = %input.branch, from = %source, %sha, "Creating branch");
                branch_summary(
                    &client
                        .create_branch(&input.owner, &input.repo, &input.branch, &sha)
                        .await?,
                )
            }
        };
        Ok(SuccessValue::new(value))
    }
}

#[async_trait]
impl ToolExecutor for GitHubExecutor {
    async fn execute(&self, args: ValidatedArgs) -> Outcome {
        self.run(&args).await.into()
    }
}

pub fn github_tools() -> Vec<(ToolDefinition, GitHubOperation)> {
    vec![
        (github_create_issue_definition(), GitHubOperation::CreateIssue),
        (github_add_issue_comment_definition(), GitHubOperation::AddIssueComment),
        (
            github_create_or_update_file_definition(),
            GitHubOperation::CreateOrUpdateFile,
        ),
        (github_create_branch_definition(), GitHubOperation::CreateBranch),
    ]
}

pub fn register_github_tools(
    registry: &mut OperationRegistry,
    client: Arc<GitHubClient>,
) -> Result<(), DomainError> {
    for (definition, op) in github_tools() {
        registry.register(definition, Arc::new(GitHubExecutor::new(client.clone(), op)))?;
    }
    Ok(())
}
