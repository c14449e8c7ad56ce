//! npm tools: npm_package_info, npm_package_versions, npm_search

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};
use toolbridge_application::{OperationRegistry, ToolExecutor};
use toolbridge_domain::DomainError;
use toolbridge_domain::tool::{
    Outcome, ParamType, SuccessValue, ToolDefinition, ToolFailure, ToolParameter, ValidatedArgs,
};

use super::client::NpmClient;

/// Tool name constants
pub const NPM_PACKAGE_INFO: &str = "npm_package_info";
pub const NPM_PACKAGE_VERSIONS: &str = "npm_package_versions";
pub const NPM_SEARCH: &str = "npm_search";

fn name_parameter() -> ToolParameter {
    ToolParameter::new("name", "Package name, e.g. 'react' or '@types/node'", true)
}

pub fn npm_package_info_definition() -> ToolDefinition {
    ToolDefinition::new(
        NPM_PACKAGE_INFO,
        "Get metadata for an npm package: description, latest version, license, homepage, repository and maintainers",
    )
    .with_parameter(name_parameter())
}

pub fn npm_package_versions_definition() -> ToolDefinition {
    ToolDefinition::new(
        NPM_PACKAGE_VERSIONS,
        "List the published versions and dist-tags of an npm package",
    )
    .with_parameter(name_parameter())
}

pub fn npm_search_definition() -> ToolDefinition {
    ToolDefinition::new(NPM_SEARCH, "Search the npm registry for packages")
        .with_parameter(ToolParameter::new("text", "Search text", true))
        .with_parameter(
            ToolParameter::new("size", "Number of results to return", false)
                .with_type(ParamType::Integer),
        )
}

#[derive(Debug, Deserialize)]
struct PackageInput {
    name: String,
}

#[derive(Debug, Deserialize)]
struct SearchInput {
    text: String,
    #[serde(default)]
    size: Option<u32>,
}

/// Condense a package document to the fields worth showing.
fn package_summary(doc: &Value) -> Value {
    let latest = doc["dist-tags"]["latest"].as_str();
    let latest_doc = latest.map(|v| &doc["versions"][v]).unwrap_or(&Value::Null);

    // Fields may live on the root or only on the latest version.
    let field = |key: &str| -> Value {
        match &doc[key] {
            Value::Null => latest_doc[key].clone(),
            value => value.clone(),
        }
    };

    let license = match field("license") {
        Value::Object(obj) => obj.get("type").cloned().unwrap_or(Value::Null),
        other => other,
    };
    let repository = match field("repository") {
        Value::Object(obj) => obj.get("url").cloned().unwrap_or(Value::Null),
        other => other,
    };
    let maintainers: Vec<Value> = doc["maintainers"]
        .as_array()
        .map(|list| list.iter().filter_map(|m| m.get("name").cloned()).collect())
        .unwrap_or_default();

    json!({
        "name": doc["name"],
        "description": field("description"),
        "latest": latest,
        "license": license,
        "homepage": field("homepage"),
        "repository": repository,
        "maintainers": maintainers,
    })
}

/// Versions ordered by publish time when known, otherwise as listed.
fn versions_summary(doc: &Value) -> Value {
    let mut versions: Vec<&String> = doc["versions"]
        .as_object()
        .map(|v| v.keys().collect())
        .unwrap_or_default();
    let times = &doc["time"];
    versions.sort_by(|a, b| {
        let ta = times[a.as_str()].as_str().unwrap_or("");
        let tb = times[b.as_str()].as_str().unwrap_or("");
        ta.cmp(tb)
    });

    json!({
        "name": doc["name"],
        "dist_tags": doc["dist-tags"],
        "versions": versions,
    })
}

fn search_summary(result: &Value) -> Value {
    let packages: Vec<Value> = result["objects"]
        .as_array()
        .map(|objects| {
            objects
                .iter()
                .map(|o| {
                    let pkg = &o["package"];
                    json!({
                        "name": pkg["name"],
                        "version": pkg["version"],
                        "description": pkg["description"],
                    })
                })
                .collect()
        })
        .unwrap_or_default();

    json!({
        "total": result["total"],
        "packages": packages,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NpmOperation {
    PackageInfo,
    PackageVersions,
    Search,
}

pub struct NpmExecutor {
    client: Arc<NpmClient>,
    op: NpmOperation,
    search_size: u32,
}

impl NpmExecutor {
    pub fn new(client: Arc<NpmClient>, op: NpmOperation, search_size: u32) -> Self {
        Self {
            client,
            op,
            search_size,
        }
    }

    async fn run(&self, args: &ValidatedArgs) -> Result<SuccessValue, ToolFailure> {
        let value = match self.op {
            NpmOperation::PackageInfo => {
                let input: PackageInput = args.decode()?;
                package_summary(&self.client.package(&input.name).await?)
            }
            NpmOperation::PackageVersions => {
                let input: PackageInput = args.decode()?;
                versions_summary(&self.client.package(&input.name).await?)
            }
            NpmOperation::Search => {
                let input: SearchInput = args.decode()?;
                let size = input.size.unwrap_or(self.search_size).clamp(1, 250);
                search_summary(&self.client.search(&input.text, size).await?)
            }
        };
        Ok(SuccessValue::new(value))
    }
}

#[async_trait]
impl ToolExecutor for NpmExecutor {
    async fn execute(&self, args: ValidatedArgs) -> Outcome {
        self.run(&args).await.into()
    }
}

pub fn npm_tools() -> Vec<(ToolDefinition, NpmOperation)> {
    vec![
        (npm_package_info_definition(), NpmOperation::PackageInfo),
        (npm_package_versions_definition(), NpmOperation::PackageVersions),
        (npm_search_definition(), NpmOperation::Search),
    ]
}

pub fn register_npm_tools(
    registry: &mut OperationRegistry,
    client: Arc<NpmClient>,
    search_size: u32,
) -> Result<(), DomainError> {
    for (definition, op) in npm_tools() {
        registry.register(
            definition,
            Arc::new(NpmExecutor::new(client.clone(), op, search_size)),
        )?;
    }
    Ok(())
}
