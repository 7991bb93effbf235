use std::time::Duration;

use crate::config::{endpoint, ToolsConfig};
use crate::error::ToolsError;
use crate::http::get_json;
use crate::prelude::*;
use reqwest::Client;

/// Input for looking up a GitHub repository
#[derive(Debug, Deserialize, JsonSchema)]
pub struct GithubRepoInput {
    /// The name of the repository owner
    pub owner: String,

    /// The name of the repository
    pub repo: String,
}

/// The repository fields the `Github` component renders
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepoSummary {
    pub owner: String,
    pub repo: String,
    pub description: Option<String>,
    pub stars: u64,
    pub language: Option<String>,
}

#[derive(Deserialize)]
struct ApiRepo {
    description: Option<String>,
    stargazers_count: u64,
    language: Option<String>,
}

/// Renders a GitHub repository card
pub struct GithubRepoTool {
    client: Client,
    api_url: String,
    loading_delay: Duration,
}

impl GithubRepoTool {
    pub fn new(config: &ToolsConfig, client: Client) -> Self {
        Self {
            client,
            api_url: config.github_api_url.clone(),
            loading_delay: config.loading_delay,
        }
    }

    async fn fetch(&self, input: &GithubRepoInput) -> Result<RepoSummary, ToolsError> {
        let url = endpoint(
            &self.api_url,
            &format!("repos/{}/{}", input.owner, input.repo),
        );
        let no_query: [(&str, &str); 0] = [];
        let repo: ApiRepo = get_json(&self.client, &url, &no_query).await?;

        Ok(RepoSummary {
            owner: input.owner.clone(),
            repo: input.repo.clone(),
            description: repo.description,
            stars: repo.stargazers_count,
            language: repo.language,
        })
    }
}

impl Tool for GithubRepoTool {
    type Input = GithubRepoInput;

    fn name(&self) -> &str {
        "github_repo"
    }

    fn description(&self) -> &str {
        "A tool to fetch details of a Github repository. Given owner and repo names, \
         this tool will return the repo description, stars, and primary language."
    }

    async fn execute(&self, input: Self::Input, ui: &ToolUi) -> Result<ToolOutput, ToolError> {
        ui.update(Fragment::bare("GithubLoading"))?;

        let summary = self.fetch(&input).await.map_err(|e| {
            ToolError::Custom(format!(
                "Failed to fetch repository {}/{}: {}",
                input.owner, input.repo, e
            ))
        })?;

        if !self.loading_delay.is_zero() {
            tokio::time::sleep(self.loading_delay).await;
        }

        ui.done(Fragment::component("Github", serde_json::to_value(&summary)?))?;
        Ok(ToolOutput::json(&summary)?)
    }
}
