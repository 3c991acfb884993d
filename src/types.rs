use serde::Deserialize;

// GitHub API response structures. Every field the API may omit or null out is
// optional here; defaults are applied in `normalize`.

#[derive(Debug, Deserialize)]
pub struct GitHubUser {
    pub login: Option<String>,
    pub followers: Option<u64>,
    pub following: Option<u64>,
    pub public_repos: Option<u64>,
    pub avatar_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct GitHubRepo {
    pub name: String,
    pub stargazers_count: Option<u64>,
    pub forks_count: Option<u64>,
    pub size: Option<u64>,
    pub language: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
    pub fork: Option<bool>,
    pub archived: Option<bool>,
    pub topics: Option<Vec<String>>,
    pub open_issues_count: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct GitHubEvent {
    #[serde(rename = "type")]
    pub event_type: Option<String>,
    pub repo: Option<GitHubEventRepo>,
    pub created_at: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct GitHubEventRepo {
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct GitHubCommit {
    pub commit: Option<GitHubCommitDetail>,
}

#[derive(Debug, Deserialize)]
pub struct GitHubCommitDetail {
    pub author: Option<GitHubCommitAuthor>,
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct GitHubCommitAuthor {
    pub date: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct GitHubTopics {
    pub names: Option<Vec<String>>,
}

/// Body GitHub sends alongside 4xx/5xx responses.
#[derive(Debug, Default, Deserialize)]
pub struct GitHubErrorBody {
    pub message: Option<String>,
}
