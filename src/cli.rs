use std::time::Duration;

use clap::{Parser, Subcommand};

use crate::config::{ClientConfig, FetchLimits, StoreConfig, DEFAULT_API_URL};
use crate::presentation::DashboardSection;

#[derive(Parser)]
#[command(name = "github-dashboard")]
#[command(about = "GitHub Profile Dashboard - Fetches a GitHub profile and derives dashboard datasets")]
#[command(version = "0.1.0")]
pub struct Cli {
    /// SurrealDB connection URL (mem:// for an embedded store)
    #[arg(long, env = "DB_URL", default_value = "mem://")]
    pub db_url: String,

    /// SurrealDB username
    #[arg(long, env = "DB_USER", default_value = "root")]
    pub db_user: String,

    /// SurrealDB password
    #[arg(long, env = "DB_PASS", default_value = "root")]
    pub db_pass: String,

    /// SurrealDB namespace
    #[arg(long, env = "DB_NAMESPACE", default_value = "github_dashboard")]
    pub db_namespace: String,

    /// SurrealDB database
    #[arg(long, env = "DB_DATABASE", default_value = "dashboard")]
    pub db_database: String,

    /// GitHub REST API base URL
    #[arg(long, env = "GITHUB_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// Number of repositories scanned for commits
    #[arg(long, env = "COMMIT_REPO_LIMIT", default_value_t = 10)]
    pub commit_repo_limit: usize,

    /// Number of repositories scanned for topics
    #[arg(long, env = "TOPIC_REPO_LIMIT", default_value_t = 20)]
    pub topic_repo_limit: usize,

    /// HTTP timeout for GitHub requests, in seconds
    #[arg(long, default_value_t = 30)]
    pub timeout_secs: u64,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Fetch a user unless a stored snapshot already exists
    Fetch { username: String },

    /// Discard the stored snapshot and fetch the user again
    Refresh { username: String },

    /// Print the panels of one dashboard section as JSON
    Show {
        username: String,

        #[arg(long, default_value = "overview")]
        section: DashboardSection,
    },

    /// Print the profile header figures
    Summary { username: String },

    /// Serve the dashboard over HTTP
    Serve {
        #[arg(long, env = "PORT", default_value_t = 8080)]
        port: u16,
    },
}

impl Cli {
    pub fn store_config(&self) -> StoreConfig {
        StoreConfig {
            url: self.db_url.clone(),
            username: self.db_user.clone(),
            password: self.db_pass.clone(),
            namespace: self.db_namespace.clone(),
            database: self.db_database.clone(),
        }
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            api_url: self.api_url.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
            limits: FetchLimits {
                commit_repos: self.commit_repo_limit,
                topic_repos: self.topic_repo_limit,
                ..FetchLimits::default()
            },
        }
    }
}
