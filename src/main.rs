use std::sync::Arc;

use anyhow::Context;
use chrono::Utc;
use clap::Parser;
use colored::*;
use tracing_subscriber::EnvFilter;

use github_dashboard::analytics::View;
use github_dashboard::api::{self, AppState};
use github_dashboard::cli::{Cli, Command};
use github_dashboard::github::GitHubClient;
use github_dashboard::session::Session;
use github_dashboard::storage::{StorageGateway, SurrealStore};
use github_dashboard::sync::{SyncOutcome, SyncReport, Syncer};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if it exists
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let store = SurrealStore::connect(&cli.store_config())
        .await
        .context("Failed to connect to SurrealDB")?;
    let gateway = StorageGateway::new(store);

    let client = GitHubClient::new(cli.client_config()).context("Failed to build GitHub client")?;
    let syncer = Syncer::new(Arc::new(client), gateway.clone());

    match cli.command {
        Command::Fetch { username } => match syncer.load_or_fetch(&username).await? {
            SyncOutcome::Cached => {
                println!("{} {}", "Loaded from storage:".green(), username.bold());
            }
            SyncOutcome::Fetched(report) => print_report(&report),
        },
        Command::Refresh { username } => {
            let report = syncer.refresh(&username).await?;
            print_report(&report);
        }
        Command::Show { username, section } => {
            let session = Session::for_user(&username).with_section(section);
            let panels = session.render(&gateway, Utc::now()).await.unwrap_or_default();

            println!("{} {}", "Section:".bold(), section.to_string().cyan());
            println!("{}", serde_json::to_string_pretty(&panels)?);
        }
        Command::Summary { username } => {
            match Session::for_user(&username).summary(&gateway).await? {
                View::Ready(summary) => {
                    println!("{}", summary.username.bold().green());
                    println!("{}\n", "=".repeat(50).dimmed());
                    println!("Followers:    {}", summary.followers);
                    println!("Following:    {}", summary.following);
                    println!("Public repos: {}", summary.public_repos);
                    println!("Total stars:  {}", summary.total_stars);
                }
                View::NoData => {
                    println!(
                        "{} {}",
                        "No stored data for".yellow(),
                        username.bold()
                    );
                }
            }
        }
        Command::Serve { port } => {
            println!("{}", "GitHub Profile Dashboard".bold().green());
            println!("{}\n", "=".repeat(50).dimmed());
            api::start_server(AppState::new(syncer), port).await?;
        }
    }

    Ok(())
}

fn print_report(report: &SyncReport) {
    println!("{} {}", "Fetched".green(), report.username.bold());
    println!("  Repositories: {}", report.repositories);
    println!("  Events:       {}", report.events);
    println!("  Commits:      {}", report.commits);
    println!("  Topic sets:   {}", report.topic_sets);
    println!("  Languages:    {}", report.languages);
}
