use clap::Parser;
use github_dashboard::cli::{Cli, Command};
use github_dashboard::presentation::DashboardSection;

#[test]
fn test_show_parses_section() {
    let cli = Cli::try_parse_from([
        "github-dashboard",
        "show",
        "octocat",
        "--section",
        "Productivity",
    ])
    .unwrap();

    match cli.command {
        Command::Show { username, section } => {
            assert_eq!(username, "octocat");
            assert_eq!(section, DashboardSection::Productivity);
        }
        _ => panic!("Expected the show command"),
    }
}

#[test]
fn test_unknown_section_is_rejected() {
    let result = Cli::try_parse_from(["github-dashboard", "show", "octocat", "--section", "nope"]);
    assert!(result.is_err());
}

#[test]
fn test_flags_build_configs() {
    let cli = Cli::try_parse_from([
        "github-dashboard",
        "--db-url",
        "ws://db.internal:8000",
        "--api-url",
        "http://127.0.0.1:9000",
        "--commit-repo-limit",
        "3",
        "--topic-repo-limit",
        "5",
        "--timeout-secs",
        "7",
        "refresh",
        "octocat",
    ])
    .unwrap();

    let store = cli.store_config();
    assert_eq!(store.url, "ws://db.internal:8000");
    assert!(store.requires_signin());

    let client = cli.client_config();
    assert_eq!(client.api_url, "http://127.0.0.1:9000");
    assert_eq!(client.timeout.as_secs(), 7);
    assert_eq!(client.limits.commit_repos, 3);
    assert_eq!(client.limits.topic_repos, 5);
    assert_eq!(client.limits.per_page, 100);

    assert!(matches!(cli.command, Command::Refresh { ref username } if username == "octocat"));
}

#[test]
fn test_serve_port() {
    let cli = Cli::try_parse_from(["github-dashboard", "serve", "--port", "3000"]).unwrap();
    assert!(matches!(cli.command, Command::Serve { port: 3000 }));
}
