//! Presentation Adapter: reshapes derived views into chart payloads.
//!
//! Nothing here computes statistics. Each panel is either a payload the
//! rendering layer can draw or [`ChartPayload::NoData`], and a panel that
//! fails to load never takes its siblings down with it.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::warn;

use crate::analytics::commits::{
    CommitHeatmap, ContributionCalendar, MonthlyCount, TrendPoint, HOURS,
};
use crate::analytics::languages::LanguageStats;
use crate::analytics::profile::{EventCount, IssueStatus, SkillRadar, TimelinePoint};
use crate::analytics::repos::{
    BucketCount, GrowthPoint, LeaderboardEntry, Leaderboards, TopicCount, TrendingRepo,
};
use crate::analytics::{Aggregator, View};
use crate::error::Result;
use crate::models::LanguageAggregate;

pub fn language_color(language: &str) -> Option<&'static str> {
    let color = match language {
        "Python" => "#3776ab",
        "JavaScript" => "#f7df1e",
        "TypeScript" => "#3178c6",
        "Java" => "#b07219",
        "C++" => "#f34b7d",
        "C" => "#555555",
        "C#" => "#178600",
        "Go" => "#00add8",
        "Rust" => "#dea584",
        "Ruby" => "#701516",
        "PHP" => "#4f5d95",
        "Swift" => "#ffac45",
        "Kotlin" => "#a97bff",
        "Dart" => "#00b4ab",
        "HTML" => "#e34c26",
        "CSS" => "#563d7c",
        "Shell" => "#89e051",
        _ => return None,
    };
    Some(color)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub name: String,
    pub x: Vec<String>,
    pub y: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarSeries {
    pub name: String,
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BubblePoint {
    pub x: String,
    pub y: f64,
    pub size: f64,
    pub group: String,
    pub label: String,
    pub color: Option<&'static str>,
}

/// A sized mark on a time axis against a categorical axis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimelineMark {
    pub at: String,
    pub category: String,
    pub size: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Table {
    pub name: String,
    pub columns: Vec<&'static str>,
    pub rows: Vec<Vec<Value>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChartPayload {
    Line {
        x_label: &'static str,
        y_label: &'static str,
        series: Vec<Series>,
    },
    Bars {
        x_label: &'static str,
        y_label: &'static str,
        horizontal: bool,
        categories: Vec<String>,
        series: Vec<BarSeries>,
    },
    Pie {
        labels: Vec<String>,
        values: Vec<f64>,
        colors: Vec<Option<&'static str>>,
        hole: f64,
    },
    Heatmap {
        x: Vec<String>,
        y: Vec<String>,
        z: Vec<Vec<f64>>,
    },
    Radar {
        axes: Vec<String>,
        values: Vec<f64>,
        max: f64,
    },
    Bubble {
        x_label: &'static str,
        y_label: &'static str,
        points: Vec<BubblePoint>,
    },
    Timeline {
        x_label: &'static str,
        y_label: &'static str,
        marks: Vec<TimelineMark>,
    },
    Treemap {
        labels: Vec<String>,
        values: Vec<f64>,
    },
    Tables {
        tables: Vec<Table>,
    },
    NoData,
}

impl ChartPayload {
    pub fn is_no_data(&self) -> bool {
        matches!(self, ChartPayload::NoData)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Panel {
    pub title: &'static str,
    pub chart: ChartPayload,
}

/// Build a panel from a view, falling back to the placeholder on `NoData` or
/// on a load failure.
pub fn panel<T>(
    title: &'static str,
    loaded: Result<View<T>>,
    to_chart: impl FnOnce(T) -> ChartPayload,
) -> Panel {
    let chart = match loaded {
        Ok(View::Ready(data)) => to_chart(data),
        Ok(View::NoData) => ChartPayload::NoData,
        Err(e) => {
            warn!(panel = title, error = %e, "Panel failed to load, rendering placeholder");
            ChartPayload::NoData
        }
    };
    Panel { title, chart }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DashboardSection {
    #[default]
    Overview,
    Repositories,
    Skills,
    Activity,
    Productivity,
    Growth,
}

impl DashboardSection {
    pub const ALL: [DashboardSection; 6] = [
        DashboardSection::Overview,
        DashboardSection::Repositories,
        DashboardSection::Skills,
        DashboardSection::Activity,
        DashboardSection::Productivity,
        DashboardSection::Growth,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DashboardSection::Overview => "overview",
            DashboardSection::Repositories => "repositories",
            DashboardSection::Skills => "skills",
            DashboardSection::Activity => "activity",
            DashboardSection::Productivity => "productivity",
            DashboardSection::Growth => "growth",
        }
    }
}

impl fmt::Display for DashboardSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DashboardSection {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        DashboardSection::ALL
            .into_iter()
            .find(|section| section.as_str() == wanted)
            .ok_or_else(|| format!("unknown dashboard section: {}", s))
    }
}

/// Render every panel of a section. `now` anchors the star-velocity view.
pub async fn render_section(
    aggregator: &Aggregator,
    section: DashboardSection,
    now: DateTime<Utc>,
) -> Vec<Panel> {
    match section {
        DashboardSection::Overview => vec![
            panel(
                "Star Growth Over Time",
                aggregator.cumulative_growth().await,
                star_growth_chart,
            ),
            panel(
                "Monthly Commits",
                aggregator.monthly_commits().await,
                monthly_commits_chart,
            ),
            panel(
                "Contribution Calendar",
                aggregator.contribution_calendar().await,
                calendar_chart,
            ),
        ],
        DashboardSection::Repositories => vec![
            panel(
                "Top Repositories",
                aggregator.leaderboards().await,
                leaderboard_tables,
            ),
            panel(
                "Repository Size Distribution",
                aggregator.size_distribution().await,
                size_distribution_chart,
            ),
            panel(
                "Repository Topics",
                aggregator.topic_counts().await,
                topics_treemap,
            ),
            panel(
                "Repositories & Stars by Language",
                aggregator.language_relationship().await,
                language_relationship_chart,
            ),
        ],
        DashboardSection::Skills => vec![
            panel(
                "Programming Languages",
                aggregator.language_share().await,
                language_pie,
            ),
            panel(
                "Developer Skill Radar",
                aggregator.skill_radar().await,
                radar_chart,
            ),
            panel(
                "Languages by Repo Count",
                aggregator.languages_by_repo_count().await,
                language_bars,
            ),
        ],
        DashboardSection::Activity => vec![
            panel(
                "Commit Activity Heatmap",
                aggregator.commit_heatmap().await,
                heatmap_chart,
            ),
            panel(
                "Activity Timeline",
                aggregator.activity_timeline().await,
                timeline_chart,
            ),
            panel(
                "Event Type Breakdown",
                aggregator.event_breakdown().await,
                event_bars,
            ),
        ],
        DashboardSection::Productivity => vec![
            panel(
                "Commit Trend (7-Day Rolling Average)",
                aggregator.commit_trend().await,
                commit_trend_chart,
            ),
            panel(
                "Issue Status",
                aggregator.issue_status().await,
                issue_donut,
            ),
        ],
        DashboardSection::Growth => vec![
            panel(
                "Star Growth",
                aggregator.cumulative_growth().await,
                star_growth_chart,
            ),
            panel(
                "Fork Growth",
                aggregator.cumulative_growth().await,
                fork_growth_chart,
            ),
            panel(
                "Trending Repositories",
                aggregator.trending(now).await,
                trending_bubbles,
            ),
        ],
    }
}

pub fn star_growth_chart(points: Vec<GrowthPoint>) -> ChartPayload {
    ChartPayload::Line {
        x_label: "Date",
        y_label: "Cumulative Stars",
        series: vec![Series {
            name: "Stars".to_string(),
            x: points.iter().map(|p| p.created_at.to_rfc3339()).collect(),
            y: points.iter().map(|p| p.cumulative_stars as f64).collect(),
        }],
    }
}

pub fn fork_growth_chart(points: Vec<GrowthPoint>) -> ChartPayload {
    ChartPayload::Line {
        x_label: "Date",
        y_label: "Total Forks",
        series: vec![Series {
            name: "Forks".to_string(),
            x: points.iter().map(|p| p.created_at.to_rfc3339()).collect(),
            y: points.iter().map(|p| p.cumulative_forks as f64).collect(),
        }],
    }
}

pub fn monthly_commits_chart(months: Vec<MonthlyCount>) -> ChartPayload {
    ChartPayload::Bars {
        x_label: "Month",
        y_label: "Commits",
        horizontal: false,
        categories: months.iter().map(|m| m.month.clone()).collect(),
        series: vec![BarSeries {
            name: "Commits".to_string(),
            values: months.iter().map(|m| m.commits as f64).collect(),
        }],
    }
}

pub fn calendar_chart(calendar: ContributionCalendar) -> ChartPayload {
    ChartPayload::Heatmap {
        x: calendar.weeks.iter().map(|w| w.to_string()).collect(),
        y: (0..7).map(|d| d.to_string()).collect(),
        z: to_f64_rows(calendar.grid()),
    }
}

pub fn heatmap_chart(heatmap: CommitHeatmap) -> ChartPayload {
    ChartPayload::Heatmap {
        x: (0..HOURS).map(|h| h.to_string()).collect(),
        y: heatmap.days.iter().map(|d| d.to_string()).collect(),
        z: heatmap
            .counts
            .iter()
            .map(|row| row.iter().map(|c| *c as f64).collect())
            .collect(),
    }
}

fn to_f64_rows(rows: Vec<Vec<u64>>) -> Vec<Vec<f64>> {
    rows.into_iter()
        .map(|row| row.into_iter().map(|c| c as f64).collect())
        .collect()
}

fn leaderboard_rows(entries: &[LeaderboardEntry], columns: &[&'static str]) -> Vec<Vec<Value>> {
    entries
        .iter()
        .map(|entry| {
            columns
                .iter()
                .map(|column| match *column {
                    "repo_name" => json!(entry.repo_name),
                    "stars" => json!(entry.stars),
                    "forks" => json!(entry.forks),
                    "size" => json!(entry.size_kb),
                    "language" => json!(entry.language),
                    _ => Value::Null,
                })
                .collect()
        })
        .collect()
}

pub fn leaderboard_tables(boards: Leaderboards) -> ChartPayload {
    const RANKED: [&str; 4] = ["repo_name", "stars", "forks", "language"];
    const SIZED: [&str; 3] = ["repo_name", "size", "language"];

    ChartPayload::Tables {
        tables: vec![
            Table {
                name: "Stars".to_string(),
                columns: RANKED.to_vec(),
                rows: leaderboard_rows(&boards.by_stars, &RANKED),
            },
            Table {
                name: "Forks".to_string(),
                columns: RANKED.to_vec(),
                rows: leaderboard_rows(&boards.by_forks, &RANKED),
            },
            Table {
                name: "Size".to_string(),
                columns: SIZED.to_vec(),
                rows: leaderboard_rows(&boards.by_size, &SIZED),
            },
        ],
    }
}

pub fn size_distribution_chart(buckets: Vec<BucketCount>) -> ChartPayload {
    ChartPayload::Bars {
        x_label: "Size",
        y_label: "Number of Repos",
        horizontal: false,
        categories: buckets.iter().map(|b| b.label.to_string()).collect(),
        series: vec![BarSeries {
            name: "Repositories".to_string(),
            values: buckets.iter().map(|b| b.count as f64).collect(),
        }],
    }
}

pub fn topics_treemap(topics: Vec<TopicCount>) -> ChartPayload {
    ChartPayload::Treemap {
        labels: topics.iter().map(|t| t.topic.clone()).collect(),
        values: topics.iter().map(|t| t.count as f64).collect(),
    }
}

pub fn language_relationship_chart(stats: Vec<LanguageStats>) -> ChartPayload {
    ChartPayload::Bars {
        x_label: "Programming Language",
        y_label: "Count",
        horizontal: false,
        categories: stats.iter().map(|s| s.language.clone()).collect(),
        series: vec![
            BarSeries {
                name: "Repositories".to_string(),
                values: stats.iter().map(|s| s.repo_count as f64).collect(),
            },
            BarSeries {
                name: "Total Stars".to_string(),
                values: stats.iter().map(|s| s.total_stars as f64).collect(),
            },
        ],
    }
}

pub fn language_pie(languages: Vec<LanguageAggregate>) -> ChartPayload {
    ChartPayload::Pie {
        labels: languages.iter().map(|l| l.language.clone()).collect(),
        values: languages.iter().map(|l| l.repo_count as f64).collect(),
        colors: languages.iter().map(|l| language_color(&l.language)).collect(),
        hole: 0.0,
    }
}

pub fn language_bars(languages: Vec<LanguageAggregate>) -> ChartPayload {
    ChartPayload::Bars {
        x_label: "Number of Repos",
        y_label: "Language",
        horizontal: true,
        categories: languages.iter().map(|l| l.language.clone()).collect(),
        series: vec![BarSeries {
            name: "Repositories".to_string(),
            values: languages.iter().map(|l| l.repo_count as f64).collect(),
        }],
    }
}

pub fn radar_chart(radar: SkillRadar) -> ChartPayload {
    ChartPayload::Radar {
        axes: radar.axes.iter().map(|a| a.label.to_string()).collect(),
        values: radar.axes.iter().map(|a| a.score).collect(),
        max: 100.0,
    }
}

pub fn timeline_chart(points: Vec<TimelinePoint>) -> ChartPayload {
    ChartPayload::Timeline {
        x_label: "Date",
        y_label: "Event Type",
        marks: points
            .into_iter()
            .map(|p| TimelineMark {
                at: p.created_at.to_rfc3339(),
                category: p.event_type,
                size: p.count as f64,
            })
            .collect(),
    }
}

pub fn event_bars(counts: Vec<EventCount>) -> ChartPayload {
    ChartPayload::Bars {
        x_label: "Event Type",
        y_label: "Count",
        horizontal: false,
        categories: counts.iter().map(|c| c.event_type.clone()).collect(),
        series: vec![BarSeries {
            name: "Events".to_string(),
            values: counts.iter().map(|c| c.count as f64).collect(),
        }],
    }
}

pub fn commit_trend_chart(points: Vec<TrendPoint>) -> ChartPayload {
    let dates: Vec<String> = points.iter().map(|p| p.date.to_string()).collect();
    ChartPayload::Line {
        x_label: "Date",
        y_label: "Commits",
        series: vec![
            Series {
                name: "Daily".to_string(),
                x: dates.clone(),
                y: points.iter().map(|p| p.commits as f64).collect(),
            },
            Series {
                name: "7-Day Avg".to_string(),
                x: dates,
                y: points.iter().map(|p| p.rolling_avg).collect(),
            },
        ],
    }
}

pub fn issue_donut(status: IssueStatus) -> ChartPayload {
    ChartPayload::Pie {
        labels: vec![
            "Open Issues".to_string(),
            "Closed Issues (Est.)".to_string(),
        ],
        values: vec![status.open as f64, status.closed_estimate as f64],
        colors: vec![Some("#e94560"), Some("#4ecca3")],
        hole: 0.4,
    }
}

pub fn trending_bubbles(repos: Vec<TrendingRepo>) -> ChartPayload {
    ChartPayload::Bubble {
        x_label: "Creation Date",
        y_label: "Stars per Month",
        points: repos
            .into_iter()
            .map(|r| BubblePoint {
                x: r.created_at.to_rfc3339(),
                y: r.velocity,
                size: r.stars as f64,
                color: language_color(&r.language),
                group: r.language,
                label: r.repo_name,
            })
            .collect(),
    }
}
