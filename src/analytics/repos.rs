use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{qualifying, round2, View};
use crate::models::{Repository, TopicSet};

pub const LEADERBOARD_LIMIT: usize = 10;

/// Size ranges in KB, lower bound inclusive, upper bound exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SizeBucket {
    Small,
    Medium,
    Large,
    Huge,
}

impl SizeBucket {
    pub const ALL: [SizeBucket; 4] = [
        SizeBucket::Small,
        SizeBucket::Medium,
        SizeBucket::Large,
        SizeBucket::Huge,
    ];

    pub fn from_kb(size_kb: u64) -> Self {
        match size_kb {
            0..=499 => SizeBucket::Small,
            500..=1_999 => SizeBucket::Medium,
            2_000..=9_999 => SizeBucket::Large,
            _ => SizeBucket::Huge,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SizeBucket::Small => "0-500 KB",
            SizeBucket::Medium => "500 KB-2 MB",
            SizeBucket::Large => "2-10 MB",
            SizeBucket::Huge => "10+ MB",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SizedRepo {
    pub repo_name: String,
    pub size_kb: u64,
    pub bucket: SizeBucket,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BucketCount {
    pub bucket: SizeBucket,
    pub label: &'static str,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeaderboardEntry {
    pub repo_name: String,
    pub stars: u64,
    pub forks: u64,
    pub size_kb: u64,
    pub language: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Leaderboards {
    pub by_stars: Vec<LeaderboardEntry>,
    pub by_forks: Vec<LeaderboardEntry>,
    pub by_size: Vec<LeaderboardEntry>,
}

/// Running star and fork totals in creation order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GrowthPoint {
    pub repo_name: String,
    pub created_at: DateTime<Utc>,
    pub cumulative_stars: u64,
    pub cumulative_forks: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendingRepo {
    pub repo_name: String,
    pub language: String,
    pub stars: u64,
    pub created_at: DateTime<Utc>,
    pub age_days: i64,
    /// Stars per 30 days since creation.
    pub velocity: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopicCount {
    pub topic: String,
    pub count: u64,
}

pub fn categorize_sizes(repos: &[Repository]) -> View<Vec<SizedRepo>> {
    View::from_vec(
        qualifying(repos)
            .into_iter()
            .map(|repo| SizedRepo {
                repo_name: repo.repo_name.clone(),
                size_kb: repo.size_kb,
                bucket: SizeBucket::from_kb(repo.size_kb),
            })
            .collect(),
    )
}

/// Qualifying repositories per size bucket; empty buckets are kept as zero.
pub fn size_distribution(repos: &[Repository]) -> View<Vec<BucketCount>> {
    let clean = qualifying(repos);
    if clean.is_empty() {
        return View::NoData;
    }

    let mut counts = [0u64; 4];
    for repo in clean {
        counts[SizeBucket::from_kb(repo.size_kb) as usize] += 1;
    }

    View::Ready(
        SizeBucket::ALL
            .iter()
            .zip(counts)
            .map(|(bucket, count)| BucketCount {
                bucket: *bucket,
                label: bucket.label(),
                count,
            })
            .collect(),
    )
}

fn top_by(clean: &[&Repository], key: impl Fn(&Repository) -> u64) -> Vec<LeaderboardEntry> {
    let mut ranked = clean.to_vec();
    // Vec::sort_by is stable, so equal keys keep listing order.
    ranked.sort_by(|a, b| key(b).cmp(&key(a)));
    ranked
        .into_iter()
        .take(LEADERBOARD_LIMIT)
        .map(|repo| LeaderboardEntry {
            repo_name: repo.repo_name.clone(),
            stars: repo.stars,
            forks: repo.forks,
            size_kb: repo.size_kb,
            language: repo.language.clone(),
        })
        .collect()
}

pub fn leaderboards(repos: &[Repository]) -> View<Leaderboards> {
    let clean = qualifying(repos);
    if clean.is_empty() {
        return View::NoData;
    }

    View::Ready(Leaderboards {
        by_stars: top_by(&clean, |r| r.stars),
        by_forks: top_by(&clean, |r| r.forks),
        by_size: top_by(&clean, |r| r.size_kb),
    })
}

/// Repositories without a creation date are left out.
pub fn cumulative_growth(repos: &[Repository]) -> View<Vec<GrowthPoint>> {
    let mut dated: Vec<(&Repository, DateTime<Utc>)> = qualifying(repos)
        .into_iter()
        .filter_map(|repo| repo.created_at.map(|created| (repo, created)))
        .collect();
    dated.sort_by_key(|(_, created)| *created);

    let mut stars = 0;
    let mut forks = 0;
    View::from_vec(
        dated
            .into_iter()
            .map(|(repo, created_at)| {
                stars += repo.stars;
                forks += repo.forks;
                GrowthPoint {
                    repo_name: repo.repo_name.clone(),
                    created_at,
                    cumulative_stars: stars,
                    cumulative_forks: forks,
                }
            })
            .collect(),
    )
}

/// Whole days since creation, counting the creation day; never below 1.
pub fn age_days(created_at: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    ((now - created_at).num_days() + 1).max(1)
}

/// Star velocity of every starred qualifying repository, in listing order.
pub fn star_velocity(repos: &[Repository], now: DateTime<Utc>) -> View<Vec<TrendingRepo>> {
    View::from_vec(
        qualifying(repos)
            .into_iter()
            .filter(|repo| repo.stars > 0)
            .filter_map(|repo| {
                let created_at = repo.created_at?;
                let age = age_days(created_at, now);
                let velocity = round2(repo.stars as f64 / age as f64 * 30.0);
                (velocity > 0.0).then(|| TrendingRepo {
                    repo_name: repo.repo_name.clone(),
                    language: repo
                        .language
                        .clone()
                        .unwrap_or_else(|| "Unknown".to_string()),
                    stars: repo.stars,
                    created_at,
                    age_days: age,
                    velocity,
                })
            })
            .collect(),
    )
}

/// How many repositories carry each topic, most common first.
pub fn topic_counts(topic_sets: &[TopicSet]) -> View<Vec<TopicCount>> {
    let mut counts: HashMap<&str, u64> = HashMap::new();
    for set in topic_sets {
        for topic in &set.topics {
            *counts.entry(topic.as_str()).or_default() += 1;
        }
    }

    let mut topics: Vec<TopicCount> = counts
        .into_iter()
        .map(|(topic, count)| TopicCount {
            topic: topic.to_string(),
            count,
        })
        .collect();
    topics.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.topic.cmp(&b.topic)));

    View::from_vec(topics)
}
