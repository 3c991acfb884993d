//! Aggregation Engine: derived views over a username's persisted records.
//!
//! The submodules hold pure functions over record slices. [`Aggregator`]
//! loads what each view needs from the [`StorageGateway`] and hands it to
//! them. Only [`Aggregator::aggregate_languages`] writes back.

pub mod commits;
pub mod languages;
pub mod profile;
pub mod repos;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::error::Result;
use crate::models::{LanguageAggregate, Repository};
use crate::storage::{Filter, StorageGateway};

use self::commits::{CommitHeatmap, ContributionCalendar, MonthlyCount, TrendPoint};
use self::languages::LanguageStats;
use self::profile::{EventCount, IssueStatus, ProfileSummary, SkillRadar, TimelinePoint};
use self::repos::{
    BucketCount, GrowthPoint, Leaderboards, SizedRepo, TopicCount, TrendingRepo,
};

/// Result of every derivation: data, or an explicit "nothing to show".
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "data", rename_all = "snake_case")]
pub enum View<T> {
    Ready(T),
    NoData,
}

impl<T> View<T> {
    pub fn is_no_data(&self) -> bool {
        matches!(self, View::NoData)
    }

    pub fn ready(self) -> Option<T> {
        match self {
            View::Ready(data) => Some(data),
            View::NoData => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> View<U> {
        match self {
            View::Ready(data) => View::Ready(f(data)),
            View::NoData => View::NoData,
        }
    }
}

impl<T> View<Vec<T>> {
    pub fn from_vec(items: Vec<T>) -> Self {
        if items.is_empty() {
            View::NoData
        } else {
            View::Ready(items)
        }
    }
}

/// Round half away from zero to two decimals.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Repositories every derived view is computed over.
pub fn qualifying(repos: &[Repository]) -> Vec<&Repository> {
    repos.iter().filter(|r| r.is_qualifying()).collect()
}

/// Store-backed entry point to the derived views of one username.
#[derive(Clone)]
pub struct Aggregator {
    gateway: StorageGateway,
    username: String,
}

impl Aggregator {
    pub fn new(gateway: StorageGateway, username: impl Into<String>) -> Self {
        Self {
            gateway,
            username: username.into(),
        }
    }

    async fn repos(&self) -> Result<Vec<Repository>> {
        self.gateway.repos(&self.username).await
    }

    /// Recompute the language distribution and replace the stored one.
    pub async fn aggregate_languages(&self) -> Result<View<Vec<LanguageAggregate>>> {
        let repos = self.repos().await?;
        let view = languages::language_distribution(&self.username, &repos);

        self.gateway
            .delete_many::<LanguageAggregate>(&Filter::username(self.username.as_str()))
            .await?;
        let count = match &view {
            View::Ready(aggregates) => self.gateway.insert_many(aggregates).await?,
            View::NoData => 0,
        };
        info!(username = %self.username, languages = count, "Aggregated languages");
        Ok(view)
    }

    /// Stored language distribution, as last materialized.
    pub async fn language_share(&self) -> Result<View<Vec<LanguageAggregate>>> {
        Ok(View::from_vec(self.gateway.languages(&self.username).await?))
    }

    pub async fn languages_by_repo_count(&self) -> Result<View<Vec<LanguageAggregate>>> {
        let stored = self.gateway.languages(&self.username).await?;
        Ok(languages::sorted_by_repo_count(stored))
    }

    pub async fn language_relationship(&self) -> Result<View<Vec<LanguageStats>>> {
        Ok(languages::language_relationship(&self.repos().await?))
    }

    pub async fn size_categories(&self) -> Result<View<Vec<SizedRepo>>> {
        Ok(repos::categorize_sizes(&self.repos().await?))
    }

    pub async fn size_distribution(&self) -> Result<View<Vec<BucketCount>>> {
        Ok(repos::size_distribution(&self.repos().await?))
    }

    pub async fn leaderboards(&self) -> Result<View<Leaderboards>> {
        Ok(repos::leaderboards(&self.repos().await?))
    }

    pub async fn cumulative_growth(&self) -> Result<View<Vec<GrowthPoint>>> {
        Ok(repos::cumulative_growth(&self.repos().await?))
    }

    pub async fn trending(&self, now: DateTime<Utc>) -> Result<View<Vec<TrendingRepo>>> {
        Ok(repos::star_velocity(&self.repos().await?, now))
    }

    pub async fn topic_counts(&self) -> Result<View<Vec<TopicCount>>> {
        Ok(repos::topic_counts(&self.gateway.topics(&self.username).await?))
    }

    pub async fn commit_heatmap(&self) -> Result<View<CommitHeatmap>> {
        Ok(commits::commit_heatmap(&self.gateway.commits(&self.username).await?))
    }

    pub async fn monthly_commits(&self) -> Result<View<Vec<MonthlyCount>>> {
        Ok(commits::monthly_commits(&self.gateway.commits(&self.username).await?))
    }

    pub async fn contribution_calendar(&self) -> Result<View<ContributionCalendar>> {
        Ok(commits::contribution_calendar(
            &self.gateway.commits(&self.username).await?,
        ))
    }

    pub async fn commit_trend(&self) -> Result<View<Vec<TrendPoint>>> {
        Ok(commits::commit_trend(&self.gateway.commits(&self.username).await?))
    }

    pub async fn skill_radar(&self) -> Result<View<SkillRadar>> {
        let user = self.gateway.user(&self.username).await?;
        let repos = self.repos().await?;
        let commit_count = self.gateway.commits(&self.username).await?.len();
        let language_count = self.gateway.languages(&self.username).await?.len();
        Ok(profile::skill_radar(
            user.as_ref(),
            &repos,
            commit_count,
            language_count,
        ))
    }

    pub async fn issue_status(&self) -> Result<View<IssueStatus>> {
        Ok(profile::issue_status(&self.repos().await?))
    }

    pub async fn event_breakdown(&self) -> Result<View<Vec<EventCount>>> {
        Ok(profile::event_breakdown(&self.gateway.events(&self.username).await?))
    }

    pub async fn activity_timeline(&self) -> Result<View<Vec<TimelinePoint>>> {
        Ok(profile::activity_timeline(&self.gateway.events(&self.username).await?))
    }

    pub async fn profile_summary(&self) -> Result<View<ProfileSummary>> {
        let user = self.gateway.user(&self.username).await?;
        let repos = self.repos().await?;
        Ok(profile::profile_summary(user.as_ref(), &repos))
    }
}
