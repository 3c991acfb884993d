use std::collections::HashMap;

use serde::Serialize;

use super::{qualifying, round2, View};
use crate::models::{LanguageAggregate, Repository};

/// Repo, star and fork totals for one language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LanguageStats {
    pub language: String,
    pub repo_count: u64,
    pub total_stars: u64,
    pub total_forks: u64,
}

const RELATIONSHIP_LIMIT: usize = 10;

/// Share of qualifying repositories per language, most used first.
///
/// Languages with equal counts keep the order in which they first appear.
pub fn language_distribution(
    username: &str,
    repos: &[Repository],
) -> View<Vec<LanguageAggregate>> {
    let clean = qualifying(repos);
    if clean.is_empty() {
        return View::NoData;
    }

    let mut counts: Vec<(&str, u64)> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();
    for repo in &clean {
        let Some(language) = repo.language.as_deref() else {
            continue;
        };
        match index.get(language) {
            Some(&i) => counts[i].1 += 1,
            None => {
                index.insert(language, counts.len());
                counts.push((language, 1));
            }
        }
    }
    counts.sort_by(|a, b| b.1.cmp(&a.1));

    let total = clean.len() as f64;
    View::Ready(
        counts
            .into_iter()
            .map(|(language, count)| LanguageAggregate {
                username: username.to_string(),
                language: language.to_string(),
                repo_count: count,
                percentage: round2(count as f64 / total * 100.0),
            })
            .collect(),
    )
}

/// Stored aggregates in ascending repo count, for horizontal bars.
pub fn sorted_by_repo_count(
    mut aggregates: Vec<LanguageAggregate>,
) -> View<Vec<LanguageAggregate>> {
    aggregates.sort_by_key(|a| a.repo_count);
    View::from_vec(aggregates)
}

/// Per-language totals; the ten languages with most repositories.
pub fn language_relationship(repos: &[Repository]) -> View<Vec<LanguageStats>> {
    let mut by_language: HashMap<&str, LanguageStats> = HashMap::new();
    for repo in qualifying(repos) {
        let Some(language) = repo.language.as_deref() else {
            continue;
        };
        let stats = by_language
            .entry(language)
            .or_insert_with(|| LanguageStats {
                language: language.to_string(),
                repo_count: 0,
                total_stars: 0,
                total_forks: 0,
            });
        stats.repo_count += 1;
        stats.total_stars += repo.stars;
        stats.total_forks += repo.forks;
    }

    let mut stats: Vec<LanguageStats> = by_language.into_values().collect();
    stats.sort_by(|a, b| {
        b.repo_count
            .cmp(&a.repo_count)
            .then_with(|| a.language.cmp(&b.language))
    });
    stats.truncate(RELATIONSHIP_LIMIT);

    View::from_vec(stats)
}
