use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{qualifying, View};
use crate::models::{Event, Repository, User};

const SCORE_CAP: f64 = 100.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RadarAxis {
    pub label: &'static str,
    pub score: f64,
}

/// Six heuristic scores on a 0-100 scale.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkillRadar {
    pub axes: Vec<RadarAxis>,
}

/// Open issues and a guessed closed count.
///
/// GitHub's repository listing only reports open issues. `closed_estimate` is
/// twice the open count and must not be read as a real figure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IssueStatus {
    pub open: u64,
    pub closed_estimate: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventCount {
    pub event_type: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimelinePoint {
    pub created_at: DateTime<Utc>,
    pub event_type: String,
    pub count: u64,
}

/// Header figures for the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProfileSummary {
    pub username: String,
    pub avatar: String,
    pub followers: u64,
    pub following: u64,
    pub public_repos: u64,
    /// Stars across every non-fork repository, archived ones included.
    pub total_stars: u64,
}

fn capped(raw: f64) -> f64 {
    raw.min(SCORE_CAP)
}

pub fn skill_radar(
    user: Option<&User>,
    repos: &[Repository],
    commit_count: usize,
    language_count: usize,
) -> View<SkillRadar> {
    let Some(user) = user else {
        return View::NoData;
    };
    let clean = qualifying(repos);
    if clean.is_empty() {
        return View::NoData;
    }

    let stars: u64 = clean.iter().map(|r| r.stars).sum();
    let forks: u64 = clean.iter().map(|r| r.forks).sum();

    View::Ready(SkillRadar {
        axes: vec![
            RadarAxis {
                label: "Stars",
                score: capped(stars as f64 / 10.0),
            },
            RadarAxis {
                label: "Forks",
                score: capped(forks as f64 / 5.0),
            },
            RadarAxis {
                label: "Repos",
                score: capped(clean.len() as f64 * 5.0),
            },
            RadarAxis {
                label: "Commits",
                score: capped(commit_count as f64 / 10.0),
            },
            RadarAxis {
                label: "Languages",
                score: capped(language_count as f64 * 10.0),
            },
            RadarAxis {
                label: "Followers",
                score: capped(user.followers as f64 / 2.0),
            },
        ],
    })
}

pub fn issue_status(repos: &[Repository]) -> View<IssueStatus> {
    let open: u64 = qualifying(repos).iter().map(|r| r.open_issues).sum();
    if open == 0 {
        return View::NoData;
    }
    View::Ready(IssueStatus {
        open,
        closed_estimate: open * 2,
    })
}

/// Events per type, most frequent first; ties keep first-seen order.
pub fn event_breakdown(events: &[Event]) -> View<Vec<EventCount>> {
    let mut counts: Vec<EventCount> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();
    for event in events {
        match index.get(event.event_type.as_str()) {
            Some(&i) => counts[i].count += 1,
            None => {
                index.insert(event.event_type.as_str(), counts.len());
                counts.push(EventCount {
                    event_type: event.event_type.clone(),
                    count: 1,
                });
            }
        }
    }
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    View::from_vec(counts)
}

pub fn activity_timeline(events: &[Event]) -> View<Vec<TimelinePoint>> {
    let mut grouped: BTreeMap<(DateTime<Utc>, &str), u64> = BTreeMap::new();
    for event in events {
        if let Some(created_at) = event.created_at {
            *grouped
                .entry((created_at, event.event_type.as_str()))
                .or_default() += 1;
        }
    }

    View::from_vec(
        grouped
            .into_iter()
            .map(|((created_at, event_type), count)| TimelinePoint {
                created_at,
                event_type: event_type.to_string(),
                count,
            })
            .collect(),
    )
}

pub fn profile_summary(user: Option<&User>, repos: &[Repository]) -> View<ProfileSummary> {
    let Some(user) = user else {
        return View::NoData;
    };

    View::Ready(ProfileSummary {
        username: user.username.clone(),
        avatar: user.avatar.clone(),
        followers: user.followers,
        following: user.following,
        public_repos: user.public_repos,
        total_stars: repos.iter().filter(|r| !r.is_fork).map(|r| r.stars).sum(),
    })
}
