use std::collections::{BTreeMap, VecDeque};

use chrono::{DateTime, Datelike, NaiveDate, Timelike, Utc};
use serde::Serialize;

use super::View;
use crate::models::Commit;

pub const DAY_NAMES: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

pub const HOURS: usize = 24;

pub const ROLLING_WINDOW: usize = 7;

/// Commit counts per weekday (Monday first) and hour of day, in UTC.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommitHeatmap {
    pub days: [&'static str; 7],
    pub counts: [[u64; HOURS]; 7],
}

impl CommitHeatmap {
    pub fn total(&self) -> u64 {
        self.counts.iter().flatten().sum()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyCount {
    /// `YYYY-MM`, sorts chronologically as a string.
    pub month: String,
    pub commits: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalendarCell {
    pub week: u32,
    /// 0 = Monday
    pub weekday: u32,
    pub commits: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContributionCalendar {
    /// ISO week numbers present in the data, ascending.
    pub weeks: Vec<u32>,
    pub cells: Vec<CalendarCell>,
}

impl ContributionCalendar {
    /// Seven weekday rows by `weeks` columns, absent cells as zero.
    pub fn grid(&self) -> Vec<Vec<u64>> {
        let mut grid = vec![vec![0u64; self.weeks.len()]; 7];
        for cell in &self.cells {
            if let Ok(column) = self.weeks.binary_search(&cell.week) {
                grid[cell.weekday as usize][column] = cell.commits;
            }
        }
        grid
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint {
    pub date: NaiveDate,
    pub commits: u64,
    pub rolling_avg: f64,
}

fn timestamps(commits: &[Commit]) -> impl Iterator<Item = DateTime<Utc>> + '_ {
    commits.iter().filter_map(|c| c.timestamp)
}

fn daily_counts(commits: &[Commit]) -> BTreeMap<NaiveDate, u64> {
    let mut daily = BTreeMap::new();
    for ts in timestamps(commits) {
        *daily.entry(ts.date_naive()).or_default() += 1;
    }
    daily
}

/// Always a full 7x24 grid once at least one commit carries a timestamp.
pub fn commit_heatmap(commits: &[Commit]) -> View<CommitHeatmap> {
    let mut counts = [[0u64; HOURS]; 7];
    let mut seen = false;
    for ts in timestamps(commits) {
        let day = ts.weekday().num_days_from_monday() as usize;
        counts[day][ts.hour() as usize] += 1;
        seen = true;
    }

    if !seen {
        return View::NoData;
    }
    View::Ready(CommitHeatmap {
        days: DAY_NAMES,
        counts,
    })
}

pub fn monthly_commits(commits: &[Commit]) -> View<Vec<MonthlyCount>> {
    let mut monthly: BTreeMap<(i32, u32), u64> = BTreeMap::new();
    for ts in timestamps(commits) {
        *monthly.entry((ts.year(), ts.month())).or_default() += 1;
    }

    View::from_vec(
        monthly
            .into_iter()
            .map(|((year, month), commits)| MonthlyCount {
                month: format!("{:04}-{:02}", year, month),
                commits,
            })
            .collect(),
    )
}

/// Daily counts folded onto (ISO week, weekday).
///
/// Days from different years that share an ISO week number land in the same
/// cell and are summed.
pub fn contribution_calendar(commits: &[Commit]) -> View<ContributionCalendar> {
    let mut cells: BTreeMap<(u32, u32), u64> = BTreeMap::new();
    for (date, count) in daily_counts(commits) {
        let key = (date.iso_week().week(), date.weekday().num_days_from_monday());
        *cells.entry(key).or_default() += count;
    }
    if cells.is_empty() {
        return View::NoData;
    }

    let mut weeks: Vec<u32> = cells.keys().map(|(week, _)| *week).collect();
    weeks.dedup();

    View::Ready(ContributionCalendar {
        weeks,
        cells: cells
            .into_iter()
            .map(|((week, weekday), commits)| CalendarCell {
                week,
                weekday,
                commits,
            })
            .collect(),
    })
}

/// Daily commit counts with a trailing mean over up to seven observed days.
///
/// Days without commits are not filled in, so the window spans the last seven
/// days that had activity.
pub fn commit_trend(commits: &[Commit]) -> View<Vec<TrendPoint>> {
    let mut window: VecDeque<u64> = VecDeque::with_capacity(ROLLING_WINDOW);
    let mut sum = 0u64;

    View::from_vec(
        daily_counts(commits)
            .into_iter()
            .map(|(date, count)| {
                if window.len() == ROLLING_WINDOW {
                    sum -= window.pop_front().unwrap_or(0);
                }
                window.push_back(count);
                sum += count;
                TrendPoint {
                    date,
                    commits: count,
                    rolling_avg: sum as f64 / window.len() as f64,
                }
            })
            .collect(),
    )
}
