use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::analytics::profile::ProfileSummary;
use crate::analytics::{Aggregator, View};
use crate::error::Result;
use crate::presentation::{self, DashboardSection, Panel};
use crate::storage::StorageGateway;

/// What the viewer is looking at. Passed explicitly to every render.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub username: Option<String>,
    pub section: DashboardSection,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn for_user(username: &str) -> Self {
        let mut session = Self::new();
        session.select_user(username);
        session
    }

    /// Blank input clears the selection.
    pub fn select_user(&mut self, username: &str) {
        let username = username.trim();
        self.username = (!username.is_empty()).then(|| username.to_string());
    }

    pub fn navigate(&mut self, section: DashboardSection) {
        self.section = section;
    }

    pub fn with_section(mut self, section: DashboardSection) -> Self {
        self.navigate(section);
        self
    }

    pub fn active_user(&self) -> Option<&str> {
        self.username.as_deref()
    }

    /// Panels of the current section, or `None` before a user is selected.
    pub async fn render(
        &self,
        gateway: &StorageGateway,
        now: DateTime<Utc>,
    ) -> Option<Vec<Panel>> {
        let username = self.active_user()?;
        let aggregator = Aggregator::new(gateway.clone(), username);
        Some(presentation::render_section(&aggregator, self.section, now).await)
    }

    pub async fn summary(&self, gateway: &StorageGateway) -> Result<View<ProfileSummary>> {
        match self.active_user() {
            Some(username) => Aggregator::new(gateway.clone(), username).profile_summary().await,
            None => Ok(View::NoData),
        }
    }
}
