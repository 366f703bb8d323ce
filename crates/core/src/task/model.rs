//! Task model definitions

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::clock::Clock;
use crate::{Error, Result};

/// Task priority, `P1` being the most urgent
///
/// The remote API counts the other way round (4 is urgent, 1 is normal);
/// use [`TaskPriority::from_api`] to convert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    P1,
    P2,
    P3,
    P4,
}

impl Default for TaskPriority {
    fn default() -> Self {
        Self::P4
    }
}

impl TaskPriority {
    /// Map the API's 1..=4 scale (4 = urgent) onto `P4..=P1`
    pub fn from_api(value: i64) -> Self {
        match value {
            4 => Self::P1,
            3 => Self::P2,
            2 => Self::P3,
            _ => Self::P4,
        }
    }
}

/// Point in time a task is due
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum DueAt {
    /// All-day due date
    Date(NaiveDate),
    /// Date-time without timezone, interpreted in the clock's timezone
    Floating(NaiveDateTime),
    /// Absolute instant
    Fixed(DateTime<Utc>),
}

impl DueAt {
    /// Calendar date in the given timezone
    pub fn local_date(&self, tz: &Tz) -> NaiveDate {
        match self {
            Self::Date(date) => *date,
            Self::Floating(dt) => dt.date(),
            Self::Fixed(at) => at.with_timezone(tz).date_naive(),
        }
    }

    /// Time of day in the given timezone, `None` for all-day dues
    pub fn local_time(&self, tz: &Tz) -> Option<NaiveTime> {
        match self {
            Self::Date(_) => None,
            Self::Floating(dt) => Some(dt.time()),
            Self::Fixed(at) => Some(at.with_timezone(tz).time()),
        }
    }

    /// Ordering key: local date, then time of day. All-day dues sort at the
    /// start of their day.
    pub fn sort_key(&self, tz: &Tz) -> (NaiveDate, Option<NaiveTime>) {
        (self.local_date(tz), self.local_time(tz))
    }
}

/// Due information of a task
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Due {
    pub at: DueAt,
    /// Human readable form as entered by the user, e.g. "every monday"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default)]
    pub recurring: bool,
}

impl Due {
    pub fn new(at: DueAt) -> Self {
        Self {
            at,
            label: None,
            recurring: false,
        }
    }

    pub fn on(date: NaiveDate) -> Self {
        Self::new(DueAt::Date(date))
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_recurring(mut self, recurring: bool) -> Self {
        self.recurring = recurring;
        self
    }

    /// Parse a due string as sent by the API.
    ///
    /// Accepts `YYYY-MM-DD`, floating `YYYY-MM-DDTHH:MM[:SS]`, RFC 3339
    /// instants and the relative words `today`, `tomorrow` and `yesterday`,
    /// which are resolved against `today`.
    pub fn parse(raw: &str, today: NaiveDate) -> Result<Self> {
        let value = raw.trim();

        let relative = match value.to_ascii_lowercase().as_str() {
            "today" => Some(0),
            "tomorrow" => Some(1),
            "yesterday" => Some(-1),
            _ => None,
        };
        if let Some(days) = relative {
            return Ok(Self::on(today + Duration::days(days)).with_label(value));
        }

        if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
            return Ok(Self::on(date));
        }

        if let Ok(at) = DateTime::parse_from_rfc3339(value) {
            return Ok(Self::new(DueAt::Fixed(at.with_timezone(&Utc))));
        }

        for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M"] {
            if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
                return Ok(Self::new(DueAt::Floating(dt)));
            }
        }

        Err(Error::InvalidDue(value.to_string()))
    }

    pub fn is_overdue(&self, clock: &dyn Clock) -> bool {
        self.at.local_date(&clock.timezone()) < clock.today()
    }

    pub fn is_due_today(&self, clock: &dyn Clock) -> bool {
        self.at.local_date(&clock.timezone()) == clock.today()
    }

    pub fn is_due_tomorrow(&self, clock: &dyn Clock) -> bool {
        clock
            .today()
            .succ_opt()
            .is_some_and(|tomorrow| self.at.local_date(&clock.timezone()) == tomorrow)
    }

    /// Local time of day for timed dues
    pub fn time_of_day(&self, clock: &dyn Clock) -> Option<NaiveTime> {
        self.at.local_time(&clock.timezone())
    }
}

/// A remote to-do item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    pub due: Option<Due>,
    pub priority: TaskPriority,
    pub completed: bool,
}

impl Task {
    /// Create a new open task without due date
    pub fn new(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
            description: None,
            project_id: None,
            section_id: None,
            parent_id: None,
            due: None,
            priority: TaskPriority::default(),
            completed: false,
        }
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the due date
    pub fn with_due(mut self, due: Due) -> Self {
        self.due = Some(due);
        self
    }

    /// Set the priority
    pub fn with_priority(mut self, priority: TaskPriority) -> Self {
        self.priority = priority;
        self
    }

    /// Mark as completed
    pub fn with_completed(mut self, completed: bool) -> Self {
        self.completed = completed;
        self
    }

    pub fn is_overdue(&self, clock: &dyn Clock) -> bool {
        self.due.as_ref().is_some_and(|due| due.is_overdue(clock))
    }

    pub fn is_due_today(&self, clock: &dyn Clock) -> bool {
        self.due.as_ref().is_some_and(|due| due.is_due_today(clock))
    }

    pub fn is_due_tomorrow(&self, clock: &dyn Clock) -> bool {
        self.due.as_ref().is_some_and(|due| due.is_due_tomorrow(clock))
    }
}
