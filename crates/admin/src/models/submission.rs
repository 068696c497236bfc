//! Contact-form submissions.
//!
//! The inbox is small (a personal site), so listing loads every row and
//! [`SubmissionQuery::apply`] filters, sorts and paginates in memory. That
//! keeps the query logic pure and unit-testable.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use folio_core::{Email, SubmissionId, SubmissionStatus};

use crate::error::FieldError;

const MAX_NAME_LENGTH: usize = 100;
const MAX_SUBJECT_LENGTH: usize = 200;
const MAX_MESSAGE_LENGTH: usize = 5_000;

pub const DEFAULT_PER_PAGE: u32 = 20;
pub const MAX_PER_PAGE: u32 = 100;

/// Length of the per-day series in [`SubmissionStats`].
pub const DAILY_SERIES_DAYS: i64 = 30;

/// A contact-form submission (domain type).
#[derive(Debug, Clone, Serialize)]
pub struct Submission {
    pub id: SubmissionId,
    pub name: String,
    pub email: Email,
    pub subject: String,
    pub message: String,
    pub status: SubmissionStatus,
    pub replied_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Submission {
    fn matches_text(&self, needle: &str) -> bool {
        [
            self.name.as_str(),
            self.email.as_str(),
            self.subject.as_str(),
            self.message.as_str(),
        ]
        .iter()
        .any(|field| field.to_lowercase().contains(needle))
    }
}

/// Contact form payload from the public site.
#[derive(Debug, Clone, Deserialize)]
pub struct NewSubmission {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub subject: String,
    pub message: String,
}

/// A submission that passed validation and is ready to insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidSubmission {
    pub name: String,
    pub email: Email,
    pub subject: String,
    pub message: String,
}

impl NewSubmission {
    /// Trim and check every field.
    ///
    /// # Errors
    ///
    /// Returns every invalid field.
    pub fn validate(&self) -> Result<ValidSubmission, Vec<FieldError>> {
        let mut errors = Vec::new();
        let name = self.name.trim();
        let subject = self.subject.trim();
        let message = self.message.trim();

        if name.is_empty() {
            errors.push(FieldError::new("name", "Name is required."));
        } else if name.chars().count() > MAX_NAME_LENGTH {
            errors.push(FieldError::new(
                "name",
                format!("Name must be at most {MAX_NAME_LENGTH} characters."),
            ));
        }

        let email = Email::parse(&self.email);
        if email.is_err() {
            errors.push(FieldError::new("email", "Please enter a valid email address."));
        }

        if subject.chars().count() > MAX_SUBJECT_LENGTH {
            errors.push(FieldError::new(
                "subject",
                format!("Subject must be at most {MAX_SUBJECT_LENGTH} characters."),
            ));
        }

        if message.is_empty() {
            errors.push(FieldError::new("message", "Message is required."));
        } else if message.chars().count() > MAX_MESSAGE_LENGTH {
            errors.push(FieldError::new(
                "message",
                format!("Message must be at most {MAX_MESSAGE_LENGTH} characters."),
            ));
        }

        match email {
            Ok(email) if errors.is_empty() => Ok(ValidSubmission {
                name: name.to_string(),
                email,
                subject: subject.to_string(),
                message: message.to_string(),
            }),
            _ => Err(errors),
        }
    }
}

/// Sort order for the inbox.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionSort {
    #[default]
    Newest,
    Oldest,
    /// Sender name, case-insensitive, newest first among equal names.
    Name,
}

/// Inbox query string: `?status&q&sort&page&per_page`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubmissionQuery {
    pub status: Option<SubmissionStatus>,
    pub q: Option<String>,
    #[serde(default)]
    pub sort: SubmissionSort,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

/// One page of results.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: usize,
    pub page: u32,
    pub per_page: u32,
    pub total_pages: u32,
}

impl SubmissionQuery {
    fn page(&self) -> u32 {
        self.page.unwrap_or(1).max(1)
    }

    fn per_page(&self) -> u32 {
        self.per_page
            .unwrap_or(DEFAULT_PER_PAGE)
            .clamp(1, MAX_PER_PAGE)
    }

    /// Filter, sort and paginate `submissions`.
    #[must_use]
    pub fn apply(&self, submissions: Vec<Submission>) -> Page<Submission> {
        let needle = self
            .q
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .map(str::to_lowercase);

        let mut matched: Vec<Submission> = submissions
            .into_iter()
            .filter(|s| self.status.is_none_or(|status| s.status == status))
            .filter(|s| needle.as_deref().is_none_or(|n| s.matches_text(n)))
            .collect();

        match self.sort {
            SubmissionSort::Newest => {
                matched.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
            }
            SubmissionSort::Oldest => {
                matched.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
            }
            SubmissionSort::Name => matched.sort_by(|a, b| {
                a.name
                    .to_lowercase()
                    .cmp(&b.name.to_lowercase())
                    .then(b.created_at.cmp(&a.created_at))
            }),
        }

        let page = self.page();
        let per_page = self.per_page();
        let total = matched.len();
        let total_pages = u32::try_from(total.div_ceil(per_page as usize)).unwrap_or(u32::MAX);
        let skip = (page as usize - 1).saturating_mul(per_page as usize);

        Page {
            items: matched
                .into_iter()
                .skip(skip)
                .take(per_page as usize)
                .collect(),
            total,
            page,
            per_page,
            total_pages,
        }
    }
}

/// Status change requested by the console.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct StatusUpdate {
    pub status: SubmissionStatus,
}

/// Operation applied to many submissions at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BulkAction {
    MarkRead,
    MarkReplied,
    Archive,
    Delete,
}

impl BulkAction {
    /// Target status, or `None` for deletion.
    #[must_use]
    pub const fn target_status(self) -> Option<SubmissionStatus> {
        match self {
            Self::MarkRead => Some(SubmissionStatus::Read),
            Self::MarkReplied => Some(SubmissionStatus::Replied),
            Self::Archive => Some(SubmissionStatus::Archived),
            Self::Delete => None,
        }
    }
}

/// Bulk request body: `{"ids": [1, 2], "action": "archive"}`.
#[derive(Debug, Clone, Deserialize)]
pub struct BulkRequest {
    pub ids: Vec<SubmissionId>,
    pub action: BulkAction,
}

impl BulkRequest {
    /// Deduplicated ids.
    ///
    /// # Errors
    ///
    /// Returns a field error when no ids were given.
    pub fn ids(&self) -> Result<Vec<SubmissionId>, FieldError> {
        let mut ids = self.ids.clone();
        ids.sort_unstable();
        ids.dedup();
        if ids.is_empty() {
            return Err(FieldError::new("ids", "Select at least one submission."));
        }
        Ok(ids)
    }
}

/// Submissions received on one calendar day (UTC).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DailyCount {
    pub date: NaiveDate,
    pub count: u64,
}

/// Inbox analytics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubmissionStats {
    pub total: u64,
    pub by_status: BTreeMap<&'static str, u64>,
    pub last_7_days: u64,
    pub last_30_days: u64,
    /// Oldest day first, always [`DAILY_SERIES_DAYS`] entries ending today.
    pub daily: Vec<DailyCount>,
    /// Share of submissions that were ever replied to, 0.0 to 1.0.
    pub reply_rate: f64,
}

impl SubmissionStats {
    #[must_use]
    pub fn compute(submissions: &[Submission], now: DateTime<Utc>) -> Self {
        let mut by_status: BTreeMap<&'static str, u64> = SubmissionStatus::ALL
            .iter()
            .map(|status| (status.as_str(), 0))
            .collect();
        let today = now.date_naive();
        let first_day = today - TimeDelta::days(DAILY_SERIES_DAYS - 1);
        let mut per_day: BTreeMap<NaiveDate, u64> = BTreeMap::new();
        let (mut last_7_days, mut last_30_days, mut replied) = (0, 0, 0u64);

        for submission in submissions {
            *by_status.entry(submission.status.as_str()).or_default() += 1;

            let age = now - submission.created_at;
            if age <= TimeDelta::days(7) {
                last_7_days += 1;
            }
            if age <= TimeDelta::days(30) {
                last_30_days += 1;
            }

            let day = submission.created_at.date_naive();
            if day >= first_day && day <= today {
                *per_day.entry(day).or_default() += 1;
            }

            if submission.replied_at.is_some() || submission.status == SubmissionStatus::Replied {
                replied += 1;
            }
        }

        let daily = first_day
            .iter_days()
            .take_while(|day| *day <= today)
            .map(|date| DailyCount {
                date,
                count: per_day.get(&date).copied().unwrap_or(0),
            })
            .collect();

        let total = submissions.len() as u64;
        #[allow(clippy::cast_precision_loss)] // Inbox sizes stay far below 2^52
        let reply_rate = if total == 0 {
            0.0
        } else {
            replied as f64 / total as f64
        };

        Self {
            total,
            by_status,
            last_7_days,
            last_30_days,
            daily,
            reply_rate,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn now() -> DateTime<Utc> {
        DateTime::from_timestamp(1_760_000_000, 0).unwrap()
    }

    fn submission(id: i64, name: &str, days_ago: i64, status: SubmissionStatus) -> Submission {
        let created_at = now() - TimeDelta::days(days_ago);
        Submission {
            id: SubmissionId::new(id),
            name: name.to_string(),
            email: Email::parse(&format!("{}@example.com", name.to_lowercase())).unwrap(),
            subject: format!("Hello from {name}"),
            message: "I like your work".to_string(),
            status,
            replied_at: (status == SubmissionStatus::Replied).then_some(created_at),
            created_at,
            updated_at: created_at,
        }
    }

    fn inbox() -> Vec<Submission> {
        vec![
            submission(1, "Carol", 40, SubmissionStatus::Archived),
            submission(2, "alice", 10, SubmissionStatus::Replied),
            submission(3, "Bob", 3, SubmissionStatus::Read),
            submission(4, "Dave", 0, SubmissionStatus::New),
        ]
    }

    fn ids(page: &Page<Submission>) -> Vec<i64> {
        page.items.iter().map(|s| s.id.as_i64()).collect()
    }

    #[test]
    fn default_query_sorts_newest_first() {
        let page = SubmissionQuery::default().apply(inbox());
        assert_eq!(ids(&page), vec![4, 3, 2, 1]);
        assert_eq!(page.total, 4);
        assert_eq!(page.total_pages, 1);
    }

    #[test]
    fn sorts_oldest_and_by_name() {
        let oldest = SubmissionQuery {
            sort: SubmissionSort::Oldest,
            ..Default::default()
        };
        assert_eq!(ids(&oldest.apply(inbox())), vec![1, 2, 3, 4]);

        let by_name = SubmissionQuery {
            sort: SubmissionSort::Name,
            ..Default::default()
        };
        assert_eq!(ids(&by_name.apply(inbox())), vec![2, 3, 1, 4]);
    }

    #[test]
    fn filters_by_status_and_text() {
        let query = SubmissionQuery {
            status: Some(SubmissionStatus::Read),
            ..Default::default()
        };
        assert_eq!(ids(&query.apply(inbox())), vec![3]);

        let query = SubmissionQuery {
            q: Some("  ALICE@ ".to_string()),
            ..Default::default()
        };
        assert_eq!(ids(&query.apply(inbox())), vec![2]);

        let query = SubmissionQuery {
            q: Some("   ".to_string()),
            ..Default::default()
        };
        assert_eq!(query.apply(inbox()).total, 4);
    }

    #[test]
    fn paginates_and_clamps() {
        let query = SubmissionQuery {
            page: Some(2),
            per_page: Some(3),
            ..Default::default()
        };
        let page = query.apply(inbox());
        assert_eq!(ids(&page), vec![1]);
        assert_eq!(page.total_pages, 2);

        let query = SubmissionQuery {
            page: Some(0),
            per_page: Some(10_000),
            ..Default::default()
        };
        let page = query.apply(inbox());
        assert_eq!(page.page, 1);
        assert_eq!(page.per_page, MAX_PER_PAGE);
    }

    #[test]
    fn stats_cover_windows_series_and_reply_rate() {
        let stats = SubmissionStats::compute(&inbox(), now());
        assert_eq!(stats.total, 4);
        assert_eq!(stats.by_status["new"], 1);
        assert_eq!(stats.by_status["archived"], 1);
        assert_eq!(stats.last_7_days, 2);
        assert_eq!(stats.last_30_days, 3);
        assert_eq!(stats.daily.len(), 30);
        assert_eq!(stats.daily.last().unwrap().date, now().date_naive());
        assert_eq!(stats.daily.last().unwrap().count, 1);
        assert_eq!(stats.daily.iter().map(|d| d.count).sum::<u64>(), 3);
        assert!((stats.reply_rate - 0.25).abs() < f64::EPSILON);
    }

    #[test]
    fn stats_of_empty_inbox() {
        let stats = SubmissionStats::compute(&[], now());
        assert_eq!(stats.total, 0);
        assert!((stats.reply_rate - 0.0).abs() < f64::EPSILON);
        assert_eq!(stats.by_status.len(), 4);
    }

    #[test]
    fn new_submission_validation() {
        let form = NewSubmission {
            name: "  Grace ".to_string(),
            email: "Grace@Example.com".to_string(),
            subject: String::new(),
            message: " Let's talk ".to_string(),
        };
        let valid = form.validate().unwrap();
        assert_eq!(valid.name, "Grace");
        assert_eq!(valid.email.as_str(), "grace@example.com");
        assert_eq!(valid.message, "Let's talk");

        let form = NewSubmission {
            name: String::new(),
            email: "nope".to_string(),
            subject: String::new(),
            message: String::new(),
        };
        let fields: Vec<_> = form.validate().unwrap_err().iter().map(|e| e.field).collect();
        assert_eq!(fields, vec!["name", "email", "message"]);
    }

    #[test]
    fn bulk_request_dedups_and_rejects_empty() {
        let request = BulkRequest {
            ids: vec![SubmissionId::new(3), SubmissionId::new(1), SubmissionId::new(3)],
            action: BulkAction::Archive,
        };
        assert_eq!(
            request.ids().unwrap(),
            vec![SubmissionId::new(1), SubmissionId::new(3)]
        );
        assert_eq!(
            BulkAction::Archive.target_status(),
            Some(SubmissionStatus::Archived)
        );

        let empty = BulkRequest {
            ids: vec![],
            action: BulkAction::Delete,
        };
        assert_eq!(empty.ids().unwrap_err().field, "ids");
    }
}
