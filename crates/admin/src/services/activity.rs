//! Best-effort activity logging.
//!
//! Recording an action must never fail the request that performed it:
//! [`ActivityLogger::record`] swallows write errors after logging them.

use std::future::Future;

use serde_json::Value;

use crate::db::{ActivityRepository, RepositoryError};
use crate::models::{ActivityAction, CurrentAdmin, NewActivity};

/// Destination for activity records.
pub trait ActivitySink: Send + Sync {
    fn write(&self, activity: &NewActivity)
    -> impl Future<Output = Result<(), RepositoryError>> + Send;
}

impl ActivitySink for ActivityRepository<'_> {
    async fn write(&self, activity: &NewActivity) -> Result<(), RepositoryError> {
        self.insert(activity).await
    }
}

/// Fire-and-forget wrapper around an [`ActivitySink`].
pub struct ActivityLogger<K> {
    sink: K,
}

impl<K: ActivitySink> ActivityLogger<K> {
    pub const fn new(sink: K) -> Self {
        Self { sink }
    }

    /// Record an action by `admin` (or by an anonymous visitor when `None`).
    pub async fn record(
        &self,
        admin: Option<&CurrentAdmin>,
        action: ActivityAction,
        target: Option<String>,
        details: Value,
    ) {
        let activity = NewActivity {
            admin_uid: admin.map(|a| a.uid.clone()),
            console_session_id: admin.map(|a| a.console_session_id.clone()),
            action,
            target,
            details,
        };

        if let Err(err) = self.sink.write(&activity).await {
            tracing::warn!(
                error = %err,
                action = %activity.action,
                "Failed to record activity"
            );
        }
    }
}
