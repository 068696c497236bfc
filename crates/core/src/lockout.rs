//! Advisory login lockout guard.
//!
//! The guard throttles repeated sign-in attempts from one browser. It keeps
//! a small record (attempt count plus an optional deadline) under the
//! browser-scoped key [`LOCKOUT_KEY`] and rejects attempts while the
//! deadline is in the future, without contacting the identity provider.
//!
//! This is friction, not a security boundary: the record lives with the
//! browser, so clearing cookies or switching browsers starts fresh.
//!
//! [`LockoutPolicy`] is a pure function of `(now, state)`; reading and
//! writing the record goes through [`KeyValueStore`] so the guard can run
//! against the session store in production and [`MemoryStore`] in tests.

use std::collections::HashMap;
use std::convert::Infallible;
use std::future::Future;
use std::sync::Mutex;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

/// Browser-scoped key holding the serialized [`LockoutState`].
pub const LOCKOUT_KEY: &str = "adminLockout";

/// Browser-scoped key holding the email remembered for the login form.
pub const REMEMBERED_ADMIN_KEY: &str = "rememberedAdmin";

/// Browser-scoped key holding the per-login console session id.
pub const CONSOLE_SESSION_KEY: &str = "consoleSessionId";

/// Consecutive failures that trigger a lock.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// Length of the cool-down window in minutes.
pub const DEFAULT_LOCK_MINUTES: i64 = 15;

const MILLIS_PER_MINUTE: i64 = 60_000;

/// Persisted lockout record.
///
/// Serialized as `{"attemptCount": 3, "lockedUntil": 1700000000000}` with
/// the deadline in epoch milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LockoutState {
    /// Consecutive failed attempts since the last success or expiry.
    #[serde(default)]
    pub attempt_count: u32,
    /// When present and in the future, attempts are rejected.
    #[serde(
        default,
        with = "chrono::serde::ts_milliseconds_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub locked_until: Option<DateTime<Utc>>,
}

impl LockoutState {
    /// Whether the record carries no information worth persisting.
    #[must_use]
    pub const fn is_clear(&self) -> bool {
        self.attempt_count == 0 && self.locked_until.is_none()
    }
}

/// Outcome of consulting the guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LockoutDecision {
    /// The attempt may proceed to the identity provider.
    Allow {
        /// Failures left before the next one locks the browser out.
        attempts_remaining: u32,
    },
    /// The attempt is rejected without contacting the identity provider.
    Locked {
        locked_until: DateTime<Utc>,
        minutes_remaining: i64,
    },
}

impl LockoutDecision {
    #[must_use]
    pub const fn is_locked(&self) -> bool {
        matches!(self, Self::Locked { .. })
    }

    /// Countdown value to display; 0 when not locked.
    #[must_use]
    pub const fn minutes_remaining(&self) -> i64 {
        match self {
            Self::Allow { .. } => 0,
            Self::Locked {
                minutes_remaining, ..
            } => *minutes_remaining,
        }
    }
}

/// Thresholds for the guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockoutPolicy {
    max_attempts: u32,
    lock_duration: TimeDelta,
}

impl Default for LockoutPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            lock_duration: TimeDelta::minutes(DEFAULT_LOCK_MINUTES),
        }
    }
}

impl LockoutPolicy {
    /// Build a policy. `max_attempts` is clamped to at least 1.
    #[must_use]
    pub fn new(max_attempts: u32, lock_duration: TimeDelta) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            lock_duration,
        }
    }

    #[must_use]
    pub const fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    #[must_use]
    pub const fn lock_duration(&self) -> TimeDelta {
        self.lock_duration
    }

    /// Decide whether an attempt may proceed.
    ///
    /// An elapsed deadline clears the record entirely. A record that has
    /// reached the threshold without a deadline (hand-edited or written by
    /// an older build) is locked starting at `now`.
    #[must_use]
    pub fn check(&self, now: DateTime<Utc>, state: LockoutState) -> (LockoutDecision, LockoutState) {
        match state.locked_until {
            Some(until) if until > now => (self.locked(now, until), state),
            Some(_) => (
                LockoutDecision::Allow {
                    attempts_remaining: self.max_attempts,
                },
                LockoutState::default(),
            ),
            None if state.attempt_count >= self.max_attempts => {
                let until = now + self.lock_duration;
                (
                    self.locked(now, until),
                    LockoutState {
                        attempt_count: state.attempt_count,
                        locked_until: Some(until),
                    },
                )
            }
            None => (
                LockoutDecision::Allow {
                    attempts_remaining: self.max_attempts - state.attempt_count,
                },
                state,
            ),
        }
    }

    /// Register a failed credential check.
    ///
    /// Failures while already locked do not extend the deadline.
    #[must_use]
    pub fn record_failure(
        &self,
        now: DateTime<Utc>,
        state: LockoutState,
    ) -> (LockoutDecision, LockoutState) {
        let (decision, state) = self.check(now, state);
        if decision.is_locked() {
            return (decision, state);
        }

        let attempt_count = state.attempt_count.saturating_add(1);
        if attempt_count >= self.max_attempts {
            let until = now + self.lock_duration;
            return (
                self.locked(now, until),
                LockoutState {
                    attempt_count,
                    locked_until: Some(until),
                },
            );
        }

        (
            LockoutDecision::Allow {
                attempts_remaining: self.max_attempts - attempt_count,
            },
            LockoutState {
                attempt_count,
                locked_until: None,
            },
        )
    }

    /// Register a successful sign-in: the record is cleared.
    #[must_use]
    pub fn record_success(&self) -> LockoutState {
        LockoutState::default()
    }

    fn locked(&self, now: DateTime<Utc>, until: DateTime<Utc>) -> LockoutDecision {
        LockoutDecision::Locked {
            locked_until: until,
            minutes_remaining: minutes_remaining(now, until),
        }
    }
}

/// Whole minutes left until `until`, rounded up.
///
/// Equals `ceil((until - now) / 60000ms)` and is 0 exactly when
/// `now >= until`, which is also when [`LockoutPolicy::check`] clears the
/// lock.
#[must_use]
pub fn minutes_remaining(now: DateTime<Utc>, until: DateTime<Utc>) -> i64 {
    let millis = (until - now).num_milliseconds();
    if millis <= 0 {
        0
    } else {
        (millis + MILLIS_PER_MINUTE - 1) / MILLIS_PER_MINUTE
    }
}

// =============================================================================
// Storage seam
// =============================================================================

/// Browser-scoped string key-value storage.
///
/// Values are opaque strings (JSON for structured records). Every use is
/// best-effort: callers treat missing or unreadable values as absent.
pub trait KeyValueStore: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    fn get(&self, key: &str) -> impl Future<Output = Result<Option<String>, Self::Error>> + Send;

    fn set(&self, key: &str, value: String) -> impl Future<Output = Result<(), Self::Error>> + Send;

    fn remove(&self, key: &str) -> impl Future<Output = Result<(), Self::Error>> + Send;
}

/// Typed access to the lockout record on top of a [`KeyValueStore`].
#[derive(Debug)]
pub struct LockoutStore<'a, S> {
    store: &'a S,
}

impl<'a, S: KeyValueStore> LockoutStore<'a, S> {
    #[must_use]
    pub const fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Load the record; an unreadable value counts as no record.
    ///
    /// # Errors
    ///
    /// Returns the store's error if the read itself fails.
    pub async fn load(&self) -> Result<LockoutState, S::Error> {
        let raw = self.store.get(LOCKOUT_KEY).await?;
        Ok(raw
            .and_then(|value| serde_json::from_str(&value).ok())
            .unwrap_or_default())
    }

    /// Persist the record, removing the key when the record is clear.
    ///
    /// # Errors
    ///
    /// Returns the store's error if the write fails.
    pub async fn save(&self, state: LockoutState) -> Result<(), S::Error> {
        if state.is_clear() {
            return self.store.remove(LOCKOUT_KEY).await;
        }
        // Serializing two plain fields cannot fail.
        let value = serde_json::to_string(&state).unwrap_or_default();
        self.store.set(LOCKOUT_KEY, value).await
    }
}

/// In-process [`KeyValueStore`] used by tests and tooling.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn with_entries<R>(&self, f: impl FnOnce(&mut HashMap<String, String>) -> R) -> R {
        let mut guard = self
            .entries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        f(&mut guard)
    }
}

impl KeyValueStore for MemoryStore {
    type Error = Infallible;

    async fn get(&self, key: &str) -> Result<Option<String>, Self::Error> {
        Ok(self.with_entries(|entries| entries.get(key).cloned()))
    }

    async fn set(&self, key: &str, value: String) -> Result<(), Self::Error> {
        self.with_entries(|entries| entries.insert(key.to_owned(), value));
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), Self::Error> {
        self.with_entries(|entries| entries.remove(key));
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn t0() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    fn fail_n(policy: &LockoutPolicy, now: DateTime<Utc>, n: u32) -> (LockoutDecision, LockoutState) {
        let mut state = LockoutState::default();
        let mut decision = LockoutDecision::Allow {
            attempts_remaining: policy.max_attempts(),
        };
        for _ in 0..n {
            (decision, state) = policy.record_failure(now, state);
        }
        (decision, state)
    }

    #[test]
    fn fifth_failure_locks_for_fifteen_minutes() {
        let policy = LockoutPolicy::default();
        let (decision, state) = fail_n(&policy, t0(), 5);

        assert_eq!(state.attempt_count, 5);
        assert_eq!(state.locked_until, Some(t0() + TimeDelta::minutes(15)));
        assert_eq!(
            decision,
            LockoutDecision::Locked {
                locked_until: t0() + TimeDelta::minutes(15),
                minutes_remaining: 15,
            }
        );
    }

    #[test]
    fn failures_below_threshold_report_attempts_remaining() {
        let policy = LockoutPolicy::default();
        for n in 1..5 {
            let (decision, state) = fail_n(&policy, t0(), n);
            assert_eq!(
                decision,
                LockoutDecision::Allow {
                    attempts_remaining: 5 - n
                }
            );
            assert_eq!(state.locked_until, None);
        }
    }

    #[test]
    fn locked_state_rejects_until_deadline() {
        let policy = LockoutPolicy::default();
        let (_, locked) = fail_n(&policy, t0(), 5);

        for seconds in [0, 1, 59, 60, 61, 14 * 60 + 59, 15 * 60 - 1] {
            let now = t0() + TimeDelta::seconds(seconds);
            let (decision, state) = policy.check(now, locked);
            assert!(decision.is_locked(), "should be locked at +{seconds}s");
            assert_eq!(state, locked);
        }

        let (decision, state) = policy.check(t0() + TimeDelta::minutes(15), locked);
        assert!(!decision.is_locked());
        assert_eq!(state, LockoutState::default());
    }

    #[test]
    fn failure_while_locked_does_not_extend_deadline() {
        let policy = LockoutPolicy::default();
        let (_, locked) = fail_n(&policy, t0(), 5);
        let later = t0() + TimeDelta::minutes(5);

        let (decision, state) = policy.record_failure(later, locked);
        assert_eq!(state, locked);
        assert_eq!(decision.minutes_remaining(), 10);
    }

    #[test]
    fn success_restores_full_allowance_after_any_failure_count() {
        let policy = LockoutPolicy::default();
        for n in 1..5 {
            let (_, before) = fail_n(&policy, t0(), n);
            let (decision, _) = policy.check(t0(), before);
            assert_eq!(
                decision,
                LockoutDecision::Allow {
                    attempts_remaining: 5 - n
                }
            );

            let (decision, after) = policy.check(t0(), policy.record_success());
            assert_eq!(
                decision,
                LockoutDecision::Allow {
                    attempts_remaining: 5
                }
            );
            assert!(after.is_clear());
        }
    }

    #[test]
    fn expired_lock_starts_a_fresh_count() {
        let policy = LockoutPolicy::default();
        let (_, locked) = fail_n(&policy, t0(), 5);
        let after = t0() + TimeDelta::minutes(16);

        let (decision, state) = policy.record_failure(after, locked);
        assert_eq!(
            decision,
            LockoutDecision::Allow {
                attempts_remaining: 4
            }
        );
        assert_eq!(state.attempt_count, 1);
    }

    #[test]
    fn threshold_without_deadline_is_repaired() {
        let policy = LockoutPolicy::default();
        let stale = LockoutState {
            attempt_count: 9,
            locked_until: None,
        };
        let (decision, state) = policy.check(t0(), stale);
        assert!(decision.is_locked());
        assert_eq!(state.locked_until, Some(t0() + TimeDelta::minutes(15)));
    }

    #[test]
    fn countdown_rounds_up_and_hits_zero_at_deadline() {
        let until = t0() + TimeDelta::minutes(15);
        assert_eq!(minutes_remaining(t0(), until), 15);
        assert_eq!(minutes_remaining(t0() + TimeDelta::milliseconds(1), until), 15);
        assert_eq!(minutes_remaining(t0() + TimeDelta::seconds(60), until), 14);
        assert_eq!(minutes_remaining(until - TimeDelta::milliseconds(1), until), 1);
        assert_eq!(minutes_remaining(until, until), 0);
        assert_eq!(minutes_remaining(until + TimeDelta::seconds(3), until), 0);
    }

    #[test]
    fn countdown_matches_ceil_formula_every_second() {
        let policy = LockoutPolicy::default();
        let (_, locked) = fail_n(&policy, t0(), 5);
        let until = locked.locked_until.unwrap();

        for second in 0..=(15 * 60 + 2) {
            let now = t0() + TimeDelta::seconds(second);
            let (decision, _) = policy.check(now, locked);
            let remaining_ms = (until - now).num_milliseconds().max(0);
            let expected = (remaining_ms + 59_999) / 60_000;
            assert_eq!(decision.minutes_remaining(), expected);
            assert_eq!(decision.is_locked(), expected > 0);
        }
    }

    #[test]
    fn custom_policy_clamps_attempts() {
        let policy = LockoutPolicy::new(0, TimeDelta::minutes(1));
        assert_eq!(policy.max_attempts(), 1);
        let (decision, _) = policy.record_failure(t0(), LockoutState::default());
        assert_eq!(decision.minutes_remaining(), 1);
    }

    #[test]
    fn state_serializes_with_camel_case_millis() {
        let state = LockoutState {
            attempt_count: 5,
            locked_until: Some(t0()),
        };
        let json = serde_json::to_string(&state).unwrap();
        assert_eq!(json, r#"{"attemptCount":5,"lockedUntil":1700000000000}"#);

        let clear = serde_json::to_string(&LockoutState::default()).unwrap();
        assert_eq!(clear, r#"{"attemptCount":0}"#);
    }

    #[tokio::test]
    async fn store_round_trips_and_removes_clear_records() {
        let memory = MemoryStore::new();
        let store = LockoutStore::new(&memory);

        assert_eq!(store.load().await.unwrap(), LockoutState::default());

        let state = LockoutState {
            attempt_count: 2,
            locked_until: None,
        };
        store.save(state).await.unwrap();
        assert_eq!(store.load().await.unwrap(), state);

        store.save(LockoutState::default()).await.unwrap();
        assert_eq!(memory.get(LOCKOUT_KEY).await.unwrap(), None);
    }

    #[tokio::test]
    async fn unreadable_record_counts_as_absent() {
        let memory = MemoryStore::new();
        memory
            .set(LOCKOUT_KEY, "{not json".to_string())
            .await
            .unwrap();
        let store = LockoutStore::new(&memory);
        assert_eq!(store.load().await.unwrap(), LockoutState::default());
    }
}
