//! In-process counters for commands and dialog sessions.
//! Values are logged on session transitions and by the status summary.
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, OnceLock};

static COMMANDS_HANDLED: AtomicU64 = AtomicU64::new(0);
static COMMANDS_FAILED: AtomicU64 = AtomicU64::new(0);
static STORE_ERRORS: AtomicU64 = AtomicU64::new(0);

static SESSION_COUNTERS: OnceLock<Mutex<HashMap<String, SessionCounter>>> = OnceLock::new();

pub fn inc_commands_handled() {
    COMMANDS_HANDLED.fetch_add(1, Ordering::Relaxed);
}

pub fn inc_commands_failed() {
    COMMANDS_FAILED.fetch_add(1, Ordering::Relaxed);
}

pub fn inc_store_errors() {
    STORE_ERRORS.fetch_add(1, Ordering::Relaxed);
}

/// How a dialog session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    Committed,
    Cancelled,
    Expired,
}

impl SessionEnd {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionEnd::Committed => "commit",
            SessionEnd::Cancelled => "cancel",
            SessionEnd::Expired => "timeout",
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SessionCounter {
    pub started: u64,
    pub committed: u64,
    pub cancelled: u64,
    pub expired: u64,
    pub active: u64,
    pub concurrent_peak: u64,
}

fn session_counter_lock() -> &'static Mutex<HashMap<String, SessionCounter>> {
    SESSION_COUNTERS.get_or_init(|| Mutex::new(HashMap::new()))
}

pub fn record_session_start(kind: &str) -> SessionCounter {
    let mut guard = session_counter_lock()
        .lock()
        .expect("session counter mutex poisoned");
    let counter = guard.entry(kind.to_string()).or_default();
    counter.started = counter.started.saturating_add(1);
    counter.active = counter.active.saturating_add(1);
    if counter.active > counter.concurrent_peak {
        counter.concurrent_peak = counter.active;
    }
    *counter
}

pub fn record_session_end(kind: &str, end: SessionEnd) -> SessionCounter {
    let mut guard = session_counter_lock()
        .lock()
        .expect("session counter mutex poisoned");
    let counter = guard.entry(kind.to_string()).or_default();
    match end {
        SessionEnd::Committed => counter.committed = counter.committed.saturating_add(1),
        SessionEnd::Cancelled => counter.cancelled = counter.cancelled.saturating_add(1),
        SessionEnd::Expired => counter.expired = counter.expired.saturating_add(1),
    }
    counter.active = counter.active.saturating_sub(1);
    *counter
}

pub fn session_counters_snapshot() -> HashMap<String, SessionCounter> {
    session_counter_lock()
        .lock()
        .expect("session counter mutex poisoned")
        .clone()
}

#[derive(Debug, Default, Clone)]
pub struct Snapshot {
    pub commands_handled: u64,
    pub commands_failed: u64,
    pub store_errors: u64,
    pub sessions: HashMap<String, SessionCounter>,
}

pub fn snapshot() -> Snapshot {
    Snapshot {
        commands_handled: COMMANDS_HANDLED.load(Ordering::Relaxed),
        commands_failed: COMMANDS_FAILED.load(Ordering::Relaxed),
        store_errors: STORE_ERRORS.load(Ordering::Relaxed),
        sessions: session_counters_snapshot(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_start_end_updates_counters() {
        // Unique label: other tests in this binary record real session kinds concurrently.
        let kind = "metrics-selftest";
        let started = record_session_start(kind);
        assert_eq!(started.started, 1);
        assert_eq!(started.active, 1);
        record_session_start(kind);

        let done = record_session_end(kind, SessionEnd::Committed);
        assert_eq!(done.committed, 1);
        assert_eq!(done.active, 1);
        let expired = record_session_end(kind, SessionEnd::Expired);
        assert_eq!(expired.expired, 1);
        assert_eq!(expired.active, 0);
        assert_eq!(expired.concurrent_peak, 2);

        let snap = snapshot();
        assert_eq!(snap.sessions.get(kind).map(|c| c.started), Some(2));
    }

    #[test]
    fn end_without_start_does_not_underflow() {
        let c = record_session_end("metrics-orphan", SessionEnd::Cancelled);
        assert_eq!(c.active, 0);
        assert_eq!(c.cancelled, 1);
    }
}
