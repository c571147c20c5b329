//! Multi-turn dialogs keyed by `(owner, channel)`.
//!
//! A handler that needs more than one message from a user opens a [`Session`]
//! in the [`SessionTable`]. Every later message or selection from the same
//! user in the same channel is routed to that session's transition function,
//! which answers with an [`Outcome`]:
//!
//! | Outcome    | Terminal | Caller action                                   |
//! |------------|----------|-------------------------------------------------|
//! | `Continue` | no       | re-render progress                              |
//! | `Invalid`  | no       | show the format error, state unchanged          |
//! | `Commit`   | yes      | apply the store mutation carried in the payload |
//! | `Cancel`   | yes      | show a cancellation notice                      |
//!
//! Terminal outcomes remove the session. Sessions idle longer than the
//! configured timeout are removed by [`SessionTable::expire_idle`]; a message
//! that arrives for an already-idle session expires it instead of feeding it,
//! so the slot is always free again once the deadline has passed.

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Duration, Utc};
use log::{debug, info};
use uuid::Uuid;

use crate::crafting::errors::CraftError;
use crate::crafting::types::RecipeLine;
use crate::logutil::{escape_log, session_label};
use crate::metrics::{self, SessionEnd};
use crate::validation;

/// Sentinel that commits an ingredient collection.
pub const DONE_TOKEN: &str = "done";
/// Sentinel that abandons a text dialog.
pub const CANCEL_TOKEN: &str = "cancel";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionKey {
    pub owner: String,
    pub channel: String,
}

impl SessionKey {
    pub fn new(owner: impl Into<String>, channel: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            channel: channel.into(),
        }
    }
}

impl fmt::Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&session_label(&self.owner, &self.channel))
    }
}

/// Which dialog a session is running, with the context its commit needs.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionKind {
    /// add-item: collect `<qty> <name>` lines until `done`.
    CollectIngredients { description: String },
    /// update-item: the next message replaces the ingredient text.
    AwaitReplacementList,
    /// delete-item: wait for an affirm/decline selection.
    AwaitConfirmation,
    /// price editor: the next message is the new unit price.
    AwaitNewPrice { page_start: usize },
}

impl SessionKind {
    pub fn label(&self) -> &'static str {
        match self {
            SessionKind::CollectIngredients { .. } => "add-item",
            SessionKind::AwaitReplacementList => "update-item",
            SessionKind::AwaitConfirmation => "delete-item",
            SessionKind::AwaitNewPrice { .. } => "edit-price",
        }
    }
}

/// Canonical choices offered by a confirmation prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice {
    Affirm,
    Decline,
}

/// One inbound event addressed to a session.
#[derive(Debug, Clone, PartialEq)]
pub enum Input {
    Text(String),
    Choice(Choice),
}

/// Data handed to the caller on a committing transition.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Ingredients(Vec<RecipeLine>),
    Replacement(String),
    Confirmed,
    Price(f64),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Continue,
    Commit(Payload),
    Cancel,
    Invalid(String),
}

impl Outcome {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Outcome::Commit(_) | Outcome::Cancel)
    }
}

/// A live dialog for one `(owner, channel)` pair.
#[derive(Debug, Clone)]
pub struct Session {
    pub id: String,
    pub key: SessionKey,
    pub kind: SessionKind,
    /// Item or ingredient name the dialog edits.
    pub target: String,
    pub collected: Vec<RecipeLine>,
    pub max_collected: usize,
    pub started_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
}

impl Session {
    fn new(
        key: SessionKey,
        kind: SessionKind,
        target: String,
        max_collected: usize,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            key,
            kind,
            target,
            collected: Vec::new(),
            max_collected,
            started_at: now,
            last_activity: now,
        }
    }

    pub fn is_idle(&self, now: DateTime<Utc>, timeout: Duration) -> bool {
        now - self.last_activity >= timeout
    }

    /// Apply one input. Terminal outcomes leave the session ready to be dropped.
    pub fn feed(&mut self, input: &Input) -> Outcome {
        match (&self.kind, input) {
            (SessionKind::CollectIngredients { .. }, Input::Text(text)) => self.collect_line(text),
            (SessionKind::AwaitReplacementList, Input::Text(text)) => {
                if is_token(text, CANCEL_TOKEN) {
                    Outcome::Cancel
                } else {
                    Outcome::Commit(Payload::Replacement(text.clone()))
                }
            }
            (SessionKind::AwaitConfirmation, Input::Choice(Choice::Affirm)) => {
                Outcome::Commit(Payload::Confirmed)
            }
            (SessionKind::AwaitConfirmation, Input::Choice(Choice::Decline)) => Outcome::Cancel,
            (SessionKind::AwaitConfirmation, Input::Text(_)) => {
                Outcome::Invalid("Please choose Confirm or Cancel.".to_string())
            }
            (SessionKind::AwaitNewPrice { .. }, Input::Text(text)) => {
                if is_token(text, CANCEL_TOKEN) {
                    return Outcome::Cancel;
                }
                match validation::parse_amount(text) {
                    Ok(price) => Outcome::Commit(Payload::Price(price)),
                    Err(e) => Outcome::Invalid(e.to_string()),
                }
            }
            (_, Input::Choice(_)) => {
                Outcome::Invalid("This dialog expects a typed reply.".to_string())
            }
        }
    }

    fn collect_line(&mut self, text: &str) -> Outcome {
        if is_token(text, DONE_TOKEN) {
            if self.collected.is_empty() {
                return Outcome::Invalid(
                    "Add at least one ingredient before typing 'done'.".to_string(),
                );
            }
            return Outcome::Commit(Payload::Ingredients(std::mem::take(&mut self.collected)));
        }
        if is_token(text, CANCEL_TOKEN) {
            return Outcome::Cancel;
        }
        if self.collected.len() >= self.max_collected {
            return Outcome::Invalid(format!(
                "An item can have at most {} ingredient lines. Type 'done' to save.",
                self.max_collected
            ));
        }
        match validation::parse_recipe_line(text) {
            Ok(line) => {
                self.collected.push(line);
                Outcome::Continue
            }
            Err(e) => Outcome::Invalid(e.to_string()),
        }
    }
}

fn is_token(text: &str, token: &str) -> bool {
    text.trim().eq_ignore_ascii_case(token)
}

/// Result of routing an input to the session table.
#[derive(Debug, Clone)]
pub enum Routed {
    /// No dialog is open for this author in this channel.
    NoSession,
    /// The dialog had already passed its idle deadline and was closed.
    Expired(Session),
    /// The input was applied. For terminal outcomes `session` is the removed
    /// session; otherwise it is a snapshot after the transition.
    Fed { session: Session, outcome: Outcome },
}

/// All open dialogs, at most one per `(owner, channel)`.
pub struct SessionTable {
    sessions: HashMap<SessionKey, Session>,
    idle_timeout: Duration,
    max_collected: usize,
}

impl SessionTable {
    pub fn new(idle_timeout: Duration, max_collected: usize) -> Self {
        Self {
            sessions: HashMap::new(),
            idle_timeout,
            max_collected: max_collected.max(1),
        }
    }

    pub fn idle_timeout(&self) -> Duration {
        self.idle_timeout
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn get(&self, owner: &str, channel: &str) -> Option<&Session> {
        self.sessions.get(&SessionKey::new(owner, channel))
    }

    pub fn start(
        &mut self,
        owner: &str,
        channel: &str,
        kind: SessionKind,
        target: &str,
    ) -> Result<&Session, CraftError> {
        self.start_at(owner, channel, kind, target, Utc::now())
    }

    /// Open a dialog, rejecting with `SessionConflict` when one is already live
    /// for the pair. An idle one past its deadline is expired first.
    pub fn start_at(
        &mut self,
        owner: &str,
        channel: &str,
        kind: SessionKind,
        target: &str,
        now: DateTime<Utc>,
    ) -> Result<&Session, CraftError> {
        let key = SessionKey::new(owner, channel);
        if let Some(existing) = self.sessions.get(&key) {
            if existing.is_idle(now, self.idle_timeout) {
                if let Some(stale) = self.sessions.remove(&key) {
                    Self::log_end(&stale, SessionEnd::Expired);
                }
            } else {
                return Err(CraftError::SessionConflict {
                    owner: owner.to_string(),
                    channel: channel.to_string(),
                    kind: existing.kind.label().to_string(),
                });
            }
        }

        let session = Session::new(key.clone(), kind, target.to_string(), self.max_collected, now);
        let counters = metrics::record_session_start(session.kind.label());
        info!(
            target: "reciperanger::sessions",
            "session.start id={} kind={} key={} target={} active={} started={}",
            session.id,
            session.kind.label(),
            escape_log(&key.to_string()),
            escape_log(&session.target),
            counters.active,
            counters.started
        );
        Ok(self.sessions.entry(key).or_insert(session))
    }

    pub fn feed(&mut self, owner: &str, channel: &str, input: &Input) -> Routed {
        self.feed_at(owner, channel, input, Utc::now())
    }

    /// Route `input` to the session owned by `(owner, channel)`, if any.
    pub fn feed_at(
        &mut self,
        owner: &str,
        channel: &str,
        input: &Input,
        now: DateTime<Utc>,
    ) -> Routed {
        let key = SessionKey::new(owner, channel);
        let Some(session) = self.sessions.get_mut(&key) else {
            return Routed::NoSession;
        };

        if session.is_idle(now, self.idle_timeout) {
            return match self.sessions.remove(&key) {
                Some(stale) => {
                    Self::log_end(&stale, SessionEnd::Expired);
                    Routed::Expired(stale)
                }
                None => Routed::NoSession,
            };
        }

        session.last_activity = now;
        let outcome = session.feed(input);
        debug!(
            target: "reciperanger::sessions",
            "session.feed id={} outcome={:?}",
            session.id,
            outcome
        );

        if outcome.is_terminal() {
            let Some(done) = self.sessions.remove(&key) else {
                return Routed::NoSession;
            };
            let end = match outcome {
                Outcome::Commit(_) => SessionEnd::Committed,
                _ => SessionEnd::Cancelled,
            };
            Self::log_end(&done, end);
            Routed::Fed {
                session: done,
                outcome,
            }
        } else {
            Routed::Fed {
                session: session.clone(),
                outcome,
            }
        }
    }

    pub fn expire_idle(&mut self) -> Vec<Session> {
        self.expire_idle_at(Utc::now())
    }

    /// Remove and return every session idle past the deadline.
    pub fn expire_idle_at(&mut self, now: DateTime<Utc>) -> Vec<Session> {
        let timeout = self.idle_timeout;
        let stale_keys: Vec<SessionKey> = self
            .sessions
            .iter()
            .filter(|(_, s)| s.is_idle(now, timeout))
            .map(|(k, _)| k.clone())
            .collect();
        let mut expired = Vec::with_capacity(stale_keys.len());
        for key in stale_keys {
            if let Some(stale) = self.sessions.remove(&key) {
                Self::log_end(&stale, SessionEnd::Expired);
                expired.push(stale);
            }
        }
        expired
    }

    /// Close every dialog without committing (shutdown path).
    pub fn drain(&mut self) -> Vec<Session> {
        let drained: Vec<Session> = self.sessions.drain().map(|(_, s)| s).collect();
        for s in &drained {
            Self::log_end(s, SessionEnd::Cancelled);
        }
        drained
    }

    fn log_end(session: &Session, end: SessionEnd) {
        let counters = metrics::record_session_end(session.kind.label(), end);
        info!(
            target: "reciperanger::sessions",
            "session.end id={} kind={} key={} reason={} active={} committed={} cancelled={} expired={}",
            session.id,
            session.kind.label(),
            escape_log(&session.key.to_string()),
            end.as_str(),
            counters.active,
            counters.committed,
            counters.cancelled,
            counters.expired
        );
    }
}
