//! Session registry and the shared game handle.
//!
//! One participant holds at most one session at a time. A pvp pairing is two
//! registry entries referencing a single [`SharedGame`], so a move applied
//! through either side is visible through the other, and the pair shares one
//! activity clock: a move from either side refreshes it and both sides are
//! evicted together when it expires.

use std::{
    fmt,
    sync::{Arc, Mutex as StdMutex, PoisonError},
    time::{Duration, Instant},
};

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

use crate::{engine::GamePosition, error::ServiceError, state::machine::PuzzleProgress};

/// Opaque, stable identity of a chat user. The sole key for sessions and
/// ratings; no other participant metadata is modeled.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParticipantId(String);

impl ParticipantId {
    /// Wrap a transport-provided identity.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The raw identity string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ParticipantId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ParticipantId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Shared handle to one mutable game position.
///
/// The position sits behind its own lock so that the two sides of a pvp pair
/// serialize against each other when either submits a move; lock order is
/// always session first, then game.
pub struct SharedGame {
    id: Uuid,
    position: Mutex<Box<dyn GamePosition>>,
    last_activity: StdMutex<Instant>,
}

/// Cheaply cloneable reference to a [`SharedGame`].
pub type GameHandle = Arc<SharedGame>;

impl SharedGame {
    /// Wrap a freshly built position into a shareable handle.
    pub fn new(position: Box<dyn GamePosition>) -> GameHandle {
        Arc::new(Self {
            id: Uuid::new_v4(),
            position: Mutex::new(position),
            last_activity: StdMutex::new(Instant::now()),
        })
    }

    /// Identifier used for log correlation only.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// The position lock. Held for the whole of one move submission.
    pub fn position(&self) -> &Mutex<Box<dyn GamePosition>> {
        &self.position
    }

    /// Refresh the activity clock. Called on every accepted move.
    pub fn touch(&self) {
        let mut guard = self
            .last_activity
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        *guard = Instant::now();
    }

    /// How long the game has been without an accepted move, as of `now`.
    pub fn idle_for(&self, now: Instant) -> Duration {
        let guard = self
            .last_activity
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        now.saturating_duration_since(*guard)
    }

    /// Test hook: pretend the last accepted move happened `by` later than it
    /// did, so idleness can be probed with a future `now` without relying on
    /// process uptime.
    #[cfg(test)]
    pub fn shift_activity(&self, by: Duration) {
        let mut guard = self
            .last_activity
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        *guard += by;
    }
}

impl fmt::Debug for SharedGame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedGame").field("id", &self.id).finish()
    }
}

/// One in-progress activity for one participant.
#[derive(Debug)]
pub struct Session {
    /// What kind of activity this is; immutable for the session's lifetime.
    pub kind: SessionKind,
    /// Position handle, shared with the opponent's session for pvp.
    pub game: GameHandle,
}

/// Tagged session variant; each arm carries only the fields it needs.
#[derive(Debug)]
pub enum SessionKind {
    /// Game against the automated opponent. Unrated.
    Bot,
    /// Game against another participant, rated on termination.
    Pvp {
        /// The other side of the pairing.
        opponent: ParticipantId,
    },
    /// Move-by-move replay of a scripted puzzle solution.
    Puzzle(PuzzleProgress),
}

impl SessionKind {
    /// The paired participant, if this session has one.
    pub fn opponent(&self) -> Option<&ParticipantId> {
        match self {
            SessionKind::Pvp { opponent } => Some(opponent),
            SessionKind::Bot | SessionKind::Puzzle(_) => None,
        }
    }
}

/// Per-identity handle; the mutex serializes mutations for one participant.
pub type SessionHandle = Arc<Mutex<Session>>;

/// Concurrency-safe registry mapping participant identity to active session.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: DashMap<ParticipantId, SessionHandle>,
    /// Serializes multi-key registry mutations (paired create, idle sweep) so
    /// a pairing is inserted either fully or not at all.
    gate: StdMutex<()>,
}

impl SessionStore {
    /// Fresh, empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a session for `id`, failing if the identity already holds one.
    pub fn create(&self, id: ParticipantId, session: Session) -> Result<(), ServiceError> {
        let _gate = self.gate.lock().unwrap_or_else(PoisonError::into_inner);
        if self.sessions.contains_key(&id) {
            return Err(ServiceError::SessionExists);
        }
        debug!(participant = %id, game = %session.game.id(), "session created");
        self.sessions.insert(id, Arc::new(Mutex::new(session)));
        Ok(())
    }

    /// Atomically insert both sides of a pairing, or neither.
    pub fn create_paired(
        &self,
        first: ParticipantId,
        first_session: Session,
        second: ParticipantId,
        second_session: Session,
    ) -> Result<(), ServiceError> {
        if first == second {
            return Err(ServiceError::InvalidInput(
                "a pairing needs two distinct participants".into(),
            ));
        }

        let _gate = self.gate.lock().unwrap_or_else(PoisonError::into_inner);
        if self.sessions.contains_key(&first) || self.sessions.contains_key(&second) {
            return Err(ServiceError::SessionExists);
        }
        debug!(
            first = %first,
            second = %second,
            game = %first_session.game.id(),
            "paired sessions created"
        );
        self.sessions
            .insert(first, Arc::new(Mutex::new(first_session)));
        self.sessions
            .insert(second, Arc::new(Mutex::new(second_session)));
        Ok(())
    }

    /// Look up the session handle for `id` without mutating anything.
    pub fn get(&self, id: &ParticipantId) -> Option<SessionHandle> {
        self.sessions.get(id).map(|entry| entry.value().clone())
    }

    /// Remove the session for `id`, if present. Idempotent.
    pub fn remove(&self, id: &ParticipantId) -> bool {
        let removed = self.sessions.remove(id).is_some();
        if removed {
            debug!(participant = %id, "session removed");
        }
        removed
    }

    /// Remove both sides of a pairing as a single unit of work.
    pub fn remove_pair(&self, first: &ParticipantId, second: &ParticipantId) {
        let _gate = self.gate.lock().unwrap_or_else(PoisonError::into_inner);
        self.sessions.remove(first);
        self.sessions.remove(second);
        debug!(first = %first, second = %second, "paired sessions removed");
    }

    /// Evict every session whose activity clock is older than `threshold`.
    ///
    /// A session whose per-identity lock is contended has a move in flight
    /// and is skipped; the move refreshes the clock anyway. Because a pvp
    /// pair shares one clock, both sides expire together, and the opponent
    /// entry is removed in the same pass even when its lock was contended.
    pub fn sweep_idle(&self, now: Instant, threshold: Duration) -> Vec<ParticipantId> {
        let _gate = self.gate.lock().unwrap_or_else(PoisonError::into_inner);

        let mut expired: Vec<(ParticipantId, Option<ParticipantId>)> = Vec::new();
        for entry in self.sessions.iter() {
            let Ok(session) = entry.value().try_lock() else {
                continue;
            };
            if session.game.idle_for(now) > threshold {
                expired.push((entry.key().clone(), session.kind.opponent().cloned()));
            }
        }

        let mut evicted = Vec::new();
        for (id, opponent) in expired {
            if self.sessions.remove(&id).is_some() {
                evicted.push(id);
            }
            if let Some(opponent) = opponent
                && self.sessions.remove(&opponent).is_some()
            {
                evicted.push(opponent);
            }
        }
        evicted
    }

    /// Number of active sessions.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Whether the registry holds no sessions.
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
