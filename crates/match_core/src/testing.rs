//! Test doubles for driving a session without a real rules engine or a
//! real transport.
//!
//! [`ScriptedEngine`] hands out whatever legal-move set and repetition
//! verdict the test scripted, and [`RecordingGateway`] captures every
//! outbound event for later assertions. Both are cheap clones over shared
//! state so a test can keep a handle while the session owns another.
//!
//! The server binary also wires a [`ScriptedEngine`] by default until a
//! real engine implementation is linked in, which keeps the full network
//! path exercisable end to end.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Mutex as AsyncMutex;

use crate::engine::{RepetitionStatus, RulesEngine};
use crate::error::EngineError;
use crate::events::ServerEvent;
use crate::gateway::EventGateway;
use crate::types::{ClientId, Side};

#[derive(Debug)]
struct ScriptedState {
    side: Side,
    history: Vec<String>,
    legal: Vec<String>,
    legal_after_apply: Option<Vec<String>>,
    repetition: RepetitionStatus,
    fail_apply_on: Option<String>,
}

/// A rules engine whose verdicts are scripted by the test.
///
/// Clones share state, so mutating through one handle is visible through
/// the boxed copy a [`crate::session::Session`] owns.
#[derive(Debug, Clone)]
pub struct ScriptedEngine {
    state: Arc<Mutex<ScriptedState>>,
}

impl ScriptedEngine {
    /// An engine that accepts a small fixed move vocabulary forever.
    pub fn new() -> Self {
        Self::with_legal_moves(&["4e4d", "3e3d", "2e2d", "1e1d"])
    }

    pub fn with_legal_moves(moves: &[&str]) -> Self {
        Self {
            state: Arc::new(Mutex::new(ScriptedState {
                side: Side::Black,
                history: Vec::new(),
                legal: moves.iter().map(|m| m.to_string()).collect(),
                legal_after_apply: None,
                repetition: RepetitionStatus::Clear,
                fail_apply_on: None,
            })),
        }
    }

    /// Replace the legal-move set immediately.
    pub fn set_legal_moves(&self, moves: &[&str]) {
        self.lock().legal = moves.iter().map(|m| m.to_string()).collect();
    }

    /// Replace the legal-move set as a side effect of the next applied
    /// move, e.g. to script a mating move.
    pub fn set_legal_moves_after_next_apply(&self, moves: &[&str]) {
        self.lock().legal_after_apply = Some(moves.iter().map(|m| m.to_string()).collect());
    }

    /// Script the repetition verdict reported after subsequent moves.
    pub fn set_repetition(&self, status: RepetitionStatus) {
        self.lock().repetition = status;
    }

    /// Make `apply_move` fail for this notation, simulating an engine
    /// fault on an otherwise legal move.
    pub fn fail_on_apply(&self, notation: &str) {
        self.lock().fail_apply_on = Some(notation.to_string());
    }

    /// Moves applied so far, in order.
    pub fn history(&self) -> Vec<String> {
        self.lock().history.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ScriptedState> {
        self.state.lock().unwrap()
    }
}

impl Default for ScriptedEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl RulesEngine for ScriptedEngine {
    fn set_start_position(&mut self) {
        let mut state = self.lock();
        state.side = Side::Black;
        state.history.clear();
    }

    fn side_to_move(&self) -> Side {
        self.lock().side
    }

    fn legal_moves(&self) -> Vec<String> {
        self.lock().legal.clone()
    }

    fn apply_move(&mut self, notation: &str) -> Result<(), EngineError> {
        let mut state = self.lock();
        if state.fail_apply_on.as_deref() == Some(notation) {
            return Err(EngineError::Internal(format!(
                "scripted failure applying '{}'",
                notation
            )));
        }
        if !state.legal.iter().any(|m| m == notation) {
            return Err(EngineError::Rejected(format!("'{}' is not legal", notation)));
        }
        state.history.push(notation.to_string());
        state.side = state.side.opponent();
        if let Some(next) = state.legal_after_apply.take() {
            state.legal = next;
        }
        Ok(())
    }

    fn repetition_status(&self) -> RepetitionStatus {
        self.lock().repetition
    }

    fn sfen(&self) -> String {
        let state = self.lock();
        if state.history.is_empty() {
            "startpos".to_string()
        } else {
            format!("startpos moves {}", state.history.join(" "))
        }
    }

    fn svg(&self) -> String {
        format!(
            "<svg viewBox=\"0 0 5 5\"><desc>position after {} plies</desc></svg>",
            self.lock().history.len()
        )
    }

    fn kif(&self) -> String {
        self.lock()
            .history
            .iter()
            .enumerate()
            .map(|(i, notation)| format!("{} {}", i + 1, notation))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// One captured outbound event: `to` is `None` for a broadcast.
#[derive(Debug, Clone, PartialEq)]
pub struct Sent {
    pub to: Option<ClientId>,
    pub event: ServerEvent,
}

/// An [`EventGateway`] that records instead of transmitting.
#[derive(Debug, Clone, Default)]
pub struct RecordingGateway {
    log: Arc<AsyncMutex<Vec<Sent>>>,
}

impl RecordingGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drain and return everything captured so far.
    pub async fn take(&self) -> Vec<Sent> {
        std::mem::take(&mut *self.log.lock().await)
    }

    /// Events addressed to `to`, oldest first, without draining.
    pub async fn sent_to(&self, to: ClientId) -> Vec<ServerEvent> {
        self.log
            .lock()
            .await
            .iter()
            .filter(|s| s.to == Some(to))
            .map(|s| s.event.clone())
            .collect()
    }

    /// Broadcast events, oldest first, without draining.
    pub async fn broadcasts(&self) -> Vec<ServerEvent> {
        self.log
            .lock()
            .await
            .iter()
            .filter(|s| s.to.is_none())
            .map(|s| s.event.clone())
            .collect()
    }
}

#[async_trait]
impl EventGateway for RecordingGateway {
    async fn send(&self, to: ClientId, event: ServerEvent) {
        self.log.lock().await.push(Sent {
            to: Some(to),
            event,
        });
    }

    async fn broadcast(&self, event: ServerEvent) {
        self.log.lock().await.push(Sent { to: None, event });
    }
}
