//! The match session: players, clocks, and the lifecycle state machine.
//!
//! A session admits exactly two players, runs the readiness handshake, then
//! alternates move requests until a terminal condition. All transitions run
//! to completion one at a time (the coordinator serializes them), and every
//! wall-clock instant is passed in by the caller.

use std::time::Instant;

use tracing::{debug, info};

use crate::clock::{Clock, TimeControl};
use crate::engine::{RepetitionStatus, RulesEngine};
use crate::error::EngineError;
use crate::events::{ClockPanel, ServerEvent, RESIGN};
use crate::gateway::EventGateway;
use crate::types::{ClientId, MatchOutcome, Side};

/// Lifecycle state of a session. Terminal: [`MatchPhase::GameOver`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchPhase {
    /// Fewer than two players registered.
    WaitingForPlayers,
    /// Two players registered, readiness handshake in flight.
    WaitingForReady,
    /// The game is running.
    InProgress,
    /// The game ended; only view queries do anything now.
    GameOver,
}

/// One registered participant. The vector index equals the side index:
/// the first to join plays Black and moves first.
#[derive(Debug, Clone)]
pub struct Player {
    pub connection: ClientId,
    pub name: String,
    pub author: String,
    pub ready: bool,
}

/// The aggregate root: two players, two clocks, the engine handle, and the
/// phase tag.
///
/// The session never reads the wall clock itself and never blocks waiting
/// for a peer: a move request is fire-and-forget, and the next inbound event
/// drives the next transition whenever it arrives.
pub struct Session {
    phase: MatchPhase,
    players: Vec<Player>,
    clocks: [Clock; 2],
    engine: Box<dyn RulesEngine>,
}

impl Session {
    pub fn new(engine: Box<dyn RulesEngine>, time: TimeControl) -> Self {
        Self {
            phase: MatchPhase::WaitingForPlayers,
            players: Vec::with_capacity(2),
            clocks: [
                Clock::new(time.main[Side::Black.index()], time.byoyomi),
                Clock::new(time.main[Side::White.index()], time.byoyomi),
            ],
            engine,
        }
    }

    pub fn phase(&self) -> MatchPhase {
        self.phase
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    /// Register a player, or tell the sender why not.
    ///
    /// The second registration moves the session to the readiness handshake;
    /// later attempts are rejected so the two-seat capacity is explicit.
    pub async fn handle_join(
        &mut self,
        sender: ClientId,
        name: String,
        author: String,
        gateway: &dyn EventGateway,
    ) {
        if self.phase != MatchPhase::WaitingForPlayers {
            gateway
                .send(
                    sender,
                    ServerEvent::Error {
                        message: "The game has already started.".to_string(),
                    },
                )
                .await;
            return;
        }

        if self.players.iter().any(|p| p.connection == sender) {
            gateway
                .send(
                    sender,
                    ServerEvent::Error {
                        message: "You have already joined.".to_string(),
                    },
                )
                .await;
            return;
        }

        info!("player '{}' (author '{}') joined", name, author);
        self.players.push(Player {
            connection: sender,
            name,
            author,
            ready: false,
        });

        gateway
            .send(
                sender,
                ServerEvent::Info {
                    message: "Correctly accepted.".to_string(),
                },
            )
            .await;

        if self.players.len() == 2 {
            // Two players sat down; ask both to confirm readiness.
            self.phase = MatchPhase::WaitingForReady;
            for player in &self.players {
                gateway.send(player.connection, ServerEvent::ReadyCheck).await;
            }
        }
    }

    /// Record a readiness confirmation; when both players confirmed, set up
    /// the start position and ask Black for the first move.
    ///
    /// Confirmations outside the handshake phase or from unregistered
    /// senders are silently ignored.
    pub async fn handle_ready(
        &mut self,
        sender: ClientId,
        now: Instant,
        gateway: &dyn EventGateway,
    ) {
        if self.phase != MatchPhase::WaitingForReady {
            return;
        }

        for player in &mut self.players {
            if player.connection == sender {
                player.ready = true;
            }
        }

        if self.players.iter().all(|p| p.ready) {
            self.engine.set_start_position();
            self.phase = MatchPhase::InProgress;
            info!("both players ready, starting the game");
            gateway.broadcast(ServerEvent::MatchStart).await;
            self.request_move(Side::Black, now, gateway).await;
        }
    }

    /// Process a move submission from the side expected to move.
    ///
    /// Submissions from the wrong sender or from unregistered senders are
    /// silently discarded rather than errored, so a spoofed sender learns
    /// nothing about whose turn it is. An `Err` return is an engine fault;
    /// the caller decides how to end the session.
    pub async fn handle_move(
        &mut self,
        sender: ClientId,
        notation: &str,
        now: Instant,
        gateway: &dyn EventGateway,
    ) -> Result<(), EngineError> {
        if self.phase != MatchPhase::InProgress {
            return Ok(());
        }

        let side = self.engine.side_to_move();
        if self.players[side.index()].connection != sender {
            debug!("discarding move from a connection that is not {}", side);
            return Ok(());
        }

        if notation == RESIGN {
            // Resignation bypasses billing entirely.
            self.clocks[side.index()].halt();
            info!("{} resigned", side);
            self.finish(MatchOutcome::Resignation, Some(side.opponent()), gateway)
                .await;
            return Ok(());
        }

        let consumed = self.clocks[side.index()].stop_and_consume(now);
        debug!(
            "{} consumed {}s (main {}s, byoyomi {}s remain)",
            side,
            consumed,
            self.clocks[side.index()].remaining_main(),
            self.clocks[side.index()].byoyomi(),
        );

        if self.clocks[side.index()].flagged() {
            info!("{} overdrew byoyomi", side);
            self.finish(MatchOutcome::Timeout, Some(side.opponent()), gateway)
                .await;
            return Ok(());
        }

        if !self.engine.is_legal(notation) {
            info!("{} submitted illegal move '{}'", side, notation);
            self.finish(MatchOutcome::IllegalMove, Some(side.opponent()), gateway)
                .await;
            return Ok(());
        }

        self.engine.apply_move(notation)?;
        self.clocks[side.index()].reset_byoyomi();

        // Repetition checks take precedence over the legal-move count.
        match self.engine.repetition_status() {
            RepetitionStatus::CheckRepetition => {
                info!("{} repeated the position under continuous check", side);
                self.finish(MatchOutcome::PerpetualCheck, Some(side.opponent()), gateway)
                    .await;
                return Ok(());
            }
            RepetitionStatus::Repetition => {
                info!("position repeated, game drawn");
                self.finish(MatchOutcome::Repetition, None, gateway).await;
                return Ok(());
            }
            RepetitionStatus::Clear => {}
        }

        if self.engine.legal_moves().is_empty() {
            info!("{} has no legal reply", side.opponent());
            self.finish(MatchOutcome::Mate, Some(side), gateway).await;
            return Ok(());
        }

        self.request_move(side.opponent(), now, gateway).await;
        Ok(())
    }

    /// Broadcast a read-only snapshot of the position and both clocks.
    ///
    /// Safe to call at arbitrary frequency from any connection; a no-op
    /// until a position exists. Never mutates, so repeated queries with the
    /// same `now` yield the same projection.
    pub async fn handle_view(&self, now: Instant, gateway: &dyn EventGateway) {
        if !matches!(self.phase, MatchPhase::InProgress | MatchPhase::GameOver) {
            return;
        }

        let black = self.clocks[Side::Black.index()].peek(now);
        let white = self.clocks[Side::White.index()].peek(now);

        gateway
            .broadcast(ServerEvent::ViewSnapshot {
                svg: self.engine.svg(),
                kif: self.engine.kif(),
                timelimit: ClockPanel {
                    btime: black.main,
                    wtime: white.main,
                    bbyoyomi: black.byoyomi,
                    wbyoyomi: white.byoyomi,
                },
            })
            .await;
    }

    /// React to a closed connection.
    ///
    /// A seated player leaving before the match fills releases the seat; a
    /// player leaving once the handshake began forfeits. Observers and
    /// unknown connections are ignored.
    pub async fn handle_disconnect(&mut self, sender: ClientId, gateway: &dyn EventGateway) {
        let Some(index) = self.players.iter().position(|p| p.connection == sender) else {
            return;
        };

        match self.phase {
            MatchPhase::GameOver => {}
            MatchPhase::WaitingForPlayers => {
                let player = self.players.remove(index);
                info!("player '{}' left before the match filled", player.name);
            }
            MatchPhase::WaitingForReady | MatchPhase::InProgress => {
                let side = if index == 0 { Side::Black } else { Side::White };
                info!("{} disconnected mid-match", side);
                self.finish(MatchOutcome::Disconnection, Some(side.opponent()), gateway)
                    .await;
            }
        }
    }

    /// Terminate the session without a result, after an engine fault.
    pub async fn abort(&mut self, gateway: &dyn EventGateway) {
        if self.phase != MatchPhase::GameOver {
            self.finish(MatchOutcome::Aborted, None, gateway).await;
        }
    }

    /// Start `side`'s clock and ask them for a move, with the current
    /// remaining times in milliseconds.
    async fn request_move(&mut self, side: Side, now: Instant, gateway: &dyn EventGateway) {
        self.clocks[side.index()].start(now);

        let to = self.players[side.index()].connection;
        debug!("requesting move from {} ({})", side, to);
        gateway
            .send(
                to,
                ServerEvent::MoveRequest {
                    position: self.engine.sfen(),
                    btime: self.clocks[Side::Black.index()].remaining_main() * 1000,
                    wtime: self.clocks[Side::White.index()].remaining_main() * 1000,
                    byoyomi: self.clocks[side.index()].byoyomi().max(0) as u64 * 1000,
                },
            )
            .await;
    }

    /// Enter `GameOver`: halt both clocks and broadcast the result.
    async fn finish(
        &mut self,
        outcome: MatchOutcome,
        winner: Option<Side>,
        gateway: &dyn EventGateway,
    ) {
        self.phase = MatchPhase::GameOver;
        for clock in &mut self.clocks {
            clock.halt();
        }

        let winner_name = winner.map(|s| s.to_string()).unwrap_or_else(|| "none".to_string());
        info!("game over: {} (winner: {})", outcome, winner_name);

        gateway
            .broadcast(ServerEvent::Termination { outcome, winner })
            .await;
    }
}
