//! # Match Core - Two-Player Match Coordination
//!
//! The reviewed core of the match server: a protocol state machine that admits
//! exactly two players, runs a readiness handshake, alternates move requests,
//! keeps independent chess clocks with byoyomi per side, and decides when and
//! why a game ends.
//!
//! ## Design Philosophy
//!
//! The core contains **no board logic** - all rule semantics (legal move
//! generation, move notation, repetition detection, rendering) live behind the
//! [`RulesEngine`] capability trait and are supplied by the embedder:
//!
//! * **Session** - the aggregate state machine owning players, clocks, and
//!   the engine handle
//! * **Clock** - pure timer arithmetic, no I/O
//! * **EventGateway** - the messaging boundary the session emits through
//! * **MatchCoordinator** - owns the single live session and serializes all
//!   inbound events
//!
//! ## Message Flow
//!
//! 1. The transport hands `(sender, text)` to [`MatchCoordinator::dispatch`]
//! 2. The payload is parsed and validated once into a typed [`ClientEvent`]
//! 3. The session mutates clock/position state and emits [`ServerEvent`]s
//!    through the gateway
//! 4. Observers query `view-query`, which reads without mutating
//!
//! ## Thread Safety
//!
//! The session is not reentrant by design: the coordinator holds it behind an
//! async mutex so one inbound event is handled to completion before the next.
//! Wall-clock reads happen once per dispatch and are passed down as `Instant`,
//! which keeps the arithmetic monotonic and lets tests fabricate time.

pub use clock::{Clock, ClockReading, TimeControl};
pub use coordinator::MatchCoordinator;
pub use engine::{RepetitionStatus, RulesEngine};
pub use error::{EngineError, ProtocolError};
pub use events::{ClientEvent, ClockPanel, ServerEvent};
pub use gateway::EventGateway;
pub use session::{MatchPhase, Player, Session};
pub use types::{ClientId, MatchOutcome, Side};

pub mod clock;
pub mod coordinator;
pub mod engine;
pub mod error;
pub mod events;
pub mod gateway;
pub mod session;
pub mod testing;
pub mod types;
