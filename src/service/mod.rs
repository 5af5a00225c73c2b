//! Service layer: command delivery, liveness, and sequence orchestration.
//!
//! [`Dispatcher`] mirrors and routes every outbound command,
//! [`HeartbeatMonitor`] evicts unresponsive connections, and [`Sequencer`]
//! runs named choreographies through the dispatcher.

pub mod dispatcher;
pub mod heartbeat;
pub mod sequencer;

pub use dispatcher::Dispatcher;
pub use heartbeat::{HeartbeatMonitor, SweepReport};
pub use sequencer::{SequenceOutcome, SequenceTicket, Sequencer};
