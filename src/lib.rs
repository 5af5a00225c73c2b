//! # wfl-relay
//!
//! HTTP and WebSocket control relay for a Rive animation renderer.
//!
//! One renderer connects over WebSocket and receives every command; any
//! number of observer pages connect alongside it and receive a mirror of
//! the same traffic. HTTP callers drive the characters with single commands
//! or with timed sequences (idle motion, lip sync, reactions, the roast).
//!
//! ## Architecture
//!
//! ```text
//! Clients (HTTP, WebSocket)
//!     │
//!     ├── REST Handlers + token check (api/)
//!     ├── WS Handler (ws/)
//!     │
//!     ├── Sequencer, Dispatcher, HeartbeatMonitor (service/)
//!     ├── Choreographies (sequence/)
//!     │
//!     └── ConnectionRegistry, StateMirror, Command (domain/)
//! ```

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod sequence;
pub mod server;
pub mod service;
pub mod ws;
