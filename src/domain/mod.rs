//! Domain layer: connections, their registry, the command vocabulary and
//! the state mirror.
//!
//! This module contains the server-side model: connection identity and
//! roles, the single-primary registry, the typed command envelopes sent to
//! clients, and the in-memory snapshot of every controllable parameter.

pub mod character;
pub mod command;
pub mod connection;
pub mod connection_id;
pub mod connection_registry;
pub mod control_state;

pub use character::{
    Character, EyeState, clamp_head_angle, clamp_mouth_shape, clamp_pupil_x, clamp_pupil_y,
    clamp_roast_level,
};
pub use command::Command;
pub use connection::{ClientConnection, Outbound};
pub use connection_id::ConnectionId;
pub use connection_registry::{ConnectionRegistry, ConnectionRole, PrimaryPromotion};
pub use control_state::{CharacterState, ControlState, Pupil, StateMirror};
