//! WebSocket layer: upgrade, session lifecycle, inbound messages.
//!
//! Renderers and observers connect at `/` (alias `/ws`) with an optional
//! `?token=` query parameter. Outbound traffic is produced elsewhere and
//! queued on each connection; this layer only moves frames and classifies
//! clients.

pub mod handler;
pub mod messages;
pub mod session;
