//! Real-time transport: wire messages, per-connection delivery and the HTTP
//! server that carries them.

mod hub;
mod protocol;
mod server;

pub use hub::{GameHub, Outbox};
pub use protocol::{ClientMessage, ServerMessage};
pub use server::{router, serve};
