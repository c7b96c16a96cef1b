//! # bwbridge-net
//!
//! Networking half of the bwbridge proxy:
//! - Pure wire codec for the engine's line-oriented text protocol
//! - The per-connection session loop (handshake, pre-game sync, frame loop)
//! - The TCP accept loop serving one session at a time

pub mod server;
pub mod session;
pub mod wire;

pub use server::{Server, ServerConfig};
pub use session::{SessionConfig, run_session};
pub use wire::Capabilities;
