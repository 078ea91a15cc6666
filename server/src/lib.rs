//! The authoritative game server: accounts, matchmaking, rooms, and the
//! per-connection protocol loop.

pub mod accounts;
pub mod config;
pub mod connection;
pub mod matchmaker;
pub mod room;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("socket error: {0}")]
    Io(#[from] std::io::Error),
    #[error("frame decode failed: {0}")]
    Decode(#[from] postcard::Error),
    #[error("frame of {0} bytes exceeds the limit")]
    OversizedFrame(u32),
}
