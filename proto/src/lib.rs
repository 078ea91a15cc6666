//! Wire protocol shared by the server and the client.
//!
//! Every message is postcard-encoded inside an [`Envelope`] and framed on
//! the socket with a big-endian `u32` length prefix.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{de::DeserializeOwned, Deserialize, Serialize};

use game_core::{Board, Color, Move};

/// Frames larger than this are rejected before decoding.
pub const MAX_FRAME_LEN: u32 = 64 * 1024;

// ---------------------------------------------------------------------------
// Account data
// ---------------------------------------------------------------------------

/// Lifetime match record for one account.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerStats {
    pub played: u32,
    pub won: u32,
    pub lost: u32,
}

// ---------------------------------------------------------------------------
// Client -> server
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum C2S {
    LoginAttempt { user: String, pass: String },
    RegisterAttempt { user: String, pass: String },
    StatsRequest { user: String },
    MatchmakingRequest { user: String },
    PlayerMove { user: String, mv: Move },
}

// ---------------------------------------------------------------------------
// Server -> client
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum S2C {
    LoginSuccess {
        user: String,
    },
    LoginFailure {
        user: String,
        error: String,
    },
    RegisterSuccess {
        user: String,
    },
    RegisterFailure {
        user: String,
        error: String,
    },
    StatsResponse {
        user: String,
        stats: PlayerStats,
    },
    /// A match was formed. Carries the full starting board so the client
    /// never reconstructs the layout on its own.
    RoomCreate {
        user_a: String,
        user_b: String,
        board: Board,
        your_color: Color,
        flip_view: bool,
    },
    /// Broadcast to both players; the mover treats its own echo as a no-op.
    MoveSuccess {
        user: String,
        mv: Move,
    },
    MoveFailure {
        user: String,
        mv: Move,
        error: String,
    },
    GameOver {
        winner: String,
        loser: String,
        stats: Vec<(String, PlayerStats)>,
    },
}

// ---------------------------------------------------------------------------
// Envelope and framing
// ---------------------------------------------------------------------------

/// Transport wrapper stamping every message with the sender's clock, in
/// milliseconds since the Unix epoch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<M> {
    pub sent_at_ms: u64,
    pub msg: M,
}

impl<M: Serialize + DeserializeOwned> Envelope<M> {
    /// Wrap a message with the current wall clock.
    pub fn stamped(msg: M) -> Self {
        let sent_at_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        Self { sent_at_ms, msg }
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, postcard::Error> {
        postcard::to_allocvec(self)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, postcard::Error> {
        postcard::from_bytes(bytes)
    }

    /// Encode with the length prefix the socket loops expect.
    pub fn frame(&self) -> Result<Vec<u8>, postcard::Error> {
        let body = self.to_bytes()?;
        let mut out = Vec::with_capacity(4 + body.len());
        out.extend_from_slice(&(body.len() as u32).to_be_bytes());
        out.extend_from_slice(&body);
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use game_core::Pos;

    fn round_trip<M>(msg: M) -> M
    where
        M: Serialize + DeserializeOwned + Clone,
    {
        let env = Envelope {
            sent_at_ms: 1_234,
            msg,
        };
        let bytes = env.to_bytes().unwrap();
        let back = Envelope::<M>::from_bytes(&bytes).unwrap();
        assert_eq!(back.sent_at_ms, 1_234);
        back.msg
    }

    #[test]
    fn login_round_trips() {
        let msg = C2S::LoginAttempt {
            user: "alice".into(),
            pass: "hunter2".into(),
        };
        assert_eq!(round_trip(msg.clone()), msg);
    }

    #[test]
    fn player_move_round_trips() {
        let msg = C2S::PlayerMove {
            user: "alice".into(),
            mv: Move::relocate(Pos::new(2, 0), Pos::new(1, 1)),
        };
        assert_eq!(round_trip(msg.clone()), msg);
    }

    #[test]
    fn room_create_carries_the_full_board() {
        let board = Board::standard();
        let msg = S2C::RoomCreate {
            user_a: "alice".into(),
            user_b: "bob".into(),
            board: board.clone(),
            your_color: Color::Black,
            flip_view: true,
        };
        match round_trip(msg) {
            S2C::RoomCreate {
                board: decoded, ..
            } => assert_eq!(decoded, board),
            other => panic!("wrong variant: {other:?}"),
        }
    }

    #[test]
    fn game_over_round_trips() {
        let msg = S2C::GameOver {
            winner: "alice".into(),
            loser: "bob".into(),
            stats: vec![
                (
                    "alice".into(),
                    PlayerStats {
                        played: 3,
                        won: 2,
                        lost: 1,
                    },
                ),
                (
                    "bob".into(),
                    PlayerStats {
                        played: 3,
                        won: 1,
                        lost: 2,
                    },
                ),
            ],
        };
        assert_eq!(round_trip(msg.clone()), msg);
    }

    #[test]
    fn frame_carries_a_length_prefix() {
        let env = Envelope::stamped(C2S::StatsRequest {
            user: "alice".into(),
        });
        let framed = env.frame().unwrap();
        let len = u32::from_be_bytes([framed[0], framed[1], framed[2], framed[3]]);
        assert_eq!(len as usize, framed.len() - 4);
        assert!(len <= MAX_FRAME_LEN);
        let back = Envelope::<C2S>::from_bytes(&framed[4..]).unwrap();
        assert_eq!(back.msg, env.msg);
    }
}
