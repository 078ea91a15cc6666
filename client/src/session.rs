//! The client's authoritative-state mirror. Every inbound server message is
//! folded into the session; outbound intents are produced as protocol
//! messages for the connection to send.

use game_core::{BeamReport, Board, Color, Move, Pos};
use proto::{PlayerStats, C2S, S2C};

use crate::pending::MoveStage;
use crate::view::{RenderState, TimedSegment};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Unauthenticated,
    Lobby,
    InGame,
    Over,
}

/// What an inbound message meant for the player, for the UI layer to react
/// to. `None` from [`GameSession::apply`] means nothing user-visible
/// happened.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    LoggedIn,
    LoginRejected(String),
    Registered,
    RegisterRejected(String),
    Stats(PlayerStats),
    MatchStarted { color: Color },
    OpponentMoved(Move),
    MoveRejected { user: String, error: String },
    GameEnded { won: bool, winner: String, loser: String },
}

pub struct GameSession {
    user: String,
    state: SessionState,
    board: Option<Board>,
    my_color: Option<Color>,
    flip_view: bool,
    stage: MoveStage,
    stats: Option<PlayerStats>,
    beams: Vec<TimedSegment>,
}

impl GameSession {
    pub fn new(user: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            state: SessionState::Unauthenticated,
            board: None,
            my_color: None,
            flip_view: false,
            stage: MoveStage::Idle,
            stats: None,
            beams: Vec::new(),
        }
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn board(&self) -> Option<&Board> {
        self.board.as_ref()
    }

    pub fn my_color(&self) -> Option<Color> {
        self.my_color
    }

    pub fn stats(&self) -> Option<PlayerStats> {
        self.stats
    }

    pub fn is_my_turn(&self) -> bool {
        self.state == SessionState::InGame
            && match (&self.board, self.my_color) {
                (Some(board), Some(color)) => board.turn() == color,
                _ => false,
            }
    }

    // -- outbound intents ---------------------------------------------------

    pub fn login(&self, pass: &str) -> C2S {
        C2S::LoginAttempt {
            user: self.user.clone(),
            pass: pass.to_string(),
        }
    }

    pub fn register(&self, pass: &str) -> C2S {
        C2S::RegisterAttempt {
            user: self.user.clone(),
            pass: pass.to_string(),
        }
    }

    pub fn request_stats(&self) -> C2S {
        C2S::StatsRequest {
            user: self.user.clone(),
        }
    }

    pub fn request_match(&self) -> C2S {
        C2S::MatchmakingRequest {
            user: self.user.clone(),
        }
    }

    // -- local move staging -------------------------------------------------

    pub fn pick_up(&mut self, origin: Pos) -> bool {
        if !self.is_my_turn() {
            return false;
        }
        match (&self.board, self.my_color) {
            (Some(board), Some(color)) => self.stage.pick_up(board, origin, color),
            _ => false,
        }
    }

    pub fn stage_move(&mut self, mv: Move) -> bool {
        if self.state != SessionState::InGame {
            return false;
        }
        match self.board.as_mut() {
            Some(board) => self.stage.stage(board, mv),
            None => false,
        }
    }

    pub fn revert(&mut self) -> bool {
        match self.board.as_mut() {
            Some(board) => self.stage.revert(board),
            None => false,
        }
    }

    /// Commit the pending move: fire the beam on the mirror board and hand
    /// back the protocol message to send.
    pub fn confirm_fire(&mut self, now_ms: u64) -> Option<C2S> {
        if self.state != SessionState::InGame {
            return None;
        }
        let mv = self.stage.confirm()?;
        let report = self.board.as_mut()?.fire_active_beam();
        self.remember_beams(&report, now_ms);
        Some(C2S::PlayerMove {
            user: self.user.clone(),
            mv,
        })
    }

    // -- inbound messages ---------------------------------------------------

    /// Fold one server message into the session.
    pub fn apply(&mut self, msg: S2C, now_ms: u64) -> Option<SessionEvent> {
        match msg {
            S2C::LoginSuccess { user } => {
                if user != self.user {
                    return None;
                }
                self.state = SessionState::Lobby;
                Some(SessionEvent::LoggedIn)
            }
            S2C::LoginFailure { user, error } => {
                if user != self.user {
                    return None;
                }
                Some(SessionEvent::LoginRejected(error))
            }
            S2C::RegisterSuccess { user } => {
                (user == self.user).then_some(SessionEvent::Registered)
            }
            S2C::RegisterFailure { user, error } => {
                (user == self.user).then_some(SessionEvent::RegisterRejected(error))
            }
            S2C::StatsResponse { user, stats } => {
                if user == self.user {
                    self.stats = Some(stats);
                }
                Some(SessionEvent::Stats(stats))
            }
            S2C::RoomCreate {
                board,
                your_color,
                flip_view,
                ..
            } => {
                self.board = Some(board);
                self.my_color = Some(your_color);
                self.flip_view = flip_view;
                self.stage = MoveStage::Idle;
                self.beams.clear();
                self.state = SessionState::InGame;
                Some(SessionEvent::MatchStarted { color: your_color })
            }
            S2C::MoveSuccess { user, mv } => {
                // Our own echo: the mirror already holds this move.
                if user == self.user {
                    return None;
                }
                let board = self.board.as_mut()?;
                if board.apply_move(&mv).is_none() {
                    tracing::warn!(?mv, "broadcast move does not fit the mirror board");
                    return None;
                }
                let report = board.fire_active_beam();
                self.remember_beams(&report, now_ms);
                Some(SessionEvent::OpponentMoved(mv))
            }
            S2C::MoveFailure { user, error, .. } => {
                Some(SessionEvent::MoveRejected { user, error })
            }
            S2C::GameOver {
                winner,
                loser,
                stats,
            } => {
                self.state = SessionState::Over;
                self.stage = MoveStage::Idle;
                if let Some((_, s)) = stats.iter().find(|(u, _)| *u == self.user) {
                    self.stats = Some(*s);
                }
                Some(SessionEvent::GameEnded {
                    won: winner == self.user,
                    winner,
                    loser,
                })
            }
        }
    }

    fn remember_beams(&mut self, report: &BeamReport, now_ms: u64) {
        self.beams.extend(report.segments.iter().map(|&segment| TimedSegment {
            segment,
            shown_at_ms: now_ms,
        }));
    }

    // -- rendering ----------------------------------------------------------

    /// Snapshot the session for one rendered frame, or `None` outside a
    /// match.
    pub fn render_state(&self, now_ms: u64) -> Option<RenderState> {
        let board = self.board.as_ref()?;
        let highlights = match self.stage.picked_origin() {
            Some(origin) => board.legal_destinations(origin),
            None => Vec::new(),
        };
        Some(RenderState {
            width: board.width(),
            height: board.height(),
            tiles: board.tiles().to_vec(),
            pieces: board.pieces().iter().flatten().copied().collect(),
            highlights,
            beams: self
                .beams
                .iter()
                .filter(|t| t.visible_at(now_ms))
                .map(|t| t.segment)
                .collect(),
            flip_view: self.flip_view,
        })
    }
}
