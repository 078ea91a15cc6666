//! A live match between two connected players. The room owns the only
//! authoritative board; clients mirror it from the broadcast stream.

use std::sync::Arc;

use tokio::sync::{mpsc, Mutex};

use game_core::{Board, Color, Move, Outcome};
use proto::S2C;

use crate::accounts::AccountStore;

/// One seated player: the account name and the channel feeding that
/// connection's socket writer.
#[derive(Debug, Clone)]
pub struct PlayerHandle {
    pub user: String,
    pub sender: mpsc::UnboundedSender<S2C>,
}

pub struct Room {
    accounts: Arc<dyn AccountStore>,
    board: Board,
    /// Indexed by [`Color::index`]: white first, black second.
    players: [PlayerHandle; 2],
    over: bool,
}

impl Room {
    /// Seat two players at a fresh standard board. The first player takes
    /// white and the opening move.
    pub fn create(
        accounts: Arc<dyn AccountStore>,
        white: PlayerHandle,
        black: PlayerHandle,
    ) -> Arc<Mutex<Room>> {
        Self::create_with_board(accounts, Board::standard(), white, black)
    }

    pub fn create_with_board(
        accounts: Arc<dyn AccountStore>,
        board: Board,
        white: PlayerHandle,
        black: PlayerHandle,
    ) -> Arc<Mutex<Room>> {
        let room = Room {
            accounts,
            board,
            players: [white, black],
            over: false,
        };
        for color in [Color::White, Color::Black] {
            let player = &room.players[color.index()];
            let _ = player.sender.send(S2C::RoomCreate {
                user_a: room.players[0].user.clone(),
                user_b: room.players[1].user.clone(),
                board: room.board.clone(),
                your_color: color,
                flip_view: color == Color::Black,
            });
        }
        tracing::info!(
            white = %room.players[0].user,
            black = %room.players[1].user,
            "room created"
        );
        Arc::new(Mutex::new(room))
    }

    pub fn is_over(&self) -> bool {
        self.over
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    fn color_of(&self, user: &str) -> Option<Color> {
        if self.players[0].user == user {
            Some(Color::White)
        } else if self.players[1].user == user {
            Some(Color::Black)
        } else {
            None
        }
    }

    fn broadcast(&self, msg: S2C) {
        for player in &self.players {
            let _ = player.sender.send(msg.clone());
        }
    }

    /// Judge and apply one submitted move. An out-of-turn or illegal move
    /// forfeits the match on the spot: both players see the failure, then
    /// the game-over broadcast.
    pub fn handle_move_attempt(&mut self, user: &str, mv: Move) {
        if self.over {
            return;
        }
        let color = match self.color_of(user) {
            Some(c) => c,
            None => {
                tracing::warn!(%user, "move from a user not seated in this room");
                return;
            }
        };
        if color != self.board.turn() {
            self.fail_and_forfeit(user, color, mv, "wrong turn");
            return;
        }
        if !self.board.is_legal_move(color, &mv) {
            self.fail_and_forfeit(user, color, mv, "illegal move");
            return;
        }
        self.broadcast(S2C::MoveSuccess {
            user: user.to_string(),
            mv,
        });
        // A legality-checked move always applies.
        if self.board.apply_move(&mv).is_none() {
            tracing::error!(%user, ?mv, "legal move failed to apply");
            return;
        }
        let report = self.board.fire_active_beam();
        match report.outcome {
            Outcome::NoWinner => {}
            Outcome::WhiteWins => self.end_game(Color::White),
            Outcome::BlackWins => self.end_game(Color::Black),
        }
    }

    fn fail_and_forfeit(&mut self, user: &str, color: Color, mv: Move, error: &str) {
        tracing::info!(%user, %error, "move rejected, match forfeited");
        self.broadcast(S2C::MoveFailure {
            user: user.to_string(),
            mv,
            error: error.to_string(),
        });
        self.end_game(color.opponent());
    }

    /// A dropped connection forfeits any match still running.
    pub fn handle_disconnect(&mut self, user: &str) {
        if self.over {
            return;
        }
        if let Some(color) = self.color_of(user) {
            tracing::info!(%user, "player disconnected, match forfeited");
            self.end_game(color.opponent());
        }
    }

    fn end_game(&mut self, winner: Color) {
        self.over = true;
        let winner_user = self.players[winner.index()].user.clone();
        let loser_user = self.players[winner.opponent().index()].user.clone();
        self.accounts.record_result(&winner_user, &loser_user);
        let stats = self
            .players
            .iter()
            .map(|p| {
                (
                    p.user.clone(),
                    self.accounts.stats(&p.user).unwrap_or_default(),
                )
            })
            .collect();
        self.broadcast(S2C::GameOver {
            winner: winner_user,
            loser: loser_user,
            stats,
        });
    }
}
