//! First-come first-served matchmaking. Players queue in arrival order and
//! are paired off two at a time; an odd player waits for the next arrival.

use std::collections::VecDeque;
use std::sync::Arc;

use tokio::sync::{mpsc, oneshot, Mutex};

use proto::S2C;

use crate::accounts::AccountStore;
use crate::room::{PlayerHandle, Room};

pub struct WaitingPlayer {
    pub user: String,
    pub sender: mpsc::UnboundedSender<S2C>,
    /// Resolved with the room once a partner arrives.
    pub notify: oneshot::Sender<Arc<Mutex<Room>>>,
}

#[derive(Default)]
pub struct Matchmaker {
    queue: Mutex<VecDeque<WaitingPlayer>>,
}

impl Matchmaker {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn queue_len(&self) -> usize {
        self.queue.lock().await.len()
    }

    /// Add a player and pair off the queue head-first. The earlier arrival
    /// takes white.
    pub async fn enqueue(&self, accounts: Arc<dyn AccountStore>, player: WaitingPlayer) {
        let mut queue = self.queue.lock().await;
        queue.push_back(player);
        queue.retain(|p| !p.notify.is_closed());
        while queue.len() >= 2 {
            // Both pops are guarded by the length check.
            let (a, b) = match (queue.pop_front(), queue.pop_front()) {
                (Some(a), Some(b)) => (a, b),
                _ => return,
            };
            let room = Room::create(
                accounts.clone(),
                PlayerHandle {
                    user: a.user.clone(),
                    sender: a.sender,
                },
                PlayerHandle {
                    user: b.user.clone(),
                    sender: b.sender,
                },
            );
            // The room broadcast already went out; a closed receiver here
            // means that player vanished between queueing and pairing.
            if let Err(room) = a.notify.send(room.clone()) {
                room.lock().await.handle_disconnect(&a.user);
            }
            if let Err(room) = b.notify.send(room) {
                room.lock().await.handle_disconnect(&b.user);
            }
        }
    }
}
