//! The TCP accept loop and the per-connection protocol task.
//!
//! Each connection gets a reader task (this module's state loop) and a
//! writer task fed by an unbounded channel, so a room can push broadcasts
//! to a player without touching that player's socket directly.

use std::sync::Arc;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, oneshot, Mutex};

use proto::{Envelope, C2S, S2C, MAX_FRAME_LEN};

use crate::accounts::AccountStore;
use crate::config::ServerConfig;
use crate::matchmaker::{Matchmaker, WaitingPlayer};
use crate::room::Room;
use crate::ServerError;

/// State shared by every connection task.
pub struct Shared {
    pub config: ServerConfig,
    pub accounts: Arc<dyn AccountStore>,
    pub matchmaker: Matchmaker,
}

impl Shared {
    pub fn new(config: ServerConfig, accounts: Arc<dyn AccountStore>) -> Arc<Self> {
        Arc::new(Self {
            config,
            accounts,
            matchmaker: Matchmaker::new(),
        })
    }
}

pub async fn serve(shared: Arc<Shared>) -> Result<(), ServerError> {
    let listener = TcpListener::bind(&shared.config.bind_addr).await?;
    tracing::info!(addr = %shared.config.bind_addr, "listening");
    loop {
        let (stream, peer) = listener.accept().await?;
        tracing::debug!(%peer, "connection accepted");
        let shared = shared.clone();
        tokio::spawn(async move {
            if let Err(err) = handle_connection(shared, stream).await {
                tracing::debug!(%peer, %err, "connection ended");
            }
        });
    }
}

/// Read one length-prefixed frame and decode its envelope.
async fn read_frame(reader: &mut OwnedReadHalf) -> Result<Envelope<C2S>, ServerError> {
    let len = reader.read_u32().await?;
    if len > MAX_FRAME_LEN {
        return Err(ServerError::OversizedFrame(len));
    }
    let mut buf = vec![0u8; len as usize];
    reader.read_exact(&mut buf).await?;
    Ok(Envelope::from_bytes(&buf)?)
}

/// Drain the outbound channel onto the socket, one stamped frame at a time.
async fn write_loop(mut writer: OwnedWriteHalf, mut rx: mpsc::UnboundedReceiver<S2C>) {
    while let Some(msg) = rx.recv().await {
        let frame = match Envelope::stamped(msg).frame() {
            Ok(f) => f,
            Err(err) => {
                tracing::error!(%err, "failed to encode outbound frame");
                continue;
            }
        };
        if writer.write_all(&frame).await.is_err() {
            break;
        }
    }
}

pub(crate) async fn handle_connection(
    shared: Arc<Shared>,
    stream: TcpStream,
) -> Result<(), ServerError> {
    let (mut reader, writer) = stream.into_split();
    let (tx, rx) = mpsc::unbounded_channel::<S2C>();
    tokio::spawn(write_loop(writer, rx));

    let mut user: Option<String> = None;
    let mut pending: Option<oneshot::Receiver<Arc<Mutex<Room>>>> = None;
    let mut room: Option<Arc<Mutex<Room>>> = None;

    loop {
        let envelope = match read_frame(&mut reader).await {
            Ok(env) => env,
            Err(err) => {
                // Disconnect forfeits any match still running, including one
                // this player was seated in but never sent a frame to: the
                // matchmaking result may still be parked in the oneshot.
                if room.is_none() {
                    if let Some(mut rx) = pending.take() {
                        if let Ok(found) = rx.try_recv() {
                            room = Some(found);
                        }
                    }
                }
                if let (Some(room), Some(user)) = (&room, &user) {
                    room.lock().await.handle_disconnect(user);
                }
                return match err {
                    ServerError::Io(ref io) if io.kind() == std::io::ErrorKind::UnexpectedEof => {
                        Ok(())
                    }
                    other => Err(other),
                };
            }
        };

        // Promote a matchmaking result before handling anything else, and
        // fall back to the lobby once a match has ended.
        if let Some(rx) = pending.as_mut() {
            if let Ok(found) = rx.try_recv() {
                room = Some(found);
                pending = None;
            }
        }
        if let Some(current) = &room {
            if current.lock().await.is_over() {
                room = None;
            }
        }

        match envelope.msg {
            C2S::LoginAttempt { user: name, pass } => {
                match shared.accounts.authenticate(&name, &pass) {
                    Ok(()) => {
                        tracing::info!(user = %name, "login");
                        user = Some(name.clone());
                        let _ = tx.send(S2C::LoginSuccess { user: name });
                    }
                    Err(err) => {
                        let _ = tx.send(S2C::LoginFailure {
                            user: name,
                            error: err.to_string(),
                        });
                    }
                }
            }
            C2S::RegisterAttempt { user: name, pass } => {
                match shared.accounts.create(&name, &pass) {
                    Ok(()) => {
                        tracing::info!(user = %name, "account registered");
                        let _ = tx.send(S2C::RegisterSuccess { user: name });
                    }
                    Err(err) => {
                        let _ = tx.send(S2C::RegisterFailure {
                            user: name,
                            error: err.to_string(),
                        });
                    }
                }
            }
            C2S::StatsRequest { user: name } => {
                if user.is_none() {
                    tracing::warn!(user = %name, "stats request without login");
                    continue;
                }
                match shared.accounts.stats(&name) {
                    Ok(stats) => {
                        let _ = tx.send(S2C::StatsResponse { user: name, stats });
                    }
                    Err(err) => {
                        tracing::warn!(user = %name, %err, "stats request failed");
                    }
                }
            }
            C2S::MatchmakingRequest { user: name } => {
                let authenticated = match &user {
                    Some(u) if *u == name => u.clone(),
                    _ => {
                        tracing::warn!(user = %name, "matchmaking request without login");
                        continue;
                    }
                };
                if room.is_some() || pending.is_some() {
                    tracing::warn!(user = %name, "matchmaking request while already matched");
                    continue;
                }
                let (notify, found) = oneshot::channel();
                pending = Some(found);
                shared
                    .matchmaker
                    .enqueue(
                        shared.accounts.clone(),
                        WaitingPlayer {
                            user: authenticated,
                            sender: tx.clone(),
                            notify,
                        },
                    )
                    .await;
            }
            C2S::PlayerMove { user: name, mv } => {
                let authenticated = match &user {
                    Some(u) if *u == name => u.clone(),
                    _ => {
                        tracing::warn!(user = %name, "move from a mismatched identity");
                        continue;
                    }
                };
                match &room {
                    Some(current) => {
                        let mut guard = current.lock().await;
                        guard.handle_move_attempt(&authenticated, mv);
                        if guard.is_over() {
                            drop(guard);
                            room = None;
                        }
                    }
                    None => {
                        tracing::warn!(user = %name, "move while not in a room");
                    }
                }
            }
        }
    }
}
