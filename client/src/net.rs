//! The socket side of the client: a reader task folding server messages
//! into the shared session, and a writer task draining outbound intents.

use std::sync::Arc;

use thiserror::Error;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, Mutex};

use proto::{Envelope, C2S, S2C, MAX_FRAME_LEN};

use crate::now_ms;
use crate::session::GameSession;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("socket error: {0}")]
    Io(#[from] std::io::Error),
    #[error("frame decode failed: {0}")]
    Decode(#[from] postcard::Error),
    #[error("frame of {0} bytes exceeds the limit")]
    OversizedFrame(u32),
    #[error("connection closed")]
    Closed,
}

/// A live connection to the server. Messages produced by the session's
/// intent methods go out through [`Connection::send`]; inbound messages are
/// applied to the shared session by the background reader.
pub struct Connection {
    outbound: mpsc::UnboundedSender<C2S>,
}

impl Connection {
    pub async fn connect(
        addr: &str,
        session: Arc<Mutex<GameSession>>,
    ) -> Result<Self, ClientError> {
        let stream = TcpStream::connect(addr).await?;
        let (reader, writer) = stream.into_split();
        let (outbound, outbound_rx) = mpsc::unbounded_channel();
        tokio::spawn(write_loop(writer, outbound_rx));
        tokio::spawn(async move {
            if let Err(err) = read_loop(reader, session).await {
                tracing::debug!(%err, "server connection ended");
            }
        });
        Ok(Self { outbound })
    }

    pub fn send(&self, msg: C2S) -> Result<(), ClientError> {
        self.outbound.send(msg).map_err(|_| ClientError::Closed)
    }
}

async fn read_loop(
    mut reader: OwnedReadHalf,
    session: Arc<Mutex<GameSession>>,
) -> Result<(), ClientError> {
    loop {
        let len = reader.read_u32().await?;
        if len > MAX_FRAME_LEN {
            return Err(ClientError::OversizedFrame(len));
        }
        let mut buf = vec![0u8; len as usize];
        reader.read_exact(&mut buf).await?;
        let envelope = Envelope::<S2C>::from_bytes(&buf)?;
        let event = session.lock().await.apply(envelope.msg, now_ms());
        if let Some(event) = event {
            tracing::debug!(?event, "session event");
        }
    }
}

async fn write_loop(mut writer: OwnedWriteHalf, mut rx: mpsc::UnboundedReceiver<C2S>) {
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
