//! Per-connection notification stream.
//!
//! The server pings every 5s and closes the connection after 10s without
//! client traffic. Tests shorten both intervals.

use std::time::{Duration, Instant};

use actix_ws::{CloseCode, CloseReason, Closed, Message, MessageStream, ProtocolError, Session};
use tokio::time;
use tracing::{debug, warn};

use crate::domain::UserId;
use crate::domain::ports::{FeedEvent, NotificationSubscription};
use crate::inbound::ws::messages::FeedFrame;

#[cfg(not(test))]
const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(5);
#[cfg(test)]
const HEARTBEAT_INTERVAL: Duration = Duration::from_millis(50);

#[cfg(not(test))]
const CLIENT_TIMEOUT: Duration = Duration::from_secs(10);
#[cfg(test)]
const CLIENT_TIMEOUT: Duration = Duration::from_millis(100);

pub(super) async fn handle_ws_session(
    subscription: NotificationSubscription,
    user_id: UserId,
    session: Session,
    stream: MessageStream,
) {
    FeedSession {
        subscription,
        user_id,
    }
    .run(session, stream)
    .await;
}

enum SessionError {
    ClientClosed(Option<CloseReason>),
    StreamClosed,
    FeedClosed,
    HeartbeatTimeout,
    Protocol(ProtocolError),
    Network(Closed),
}

struct FeedSession {
    subscription: NotificationSubscription,
    user_id: UserId,
}

impl FeedSession {
    async fn run(mut self, mut session: Session, mut stream: MessageStream) {
        let mut last_heartbeat = Instant::now();
        let mut heartbeat = time::interval(HEARTBEAT_INTERVAL);

        loop {
            let result = tokio::select! {
                _ = heartbeat.tick() => heartbeat_tick(&mut session, last_heartbeat).await,
                message = stream.recv() => {
                    handle_client_message(&mut session, &mut last_heartbeat, message).await
                }
                event = self.subscription.next() => forward(&mut session, event).await,
            };

            if let Err(error) = result {
                self.shut_down(session, error).await;
                return;
            }
        }
    }

    async fn shut_down(&self, session: Session, error: SessionError) {
        let reason = match error {
            SessionError::HeartbeatTimeout => {
                warn!(user_id = %self.user_id, "notification stream heartbeat timeout");
                Some(close_reason(CloseCode::Normal, "heartbeat timeout"))
            }
            SessionError::FeedClosed => Some(close_reason(CloseCode::Away, "feed closed")),
            SessionError::Protocol(error) => {
                warn!(user_id = %self.user_id, %error, "notification stream protocol error");
                Some(close_reason(CloseCode::Protocol, "protocol error"))
            }
            SessionError::ClientClosed(reason) => reason,
            SessionError::Network(error) => {
                debug!(user_id = %self.user_id, %error, "notification stream dropped");
                return;
            }
            SessionError::StreamClosed => return,
        };
        if let Err(error) = session.close(reason).await {
            debug!(%error, "failed to close notification stream");
        }
    }
}

fn close_reason(code: CloseCode, description: &str) -> CloseReason {
    CloseReason {
        code,
        description: Some(description.to_owned()),
    }
}

async fn heartbeat_tick(session: &mut Session, last_heartbeat: Instant) -> Result<(), SessionError> {
    if last_heartbeat.elapsed() > CLIENT_TIMEOUT {
        return Err(SessionError::HeartbeatTimeout);
    }
    session.ping(b"").await.map_err(SessionError::Network)
}

async fn handle_client_message(
    session: &mut Session,
    last_heartbeat: &mut Instant,
    message: Option<Result<Message, ProtocolError>>,
) -> Result<(), SessionError> {
    let message = message
        .ok_or(SessionError::StreamClosed)?
        .map_err(SessionError::Protocol)?;
    match message {
        Message::Close(reason) => Err(SessionError::ClientClosed(reason)),
        Message::Ping(payload) => {
            *last_heartbeat = Instant::now();
            session.pong(&payload).await.map_err(SessionError::Network)
        }
        // The stream is server-push only; any client frame counts as liveness.
        Message::Pong(_)
        | Message::Text(_)
        | Message::Binary(_)
        | Message::Continuation(_)
        | Message::Nop => {
            *last_heartbeat = Instant::now();
            Ok(())
        }
    }
}

async fn forward(session: &mut Session, event: Option<FeedEvent>) -> Result<(), SessionError> {
    let event = event.ok_or(SessionError::FeedClosed)?;
    let frame = FeedFrame::from(event);
    match serde_json::to_string(&frame) {
        Ok(body) => session.text(body).await.map_err(SessionError::Network),
        Err(error) => {
            warn!(%error, "failed to serialise notification frame");
            Ok(())
        }
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
