use std::{convert::Infallible, sync::Arc, time::Duration};

use axum::response::sse::{Event, KeepAlive, Sse};
use futures::Stream;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use uuid::Uuid;

use crate::{
    dto::sse::{Handshake, ServerEvent},
    state::{SharedState, SseHub},
};

/// Subscribe to the realtime stream of one session.
pub fn subscribe_session(state: &SharedState, session_id: Uuid) -> broadcast::Receiver<ServerEvent> {
    state.session_events(session_id).subscribe()
}

/// Convert a broadcast receiver into an SSE response, forwarding events and
/// cleaning up once the client disconnects.
pub fn to_sse_stream(
    mut receiver: broadcast::Receiver<ServerEvent>,
    session_id: Uuid,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    // small bounded channel between forwarder and response
    let (tx, rx) = mpsc::channel::<Result<Event, Infallible>>(8);

    // forwarder task: reads from broadcast and pushes into mpsc
    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = tx.closed() => break,
                recv_result = receiver.recv() => {
                    match recv_result {
                        Ok(payload) => {
                            let mut event = Event::default().data(payload.data);
                            if let Some(name) = payload.event {
                                event = event.event(name);
                            }

                            if tx.send(Ok(event)).await.is_err() {
                                break;
                            }
                        }
                        Err(RecvError::Closed) => break,
                        Err(RecvError::Lagged(_)) => {
                            // Skip lagged messages but keep the stream alive;
                            // clients re-sync from the lobby state endpoint.
                            continue;
                        }
                    }
                }
            }
        }

        tracing::info!(%session_id, "session SSE stream disconnected");
    });

    // response stream reads from mpsc; when client disconnects axum drops this stream
    let stream = ReceiverStream::new(rx);
    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

/// Send the connection handshake onto a freshly subscribed stream.
pub fn broadcast_handshake(hub: &Arc<SseHub>, session_id: Uuid, degraded: bool) {
    if let Ok(event) = ServerEvent::json(
        Some("handshake".to_string()),
        &Handshake {
            session_id,
            message: "session stream connected".into(),
            degraded,
        },
    ) {
        hub.broadcast(event);
    }
}
