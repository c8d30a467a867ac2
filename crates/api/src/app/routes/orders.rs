//! Kitchen display relay endpoints.
//!
//! `GET /ws/orders` upgrades to a WebSocket that joins the `orders` group.
//! Clients send `{"type":"subscribe","order_id":<id>}` to follow one order
//! instead of all of them; every other inbound frame is ignored. `POST /orders/events` is the hook
//! the order subsystem calls to publish a change.

use std::sync::Arc;

use axum::{
    Json,
    extract::{
        Extension,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    http::StatusCode,
    response::IntoResponse,
};
use futures::{SinkExt, StreamExt};
use tokio::time::{Duration, interval};
use tracing::debug;

use tillpoint_events::{OrderEvent, OrderRelay};

use crate::app::errors;
use crate::app::services::AppServices;

const PING_EVERY: Duration = Duration::from_secs(30);

pub async fn orders_ws(
    Extension(services): Extension<Arc<AppServices>>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    let relay = services.relay.clone();
    ws.on_upgrade(move |socket| relay_session(socket, relay))
}

async fn relay_session(socket: WebSocket, relay: Arc<OrderRelay>) {
    let (mut sink, mut stream) = socket.split();
    let mut connection = relay.connect();
    let id = connection.id;

    let mut ping = interval(PING_EVERY);
    ping.tick().await;

    loop {
        tokio::select! {
            _ = ping.tick() => {
                if sink.send(Message::Ping(Vec::new())).await.is_err() {
                    break;
                }
            }

            frame = connection.frames.recv() => {
                match frame {
                    Some(frame) => {
                        if sink.send(Message::Text(frame)).await.is_err() {
                            break;
                        }
                    }
                    None => break,
                }
            }

            msg = stream.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        relay.handle_client_text(id, &text);
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(e)) => {
                        debug!(connection = %id, error = %e, "socket error");
                        break;
                    }
                    _ => {}
                }
            }
        }
    }

    relay.disconnect(id);
}

pub async fn publish_event(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<serde_json::Value>,
) -> axum::response::Response {
    let event: OrderEvent = match serde_json::from_value(body) {
        Ok(event) => event,
        Err(e) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_event", e.to_string());
        }
    };

    let delivered = services.relay.publish(&event);
    (
        StatusCode::ACCEPTED,
        Json(serde_json::json!({
            "type": event.kind(),
            "enabled": services.relay.is_enabled(),
            "delivered": delivered,
        })),
    )
        .into_response()
}
