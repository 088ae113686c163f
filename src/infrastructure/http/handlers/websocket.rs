//! WebSocket Handler - 实体变更通知
//!
//! 连接需要有效 token（`Authorization` 头或 `?token=`），
//! 默认订阅全部实体，客户端可通过 subscribe / unsubscribe 调整。

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    http::HeaderMap,
    response::{IntoResponse, Response},
};
use futures_util::{Sink, SinkExt, StreamExt};
use serde::Deserialize;
use std::collections::BTreeSet;
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use utoipa::IntoParams;

use crate::application::{AuthError, NotificationEntity};
use crate::domain::identity::User;
use crate::infrastructure::events::{WsClientMessage, WsEvent};
use crate::infrastructure::http::auth::{authenticate, bearer_token};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::extract::AppQuery;
use crate::infrastructure::http::state::AppState;

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct WsParams {
    /// 浏览器无法设置请求头时使用
    pub token: Option<String>,
}

/// 通知 WebSocket 入口，先认证再升级
pub async fn notifications_ws_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    AppQuery(params): AppQuery<WsParams>,
    ws: Option<WebSocketUpgrade>,
) -> Result<Response, ApiError> {
    let token = bearer_token(&headers)
        .or(params.token.as_deref())
        .ok_or_else(|| ApiError::Unauthorized(AuthError::MissingToken.to_string()))?;
    let user = authenticate(&state, token).await?;

    let ws = ws.ok_or_else(|| {
        ApiError::BadRequest("Expected a WebSocket upgrade request".to_string())
    })?;

    Ok(ws
        .on_upgrade(move |socket| handle_notification_socket(socket, user, state))
        .into_response())
}

async fn handle_notification_socket(socket: WebSocket, user: User, state: Arc<AppState>) {
    let (mut sender, mut receiver) = socket.split();
    let (connection_id, mut event_rx) = state.event_publisher.register_connection(user.id);

    let mut subscriptions: BTreeSet<NotificationEntity> =
        NotificationEntity::ALL.into_iter().collect();

    let greeting = WsEvent::Subscribed {
        entities: subscriptions.clone(),
    };
    if send_event(&mut sender, &greeting).await.is_err() {
        state.event_publisher.unregister_connection(connection_id);
        return;
    }

    loop {
        tokio::select! {
            received = event_rx.recv() => match received {
                Ok(notification) => {
                    if !subscriptions.contains(&notification.entity) {
                        continue;
                    }
                    if send_event(&mut sender, &WsEvent::Notification(notification)).await.is_err() {
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(
                        connection_id = %connection_id,
                        skipped,
                        "Notification client lagging, messages dropped"
                    );
                }
                Err(RecvError::Closed) => break,
            },
            incoming = receiver.next() => match incoming {
                Some(Ok(Message::Text(text))) => {
                    let reply = handle_client_message(&text, &mut subscriptions);
                    if send_event(&mut sender, &reply).await.is_err() {
                        break;
                    }
                }
                Some(Ok(Message::Close(_))) | None => {
                    tracing::debug!(connection_id = %connection_id, "WebSocket closed by client");
                    break;
                }
                Some(Err(e)) => {
                    tracing::debug!(connection_id = %connection_id, error = %e, "WebSocket error");
                    break;
                }
                // Ping/Pong 由 axum 自动处理
                Some(Ok(_)) => {}
            },
        }
    }

    state.event_publisher.unregister_connection(connection_id);
}

async fn send_event<S>(sender: &mut S, event: &WsEvent) -> Result<(), ()>
where
    S: Sink<Message> + Unpin,
    S::Error: std::fmt::Display,
{
    let json = match serde_json::to_string(event) {
        Ok(json) => json,
        Err(e) => {
            tracing::error!(error = %e, "Failed to serialize event");
            return Ok(());
        }
    };

    sender.send(Message::Text(json)).await.map_err(|e| {
        tracing::debug!(error = %e, "Failed to send WebSocket message");
    })
}

/// 处理客户端文本消息，返回应答
pub fn handle_client_message(
    text: &str,
    subscriptions: &mut BTreeSet<NotificationEntity>,
) -> WsEvent {
    match serde_json::from_str::<WsClientMessage>(text) {
        Ok(WsClientMessage::Subscribe { entities }) => {
            subscriptions.extend(entities);
            WsEvent::Subscribed {
                entities: subscriptions.clone(),
            }
        }
        Ok(WsClientMessage::Unsubscribe { entities }) => {
            for entity in entities {
                subscriptions.remove(&entity);
            }
            WsEvent::Subscribed {
                entities: subscriptions.clone(),
            }
        }
        Ok(WsClientMessage::Ping) => WsEvent::Pong,
        Err(e) => WsEvent::Error {
            message: format!("Invalid message: {}", e),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subscription_changes() {
        let mut subs: BTreeSet<_> = NotificationEntity::ALL.into_iter().collect();

        let reply = handle_client_message(
            r#"{"action":"unsubscribe","entities":["BOOKS","ORDERS"]}"#,
            &mut subs,
        );
        assert!(!subs.contains(&NotificationEntity::Books));
        assert!(!subs.contains(&NotificationEntity::Orders));
        assert_eq!(subs.len(), 4);
        assert_eq!(reply, WsEvent::Subscribed { entities: subs.clone() });

        handle_client_message(r#"{"action":"subscribe","entities":["BOOKS"]}"#, &mut subs);
        assert!(subs.contains(&NotificationEntity::Books));
    }

    #[test]
    fn test_ping_and_garbage() {
        let mut subs = BTreeSet::new();
        assert_eq!(handle_client_message(r#"{"action":"ping"}"#, &mut subs), WsEvent::Pong);

        match handle_client_message("hello", &mut subs) {
            WsEvent::Error { message } => assert!(message.starts_with("Invalid message")),
            other => panic!("unexpected reply: {:?}", other),
        }
        assert!(subs.is_empty());
    }
}
