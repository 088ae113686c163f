//! Event Publisher Implementation
//!
//! WebSocket 变更通知推送实现

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::application::ports::{Notification, NotificationEntity, NotifierPort};
use crate::domain::identity::UserId;

/// 广播通道容量，慢消费者超出后丢弃旧消息
const CHANNEL_CAPACITY: usize = 256;

/// 服务端 → 客户端消息
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum WsEvent {
    /// 实体变更
    Notification(Notification),
    /// 当前订阅集合
    Subscribed { entities: BTreeSet<NotificationEntity> },
    Pong,
    Error { message: String },
}

/// 客户端 → 服务端消息
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum WsClientMessage {
    Subscribe { entities: Vec<NotificationEntity> },
    Unsubscribe { entities: Vec<NotificationEntity> },
    Ping,
}

/// 已连接的客户端
#[derive(Debug, Clone)]
pub struct ConnectionInfo {
    pub user_id: UserId,
    pub connected_at: DateTime<Utc>,
}

/// 事件发布器
pub struct EventPublisher {
    channel: broadcast::Sender<Notification>,
    /// connection_id -> 连接信息
    connections: DashMap<Uuid, ConnectionInfo>,
}

impl EventPublisher {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self {
            channel: tx,
            connections: DashMap::new(),
        }
    }

    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// 订阅全部通知
    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.channel.subscribe()
    }

    /// 注册连接，返回连接 ID 与接收器
    pub fn register_connection(
        &self,
        user_id: UserId,
    ) -> (Uuid, broadcast::Receiver<Notification>) {
        let connection_id = Uuid::new_v4();
        self.connections.insert(
            connection_id,
            ConnectionInfo {
                user_id,
                connected_at: Utc::now(),
            },
        );
        tracing::info!(
            connection_id = %connection_id,
            user_id = %user_id,
            connections = self.connections.len(),
            "Notification client connected"
        );
        (connection_id, self.channel.subscribe())
    }

    /// 取消注册连接
    pub fn unregister_connection(&self, connection_id: Uuid) {
        if let Some((_, info)) = self.connections.remove(&connection_id) {
            tracing::info!(
                connection_id = %connection_id,
                user_id = %info.user_id,
                connected_for_secs = (Utc::now() - info.connected_at).num_seconds(),
                "Notification client disconnected"
            );
        }
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }
}

impl Default for EventPublisher {
    fn default() -> Self {
        Self::new()
    }
}

impl NotifierPort for EventPublisher {
    fn notify(&self, notification: Notification) {
        let entity = notification.entity;
        let kind = notification.kind;
        if let Err(e) = self.channel.send(notification) {
            tracing::debug!(
                ?entity,
                ?kind,
                error = %e,
                "Failed to publish notification (no receivers)"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::NotificationType;

    #[tokio::test]
    async fn test_notify_reaches_subscribers() {
        let publisher = EventPublisher::new();
        let (connection_id, mut rx) = publisher.register_connection(Uuid::new_v4());
        assert_eq!(publisher.connection_count(), 1);

        publisher.notify(Notification::new(
            NotificationEntity::Shops,
            NotificationType::Delete,
            &serde_json::json!({"id": "x"}),
        ));

        let received = rx.recv().await.unwrap();
        assert_eq!(received.entity, NotificationEntity::Shops);
        assert_eq!(received.kind, NotificationType::Delete);

        publisher.unregister_connection(connection_id);
        assert_eq!(publisher.connection_count(), 0);
    }

    #[test]
    fn test_notify_without_subscribers_is_silent() {
        let publisher = EventPublisher::new();
        publisher.notify(Notification::new(
            NotificationEntity::Books,
            NotificationType::Create,
            &1,
        ));
    }

    #[test]
    fn test_ws_wire_format() {
        let event = WsEvent::Notification(Notification::new(
            NotificationEntity::Orders,
            NotificationType::Update,
            &serde_json::json!({"total": 3.5}),
        ));
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "notification");
        assert_eq!(json["entity"], "ORDERS");
        assert_eq!(json["type"], "UPDATE");

        assert_eq!(
            serde_json::to_value(WsEvent::Pong).unwrap(),
            serde_json::json!({"event": "pong"})
        );

        let message: WsClientMessage =
            serde_json::from_str(r#"{"action":"subscribe","entities":["BOOKS","ORDERS"]}"#)
                .unwrap();
        assert_eq!(
            message,
            WsClientMessage::Subscribe {
                entities: vec![NotificationEntity::Books, NotificationEntity::Orders]
            }
        );
    }
}
