//! Notifier Port - 实时变更通知
//!
//! 命令处理成功后发布通知，由 WebSocket 推送给订阅的客户端

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 通知所属实体
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum NotificationEntity {
    Books,
    Publishers,
    Categories,
    Clients,
    Shops,
    Orders,
}

impl NotificationEntity {
    pub const ALL: [NotificationEntity; 6] = [
        NotificationEntity::Books,
        NotificationEntity::Publishers,
        NotificationEntity::Categories,
        NotificationEntity::Clients,
        NotificationEntity::Shops,
        NotificationEntity::Orders,
    ];
}

/// 变更类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum NotificationType {
    Create,
    Update,
    Delete,
}

/// 变更通知
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub entity: NotificationEntity,
    #[serde(rename = "type")]
    pub kind: NotificationType,
    pub data: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    /// 序列化失败时 data 为 null
    pub fn new<T: Serialize>(entity: NotificationEntity, kind: NotificationType, data: &T) -> Self {
        let data = serde_json::to_value(data).unwrap_or_else(|e| {
            tracing::warn!(error = %e, ?entity, "Failed to serialize notification payload");
            serde_json::Value::Null
        });
        Self {
            entity,
            kind,
            data,
            created_at: Utc::now(),
        }
    }
}

pub trait NotifierPort: Send + Sync {
    /// 非阻塞发布，没有订阅者时丢弃
    fn notify(&self, notification: Notification);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_format() {
        let n = Notification::new(
            NotificationEntity::Books,
            NotificationType::Create,
            &serde_json::json!({"id": 1}),
        );
        let json = serde_json::to_value(&n).unwrap();
        assert_eq!(json["entity"], "BOOKS");
        assert_eq!(json["type"], "CREATE");
        assert_eq!(json["data"]["id"], 1);
    }
}
