//! Events - 实时通知广播

mod publisher;

pub use publisher::{ConnectionInfo, EventPublisher, WsClientMessage, WsEvent};
