//! Ordering Context - Value Objects

use bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::domain::catalog::BookId;

/// 订单 ID（24 位十六进制 ObjectId）
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(String);

#[derive(Debug, Error)]
#[error("invalid order id: {0}")]
pub struct OrderIdError(pub String);

impl OrderId {
    pub fn generate() -> Self {
        Self(ObjectId::new().to_hex())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn to_object_id(&self) -> Result<ObjectId, OrderIdError> {
        ObjectId::parse_str(&self.0).map_err(|_| OrderIdError(self.0.clone()))
    }
}

impl FromStr for OrderId {
    type Err = OrderIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let oid = ObjectId::parse_str(s).map_err(|_| OrderIdError(s.to_string()))?;
        Ok(Self(oid.to_hex()))
    }
}

impl From<ObjectId> for OrderId {
    fn from(oid: ObjectId) -> Self {
        Self(oid.to_hex())
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 订单行，total = quantity * price
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLine {
    pub book_id: BookId,
    pub quantity: i32,
    pub price: f64,
    pub total: f64,
}

impl OrderLine {
    pub fn new(book_id: BookId, quantity: i32, price: f64) -> Self {
        Self {
            book_id,
            quantity,
            price,
            total: round_cents(price * f64::from(quantity)),
        }
    }
}

/// 金额保留两位小数
pub(crate) fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
