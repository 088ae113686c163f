//! Shop Context - Aggregate Root

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

use crate::domain::catalog::BookId;
use crate::domain::customer::{Address, ClientId};
use crate::domain::validation::{FieldErrors, ValidationError};

pub type ShopId = Uuid;

/// 门店聚合根
///
/// 不变量:
/// - book_ids / client_ids 无重复
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shop {
    pub id: ShopId,
    pub name: String,
    pub address: Address,
    pub book_ids: BTreeSet<BookId>,
    pub client_ids: BTreeSet<ClientId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Shop {
    pub fn new(name: impl Into<String>, address: Address) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            address,
            book_ids: BTreeSet::new(),
            client_ids: BTreeSet::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut errors = FieldErrors::new();
        errors
            .not_blank("name", &self.name)
            .merge_prefixed("address", self.address.errors());
        errors.into_result()
    }

    pub fn sells(&self, book_id: BookId) -> bool {
        self.book_ids.contains(&book_id)
    }

    pub fn serves(&self, client_id: &ClientId) -> bool {
        self.client_ids.contains(client_id)
    }
}
