//! Catalog Context - Publisher

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::validation::{FieldErrors, ValidationError};

pub type PublisherId = i64;

/// 出版社（软删除）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Publisher {
    pub id: PublisherId,
    pub name: String,
    pub image: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Publisher {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut errors = FieldErrors::new();
        errors
            .not_blank("name", &self.name)
            .not_blank("image", &self.image);
        errors.into_result()
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
