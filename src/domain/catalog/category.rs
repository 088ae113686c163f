//! Catalog Context - Category

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::validation::{FieldErrors, ValidationError};

pub type CategoryId = Uuid;

const MAX_NAME_LEN: usize = 100;

/// 图书分类，名称全局唯一（忽略大小写）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Category {
    pub fn new(name: impl Into<String>, active: bool) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into().trim().to_string(),
            active,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut errors = FieldErrors::new();
        errors.not_blank("name", &self.name).check(
            self.name.chars().count() <= MAX_NAME_LEN,
            "name",
            "must be at most 100 characters",
        );
        errors.into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_trims_name() {
        let category = Category::new("  Fantasy ", true);
        assert_eq!(category.name, "Fantasy");
        assert!(category.validate().is_ok());
    }

    #[test]
    fn test_blank_and_long_names_rejected() {
        assert!(Category::new("", true).validate().is_err());
        assert!(Category::new("x".repeat(101), true).validate().is_err());
    }
}
