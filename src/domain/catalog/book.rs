//! Catalog Context - Book

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{CategoryId, PublisherId};
use crate::domain::validation::{FieldErrors, ValidationError};

pub type BookId = i64;

/// 图书
///
/// 不变量:
/// - price >= 0, stock >= 0
/// - 删除为软删除（active = false），订单历史仍可引用
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    pub id: BookId,
    pub name: String,
    pub author: String,
    pub publisher_id: PublisherId,
    pub category_id: CategoryId,
    pub image: String,
    pub description: String,
    pub price: f64,
    pub stock: i32,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Book {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut errors = FieldErrors::new();
        errors
            .not_blank("name", &self.name)
            .not_blank("author", &self.author)
            .not_blank("description", &self.description)
            .not_blank("image", &self.image)
            .check(
                self.price.is_finite() && self.price >= 0.0,
                "price",
                "must be greater than or equal to 0",
            )
            .check(self.stock >= 0, "stock", "must be greater than or equal to 0");
        errors.into_result()
    }

    /// 是否可以售出指定数量
    pub fn can_sell(&self, quantity: i32) -> bool {
        self.active && quantity > 0 && self.stock >= quantity
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// 图书读模型，附带出版社与分类名称
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BookView {
    #[serde(flatten)]
    pub book: Book,
    pub publisher_name: String,
    pub category_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn book() -> Book {
        let now = Utc::now();
        Book {
            id: 1,
            name: "Dune".to_string(),
            author: "Frank Herbert".to_string(),
            publisher_id: 1,
            category_id: Uuid::new_v4(),
            image: crate::domain::DEFAULT_IMAGE.to_string(),
            description: "Desert planet".to_string(),
            price: 19.99,
            stock: 3,
            active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_valid_book() {
        assert!(book().validate().is_ok());
    }

    #[test]
    fn test_negative_price_and_stock() {
        let mut b = book();
        b.price = -1.0;
        b.stock = -2;
        b.author = "  ".to_string();

        let err = b.validate().unwrap_err();
        assert!(err.fields().get("price").is_some());
        assert!(err.fields().get("stock").is_some());
        assert!(err.fields().get("author").is_some());
    }

    #[test]
    fn test_can_sell() {
        let mut b = book();
        assert!(b.can_sell(3));
        assert!(!b.can_sell(4));
        assert!(!b.can_sell(0));

        b.active = false;
        assert!(!b.can_sell(1));
    }
}
