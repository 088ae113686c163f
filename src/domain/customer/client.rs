//! Customer Context - Client

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Address;
use crate::domain::validation::{is_valid_phone, FieldErrors, ValidationError};

pub type ClientId = Uuid;

/// 客户
///
/// 不变量:
/// - email 全局唯一（忽略大小写）
/// - 被订单引用时不可删除
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Client {
    pub id: ClientId,
    pub name: String,
    pub surname: String,
    pub email: String,
    pub phone: String,
    pub address: Address,
    pub image: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Client {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut errors = FieldErrors::new();
        errors
            .not_blank("name", &self.name)
            .not_blank("surname", &self.surname)
            .email("email", &self.email)
            .check(
                is_valid_phone(&self.phone),
                "phone",
                "must be 6-20 digits, optionally prefixed with +",
            )
            .not_blank("image", &self.image)
            .merge_prefixed("address", self.address.errors());
        errors.into_result()
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.name, self.surname)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> Client {
        let now = Utc::now();
        Client {
            id: Uuid::new_v4(),
            name: "Ana".to_string(),
            surname: "García".to_string(),
            email: "ana@example.com".to_string(),
            phone: "612345678".to_string(),
            address: Address {
                street: "Gran Vía".to_string(),
                number: "1".to_string(),
                city: "Madrid".to_string(),
                province: "Madrid".to_string(),
                country: "Spain".to_string(),
                postal_code: "28013".to_string(),
            },
            image: crate::domain::DEFAULT_IMAGE.to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_valid_client() {
        assert!(client().validate().is_ok());
        assert_eq!(client().full_name(), "Ana García");
    }

    #[test]
    fn test_invalid_fields_are_reported_by_name() {
        let mut c = client();
        c.email = "not-an-email".to_string();
        c.phone = "12".to_string();
        c.address.city = String::new();

        let err = c.validate().unwrap_err();
        assert!(err.fields().get("email").is_some());
        assert!(err.fields().get("phone").is_some());
        assert_eq!(err.fields().get("address.city"), Some("must not be blank"));
    }
}
