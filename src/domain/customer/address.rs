//! Customer Context - Address 值对象（客户与门店共用）

use serde::{Deserialize, Serialize};

use crate::domain::validation::FieldErrors;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub street: String,
    pub number: String,
    pub city: String,
    pub province: String,
    pub country: String,
    pub postal_code: String,
}

impl Address {
    /// 全部字段不能为空
    pub fn errors(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        errors
            .not_blank("street", &self.street)
            .not_blank("number", &self.number)
            .not_blank("city", &self.city)
            .not_blank("province", &self.province)
            .not_blank("country", &self.country)
            .not_blank("postal_code", &self.postal_code);
        errors
    }
}
