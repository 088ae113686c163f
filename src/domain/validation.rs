//! 字段校验工具
//!
//! 各聚合在持久化前调用 `validate()`，错误按字段收集，
//! HTTP 层原样返回 `{字段: 错误信息}`。

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// 未上传图片时使用的占位图
pub const DEFAULT_IMAGE: &str = "https://via.placeholder.com/150";

/// 字段级错误集合（字段名 -> 错误信息），每个字段只保留第一条
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// 单字段错误
    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) -> &mut Self {
        self.0
            .entry(field.to_string())
            .or_insert_with(|| message.into());
        self
    }

    /// 条件不成立时记录错误
    pub fn check(&mut self, ok: bool, field: &str, message: &str) -> &mut Self {
        if !ok {
            self.add(field, message);
        }
        self
    }

    pub fn not_blank(&mut self, field: &str, value: &str) -> &mut Self {
        self.check(!value.trim().is_empty(), field, "must not be blank")
    }

    pub fn email(&mut self, field: &str, value: &str) -> &mut Self {
        self.check(is_valid_email(value), field, "must be a valid email address")
    }

    /// 合并另一组错误，字段名加前缀（如 `address.city`）
    pub fn merge_prefixed(&mut self, prefix: &str, other: FieldErrors) -> &mut Self {
        for (field, message) in other.0 {
            self.add(&format!("{}.{}", prefix, field), message);
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn into_map(self) -> BTreeMap<String, String> {
        self.0
    }

    pub fn into_result(self) -> Result<(), ValidationError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(ValidationError(self))
        }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|(field, message)| format!("{}: {}", field, message))
            .collect();
        write!(f, "{}", parts.join(", "))
    }
}

/// 聚合校验失败
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Validation failed: {0}")]
pub struct ValidationError(pub FieldErrors);

impl ValidationError {
    pub fn single(field: &str, message: impl Into<String>) -> Self {
        Self(FieldErrors::single(field, message))
    }

    pub fn fields(&self) -> &FieldErrors {
        &self.0
    }
}

/// 邮箱格式：`local@domain.tld`，不含空白
pub fn is_valid_email(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    let labels: Vec<&str> = domain.split('.').collect();
    labels.len() >= 2 && labels.iter().all(|label| !label.is_empty())
}

/// 电话：6-20 位，数字与空格，可选前导 `+`
pub fn is_valid_phone(value: &str) -> bool {
    let body = value.strip_prefix('+').unwrap_or(value);
    let digits = body.chars().filter(char::is_ascii_digit).count();
    (6..=20).contains(&value.len())
        && digits >= 6
        && body.chars().all(|c| c.is_ascii_digit() || c == ' ')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_shapes() {
        assert!(is_valid_email("reader@books.com"));
        assert!(is_valid_email("a.b+c@mail.example.org"));
        assert!(!is_valid_email("reader"));
        assert!(!is_valid_email("@books.com"));
        assert!(!is_valid_email("reader@books"));
        assert!(!is_valid_email("reader@@books.com"));
        assert!(!is_valid_email("read er@books.com"));
        assert!(!is_valid_email("reader@books..com"));
    }

    #[test]
    fn test_phone_shapes() {
        assert!(is_valid_phone("612345678"));
        assert!(is_valid_phone("+34 612 345 678"));
        assert!(!is_valid_phone("12345"));
        assert!(!is_valid_phone("61234567a"));
        assert!(!is_valid_phone("++34612345678"));
    }

    #[test]
    fn test_first_error_per_field_wins() {
        let mut errors = FieldErrors::new();
        errors.not_blank("name", " ").add("name", "second");
        assert_eq!(errors.get("name"), Some("must not be blank"));
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_merge_prefixed() {
        let mut inner = FieldErrors::new();
        inner.add("city", "must not be blank");

        let mut outer = FieldErrors::new();
        outer.merge_prefixed("address", inner);

        assert_eq!(outer.get("address.city"), Some("must not be blank"));
        assert!(outer.into_result().is_err());
    }
}
