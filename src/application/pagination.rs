//! 分页与排序
//!
//! 所有列表查询共用 `PageRequest` / `Page<T>`，排序字段由各仓储按白名单解析

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::validation::{FieldErrors, ValidationError};

/// 单页最大条数
pub const MAX_PAGE_SIZE: i64 = 1000;

/// 最大页码
pub const MAX_PAGE: i64 = i32::MAX as i64;

/// 默认每页条数
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// 排序方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }

    pub fn as_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

impl FromStr for SortDirection {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            _ => Err(ValidationError::single(
                "direction",
                "must be either asc or desc",
            )),
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 分页请求
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub size: u32,
    pub sort_by: String,
    pub direction: SortDirection,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 0,
            size: DEFAULT_PAGE_SIZE as u32,
            sort_by: "id".to_string(),
            direction: SortDirection::Asc,
        }
    }
}

impl PageRequest {
    /// 校验原始查询参数并构造分页请求
    ///
    /// - 0 <= page <= MAX_PAGE
    /// - 1 <= size <= MAX_PAGE_SIZE
    pub fn new(
        page: i64,
        size: i64,
        sort_by: impl Into<String>,
        direction: SortDirection,
    ) -> Result<Self, ValidationError> {
        let sort_by = sort_by.into();
        let mut errors = FieldErrors::new();
        errors
            .check(page >= 0, "page", "must be greater than or equal to 0")
            .check(page <= MAX_PAGE, "page", &format!("must be at most {}", MAX_PAGE))
            .check(size >= 1, "size", "must be greater than or equal to 1")
            .check(size <= MAX_PAGE_SIZE, "size", "must be at most 1000")
            .not_blank("sort_by", &sort_by);
        errors.into_result()?;

        Ok(Self {
            page: page as u32,
            size: size as u32,
            sort_by,
            direction,
        })
    }

    pub fn of(page: u32, size: u32) -> Self {
        Self {
            page,
            size,
            ..Self::default()
        }
    }

    pub fn sorted(mut self, sort_by: impl Into<String>, direction: SortDirection) -> Self {
        self.sort_by = sort_by.into();
        self.direction = direction;
        self
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page) * u64::from(self.size)
    }

    pub fn limit(&self) -> u64 {
        u64::from(self.size)
    }

    /// 在白名单中查找排序字段，返回静态列名
    pub fn sort_field(&self, allowed: &[&'static str]) -> Option<&'static str> {
        allowed
            .iter()
            .copied()
            .find(|field| field.eq_ignore_ascii_case(&self.sort_by))
    }
}

/// 分页结果
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub content: Vec<T>,
    pub total_elements: u64,
    pub page: u32,
    pub size: u32,
    pub sort_by: String,
    pub direction: SortDirection,
}

impl<T> Page<T> {
    pub fn new(content: Vec<T>, total_elements: u64, request: &PageRequest) -> Self {
        Self {
            content,
            total_elements,
            page: request.page,
            size: request.size,
            sort_by: request.sort_by.clone(),
            direction: request.direction,
        }
    }

    pub fn total_pages(&self) -> u32 {
        if self.size == 0 {
            return 0;
        }
        u32::try_from(self.total_elements.div_ceil(u64::from(self.size))).unwrap_or(u32::MAX)
    }

    pub fn is_first(&self) -> bool {
        self.page == 0
    }

    pub fn is_last(&self) -> bool {
        self.page.saturating_add(1) >= self.total_pages()
    }

    pub fn has_next(&self) -> bool {
        !self.is_last()
    }

    pub fn has_previous(&self) -> bool {
        self.page > 0
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            content: self.content.into_iter().map(f).collect(),
            total_elements: self.total_elements,
            page: self.page,
            size: self.size,
            sort_by: self.sort_by,
            direction: self.direction,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_request_validation() {
        assert!(PageRequest::new(0, 10, "id", SortDirection::Asc).is_ok());

        let err = PageRequest::new(-1, 0, "id", SortDirection::Asc).unwrap_err();
        assert!(err.fields().get("page").is_some());
        assert!(err.fields().get("size").is_some());

        assert!(PageRequest::new(0, 1001, "id", SortDirection::Asc).is_err());

        // 超出 u32 的页码不能被截断成小页码
        let err = PageRequest::new(4_294_967_296, 10, "id", SortDirection::Asc).unwrap_err();
        assert!(err.fields().get("page").is_some());
        assert!(PageRequest::new(MAX_PAGE + 1, 10, "id", SortDirection::Asc).is_err());
        assert_eq!(
            PageRequest::new(MAX_PAGE, 10, "id", SortDirection::Asc).unwrap().page,
            i32::MAX as u32
        );
    }

    #[test]
    fn test_far_page_is_last_without_overflow() {
        let page: Page<i32> = Page::new(vec![], 5, &PageRequest::of(u32::MAX, 10));
        assert!(page.is_last());
        assert!(!page.has_next());
        assert!(page.has_previous());
    }

    #[test]
    fn test_sort_field_whitelist() {
        let request = PageRequest::default().sorted("PRICE", SortDirection::Desc);
        assert_eq!(request.sort_field(&["id", "price"]), Some("price"));
        assert_eq!(request.sort_field(&["id", "name"]), None);
    }

    #[test]
    fn test_page_navigation() {
        let request = PageRequest::of(1, 10);
        let page = Page::new(vec![1, 2, 3], 23, &request);

        assert_eq!(page.total_pages(), 3);
        assert!(!page.is_first());
        assert!(!page.is_last());
        assert!(page.has_next());
        assert!(page.has_previous());
        assert_eq!(request.offset(), 10);
    }

    #[test]
    fn test_empty_page_is_first_and_last() {
        let page: Page<i32> = Page::new(vec![], 0, &PageRequest::default());
        assert_eq!(page.total_pages(), 0);
        assert!(page.is_first());
        assert!(page.is_last());
        assert!(!page.has_next());
    }

    #[test]
    fn test_direction_parse() {
        assert_eq!("DESC".parse::<SortDirection>().unwrap(), SortDirection::Desc);
        assert!("sideways".parse::<SortDirection>().is_err());
    }
}
