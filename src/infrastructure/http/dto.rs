//! Data Transfer Objects - 公共部分
//!
//! 统一响应信封、分页与地址等跨资源共用的结构；
//! 各资源自己的请求/响应结构放在对应的 handler 模块中。

use axum::{
    http::{header, HeaderValue, Uri},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::application::{Page, PageRequest, SortDirection, DEFAULT_PAGE_SIZE};
use crate::domain::customer::Address;

use super::error::ApiError;

// ============================================================================
// 统一响应结构
// ============================================================================

/// 统一 API 响应格式
#[derive(Debug, Serialize, ToSchema)]
pub struct ApiResponse<T> {
    pub errno: i32,
    pub error: String,
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    /// 成功响应
    pub fn success(data: T) -> Self {
        Self {
            errno: 0,
            error: String::new(),
            data: Some(data),
        }
    }
}

/// 空数据响应
#[derive(Debug, Serialize, ToSchema)]
pub struct Empty {}

impl ApiResponse<Empty> {
    /// 成功但无数据
    pub fn ok() -> Self {
        Self::success(Empty {})
    }
}

// ============================================================================
// 分页
// ============================================================================

/// 分页查询参数，缺省时 page=0, size=10, sort_by=id, direction=asc
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageParams {
    /// 页码，从 0 开始
    pub page: Option<i64>,
    /// 每页条数（1-1000）
    pub size: Option<i64>,
    /// 排序字段
    pub sort_by: Option<String>,
    /// asc | desc
    pub direction: Option<String>,
}

impl PageParams {
    pub fn into_page_request(self) -> Result<PageRequest, ApiError> {
        let direction = match self.direction.as_deref() {
            Some(direction) => direction.parse::<SortDirection>()?,
            None => SortDirection::Asc,
        };
        Ok(PageRequest::new(
            self.page.unwrap_or(0),
            self.size.unwrap_or(DEFAULT_PAGE_SIZE),
            self.sort_by.unwrap_or_else(|| "id".to_string()),
            direction,
        )?)
    }
}

/// 分页响应
#[derive(Debug, Serialize, ToSchema)]
pub struct PageResponse<T> {
    pub content: Vec<T>,
    pub total_pages: u32,
    pub total_elements: u64,
    pub page_size: u32,
    pub page_number: u32,
    /// 当前页条数
    pub total_page_elements: usize,
    pub empty: bool,
    pub first: bool,
    pub last: bool,
    pub sort_by: String,
    pub direction: String,
}

impl<T> PageResponse<T> {
    pub fn from_page<S>(page: Page<S>) -> Self
    where
        T: From<S>,
    {
        let total_pages = page.total_pages();
        let first = page.is_first();
        let last = page.is_last();
        let content: Vec<T> = page.content.into_iter().map(T::from).collect();
        Self {
            total_pages,
            total_elements: page.total_elements,
            page_size: page.size,
            page_number: page.page,
            total_page_elements: content.len(),
            empty: content.is_empty(),
            first,
            last,
            sort_by: page.sort_by,
            direction: page.direction.to_string(),
            content,
        }
    }
}

/// 分页响应 + `Link` 头（RFC 8288）
pub struct Paged<T> {
    link: Option<HeaderValue>,
    body: PageResponse<T>,
}

impl<T> Paged<T> {
    pub fn new<S>(uri: &Uri, page: Page<S>) -> Self
    where
        T: From<S>,
    {
        Self {
            link: page_links(uri, &page),
            body: PageResponse::from_page(page),
        }
    }
}

impl<T: Serialize> IntoResponse for Paged<T> {
    fn into_response(self) -> Response {
        let mut response = Json(ApiResponse::success(self.body)).into_response();
        if let Some(link) = self.link {
            response.headers_mut().insert(header::LINK, link);
        }
        response
    }
}

/// 生成 next / prev / first / last 链接，保留原查询参数
fn page_links<T>(uri: &Uri, page: &Page<T>) -> Option<HeaderValue> {
    let retained: Vec<&str> = uri
        .query()
        .unwrap_or_default()
        .split('&')
        .filter(|pair| !pair.is_empty() && pair.split('=').next() != Some("page"))
        .collect();

    let link = |number: u32, rel: &str| {
        let page_param = format!("page={}", number);
        let query = retained
            .iter()
            .copied()
            .chain(std::iter::once(page_param.as_str()))
            .collect::<Vec<_>>()
            .join("&");
        format!("<{}?{}>; rel=\"{}\"", uri.path(), query, rel)
    };

    let mut links = Vec::with_capacity(4);
    if page.has_next() {
        links.push(link(page.page.saturating_add(1), "next"));
    }
    if page.has_previous() {
        links.push(link(page.page - 1, "prev"));
    }
    links.push(link(0, "first"));
    if page.total_pages() > 0 {
        links.push(link(page.total_pages() - 1, "last"));
    }

    HeaderValue::from_str(&links.join(", ")).ok()
}

// ============================================================================
// 地址
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AddressDto {
    pub street: String,
    pub number: String,
    pub city: String,
    pub province: String,
    pub country: String,
    pub postal_code: String,
}

impl From<Address> for AddressDto {
    fn from(a: Address) -> Self {
        Self {
            street: a.street,
            number: a.number,
            city: a.city,
            province: a.province,
            country: a.country,
            postal_code: a.postal_code,
        }
    }
}

impl From<AddressDto> for Address {
    fn from(a: AddressDto) -> Self {
        Self {
            street: a.street,
            number: a.number,
            city: a.city,
            province: a.province,
            country: a.country,
            postal_code: a.postal_code,
        }
    }
}

// ============================================================================
// 图片上传
// ============================================================================

/// 图片上传参数
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ImageParams {
    /// true（默认）保存完整下载 URL，false 只保存文件名
    pub with_url: Option<bool>,
}

impl ImageParams {
    pub fn with_url(&self) -> bool {
        self.with_url.unwrap_or(true)
    }
}

/// multipart/form-data 表单，仅用于文档
#[derive(ToSchema)]
#[allow(dead_code)]
pub struct ImageUploadForm {
    /// png / jpg / jpeg
    #[schema(value_type = String, format = Binary)]
    pub file: Vec<u8>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(number: u32, total: u64) -> Page<i32> {
        Page::new(vec![1, 2], total, &PageRequest::of(number, 2))
    }

    #[test]
    fn test_page_params_defaults() {
        let request = PageParams::default().into_page_request().unwrap();
        assert_eq!(request, PageRequest::default());
    }

    #[test]
    fn test_page_params_validation() {
        let params = PageParams {
            size: Some(0),
            ..PageParams::default()
        };
        assert!(matches!(
            params.into_page_request(),
            Err(ApiError::Validation(_))
        ));

        let params = PageParams {
            direction: Some("up".to_string()),
            ..PageParams::default()
        };
        assert!(params.into_page_request().is_err());
    }

    #[test]
    fn test_page_response_flags() {
        let response: PageResponse<i32> = PageResponse::from_page(page(0, 5));
        assert_eq!(response.total_pages, 3);
        assert_eq!(response.total_page_elements, 2);
        assert!(response.first);
        assert!(!response.last);
        assert_eq!(response.direction, "asc");
    }

    #[test]
    fn test_link_header_keeps_filters() {
        let uri: Uri = "/api/books?publisher=planeta&page=1&size=2".parse().unwrap();
        let link = page_links(&uri, &page(1, 5)).unwrap();
        let link = link.to_str().unwrap();

        assert!(link.contains("</api/books?publisher=planeta&size=2&page=2>; rel=\"next\""));
        assert!(link.contains("</api/books?publisher=planeta&size=2&page=0>; rel=\"prev\""));
        assert!(link.contains("rel=\"first\""));
        assert!(link.contains("</api/books?publisher=planeta&size=2&page=2>; rel=\"last\""));
    }

    #[test]
    fn test_link_header_single_page() {
        let uri: Uri = "/api/books".parse().unwrap();
        let link = page_links(&uri, &page(0, 2)).unwrap();
        let link = link.to_str().unwrap();
        assert!(!link.contains("next"));
        assert!(!link.contains("prev"));
        assert!(link.contains("</api/books?page=0>; rel=\"last\""));
    }
}
