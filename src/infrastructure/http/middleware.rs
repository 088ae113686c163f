//! HTTP Middleware
//!
//! - 状态码错误日志
//! - 内容协商：`Accept: application/xml` 时把 JSON 响应转换为 XML

use axum::{
    body::{to_bytes, Body},
    extract::Request,
    http::{header, HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};

/// XML 响应的根元素
const XML_ROOT: &str = "response";

/// HTTP 状态码错误日志中间件
///
/// 拦截 HTTP 响应，当状态码为 4xx 或 5xx 时记录日志
pub async fn error_logging_middleware(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();

    let response = next.run(request).await;
    let status = response.status();

    if status.is_server_error() {
        tracing::error!(
            method = %method,
            uri = %uri,
            status = %status.as_u16(),
            "HTTP server error"
        );
    } else if status.is_client_error() {
        tracing::warn!(
            method = %method,
            uri = %uri,
            status = %status.as_u16(),
            "HTTP client error"
        );
    }

    response
}

/// 客户端是否要求 XML（优先于 JSON 出现时）
fn wants_xml(headers: &HeaderMap) -> bool {
    let Some(accept) = headers.get(header::ACCEPT).and_then(|v| v.to_str().ok()) else {
        return false;
    };
    let position = |needle: &str| accept.find(needle);
    let xml = position("application/xml").or_else(|| position("text/xml"));
    match (xml, position("application/json")) {
        (Some(xml), Some(json)) => xml < json,
        (Some(_), None) => true,
        _ => false,
    }
}

fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("application/json"))
}

/// JSON → XML 内容协商中间件
///
/// 只转换 JSON 响应体；转换失败时保留原 JSON 响应
pub async fn xml_negotiation_middleware(request: Request, next: Next) -> Response {
    let xml_requested = wants_xml(request.headers());
    let response = next.run(request).await;

    if !xml_requested || !is_json(response.headers()) {
        return response;
    }

    let (mut parts, body) = response.into_parts();
    let bytes = match to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::error!(error = %e, "Failed to buffer response body for XML conversion");
            return Response::from_parts(parts, Body::empty());
        }
    };

    let xml = serde_json::from_slice::<serde_json::Value>(&bytes)
        .map_err(|e| e.to_string())
        .and_then(|value| {
            quick_xml::se::to_string_with_root(XML_ROOT, &value).map_err(|e| e.to_string())
        });

    match xml {
        Ok(xml) => {
            parts.headers.remove(header::CONTENT_LENGTH);
            parts.headers.insert(
                header::CONTENT_TYPE,
                HeaderValue::from_static("application/xml"),
            );
            Response::from_parts(parts, Body::from(xml))
        }
        Err(e) => {
            tracing::warn!(error = %e, "Failed to convert response to XML, returning JSON");
            Response::from_parts(parts, Body::from(bytes))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request as HttpRequest, StatusCode},
        routing::get,
        Json, Router,
    };
    use tower::util::ServiceExt;

    async fn ok_handler() -> &'static str {
        "OK"
    }

    async fn json_handler() -> Json<serde_json::Value> {
        Json(serde_json::json!({"errno": 0, "error": "", "data": {"name": "Planeta", "active": true}}))
    }

    async fn not_found_handler() -> StatusCode {
        StatusCode::NOT_FOUND
    }

    async fn error_handler() -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }

    fn create_test_router() -> Router {
        Router::new()
            .route("/ok", get(ok_handler))
            .route("/json", get(json_handler))
            .route("/not-found", get(not_found_handler))
            .route("/error", get(error_handler))
            .layer(axum::middleware::from_fn(xml_negotiation_middleware))
            .layer(axum::middleware::from_fn(error_logging_middleware))
    }

    async fn body_string(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_ok_response_no_log() {
        let app = create_test_router();
        let request = HttpRequest::builder().uri("/ok").body(Body::empty()).unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_error_statuses_pass_through() {
        let app = create_test_router();
        let request = HttpRequest::builder()
            .uri("/not-found")
            .body(Body::empty())
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let request = HttpRequest::builder().uri("/error").body(Body::empty()).unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_json_by_default() {
        let app = create_test_router();
        let request = HttpRequest::builder().uri("/json").body(Body::empty()).unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert!(is_json(response.headers()));
        assert!(body_string(response).await.starts_with('{'));
    }

    #[tokio::test]
    async fn test_xml_when_requested() {
        let app = create_test_router();
        let request = HttpRequest::builder()
            .uri("/json")
            .header(header::ACCEPT, "application/xml")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/xml"
        );
        let body = body_string(response).await;
        assert!(body.starts_with("<response>"));
        assert!(body.contains("<name>Planeta</name>"));
        assert!(body.contains("<active>true</active>"));
    }

    #[tokio::test]
    async fn test_non_json_untouched() {
        let app = create_test_router();
        let request = HttpRequest::builder()
            .uri("/ok")
            .header(header::ACCEPT, "text/xml")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(body_string(response).await, "OK");
    }

    #[test]
    fn test_accept_preference() {
        let mut headers = HeaderMap::new();
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json, application/xml"));
        assert!(!wants_xml(&headers));
        headers.insert(header::ACCEPT, HeaderValue::from_static("text/xml;q=0.9"));
        assert!(wants_xml(&headers));
    }
}
