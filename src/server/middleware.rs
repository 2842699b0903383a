//! Response middleware

use axum::{
    extract::Request,
    http::{header::CONTENT_TYPE, HeaderValue},
    middleware::Next,
    response::Response,
};

/// Tag every response as JSON, whatever the handler produced
///
/// Overwrites any content type the handler or the framework set, including
/// on 404 and 405 responses.
pub async fn json_content_type(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    response
}
