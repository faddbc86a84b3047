//! rusty-reddit/crates/rr-api/src/middleware.rs Middleware
//!
//! Access logging, CORS and security headers applied around every route.

use actix_cors::Cors;
use actix_web::http::{header, Method};
use actix_web::middleware::{DefaultHeaders, Logger};

/// Access log in the combined format. Lines are emitted through the `log`
/// facade, which the binary bridges into `tracing`.
pub fn standard_middleware() -> Logger {
    Logger::new(r#"%a "%r" %s %b "%{Referer}i" "%{User-Agent}i" %Dms"#)
}

// Configures CORS (Cross-Origin Resource Sharing)
pub fn cors_policy() -> Cors {
    Cors::default()
        .allow_any_origin()
        .allowed_methods(vec![Method::GET, Method::POST, Method::PUT, Method::PATCH, Method::DELETE])
        .allowed_headers(vec![header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        .max_age(3600)
}

pub fn security_headers() -> DefaultHeaders {
    DefaultHeaders::new()
        .add((header::X_CONTENT_TYPE_OPTIONS, "nosniff"))
        .add((header::REFERRER_POLICY, "strict-origin-when-cross-origin"))
}
