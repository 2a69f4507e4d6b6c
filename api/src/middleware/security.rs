//! Security middleware for HTTPS enforcement and response hardening.
//!
//! Every response is tagged with an `x-request-id` (echoed from the request when the
//! client sent one) and marked `no-store`, since bodies carry bearer tokens. In
//! production plain-HTTP requests are refused and HSTS is added.

use actix_web::{
    body::EitherBody,
    dev::{Service, ServiceRequest, ServiceResponse, Transform},
    http::header::{self, HeaderName, HeaderValue},
    Error, HttpResponse,
};
use futures_util::future::LocalBoxFuture;
use std::{
    future::{ready, Ready},
    net::IpAddr,
    rc::Rc,
    task::{Context, Poll},
};
use tracing::warn;
use uuid::Uuid;

use tk_shared::{error_codes, Environment, ErrorResponse};

/// Request correlation header
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Security middleware factory
#[derive(Debug, Clone, Copy)]
pub struct SecurityMiddleware {
    enforce_https: bool,
}

impl SecurityMiddleware {
    /// HTTPS is enforced in production only
    pub fn new(environment: Environment) -> Self {
        Self {
            enforce_https: environment.is_production(),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for SecurityMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = SecurityMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(SecurityMiddlewareService {
            service: Rc::new(service),
            enforce_https: self.enforce_https,
        }))
    }
}

/// Security middleware service implementation
pub struct SecurityMiddlewareService<S> {
    service: Rc<S>,
    enforce_https: bool,
}

impl<S, B> Service<ServiceRequest> for SecurityMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, ctx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let enforce_https = self.enforce_https;
        let request_id = request_id(&req);

        Box::pin(async move {
            if enforce_https && !is_secure_request(&req) {
                warn!(method = %req.method(), path = %req.path(), "Insecure request blocked");
                let response = HttpResponse::Forbidden()
                    .json(ErrorResponse::new(error_codes::FORBIDDEN, "HTTPS required"));
                let mut res = req.into_response(response).map_into_right_body();
                add_response_headers(&mut res, &request_id, enforce_https);
                return Ok(res);
            }

            let mut res = service.call(req).await?.map_into_left_body();
            add_response_headers(&mut res, &request_id, enforce_https);
            Ok(res)
        })
    }
}

/// Client supplied request id, or a fresh one
fn request_id(req: &ServiceRequest) -> HeaderValue {
    req.headers()
        .get(REQUEST_ID_HEADER)
        .filter(|value| !value.is_empty() && value.len() <= 128)
        .cloned()
        .or_else(|| HeaderValue::from_str(&Uuid::new_v4().to_string()).ok())
        .unwrap_or_else(|| HeaderValue::from_static("unknown"))
}

/// HTTPS, as seen directly or through `Forwarded`/`X-Forwarded-Proto`; loopback hosts are exempt
fn is_secure_request(req: &ServiceRequest) -> bool {
    let conn_info = req.connection_info();
    if conn_info.scheme() == "https" {
        return true;
    }

    is_loopback_host(conn_info.host())
}

/// `localhost` or a loopback address, with or without a port
fn is_loopback_host(host: &str) -> bool {
    let name = match host.strip_prefix('[') {
        Some(bracketed) => bracketed.split(']').next().unwrap_or(bracketed),
        None => match host.rsplit_once(':') {
            Some((name, port))
                if !name.contains(':') && port.bytes().all(|b| b.is_ascii_digit()) =>
            {
                name
            }
            _ => host,
        },
    };

    name.eq_ignore_ascii_case("localhost")
        || name.parse::<IpAddr>().map_or(false, |ip| ip.is_loopback())
}

fn add_response_headers<B>(response: &mut ServiceResponse<B>, request_id: &HeaderValue, hsts: bool) {
    let headers = response.headers_mut();

    headers.insert(HeaderName::from_static(REQUEST_ID_HEADER), request_id.clone());
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    headers.insert(header::X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff"));
    headers.insert(header::X_FRAME_OPTIONS, HeaderValue::from_static("DENY"));
    headers.insert(
        header::REFERRER_POLICY,
        HeaderValue::from_static("no-referrer"),
    );

    if hsts {
        headers.insert(
            header::STRICT_TRANSPORT_SECURITY,
            HeaderValue::from_static("max-age=31536000; includeSubDomains"),
        );
    }
}
