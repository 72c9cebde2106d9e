//! Request lifecycle instrumentation.
//!
//! Wraps every route: before dispatch it stamps a start instant and raises
//! the in-flight gauge, after the inner service resolves it records the
//! request counter and duration histogram. The gauge is balanced by an RAII
//! guard, so a handler error or a dropped request future cannot leak an
//! increment.

use crate::metrics::{Metrics, ENDPOINT_UNKNOWN};
use actix_web::body::MessageBody;
use actix_web::dev;
use futures_util::future;
use futures_util::future::LocalBoxFuture;
use std::time::Instant;

/// Holds one unit of `http_requests_active`; gives it back on drop.
struct InFlightGuard {
    metrics: Metrics,
}

impl InFlightGuard {
    fn new(metrics: Metrics) -> Self {
        metrics.inc_active();
        Self { metrics }
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.metrics.dec_active();
    }
}

#[derive(Clone)]
pub struct HttpMetrics {
    metrics: Metrics,
}

impl HttpMetrics {
    pub fn new(metrics: Metrics) -> Self {
        Self { metrics }
    }
}

impl<S, B> dev::Transform<S, dev::ServiceRequest> for HttpMetrics
where
    S: dev::Service<
        dev::ServiceRequest,
        Response = dev::ServiceResponse<B>,
        Error = actix_web::Error,
    >,
    S::Future: 'static,
    B: MessageBody + 'static,
{
    type Response = dev::ServiceResponse<B>;
    type Error = actix_web::Error;
    type Transform = HttpMetricsMiddleware<S>;
    type InitError = ();
    type Future = future::Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        future::ok(HttpMetricsMiddleware {
            service,
            metrics: self.metrics.clone(),
        })
    }
}

pub struct HttpMetricsMiddleware<S> {
    service: S,
    metrics: Metrics,
}

impl<S, B> dev::Service<dev::ServiceRequest> for HttpMetricsMiddleware<S>
where
    S: dev::Service<
        dev::ServiceRequest,
        Response = dev::ServiceResponse<B>,
        Error = actix_web::Error,
    >,
    S::Future: 'static,
    B: MessageBody + 'static,
{
    type Response = dev::ServiceResponse<B>;
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    dev::forward_ready!(service);

    fn call(&self, req: dev::ServiceRequest) -> Self::Future {
        let metrics = self.metrics.clone();
        let method = req.method().to_string();
        let endpoint = req
            .match_pattern()
            .unwrap_or_else(|| ENDPOINT_UNKNOWN.to_string());
        let guard = InFlightGuard::new(metrics.clone());
        let start = Instant::now();

        let fut = self.service.call(req);

        Box::pin(async move {
            let _guard = guard;
            let result = fut.await;

            let status = match &result {
                Ok(res) => res.status(),
                Err(err) => err.as_response_error().status_code(),
            };
            metrics.observe_request(&method, &endpoint, status.as_u16(), start.elapsed());

            result
        })
    }
}
