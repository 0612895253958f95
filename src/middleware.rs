//! Middleware turning unauthorized responses into sign-in redirects.

use std::future::{Ready, ready};

use actix_web::body::EitherBody;
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready};
use actix_web::http::StatusCode;
use actix_web::http::header;
use actix_web::{Error, HttpResponse};
use futures_util::future::LocalBoxFuture;

/// Rewrites any `401 Unauthorized` coming out of the wrapped scope into a
/// `303 See Other` pointing at the sign-in page. API scopes stay unwrapped
/// so they keep returning bare status codes.
pub struct RedirectUnauthorized {
    target: &'static str,
}

impl RedirectUnauthorized {
    /// Redirects to the given sign-in path instead of the staff one.
    pub fn to(target: &'static str) -> Self {
        Self { target }
    }
}

impl Default for RedirectUnauthorized {
    fn default() -> Self {
        Self {
            target: "/auth/signin",
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for RedirectUnauthorized
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = RedirectUnauthorizedMiddleware<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RedirectUnauthorizedMiddleware {
            service,
            target: self.target,
        }))
    }
}

pub struct RedirectUnauthorizedMiddleware<S> {
    service: S,
    target: &'static str,
}

impl<S, B> Service<ServiceRequest> for RedirectUnauthorizedMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let target = self.target;
        // Extractor failures surface as errors, not responses, so the
        // request is kept around to synthesize the redirect for them.
        let (http_req, payload) = req.into_parts();
        let fut = self
            .service
            .call(ServiceRequest::from_parts(http_req.clone(), payload));

        Box::pin(async move {
            match fut.await {
                Ok(res) if res.status() == StatusCode::UNAUTHORIZED => {
                    let redirect = signin_redirect(target).map_into_right_body();
                    Ok(ServiceResponse::new(res.into_parts().0, redirect))
                }
                Ok(res) => Ok(res.map_into_left_body()),
                Err(err)
                    if err.as_response_error().status_code() == StatusCode::UNAUTHORIZED =>
                {
                    let redirect = signin_redirect(target).map_into_right_body();
                    Ok(ServiceResponse::new(http_req, redirect))
                }
                Err(err) => Err(err),
            }
        })
    }
}

fn signin_redirect(target: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, target))
        .finish()
}
