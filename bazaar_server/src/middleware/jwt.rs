//! Access token middleware.
//!
//! Reads a `Authorization: Bearer <token>` header, verifies the token and stores the resulting [`JwtClaims`] in the
//! request extensions. Requests without the header pass through untouched, so public routes keep working. Routes that
//! need an account are wrapped in an [`AclMiddlewareFactory`](super::AclMiddlewareFactory) as well, which rejects
//! requests that arrive here without claims.
//!
//! A header that is present but malformed, expired or signed with another key is rejected straight away with 401.

use std::{
    future::{ready, Ready},
    rc::Rc,
    sync::Arc,
};

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header::AUTHORIZATION,
    Error,
    HttpMessage,
};
use futures::future::LocalBoxFuture;
use log::*;

use crate::{
    auth::TokenIssuer,
    errors::{AuthError, ServerError},
};

pub struct JwtMiddlewareFactory {
    issuer: Arc<TokenIssuer>,
}

impl JwtMiddlewareFactory {
    pub fn new(issuer: TokenIssuer) -> Self {
        JwtMiddlewareFactory { issuer: Arc::new(issuer) }
    }
}

impl<S, B> Transform<S, ServiceRequest> for JwtMiddlewareFactory
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Error = Error;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;
    type InitError = ();
    type Response = ServiceResponse<B>;
    type Transform = JwtMiddlewareService<S>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(JwtMiddlewareService { issuer: Arc::clone(&self.issuer), service: Rc::new(service) }))
    }
}

pub struct JwtMiddlewareService<S> {
    issuer: Arc<TokenIssuer>,
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for JwtMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;
    type Response = ServiceResponse<B>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let header = req.headers().get(AUTHORIZATION).map(|v| v.to_str().map(str::to_string));
        let claims = match header {
            None => {
                trace!("🔐️ No access token for {}", req.path());
                None
            },
            Some(Err(e)) => {
                debug!("🔐️ Authorization header is not valid text. {e}");
                let err = ServerError::from(AuthError::PoorlyFormattedToken(e.to_string()));
                return Box::pin(async move { Err(err.into()) });
            },
            Some(Ok(value)) => match bearer_token(&value).map(|t| self.issuer.verify_token(t)) {
                Some(Ok(claims)) => Some(claims),
                Some(Err(e)) => {
                    return Box::pin(async move { Err(ServerError::from(e).into()) });
                },
                None => {
                    let err = AuthError::PoorlyFormattedToken("Expected a Bearer token".into());
                    return Box::pin(async move { Err(ServerError::from(err).into()) });
                },
            },
        };
        if let Some(claims) = claims {
            trace!("🔐️ Access token for {} #{} ✅️", claims.role, claims.sub);
            req.extensions_mut().insert(claims);
        }
        Box::pin(async move { service.call(req).await })
    }
}

fn bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.trim().split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}
