//! Authentication middleware resolving the caller for each request.
//!
//! The `Authorization: Bearer <token>` header is handed to a
//! [`PrincipalResolver`]; a resolved [`Principal`] is stored in the request
//! extensions where the `Caller` extractor picks it up. Anonymous requests
//! pass through untouched so public routes keep working; handlers decide
//! whether a caller is required. Resolver failures short-circuit with the
//! failure envelope.

use std::rc::Rc;
use std::sync::Arc;
use std::task::{Context, Poll};

use actix_web::body::EitherBody;
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::header::AUTHORIZATION;
use actix_web::{Error, HttpMessage as _};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use tracing::debug;

use crate::domain::Principal;
use crate::domain::ports::{PrincipalResolver, bearer_token};

/// Middleware attaching the resolved caller to each request.
///
/// # Examples
/// ```
/// use std::sync::Arc;
///
/// use actix_web::App;
/// use vaultke::domain::ports::FixturePrincipalResolver;
/// use vaultke::domain::{Principal, Role};
/// use vaultke::middleware::Authenticate;
///
/// let resolver = FixturePrincipalResolver::new(Principal::new("test-user-123", Role::User));
/// let app = App::new().wrap(Authenticate::new(Arc::new(resolver)));
/// ```
#[derive(Clone)]
pub struct Authenticate {
    resolver: Arc<dyn PrincipalResolver>,
}

impl Authenticate {
    /// Resolve callers through `resolver`.
    pub fn new(resolver: Arc<dyn PrincipalResolver>) -> Self {
        Self { resolver }
    }
}

impl<S, B> Transform<S, ServiceRequest> for Authenticate
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = AuthenticateMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthenticateMiddleware {
            service: Rc::new(service),
            resolver: Arc::clone(&self.resolver),
        }))
    }
}

/// Service wrapper produced by [`Authenticate`].
pub struct AuthenticateMiddleware<S> {
    service: Rc<S>,
    resolver: Arc<dyn PrincipalResolver>,
}

impl<S, B> Service<ServiceRequest> for AuthenticateMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let resolver = Arc::clone(&self.resolver);
        let token = req
            .headers()
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(bearer_token)
            .map(str::to_owned);
        Box::pin(async move {
            match resolver.resolve(token.as_deref()).await {
                Ok(Some(principal)) => {
                    debug!(user_id = principal.user_id(), "caller resolved");
                    req.extensions_mut().insert::<Principal>(principal);
                }
                Ok(None) => debug!(token_present = token.is_some(), "anonymous request"),
                Err(err) => return Ok(req.error_response(err).map_into_right_body()),
            }
            service
                .call(req)
                .await
                .map(ServiceResponse::map_into_left_body)
        })
    }
}
