use actix_web::{
    dev::{forward_ready, Payload, Service, ServiceRequest, ServiceResponse, Transform},
    error::InternalError,
    http::header::HeaderMap,
    Error, FromRequest, HttpMessage, HttpRequest, HttpResponse,
};
use error_types::{error_codes, error_types as kinds, ErrorResponse};
use futures::future::{ready, Ready};
use serde::Serialize;
use std::collections::HashSet;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::sync::Arc;

/// Handle of the authenticated caller, set by the upstream auth layer.
pub const USER_HEADER: &str = "X-Auth-User";
/// Display name of the caller. Falls back to the handle.
pub const NAME_HEADER: &str = "X-Auth-Name";
/// Comma-separated group memberships of the caller.
pub const GROUPS_HEADER: &str = "X-Auth-Groups";

/// Already-authenticated caller identity.
///
/// Copied into queue entries at creation time; never re-read afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identity {
    #[serde(rename = "name")]
    pub display_name: String,
    #[serde(rename = "username")]
    pub handle: String,
    #[serde(rename = "isEboard")]
    pub is_privileged: bool,
}

impl Identity {
    pub fn new(display_name: impl Into<String>, handle: impl Into<String>, is_privileged: bool) -> Self {
        Self {
            display_name: display_name.into(),
            handle: handle.into(),
            is_privileged,
        }
    }
}

/// Decides who counts as privileged. Built once at startup.
#[derive(Debug, Clone)]
pub struct IdentityPolicy {
    privileged_group: String,
    privileged_handles: HashSet<String>,
}

impl IdentityPolicy {
    pub fn new<I, S>(privileged_group: impl Into<String>, privileged_handles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            privileged_group: privileged_group.into(),
            privileged_handles: privileged_handles.into_iter().map(Into::into).collect(),
        }
    }

    /// Members of the privileged group and allow-listed handles are privileged.
    pub fn is_privileged<'a>(&self, handle: &str, mut groups: impl Iterator<Item = &'a str>) -> bool {
        self.privileged_handles.contains(handle) || groups.any(|g| g == self.privileged_group)
    }

    /// Builds the caller identity from forwarded headers.
    ///
    /// Returns `None` when the handle header is missing or blank.
    pub fn resolve(&self, headers: &HeaderMap) -> Option<Identity> {
        let header = |name: &str| {
            headers
                .get(name)
                // upstream forwards display names as raw UTF-8
                .and_then(|v| std::str::from_utf8(v.as_bytes()).ok())
                .map(str::trim)
                .filter(|v| !v.is_empty())
        };

        let handle = header(USER_HEADER)?;
        let display_name = header(NAME_HEADER).unwrap_or(handle);
        let groups = header(GROUPS_HEADER).unwrap_or_default();
        let is_privileged = self.is_privileged(handle, groups.split(',').map(str::trim));

        Some(Identity::new(display_name, handle, is_privileged))
    }
}

/// Resolves the forwarded identity and rejects anonymous requests with 401.
#[derive(Clone)]
pub struct IdentityMiddleware {
    policy: Arc<IdentityPolicy>,
}

impl IdentityMiddleware {
    pub fn new(policy: Arc<IdentityPolicy>) -> Self {
        Self { policy }
    }
}

impl<S, B> Transform<S, ServiceRequest> for IdentityMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = IdentityMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(IdentityMiddlewareService {
            service: Rc::new(service),
            policy: self.policy.clone(),
        }))
    }
}

pub struct IdentityMiddlewareService<S> {
    service: Rc<S>,
    policy: Arc<IdentityPolicy>,
}

impl<S, B> Service<ServiceRequest> for IdentityMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();
        let identity = self.policy.resolve(req.headers());

        Box::pin(async move {
            let identity = identity.ok_or_else(|| {
                tracing::warn!(path = %req.path(), "request without forwarded identity rejected");
                unauthorized("missing authenticated identity")
            })?;

            req.extensions_mut().insert(identity);

            service.call(req).await
        })
    }
}

fn unauthorized(message: &str) -> Error {
    let body = ErrorResponse::new(
        "Unauthorized",
        message,
        401,
        kinds::AUTHENTICATION_ERROR,
        error_codes::IDENTITY_MISSING,
    );
    InternalError::from_response(message.to_string(), HttpResponse::Unauthorized().json(body)).into()
}

impl FromRequest for Identity {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        match req.extensions().get::<Identity>() {
            Some(identity) => ready(Ok(identity.clone())),
            None => ready(Err(unauthorized("user not authenticated"))),
        }
    }
}
