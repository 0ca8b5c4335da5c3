//! axum integration: redirects issued by handlers go through [`RedirectHooks`].

use crate::error::Error;
use crate::hook::{Flow, RedirectHooks, RequestInfo};
use axum::async_trait;
use axum::extract::{FromRef, FromRequestParts, OriginalUri};
use axum::http::request::Parts;
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::Router;
use log::{info, warn};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

/// Extractor used by handlers instead of returning `axum::response::Redirect` directly.
pub struct Redirector {
    hooks: Arc<RedirectHooks>,
    request: RequestInfo,
}

#[async_trait]
impl<S> FromRequestParts<S> for Redirector
where
    Arc<RedirectHooks>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self {
            hooks: Arc::<RedirectHooks>::from_ref(state),
            request: request_info(parts),
        })
    }
}

impl Redirector {
    pub fn request(&self) -> &RequestInfo {
        &self.request
    }

    /// Redirect to `location` unless one of the redirect filters halts the request.
    #[inline(never)]
    pub fn to(&self, location: impl Into<String>) -> Response {
        match self.hooks.dispatch(&self.request, location) {
            Flow::Continue(location) => found(&location),
            Flow::Halt(page) => {
                (StatusCode::INTERNAL_SERVER_ERROR, Html(page.into_html())).into_response()
            }
        }
    }
}

fn found(location: &str) -> Response {
    match HeaderValue::try_from(location) {
        Ok(value) => (StatusCode::FOUND, [(header::LOCATION, value)]).into_response(),
        Err(e) => {
            warn!(target: "redirect", "invalid redirect location {location:?}: {e}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

fn request_info(parts: &Parts) -> RequestInfo {
    // nested routers strip the matched prefix from `parts.uri`
    let uri = parts
        .extensions
        .get::<OriginalUri>()
        .map(|original| &original.0)
        .unwrap_or(&parts.uri);

    let host = parts
        .headers
        .get(header::HOST)
        .and_then(|host| host.to_str().ok())
        .or_else(|| uri.authority().map(|authority| authority.as_str()))
        .unwrap_or_default();

    let path = uri
        .path_and_query()
        .map(|path| path.as_str())
        .unwrap_or("/");

    RequestInfo::new(host, path)
}

/// Serve `router` until the process is stopped.
pub async fn serve(addr: SocketAddr, router: Router) -> Result<(), Error> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(target: "redirect", "listening on {}", listener.local_addr()?);
    axum::serve(listener, router).await?;
    Ok(())
}
