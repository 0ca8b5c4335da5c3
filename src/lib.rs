//! Stop HTTP redirects and show the call chain that issued them.
//!
//! A [`intercept::RedirectInterceptor`] is installed as the last filter of a
//! [`hook::RedirectHooks`] chain. When a front-end request redirects, the interceptor captures
//! the call stack, renders it with [`trace::TraceFormatter`] and halts the request with a
//! diagnostic page instead of the redirect.

pub mod capture;
pub mod config;
pub mod error;
pub mod hook;
pub mod intercept;
pub mod page;
pub mod trace;
pub mod web;

pub use error::Error;
