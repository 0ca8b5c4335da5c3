use crate::capture::{BacktraceCapture, StackCapture};
use crate::config::TraceConfig;
use crate::hook::{Flow, RedirectFilter, RedirectHooks, RequestInfo, LATE_PRIORITY};
use crate::page;
use crate::trace::TraceFormatter;
use log::{debug, info};
use std::sync::Arc;

/// Predicate that tells back-office (administrative) requests apart.
pub trait BackOfficeCheck: Send + Sync {
    fn is_back_office(&self, request: &RequestInfo) -> bool;
}

impl<F> BackOfficeCheck for F
where
    F: Fn(&RequestInfo) -> bool + Send + Sync,
{
    fn is_back_office(&self, request: &RequestInfo) -> bool {
        self(request)
    }
}

/// Request is a back-office one if its path lies under a prefix, e.g. `/admin`.
#[derive(Clone, Debug)]
pub struct PathPrefixCheck {
    prefix: String,
}

impl PathPrefixCheck {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into().trim_end_matches('/').to_string(),
        }
    }
}

impl BackOfficeCheck for PathPrefixCheck {
    fn is_back_office(&self, request: &RequestInfo) -> bool {
        if self.prefix.is_empty() {
            return false;
        }
        match request.path().strip_prefix(self.prefix.as_str()) {
            Some(rest) => rest.is_empty() || rest.starts_with(['/', '?', '#']),
            None => false,
        }
    }
}

/// Redirect filter that stops a redirect and shows where it came from.
pub struct RedirectInterceptor {
    formatter: TraceFormatter,
    back_office: Arc<dyn BackOfficeCheck>,
    capture: Arc<dyn StackCapture>,
}

impl RedirectInterceptor {
    /// Decide what happens to a redirect to `target`.
    ///
    /// Back-office requests and requests that were already halted once pass through unchanged.
    /// Any other request is halted with a page containing the current call stack.
    #[inline(never)]
    pub fn on_redirect(&self, request: &RequestInfo, target: String) -> Flow {
        if self.back_office.is_back_office(request) {
            debug!(target: "redirect", "back-office request {}, pass {target}", request.path());
            return Flow::Continue(target);
        }

        if !request.try_halt() {
            debug!(target: "redirect", "request {} already halted, pass {target}", request.path());
            return Flow::Continue(target);
        }

        let frames = self.capture.capture();
        let trace = self.formatter.format(&frames);

        info!(
            target: "redirect",
            "redirect halted: {}{} ---> {target} ({} frames)",
            request.host(),
            request.path(),
            trace.len()
        );

        Flow::Halt(page::render(request, &target, &trace))
    }

    /// Register interceptor as the last filter of a redirect chain.
    pub fn install(self, hooks: &mut RedirectHooks) {
        hooks.register(LATE_PRIORITY, self);
    }
}

impl RedirectFilter for RedirectInterceptor {
    fn filter(&self, request: &RequestInfo, location: String) -> Flow {
        self.on_redirect(request, location)
    }
}

#[derive(Default)]
pub struct InterceptorBuilder {
    config: TraceConfig,
    back_office: Option<Arc<dyn BackOfficeCheck>>,
    capture: Option<Arc<dyn StackCapture>>,
}

impl InterceptorBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(self, config: TraceConfig) -> Self {
        Self { config, ..self }
    }

    /// Use custom back-office predicate instead of [`PathPrefixCheck`] built from config.
    pub fn with_back_office(self, check: impl BackOfficeCheck + 'static) -> Self {
        Self {
            back_office: Some(Arc::new(check)),
            ..self
        }
    }

    /// Use custom stack source instead of [`BacktraceCapture`].
    pub fn with_capture(self, capture: impl StackCapture + 'static) -> Self {
        Self {
            capture: Some(Arc::new(capture)),
            ..self
        }
    }

    pub fn build(self) -> RedirectInterceptor {
        let back_office = self
            .back_office
            .unwrap_or_else(|| Arc::new(PathPrefixCheck::new(self.config.admin_prefix.as_str())));
        let capture = self
            .capture
            .unwrap_or_else(|| Arc::new(BacktraceCapture));

        RedirectInterceptor {
            formatter: TraceFormatter::new(&self.config),
            back_office,
            capture,
        }
    }
}
