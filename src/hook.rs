use crate::page::DiagnosticPage;
use log::debug;
use std::sync::atomic::{AtomicBool, Ordering};

/// Priority for ordinary URL rewriting filters.
pub const DEFAULT_PRIORITY: i32 = 10;
/// Priority for filters that must see the final redirect destination.
pub const LATE_PRIORITY: i32 = 9999;

/// Result of a redirect filter.
#[derive(Debug, PartialEq, Eq)]
pub enum Flow {
    /// Redirect to the (possibly rewritten) location.
    Continue(String),
    /// Stop the request and respond with a page, the redirect is never issued.
    Halt(DiagnosticPage),
}

/// Data of a request that issues a redirect.
#[derive(Debug, Default)]
pub struct RequestInfo {
    host: String,
    path: String,
    halted: AtomicBool,
}

impl RequestInfo {
    /// # Arguments
    ///
    /// * `host`: value of `Host` header
    /// * `path`: request path with query string
    pub fn new(host: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            path: path.into(),
            halted: AtomicBool::new(false),
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn is_halted(&self) -> bool {
        self.halted.load(Ordering::SeqCst)
    }

    /// Mark request as halted. Return `false` if it was already halted before.
    pub fn try_halt(&self) -> bool {
        !self.halted.swap(true, Ordering::SeqCst)
    }
}

pub trait RedirectFilter: Send + Sync {
    fn filter(&self, request: &RequestInfo, location: String) -> Flow;
}

impl<F> RedirectFilter for F
where
    F: Fn(&RequestInfo, String) -> Flow + Send + Sync,
{
    fn filter(&self, request: &RequestInfo, location: String) -> Flow {
        self(request, location)
    }
}

/// Ordered chain of redirect filters.
///
/// Filters run in ascending priority order, filters with equal priority run in
/// registration order.
#[derive(Default)]
pub struct RedirectHooks {
    filters: Vec<(i32, Box<dyn RedirectFilter>)>,
}

impl RedirectHooks {
    pub fn register(&mut self, priority: i32, filter: impl RedirectFilter + 'static) {
        let pos = self.filters.partition_point(|(p, _)| *p <= priority);
        self.filters.insert(pos, (priority, Box::new(filter)));
        debug!(target: "hook", "redirect filter registered with priority {priority}");
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Pass `location` through all filters, stop at the first one that halts the request.
    #[inline(never)]
    pub fn dispatch(&self, request: &RequestInfo, location: impl Into<String>) -> Flow {
        let mut location = location.into();
        for (priority, filter) in &self.filters {
            match filter.filter(request, location) {
                Flow::Continue(next) => location = next,
                halt @ Flow::Halt(_) => {
                    debug!(target: "hook", "request halted by filter with priority {priority}");
                    return halt;
                }
            }
        }
        Flow::Continue(location)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn append(suffix: &'static str) -> impl Fn(&RequestInfo, String) -> Flow + Send + Sync {
        move |_: &RequestInfo, location: String| Flow::Continue(format!("{location}{suffix}"))
    }

    #[test]
    fn test_dispatch_order() {
        let mut hooks = RedirectHooks::default();
        hooks.register(LATE_PRIORITY, append("-late"));
        hooks.register(DEFAULT_PRIORITY, append("-a"));
        hooks.register(DEFAULT_PRIORITY, append("-b"));
        hooks.register(1, append("-early"));
        assert_eq!(hooks.len(), 4);

        let flow = hooks.dispatch(&RequestInfo::new("example.com", "/"), "/to");
        assert_eq!(flow, Flow::Continue("/to-early-a-b-late".to_string()));
    }

    #[test]
    fn test_dispatch_stops_on_halt() {
        let mut hooks = RedirectHooks::default();
        hooks.register(DEFAULT_PRIORITY, |_: &RequestInfo, _: String| {
            Flow::Halt(DiagnosticPage::new("stop"))
        });
        hooks.register(LATE_PRIORITY, |_: &RequestInfo, _: String| -> Flow {
            panic!("filter after halt must not run")
        });

        let flow = hooks.dispatch(&RequestInfo::new("example.com", "/"), "/to");
        assert_eq!(flow, Flow::Halt(DiagnosticPage::new("stop")));
    }

    #[test]
    fn test_empty_chain() {
        let hooks = RedirectHooks::default();
        assert!(hooks.is_empty());
        let flow = hooks.dispatch(&RequestInfo::new("example.com", "/"), "/to");
        assert_eq!(flow, Flow::Continue("/to".to_string()));
    }

    #[test]
    fn test_single_shot_halt() {
        let request = RequestInfo::new("example.com", "/old");
        assert!(!request.is_halted());
        assert!(request.try_halt());
        assert!(!request.try_halt());
        assert!(request.is_halted());
    }
}
