use crate::hook::RequestInfo;
use crate::trace::FormattedFrame;
use std::borrow::Cow;
use std::fmt::{Display, Formatter};

/// Rendered HTML document that replaces a redirect.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DiagnosticPage(String);

impl DiagnosticPage {
    pub fn new(html: impl Into<String>) -> Self {
        Self(html.into())
    }

    pub fn html(&self) -> &str {
        &self.0
    }

    pub fn into_html(self) -> String {
        self.0
    }
}

impl Display for DiagnosticPage {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Build a diagnostic page for a redirect from the current request to `target`.
///
/// Request data and target are escaped, frame lines are embedded as is (they are markup).
pub fn render(request: &RequestInfo, target: &str, frames: &[FormattedFrame]) -> DiagnosticPage {
    let mut body = String::from(r#"<h2 style="text-align: center;">Redirect</h2>"#);

    body.push_str(&format!(
        r#"<p style="font-weight: bold; text-align: center; margin-bottom: 40px;">{}{} ---> {}</p>"#,
        escape(request.host()),
        escape(request.path()),
        escape(target),
    ));

    body.push_str("<code>");
    body.push_str(&format!(
        r#"<div style="text-align: center; margin-bottom: 40px;"><a class="button button-primary" href="{}">Continue</a></div>"#,
        escape(target)
    ));
    for frame in frames {
        body.push_str(&format!(
            r#"<p style="margin-bottom: 8px; margin-top: 8px;">{frame}</p>"#
        ));
    }
    body.push_str("</code>");

    DiagnosticPage(format!(
        "<!DOCTYPE html>\n<html><head><meta charset=\"utf-8\"><title>Redirect</title></head><body>{body}</body></html>\n"
    ))
}

fn escape(s: &str) -> Cow<'_, str> {
    if !s.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(s);
    }

    let mut escaped = String::with_capacity(s.len() + 8);
    for c in s.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }
    Cow::Owned(escaped)
}
