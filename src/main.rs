use axum::response::Response;
use axum::routing::get;
use axum::Router;
use clap::Parser;
use redirect_trace::config::TraceConfig;
use redirect_trace::hook::{Flow, RedirectHooks, RequestInfo, DEFAULT_PRIORITY};
use redirect_trace::intercept::InterceptorBuilder;
use redirect_trace::web::{self, Redirector};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

/// Demo application with redirect tracing enabled.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Address to listen on.
    #[arg(long, default_value = "127.0.0.1:8080")]
    listen: SocketAddr,

    /// Path to config file, `$HOME/.config/redirect-trace/config.toml` is used by default.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Path prefix of back-office requests, overrides config value.
    #[arg(long, env = "REDIRECT_TRACE_ADMIN_PREFIX")]
    admin_prefix: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut config = TraceConfig::from_file(args.config.as_deref())?;
    if let Some(prefix) = args.admin_prefix {
        config.admin_prefix = prefix;
    }
    config.validate()?;

    let mut hooks = RedirectHooks::default();
    hooks.register(DEFAULT_PRIORITY, leading_slash);
    InterceptorBuilder::new()
        .with_config(config.clone())
        .build()
        .install(&mut hooks);

    let mut app = Router::new()
        .route("/", get(index))
        .route("/old", get(legacy::old_page))
        .route("/new", get(new_page));
    let admin = config.admin_prefix.trim_matches('/');
    if !admin.is_empty() {
        app = app.route(&format!("/{admin}/old"), get(legacy::old_page));
    }
    let app = app.with_state(Arc::new(hooks));

    web::serve(args.listen, app).await?;
    Ok(())
}

/// Relative redirect targets are resolved against site root.
fn leading_slash(_: &RequestInfo, location: String) -> Flow {
    if location.starts_with('/') || location.contains("://") {
        Flow::Continue(location)
    } else {
        Flow::Continue(format!("/{location}"))
    }
}

async fn index() -> &'static str {
    "open /old to see a halted redirect, back-office pages under the admin prefix redirect as usual\n"
}

async fn new_page() -> &'static str {
    "redirected\n"
}

mod legacy {
    use super::*;

    pub async fn old_page(redirector: Redirector) -> Response {
        moved(&redirector, "old")
    }

    #[inline(never)]
    fn moved(redirector: &Redirector, slug: &str) -> Response {
        let target = match slug {
            "old" => "new",
            other => other,
        };
        send(redirector, target)
    }

    #[inline(never)]
    fn send(redirector: &Redirector, target: &str) -> Response {
        redirector.to(target)
    }
}
