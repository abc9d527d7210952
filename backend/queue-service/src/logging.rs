use tracing_subscriber::{fmt, EnvFilter};

/// `RUST_LOG` wins over the default filter; `LOG_FORMAT=json` switches to JSON lines.
pub fn init_tracing() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,actix_web=warn"));

    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        fmt().with_env_filter(env_filter).json().with_target(false).init();
    } else {
        fmt().with_env_filter(env_filter).with_target(false).init();
    }
}
