use anyhow::anyhow;
use colored::Colorize;
use std::io;
use std::time::Duration;
use tracing_subscriber::{
    fmt::{self, time::ChronoUtc},
    prelude::*,
    EnvFilter,
};

/// Install the global subscriber. `RUST_LOG` wins over the built-in filter.
pub fn init_logging(verbose: bool) -> anyhow::Result<()> {
    let filter = if verbose {
        "debug,orders_backend=trace,actix_web=debug"
    } else {
        "info,orders_backend=info,actix_web=info"
    };

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(filter))
        .map_err(|e| anyhow!("invalid log filter: {}", e))?;

    let use_ansi = atty::is(atty::Stream::Stdout);
    colored::control::set_override(use_ansi);
    let fmt_layer = fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_timer(ChronoUtc::rfc_3339())
        .with_ansi(use_ansi)
        .with_writer(io::stdout);

    // actix-web's Logger emits through the `log` crate
    let _ = tracing_log::LogTracer::init();

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init();

    tracing::info!("PID={} starting up", std::process::id());
    Ok(())
}

/// Version string: package version plus short git sha when the build had one.
pub fn build_version() -> String {
    let version = env!("CARGO_PKG_VERSION");
    match option_env!("VERGEN_GIT_SHA") {
        Some(sha) => format!("{}+{}", version, sha.chars().take(8).collect::<String>()),
        None => version.to_string(),
    }
}

pub fn print_build_info() {
    let name = env!("CARGO_PKG_NAME");
    let build_timestamp = option_env!("VERGEN_BUILD_TIMESTAMP").unwrap_or("unknown");
    let git_branch = option_env!("VERGEN_GIT_BRANCH").unwrap_or("no-git");
    let profile = option_env!("VERGEN_CARGO_DEBUG")
        .map(|debug| if debug == "true" { "debug" } else { "release" })
        .unwrap_or("unknown");
    let desc = option_env!("APP_PKG_DESCRIPTION").unwrap_or("");

    println!("{}", "═".repeat(60).dimmed());
    println!("{} v{}", name.bold().cyan(), build_version().bold());
    if !desc.is_empty() {
        println!("{}", desc);
    }
    println!("{}", "─".repeat(60).dimmed());
    println!("Build:   {} ({})", build_timestamp, profile);
    println!("Branch:  {}", git_branch);
    println!("{}", "═".repeat(60).dimmed());
    println!();
}

pub fn log_server_startup(host: &str, port: u16) {
    tracing::info!("🚀 Server starting on http://{}:{}", host, port);
    tracing::info!("📖 API docs at http://{}:{}/docs", host, port);
}

pub fn log_command_start(command: &str, description: &str) {
    tracing::info!("⚡ Executing: {} ({})", command, description);
}

pub fn log_command_complete(command: &str, success: bool, duration: Duration) {
    if success {
        tracing::info!("✅ Command '{}' completed in {:.2?}", command, duration);
    } else {
        tracing::error!("❌ Command '{}' failed after {:.2?}", command, duration);
    }
}
