//! Main application entry point (CLI binary).
//!
//! This is a thin wrapper around the `http_requests` library that handles:
//! - Command-line argument parsing
//! - Environment variable loading (.env file)
//! - Logger initialization
//! - User-facing output formatting
//!
//! All request handling is implemented in the library crate.

use std::io::{self, Write};
use std::process;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use reqwest::Method;

use http_requests::config::Opt;
use http_requests::initialization::init_logger_with;
use http_requests::{RequestBuilder, RequestDefaults, RequestError};

fn main() -> Result<()> {
    // Load environment variables from .env file (if it exists)
    // This allows setting HTTP_REQUESTS_* defaults without exporting them
    if dotenvy::dotenv().is_err() {
        if let Ok(exe_path) = std::env::current_exe() {
            if let Some(exe_dir) = exe_path.parent() {
                let env_path = exe_dir.join(".env");
                if env_path.exists() {
                    let _ = dotenvy::from_path(&env_path);
                }
            }
        }
    }

    let opt = Opt::parse();

    init_logger_with(opt.log_level.clone().into(), opt.log_format.clone())
        .context("Failed to initialize logger")?;

    if let Err(e) = run(&opt) {
        eprintln!("http_requests error: {:#}", e);
        process::exit(1);
    }
    Ok(())
}

fn run(opt: &Opt) -> Result<()> {
    let builder = builder_from(opt);

    if opt.head {
        let summary = builder
            .connect(|request| {
                let connection = request.connection()?;
                let mut lines = Vec::new();
                if let Some(status) = connection.status() {
                    lines.push(status.to_string());
                }
                for (name, value) in connection.headers() {
                    lines.push(format!("{name}: {}", value.to_str().unwrap_or("<binary>")));
                }
                Ok::<_, RequestError>(lines.join("\n"))
            })
            .with_context(|| format!("HEAD {} failed", opt.url))?;
        println!("{summary}");
        return Ok(());
    }

    match &opt.output {
        Some(path) => {
            let saved = builder
                .save_to_file(path, None)
                .with_context(|| format!("Failed to save {} to {}", opt.url, path.display()))?;
            println!("Saved {} to {}", opt.url, saved.display());
        }
        None => {
            let body = builder
                .read_bytes(None)
                .with_context(|| format!("Failed to read {}", opt.url))?;
            io::stdout()
                .write_all(&body)
                .context("Failed to write response to stdout")?;
        }
    }
    Ok(())
}

fn builder_from(opt: &Opt) -> RequestBuilder {
    let mut defaults = RequestDefaults::from_env();
    if let Some(limit) = opt.redirect_limit {
        defaults.redirect_limit = limit;
    }
    if let Some(ms) = opt.connect_timeout_ms {
        defaults.connect_timeout = Duration::from_millis(ms);
    }
    if let Some(ms) = opt.read_timeout_ms {
        defaults.read_timeout = Duration::from_millis(ms);
    }

    let mut builder = RequestBuilder::with_defaults(opt.url.as_str(), defaults)
        .gzip(!opt.no_gzip)
        .force_https(opt.force_https);
    if opt.head {
        builder = builder.method(Method::HEAD);
    }

    builder = match &opt.user_agent {
        Some(agent) => builder.user_agent(agent.as_str()),
        None => builder.default_user_agent(),
    };
    if let Some(accept) = &opt.accept {
        builder = builder.accept(accept.as_str());
    }
    builder
}
