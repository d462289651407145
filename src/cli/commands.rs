use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{anyhow, Context};
use clap::{Parser, Subcommand, ValueEnum};
use http::Method;
use serde_json::{json, Value};

use crate::dispatcher::{Dispatcher, Request};
use crate::echo::register_echo;
use crate::error::reason_phrase;
use crate::logging::{init_logging, LogConfig, LogFormat};
use crate::manifest::RouteManifest;
use crate::middleware::{AuthMiddleware, MetricsMiddleware, TracingMiddleware};
use crate::registry::Registry;
use crate::runtime_config::RuntimeConfig;
use crate::service::AppService;

/// Command-line interface for quest-router
///
/// Loads a route manifest and inspects, resolves or dispatches against it.
#[derive(Debug, Parser)]
#[command(name = "quest-router")]
#[command(version, long_about = None)]
#[command(about = "Inspect and exercise quest-router route manifests")]
pub struct Cli {
    /// Log output format (overrides QUEST_LOG_FORMAT)
    #[arg(long, global = true, value_enum)]
    pub log_format: Option<LogFormatArg>,

    /// Log level (overrides QUEST_LOG_LEVEL)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormatArg {
    Json,
    Pretty,
}

impl From<LogFormatArg> for LogFormat {
    fn from(arg: LogFormatArg) -> Self {
        match arg {
            LogFormatArg::Json => LogFormat::Json,
            LogFormatArg::Pretty => LogFormat::Pretty,
        }
    }
}

/// Available CLI commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List every route with its compiled expression and parameter names
    Inspect {
        /// Route manifest (YAML, TOML or JSON)
        #[arg(short, long)]
        manifest: PathBuf,
    },
    /// Match a verb and path and print the extracted parameters
    Resolve {
        #[arg(short, long)]
        manifest: PathBuf,
        /// HTTP verb, e.g. GET
        method: String,
        path: String,
    },
    /// Run a request through the full service with echo controllers
    Dispatch {
        #[arg(short, long)]
        manifest: PathBuf,
        method: String,
        path: String,
        /// Request header as `name: value` (repeatable)
        #[arg(short = 'H', long = "header")]
        headers: Vec<String>,
        /// JSON request body
        #[arg(long)]
        body: Option<String>,
        /// Token accepted by the `auth` middleware
        #[arg(long, env = "QUEST_AUTH_TOKEN")]
        auth_token: Option<String>,
    },
}

/// Parse arguments, initialise logging and run the command against stdout.
pub fn run_cli() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut log_config = LogConfig::from_env();
    if let Some(format) = cli.log_format {
        log_config.format = format.into();
    }
    if let Some(level) = &cli.log_level {
        log_config.log_level = level.clone();
    }
    init_logging(&log_config)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    execute(&cli.command, &mut out)
}

/// Run `command`, writing its output to `out`.
pub fn execute(command: &Commands, out: &mut impl Write) -> anyhow::Result<()> {
    match command {
        Commands::Inspect { manifest } => inspect(manifest, out),
        Commands::Resolve {
            manifest,
            method,
            path,
        } => resolve(manifest, method, path, out),
        Commands::Dispatch {
            manifest,
            method,
            path,
            headers,
            body,
            auth_token,
        } => {
            let mut request = Request::new(parse_verb(method)?, path.as_str());
            for header in headers {
                let (name, value) = header
                    .split_once(':')
                    .ok_or_else(|| anyhow!("header `{header}` is not `name: value`"))?;
                request = request.with_header(name.trim(), value.trim());
            }
            if let Some(body) = body {
                let body: Value = serde_json::from_str(body).context("--body is not valid JSON")?;
                request = request.with_body(body);
            }
            dispatch(manifest, request, auth_token.as_deref(), out)
        }
    }
}

fn inspect(manifest: &Path, out: &mut impl Write) -> anyhow::Result<()> {
    let manifest = RouteManifest::load(manifest)?;
    let router = manifest.build_router()?;

    for entry in router.entries() {
        let params: Vec<String> = entry
            .pattern()
            .param_names()
            .iter()
            .map(ToString::to_string)
            .collect();
        writeln!(
            out,
            "{} {} -> {}",
            entry.method(),
            entry.pattern().raw(),
            entry.handler()
        )?;
        writeln!(out, "    expression: {}", entry.pattern().expression())?;
        writeln!(out, "    params:     [{}]", params.join(", "))?;
        if !entry.middleware().is_empty() {
            writeln!(out, "    middleware: {:?}", entry.middleware())?;
        }
    }
    for (status, handler) in &manifest.errors {
        writeln!(out, "ERROR {status} -> {handler}")?;
    }
    if !manifest.middleware.is_empty() {
        writeln!(out, "GLOBAL middleware: {}", manifest.middleware.join(", "))?;
    }
    Ok(())
}

fn resolve(manifest: &Path, method: &str, path: &str, out: &mut impl Write) -> anyhow::Result<()> {
    let router = RouteManifest::load(manifest)?.build_router()?;
    let dispatcher = Dispatcher::new(router, Registry::new());

    match dispatcher.resolve(&parse_verb(method)?, path) {
        Ok(found) => {
            let report = json!({
                "route": format!("{} {}", found.entry.method(), found.entry.pattern().raw()),
                "handler": found.entry.handler().to_string(),
                "params": found.params,
            });
            writeln!(out, "{}", serde_json::to_string_pretty(&report)?)?;
        }
        Err(err) => writeln!(out, "{} {}", err.status(), reason_phrase(err.status()))?,
    }
    Ok(())
}

fn dispatch(
    manifest: &Path,
    request: Request,
    auth_token: Option<&str>,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    let manifest = RouteManifest::load(manifest)?;
    let router = manifest.build_router()?;

    let mut registry = Registry::new();
    let handler_types = manifest.handler_types();
    register_echo(&mut registry, handler_types.iter().map(String::as_str));
    registry.register_middleware("tracing", || Ok(Arc::new(TracingMiddleware)));
    registry.register_shared_middleware("metrics", Arc::new(MetricsMiddleware::new()));
    if let Some(token) = auth_token {
        registry.register_shared_middleware("auth", Arc::new(AuthMiddleware::new(token)));
    }

    let mut dispatcher = Dispatcher::with_config(router, registry, RuntimeConfig::from_env());
    for middleware in manifest.global_middleware() {
        dispatcher.add_middleware(middleware);
    }

    let response = AppService::new(dispatcher).handle(request);
    let status = response.status;
    writeln!(out, "{status} {}", reason_phrase(status))?;
    let body = match &response.body {
        Value::String(text) => text.clone(),
        other => serde_json::to_string_pretty(other)?,
    };
    writeln!(out, "{body}")?;
    Ok(())
}

fn parse_verb(method: &str) -> anyhow::Result<Method> {
    Method::from_bytes(method.trim().to_ascii_uppercase().as_bytes())
        .map_err(|_| anyhow!("`{method}` is not a valid HTTP method"))
}
