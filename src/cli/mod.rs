//! # CLI Module
//!
//! Command-line access to route manifests.
//!
//! ## Commands
//!
//! ### `inspect`
//!
//! Print every route with its compiled expression and parameter names:
//!
//! ```bash
//! quest-router inspect --manifest routes.yaml
//! ```
//!
//! ### `resolve`
//!
//! Match a verb and path and print the parameters as JSON, or the status a
//! miss resolves to (`404 Not Found`, `405 Method Not Allowed`):
//!
//! ```bash
//! quest-router resolve --manifest routes.yaml GET /files/a/b/report.pdf
//! ```
//!
//! ### `dispatch`
//!
//! Run a request through the full service. Every controller named in the
//! manifest is served by an echo controller; the `tracing` and `metrics`
//! middleware are always available, `auth` when `--auth-token` (or
//! `QUEST_AUTH_TOKEN`) is set:
//!
//! ```bash
//! quest-router dispatch --manifest routes.yaml -H 'authorization: s3cret' \
//!     --auth-token s3cret --body '{"name":"ada"}' POST /users
//! ```
//!
//! `--log-format` and `--log-level` override `QUEST_LOG_FORMAT` and
//! `QUEST_LOG_LEVEL` for every command.

mod commands;


pub use commands::{execute, run_cli, Cli, Commands, LogFormatArg};
