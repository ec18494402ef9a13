//! The Tally compiler driver.
//!
//! Ties the stages together behind [`compile`] and [`check`]:
//!
//! source → parse → desugar → extract → infer/specialize → lower → resolve
//! → generate
//!
//! - [`session`]: per-compilation state, options and the combined error type
//! - [`config`]: invocation signatures and TOML primitive tables
//! - [`diagnostics`]: ariadne reports and JSON output for errors

pub mod config;
pub mod diagnostics;
pub mod session;

use std::sync::Once;

pub use config::{load_primitives, parse_primitives, parse_signature, ConfigError};
pub use session::{check, compile, Checked, CompileError, CompileOptions, Compilation, Session};
pub use tally_codegen::LiteralTagging;

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for debug output.
///
/// Only installs a subscriber when `RUST_LOG` is set, e.g.
/// `RUST_LOG=tally_typeck=debug`. Safe to call multiple times.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            let _ = tracing_subscriber::registry()
                .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
                .with(filter)
                .try_init();
        }
    });
}
