//! SKI Engine
//!
//! Combinatory logic and lambda terms: construction, normal-order reduction,
//! alpha-aware comparison, arity inference, lambda simplification,
//! bracket abstraction and combinator search.
//!
//! # Example
//!
//! ```
//! use ski_engine::{Environment, FreeVar, Expr};
//!
//! let mut env = Environment::new();
//! let skk = env.parse("S K K").unwrap();
//! let x = FreeVar::new("x");
//! let run = skk.apply([Expr::var(x.clone())]).run(5);
//! assert!(run.is_final);
//! assert_eq!(run.expr.as_var(), Some(&x));
//! ```

#![warn(rust_2018_idioms)]

// Public modules
pub mod engine;
pub mod frontend;

// Utility modules
pub mod util;

// Re-exports
pub use engine::{
    Control, EngineError, Expr, FormatOptions, FreeVar, InferOptions, Inference, Node, Run,
    Scope, SearchOptions,
};
pub use frontend::{parse, Environment, ParseError};

use crate::util::config::EngineConfig;
use anyhow::Context;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Engine version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Engine name
pub const NAME: &str = "SKI Engine";

/// Parse a program and reduce its value within the configured budget
///
/// # Example
///
/// ```
/// use ski_engine::{run, util::config::EngineConfig};
///
/// let result = run("T = C I; T x y", &EngineConfig::default()).unwrap();
/// assert_eq!(result.expr.to_string(), "y x");
/// ```
pub fn run(
    source: &str,
    config: &EngineConfig,
) -> engine::Result<Run> {
    debug!("run called ({} bytes)", source.len());
    let mut env = Environment::with_options(config.infer_options());
    let expr = env.parse(source)?;
    Ok(expr.run(config.reduce.max_steps))
}

/// Run a program stored in a file
pub fn run_file(
    path: &Path,
    config: &EngineConfig,
) -> anyhow::Result<Run> {
    debug!("reading {}", path.display());
    let source = fs::read_to_string(path)
        .with_context(|| format!("Failed to read file: {}", path.display()))?;
    run(&source, config).with_context(|| format!("Failed to evaluate: {}", path.display()))
}
