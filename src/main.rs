//! SKI Engine - CLI

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use owo_colors::OwoColorize;
use serde::Serialize;
use ski_engine::engine::EngineError;
use ski_engine::util::config::{load_config, load_user_config};
use ski_engine::util::logger::{self, LogLevel};
use ski_engine::util::span::excerpt;
use ski_engine::{run_file, Environment, Expr, NAME, VERSION};
use std::path::PathBuf;
use std::process::ExitCode;

/// Combinatory logic workbench
#[derive(Parser, Debug)]
#[command(name = "ski")]
#[command(version = VERSION)]
#[command(about = NAME, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (defaults to the user-level config)
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Reduce a program stored in a file
    Run {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Reduce an expression
    Eval {
        #[arg(value_name = "CODE")]
        code: String,

        /// Step budget (overrides the config)
        #[arg(short, long)]
        steps: Option<usize>,

        /// Print every intermediate form
        #[arg(short, long)]
        trace: bool,
    },

    /// Infer arity and canonical lambda form
    Infer {
        #[arg(value_name = "CODE")]
        code: String,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Simplify into lambda form step by step
    Lambda {
        #[arg(value_name = "CODE")]
        code: String,
    },

    /// Convert into S/K/I combinators step by step
    Ski {
        #[arg(value_name = "CODE")]
        code: String,
    },

    /// Compare two expressions structurally
    Equals {
        #[arg(value_name = "A")]
        left: String,
        #[arg(value_name = "B")]
        right: String,
    },

    /// Print the definitions of a program in dependency order
    Declare {
        #[arg(value_name = "CODE")]
        code: String,
    },

    /// Print version information
    Version,
}

#[derive(Debug, Serialize)]
struct InferReport {
    expr: String,
    normal: bool,
    proper: bool,
    arity: usize,
    discard: Vec<usize>,
    duplicate: Vec<usize>,
    canonical: Option<String>,
    steps: usize,
}

fn main() -> Result<ExitCode> {
    let args = Args::parse();

    if args.verbose {
        logger::init_with_level(LogLevel::Debug);
        eprintln!("{} version: {}", NAME, VERSION);
    } else {
        logger::init();
    }

    let config = match &args.config {
        Some(path) => load_config(path)
            .with_context(|| format!("Failed to load config: {}", path.display()))?,
        None => load_user_config().context("Failed to load user config")?,
    };
    let format = config.format_options();
    let mut env = Environment::with_options(config.infer_options());

    match args.command {
        Commands::Run { file } => {
            let run = run_file(&file, &config)?;
            println!("{}", run.expr.format(&format));
            if !run.is_final {
                return Ok(budget_exhausted(run.steps));
            }
        }
        Commands::Eval { code, steps, trace } => {
            let expr = parse_code(&mut env, &code)?;
            let budget = steps.unwrap_or(config.reduce.max_steps);
            if trace {
                let mut last = None;
                for state in expr.walk(budget) {
                    println!("{:>4}  {}", state.steps.dimmed(), state.expr.format(&format));
                    last = Some(state);
                }
                if let Some(state) = last.filter(|s| !s.is_final) {
                    return Ok(budget_exhausted(state.steps));
                }
            } else {
                let run = expr.run(budget);
                println!("{}", run.expr.format(&format));
                if !run.is_final {
                    return Ok(budget_exhausted(run.steps));
                }
            }
        }
        Commands::Infer { code, json } => {
            let expr = parse_code(&mut env, &code)?;
            let inference = expr.infer(config.infer_options());
            let report = InferReport {
                expr: expr.format(&format),
                normal: inference.normal,
                proper: inference.proper,
                arity: inference.arity,
                discard: inference.discard.clone(),
                duplicate: inference.duplicate.clone(),
                canonical: inference.expr.as_ref().map(|e| e.format(&format)),
                steps: inference.steps,
            };
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_report(&report);
            }
        }
        Commands::Lambda { code } => {
            let expr = parse_code(&mut env, &code)?;
            for step in expr.to_lambda(config.infer_options()) {
                let step = step?;
                println!("{:>4}  {}", step.steps.dimmed(), step.expr.format(&format));
            }
        }
        Commands::Ski { code } => {
            let expr = parse_code(&mut env, &code)?;
            for step in expr.to_ski(config.infer_options()) {
                let marker = if step.is_final { "=" } else { " " };
                println!("{:>4}{} {}", step.steps.dimmed(), marker, step.expr.format(&format));
            }
        }
        Commands::Equals { left, right } => {
            let left = parse_code(&mut env, &left)?;
            let right = parse_code(&mut env, &right)?;
            match left.diff(&right) {
                None => println!("{}", "equal".green()),
                Some(diff) => {
                    println!("{} {}", "different:".red(), diff);
                    return Ok(ExitCode::FAILURE);
                }
            }
        }
        Commands::Declare { code } => {
            parse_code(&mut env, &code)?;
            for line in env.declare() {
                println!("{};", line);
            }
        }
        Commands::Version => {
            println!("{} {}", NAME, VERSION);
        }
    }

    Ok(ExitCode::SUCCESS)
}

/// 解析失败时附上出错行
fn parse_code(
    env: &mut Environment,
    code: &str,
) -> Result<Expr> {
    env.parse(code).map_err(|err| {
        let snippet = match &err {
            EngineError::Parse(parse) => excerpt(code, parse.position()),
            _ => None,
        };
        match snippet {
            Some(snippet) => anyhow!("{}\n{}", err, snippet),
            None => anyhow!(err),
        }
    })
}

fn budget_exhausted(steps: usize) -> ExitCode {
    eprintln!("{} after {} steps", "budget exhausted".yellow(), steps);
    ExitCode::from(2)
}

fn print_report(report: &InferReport) {
    let status = if report.normal {
        "normal".green().to_string()
    } else {
        "no normal form".red().to_string()
    };
    println!("{}: {}", report.expr.bold(), status);
    println!("  arity:     {}", report.arity);
    println!("  proper:    {}", report.proper);
    println!("  discard:   {:?}", report.discard);
    println!("  duplicate: {:?}", report.duplicate);
    if let Some(canonical) = &report.canonical {
        println!("  canonical: {}", canonical);
    }
    println!("  steps:     {}", report.steps);
}
