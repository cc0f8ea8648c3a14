use anyhow::Context as _;
use clap::{Parser, Subcommand};
use dotenv::dotenv;
use permit_rs::config::Settings;
use permit_rs::expression::{self, Context};
use permit_rs::rules::{RuleValidator, RulesLoader};
use serde_json::Value;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Maximum expression length in characters (0 disables the bound)
    #[arg(long, global = true)]
    max_length: Option<usize>,

    /// Maximum nesting depth of parentheses and '!' (0 disables the bound)
    #[arg(long, global = true)]
    max_depth: Option<usize>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Evaluate an expression against a context
    Eval {
        /// The expression to evaluate
        #[arg(short, long)]
        expr: String,

        /// JSON or YAML file holding the context object
        #[arg(short, long)]
        context: Option<PathBuf>,

        /// Inline JSON context object
        #[arg(long, conflicts_with = "context")]
        context_json: Option<String>,
    },
    /// Check that an expression is syntactically valid
    Validate {
        #[arg(short, long)]
        expr: String,
    },
    /// Print the parsed expression, fully parenthesized
    Parse {
        #[arg(short, long)]
        expr: String,
    },
    /// Validate every expression in a rules file
    Check {
        /// Path to the rules file
        #[arg(short, long)]
        file: PathBuf,
    },
    /// Serve the HTTP API
    Serve {
        #[arg(short, long)]
        port: Option<u16>,

        /// Rules file backing /api/permissions/check
        #[arg(short, long)]
        rules: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    dotenv().ok();
    env_logger::init();

    let args = Args::parse();

    let mut settings = Settings::from_env()?;
    if let Some(max) = args.max_length {
        settings.limits.max_length = (max > 0).then_some(max);
    }
    if let Some(max) = args.max_depth {
        settings.limits.max_depth = (max > 0).then_some(max);
    }

    match args.command {
        Commands::Eval {
            expr,
            context,
            context_json,
        } => {
            let ctx = match (context, context_json) {
                (Some(path), _) => load_context(&path)?,
                (None, Some(raw)) => {
                    let value: Value =
                        serde_json::from_str(&raw).context("--context-json is not valid JSON")?;
                    Context::try_from(value)?
                }
                (None, None) => Context::new(),
            };
            let result = expression::evaluate_with(&expr, &ctx, &settings.limits);
            println!("{}", serde_json::to_string_pretty(&result)?);
            Ok(exit_code(result.success))
        }
        Commands::Validate { expr } => {
            let result = expression::validate_with(&expr, &settings.limits);
            println!("{}", serde_json::to_string_pretty(&result)?);
            Ok(exit_code(result.success))
        }
        Commands::Parse { expr } => match expression::compile_with(&expr, &settings.limits) {
            Ok(ast) => {
                println!("{}", ast);
                Ok(ExitCode::SUCCESS)
            }
            Err(e) => {
                eprintln!("{}", e);
                Ok(ExitCode::FAILURE)
            }
        },
        Commands::Check { file } => {
            let rules = RulesLoader::new().load_rules(&file)?;
            let issues = RuleValidator::with_limits(settings.limits).validate(&rules);
            if issues.is_empty() {
                println!("{}: OK", file.display());
                return Ok(ExitCode::SUCCESS);
            }
            for issue in &issues {
                println!("{}\n", issue);
            }
            println!("{}: {} issue(s)", file.display(), issues.len());
            Ok(ExitCode::FAILURE)
        }
        Commands::Serve { port, rules } => {
            if let Some(port) = port {
                settings.port = port;
            }
            if rules.is_some() {
                settings.rules_file = rules;
            }
            permit_rs::server::serve(settings).await?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn exit_code(success: bool) -> ExitCode {
    if success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

/// `.json` files are read as JSON, anything else as YAML
fn load_context(path: &Path) -> anyhow::Result<Context> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read context file {}", path.display()))?;
    let value: Value = if path.extension().is_some_and(|ext| ext == "json") {
        serde_json::from_str(&content)?
    } else {
        serde_yaml::from_str(&content)?
    };
    Ok(Context::try_from(value)?)
}
