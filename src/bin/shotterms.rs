//! shotterms: camera-shot term normalizer CLI
//!
//! Runs the gateway in-process against the configured data directory.

use std::io::{self, IsTerminal, Read};
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde::Serialize;
use shotterms::config::{Config, Secrets};
use shotterms::matcher::synonyms;
use shotterms::{Field, FormFields, ParsedTerms, ShotTerms, TermGateway};

/// Camera-shot term normalizer
#[derive(Parser)]
#[command(name = "shotterms")]
#[command(version)]
#[command(about = "Normalize camera shot descriptions into standard photography terms")]
struct Args {
    /// Config file (default: ~/.shotterms/config.toml, then /etc/shotterms/config.toml)
    #[arg(short, long, env = "SHOTTERMS_CONFIG")]
    config: Option<PathBuf>,

    /// Directory for persisted cache, quota and call log
    #[arg(long, env = "SHOTTERMS_DATA_DIR")]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Normalize a free-form description
    Optimize {
        /// Description (or omit to read from stdin)
        text: Option<String>,
    },

    /// Normalize terms picked individually
    Form {
        #[arg(long)]
        shot_size: Option<String>,
        #[arg(long)]
        angle_height: Option<String>,
        #[arg(long)]
        angle_direction: Option<String>,
        #[arg(long)]
        perspective: Option<String>,
        #[arg(long)]
        lens_type: Option<String>,
        #[arg(long)]
        lighting: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },

    /// Dictionary match only, without cache, quota or inference
    Match {
        /// Description (or omit to read from stdin)
        text: Option<String>,
    },

    /// Show result cache occupancy
    CacheStats,

    /// Drop every cached result
    ClearCache,

    /// Show today's remote quota usage
    Quota,

    /// Forget today's quota usage
    ResetQuota,

    /// Show call statistics over a window of days
    Stats {
        #[arg(short, long, default_value_t = 7)]
        days: u32,
    },

    /// Show call statistics for today
    Today,

    /// Show the most recent calls
    Recent {
        #[arg(short, long, default_value_t = 10)]
        limit: usize,
    },

    /// Drop the call log
    ClearMonitor,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialise tracing (default: warn for CLI; override with RUST_LOG).
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let gateway = build_gateway(&args)?;

    match args.command {
        Command::Optimize { text } => {
            let text = resolve_text(text, "optimize")?;
            print_json(&gateway.optimize(text).await?)?;
        }
        Command::Form {
            shot_size,
            angle_height,
            angle_direction,
            perspective,
            lens_type,
            lighting,
            description,
        } => {
            let fields = form_fields(
                [
                    (Field::ShotSize, shot_size),
                    (Field::AngleHeight, angle_height),
                    (Field::AngleDirection, angle_direction),
                    (Field::Perspective, perspective),
                    (Field::LensType, lens_type),
                    (Field::Lighting, lighting),
                ],
                description,
            )?;
            print_json(&gateway.optimize(fields).await?)?;
        }
        Command::Match { text } => {
            let text = resolve_text(text, "match")?;
            let outcome = gateway.match_text(&text);
            println!("{}", outcome.terms.to_prompt());
            println!(
                "matched {}/{} tokens, confidence {:.2}{}",
                outcome.matched_tokens,
                outcome.total_tokens,
                outcome.confidence(),
                if outcome.is_complex { ", complex" } else { "" }
            );
        }
        Command::CacheStats => print_json(&gateway.cache_stats().await)?,
        Command::ClearCache => {
            gateway.clear_cache().await;
            println!("cache cleared");
        }
        Command::Quota => print_json(&gateway.quota_stats().await)?,
        Command::ResetQuota => {
            gateway.reset_quota().await;
            println!("quota reset");
        }
        Command::Stats { days } => print_json(&gateway.stats(days).await)?,
        Command::Today => print_json(&gateway.today_stats().await)?,
        Command::Recent { limit } => print_json(&gateway.recent_calls(limit).await)?,
        Command::ClearMonitor => {
            gateway.clear_monitor().await;
            println!("call log cleared");
        }
    }

    Ok(())
}

fn build_gateway(args: &Args) -> Result<TermGateway, Box<dyn std::error::Error>> {
    let config = Config::load(args.config.as_deref())?;
    let secrets = Secrets::load()?;

    let mut builder = config.apply(ShotTerms::builder());
    if let Some(dir) = &args.data_dir {
        builder = builder.data_dir(dir.clone());
    }
    if let Some(credential) = secrets.service_credential() {
        builder = builder.service_credential(credential);
    }
    Ok(builder.build()?)
}

/// Resolve each `--field value` against that field's vocabulary.
fn form_fields(
    values: [(Field, Option<String>); 6],
    description: Option<String>,
) -> Result<FormFields, Box<dyn std::error::Error>> {
    let mut terms = ParsedTerms::default();
    for (field, value) in values {
        let Some(value) = value else { continue };
        let term = synonyms::resolve(field, &value).ok_or_else(|| {
            format!(
                "unknown {field} '{value}' (expected one of: {})",
                field.labels().join(", ")
            )
        })?;
        terms.claim(term);
    }
    Ok(FormFields {
        shot_size: terms.shot_size,
        angle_height: terms.angle_height,
        angle_direction: terms.angle_direction,
        perspective: terms.perspective,
        lens_type: terms.lens_type,
        lighting: terms.lighting,
        description,
    })
}

fn print_json<T: Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Resolve text input from an optional CLI argument or stdin.
///
/// - arg only → arg
/// - stdin only → stdin
/// - both → `"{arg}\n{stdin}"`
/// - neither → error
fn resolve_text(arg: Option<String>, command: &str) -> Result<String, Box<dyn std::error::Error>> {
    let stdin_is_pipe = !io::stdin().is_terminal();
    let stdin_text = if stdin_is_pipe {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf)?;
        let trimmed = buf.trim().to_string();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed)
        }
    } else {
        None
    };

    match (arg, stdin_text) {
        (Some(a), Some(s)) => Ok(format!("{a}\n{s}")),
        (Some(a), None) => Ok(a),
        (None, Some(s)) => Ok(s),
        (None, None) => {
            Err(format!("{command}: no input provided (pass text as argument or via stdin)").into())
        }
    }
}
