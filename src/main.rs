//! Rule-driven PDF redaction CLI.
//!
//! Rules are read as JSON (a bare array or `{"rules": [...]}`). Logs go to
//! stderr; `plan` and `tokens` write JSON to stdout.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::Level;

use rule_redactor::config::{parse_level, Config};
use rule_redactor::storage::driver_from_config;
use rule_redactor::{parse_rules, FillColor, RedactionResult, RedactionService, Rule};

/// Rule-driven PDF redaction tool
///
/// Resolves declarative redaction rules against each page's text and
/// physically removes the covered text.
#[derive(Parser)]
#[command(name = "rule-redactor")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, env = "REDACTOR_LOG", value_name = "LEVEL")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply rules to a PDF and write the redacted copy
    Redact {
        /// Input PDF file path
        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,

        /// Output PDF file path
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,

        /// Rules JSON file ('-' for stdin)
        #[arg(short, long, value_name = "FILE")]
        rules: PathBuf,

        /// Colour of the opaque mark
        #[arg(long, default_value = "black", value_name = "COLOR")]
        fill: FillColor,
    },

    /// Resolve rules without modifying the PDF and print the targets as JSON
    Plan {
        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,

        #[arg(short, long, value_name = "FILE")]
        rules: PathBuf,
    },

    /// Print each page's extracted tokens and font spans as JSON
    Tokens {
        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,
    },

    /// Download a document from storage, redact it and upload it back
    RedactUri {
        /// Source URI, `<scheme>://<bucket>/<path>`
        #[arg(short, long, value_name = "URI")]
        uri: String,

        #[arg(short, long, value_name = "FILE")]
        rules: PathBuf,

        #[arg(long, default_value = "black", value_name = "COLOR")]
        fill: FillColor,

        #[arg(long, env = "STORAGE_DRIVER", value_name = "DRIVER")]
        storage_driver: Option<String>,

        #[arg(long, env = "LOCAL_STORAGE_PATH", value_name = "DIR")]
        local_storage_path: Option<PathBuf>,

        #[arg(long, env = "REDACTOR_WORK_DIR", value_name = "DIR")]
        work_dir: Option<PathBuf>,
    },
}

fn init_logging(verbose: bool, level: Option<&str>) -> Result<()> {
    let level = match (verbose, level) {
        (true, _) => Level::DEBUG,
        (false, Some(raw)) => parse_level(raw)?,
        (false, None) => Level::INFO,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
    Ok(())
}

fn load_rules(path: &Path) -> Result<Vec<Rule>> {
    let json = if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read rules from stdin")?;
        buf
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read rules from {}", path.display()))?
    };
    parse_rules(&json).context("Invalid rule document")
}

fn report(result: &RedactionResult, output: &str) {
    println!("Redaction Summary:");
    println!("  Pages processed: {}", result.pages_processed);
    println!("  Pages modified:  {}", result.pages_modified);
    println!("  Instances redacted: {}", result.instances_redacted);
    println!("  Text replacements:  {}", result.text_replacements);
    println!("  Rules skipped:      {}", result.rules_skipped);
    println!(
        "  Secure: {}",
        if result.secure { "Yes" } else { "No (visual only)" }
    );

    if result.has_redactions() {
        println!(
            "✓ Successfully redacted {} instance(s) → {}",
            result.instances_redacted, output
        );
    } else {
        println!("⚠ No instances found to redact");
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.log_level.as_deref())?;

    match cli.command {
        Commands::Redact {
            input,
            output,
            rules,
            fill,
        } => {
            if !input.exists() {
                anyhow::bail!("Input file does not exist: {}", input.display());
            }
            let rules = load_rules(&rules)?;
            let result = RedactionService::new()
                .with_fill(fill)
                .redact(&input, &output, &rules)
                .with_context(|| "Redaction failed")?;
            report(&result, &output.display().to_string());
        }
        Commands::Plan { input, rules } => {
            let rules = load_rules(&rules)?;
            let plan = RedactionService::new()
                .plan(&input, &rules)
                .with_context(|| "Rule resolution failed")?;
            println!("{}", serde_json::to_string_pretty(&plan)?);
        }
        Commands::Tokens { input } => {
            let pages = RedactionService::new()
                .tokens(&input)
                .with_context(|| "Text extraction failed")?;
            println!("{}", serde_json::to_string_pretty(&pages)?);
        }
        Commands::RedactUri {
            uri,
            rules,
            fill,
            storage_driver,
            local_storage_path,
            work_dir,
        } => {
            let mut config = Config::from_env().context("Invalid environment configuration")?;
            if let Some(driver) = storage_driver {
                config.storage_driver = driver.trim().to_ascii_lowercase();
            }
            if let Some(path) = local_storage_path {
                config.local_storage_path = path;
            }
            if let Some(dir) = work_dir {
                config.work_dir = dir;
            }

            let rules = load_rules(&rules)?;
            let storage = driver_from_config(&config)?;
            let (uri, result) = RedactionService::new()
                .with_fill(fill)
                .redact_uri(storage.as_ref(), &uri, &rules, &config.work_dir)
                .with_context(|| format!("Redaction of {} failed", uri))?;
            report(&result, &uri);
        }
    }

    Ok(())
}
