//! # snare-cli
//!
//! Command-line interface for evaluating script expressions against a
//! remote storefront sandbox.

#![deny(unsafe_code)]

use anyhow::{Context, Result};
use clap::Parser;

use snare_auth::{dwjson, storage, CredentialResolver, DwJson};
use snare_runtime::{EvaluationOptions, EvaluationRequest, EvaluatorConfig, ScriptEvaluator};
use snare_settings::SnareSettings;

/// Evaluate a script expression on a remote storefront sandbox.
#[derive(Parser, Debug)]
#[command(name = "snare", version, about = "Remote storefront script evaluation")]
struct Cli {
    /// Expression to evaluate, e.g. `dw.system.System.getInstanceType()`.
    expression: String,

    /// Site id to trigger execution on (overrides settings).
    #[arg(long)]
    site: Option<String>,

    /// Locale for the trigger retry route, e.g. `en_US`.
    #[arg(long)]
    locale: Option<String>,

    /// Overall evaluation timeout in milliseconds.
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Absolute server script path to break in, skipping cartridge
    /// detection.
    #[arg(long)]
    script_path: Option<String>,

    /// Line number within `--script-path` (requires it).
    #[arg(long, requires = "script_path")]
    line: Option<u32>,

    /// Emit the full result as JSON instead of plain text.
    #[arg(long)]
    json: bool,
}

/// Fill settings gaps from a project `dw.json`, which commonly carries the
/// sandbox hostname and code version alongside credentials.
fn merge_dw_json(settings: &mut SnareSettings, dw: &DwJson) {
    if settings.sandbox.hostname.trim().is_empty() && !dw.hostname.trim().is_empty() {
        settings.sandbox.hostname = dw.hostname.clone();
    }
    if settings.sandbox.code_version.trim().is_empty() {
        if let Some(code_version) = &dw.code_version {
            settings.sandbox.code_version = code_version.clone();
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();

    let mut settings = snare_settings::load_settings().unwrap_or_default();
    snare_core::logging::init_subscriber(&settings.logging.level);

    let dw = dwjson::load_project_dw_json();
    if let Some(dw) = &dw {
        merge_dw_json(&mut settings, dw);
    }
    if let Some(site) = &args.site {
        settings.sandbox.site_id = site.clone();
    }

    // Seed the global singleton with the fully merged view; everything past
    // this point reads through it.
    let _ = snare_settings::init_settings(settings);
    let settings = snare_settings::get_settings();

    let auth_path = storage::auth_file_path(&storage::data_dir());
    let credentials = CredentialResolver::resolve(&auth_path, dw.as_ref())
        .context("Failed to resolve sandbox credentials")?;
    let config = EvaluatorConfig::from_settings(settings, &credentials)
        .context("Incomplete sandbox configuration")?;
    tracing::debug!(
        site_id = %config.site_id,
        code_version = %config.code_version,
        "sandbox configuration resolved"
    );

    let evaluator = ScriptEvaluator::new(config);
    let request = EvaluationRequest::new(args.expression).with_options(EvaluationOptions {
        timeout_ms: args.timeout_ms,
        site_id: None,
        locale: args.locale,
        script_path: args.script_path,
        line: args.line,
    });
    let result = evaluator.evaluate(request).await;
    evaluator.shutdown().await;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        for warning in &result.warnings {
            eprintln!("warning: {warning}");
        }
        if result.success {
            println!("{}", result.result.as_deref().unwrap_or("undefined"));
        } else {
            eprintln!("error: {}", result.error.as_deref().unwrap_or("unknown"));
            for hint in &result.guidance {
                eprintln!("  hint: {hint}");
            }
        }
    }

    if result.success {
        Ok(())
    } else {
        std::process::exit(1);
    }
}
