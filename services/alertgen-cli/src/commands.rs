//! Subcommand implementations.

use std::error::Error;
use std::sync::Arc;

use alertgen_core::{
    Alert, AlertSink, AlertgenConfig, CancelHandle, CoreError, Priority, RunOptions,
    ScenarioResult, Severity,
};
use alertgen_scenarios::ScenarioEngine;
use alertgen_sinks::get_sink;
use chrono::Utc;
use clap::Args;
use tracing::{info, warn};

/// Provider connection flags shared by `send` and `scenario run`.
#[derive(Args, Debug)]
pub struct ProviderArgs {
    /// Alert provider (opsgenie, pagerduty, mock)
    #[arg(long)]
    pub provider: Option<String>,

    /// Provider API key or routing key
    #[arg(long, env = "ALERTGEN_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Override the provider's default endpoint
    #[arg(long)]
    pub endpoint: Option<String>,
}

#[derive(Args, Debug)]
pub struct SendArgs {
    #[command(flatten)]
    pub provider: ProviderArgs,

    /// Alert severity (info, warning, error, critical)
    #[arg(long, default_value = "warning")]
    pub severity: String,

    /// Alert priority (low, medium, high, critical)
    #[arg(long, default_value = "medium")]
    pub priority: String,

    /// Alert message
    #[arg(long, default_value = "Test alert")]
    pub message: String,

    /// Alert source
    #[arg(long, default_value = "alertgen")]
    pub source: String,
}

#[derive(Args, Debug)]
pub struct RunArgs {
    #[command(flatten)]
    pub provider: ProviderArgs,

    /// Scenario name
    #[arg(long)]
    pub name: Option<String>,

    /// Number of alerts to send
    #[arg(long)]
    pub count: Option<usize>,

    /// Interval between alerts in milliseconds
    #[arg(long)]
    pub interval: Option<u64>,

    /// Number of concurrent workers (random and mixed scenarios)
    #[arg(long)]
    pub concurrency: Option<usize>,

    /// Scenario parameter as key=value (repeatable)
    #[arg(long = "param", value_parser = parse_param)]
    pub params: Vec<(String, String)>,
}

fn parse_param(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.trim().to_string()))
        }
        _ => Err(format!("expected key=value, got `{raw}`")),
    }
}

/// Builds the sink from flags, falling back to configuration.
fn build_sink(
    args: &ProviderArgs,
    config: &AlertgenConfig,
) -> Result<Arc<dyn AlertSink>, CoreError> {
    let provider = args
        .provider
        .as_deref()
        .or(config.provider.name.as_deref())
        .ok_or_else(|| {
            CoreError::ValidationError(
                "no provider given; pass --provider or set provider.name".to_string(),
            )
        })?;

    let api_key = args
        .api_key
        .as_deref()
        .or(config.provider.api_key.as_deref())
        .unwrap_or_default();
    if api_key.is_empty() && !provider.eq_ignore_ascii_case("mock") {
        return Err(CoreError::ValidationError(format!(
            "provider `{provider}` needs an API key; pass --api-key or set ALERTGEN_API_KEY"
        )));
    }

    let endpoint = args
        .endpoint
        .as_deref()
        .or(config.provider.endpoint.as_deref());

    get_sink(
        provider,
        api_key,
        endpoint,
        config.provider.request_timeout(),
    )
}

pub async fn send_alert(args: SendArgs, config: &AlertgenConfig) -> Result<(), Box<dyn Error>> {
    let severity: Severity = args.severity.parse()?;
    let priority: Priority = args.priority.parse()?;
    let sink = build_sink(&args.provider, config)?;

    let alert = Alert::new(
        format!("alert-{}", Utc::now().timestamp()),
        args.message,
        severity,
        priority,
        args.source,
    );

    match sink.send(&alert).await {
        Ok(()) => {
            println!("✅ Alert sent to {}", sink.name());
            println!("  ID: {}", alert.id);
            println!("  Severity: {}", alert.severity);
            println!("  Priority: {}", alert.priority);
            Ok(())
        }
        Err(e) => {
            eprintln!("❌ Failed to send alert: {}", e);
            Err(e.into())
        }
    }
}

/// Merges flags over the configured run defaults.
fn run_options(args: &RunArgs, config: &AlertgenConfig) -> RunOptions {
    let defaults = &config.run;
    let mut options = RunOptions::new(
        args.count.unwrap_or(defaults.count),
        args.interval.unwrap_or(defaults.interval_ms),
        args.concurrency.unwrap_or(defaults.concurrency),
    );
    for (key, value) in &args.params {
        options = options.with_param(key.clone(), value.clone());
    }
    options
}

pub async fn run_scenario(args: RunArgs, config: &AlertgenConfig) -> Result<(), Box<dyn Error>> {
    let engine = ScenarioEngine::with_builtin();
    let name = args.name.as_deref().unwrap_or(&config.run.scenario);
    // Resolve the scenario before building a sink so typos fail fast.
    engine.registry().lookup(name)?;

    let sink = build_sink(&args.provider, config)?;
    let options = run_options(&args, config);

    let (handle, signal) = CancelHandle::new();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received, cancelling run");
            handle.cancel();
        }
    });

    println!("🚀 Running scenario '{}' against {}", name, sink.name());
    println!(
        "  Count: {}  Interval: {}ms  Concurrency: {}",
        options.count, options.interval_ms, options.concurrency
    );

    match engine.run(name, sink, &options, signal).await {
        Ok(result) => {
            println!("\n✅ Scenario complete!");
            print_summary(&result);
            Ok(())
        }
        Err(e) => {
            if let Some(partial) = e.partial_result() {
                println!("\n⚠️  Scenario cancelled");
                print_summary(partial);
            } else {
                eprintln!("\n❌ Scenario failed: {}", e);
            }
            Err(e.into())
        }
    }
}

pub fn list_scenarios() {
    let engine = ScenarioEngine::with_builtin();
    println!("Available scenarios:");
    for descriptor in engine.list_scenarios() {
        println!("- {}: {}", descriptor.name, descriptor.description);
    }
}

pub fn print_version() {
    println!("alertgen {}", env!("CARGO_PKG_VERSION"));
    println!("  Build date: {}", option_env!("ALERTGEN_BUILD_DATE").unwrap_or("unknown"));
    println!("  Git commit: {}", option_env!("ALERTGEN_GIT_COMMIT").unwrap_or("unknown"));
}

fn print_summary(result: &ScenarioResult) {
    info!(sent = result.sent, failed = result.failed, "run summary");
    for line in summary_lines(result) {
        println!("{line}");
    }
}

fn summary_lines(result: &ScenarioResult) -> Vec<String> {
    vec![
        format!("  Alerts sent: {}", result.sent),
        format!("  Alerts failed: {}", result.failed),
        format!("  Duration: {:.2}s", result.duration.as_secs_f64()),
        format!("  Rate: {:.2} alerts/sec", result.rate),
    ]
}
