//! Status command implementation

use colored::*;
use kotonoha_core::config::Config;
use kotonoha_core::llm::ProviderRegistry;
use kotonoha_core::pipeline::HealthReport;
use std::process::ExitCode;

/// Show provider availability and effective configuration
pub fn status(config: &Config, json: bool) -> anyhow::Result<ExitCode> {
    let registry = ProviderRegistry::from_config(config);
    let report = HealthReport::from_registry(&registry);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(ExitCode::SUCCESS);
    }

    println!();
    println!("{}", "Kotonoha Status".bold().underline());
    println!("{}", "=".repeat(50).dimmed());
    println!();

    println!("{}", "Version".cyan().bold());
    println!("  Kotonoha: {}", report.version.green());
    println!("  Checked At: {}", report.timestamp.dimmed());
    println!();

    println!("{}", "Providers".cyan().bold());
    println!("  Default: {}", config.default_provider.green());
    println!(
        "  Active: {}",
        if report.has_usable_provider() {
            report.ai_provider.green()
        } else {
            report.ai_provider.red()
        }
    );
    for provider in &report.providers {
        let model = config
            .provider(&provider.name)
            .map(|settings| settings.model.as_str())
            .unwrap_or("-");
        if provider.available {
            println!("  {} {} ({})", "✓".green().bold(), provider.name, model.cyan());
        } else {
            println!(
                "  {} {} - {}",
                "✗".red().bold(),
                provider.name,
                provider.reason.as_deref().unwrap_or("unavailable").yellow()
            );
        }
    }
    println!();

    println!("{}", "Limits".cyan().bold());
    println!(
        "  Admission: {} request(s) per {}s per client",
        config.admission.max_requests.to_string().yellow(),
        config.admission.window_secs.to_string().yellow()
    );
    println!(
        "  Provider Timeout: {}s",
        config.timeouts.call_timeout_secs.to_string().yellow()
    );
    println!();

    println!("{}", "Audit".cyan().bold());
    match &config.audit.log_path {
        Some(path) => println!("  Sink: {}", path.display().to_string().cyan()),
        None => println!("  Sink: {}", "tracing (target \"audit\")".cyan()),
    }
    println!(
        "  Queue: {} record(s), {} write attempt(s)",
        config.audit.queue_capacity, config.audit.write_attempts
    );
    println!();

    if !report.has_usable_provider() {
        println!(
            "{}",
            "No provider is usable. Set ANTHROPIC_API_KEY or OPENAI_API_KEY.".yellow()
        );
        println!();
    }

    Ok(ExitCode::SUCCESS)
}
