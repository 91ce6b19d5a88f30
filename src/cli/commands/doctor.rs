//! Doctor command - verify system requirements and configuration.

use crate::cli::Output;
use crate::config::Settings;
use crate::session::mask;
use crate::video::LinkExtractor;
use console::style;
use std::process::Command;

/// Check result for a single item.
#[derive(Debug)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    pub hint: Option<String>,
}

#[derive(Debug, PartialEq)]
pub enum CheckStatus {
    Ok,
    Warning,
    Error,
}

impl CheckResult {
    fn ok(name: &str, message: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Ok,
            message: message.to_string(),
            hint: None,
        }
    }

    fn warning(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Warning,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn error(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Error,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn print(&self) {
        let icon = match self.status {
            CheckStatus::Ok => style("✓").green(),
            CheckStatus::Warning => style("!").yellow(),
            CheckStatus::Error => style("✗").red(),
        };

        println!("  {} {} - {}", icon, style(&self.name).bold(), self.message);

        if let Some(hint) = &self.hint {
            println!("    {} {}", style("→").dim(), style(hint).dim());
        }
    }
}

/// Run all diagnostic checks.
///
/// The API key is only checked for presence; validating it costs a request.
pub fn run_doctor(settings: &Settings, api_key: Option<&str>) -> anyhow::Result<()> {
    Output::header("Clipwise Doctor");
    println!();
    println!("Checking system requirements and configuration...\n");

    let mut checks = Vec::new();

    println!("{}", style("External Tools").bold());
    let tool_check = check_tool(&settings.transcript.ytdlp_path, install_hint_ytdlp());
    tool_check.print();
    checks.push(tool_check);

    println!();

    println!("{}", style("API Configuration").bold());
    let api_check = check_api_key(settings.resolve_api_key(api_key).as_deref());
    api_check.print();
    checks.push(api_check);

    println!();

    println!("{}", style("Configuration").bold());
    let config_checks = vec![
        check_config_file(),
        check_languages(&settings.transcript.languages),
        check_extractor(settings),
    ];
    for check in &config_checks {
        check.print();
    }
    checks.extend(config_checks);

    println!();

    let errors = checks.iter().filter(|c| c.status == CheckStatus::Error).count();
    let warnings = checks.iter().filter(|c| c.status == CheckStatus::Warning).count();

    if errors > 0 {
        Output::error(&format!(
            "{} error(s) found. Please fix them before using Clipwise.",
            errors
        ));
        std::process::exit(1);
    } else if warnings > 0 {
        Output::warning(&format!("All checks passed with {} warning(s).", warnings));
    } else {
        Output::success("All checks passed! Clipwise is ready to use.");
    }

    Ok(())
}

/// Check if an external tool is available.
fn check_tool(name: &str, hint: &str) -> CheckResult {
    match Command::new(name).arg("--version").output() {
        Ok(output) if output.status.success() => {
            let version = String::from_utf8_lossy(&output.stdout)
                .lines()
                .next()
                .unwrap_or("installed")
                .trim()
                .to_string();
            CheckResult::ok(name, &version)
        }
        Ok(_) => CheckResult::error(name, "installed but not working", hint),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            CheckResult::warning(name, "not found (video requests will fail)", hint)
        }
        Err(e) => CheckResult::error(name, &format!("error: {}", e), hint),
    }
}

/// Check that an API key is available.
fn check_api_key(key: Option<&str>) -> CheckResult {
    match key {
        Some(key) if key.starts_with("sk-") && key.len() > 20 => {
            CheckResult::ok("API key", &format!("configured ({})", mask(key)))
        }
        Some(_) => CheckResult::warning(
            "API key",
            "set but format looks unusual",
            "Expected format: sk-... (OpenAI API key)",
        ),
        None => CheckResult::warning(
            "API key",
            "not set (chat will ask for one)",
            "Set with: export OPENAI_API_KEY='sk-...'",
        ),
    }
}

/// Check if config file exists.
fn check_config_file() -> CheckResult {
    let config_path = Settings::default_config_path();
    if config_path.exists() {
        CheckResult::ok("Config file", &format!("{}", config_path.display()))
    } else {
        CheckResult::warning(
            "Config file",
            "using defaults",
            "Create with: clipwise config edit",
        )
    }
}

fn check_languages(languages: &[String]) -> CheckResult {
    if languages.is_empty() {
        CheckResult::error(
            "Transcript languages",
            "empty",
            "Set transcript.languages, e.g. [\"ar\", \"en\"]",
        )
    } else {
        CheckResult::ok("Transcript languages", &languages.join(", "))
    }
}

fn check_extractor(settings: &Settings) -> CheckResult {
    match LinkExtractor::new(&settings.extractor) {
        Ok(_) => CheckResult::ok(
            "Link patterns",
            &format!(
                "{} host(s), {} short host(s)",
                settings.extractor.hosts.len(),
                settings.extractor.short_hosts.len()
            ),
        ),
        Err(e) => CheckResult::error("Link patterns", &e.to_string(), "Fix extractor.id_pattern"),
    }
}

/// Platform-specific install hint for yt-dlp.
fn install_hint_ytdlp() -> &'static str {
    if cfg!(target_os = "macos") {
        "Install with: brew install yt-dlp"
    } else if cfg!(target_os = "linux") {
        "Install with: pip install yt-dlp (or your package manager)"
    } else {
        "Install from: https://github.com/yt-dlp/yt-dlp"
    }
}
