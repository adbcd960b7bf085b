//! Doctor command - verify system requirements and configuration.

use crate::cli::Output;
use crate::config::{Settings, StoreProvider};
use crate::openai;
use console::style;

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
pub fn run_doctor(settings: &Settings) -> anyhow::Result<()> {
    Output::header("Paddock Doctor");
    println!();
    println!("Checking system requirements and configuration...\n");

    let mut checks = Vec::new();

    println!("{}", style("External Tools").bold());
    let browser_check = check_browser();
    browser_check.print();
    checks.push(browser_check);

    println!();

    println!("{}", style("API Configuration").bold());
    let api_check = check_llm_api_key();
    api_check.print();
    checks.push(api_check);

    println!();

    println!("{}", style("Vector Store").bold());
    let store_checks = check_vector_store(settings);
    for check in &store_checks {
        check.print();
    }
    checks.extend(store_checks);

    println!();

    println!("{}", style("Configuration").bold());
    let config_check = check_config_file();
    config_check.print();
    checks.push(config_check);

    println!();

    let errors = checks.iter().filter(|c| c.status == CheckStatus::Error).count();
    let warnings = checks.iter().filter(|c| c.status == CheckStatus::Warning).count();

    if errors > 0 {
        Output::error(&format!(
            "{} error(s) found. Please fix them before using Paddock.",
            errors
        ));
        std::process::exit(1);
    } else if warnings > 0 {
        Output::warning(&format!("All checks passed with {} warning(s).", warnings));
    } else {
        Output::success("All checks passed! Paddock is ready to use.");
    }

    Ok(())
}

/// Check for a Chrome/Chromium executable, needed by the scraper.
fn check_browser() -> CheckResult {
    match headless_chrome::browser::default_executable() {
        Ok(path) => CheckResult::ok("Chrome/Chromium", &format!("{}", path.display())),
        Err(_) => CheckResult::error(
            "Chrome/Chromium",
            "not found",
            install_hint_chromium(),
        ),
    }
}

/// Check if the LLM API key is configured.
fn check_llm_api_key() -> CheckResult {
    match openai::api_key() {
        Some(key) if key.len() > 8 => {
            let masked = format!("{}...{}", &key[..4], &key[key.len() - 4..]);
            CheckResult::ok(openai::LLM_API_KEY_VAR, &format!("configured ({})", masked))
        }
        Some(_) => CheckResult::warning(
            openai::LLM_API_KEY_VAR,
            "set but suspiciously short",
            "Double-check the key value",
        ),
        None => CheckResult::error(
            openai::LLM_API_KEY_VAR,
            "not set",
            "Set with: export LLM_API_KEY='...' (required for ingest and grounded chat)",
        ),
    }
}

/// Check vector store configuration for the selected provider.
fn check_vector_store(settings: &Settings) -> Vec<CheckResult> {
    let mut results = Vec::new();
    let vs = &settings.vector_store;

    results.push(CheckResult::ok("Provider", &vs.provider.to_string()));

    match vs.provider {
        StoreProvider::Memory => {
            results.push(CheckResult::warning(
                "Persistence",
                "in-memory store keeps nothing across runs",
                "Use the sqlite or data-api provider for a persistent knowledge base",
            ));
        }
        StoreProvider::Sqlite => {
            let db_path = settings.sqlite_path();
            if db_path.exists() {
                results.push(CheckResult::ok(
                    "Database",
                    &format!("{}", db_path.display()),
                ));
            } else {
                results.push(CheckResult::warning(
                    "Database",
                    &format!("{} (not created yet)", db_path.display()),
                    "Database will be created on first ingest",
                ));
            }
        }
        StoreProvider::DataApi => {
            for (value, name) in [
                (&vs.api_endpoint, "API endpoint"),
                (&vs.namespace, "Namespace"),
                (&vs.application_token, "Application token"),
            ] {
                match value {
                    Some(_) => results.push(CheckResult::ok(name, "configured")),
                    None => results.push(CheckResult::error(
                        name,
                        "not set",
                        "Set VECTOR_DB_API_ENDPOINT, VECTOR_DB_NAMESPACE, and VECTOR_DB_APPLICATION_TOKEN",
                    )),
                }
            }
        }
    }

    results
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
            "Create with: paddock config edit",
        )
    }
}

/// Platform-specific install hint for Chromium.
fn install_hint_chromium() -> &'static str {
    if cfg!(target_os = "macos") {
        "Install with: brew install --cask chromium"
    } else if cfg!(target_os = "linux") {
        "Install with: sudo apt install chromium-browser (or your package manager)"
    } else {
        "Install Chrome from: https://www.google.com/chrome/"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_result_ok_has_no_hint() {
        let result = CheckResult::ok("test", "passed");
        assert_eq!(result.status, CheckStatus::Ok);
        assert!(result.hint.is_none());
    }

    #[test]
    fn check_result_error_carries_hint() {
        let result = CheckResult::error("test", "failed", "fix it");
        assert_eq!(result.status, CheckStatus::Error);
        assert_eq!(result.hint, Some("fix it".to_string()));
    }

    #[test]
    fn data_api_without_credentials_reports_errors() {
        let mut settings = Settings::default();
        settings.vector_store.provider = StoreProvider::DataApi;

        let results = check_vector_store(&settings);
        let errors = results
            .iter()
            .filter(|c| c.status == CheckStatus::Error)
            .count();
        assert_eq!(errors, 3);
    }

    #[test]
    fn memory_provider_warns_about_persistence() {
        let mut settings = Settings::default();
        settings.vector_store.provider = StoreProvider::Memory;

        let results = check_vector_store(&settings);
        assert!(results.iter().any(|c| c.status == CheckStatus::Warning));
    }
}
