use std::env;
use std::fs;
use std::path::Path;

use secrecy::ExposeSecret;
use tourguide_core::config::{resolve_config_path, AppConfig, LoadOptions};
use toml::Value;

pub fn run() -> String {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => return format!("config validation failed: {error}"),
    };

    let config_file_path = resolve_config_path(None);
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());

    let api_key = config.polish.api_key.as_ref().map(|key| redact_secret(key.expose_secret()));
    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];
    let mut push = |key: &str, value: String, env_keys: &[&str]| {
        let source =
            field_source(key, env_keys, config_file_doc.as_ref(), config_file_path.as_deref());
        lines.push(render_line(key, &value, source));
    };

    push("catalog.path", config.catalog.path.display().to_string(), &["TOURGUIDE_CATALOG_PATH"]);
    push(
        "server.bind_address",
        config.server.bind_address.clone(),
        &["TOURGUIDE_SERVER_BIND_ADDRESS"],
    );
    push("server.port", config.server.port.to_string(), &["TOURGUIDE_SERVER_PORT"]);
    push(
        "server.graceful_shutdown_secs",
        config.server.graceful_shutdown_secs.to_string(),
        &["TOURGUIDE_SERVER_GRACEFUL_SHUTDOWN_SECS"],
    );
    push("polish.provider", format!("{:?}", config.polish.provider), &["TOURGUIDE_POLISH_PROVIDER"]);
    push("polish.model", config.polish.model.clone(), &["TOURGUIDE_POLISH_MODEL"]);
    push(
        "polish.base_url",
        config.polish.base_url.clone().unwrap_or_else(|| "<unset>".to_string()),
        &["TOURGUIDE_POLISH_BASE_URL"],
    );
    push(
        "polish.api_key",
        api_key.unwrap_or_else(|| "<unset>".to_string()),
        &["TOURGUIDE_POLISH_API_KEY"],
    );
    push(
        "polish.timeout_secs",
        config.polish.timeout_secs.to_string(),
        &["TOURGUIDE_POLISH_TIMEOUT_SECS"],
    );
    push("polish.max_len", config.polish.max_len.to_string(), &["TOURGUIDE_POLISH_MAX_LEN"]);
    push("safety.enabled", config.safety.enabled.to_string(), &["TOURGUIDE_SAFETY_ENABLED"]);
    push(
        "logging.level",
        config.logging.level.clone(),
        &["TOURGUIDE_LOGGING_LEVEL", "TOURGUIDE_LOG_LEVEL"],
    );
    push(
        "logging.format",
        format!("{:?}", config.logging.format),
        &["TOURGUIDE_LOGGING_FORMAT", "TOURGUIDE_LOG_FORMAT"],
    );

    lines.join("\n")
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_keys: &[&str],
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if let Some(env_key) = env_keys.iter().find(|key| env::var_os(key).is_some()) {
        return format!("env ({env_key})");
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}

/// Keeps a short recognisable prefix such as `sk-` and hides the rest.
fn redact_secret(secret: &str) -> String {
    let trimmed = secret.trim();
    if trimmed.is_empty() {
        return "<empty>".to_string();
    }

    if let Some((prefix, _)) = trimmed.split_once('-') {
        return format!("{prefix}-***");
    }

    "<redacted>".to_string()
}
