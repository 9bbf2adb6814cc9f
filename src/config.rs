use std::path::{Path, PathBuf};
use colored::Colorize;
use json_comments::StripComments;
use serde::{Serialize, Deserialize};
use crate::{error::Error, llm::Provider};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    pub debug: bool,
    pub provider: Provider,
    /// Base URL of the model API; empty means the provider's public endpoint.
    pub api_addr: String,
    pub api_key: String,
    pub model: String,
    /// Number of trailing messages sent as context, 0 sends the whole log.
    pub context_window: usize,
    /// 0 disables the timeout.
    pub request_timeout_secs: u64,
    pub system_prompt_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            debug: false,
            provider: Provider::Gemini,
            api_addr: String::new(),
            api_key: String::new(),
            model: "gemini-1.5-flash".to_string(),
            context_window: 0,
            request_timeout_secs: 120,
            system_prompt_path: None,
        }
    }
}

impl Config {
    /// The API key, or a configuration error when none is usable.
    pub fn credential(&self) -> Result<&str, Error> {
        let key = self.api_key.trim();
        if key.is_empty() {
            return Err(Error::Configuration(
                "API key not found. Set \"api_key\" in the config file or FINWISE_API_KEY.".to_string(),
            ));
        }
        if key.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(Error::Configuration("API key contains whitespace or control characters".to_string()));
        }
        Ok(key)
    }

    pub fn api_addr(&self) -> &str {
        if self.api_addr.trim().is_empty() {
            self.provider.default_api_addr()
        } else {
            self.api_addr.trim_end_matches('/')
        }
    }
}

pub fn get_config_path() -> PathBuf {
    if let Ok(path) = std::env::var("FINWISE_CONFIG_PATH") {
        return PathBuf::from(path);
    }
    let mut config_dir = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
    config_dir.push("finwise");
    config_dir.push("finwise.config.json");
    config_dir
}

pub fn load_config() -> Config {
    let mut config = load_config_from(&get_config_path());
    apply_env_overrides(&mut config, |name| std::env::var(name).ok());
    config
}

/// Reads the config file, writing a default one first if it does not exist.
/// Any failure falls back to defaults.
pub fn load_config_from(config_path: &Path) -> Config {
    let mut config = Config::default();

    if !config_path.exists() {
        write_default_config(config_path, &config);
    }

    if let Ok(json) = std::fs::read_to_string(config_path) {
        let stripped = StripComments::new(json.as_bytes());
        match serde_json::from_reader(stripped) {
            Ok(file_config) => config = file_config,
            Err(e) => println!(
                "{} {} {}\n{}",
                "Failed to parse".red(),
                config_path.display().to_string().red(),
                format!(": {}", e).red(),
                "Using default config"
            ),
        }
    }

    config
}

fn write_default_config(config_path: &Path, config: &Config) {
    let Some(parent) = config_path.parent() else { return };
    if let Err(e) = std::fs::create_dir_all(parent) {
        println!(
            "{}",
            format!("Failed to create config directory '{}': {}", parent.display(), e).red()
        );
        return;
    }
    let default_json = serde_json::to_string_pretty(config).unwrap_or_else(|_| "{}".to_string());
    if let Err(e) = std::fs::write(config_path, default_json) {
        println!(
            "{}",
            format!("Failed to write default config to '{}': {}", config_path.display(), e).red()
        );
    } else {
        println!(
            "{}",
            format!("Created default config at '{}'", config_path.display()).green()
        );
    }
}

pub fn apply_env_overrides(config: &mut Config, var: impl Fn(&str) -> Option<String>) {
    if let Some(debug) = var("FINWISE_DEBUG") { config.debug = debug.to_lowercase() == "true"; }
    if let Some(provider) = var("FINWISE_PROVIDER") {
        match provider.parse() {
            Ok(p) => config.provider = p,
            Err(e) => println!("{}", format!("Ignoring FINWISE_PROVIDER: {}", e).red()),
        }
    }
    if let Some(api_addr) = var("FINWISE_API_ADDR") { config.api_addr = api_addr; }
    if let Some(api_key) = var("FINWISE_API_KEY") { config.api_key = api_key; }
    if let Some(model) = var("FINWISE_MODEL") { config.model = model; }
    if let Some(size) = var("FINWISE_CONTEXT_WINDOW") { if let Ok(n) = size.parse() { config.context_window = n; } }
    if let Some(secs) = var("FINWISE_REQUEST_TIMEOUT_SECS") { if let Ok(n) = secs.parse() { config.request_timeout_secs = n; } }
    if let Some(path) = var("FINWISE_SYSTEM_PROMPT_PATH") { config.system_prompt_path = Some(PathBuf::from(path)); }
}
