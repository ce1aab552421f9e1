use config::{Config, ConfigError, Environment, File};
use once_cell::sync::OnceCell;
use serde_json::Value;
use std::env;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub mod models;
pub use models::*;

/// Marker value replaced by an environment variable when the config is loaded.
pub const SECRET_FROM_ENV: &str = "secret_from_env";

/// Loads the application configuration.
///
/// Sources are layered in this order, later ones winning:
/// `<CONFIG_DIR>/default`, `<CONFIG_DIR>/<RUN_ENV>` and `SEATPICK__*` environment variables
/// (`SEATPICK__API__BASE_URL`, ...). `CONFIG_DIR` defaults to `config`, `RUN_ENV` to `debug`.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    ensure_dotenv_loaded();
    let config_dir = env::var("CONFIG_DIR").unwrap_or_else(|_| "config".to_string());
    load_config_from(Path::new(&config_dir))
}

/// Same as [`load_config`] but reads the files from an explicit directory.
pub fn load_config_from(config_dir: &Path) -> Result<AppConfig, ConfigError> {
    let run_env = env::var("RUN_ENV").unwrap_or_else(|_| "debug".to_string());
    let prefix = env::var("PREFIX").unwrap_or_else(|_| "SEATPICK".to_string());

    let default_path: PathBuf = config_dir.join("default");
    let env_path: PathBuf = config_dir.join(&run_env);
    debug!(
        "loading config from {} and {}",
        default_path.display(),
        env_path.display()
    );

    let builder = Config::builder()
        .add_source(File::with_name(&default_path.to_string_lossy()).required(false))
        .add_source(File::with_name(&env_path.to_string_lossy()).required(false))
        .add_source(Environment::with_prefix(&prefix).separator("__"));

    let raw_config: AppConfig = builder.build()?.try_deserialize()?;
    apply_env_overrides_from_marker(raw_config)
}

/// Recursively replaces all "secret_from_env" string values with environment variable values
fn inject_env_secrets(value: &mut Value) {
    fn walk(path: Vec<String>, obj: &mut Value) {
        match obj {
            Value::Object(map) => {
                for (k, v) in map.iter_mut() {
                    let mut new_path = path.clone();
                    new_path.push(k.to_string());
                    walk(new_path, v);
                }
            }
            Value::String(s) if s == SECRET_FROM_ENV => {
                let env_key = path.join("_").to_uppercase();
                if let Ok(env_val) = env::var(&env_key) {
                    *obj = Value::String(env_val);
                } else {
                    warn!("env var {} not found for {}", env_key, SECRET_FROM_ENV);
                }
            }
            _ => {}
        }
    }

    walk(vec![], value);
}

/// Applies environment overrides based on "secret_from_env" markers in serialized config
pub fn apply_env_overrides_from_marker(config: AppConfig) -> Result<AppConfig, ConfigError> {
    let mut json = serde_json::to_value(&config)
        .map_err(|err| ConfigError::Message(format!("failed to serialize config: {err}")))?;
    inject_env_secrets(&mut json);
    serde_json::from_value(json)
        .map_err(|err| ConfigError::Message(format!("failed to rebuild config: {err}")))
}

static INIT_DOTENV: OnceCell<()> = OnceCell::new();

/// Ensures that the dotenv file is loaded into the environment variables.
///
/// `DOTENV_OVERRIDE` selects another file; otherwise `.env` in the working directory is used.
/// Returns the path that was (or would have been) loaded.
pub fn ensure_dotenv_loaded() -> String {
    let dotenv_path = env::var("DOTENV_OVERRIDE").unwrap_or_else(|_| ".env".to_string());

    INIT_DOTENV.get_or_init(|| {
        dotenv::from_filename(&dotenv_path).ok();
    });

    dotenv_path
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = env::temp_dir().join(format!("seatpick-config-{}-{}", name, std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_load_config_applies_defaults() {
        let dir = scratch_dir("defaults");
        fs::write(
            dir.join("default.toml"),
            "[api]\nbase_url = \"http://localhost:8080/api\"\n",
        )
        .unwrap();

        let config = load_config_from(&dir).expect("config should load");

        assert_eq!(config.api.base_url, "http://localhost:8080/api");
        assert_eq!(config.api.timeout_secs, 30);
        assert!(!config.use_payment);
        assert!(config.payment.is_none());
        assert_eq!(config.booking.slot_duration_minutes, 60);
        assert_eq!(config.logging.level, "info");
        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_secret_marker_is_replaced_from_env() {
        env::set_var("PAYMENT_API_KEY", "test-key-123");
        let dir = scratch_dir("secrets");
        fs::write(
            dir.join("default.toml"),
            r#"
use_payment = true

[api]
base_url = "http://localhost:8080/api"

[payment]
provider = "html5_inicis"
pay_method = "card"
endpoint = "http://localhost:9090/request_pay"
api_key = "secret_from_env"
unit_amount = 10000
"#,
        )
        .unwrap();

        let config = load_config_from(&dir).expect("config should load");
        let payment = config.payment.expect("payment section present");

        assert!(config.use_payment);
        assert_eq!(payment.api_key.as_deref(), Some("test-key-123"));
        assert_eq!(payment.unit_amount, 10000);
        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_missing_secret_keeps_marker() {
        let mut value = serde_json::json!({ "nothing": { "here": SECRET_FROM_ENV } });
        inject_env_secrets(&mut value);
        assert_eq!(value["nothing"]["here"], SECRET_FROM_ENV);
    }
}
