//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::{DatabaseTarget, Environment, PostgreSQLConfig, RelayConfig};
use super::secret::secret_string;
use crate::domain::errors::RelayError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;
use std::str::FromStr;

const ENV_PREFIX: &str = "RELAY_";

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (`${VAR}` syntax)
/// 3. Parses the TOML into [`RelayConfig`]
/// 4. Applies environment variable overrides (`RELAY_<SECTION>_<KEY>`)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns [`RelayError::Configuration`] if the file is missing or unreadable, a referenced
/// variable is unset, the TOML is malformed, or validation fails.
///
/// # Examples
///
/// ```no_run
/// use aep_relay::config::load_config;
///
/// let config = load_config("relay.toml").expect("Failed to load config");
/// println!("mock mode: {}", config.aep.mock_mode);
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<RelayConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(RelayError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        RelayError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    load_config_str(&contents)
}

/// Same as [`load_config`], from an in-memory TOML document
///
/// # Errors
///
/// See [`load_config`].
pub fn load_config_str(contents: &str) -> Result<RelayConfig> {
    let contents = substitute_env_vars(contents)?;

    let mut config: RelayConfig = toml::from_str(&contents)
        .map_err(|e| RelayError::Configuration(format!("Failed to parse TOML: {e}")))?;

    apply_env_overrides(&mut config)?;

    config.validate().map_err(|e| {
        RelayError::Configuration(format!("Configuration validation failed: {e}"))
    })?;

    Ok(config)
}

/// Substitutes environment variables in the format `${VAR_NAME}`
///
/// Comment lines are left untouched.
///
/// # Errors
///
/// Returns an error naming every referenced variable that is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| RelayError::Configuration(format!("Invalid substitution pattern: {e}")))?;
    let mut result = String::with_capacity(input.len());
    let mut missing_vars: Vec<String> = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let processed = re.replace_all(line, |caps: &regex::Captures| {
            let var_name = &caps[1];
            match std::env::var(var_name) {
                Ok(value) => value,
                Err(_) => {
                    if !missing_vars.iter().any(|v| v == var_name) {
                        missing_vars.push(var_name.to_string());
                    }
                    String::new()
                }
            }
        });
        result.push_str(&processed);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(RelayError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

fn env_var(key: &str) -> Option<String> {
    std::env::var(format!("{ENV_PREFIX}{key}")).ok()
}

fn env_parse<T: FromStr>(key: &str) -> Result<Option<T>> {
    match env_var(key) {
        Some(raw) => raw.trim().parse().map(Some).map_err(|_| {
            RelayError::Configuration(format!("{ENV_PREFIX}{key} has an invalid value: {raw}"))
        }),
        None => Ok(None),
    }
}

/// Applies environment variable overrides using the `RELAY_` prefix
///
/// Environment variables follow the pattern `RELAY_<SECTION>_<KEY>`, for example
/// `RELAY_AEP_MOCK_MODE` or `RELAY_SERVER_PORT`. List values are comma separated.
fn apply_env_overrides(config: &mut RelayConfig) -> Result<()> {
    // Application overrides
    if let Some(val) = env_var("APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }
    if let Some(val) = env_var("ENVIRONMENT") {
        config.environment = match val.to_lowercase().as_str() {
            "development" => Environment::Development,
            "staging" => Environment::Staging,
            "production" => Environment::Production,
            other => {
                return Err(RelayError::Configuration(format!(
                    "{ENV_PREFIX}ENVIRONMENT has an invalid value: {other}"
                )))
            }
        };
    }

    // Server overrides
    if let Some(val) = env_var("SERVER_HOST") {
        config.server.host = val;
    }
    if let Some(port) = env_parse("SERVER_PORT")? {
        config.server.port = port;
    }
    if let Some(val) = env_var("SERVER_ALLOWED_IPS") {
        config.server.allowed_ips = val
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect();
    }
    if let Some(workers) = env_parse("SERVER_WORKERS")? {
        config.server.workers = workers;
    }

    // AEP overrides
    if let Some(mock) = env_parse("AEP_MOCK_MODE")? {
        config.aep.mock_mode = mock;
    }
    if let Some(val) = env_var("AEP_STREAMING_ENDPOINT") {
        config.aep.streaming_endpoint = val;
    }
    if let Some(val) = env_var("AEP_IMS_ORG_ID") {
        config.aep.ims_org_id = val;
    }
    if let Some(val) = env_var("AEP_DATASET_ID") {
        config.aep.dataset_id = val;
    }
    if let Some(val) = env_var("AEP_SCHEMA_ID") {
        config.aep.schema_id = val;
    }
    if let Some(val) = env_var("AEP_TENANT_ID") {
        config.aep.tenant_id = val;
    }
    if let Some(val) = env_var("AEP_SOURCE_NAME") {
        config.aep.source_name = val;
    }
    if let Some(timeout) = env_parse("AEP_TIMEOUT_SECONDS")? {
        config.aep.timeout_seconds = timeout;
    }

    // Store overrides
    if let Some(val) = env_var("DATABASE_TARGET") {
        config.database_target = match val.to_lowercase().as_str() {
            "postgresql" => DatabaseTarget::PostgreSQL,
            "memory" => DatabaseTarget::Memory,
            other => {
                return Err(RelayError::Configuration(format!(
                    "{ENV_PREFIX}DATABASE_TARGET has an invalid value: {other}"
                )))
            }
        };
    }
    if let Some(val) = env_var("POSTGRESQL_CONNECTION_STRING") {
        match config.postgresql {
            Some(ref mut pg) => pg.connection_string = secret_string(val),
            None => {
                config.postgresql = Some(PostgreSQLConfig {
                    connection_string: secret_string(val),
                    max_connections: 5,
                    connection_timeout_seconds: 30,
                    statement_timeout_seconds: 60,
                })
            }
        }
    }
    if let Some(ref mut pg) = config.postgresql {
        if let Some(max) = env_parse("POSTGRESQL_MAX_CONNECTIONS")? {
            pg.max_connections = max;
        }
        if let Some(timeout) = env_parse("POSTGRESQL_STATEMENT_TIMEOUT_SECONDS")? {
            pg.statement_timeout_seconds = timeout;
        }
    }

    // Generator overrides
    if let Some(size) = env_parse("GENERATOR_BATCH_SIZE")? {
        config.generator.batch_size = size;
    }
    if let Some(wait) = env_parse("GENERATOR_WAIT_SECONDS")? {
        config.generator.wait_seconds = wait;
    }
    if let Some(val) = env_var("GENERATOR_TRIGGER_URL") {
        config.generator.trigger_url = val;
    }
    if let Some(val) = env_var("GENERATOR_CANARY_EMAIL") {
        config.generator.canary_email = val;
    }
    if let Some(val) = env_var("GENERATOR_CANARY_PHONE") {
        config.generator.canary_phone = val;
    }

    // Logging overrides
    if let Some(enabled) = env_parse("LOGGING_LOCAL_ENABLED")? {
        config.logging.local_enabled = enabled;
    }
    if let Some(val) = env_var("LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_substitute_env_vars() {
        std::env::set_var("RELAY_LOADER_TEST_VAR", "test_value");
        let input = "connection_string = \"${RELAY_LOADER_TEST_VAR}\"";
        let result = substitute_env_vars(input).unwrap();
        assert_eq!(result, "connection_string = \"test_value\"\n");
        std::env::remove_var("RELAY_LOADER_TEST_VAR");
    }

    #[test]
    fn test_substitute_env_vars_missing() {
        std::env::remove_var("RELAY_LOADER_MISSING_VAR");
        let input = "key = \"${RELAY_LOADER_MISSING_VAR}\"";
        let err = substitute_env_vars(input).unwrap_err();
        assert!(err.to_string().contains("RELAY_LOADER_MISSING_VAR"));
    }

    #[test]
    fn test_substitute_env_vars_skips_comments() {
        std::env::remove_var("RELAY_LOADER_COMMENTED");
        let input = "# key = \"${RELAY_LOADER_COMMENTED}\"";
        assert!(substitute_env_vars(input).is_ok());
    }

    #[test]
    fn test_load_config_missing_file() {
        let result = load_config("nonexistent-relay.toml");
        assert!(matches!(result, Err(RelayError::Configuration(_))));
    }

    #[test]
    fn test_load_config_valid() {
        let toml_content = r#"
database_target = "memory"

[application]
log_level = "debug"

[aep]
mock_mode = true
tenant_id = "_acme"

[generator]
batch_size = 3
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(toml_content.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        let config = load_config(temp_file.path()).unwrap();
        assert_eq!(config.application.log_level, "debug");
        assert_eq!(config.database_target, DatabaseTarget::Memory);
        assert!(config.aep.mock_mode);
        assert_eq!(config.aep.source_name, "Batch API Source");
        assert_eq!(config.generator.batch_size, 3);
        assert_eq!(config.server.port, 8000);
    }

    #[test]
    fn test_load_config_rejects_invalid() {
        let toml_content = r#"
database_target = "postgresql"

[aep]
tenant_id = "acme"
"#;
        let err = load_config_str(toml_content).unwrap_err();
        assert!(err.to_string().contains("postgresql configuration is required"));
    }
}
