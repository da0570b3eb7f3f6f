//! Validate config command implementation
//!
//! Loads the configuration file and prints a summary. Loading already validates, so a file
//! that loads is a valid file.

use crate::cli::commands::{EXIT_CONFIG, EXIT_SUCCESS};
use crate::config::load_config;
use crate::config::schema::DatabaseTarget;
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Configuration is invalid");
                println!("   Error: {e}");
                return Ok(EXIT_CONFIG);
            }
        };

        println!("✅ Configuration is valid");
        println!();
        println!("Configuration Summary:");
        println!("  Environment: {:?}", config.environment);
        println!("  Log Level: {}", config.application.log_level);
        println!(
            "  Server: {}:{} ({} worker(s))",
            config.server.host, config.server.port, config.server.workers
        );
        println!("  Allowed IPs: {}", config.server.allowed_ips.join(", "));

        if config.aep.mock_mode {
            println!("  AEP Sender: mock");
        } else {
            println!("  AEP Sender: live");
            println!("  AEP Endpoint: {}", config.aep.streaming_endpoint);
            println!("  AEP Dataset: {}", config.aep.dataset_id);
        }
        println!("  AEP Tenant: {}", config.aep.tenant_id);

        match config.database_target {
            DatabaseTarget::PostgreSQL => {
                if let Some(ref pg_config) = config.postgresql {
                    println!("  Database Target: PostgreSQL");
                    println!("  Max Connections: {}", pg_config.max_connections);
                }
            }
            DatabaseTarget::Memory => println!("  Database Target: memory"),
        }

        println!(
            "  Generator: {} record(s), {}s wait",
            config.generator.batch_size, config.generator.wait_seconds
        );
        println!();
        Ok(EXIT_SUCCESS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[tokio::test]
    async fn test_valid_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            "database_target = \"memory\"\n\n[aep]\ntenant_id = \"acme\""
        )
        .unwrap();

        let code = ValidateArgs {}
            .execute(file.path().to_str().unwrap())
            .await
            .unwrap();
        assert_eq!(code, EXIT_SUCCESS);
    }

    #[tokio::test]
    async fn test_invalid_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "database_target = \"memory\"\n\n[aep]\ntenant_id = \"__\"").unwrap();

        let code = ValidateArgs {}
            .execute(file.path().to_str().unwrap())
            .await
            .unwrap();
        assert_eq!(code, EXIT_CONFIG);
    }
}
