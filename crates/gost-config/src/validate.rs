//! Configuration validation logic.

use crate::loader::ConfigError;
use crate::Config;

pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.is_none() && config.client.is_none() {
        return Err(ConfigError::Validation(
            "config has neither a [server] nor a [client] section".into(),
        ));
    }

    if let Some(server) = &config.server {
        if server.listen.trim().is_empty() {
            return Err(ConfigError::Validation("server.listen is empty".into()));
        }
        if server.max_head_bytes < 128 {
            return Err(ConfigError::Validation(
                "server.max_head_bytes too small (min 128)".into(),
            ));
        }
        let rl = &server.resource_limits;
        if rl.relay_buffer_size < 1024 {
            return Err(ConfigError::Validation(
                "resource_limits.relay_buffer_size must be >= 1024".into(),
            ));
        }
        if rl.relay_buffer_size > 1024 * 1024 {
            return Err(ConfigError::Validation(
                "resource_limits.relay_buffer_size must be <= 1MB".into(),
            ));
        }
        if rl.connection_backlog == 0 {
            return Err(ConfigError::Validation(
                "resource_limits.connection_backlog must be > 0".into(),
            ));
        }
        for node in &server.chain {
            if node.trim().is_empty() {
                return Err(ConfigError::Validation(
                    "server.chain contains an empty node".into(),
                ));
            }
        }
    }

    if let Some(client) = &config.client {
        for (name, value) in [
            ("client.listen", &client.listen),
            ("client.proxy", &client.proxy),
            ("client.target", &client.target),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::Validation(format!("{name} is empty")));
            }
        }
    }

    Ok(())
}
