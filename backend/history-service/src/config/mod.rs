use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub app: AppConfig,
    pub database: DatabaseConfig,
    pub bus: BusConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub env: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusConfig {
    pub amqp_url: String,
    /// Seconds to wait before rebuilding a lost subscription (default: 5)
    pub reconnect_delay_secs: u64,
}

impl Config {
    /// Load configuration from the environment.
    ///
    /// `APP_PORT`, `DATABASE_URL` and `AMQP_URL` are required; the process
    /// must refuse to start without them.
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        Ok(Config {
            app: AppConfig {
                env: std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
                port: std::env::var("APP_PORT")?.parse()?,
            },
            database: DatabaseConfig {
                url: std::env::var("DATABASE_URL")?,
                max_connections: std::env::var("DATABASE_MAX_CONNECTIONS")
                    .unwrap_or_else(|_| "5".to_string())
                    .parse()?,
            },
            bus: BusConfig {
                amqp_url: std::env::var("AMQP_URL")?,
                reconnect_delay_secs: std::env::var("AMQP_RECONNECT_DELAY_SECS")
                    .unwrap_or_else(|_| "5".to_string())
                    .parse()?,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clear_env() {
        for key in [
            "APP_ENV",
            "APP_PORT",
            "DATABASE_URL",
            "DATABASE_MAX_CONNECTIONS",
            "AMQP_URL",
            "AMQP_RECONNECT_DELAY_SECS",
        ] {
            std::env::remove_var(key);
        }
    }

    #[test]
    #[serial_test::serial]
    fn test_from_env_with_required_vars() {
        clear_env();
        std::env::set_var("APP_PORT", "8002");
        std::env::set_var("DATABASE_URL", "postgres://localhost/history");
        std::env::set_var("AMQP_URL", "amqp://localhost:5672");

        let config = Config::from_env().unwrap();
        assert_eq!(config.app.port, 8002);
        assert_eq!(config.app.env, "development");
        assert_eq!(config.database.url, "postgres://localhost/history");
        assert_eq!(config.bus.amqp_url, "amqp://localhost:5672");
        assert_eq!(config.bus.reconnect_delay_secs, 5);

        clear_env();
    }

    #[test]
    #[serial_test::serial]
    fn test_from_env_refuses_to_start_without_amqp_url() {
        clear_env();
        std::env::set_var("APP_PORT", "8002");
        std::env::set_var("DATABASE_URL", "postgres://localhost/history");

        assert!(Config::from_env().is_err());

        clear_env();
    }

    #[test]
    #[serial_test::serial]
    fn test_from_env_refuses_to_start_without_port() {
        clear_env();
        std::env::set_var("DATABASE_URL", "postgres://localhost/history");
        std::env::set_var("AMQP_URL", "amqp://localhost:5672");

        assert!(Config::from_env().is_err());

        clear_env();
    }
}
