use std::path::PathBuf;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub app: AppConfig,
    pub bus: BusConfig,
    pub video: VideoConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub env: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusConfig {
    pub amqp_url: String,
    /// Await broker confirmation per publish (default: false, i.e.
    /// fire-and-forget)
    pub confirm_delivery: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoConfig {
    /// Directory holding the sample video files (default: "videos")
    pub dir: PathBuf,
}

impl Config {
    /// Load configuration from the environment.
    ///
    /// `APP_PORT` and `AMQP_URL` are required; the process must refuse to
    /// start without them.
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        Ok(Config {
            app: AppConfig {
                env: std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
                port: std::env::var("APP_PORT")?.parse()?,
            },
            bus: BusConfig {
                amqp_url: std::env::var("AMQP_URL")?,
                confirm_delivery: std::env::var("PUBLISH_CONFIRM_DELIVERY")
                    .unwrap_or_else(|_| "false".to_string())
                    .parse()?,
            },
            video: VideoConfig {
                dir: std::env::var("VIDEO_DIR")
                    .unwrap_or_else(|_| "videos".to_string())
                    .into(),
            },
        })
    }
}
