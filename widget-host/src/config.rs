//! Host configuration from launch arguments and the environment.

use std::path::PathBuf;

use simplelog::LevelFilter;
use widget_app::AppConfig;
use widget_app::router::{Bundle, KEY_ENDPOINT, KEY_OPERATION};

use crate::error::HostError;

/// Launch argument naming the application id.
pub const KEY_APP_ID: &str = "app_id";

pub const ENV_LOG_FILE: &str = "WIDGET_HOST_LOG";
pub const ENV_LOG_LEVEL: &str = "WIDGET_HOST_LOG_LEVEL";

const DEFAULT_APP_ID: &str = "org.example.widget.clock";
const DEFAULT_LOG_FILE: &str = "widget-host.log";

/// Everything the host needs before the event loop starts.
#[derive(Debug, Clone)]
pub struct HostConfig {
    pub app_id: String,
    pub viewer_endpoint: Option<String>,
    pub log_file: PathBuf,
    pub log_level: LevelFilter,
    /// The launch arguments as a bundle. Routed as the first start signal
    /// when it carries an operation.
    pub launch: Bundle,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            app_id: DEFAULT_APP_ID.to_string(),
            viewer_endpoint: None,
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
            log_level: LevelFilter::Debug,
            launch: Bundle::new(),
        }
    }
}

impl HostConfig {
    /// Reads the process arguments (program name excluded) and environment.
    pub fn load(args: impl IntoIterator<Item = String>) -> Result<Self, HostError> {
        let mut config = Self::from_args(args)?;
        if let Ok(path) = std::env::var(ENV_LOG_FILE) {
            config.log_file = PathBuf::from(path);
        }
        if let Ok(level) = std::env::var(ENV_LOG_LEVEL) {
            config.log_level = parse_level(&level)?;
        }
        Ok(config)
    }

    /// Reads launch arguments given as alternating keys and values.
    pub fn from_args(args: impl IntoIterator<Item = String>) -> Result<Self, HostError> {
        let mut launch = Bundle::new();
        let mut args = args.into_iter();
        while let Some(key) = args.next() {
            let Some(value) = args.next() else {
                return Err(HostError::Arguments(format!("{key} has no value")));
            };
            launch.insert(key, value);
        }

        let mut config = Self::default();
        if let Some(app_id) = launch.remove(KEY_APP_ID) {
            config.app_id = app_id;
        }
        config.viewer_endpoint = launch.get(KEY_ENDPOINT).cloned();
        config.launch = launch;
        Ok(config)
    }

    /// Whether the launch arguments carry a control operation.
    pub fn has_launch_operation(&self) -> bool {
        self.launch.contains_key(KEY_OPERATION)
    }

    pub fn app_config(&self) -> AppConfig {
        let config = AppConfig::new(self.app_id.clone());
        match &self.viewer_endpoint {
            Some(endpoint) => config.with_viewer_endpoint(endpoint.clone()),
            None => config,
        }
    }
}

fn parse_level(level: &str) -> Result<LevelFilter, HostError> {
    level
        .parse()
        .map_err(|_| HostError::Arguments(format!("unknown log level: {level}")))
}
