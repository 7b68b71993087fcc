//! Runtime configuration.

/// Process-level configuration for a widget application.
///
/// # Example
///
/// ```
/// use widget_app::AppConfig;
///
/// let config = AppConfig::new("org.example.weather")
///     .with_viewer_endpoint("org.example.viewer:widget")
///     .keep_alive_when_empty();
/// assert_eq!(config.app_id, "org.example.weather");
/// ```
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Application id. Doubles as the default class id for control messages
    /// that do not name a class.
    pub app_id: String,

    /// Channel the viewer listens on for status reports.
    ///
    /// Usually supplied by the launch arguments; a control message carrying
    /// an endpoint replaces it.
    pub viewer_endpoint: Option<String>,

    /// Whether the host supports widget applications at all.
    ///
    /// When false, every public entry point fails with `NotSupported`.
    pub feature_enabled: bool,

    /// Request process exit once the last instance is destroyed.
    ///
    /// Default: true
    pub exit_when_empty: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            app_id: "org.example.widget".to_string(),
            viewer_endpoint: None,
            feature_enabled: true,
            exit_when_empty: true,
        }
    }
}

impl AppConfig {
    /// Creates a config for the given application id.
    pub fn new(app_id: impl Into<String>) -> Self {
        Self {
            app_id: app_id.into(),
            ..Default::default()
        }
    }

    /// Sets the viewer endpoint.
    pub fn with_viewer_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.viewer_endpoint = Some(endpoint.into());
        self
    }

    /// Marks the widget feature as unavailable on this host.
    pub fn feature_disabled(mut self) -> Self {
        self.feature_enabled = false;
        self
    }

    /// Keep the process running after the last instance is destroyed.
    pub fn keep_alive_when_empty(mut self) -> Self {
        self.exit_when_empty = false;
        self
    }
}
