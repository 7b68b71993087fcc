use thiserror::Error;
use widget_app::WidgetError;

#[derive(Debug, Error)]
pub enum HostError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed message: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid launch arguments: {0}")]
    Arguments(String),

    #[error("failed to initialize logging: {0}")]
    Logger(#[from] log::SetLoggerError),

    #[error(transparent)]
    Widget(#[from] WidgetError),
}
