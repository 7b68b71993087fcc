mod config;
mod demo;
mod error;
mod protocol;

use std::fs::File;

use log::{debug, error, info, warn};
use simplelog::{Config, WriteLogger};
use tokio::io::BufReader;
use tokio::sync::mpsc::{self, UnboundedSender};
use widget_app::platform::{Platform, SettingKey, SystemSettings};
use widget_app::router::{HostEvent, LaunchSignal};
use widget_app::{Runtime, WidgetApp};

use crate::config::HostConfig;
use crate::error::HostError;
use crate::protocol::{StdioTransport, reader_loop, writer_loop};

/// Settings binding for a host without a settings daemon: every watch is
/// accepted and locale changes only show up in the log.
struct LoggedSettings;

impl SystemSettings for LoggedSettings {
    fn watch(&mut self, key: SettingKey) {
        debug!("watching {:?}", key);
    }

    fn unwatch(&mut self, key: SettingKey) {
        debug!("no longer watching {:?}", key);
    }

    fn apply_language(&mut self, locale: &str) {
        info!("language is now {}", locale);
    }

    fn apply_region(&mut self, region: &str) {
        info!("region format is now {}", region);
    }
}

/// Queues the launch arguments as the first control message when they name
/// an operation. Returns whether a message was queued.
fn queue_launch(config: &HostConfig, tx: &UnboundedSender<HostEvent>) -> bool {
    if !config.has_launch_operation() {
        return false;
    }
    match tx.send(LaunchSignal::Start(config.launch.clone()).into()) {
        Ok(()) => true,
        Err(err) => {
            warn!("launch message lost: {err}");
            false
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    if let Err(err) = run().await {
        error!("widget host failed: {err}");
        eprintln!("widget-host: {err}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), HostError> {
    let config = HostConfig::load(std::env::args().skip(1))?;

    let log_file = File::create(&config.log_file)?;
    WriteLogger::init(config.log_level, Config::default(), log_file)?;
    info!("starting widget host for {}", config.app_id);

    let (event_tx, event_rx) = mpsc::unbounded_channel::<HostEvent>();
    let (out_tx, out_rx) = mpsc::unbounded_channel();

    queue_launch(&config, &event_tx);

    let reader = tokio::spawn(reader_loop(BufReader::new(tokio::io::stdin()), event_tx));
    let writer = tokio::spawn(writer_loop(out_rx, tokio::io::stdout()));

    let platform = Platform::new(StdioTransport::new(out_tx)).with_settings(LoggedSettings);
    let app = WidgetApp::new(config.app_config(), demo::ClockApp, platform);
    let app = Runtime::new(app).run(event_rx).await?;
    info!("event loop finished");

    // Dropping the app closes the last status sender so the writer drains.
    drop(app);
    reader.abort();
    match writer.await {
        Ok(result) => result?,
        Err(err) => error!("writer task failed: {err}"),
    }
    Ok(())
}
