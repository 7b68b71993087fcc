//! The widget process event loop.

use log::{debug, info};
use tokio::sync::mpsc::UnboundedReceiver;

use crate::app::WidgetApp;
use crate::error::Result;
use crate::router::HostEvent;

/// Drives a [`WidgetApp`] from a stream of host events.
///
/// One event is routed to completion per iteration. Work queued by callbacks
/// runs after the event that queued it, before the next event is read.
pub struct Runtime {
    app: WidgetApp,
}

impl Runtime {
    pub fn new(app: WidgetApp) -> Self {
        Self { app }
    }

    /// Runs until exit is requested or the event channel closes, then shuts
    /// the application down and hands it back.
    ///
    /// Fails only when the application cannot start.
    pub async fn run(mut self, mut events: UnboundedReceiver<HostEvent>) -> Result<WidgetApp> {
        self.app.start()?;
        self.app.run_pending();

        while !self.app.is_exit_requested() {
            let Some(event) = events.recv().await else {
                debug!("host event channel closed");
                break;
            };

            self.app.handle(event);
            self.app.run_pending();
        }

        info!("leaving event loop");
        self.app.shutdown();
        Ok(self.app)
    }
}
