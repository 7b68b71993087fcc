//! Line-delimited JSON between the host process and its supervisor.
//!
//! Each inbound line is one [`Inbound`] message and becomes one
//! [`HostEvent`]. Status reports leave as [`Outbound`] lines on stdout.

use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use widget_app::events::SystemEvent;
use widget_app::platform::StatusTransport;
use widget_app::router::{Bundle, HostEvent, LaunchSignal, SurfaceEvent};
use widget_app::status::StatusReport;
use widget_app::{Result as WidgetResult, WidgetError};

use crate::error::HostError;

/// Longest accepted inbound line, in bytes.
pub const MAX_LINE: usize = 65_536;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "t", rename_all = "snake_case")]
pub enum Inbound {
    Start {
        #[serde(default)]
        bundle: Bundle,
    },
    Resume,
    Terminate,
    Window {
        event: SurfaceEvent,
    },
    System {
        event: SystemEvent,
    },
}

impl From<Inbound> for HostEvent {
    fn from(message: Inbound) -> Self {
        match message {
            Inbound::Start { bundle } => LaunchSignal::Start(bundle).into(),
            Inbound::Resume => LaunchSignal::Resume.into(),
            Inbound::Terminate => LaunchSignal::Terminate.into(),
            Inbound::Window { event } => event.into(),
            Inbound::System { event } => event.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "t", rename_all = "snake_case")]
pub enum Outbound {
    Status {
        endpoint: String,
        report: StatusReport,
    },
}

/// Decodes one line. Blank lines yield `None`.
pub fn decode_line(line: &str) -> Result<Option<Inbound>, HostError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    Ok(Some(serde_json::from_str(line)?))
}

/// Encodes one message as a newline-terminated line.
pub fn encode(message: &Outbound) -> Result<Vec<u8>, HostError> {
    let mut line = serde_json::to_vec(message)?;
    line.push(b'\n');
    Ok(line)
}

/// Forwards decoded lines until the input ends or the receiver goes away.
///
/// Malformed and oversized lines are logged and skipped.
pub async fn reader_loop<R>(reader: R, tx: UnboundedSender<HostEvent>) -> Result<(), HostError>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    while let Some(line) = lines.next_line().await? {
        if line.len() > MAX_LINE {
            log::warn!("dropping oversized line: {} bytes", line.len());
            continue;
        }

        let message = match decode_line(&line) {
            Ok(Some(message)) => message,
            Ok(None) => continue,
            Err(err) => {
                log::warn!("dropping malformed line: {err}");
                continue;
            }
        };

        log::trace!("inbound: {:?}", message);
        if tx.send(message.into()).is_err() {
            log::debug!("event loop is gone, stopping reader");
            break;
        }
    }
    Ok(())
}

/// Writes outbound messages until every sender is dropped.
pub async fn writer_loop<W>(mut rx: UnboundedReceiver<Outbound>, mut writer: W) -> Result<(), HostError>
where
    W: AsyncWrite + Unpin,
{
    while let Some(message) = rx.recv().await {
        writer.write_all(&encode(&message)?).await?;
        writer.flush().await?;
    }
    Ok(())
}

/// Status transport that queues reports for the writer task.
#[derive(Debug, Clone)]
pub struct StdioTransport {
    tx: UnboundedSender<Outbound>,
}

impl StdioTransport {
    pub fn new(tx: UnboundedSender<Outbound>) -> Self {
        Self { tx }
    }
}

impl StatusTransport for StdioTransport {
    fn send(&mut self, endpoint: &str, report: &StatusReport) -> WidgetResult<()> {
        let message = Outbound::Status {
            endpoint: endpoint.to_string(),
            report: report.clone(),
        };
        self.tx
            .send(message)
            .map_err(|_| WidgetError::io("status writer is closed"))
    }
}
