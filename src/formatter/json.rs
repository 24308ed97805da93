//! JSON lines sink.

use std::fmt;
use std::io::{self, Write};
use std::sync::{Mutex, PoisonError};

use crate::events::{EndEvent, LogEvent, StartEvent};
use crate::formatter::Formatter;

/// Writes each event as one JSON document followed by a newline.
pub struct JsonFormatter {
    writer: Mutex<Box<dyn Write + Send>>,
    pretty: bool,
}

impl JsonFormatter {
    pub fn new(writer: impl Write + Send + 'static) -> Self {
        Self {
            writer: Mutex::new(Box::new(writer)),
            pretty: false,
        }
    }

    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }

    /// Indent documents. Each event then spans several lines.
    pub fn pretty(mut self) -> Self {
        self.pretty = true;
        self
    }

    fn write(&self, event: LogEvent) {
        let rendered = if self.pretty {
            serde_json::to_string_pretty(&event)
        } else {
            serde_json::to_string(&event)
        };
        let line = match rendered {
            Ok(line) => line,
            Err(e) => {
                tracing::error!(kind = event.kind(), error = %e, "Failed to serialize event");
                return;
            }
        };

        let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        if let Err(e) = writeln!(writer, "{line}").and_then(|_| writer.flush()) {
            tracing::warn!(kind = event.kind(), url = %event.url(), error = %e, "Failed to write event");
        }
    }
}

impl fmt::Debug for JsonFormatter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsonFormatter")
            .field("pretty", &self.pretty)
            .finish_non_exhaustive()
    }
}

impl Formatter for JsonFormatter {
    fn on_request_start(&self, event: StartEvent) {
        self.write(event.into());
    }

    fn on_request_end(&self, event: EndEvent) {
        self.write(event.into());
    }
}
