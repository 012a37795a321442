use std::fmt::{self, Write as _};
use std::io::Write;
use std::sync::{Mutex, OnceLock};

use anyhow::Result;
use chrono::Local;
use serde_json::json;
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S,%3f";

static LOGGER_NAME: OnceLock<String> = OnceLock::new();

/// Install the process-wide JSON line logger on stderr.
///
/// Calling this again with the same name is a no-op. `RUST_LOG` overrides
/// `level` when it is set.
pub fn init(name: &str, level: &str) -> Result<()> {
    if let Some(existing) = LOGGER_NAME.get() {
        if existing == name {
            return Ok(());
        }
        anyhow::bail!("logging is already initialised for '{}'", existing);
    }

    tracing_subscriber::registry()
        .with(env_filter(level))
        .with(JsonLineLayer::new(name, std::io::stderr()))
        .try_init()?;

    let _ = LOGGER_NAME.set(name.to_string());
    Ok(())
}

fn env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("milton={},tower_http=info", level)))
}

/// Renders each event as `{"timestamp", "name", "level", "message"}` on one line.
pub struct JsonLineLayer<W> {
    name: String,
    writer: Mutex<W>,
}

impl<W: Write + Send + 'static> JsonLineLayer<W> {
    pub fn new(name: impl Into<String>, writer: W) -> Self {
        Self {
            name: name.into(),
            writer: Mutex::new(writer),
        }
    }
}

impl<S, W> Layer<S> for JsonLineLayer<W>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    W: Write + Send + 'static,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);

        let line = json!({
            "timestamp": Local::now().format(TIMESTAMP_FORMAT).to_string(),
            "name": self.name,
            "level": event.metadata().level().to_string(),
            "message": visitor.finish(),
        });

        if let Ok(mut writer) = self.writer.lock() {
            let _ = writeln!(writer, "{}", line);
        }
    }
}

/// Collects the `message` field, then any other fields as ` key=value`.
#[derive(Default)]
struct MessageVisitor {
    message: String,
    fields: String,
}

impl MessageVisitor {
    fn finish(self) -> String {
        self.message + &self.fields
    }
}

impl Visit for MessageVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message.push_str(value);
        } else {
            let _ = write!(self.fields, " {}={}", field.name(), value);
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            let _ = write!(self.message, "{:?}", value);
        } else {
            let _ = write!(self.fields, " {}={:?}", field.name(), value);
        }
    }
}
