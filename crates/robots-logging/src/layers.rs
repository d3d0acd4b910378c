//! Custom tracing layers for the Robots program
//!
//! [`LogSourceLayer`] forwards tracing events into a [`LogSource`], so
//! everything the application logs through `tracing` also shows up in the
//! log window.
//!
//! Listeners run inside `append`, that is inside the subscriber callback.
//! A thread-local flag marks the forwarding in progress; events raised while
//! it is set (a listener that logs, the registry reporting a panicking
//! listener) are not forwarded again, so they never feed back into the store.

use std::cell::Cell;
use std::fmt::{self, Write as _};
use std::sync::Arc;

use robots_log::{LogLevel, LogSource};
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::{Context, Layer};

use crate::config::BridgeConfig;

/// Layer that appends every tracing event to a log source
pub struct LogSourceLayer {
    source: Arc<LogSource>,
    min_level: LogLevel,
    include_target: bool,
}

impl LogSourceLayer {
    /// Forward `Info` and above into `source`
    pub fn new(source: Arc<LogSource>) -> Self {
        Self {
            source,
            min_level: LogLevel::Info,
            include_target: false,
        }
    }

    pub fn from_config(source: Arc<LogSource>, config: &BridgeConfig) -> Self {
        Self::new(source)
            .with_min_level(config.min_level)
            .with_target(config.include_target)
    }

    /// Least severe level that is forwarded
    pub fn with_min_level(mut self, level: LogLevel) -> Self {
        self.min_level = level;
        self
    }

    /// Prefix messages with the event target (`robots_console::viewer: ...`)
    pub fn with_target(mut self, include: bool) -> Self {
        self.include_target = include;
        self
    }
}

impl<S> Layer<S> for LogSourceLayer
where
    S: Subscriber,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let level = LogLevel::from(*event.metadata().level());
        if level < self.min_level {
            return;
        }

        let Some(_guard) = ForwardingGuard::enter() else {
            return;
        };

        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);

        let text = if self.include_target {
            format!("{}: {}", event.metadata().target(), visitor.into_text())
        } else {
            visitor.into_text()
        };

        self.source.append(level, text);
    }
}

thread_local! {
    static FORWARDING: Cell<bool> = const { Cell::new(false) };
}

/// Marks this thread as forwarding an event; cleared on drop
struct ForwardingGuard;

impl ForwardingGuard {
    fn enter() -> Option<Self> {
        FORWARDING.with(|flag| {
            if flag.replace(true) {
                None
            } else {
                Some(ForwardingGuard)
            }
        })
    }
}

impl Drop for ForwardingGuard {
    fn drop(&mut self) {
        FORWARDING.with(|flag| flag.set(false));
    }
}

/// Collects the `message` field and renders the rest as `key=value`
#[derive(Default)]
struct MessageVisitor {
    message: String,
    fields: String,
}

impl MessageVisitor {
    fn push_field(&mut self, name: &str, value: fmt::Arguments<'_>) {
        if !self.fields.is_empty() {
            self.fields.push(' ');
        }
        let _ = write!(self.fields, "{name}={value}");
    }

    fn into_text(self) -> String {
        match (self.message.is_empty(), self.fields.is_empty()) {
            (_, true) => self.message,
            (true, false) => self.fields,
            (false, false) => format!("{} {}", self.message, self.fields),
        }
    }
}

impl Visit for MessageVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message.push_str(value);
        } else {
            self.push_field(field.name(), format_args!("{value}"));
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            let _ = write!(self.message, "{value:?}");
        } else {
            self.push_field(field.name(), format_args!("{value:?}"));
        }
    }
}
