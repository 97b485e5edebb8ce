use std::{fmt, sync::Arc};

use log::Level;

use crate::Status;

/// A message a model emits through its [`Callbacks`].
///
/// The message is already formatted; the callback never interprets it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogMessage<'a> {
    pub instance_name: &'a str,
    pub status: Status,
    pub category: &'a str,
    pub message: &'a str,
}

type Logger = dyn Fn(&LogMessage<'_>) + Send + Sync;

/// Callbacks handed to a model when it is instantiated.
///
/// The default forwards every message to [`log_message`].
#[derive(Clone)]
pub struct Callbacks {
    logger: Arc<Logger>,
}

impl Callbacks {
    /// Creates callbacks that pass model messages to `logger`.
    pub fn new(logger: impl Fn(&LogMessage<'_>) + Send + Sync + 'static) -> Self {
        Self {
            logger: Arc::new(logger),
        }
    }

    /// Delivers a message to the logger.
    pub fn log(&self, message: &LogMessage<'_>) {
        (self.logger)(message);
    }
}

impl Default for Callbacks {
    fn default() -> Self {
        Self::new(log_message)
    }
}

impl fmt::Debug for Callbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callbacks").finish_non_exhaustive()
    }
}

/// Forwards a model message to the `log` facade under `strand::model`.
pub fn log_message(message: &LogMessage<'_>) {
    let level = level_of(message.status);
    let instance_name = or_unknown(message.instance_name);
    let category = or_unknown(message.category);

    log::log!(
        target: "strand::model",
        level,
        "{} {instance_name} ({category}): {}",
        message.status,
        message.message
    );
}

fn level_of(status: Status) -> Level {
    match status {
        Status::Ok => Level::Info,
        Status::Warning => Level::Warn,
        Status::Pending => Level::Debug,
        Status::Discard | Status::Error | Status::Fatal => Level::Error,
    }
}

fn or_unknown(text: &str) -> &str {
    if text.is_empty() { "?" } else { text }
}
