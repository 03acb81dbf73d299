use std::{
    any::Any,
    fmt::{self, Display},
    panic::{self, PanicHookInfo},
    sync::{LazyLock, Mutex},
};
use strum_macros::Display;

/// Classes of faults that end the primary process.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum FaultKind {
    Panic,
    ListenerDied,
    Io,
    MalformedTelemetry,
    MapBounds,
}

/// An unrecoverable fault together with where it happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fault {
    kind: FaultKind,
    location: String,
    message: String,
}

/// Location and message of the last panic, captured by the hook before unwinding.
static LAST_PANIC: LazyLock<Mutex<Option<(String, String)>>> = LazyLock::new(|| Mutex::new(None));

impl Fault {
    pub fn new(kind: FaultKind, location: impl Into<String>, message: impl Into<String>) -> Self {
        Self { kind, location: location.into(), message: message.into() }
    }

    pub fn listener_died(listener: &str, message: impl Into<String>) -> Self {
        Self::new(FaultKind::ListenerDied, listener, message)
    }

    pub fn kind(&self) -> FaultKind { self.kind }
    pub fn location(&self) -> &str { &self.location }
    pub fn message(&self) -> &str { &self.message }

    /// Installs a process-wide panic hook recording the location and message of each panic.
    ///
    /// The previous hook keeps running so panics still reach stderr.
    pub fn install_panic_hook() {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info: &PanicHookInfo<'_>| {
            let location = info
                .location()
                .map_or_else(|| "unknown".to_string(), |l| format!("{}:{}", l.file(), l.line()));
            let message = Self::payload_message(info.payload());
            if let Ok(mut last) = LAST_PANIC.lock() {
                *last = Some((location, message));
            }
            previous(info);
        }));
    }

    /// Builds a fault from a caught panic payload, preferring what the hook recorded.
    pub fn from_panic(payload: &(dyn Any + Send)) -> Self {
        let recorded = LAST_PANIC.lock().ok().and_then(|mut last| last.take());
        let (location, message) =
            recorded.unwrap_or_else(|| ("unknown".to_string(), Self::payload_message(payload)));
        Self::new(Self::classify(&message), location, message)
    }

    /// Builds a fault from a task that ended with a join error.
    pub fn from_join(task: &str, err: tokio::task::JoinError) -> Self {
        match err.try_into_panic() {
            Ok(payload) => {
                let mut fault = Self::from_panic(payload.as_ref());
                if fault.location == "unknown" {
                    fault.location = task.to_string();
                }
                fault
            }
            Err(err) => Self::listener_died(task, err.to_string()),
        }
    }

    fn classify(message: &str) -> FaultKind {
        if message.contains("Malformed telemetry") {
            FaultKind::MalformedTelemetry
        } else if message.contains("out of map bounds") {
            FaultKind::MapBounds
        } else {
            FaultKind::Panic
        }
    }

    fn payload_message(payload: &(dyn Any + Send)) -> String {
        if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "non-string panic payload".to_string()
        }
    }
}

impl Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}: {}", self.kind, self.location, self.message)
    }
}

impl std::error::Error for Fault {}

impl From<std::io::Error> for Fault {
    fn from(value: std::io::Error) -> Self { Self::new(FaultKind::Io, "io", value.to_string()) }
}
