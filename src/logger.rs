use chrono::Utc;
use std::{
    fs::OpenOptions,
    io::Write,
    path::{Path, PathBuf},
};

#[macro_export]
macro_rules! info {
    ($($arg:tt)*) => {
        println!("\x1b[32m[INFO] [{}]\x1b[0m {}", chrono::Utc::now().format("%H:%M:%S"), format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log {
    ($($arg:tt)*) => {
        println!("\x1b[33m[LOG]  [{}]\x1b[0m {}", chrono::Utc::now().format("%H:%M:%S"), format!($($arg)*))
    };
}

#[macro_export]
macro_rules! warn {
    ($($arg:tt)*) => {
        println!("\x1b[35m[WARN] [{}]\x1b[0m {}", chrono::Utc::now().format("%H:%M:%S"), format!($($arg)*))
    };
}

#[macro_export]
macro_rules! error {
    ($($arg:tt)*) => {
        println!("\x1b[31m[ERROR][{}]\x1b[0m {}", chrono::Utc::now().format("%H:%M:%S"), format!($($arg)*))
    };
}

#[macro_export]
macro_rules! fatal {
    ($($arg:tt)*) => {
        panic!("\x1b[1;31m[FATAL][{}]\x1b[0m {}", chrono::Utc::now().format("%H:%M:%S"), format!($($arg)*))
    };
}

#[macro_export]
macro_rules! obj {
    ($($arg:tt)*) => {
        println!("\x1b[1;34m[OBJ]  [{}]\x1b[0m {}", chrono::Utc::now().format("%H:%M:%S"), format!($($arg)*))
    };
}

#[macro_export]
macro_rules! event {
    ($($arg:tt)*) => {
        if std::env::var("LOG_MELVIN_EVENTS").is_ok() {
            println!("\x1b[36m[EVENT][{}]\x1b[0m {}", chrono::Utc::now().format("%H:%M:%S"), format!($($arg)*))
        }
    };
}

/// Append-only text logs recording every terminal outcome MELVIN produces.
///
/// Each record is written with a fresh open-append-close cycle so a crash between two
/// records never leaves a buffered record behind.
#[derive(Debug, Clone)]
pub struct AuditLog {
    /// Directory holding all audit files.
    dir: PathBuf,
}

impl AuditLog {
    /// File name for successfully completed objectives and beacons.
    pub const SUCCESS_FILE: &'static str = "SUCCESSES.txt";
    /// File name for failed or expired objectives and beacons.
    pub const FAILURE_FILE: &'static str = "FAILURES.txt";
    /// File name for the crash diagnostics.
    pub const EXCEPTION_FILE: &'static str = "exceptions.log";
    /// File name for accepted beacon pings of the running beacon task.
    pub const PING_FILE: &'static str = "ping_log.txt";
    /// File name the ping log is archived into once a beacon task terminates.
    pub const PING_ARCHIVE_FILE: &'static str = "ping_log_archive.txt";

    /// Creates a new [`AuditLog`] writing into `dir`.
    pub fn new(dir: impl AsRef<Path>) -> Self { Self { dir: dir.as_ref().to_path_buf() } }

    /// Returns the full path of an audit file.
    pub fn path_of(&self, file: &str) -> PathBuf { self.dir.join(file) }

    /// Records a successful objective or beacon.
    pub fn success(&self, subject: &str) {
        self.append(Self::SUCCESS_FILE, &format!("{subject}\nSUCCESS\n"));
    }

    /// Records a failed objective or beacon together with the reason.
    pub fn failure(&self, subject: &str, reason: &str) {
        self.append(Self::FAILURE_FILE, &format!("{subject}\nFailed: {reason}\n"));
    }

    /// Records an accepted beacon ping.
    pub fn ping(&self, beacon_id: usize, pos: (f64, f64), estimated_range: f64) {
        self.append(
            Self::PING_FILE,
            &format!(
                "[BEACON SUCCESS] PING for Beacon with ID: {beacon_id} found at {:.0} , {:.0}, with actual distance: {estimated_range:.0}\n",
                pos.0, pos.1
            ),
        );
    }

    /// Records a crash diagnostic framed by a separator banner.
    pub fn exception(&self, kind: &str, location: &str, message: &str) {
        let banner = "=".repeat(80);
        self.append(
            Self::EXCEPTION_FILE,
            &format!(
                "\n{banner}\nEXCEPTION\nType: {kind}\nLocation: {location}\nMessage: {message}\n{banner}\n"
            ),
        );
    }

    /// Moves the contents of the ping log into the archive and truncates it.
    pub fn archive_pings(&self) {
        let ping_path = self.path_of(Self::PING_FILE);
        let Ok(content) = std::fs::read_to_string(&ping_path) else {
            return;
        };
        if !content.is_empty() {
            Self::append_raw(&self.path_of(Self::PING_ARCHIVE_FILE), &content);
        }
        if let Err(e) = std::fs::write(&ping_path, "") {
            error!("Could not truncate ping log: {e}");
        }
    }

    /// Appends a timestamped record to one of the audit files.
    fn append(&self, file: &str, record: &str) {
        let stamped = format!("[{}] {record}", Utc::now().format("%Y-%m-%d %H:%M:%S"));
        Self::append_raw(&self.path_of(file), &stamped);
    }

    fn append_raw(path: &Path, text: &str) {
        let res = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .and_then(|mut f| f.write_all(text.as_bytes()));
        if let Err(e) = res {
            error!("Could not append to audit file {}: {e}", path.display());
        }
    }
}
