//! Log setup
//!
//! Every record goes to stderr and to a log file, formatted as
//! `timestamp - target - LEVEL - message`. Panics are logged the same way
//! instead of going through the default hook, which writes to stderr only.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::any::Any;
use std::panic::{self, Location};
use std::path::Path;

/// Writer that copies everything to the console and, when open, a log file
struct TeeWriter<C: Write, F: Write> {
    console: C,
    file: Option<F>,
}

impl<C: Write, F: Write> Write for TeeWriter<C, F> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.console.write_all(buf)?;
        if let Some(ref mut file) = self.file {
            // Console output still counts when the file write fails
            let _ = file.write_all(buf);
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.console.flush()?;
        if let Some(ref mut file) = self.file {
            let _ = file.flush();
        }
        Ok(())
    }
}

/// Initialize the global logger.
///
/// `RUST_LOG` wins when set; otherwise the level is `info`, or `debug` with
/// `verbose`. If the log file cannot be opened, logging continues on the
/// console only.
pub fn init(log_file: &Path, verbose: bool) {
    if std::env::var("RUST_LOG").is_err() {
        if verbose {
            std::env::set_var("RUST_LOG", "debug");
        } else {
            std::env::set_var("RUST_LOG", "info");
        }
    }

    let (file, open_error) = match OpenOptions::new().create(true).append(true).open(log_file) {
        Ok(file) => (Some(file), None),
        Err(e) => (None, Some(e)),
    };

    let writer: TeeWriter<io::Stderr, File> = TeeWriter {
        console: io::stderr(),
        file,
    };

    env_logger::Builder::from_default_env()
        .format(|buf, record| {
            writeln!(
                buf,
                "{} - {} - {} - {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
                record.target(),
                record.level(),
                record.args()
            )
        })
        .target(env_logger::Target::Pipe(Box::new(writer)))
        .init();

    install_panic_hook();

    if let Some(e) = open_error {
        log::warn!(
            "Cannot open log file {}: {}. Logging to console only",
            log_file.display(),
            e
        );
    }
}

fn panic_line(message: &str, location: Option<&Location<'_>>) -> String {
    match location {
        Some(location) => format!(
            "panicked at {}:{}: {}",
            location.file(),
            location.line(),
            message
        ),
        None => format!("panicked: {}", message),
    }
}

fn panic_payload(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Route panic reports through the logger so they reach the log file.
/// Caught panics (a provider failing on one item) stay non-fatal.
fn install_panic_hook() {
    panic::set_hook(Box::new(|info| {
        log::error!("{}", panic_line(&panic_payload(info.payload()), info.location()));
    }));
}
