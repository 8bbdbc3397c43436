use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::panic;
use std::path::PathBuf;
use std::sync::{mpsc, Mutex};
use std::thread;

use simplelog::{ColorChoice, Config, LevelFilter, TermLogger, TerminalMode};

// Log entry structure
struct LogEntry {
    domain: String,
    message: String,
    timestamp: String,
}

lazy_static::lazy_static! {
    static ref LOG_TX: Mutex<Option<mpsc::Sender<LogEntry>>> = Mutex::new(None);
    static ref LOG_DIR_PATH: Mutex<Option<PathBuf>> = Mutex::new(None);
}

/// Map a log domain to its file name
fn domain_file(domain: &str) -> &'static str {
    match domain {
        "audit" => "audit.log",
        "replay" => "replay.log",
        "diff" => "diff.log",
        "crash" => "crash.log",
        _ => "custom.log",
    }
}

fn domain_prefix(domain: &str) -> &'static str {
    match domain {
        "audit" => "[AUDIT]",
        "replay" => "[REPLAY]",
        "diff" => "[DIFF]",
        "crash" => "[CRASH]",
        _ => "",
    }
}

fn console_level(verbose: bool) -> LevelFilter {
    if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    }
}

/// Install a terminal logger for the `log` macros.
///
/// Safe to call more than once; later calls are ignored.
pub fn init_console_logger(verbose: bool) {
    let level = console_level(verbose);
    if TermLogger::init(level, Config::default(), TerminalMode::Mixed, ColorChoice::Auto).is_err() {
        log::debug!("Console logger already initialized");
    }
}

/// Initialize the log directory and start the background logger thread
pub fn init_log_dir(path: PathBuf) {
    // Store path for panic hook
    if let Ok(mut dir) = LOG_DIR_PATH.lock() {
        *dir = Some(path.clone());
    }

    let (tx, rx) = mpsc::channel::<LogEntry>();

    if let Ok(mut global_tx) = LOG_TX.lock() {
        *global_tx = Some(tx);
    }

    thread::spawn(move || {
        let mut file_cache: HashMap<&'static str, File> = HashMap::new();
        let log_dir = path.join("logs");

        if !log_dir.exists() {
            let _ = std::fs::create_dir_all(&log_dir);
        }

        while let Ok(entry) = rx.recv() {
            let filename = domain_file(&entry.domain);

            if !file_cache.contains_key(filename) {
                match OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(log_dir.join(filename))
                {
                    Ok(file) => {
                        file_cache.insert(filename, file);
                    }
                    Err(e) => {
                        eprintln!("Failed to open log {}: {}", filename, e);
                        continue;
                    }
                }
            }

            let prefix = domain_prefix(&entry.domain);
            let final_message = if !prefix.is_empty() && !entry.message.contains(prefix) {
                format!("{} {}", prefix, entry.message)
            } else {
                entry.message
            };

            if let Some(file) = file_cache.get_mut(filename) {
                if let Err(e) = writeln!(file, "[{}] {}", entry.timestamp, final_message) {
                    eprintln!("Failed to write log: {}", e);
                    // Reopen on the next entry
                    file_cache.remove(filename);
                }
            }
        }
    });
}

/// Setup panic hook to log crashes to crash.log
/// Note: Panic hook runs in the crashing thread, so we avoid using the channel
/// to ensure we can write even if the channel/logger thread is dead or deadlocked.
pub fn setup_panic_hook() {
    panic::set_hook(Box::new(|info| {
        let msg = format!(
            "{}\nBacktrace: {:?}\n",
            info,
            std::backtrace::Backtrace::capture()
        );
        eprintln!("{}", msg);

        if let Ok(guard) = LOG_DIR_PATH.lock() {
            if let Some(ref dir) = *guard {
                let crash_file = dir.join("logs").join(domain_file("crash"));
                if let Some(parent) = crash_file.parent() {
                    let _ = std::fs::create_dir_all(parent);
                }

                if let Ok(mut file) = OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(crash_file)
                {
                    let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");
                    let _ = writeln!(file, "[{}] {}", timestamp, msg);
                }
            }
        }
    }));
}

/// Queue a message to be written to a specialized domain log file
pub fn write_domain_log(domain: &str, message: &str) -> std::io::Result<()> {
    if let Ok(guard) = LOG_TX.lock() {
        if let Some(tx) = &*guard {
            let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
            let _ = tx.send(LogEntry {
                domain: domain.to_string(),
                message: message.to_string(),
                timestamp,
            });
            return Ok(());
        }
    }
    Err(std::io::Error::new(
        std::io::ErrorKind::Other,
        "Logger not initialized",
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_files() {
        assert_eq!(domain_file("replay"), "replay.log");
        assert_eq!(domain_file("diff"), "diff.log");
        assert_eq!(domain_file("unknown"), "custom.log");
        assert_eq!(domain_prefix("unknown"), "");
    }

    #[test]
    fn test_console_level() {
        assert_eq!(console_level(true), LevelFilter::Debug);
        assert_eq!(console_level(false), LevelFilter::Info);
    }

    #[test]
    fn test_console_logger_is_idempotent() {
        init_console_logger(false);
        init_console_logger(true);
    }
}
