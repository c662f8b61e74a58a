use chrono::Local;
use std::{
    backtrace::Backtrace,
    fs::OpenOptions,
    io::Write,
    panic::{PanicHookInfo, take_hook},
    path::{Path, PathBuf},
    thread,
};

use crate::logging::LOG_FILE_PREFIX;

/// Installs a global panic hook that logs panics via `tracing`.
///
/// When `log_dir` is set and the binary aborts on panic, the record is also
/// appended straight to the current daily log file: the non-blocking writer
/// may not flush before the process dies.
pub fn install(log_dir: Option<PathBuf>) {
    let previous_hook = take_hook();

    std::panic::set_hook(Box::new(move |panic_info: &PanicHookInfo<'_>| {
        let _ = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let panic_record = format_panic_record(panic_info);

            tracing::error!(target: "affiliate_tracker::panic", "{panic_record}");

            if cfg!(panic = "abort")
                && let Some(dir) = &log_dir
            {
                let _ = append_panic_record(dir, &panic_record);
            }
        }));

        previous_hook(panic_info);
    }));
}

fn append_panic_record(log_dir: &Path, record: &str) -> std::io::Result<()> {
    let filename = format!("{LOG_FILE_PREFIX}.{}", Local::now().format("%Y-%m-%d"));
    let path = log_dir.join(filename);

    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    writeln!(file, "{record}")?;
    file.flush()
}

fn format_panic_record(panic_info: &PanicHookInfo<'_>) -> String {
    let payload = panic_payload_to_string(panic_info);
    let location = panic_info
        .location()
        .map(|loc| format!("{}:{}:{}", loc.file(), loc.line(), loc.column()))
        .unwrap_or_else(|| "<unknown>".to_string());

    let thread_name = thread::current()
        .name()
        .map(str::to_string)
        .unwrap_or_else(|| "<unnamed>".to_string());

    let backtrace = Backtrace::force_capture();
    let ts = Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z");

    format!(
        "{ts} PANIC thread={thread_name} location={location} payload={payload}\nBacktrace:\n{backtrace}"
    )
}

fn panic_payload_to_string(panic_info: &PanicHookInfo<'_>) -> String {
    if let Some(s) = panic_info.payload().downcast_ref::<&'static str>() {
        return (*s).to_string();
    }
    if let Some(s) = panic_info.payload().downcast_ref::<String>() {
        return s.clone();
    }
    panic_info.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_panic_record_uses_daily_file() {
        let dir = tempfile::tempdir().unwrap();
        append_panic_record(dir.path(), "PANIC boom").unwrap();
        append_panic_record(dir.path(), "PANIC again").unwrap();

        let expected = dir
            .path()
            .join(format!("{LOG_FILE_PREFIX}.{}", Local::now().format("%Y-%m-%d")));
        let contents = std::fs::read_to_string(expected).unwrap();
        assert_eq!(contents, "PANIC boom\nPANIC again\n");
    }
}
