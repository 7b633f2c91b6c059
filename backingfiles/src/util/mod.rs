pub mod process;

use std::path::{Path, PathBuf};

use backingfiles_shared::errors::{BackingfilesError, BackingfilesResult};
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

pub use process::{path_arg, run_tool, tool_succeeds};

/// System binary directories that are often missing from a non-root PATH.
const SBIN_DIRS: &[&str] = &["/usr/local/sbin", "/usr/sbin", "/sbin"];

/// Find a binary on PATH or in the system sbin directories.
///
/// # Arguments
/// * `binary_name` - Name of the binary to find (e.g., "mkfs.exfat")
///
/// # Returns
/// * `Ok(PathBuf)` - Path to the found binary
/// * `Err(...)` - Binary not found in any expected location
pub fn find_binary(binary_name: &str) -> BackingfilesResult<PathBuf> {
    find_binary_in(binary_name, search_dirs())
}

/// PATH entries followed by [`SBIN_DIRS`].
fn search_dirs() -> Vec<PathBuf> {
    let path_var = std::env::var_os("PATH").unwrap_or_default();
    std::env::split_paths(&path_var)
        .chain(SBIN_DIRS.iter().map(PathBuf::from))
        .collect()
}

fn find_binary_in(
    binary_name: &str,
    dirs: impl IntoIterator<Item = PathBuf>,
) -> BackingfilesResult<PathBuf> {
    let candidates: Vec<PathBuf> = dirs.into_iter().map(|d| d.join(binary_name)).collect();

    for candidate in &candidates {
        if candidate.is_file() {
            tracing::debug!(binary = %candidate.display(), "Found binary");
            return Ok(candidate.clone());
        }
    }

    let locations = candidates
        .iter()
        .map(|p| format!("  - {}", p.display()))
        .collect::<Vec<_>>()
        .join("\n");

    Err(BackingfilesError::Unsupported(format!(
        "Binary '{}' not found.\nSearched locations:\n{}",
        binary_name, locations
    )))
}

/// Locate `binary_name` with [`find_binary`] and run the resolved path.
///
/// `sfdisk`, `losetup` and the `mkfs` tools usually live in sbin
/// directories, which a non-root PATH may not include.
pub fn run_binary<S: AsRef<std::ffi::OsStr>>(
    binary_name: &str,
    args: &[S],
    stdin: Option<&str>,
) -> BackingfilesResult<String> {
    run_binary_in(binary_name, search_dirs(), args, stdin)
}

fn run_binary_in<S: AsRef<std::ffi::OsStr>>(
    binary_name: &str,
    dirs: impl IntoIterator<Item = PathBuf>,
    args: &[S],
    stdin: Option<&str>,
) -> BackingfilesResult<String> {
    let program = find_binary_in(binary_name, dirs)?;
    run_tool(&program, args, stdin)
}

/// Install the global tracing subscriber.
///
/// Logs go to stderr; when `log_file` is given they are also appended to that
/// file through a non-blocking writer. The returned guard must be held until
/// exit so buffered file output is flushed.
pub fn init_tracing(
    env_filter: EnvFilter,
    log_file: Option<&Path>,
) -> BackingfilesResult<Option<WorkerGuard>> {
    let stderr_layer = fmt::layer().with_writer(std::io::stderr);

    let Some(log_file) = log_file else {
        let _ = tracing_subscriber::registry()
            .with(env_filter)
            .with(stderr_layer)
            .try_init();
        return Ok(None);
    };

    let (non_blocking, guard) = file_writer(log_file)?;
    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_target(true)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .with_ansi(false),
        )
        .try_init();

    Ok(Some(guard))
}

fn file_writer(log_file: &Path) -> BackingfilesResult<(NonBlocking, WorkerGuard)> {
    let dir = log_file
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let name = log_file.file_name().ok_or_else(|| {
        BackingfilesError::InvalidArgument(format!("Invalid log file: {}", log_file.display()))
    })?;

    std::fs::create_dir_all(dir).map_err(|e| {
        BackingfilesError::Storage(format!(
            "Failed to create log directory {}: {}",
            dir.display(),
            e
        ))
    })?;

    let appender = tracing_appender::rolling::never(dir, name);
    Ok(tracing_appender::non_blocking(appender))
}
