//! External tool invocation.
//!
//! Every disk tool runs to completion before the next step starts; a non-zero
//! exit is turned into `BackingfilesError::Tool` carrying the tool's stderr.

use std::ffi::OsStr;
use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};

use backingfiles_shared::errors::{BackingfilesError, BackingfilesResult};

/// Run `program` with `args`, optionally feeding `stdin`, and return its stdout.
///
/// `program` is spawned as given; pass a path from
/// [`find_binary`](super::find_binary) for tools outside PATH.
///
/// # Errors
/// * The program cannot be spawned (missing binary, permissions)
/// * The program exits with a non-zero status
pub fn run_tool<P: AsRef<OsStr>, S: AsRef<OsStr>>(
    program: P,
    args: &[S],
    stdin: Option<&str>,
) -> BackingfilesResult<String> {
    let program = Path::new(program.as_ref());
    let name = program.display();

    let mut cmd = Command::new(program);
    cmd.args(args)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .stdin(if stdin.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        });

    tracing::debug!(program = %name, "Running external tool");

    let mut child = cmd
        .spawn()
        .map_err(|e| BackingfilesError::Tool(format!("Failed to run {}: {}", name, e)))?;

    if let Some(input) = stdin
        && let Some(mut pipe) = child.stdin.take()
    {
        pipe.write_all(input.as_bytes()).map_err(|e| {
            BackingfilesError::Tool(format!("Failed to write to {} stdin: {}", name, e))
        })?;
    }

    let output = child
        .wait_with_output()
        .map_err(|e| BackingfilesError::Tool(format!("Failed to wait for {}: {}", name, e)))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(BackingfilesError::Tool(format!(
            "{} failed with exit code {:?}: {}",
            name,
            output.status.code(),
            stderr.trim()
        )));
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Run a tool only for its exit status; spawn failures count as `false`.
pub fn tool_succeeds<P: AsRef<OsStr>>(program: P, args: &[&str]) -> bool {
    Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|status| status.success())
        .unwrap_or(false)
}

/// Render a path argument, rejecting paths that are not valid UTF-8.
pub fn path_arg(path: &Path) -> BackingfilesResult<&str> {
    path.to_str().ok_or_else(|| {
        BackingfilesError::InvalidArgument(format!("Invalid path: {}", path.display()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_tool_captures_stdout() {
        let out = run_tool("sh", &["-c", "echo hello"], None).unwrap();
        assert_eq!(out.trim(), "hello");
    }

    #[test]
    fn test_run_tool_feeds_stdin() {
        let out = run_tool("cat", &[] as &[&str], Some("type=c\n")).unwrap();
        assert_eq!(out, "type=c\n");
    }

    #[test]
    fn test_run_tool_reports_failure_with_stderr() {
        let err = run_tool("sh", &["-c", "echo broken >&2; exit 3"], None).unwrap_err();
        let message = err.to_string();
        assert!(matches!(err, BackingfilesError::Tool(_)));
        assert!(message.contains("Some(3)"), "{}", message);
        assert!(message.contains("broken"), "{}", message);
    }

    #[test]
    fn test_run_tool_missing_binary() {
        let result = run_tool("definitely-not-a-real-tool-xyz", &["--version"], None);
        assert!(result.is_err());
    }

    #[test]
    fn test_tool_succeeds() {
        assert!(tool_succeeds("true", &[]));
        assert!(!tool_succeeds("false", &[]));
        assert!(!tool_succeeds("definitely-not-a-real-tool-xyz", &[]));
    }
}
