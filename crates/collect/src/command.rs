//! Process and file collaborators.

use std::path::Path;
use std::process::Stdio;

use crate::error::CollectError;

/// Runs `argv` and returns its stdout as lines.
///
/// The first element is the program. A missing executable or a non-zero
/// exit is a [`CollectError::Command`]; stderr is folded into the reason.
pub async fn run_command(argv: &[&str]) -> Result<Vec<String>, CollectError> {
    let Some((program, args)) = argv.split_first() else {
        return Err(CollectError::command("", "empty command line"));
    };

    tracing::debug!(program, ?args, "running command");

    let output = tokio::process::Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .output()
        .await
        .map_err(|e| CollectError::command(program, e.to_string()))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(CollectError::command(
            program,
            format!("{}: {}", output.status, stderr.trim()),
        ));
    }

    Ok(String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(str::to_string)
        .collect())
}

/// Prefixes `argv` with non-interactive `sudo` when requested.
pub(crate) fn elevated<'a>(use_sudo: bool, argv: &[&'a str]) -> Vec<&'a str> {
    let mut full = Vec::with_capacity(argv.len() + 2);
    if use_sudo {
        full.extend(["sudo", "-n"]);
    }
    full.extend_from_slice(argv);
    full
}

/// Reads a text file as lines.
pub async fn read_lines(path: impl AsRef<Path>) -> Result<Vec<String>, CollectError> {
    let path = path.as_ref();
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| CollectError::io(path, e))?;
    Ok(text.lines().map(str::to_string).collect())
}

/// Reads a binary file.
pub async fn read_bytes(path: impl AsRef<Path>) -> Result<Vec<u8>, CollectError> {
    let path = path.as_ref();
    tokio::fs::read(path)
        .await
        .map_err(|e| CollectError::io(path, e))
}
