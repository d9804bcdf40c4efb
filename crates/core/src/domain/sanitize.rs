// Environment & argument sanitizer
//
// Pure functions: callers pass the environment in, nothing is read from the
// process here. Existence of the executable is validated later by the runner.
// Environment entries stay `OsString` so non-UTF-8 values pass through intact.

use std::collections::HashMap;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

/// Bytes that would terminate or corrupt an argv/envp entry
const FORBIDDEN: char = '\0';

/// Child environment, keyed by variable name
pub type Environment = HashMap<OsString, OsString>;

/// Strip forbidden bytes. An all-NUL input becomes an empty string.
pub fn sanitize(value: &str) -> String {
    value.replace(FORBIDDEN, "")
}

/// Strip forbidden bytes without a UTF-8 round trip
#[cfg(unix)]
pub fn sanitize_os(value: &OsStr) -> OsString {
    use std::os::unix::ffi::{OsStrExt, OsStringExt};

    let bytes: Vec<u8> = value
        .as_bytes()
        .iter()
        .copied()
        .filter(|byte| *byte != 0)
        .collect();
    OsString::from_vec(bytes)
}

#[cfg(not(unix))]
pub fn sanitize_os(value: &OsStr) -> OsString {
    match value.to_str() {
        Some(text) => OsString::from(sanitize(text)),
        None => value.to_os_string(),
    }
}

pub fn sanitize_path(path: &Path) -> PathBuf {
    PathBuf::from(sanitize_os(path.as_os_str()))
}

pub fn sanitize_args(args: &[String]) -> Vec<String> {
    args.iter().map(|arg| sanitize(arg)).collect()
}

/// Sanitize every key and value
pub fn sanitize_env(env: &Environment) -> Environment {
    env.iter()
        .map(|(k, v)| (sanitize_os(k), sanitize_os(v)))
        .collect()
}

/// Build the child environment
///
/// Clones `caller_env`, appends each of `extra_path_dirs` not already on
/// `PATH`, and inserts `HOME` from `home` when the caller has none. The result
/// is sanitized. A directory that cannot be a `PATH` entry (it contains the
/// platform separator) is skipped.
///
/// # Example
/// ```text
/// let env = build_environment(&std::env::vars_os().collect(), &config.extra_path_dirs, home_dir);
/// ```
pub fn build_environment(
    caller_env: &Environment,
    extra_path_dirs: &[PathBuf],
    home: Option<&Path>,
) -> Environment {
    let mut env = caller_env.clone();

    let mut entries: Vec<PathBuf> = env
        .get(OsStr::new("PATH"))
        .map(|path| {
            std::env::split_paths(path)
                .filter(|entry| !entry.as_os_str().is_empty())
                .collect()
        })
        .unwrap_or_default();
    for dir in extra_path_dirs {
        let joinable = std::env::join_paths([dir]).is_ok();
        if joinable && !dir.as_os_str().is_empty() && !entries.contains(dir) {
            entries.push(dir.clone());
        }
    }
    match std::env::join_paths(&entries) {
        Ok(path) => {
            env.insert(OsString::from("PATH"), path);
        }
        Err(e) => tracing::debug!(error = %e, "PATH left as inherited"),
    }

    let has_home = env.get(OsStr::new("HOME")).is_some_and(|h| !h.is_empty());
    if !has_home {
        if let Some(home) = home {
            env.insert(OsString::from("HOME"), home.as_os_str().to_os_string());
        }
    }

    sanitize_env(&env)
}
