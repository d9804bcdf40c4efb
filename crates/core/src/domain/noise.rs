// Standard-error noise filtering
//
// Several AI CLIs chatter on stderr even when they succeed. These lines are
// dropped before stderr is used as failure detail.

/// Case-insensitive substrings marking a benign stderr line
pub const NOISE_PATTERNS: &[&str] = &[
    "[warn]",
    "[warning]",
    "skipping unreadable directory",
    "loaded cached credentials",
    "loading extension",
];

fn is_noise(line: &str) -> bool {
    if line.trim().is_empty() {
        return true;
    }
    let lowered = line.to_lowercase();
    NOISE_PATTERNS
        .iter()
        .any(|pattern| lowered.contains(pattern))
}

/// Drop noise and blank lines, rejoin the rest with `\n`
pub fn filter_stderr(stderr: &str) -> String {
    stderr
        .trim()
        .lines()
        .filter(|line| !is_noise(line))
        .collect::<Vec<_>>()
        .join("\n")
}
