use anyhow::{Context, Result};
use std::path::Path;

/// Header line of a persisted peak file.
pub const PEAKS_HEADER: &str = "peaks";

/// Parse newline-delimited floating point series, ignoring blank/comment lines.
pub fn parse_f64_series(text: &str) -> Result<Vec<f64>> {
    let mut out = Vec::new();
    for (idx, line) in text.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let val: f64 = trimmed
            .parse()
            .with_context(|| format!("line {} is not f64: {}", idx + 1, trimmed))?;
        out.push(val);
    }
    if out.is_empty() {
        anyhow::bail!("no numeric samples found");
    }
    Ok(out)
}

/// Read a newline-delimited floating point series from disk.
pub fn read_f64_series(path: &Path) -> Result<Vec<f64>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    parse_f64_series(&text)
}

/// Render peaks as seconds, one per line, under a `peaks` header.
pub fn format_peaks(peaks: &[usize], sfreq: f64) -> String {
    let mut out = String::with_capacity(8 * (peaks.len() + 1));
    out.push_str(PEAKS_HEADER);
    out.push('\n');
    for &p in peaks {
        // Shortest representation that parses back exactly.
        out.push_str(&(p as f64 / sfreq).to_string());
        out.push('\n');
    }
    out
}

/// Parse a persisted peak file back into sample indices at `sfreq` Hz.
///
/// Each value is rounded to the nearest sample, so a file written by
/// [`format_peaks`] at the same rate reloads exactly.
pub fn parse_peaks(text: &str, sfreq: f64) -> Result<Vec<usize>> {
    let mut lines = text
        .lines()
        .enumerate()
        .map(|(idx, line)| (idx, line.trim()))
        .filter(|(_, line)| !line.is_empty());
    match lines.next() {
        Some((_, header)) if header == PEAKS_HEADER => {}
        Some((idx, other)) => {
            anyhow::bail!("line {}: expected header '{}', found '{}'", idx + 1, PEAKS_HEADER, other)
        }
        None => anyhow::bail!("empty peak file"),
    }

    let mut out = Vec::new();
    for (idx, line) in lines {
        let seconds: f64 = line
            .parse()
            .with_context(|| format!("line {} is not a time in seconds: {}", idx + 1, line))?;
        if !(seconds.is_finite() && seconds >= 0.0) {
            anyhow::bail!("line {} holds an invalid peak time: {}", idx + 1, line);
        }
        out.push((seconds * sfreq).round() as usize);
    }
    Ok(out)
}

pub fn write_peaks(path: &Path, peaks: &[usize], sfreq: f64) -> Result<()> {
    std::fs::write(path, format_peaks(peaks, sfreq))
        .with_context(|| format!("failed to write {}", path.display()))
}

pub fn read_peaks(path: &Path, sfreq: f64) -> Result<Vec<usize>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    parse_peaks(&text, sfreq).with_context(|| format!("invalid peak file {}", path.display()))
}
