//! Watchlist files
//!
//! A watchlist is a plain text file with one item name per line. Exported
//! spreadsheets often wrap names in double quotes; those are stripped on
//! read so the same file works either way.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use anyhow::{Context, Result};

/// Reads item names from a watchlist file, skipping blank lines.
pub fn read_watchlist(path: &Path) -> Result<Vec<String>> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open watchlist: {}", path.display()))?;
    let reader = BufReader::new(file);

    let mut names = Vec::new();
    for (line_num, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("Failed to read line {}", line_num + 1))?;
        let name = line.trim().trim_matches('"').trim();
        if !name.is_empty() {
            names.push(name.to_string());
        }
    }

    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn watchlist(content: &str) -> Vec<String> {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        read_watchlist(file.path()).unwrap()
    }

    #[test]
    fn reads_one_name_per_line() {
        let names = watchlist("Oiled Forged Scrap\nGossamer Patch\n");
        assert_eq!(names, vec!["Oiled Forged Scrap", "Gossamer Patch"]);
    }

    #[test]
    fn strips_surrounding_quotes_and_whitespace() {
        let names = watchlist("\"Green Torch Handle\"\n  Rough Sharpening Stone  \n");
        assert_eq!(names, vec!["Green Torch Handle", "Rough Sharpening Stone"]);
    }

    #[test]
    fn skips_blank_lines() {
        let names = watchlist("First\n\n\nSecond\n\n");
        assert_eq!(names, vec!["First", "Second"]);
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(read_watchlist(Path::new("/nonexistent/watchlist.csv")).is_err());
    }
}
