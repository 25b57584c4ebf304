use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};

/// Loads addresses from a `.txt` (one per line) or `.csv` (`Email`/`email`
/// column) file. Blank entries are skipped.
pub fn load_emails(path: &Path) -> Result<Vec<String>> {
    let ext = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("txt") => {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("read {}", path.display()))?;
            Ok(parse_lines(&raw))
        }
        Some("csv") => load_csv(path),
        _ => bail!(
            "unsupported input file type: {} (use a .csv or .txt file)",
            path.display()
        ),
    }
}

fn parse_lines(raw: &str) -> Vec<String> {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(feature = "with-csv")]
fn load_csv(path: &Path) -> Result<Vec<String>> {
    let file = fs::File::open(path).with_context(|| format!("open {}", path.display()))?;
    read_csv(file).with_context(|| format!("read CSV {}", path.display()))
}

#[cfg(not(feature = "with-csv"))]
fn load_csv(_: &Path) -> Result<Vec<String>> {
    bail!("CSV input requires the 'with-csv' feature")
}

#[cfg(feature = "with-csv")]
fn read_csv<R: std::io::Read>(source: R) -> Result<Vec<String>> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(source);
    let headers = reader.headers()?.clone();
    let column = headers
        .iter()
        .position(|h| h.trim() == "Email")
        .or_else(|| headers.iter().position(|h| h.trim() == "email"));

    let mut emails = Vec::new();
    for (idx, record) in reader.records().enumerate() {
        let record = record?;
        let value = column
            .and_then(|col| record.get(col))
            .map(str::trim)
            .filter(|v| !v.is_empty());
        match value {
            Some(email) => emails.push(email.to_string()),
            None => tracing::warn!(row = idx + 1, "no 'Email' value in CSV row, skipping"),
        }
    }
    Ok(emails)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_lines_are_trimmed_and_blank_skipped() {
        let emails = parse_lines("  a@b.com \n\n\tc@d.org\n   \n");
        assert_eq!(emails, vec!["a@b.com", "c@d.org"]);
    }

    #[test]
    fn unknown_extension_is_fatal() {
        let err = load_emails(Path::new("addresses.xlsx")).expect_err("must fail");
        assert!(err.to_string().contains("unsupported input file type"));
    }

    #[cfg(feature = "with-csv")]
    #[test]
    fn csv_reads_email_column_and_skips_empty_rows() {
        let data = "Name,Email\nAnn, ann@example.com \nBob,\nCid,cid@example.org\n";
        let emails = read_csv(data.as_bytes()).expect("csv");
        assert_eq!(emails, vec!["ann@example.com", "cid@example.org"]);
    }

    #[cfg(feature = "with-csv")]
    #[test]
    fn csv_accepts_lowercase_header() {
        let emails = read_csv("email\nx@y.io\n".as_bytes()).expect("csv");
        assert_eq!(emails, vec!["x@y.io"]);
    }

    #[cfg(feature = "with-csv")]
    #[test]
    fn csv_without_email_column_yields_nothing() {
        let emails = read_csv("name\nann\nbob\n".as_bytes()).expect("csv");
        assert!(emails.is_empty());
    }
}
