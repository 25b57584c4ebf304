use anyhow::{Context, Result, bail};

use mailverify_lib::{BulkSummary, VerificationResult};

/// Destination `-` means stdout.
const STDOUT: &str = "-";

pub fn write_result(result: &VerificationResult, format: &str) -> Result<()> {
    match format {
        "human" => {
            println!("{}", human_line(result));
            Ok(())
        }
        "json" => {
            #[cfg(feature = "with-serde")]
            {
                println!("{}", serde_json::to_string_pretty(result)?);
                Ok(())
            }
            #[cfg(not(feature = "with-serde"))]
            {
                bail!("format=json requires the 'with-serde' feature")
            }
        }
        other => bail!("unknown --format '{other}', use: human|json"),
    }
}

pub fn write_report(results: &[VerificationResult], format: &str, out: &str) -> Result<()> {
    match format {
        "human" => write_human(results, out),
        "json" => write_json(results, out),
        "ndjson" => write_ndjson(results, out),
        "csv" => write_csv(results, out),
        other => bail!("unknown --format '{other}', use: human|json|ndjson|csv"),
    }
}

/// Multi-line table logged at the end of a bulk run.
pub fn summary_table(summary: &BulkSummary) -> String {
    let rule = "-".repeat(25);
    format!(
        "\n{:<25} {}\n{rule}\n{:<25} {}\n{:<25} {}\n{:<25} {}\n{:<25} {}\n{rule}\n{:<25} {}\n{:<25} {}",
        "Total Emails Verified:",
        summary.total,
        "Valid:",
        summary.valid,
        "Invalid:",
        summary.invalid,
        "Catch-All (Risky):",
        summary.catch_all,
        "Unknown/Error:",
        summary.unknown,
        "Disposable Emails Found:",
        summary.disposable,
        "Role Accounts Found:",
        summary.role_accounts,
    )
}

fn human_line(result: &VerificationResult) -> String {
    let tag = format!("[{}]", result.status.as_str().to_ascii_uppercase());
    let mut line = format!("{tag:<12} {} :: {}", result.email, result.reason);
    if result.is_disposable {
        line.push_str(" [disposable]");
    }
    if result.is_role_account {
        line.push_str(" [role]");
    }
    line
}

fn write_human(results: &[VerificationResult], out: &str) -> Result<()> {
    let mut text = String::new();
    for result in results {
        text.push_str(&human_line(result));
        text.push('\n');
    }
    emit(out, text.as_bytes())
}

#[cfg(feature = "with-serde")]
fn write_json(results: &[VerificationResult], out: &str) -> Result<()> {
    let s = serde_json::to_string_pretty(results)?;
    emit(out, format!("{s}\n").as_bytes())
}

#[cfg(not(feature = "with-serde"))]
fn write_json(_: &[VerificationResult], _: &str) -> Result<()> {
    bail!("format=json requires the 'with-serde' feature")
}

#[cfg(feature = "with-serde")]
fn write_ndjson(results: &[VerificationResult], out: &str) -> Result<()> {
    let mut buf = Vec::new();
    for result in results {
        let line = serde_json::to_string(result)?;
        buf.extend_from_slice(line.as_bytes());
        buf.push(b'\n');
    }
    emit(out, &buf)
}

#[cfg(not(feature = "with-serde"))]
fn write_ndjson(_: &[VerificationResult], _: &str) -> Result<()> {
    bail!("format=ndjson requires the 'with-serde' feature")
}

#[cfg(feature = "with-csv")]
fn write_csv(results: &[VerificationResult], out: &str) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    wtr.write_record(["email", "status", "reason", "is_disposable", "is_role_account"])?;
    for result in results {
        wtr.write_record(csv_record(result))?;
    }
    let data = wtr.into_inner().context("flush CSV report")?;
    emit(out, &data)
}

#[cfg(not(feature = "with-csv"))]
fn write_csv(_: &[VerificationResult], _: &str) -> Result<()> {
    bail!("format=csv requires the 'with-csv' feature")
}

#[cfg(feature = "with-csv")]
fn csv_record(result: &VerificationResult) -> [String; 5] {
    [
        result.email.clone(),
        result.status.as_str().to_string(),
        result.reason.clone(),
        result.is_disposable.to_string(),
        result.is_role_account.to_string(),
    ]
}

fn emit(out: &str, bytes: &[u8]) -> Result<()> {
    if out == STDOUT {
        use std::io::Write;
        let mut stdout = std::io::stdout().lock();
        stdout.write_all(bytes)?;
        stdout.flush()?;
        Ok(())
    } else {
        write_all_atomically(out, bytes)
    }
}

fn write_all_atomically(path: &str, bytes: &[u8]) -> Result<()> {
    use std::io::Write;

    let tmp = format!("{path}.tmp");
    {
        let mut f = std::fs::File::create(&tmp).with_context(|| format!("create {tmp}"))?;
        f.write_all(bytes)?;
        f.sync_all()?;
    }
    std::fs::rename(&tmp, path).with_context(|| format!("rename {tmp} -> {path}"))?;
    Ok(())
}
