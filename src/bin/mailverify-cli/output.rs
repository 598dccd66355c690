use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::Serialize;

use mailverify_lib::{NormalizedEmail, VerificationResult};

#[derive(Serialize)]
pub struct OutputRow {
    pub email: String,
    #[serde(flatten)]
    pub result: VerificationResult,
    /// Classified MX failure, shown in human output only.
    #[serde(skip)]
    pub mx_detail: Option<String>,
}

/// Exit code 2 is reserved for these: bad syntax, disposable, no MX.
pub fn any_rejected(rows: &[OutputRow]) -> bool {
    rows.iter().any(|row| {
        let r = &row.result;
        !r.has_valid_syntax() || r.is_disposable || !r.has_mx_records
    })
}

pub fn write_reports(rows: &[OutputRow], format: &str, out: Option<&Path>) -> Result<()> {
    match format {
        "human" => {
            for row in rows {
                println!("{}", human_line(row));
            }
            Ok(())
        }
        "json" => {
            let s = serde_json::to_string_pretty(rows)?;
            emit(s.into_bytes(), out)
        }
        "ndjson" => {
            let mut buf = Vec::new();
            for row in rows {
                buf.extend_from_slice(serde_json::to_string(row)?.as_bytes());
                buf.push(b'\n');
            }
            emit(buf, out)
        }
        other => bail!("unknown --format '{other}', use: human|json|ndjson"),
    }
}

pub fn write_validation(row: &NormalizedEmail, format: &str) -> Result<()> {
    match format {
        "human" => {
            if row.valid {
                println!("[OK]      {}", row.original);
            } else {
                println!("[INVALID] {} :: {}", row.original, row.reasons.join("; "));
            }
        }
        "json" => println!("{}", serde_json::to_string_pretty(row)?),
        other => bail!("unknown --format '{other}', use: human|json"),
    }
    Ok(())
}

fn human_line(row: &OutputRow) -> String {
    let r = &row.result;
    let errors = [
        r.errors.syntax.as_deref(),
        r.errors.disposable_email.as_deref(),
        r.errors.mx_records.as_deref(),
        r.errors.receive_email.as_ref().and_then(|e| e.as_deref()),
    ];
    let problems: Vec<&str> = errors.into_iter().flatten().collect();
    let tag = if problems.is_empty() { "[OK]     " } else { "[REJECT] " };

    let mut line = format!("{tag}{}", row.email);
    if let Some(ip) = r.ip_address {
        line.push_str(&format!(" ip={ip}"));
    }
    if let Some(detail) = &row.mx_detail {
        line.push_str(&format!(" mx=({detail})"));
    }
    if let Some(reachable) = r.can_receive_email {
        line.push_str(&format!(" smtp={reachable}"));
    }
    if !problems.is_empty() {
        line.push_str(&format!(" :: {}", problems.join("; ")));
    }
    line
}

fn emit(bytes: Vec<u8>, out: Option<&Path>) -> Result<()> {
    match out {
        Some(path) => write_all_atomically(path, &bytes),
        None => {
            print!("{}", String::from_utf8_lossy(&bytes));
            if !bytes.ends_with(b"\n") {
                println!();
            }
            Ok(())
        }
    }
}

fn write_all_atomically(path: &Path, bytes: &[u8]) -> Result<()> {
    use std::io::Write;

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    {
        let mut f = std::fs::File::create(&tmp)
            .with_context(|| format!("create {}", Path::new(&tmp).display()))?;
        f.write_all(bytes)?;
        f.sync_all()?;
    }
    std::fs::rename(&tmp, path).with_context(|| format!("rename to {}", path.display()))?;
    Ok(())
}
