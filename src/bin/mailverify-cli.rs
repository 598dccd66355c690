#[path = "mailverify-cli/args.rs"]
mod args;
#[path = "mailverify-cli/output.rs"]
mod output;
#[path = "mailverify-cli/serve.rs"]
mod serve;

use std::io::{self, BufRead};

use anyhow::{Context, Result, bail};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use args::{Cli, Commands, mode_from_str};
use mailverify_lib::{MxStatus, VerificationEngine, domain_of, normalize_email};
use output::OutputRow;

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("mailverify_lib=info,mailverify_cli=info"));
    let registry = tracing_subscriber::registry().with(filter);
    // logs go to stderr so stdout stays parseable
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_json);

    match &cli.cmd {
        Commands::Validate {
            mode,
            format,
            email,
        } => {
            let row = normalize_email(email, mode_from_str(mode));
            output::write_validation(&row, format)?;
            if !row.valid {
                std::process::exit(2);
            }
        }
        Commands::Verify {
            email,
            stdin,
            format,
            out,
        } => {
            let emails = collect_emails(email.as_deref(), *stdin)?;
            let config = cli.load_config()?;
            let engine = VerificationEngine::from_config(&config)
                .await
                .context("build verification engine")?;

            let mut rows = Vec::with_capacity(emails.len());
            for email in emails {
                let result = engine.verify(&email).await;
                let mx_detail = if format.as_str() == "human"
                    && result.has_valid_syntax()
                    && !result.has_mx_records
                {
                    mx_detail(&engine, &email).await
                } else {
                    None
                };
                rows.push(OutputRow {
                    email,
                    result,
                    mx_detail,
                });
            }
            output::write_reports(&rows, format, out.as_deref())?;

            // 0 all good, 2 rejected addresses, 1 fatal
            if output::any_rejected(&rows) {
                std::process::exit(2);
            }
        }
        Commands::Serve { bind } => {
            let config = cli.load_config()?;
            let bind = bind.clone().unwrap_or_else(|| config.server.bind.clone());
            let engine = VerificationEngine::from_config(&config)
                .await
                .context("build verification engine")?;
            serve::run(engine, &bind).await?;
        }
    }
    Ok(())
}

/// Why `email`'s domain has no usable MX records.
async fn mx_detail(engine: &VerificationEngine, email: &str) -> Option<String> {
    let domain = domain_of(email)?;
    match engine.dns().lookup_mx_status(&domain).await {
        Ok(MxStatus::NoRecords) => Some("no MX records".to_string()),
        Ok(MxStatus::Records(_)) => None,
        Err(err) => Some(match err.failure() {
            Some(failure) => failure.to_string(),
            None => err.to_string(),
        }),
    }
}

fn collect_emails(email: Option<&str>, stdin: bool) -> Result<Vec<String>> {
    if stdin {
        let mut emails = Vec::new();
        for line in io::stdin().lock().lines() {
            let line = line.context("read stdin")?;
            let line = line.trim();
            if !line.is_empty() {
                emails.push(line.to_string());
            }
        }
        return Ok(emails);
    }
    match email {
        Some(email) => Ok(vec![email.to_string()]),
        None => bail!("give an address or --stdin"),
    }
}
