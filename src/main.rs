// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! RedirectHunter CLI
//!
//! Traces one URL, or one URL per wordlist entry when the URL contains
//! `FUZZ`, and prints the chains with their findings.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use tracing::{info, warn};

use redirecthunter::{
    build_targets, parse_header, InternalHostClassifier, JsonlWriter, Record, ScanConfig, Summary,
};

#[derive(Parser)]
#[command(name = "redirecthunter")]
#[command(about = "Redirect chain tracer with SSRF, token leak, downgrade and phishing detection")]
#[command(version)]
struct Cli {
    /// Target URL (supports FUZZ)
    #[arg(short = 'u', long = "url")]
    url: String,

    /// Wordlist file (used when FUZZ is in the URL)
    #[arg(short = 'w', long = "wordlist")]
    wordlist: Option<PathBuf>,

    /// Cookie header
    #[arg(long)]
    cookie: Option<String>,

    /// Extra HTTP header, "Key: Value" (repeatable)
    #[arg(short = 'H', long = "header")]
    headers: Vec<String>,

    /// HTTP(S) proxy URL
    #[arg(long)]
    proxy: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 8)]
    timeout: u64,

    /// Retry count for network errors and 5xx responses
    #[arg(long, default_value_t = 1)]
    retries: u32,

    /// Worker tasks
    #[arg(short = 't', long = "threads", default_value_t = 10)]
    threads: usize,

    /// Global rate limit (traces per second, 0 = unlimited)
    #[arg(long = "rl", default_value_t = 0)]
    rate_limit: u32,

    /// Max hops including JS/meta redirects
    #[arg(long, default_value_t = 15)]
    max_chain: usize,

    /// Follow JS/meta redirects
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    js_scan: bool,

    /// Skip TLS verification
    #[arg(long)]
    insecure: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Suppress per-target output
    #[arg(long)]
    silent: bool,

    /// One line per target plus totals
    #[arg(long)]
    summary: bool,

    /// Only show targets with findings or errors
    #[arg(long)]
    only_risky: bool,

    /// Plugins to enable (comma separated, "none" for none)
    #[arg(long, default_value = "final-ssrf")]
    plugins: String,

    /// Append JSONL records to this file
    #[arg(short = 'o', long = "output")]
    output: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_logging(cli.verbose) {
        eprintln!("[-] Error: {:#}", e);
        return ExitCode::from(1);
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("[-] Error: {:#}", e);
            ExitCode::from(1)
        }
    }
}

fn init_logging(verbose: bool) -> Result<()> {
    let directive = if verbose {
        "redirecthunter=debug"
    } else {
        "redirecthunter=info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(directive.parse()?),
        )
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

fn scan_config(cli: &Cli) -> Result<ScanConfig> {
    let headers = cli
        .headers
        .iter()
        .map(|line| parse_header(line))
        .collect::<redirecthunter::Result<Vec<_>>>()?;

    let config = ScanConfig {
        threads: cli.threads,
        rate_limit: cli.rate_limit,
        max_chain: cli.max_chain,
        js_scan: cli.js_scan,
        timeout: Duration::from_secs(cli.timeout),
        retries: cli.retries,
        proxy: cli.proxy.clone(),
        headers,
        cookie: cli.cookie.clone(),
        insecure: cli.insecure,
        plugins: cli.plugins.clone(),
        ..ScanConfig::default()
    };
    config.validate()?;
    Ok(config)
}

async fn run(cli: Cli) -> Result<()> {
    let config = scan_config(&cli)?;
    let targets = build_targets(&cli.url, cli.wordlist.as_deref())?;

    let classifier = Arc::new(InternalHostClassifier::default());
    let runner = config.build_runner(Arc::clone(&classifier))?;
    let plugins = config.build_plugins(classifier)?;

    let writer = match cli.output {
        Some(ref path) => Some(
            JsonlWriter::append(path)
                .with_context(|| format!("opening {}", path.display()))?,
        ),
        None => None,
    };

    let cancel = runner.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, finishing in-flight traces");
            cancel.cancel();
        }
    });

    info!(
        targets = targets.len(),
        threads = config.threads,
        rate_limit = config.rate_limit,
        max_chain = config.max_chain,
        js_scan = config.js_scan,
        plugins = ?plugins.names(),
        "Starting run"
    );

    let mut results = runner.run(&targets).await;
    plugins.apply(&mut results).await;

    let records: Vec<Record> = results.iter().map(Record::from_result).collect();

    if let Some(ref writer) = writer {
        for record in &records {
            writer.write(record)?;
        }
        writer.flush()?;
    }

    if !cli.silent {
        print_records(&records, &cli);
    }
    if cli.summary {
        println!("Summary: {}", Summary::from_results(&results));
    }

    Ok(())
}

fn print_records(records: &[Record], cli: &Cli) {
    let total = records.len();
    let width = total.to_string().len();

    for (i, record) in records.iter().enumerate() {
        if cli.only_risky && !record.is_risky() {
            continue;
        }

        if cli.summary {
            print_summary_line(i, total, width, record);
        } else {
            print_detail(i, total, record);
        }
    }
}

fn print_summary_line(i: usize, total: usize, width: usize, record: &Record) {
    if let Some(ref error) = record.error {
        println!(
            "[{:>width$}/{}] {} | error: {}",
            i + 1,
            total,
            record.input_url,
            error,
            width = width
        );
        return;
    }

    println!(
        "[{}] [{:>width$}/{}] {} -> {} | Final: {} | Hops: {} | core={:2} | plugin={:2} | duration={}ms",
        record.classification.as_str().to_uppercase(),
        i + 1,
        total,
        record.input_url,
        record.final_url,
        record.status_code,
        record.redirect_chain.len(),
        record.findings.len(),
        record.plugin_findings.len(),
        record.duration_ms,
        width = width
    );
}

fn print_detail(i: usize, total: usize, record: &Record) {
    println!("=== Target {}/{} ===", i + 1, total);
    if let Some(ref payload) = record.payload {
        println!("Payload: {}", payload);
    }
    for (index, url) in record.redirect_chain.iter().enumerate() {
        println!("  [{}] {}", index, url);
    }
    println!(
        "Final: {} (status {}, {} bytes) [{}]",
        record.final_url, record.status_code, record.resp_len, record.classification
    );

    if record.findings.is_empty() {
        println!("Core findings: none");
    } else {
        println!("Core findings:");
        for f in &record.findings {
            println!(
                "  - [{}] {} @hop {}: {}",
                f.severity.as_str().to_uppercase(),
                f.kind,
                f.at_hop,
                f.detail
            );
        }
    }

    if !record.plugin_findings.is_empty() {
        println!("Plugin findings:");
        for f in &record.plugin_findings {
            println!(
                "  - [{}] {} @hop {}: {} ({})",
                f.severity.as_str().to_uppercase(),
                f.kind,
                f.at_hop,
                f.detail,
                f.source
            );
        }
    }

    if let Some(ref error) = record.error {
        println!("Error: {}", error);
    }
    println!("Duration: {}ms\n", record.duration_ms);
}
