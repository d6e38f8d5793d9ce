use async_ifscan::{
    discover, ClientConfigBuilder, CoordinatorConfigBuilder, Retry, SnmpTransport,
};
use clap::Parser;
use simplelog::{ColorChoice, Config, LevelFilter, TermLogger, TerminalMode};
use std::io::Write;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

/// Lists the interfaces of every SNMP agent in a subnet
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Subnet in CIDR notation, e.g. 192.168.1.0/24
    subnet: String,

    /// SNMPv2c community string
    #[arg(short, long, default_value = "public")]
    community: String,

    #[arg(short, long, default_value_t = 161)]
    port: u16,

    /// Maximum number of hosts queried at the same time
    #[arg(long, default_value_t = 32)]
    concurrency: usize,

    /// Retries per host after a timeout or transport failure
    #[arg(long, default_value_t = 1)]
    retries: u32,

    /// Per-exchange timeout in milliseconds
    #[arg(long, default_value_t = 2000)]
    timeout_ms: u64,

    /// GETBULK max-repetitions
    #[arg(long, default_value_t = 25)]
    batch_size: u32,

    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    let level = if args.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    TermLogger::init(
        level,
        Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )
    .unwrap();

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_signal.cancel();
        }
    });

    let client_config = ClientConfigBuilder::new(&args.community)
        .with_port(args.port)
        .with_max_repetitions(args.batch_size)
        .with_response_timeout(Duration::from_millis(args.timeout_ms))
        .build();
    let config = CoordinatorConfigBuilder::new()
        .with_concurrency(args.concurrency)
        .with_retry(Retry::exponential(
            args.retries,
            Duration::from_millis(250),
            Duration::from_secs(2),
        ))
        .build();

    let start = Instant::now();
    let report = match discover(
        &args.subnet,
        Arc::new(SnmpTransport::new()),
        client_config,
        config,
        &cancel,
    )
    .await
    {
        Ok(report) => report,
        Err(err) => {
            eprintln!("{}", err);
            std::process::exit(2);
        }
    };
    let scan_duration = start.elapsed();

    {
        let mut stdout = std::io::stdout().lock();
        for line in report.lines() {
            writeln!(stdout, "{}", line).unwrap();
        }
        if !report.failures().is_empty() {
            writeln!(stdout, "Failed hosts:").unwrap();
            for line in report.failure_lines() {
                writeln!(stdout, "{}", line).unwrap();
            }
        }
        if !report.is_complete() {
            writeln!(
                stdout,
                "Scan cancelled, {} hosts not queried",
                report.unfinished().len()
            )
            .unwrap();
        }
        writeln!(stdout, "Scan took {:?}", scan_duration).unwrap();
    }
}
