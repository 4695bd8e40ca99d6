//! Interactive producer client.
//!
//! Prompts for a producer id, flush threshold, flush interval, and topic,
//! then repeatedly prompts for `key value` pairs to produce until either
//! is `exit` (grounded on `producer/producer_client.cc`).

use std::io::{self, BufRead, Write};

use clap::Parser;
use qbroker_client::{BatcherConfig, ProducerBatcher, Router};
use qbroker_telemetry::init_tracing_from_env;
use tokio_util::sync::CancellationToken;
use tracing::error;

#[derive(Parser)]
#[command(name = "producer_client")]
#[command(about = "Interactive producer for the broker")]
struct Args {
    /// Bootstrap broker addresses, e.g. 127.0.0.1:8080
    #[arg(required = true)]
    bootstrap_servers: Vec<String>,
}

fn prompt(stdout: &mut io::Stdout, label: &str) -> io::Result<String> {
    write!(stdout, "{label}")?;
    stdout.flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing_from_env();
    let args = Args::parse();

    let router = match Router::connect(args.bootstrap_servers).await {
        Ok(router) => router,
        Err(e) => {
            eprintln!("Failed to connect to any bootstrap broker: {e}");
            std::process::exit(1);
        }
    };

    let mut stdout = io::stdout();
    let producer_id = prompt(&mut stdout, "Enter Producer ID: ")?;

    let flush_threshold: usize = prompt(&mut stdout, "Enter Flush Threshold: ")?
        .parse()
        .unwrap_or(100);
    let flush_interval_ms: u64 = prompt(&mut stdout, "Enter Flush Interval (ms): ")?
        .parse()
        .unwrap_or(1000);

    let batcher = ProducerBatcher::new(
        BatcherConfig {
            producer_id,
            flush_threshold,
            flush_interval_ms,
        },
        router.clone(),
    );

    let stop = CancellationToken::new();
    let ticker = batcher.start_flush_ticker(stop.clone());
    let refresh = router.start_periodic_refresh(
        std::time::Duration::from_millis(flush_interval_ms.max(1000)),
        stop.clone(),
    );

    let topic = prompt(&mut stdout, "Enter Topic: ")?;

    loop {
        println!("\nEnter a message (key value) or type 'exit' to quit:");
        let key = prompt(&mut stdout, "Key: ")?;
        if key == "exit" {
            break;
        }

        let value = prompt(&mut stdout, "Value: ")?;
        if value == "exit" {
            break;
        }

        let success = batcher
            .produce(key.into_bytes(), value.into_bytes(), &topic)
            .await;
        if success {
            println!("Message sent successfully.");
        } else {
            println!("Failed to send message.");
            error!(topic, "produce was rejected before buffering");
        }
    }

    batcher.shutdown().await;
    stop.cancel();
    let _ = ticker.await;
    let _ = refresh.await;

    Ok(())
}
