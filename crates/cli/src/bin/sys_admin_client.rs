//! Interactive sys-admin client: shuts down brokers by id (grounded on
//! `sys_admin/sys_admin_client.cc`).

use std::io::{self, BufRead, Write};

use clap::Parser;
use qbroker_client::{Router, SysAdmin};
use qbroker_telemetry::init_tracing_from_env;

#[derive(Parser)]
#[command(name = "sys_admin_client")]
#[command(about = "Interactive sys-admin client for the broker")]
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
    let sys_admin = SysAdmin::new(router);

    let mut stdout = io::stdout();
    loop {
        let broker_id = prompt(&mut stdout, "Enter Broker ID to shutdown or type 'exit' to quit: ")?;
        if broker_id == "exit" {
            break;
        }

        if sys_admin.shutdown(&broker_id).await {
            println!("Broker shutdown successfully.");
        } else {
            println!("Failed to shutdown broker.");
        }
    }

    Ok(())
}
