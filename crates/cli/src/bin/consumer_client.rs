//! Interactive consumer-group client.
//!
//! Reads a `cg_config` file of lines `<tag> <group_id> <consumer_id> <topic>
//! <partition>`, builds one [`qbroker_client::ConsumerGroup`] per distinct
//! tag with every consumer's claims added pairwise, then repeatedly prompts
//! for a tag/topic/partition/max_messages to consume from (grounded on
//! `consumer/consumer_client.cc`).

use std::collections::HashMap;
use std::fs::File;
use std::io::{self, BufRead, Write};
use std::sync::Arc;

use clap::Parser;
use qbroker_client::consumer_group::Claim;
use qbroker_client::{ConsumerGroup, Router};
use qbroker_telemetry::init_tracing_from_env;

const CG_CONFIG_PATH: &str = "cg_config";

#[derive(Parser)]
#[command(name = "consumer_client")]
#[command(about = "Interactive consumer-group client for the broker")]
struct Args {
    /// Bootstrap broker addresses, e.g. 127.0.0.1:8080
    #[arg(required = true)]
    bootstrap_servers: Vec<String>,
}

struct GroupConfig {
    group_id: String,
    /// `consumer_id -> claims`, to be added pairwise once the group exists.
    consumers: HashMap<String, Vec<Claim>>,
}

fn read_cg_config(path: &str) -> HashMap<String, GroupConfig> {
    let mut groups: HashMap<String, GroupConfig> = HashMap::new();

    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) => {
            eprintln!("Failed to open consumer group config file: {path}: {e}");
            return groups;
        }
    };

    for line in io::BufReader::new(file).lines() {
        let line = match line {
            Ok(line) => line,
            Err(_) => continue,
        };
        let fields: Vec<&str> = line.split_whitespace().collect();
        let [tag, gid, consumer_id, topic, partition] = fields[..] else {
            eprintln!("Failed to parse consumer group config line: {line}");
            continue;
        };
        let partition: i32 = match partition.parse() {
            Ok(partition) => partition,
            Err(_) => {
                eprintln!("Invalid partition value: {partition}");
                continue;
            }
        };

        let group = groups.entry(tag.to_string()).or_insert_with(|| GroupConfig {
            group_id: gid.to_string(),
            consumers: HashMap::new(),
        });
        group
            .consumers
            .entry(consumer_id.to_string())
            .or_default()
            .push((topic.to_string(), partition, 0));
    }

    groups
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

    let configs = read_cg_config(CG_CONFIG_PATH);
    if configs.is_empty() {
        eprintln!("Failed to read consumer group config");
        std::process::exit(1);
    }

    let mut groups: HashMap<String, Arc<ConsumerGroup>> = HashMap::new();
    for (tag, config) in &configs {
        let group = Arc::new(ConsumerGroup::new(config.group_id.clone(), router.clone(), false));
        for (consumer_id, claims) in &config.consumers {
            group.add_consumer(consumer_id, claims.clone());
        }
        println!(
            "Consumer group '{}' (id={}): {} consumer(s)",
            tag,
            config.group_id,
            config.consumers.len()
        );
        groups.insert(tag.clone(), group);
    }

    let mut stdout = io::stdout();
    loop {
        let tag = prompt(&mut stdout, "Enter consumer group tag: ")?;
        let Some(group) = groups.get(&tag) else {
            eprintln!("Invalid consumer group tag: {tag}");
            continue;
        };

        let topic = prompt(&mut stdout, "Enter topic: ")?;
        let partition: i32 = match prompt(&mut stdout, "Enter partition: ")?.parse() {
            Ok(partition) => partition,
            Err(_) => {
                eprintln!("Invalid partition");
                continue;
            }
        };
        let max_messages: i32 = match prompt(&mut stdout, "Enter max messages: ")?.parse() {
            Ok(max_messages) => max_messages,
            Err(_) => {
                eprintln!("Invalid max messages");
                continue;
            }
        };

        let messages = group.consume(&topic, partition, max_messages).await;
        if !messages.is_empty() {
            println!("Consumed {} messages:", messages.len());
            for message in &messages {
                println!(
                    "Key: {}, Value: {}, Topic: {}, Timestamp: {}",
                    String::from_utf8_lossy(&message.key),
                    String::from_utf8_lossy(&message.value),
                    message.topic,
                    message.timestamp,
                );
            }
        } else {
            println!("No new messages.");
        }

        let choice = prompt(&mut stdout, "Do you want to continue? (yes/no): ")?;
        if choice != "yes" {
            break;
        }
    }

    Ok(())
}
