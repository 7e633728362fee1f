use std::path::Path;

use serde::Serialize;

use crate::commands::common::{count_by_collection, format_relative_time, open_queue};
use crate::error::CliError;

#[derive(Debug, Serialize)]
struct StatusReport {
    queue_length: usize,
    chats: usize,
    messages: usize,
    contexts: usize,
    oldest_enqueued_at: Option<i64>,
}

pub fn run_status(as_json: bool, queue_path: &Path) -> Result<(), CliError> {
    let queue = open_queue(queue_path);
    let ops = queue.snapshot();

    let counts = count_by_collection(&ops);
    let oldest = ops.iter().map(|op| op.enqueued_at).min();

    if as_json {
        let report = StatusReport {
            queue_length: ops.len(),
            chats: counts[0].1,
            messages: counts[1].1,
            contexts: counts[2].1,
            oldest_enqueued_at: oldest,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    if ops.is_empty() {
        println!("Sync queue is empty.");
        return Ok(());
    }

    println!("{} pending operation(s)", ops.len());
    for (collection, count) in counts {
        if count > 0 {
            println!("  {collection}: {count}");
        }
    }
    if let Some(oldest) = oldest {
        let now_ms = chrono::Utc::now().timestamp_millis();
        println!("oldest: {}", format_relative_time(oldest, now_ms));
    }
    Ok(())
}
