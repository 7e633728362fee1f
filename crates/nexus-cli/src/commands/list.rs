use std::path::Path;

use crate::commands::common::{
    format_operation_lines, open_queue, operation_to_list_item, OperationListItem,
};
use crate::error::CliError;

pub fn run_list(limit: usize, as_json: bool, queue_path: &Path) -> Result<(), CliError> {
    let queue = open_queue(queue_path);
    let ops: Vec<_> = queue.snapshot().into_iter().take(limit).collect();

    if as_json {
        let json_items = ops
            .iter()
            .map(operation_to_list_item)
            .collect::<Vec<OperationListItem>>();
        println!("{}", serde_json::to_string_pretty(&json_items)?);
        return Ok(());
    }

    if ops.is_empty() {
        println!("Sync queue is empty.");
        return Ok(());
    }

    for line in format_operation_lines(&ops) {
        println!("{line}");
    }
    Ok(())
}
