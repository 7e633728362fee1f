use std::path::Path;

use crate::commands::common::open_queue;
use crate::error::CliError;

pub fn run_clear(queue_path: &Path) -> Result<(), CliError> {
    let mut queue = open_queue(queue_path);
    let dropped = queue.len();
    queue.clear();

    println!("Cleared {dropped} pending operation(s)");
    Ok(())
}
