use std::path::Path;

use chrono::Utc;
use serde::Serialize;

use nexus_core::models::Collection;
use nexus_core::sync::{JsonFileQueueStore, OperationQueue, SyncOperation};

/// Rebuild the queue from its persisted file.
///
/// Missing or unparsable files yield an empty queue, same as at app startup.
pub fn open_queue(queue_path: &Path) -> OperationQueue {
    OperationQueue::restore(Box::new(JsonFileQueueStore::new(queue_path)))
}

#[derive(Debug, Serialize)]
pub struct OperationListItem {
    pub id: String,
    pub kind: String,
    pub collection: String,
    pub retries: u32,
    pub enqueued_at: i64,
    pub relative_time: String,
}

pub fn operation_to_list_item(op: &SyncOperation) -> OperationListItem {
    let now_ms = Utc::now().timestamp_millis();
    OperationListItem {
        id: op.id.to_string(),
        kind: op.op.kind().to_string(),
        collection: op.op.collection().to_string(),
        retries: op.retries,
        enqueued_at: op.enqueued_at,
        relative_time: format_relative_time(op.enqueued_at, now_ms),
    }
}

pub fn format_operation_lines(ops: &[SyncOperation]) -> Vec<String> {
    let now_ms = Utc::now().timestamp_millis();
    ops.iter()
        .map(|op| {
            let id = op.id.to_string();
            let short_id = id.chars().take(13).collect::<String>();
            let target = format!("{} {}", op.op.kind(), op.op.collection());
            let relative_time = format_relative_time(op.enqueued_at, now_ms);

            if op.retries == 0 {
                format!("{short_id:<13}  {target:<24}  {relative_time}")
            } else {
                format!(
                    "{short_id:<13}  {target:<24}  {relative_time:<10}  retries: {}",
                    op.retries
                )
            }
        })
        .collect()
}

/// Pending operations per collection, in a fixed display order.
pub fn count_by_collection(ops: &[SyncOperation]) -> Vec<(Collection, usize)> {
    [Collection::Chats, Collection::Messages, Collection::Contexts]
        .into_iter()
        .map(|collection| {
            let count = ops
                .iter()
                .filter(|op| op.op.collection() == collection)
                .count();
            (collection, count)
        })
        .collect()
}

pub fn format_relative_time(timestamp_ms: i64, now_ms: i64) -> String {
    let diff = now_ms.saturating_sub(timestamp_ms);
    let minute = 60_000;
    let hour = 60 * minute;
    let day = 24 * hour;
    let week = 7 * day;

    if diff < minute {
        "just now".to_string()
    } else if diff < hour {
        format!("{}m ago", diff / minute)
    } else if diff < day {
        format!("{}h ago", diff / hour)
    } else if diff < week {
        format!("{}d ago", diff / day)
    } else {
        format!("{}w ago", diff / week)
    }
}

#[cfg(test)]
mod tests {
    use nexus_core::models::{Chat, ChatId, MessageId};
    use nexus_core::sync::Operation;
    use pretty_assertions::assert_eq;

    use super::*;

    fn sample_ops() -> Vec<SyncOperation> {
        vec![
            SyncOperation::new(Operation::CreateChat {
                chat: Chat::new("user-1", "Thread", Vec::new()),
            }),
            SyncOperation::new(Operation::DeleteMessage {
                id: MessageId::new(),
            }),
            SyncOperation::new(Operation::DeleteChat { id: ChatId::new() }),
        ]
    }

    #[test]
    fn format_relative_time_units() {
        let now = 10_000_000;
        assert_eq!(format_relative_time(now - 30_000, now), "just now");
        assert_eq!(format_relative_time(now - 120_000, now), "2m ago");
        assert_eq!(format_relative_time(now - 2 * 60 * 60_000, now), "2h ago");
    }

    #[test]
    fn counts_group_by_collection() {
        let counts = count_by_collection(&sample_ops());
        assert_eq!(
            counts,
            vec![
                (Collection::Chats, 2),
                (Collection::Messages, 1),
                (Collection::Contexts, 0),
            ]
        );
    }

    #[test]
    fn operation_lines_show_kind_and_collection() {
        let mut ops = sample_ops();
        ops[1].retries = 2;

        let lines = format_operation_lines(&ops);
        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("create chats"));
        assert!(lines[1].contains("delete messages"));
        assert!(lines[1].contains("retries: 2"));
    }

    #[test]
    fn list_item_carries_string_forms() {
        let ops = sample_ops();
        let item = operation_to_list_item(&ops[0]);
        assert_eq!(item.kind, "create");
        assert_eq!(item.collection, "chats");
        assert_eq!(item.retries, 0);
    }
}
