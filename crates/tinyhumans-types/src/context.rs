//! LLM context formatting from read items.

use crate::dto::ReadMemoryItem;

/// `[namespace:key]\ncontent` per item, blocks joined by a blank line.
pub fn format_context(items: &[ReadMemoryItem]) -> String {
    items
        .iter()
        .map(|it| format!("[{}:{}]\n{}", it.namespace, it.key, it.content))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Keep the first `max` items in server order; `None` keeps all.
pub fn truncate_items(mut items: Vec<ReadMemoryItem>, max: Option<usize>) -> Vec<ReadMemoryItem> {
    if let Some(max) = max {
        items.truncate(max);
    }
    items
}
