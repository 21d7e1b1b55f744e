use std::cmp::Ordering;

use clap::ValueEnum;

use crate::models::Session;

/// Listing order; every key sorts "most interesting first"
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum SortKey {
    /// Most recently updated first
    #[default]
    Updated,
    /// Most recently created first
    Created,
    /// Longest conversations first
    Messages,
    /// Alphabetical by display title (case-insensitive)
    Title,
}

/// Sort sessions in place, ties broken by id so the order is deterministic
pub fn sort_sessions(sessions: &mut [Session], key: SortKey) {
    sessions.sort_by(|a, b| compare(a, b, key).then_with(|| a.id.cmp(&b.id)));
}

fn compare(a: &Session, b: &Session, key: SortKey) -> Ordering {
    match key {
        SortKey::Updated => b.updated_at.cmp(&a.updated_at),
        SortKey::Created => b.created_at.cmp(&a.created_at),
        SortKey::Messages => b.message_count().cmp(&a.message_count()),
        SortKey::Title => {
            a.display_title().to_lowercase().cmp(&b.display_title().to_lowercase())
        }
    }
}
