mod follows;
mod memory;
mod posts;
mod r#trait;
mod users;

pub use follows::PgFollowStore;
pub use memory::{MemoryFollowStore, MemoryPostStore, MemoryUserStore};
pub use posts::PgPostStore;
pub use r#trait::{FollowStore, PostStore, UserStore};
pub use users::PgUserStore;

/// Offset of a 1-based page; page 0 is read as page 1
pub fn page_offset(page: u32, per_page: i64) -> i64 {
    (i64::from(page.max(1)) - 1).saturating_mul(per_page.max(0))
}
