pub mod chat;
pub mod feed;
pub mod follow;
pub mod health;
pub mod posts;
pub mod profile;

use serde::Deserialize;

/// `?page=` query; pages start at 1
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<u32>,
}

impl PageQuery {
    pub fn page(&self) -> u32 {
        self.page.unwrap_or(1).max(1)
    }
}
