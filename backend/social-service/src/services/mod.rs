pub mod chat;
pub mod feed;
pub mod follow;
pub mod posts;
pub mod rate_limit;
pub mod sanitize;
pub mod users;

pub use chat::{ChatBroadcaster, ChatHub, ChatService, ChatSubscription};
pub use feed::{FeedComposer, FeedPolicy, DEFAULT_FEED_PAGE_SIZE, MAX_FEED_PAGE_SIZE};
pub use follow::{FollowOutcome, FollowService, RejectReason, FOLLOWS_PER_PAGE};
pub use posts::{PostService, POSTS_PER_PAGE};
pub use users::UserService;
