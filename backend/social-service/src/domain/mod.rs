pub mod models;

pub use models::{
    avatar_path, ChatMessage, FeedMode, FollowEdge, Post, PostSummary, User, UserProfile,
    UserSummary, DEFAULT_AVATAR,
};
