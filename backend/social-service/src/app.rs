//! Service wiring and routes
//!
//! `AppState` owns one instance of every service; stores, cache and chat
//! broadcaster are injected so tests can run the full HTTP surface in memory.

use crate::config::SocialConfig;
use crate::handlers;
use crate::repository::{
    FollowStore, MemoryFollowStore, MemoryPostStore, MemoryUserStore, PgFollowStore, PgPostStore,
    PgUserStore, PostStore, UserStore,
};
use crate::services::{
    ChatBroadcaster, ChatService, FeedComposer, FeedPolicy, FollowService, PostService,
    UserService,
};
use actix_web::web;
use count_cache::CountCache;
use prometheus::Registry;
use sqlx::PgPool;
use std::sync::Arc;

/// Storage backends behind the services
#[derive(Clone)]
pub struct Stores {
    pub follows: Arc<dyn FollowStore>,
    pub posts: Arc<dyn PostStore>,
    pub users: Arc<dyn UserStore>,
}

impl Stores {
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            follows: Arc::new(PgFollowStore::new(pool.clone())),
            posts: Arc::new(PgPostStore::new(pool.clone())),
            users: Arc::new(PgUserStore::new(pool)),
        }
    }

    pub fn in_memory(users: Arc<MemoryUserStore>) -> Self {
        Self {
            follows: Arc::new(MemoryFollowStore::new()),
            posts: Arc::new(MemoryPostStore::new()),
            users,
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub follows: FollowService,
    pub feed: FeedComposer,
    pub posts: PostService,
    pub users: UserService,
    pub chat: ChatService,
    /// Checked by `/ready` when present
    pub pool: Option<PgPool>,
    pub registry: Registry,
}

impl AppState {
    pub fn new(
        stores: Stores,
        cache: CountCache,
        settings: &SocialConfig,
        broadcaster: Arc<dyn ChatBroadcaster>,
    ) -> Self {
        let follows = FollowService::new(stores.follows.clone(), stores.users.clone(), cache.clone());
        let feed = FeedComposer::new(
            stores.follows.clone(),
            stores.posts.clone(),
            FeedPolicy {
                include_own_posts: settings.feed_include_own_posts,
            },
        );
        let posts = PostService::new(
            stores.posts.clone(),
            cache,
            settings.search_rate_limit_per_minute,
        );
        let users = UserService::new(stores.users.clone(), follows.clone(), posts.clone());

        Self {
            follows,
            feed,
            posts,
            users,
            chat: ChatService::new(broadcaster),
            pool: None,
            registry: Registry::new(),
        }
    }

    pub fn with_pool(mut self, pool: PgPool) -> Self {
        self.pool = Some(pool);
        self
    }

    pub fn with_registry(mut self, registry: Registry) -> Self {
        self.registry = registry;
        self
    }
}

/// Register every route
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(handlers::health::health))
        .route("/ready", web::get().to(handlers::health::ready))
        .route("/metrics", web::get().to(handlers::health::metrics))
        .service(
            web::scope("/api/v1")
                .route("/follow/{username}", web::post().to(handlers::follow::follow))
                .route("/unfollow/{username}", web::post().to(handlers::follow::unfollow))
                .route("/profile/{username}", web::get().to(handlers::profile::show))
                .route(
                    "/profile/{username}/followers",
                    web::get().to(handlers::profile::followers),
                )
                .route(
                    "/profile/{username}/following",
                    web::get().to(handlers::profile::following),
                )
                .route(
                    "/profile/{username}/posts",
                    web::get().to(handlers::profile::posts),
                )
                .route("/feed", web::get().to(handlers::feed::get_feed))
                .route("/posts", web::post().to(handlers::posts::create_post))
                .route("/posts/{id}", web::get().to(handlers::posts::get_post))
                .route("/posts/{id}", web::put().to(handlers::posts::update_post))
                .route("/posts/{id}", web::delete().to(handlers::posts::delete_post))
                .route("/search/{query}", web::get().to(handlers::posts::search))
                .route("/avatar", web::put().to(handlers::profile::update_avatar))
                .route("/chat", web::post().to(handlers::chat::send_message)),
        );
}
