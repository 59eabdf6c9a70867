/// Follow graph behavior over in-memory stores
mod common;

use common::{DownBackend, FlakyBackend, RacingFollowStore, TestEnv};
use count_cache::{CacheKey, CountCache};
use social_service::error::ServiceError;
use social_service::repository::FollowStore;
use social_service::services::{FollowOutcome, FollowService, RejectReason, FOLLOWS_PER_PAGE};
use std::sync::Arc;

#[tokio::test]
async fn test_follow_adds_edge_and_bumps_counts() {
    let env = TestEnv::new();
    let follows = env.follow_service();
    let alice = env.user("alice").await;
    let bob = env.user("bob").await;

    let before = follows.follower_count(bob.id).await.unwrap();
    let outcome = follows.follow(alice.id, bob.id).await.unwrap();

    assert_eq!(outcome, FollowOutcome::Applied);
    assert!(follows.is_following(alice.id, bob.id).await.unwrap());
    assert!(!follows.is_following(bob.id, alice.id).await.unwrap());
    assert_eq!(follows.follower_count(bob.id).await.unwrap(), before + 1);
    assert_eq!(follows.following_count(alice.id).await.unwrap(), 1);
    assert_eq!(env.follow_store.edges_to(bob.id).await.unwrap(), vec![alice.id]);
}

#[tokio::test]
async fn test_self_follow_is_rejected() {
    let env = TestEnv::new();
    let follows = env.follow_service();
    let alice = env.user("alice").await;

    let outcome = follows.follow(alice.id, alice.id).await.unwrap();

    assert_eq!(outcome, FollowOutcome::Rejected(RejectReason::SelfFollow));
    assert!(env.follow_store.is_empty().await);
    assert_eq!(follows.follower_count(alice.id).await.unwrap(), 0);
}

#[tokio::test]
async fn test_duplicate_follow_is_rejected() {
    let env = TestEnv::new();
    let follows = env.follow_service();
    let alice = env.user("alice").await;
    let bob = env.user("bob").await;

    assert!(follows.follow(alice.id, bob.id).await.unwrap().is_applied());
    let second = follows.follow(alice.id, bob.id).await.unwrap();

    assert_eq!(
        second,
        FollowOutcome::Rejected(RejectReason::AlreadyFollowing)
    );
    assert_eq!(env.follow_store.len().await, 1);
    assert_eq!(follows.follower_count(bob.id).await.unwrap(), 1);
}

#[tokio::test]
async fn test_concurrent_follows_of_same_pair_apply_once() {
    let env = TestEnv::new();
    let follows = env.follow_service();
    let alice = env.user("alice").await;
    let bob = env.user("bob").await;

    let (a, b) = tokio::join!(follows.follow(alice.id, bob.id), follows.follow(alice.id, bob.id));
    let outcomes = [a.unwrap(), b.unwrap()];

    assert_eq!(outcomes.iter().filter(|o| o.is_applied()).count(), 1);
    assert!(outcomes
        .contains(&FollowOutcome::Rejected(RejectReason::AlreadyFollowing)));
    assert_eq!(env.follow_store.len().await, 1);
}

#[tokio::test]
async fn test_follow_losing_insert_race_is_rejected() {
    let env = TestEnv::new();
    let store = Arc::new(RacingFollowStore::new(false));
    let follows = FollowService::new(store.clone(), env.users.clone(), env.cache.clone());
    let alice = env.user("alice").await;
    let bob = env.user("bob").await;

    let outcome = follows.follow(alice.id, bob.id).await.unwrap();

    assert_eq!(
        outcome,
        FollowOutcome::Rejected(RejectReason::AlreadyFollowing)
    );
    assert_eq!(store.writes.load(std::sync::atomic::Ordering::SeqCst), 1);
    assert_eq!(follows.follower_count(bob.id).await.unwrap(), 0);
    assert_eq!(follows.following_count(alice.id).await.unwrap(), 0);
}

#[tokio::test]
async fn test_unfollow_losing_delete_race_is_rejected() {
    let env = TestEnv::new();
    let store = Arc::new(RacingFollowStore::new(true));
    let follows = FollowService::new(store.clone(), env.users.clone(), env.cache.clone());
    let alice = env.user("alice").await;
    let bob = env.user("bob").await;

    let outcome = follows.unfollow(alice.id, bob.id).await.unwrap();

    assert_eq!(outcome, FollowOutcome::Rejected(RejectReason::NotFollowing));
    assert_eq!(store.writes.load(std::sync::atomic::Ordering::SeqCst), 1);
    assert_eq!(follows.follower_count(bob.id).await.unwrap(), 0);
    assert_eq!(follows.following_count(alice.id).await.unwrap(), 0);
}

#[tokio::test]
async fn test_unfollow_without_edge_is_rejected() {
    let env = TestEnv::new();
    let follows = env.follow_service();
    let alice = env.user("alice").await;
    let bob = env.user("bob").await;

    let outcome = follows.unfollow(alice.id, bob.id).await.unwrap();

    assert_eq!(outcome, FollowOutcome::Rejected(RejectReason::NotFollowing));
    assert_eq!(follows.follower_count(bob.id).await.unwrap(), 0);
    assert_eq!(follows.following_count(alice.id).await.unwrap(), 0);
}

#[tokio::test]
async fn test_follow_then_unfollow_restores_counts() {
    let env = TestEnv::new();
    let follows = env.follow_service();
    let alice = env.user("alice").await;
    let bob = env.user("bob").await;
    let carol = env.user("carol").await;

    follows.follow(carol.id, bob.id).await.unwrap();
    let before = follows.follower_count(bob.id).await.unwrap();

    follows.follow(alice.id, bob.id).await.unwrap();
    assert_eq!(follows.follower_count(bob.id).await.unwrap(), before + 1);

    let outcome = follows.unfollow(alice.id, bob.id).await.unwrap();
    assert_eq!(outcome, FollowOutcome::Applied);
    assert_eq!(follows.follower_count(bob.id).await.unwrap(), before);
    assert!(!follows.is_following(alice.id, bob.id).await.unwrap());
}

#[tokio::test]
async fn test_counts_are_cached_until_invalidated() {
    let env = TestEnv::new();
    let follows = env.follow_service();
    let alice = env.user("alice").await;
    let bob = env.user("bob").await;

    // Populate the cache with zero
    assert_eq!(follows.follower_count(bob.id).await.unwrap(), 0);
    let cached: Option<i64> = env
        .cache
        .peek(&CacheKey::followers_count(bob.id))
        .await
        .unwrap();
    assert_eq!(cached, Some(0));

    follows.follow(alice.id, bob.id).await.unwrap();

    // The follow dropped the stale entry, so the next read recomputes
    let cached: Option<i64> = env
        .cache
        .peek(&CacheKey::followers_count(bob.id))
        .await
        .unwrap();
    assert_eq!(cached, None);
    assert_eq!(follows.follower_count(bob.id).await.unwrap(), 1);
}

#[tokio::test]
async fn test_cache_outage_aborts_follow_without_mutation() {
    let env = TestEnv::with_cache(CountCache::new(Arc::new(DownBackend)));
    let follows = env.follow_service();
    let alice = env.user("alice").await;
    let bob = env.user("bob").await;

    let result = follows.follow(alice.id, bob.id).await;

    assert!(matches!(result, Err(ServiceError::Cache(_))));
    assert!(env.follow_store.is_empty().await);
    assert!(!follows.is_following(alice.id, bob.id).await.unwrap());
}

#[tokio::test]
async fn test_invalidation_failure_after_write_keeps_the_edge() {
    // Four deletes for the pre-write invalidation, then the backend breaks
    let env = TestEnv::with_cache(CountCache::new(Arc::new(FlakyBackend::new(4))));
    let follows = env.follow_service();
    let alice = env.user("alice").await;
    let bob = env.user("bob").await;

    let outcome = follows.follow(alice.id, bob.id).await.unwrap();

    assert_eq!(outcome, FollowOutcome::Applied);
    assert!(follows.is_following(alice.id, bob.id).await.unwrap());
}

#[tokio::test]
async fn test_follower_pages_are_newest_first() {
    let env = TestEnv::new();
    let follows = env.follow_service();
    let star = env.user("star").await;

    let mut fans = Vec::new();
    for i in 0..(FOLLOWS_PER_PAGE + 2) {
        let fan = env.user(&format!("fan{}", i)).await;
        follows.follow(fan.id, star.id).await.unwrap();
        fans.push(fan);
    }

    let first = follows.followers(star.id, 1).await.unwrap();
    assert_eq!(first.len() as i64, FOLLOWS_PER_PAGE);
    assert_eq!(first[0].username, format!("fan{}", FOLLOWS_PER_PAGE + 1));
    assert_eq!(first[0].avatar, "/storage/avatars/default-avatar.svg");

    let second = follows.followers(star.id, 2).await.unwrap();
    assert_eq!(second.len(), 2);
    assert_eq!(second[1].username, "fan0");

    // page 0 reads as page 1
    let zero = follows.followers(star.id, 0).await.unwrap();
    assert_eq!(zero[0].id, first[0].id);

    let following = follows.following(fans[0].id, 1).await.unwrap();
    assert_eq!(following.len(), 1);
    assert_eq!(following[0].username, "star");
}
