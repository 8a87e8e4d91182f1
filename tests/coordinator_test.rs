//! Integration tests for navigation through the preload coordinator

mod common;

use common::*;
use page_preloader::config::PreloaderConfig;
use page_preloader::preload::{NavigationOutcome, PreloadError};
use std::time::Duration;

/// Let spawned preloads reach their first await
async fn settle_spawned() {
    tokio::time::sleep(Duration::from_millis(10)).await;
}

/// A preload that succeeds commits its data, then navigates
#[tokio::test(start_paused = true)]
async fn test_successful_preload_commits_then_navigates() {
    let fx = Fixture::new();

    let outcome = fx.coordinator.navigate_to(MAP).await.unwrap();

    assert!(outcome.is_navigated());
    assert_eq!(fx.current_path(), MAP);
    assert!(fx.store.is_loaded(MAP));
    assert_eq!(
        fx.store.data(MAP).unwrap().as_value()["layers"][0]["name"],
        "Grizzly Range"
    );
    assert_eq!(
        fx.feedback.events(),
        vec![
            FeedbackEvent::Start(Some("Loading Interactive Map...".to_string())),
            FeedbackEvent::Update(0.5),
            FeedbackEvent::Update(1.0),
            FeedbackEvent::Success("Interactive Map loaded!".to_string()),
            FeedbackEvent::End,
        ]
    );
    assert!(fx.coordinator.active_task().is_none());
}

/// A superseded navigation never commits nor navigates, even once its load finishes
#[tokio::test(start_paused = true)]
async fn test_superseded_navigation_is_discarded() {
    let fx = Fixture::new();

    let map = fx.coordinator.begin_navigation(&fx.item(MAP), true).unwrap();
    settle_spawned().await;
    let gallery = fx.coordinator.begin_navigation(&fx.item(GALLERY), true).unwrap();

    assert!(map.finish().await.is_canceled());
    assert!(gallery.finish().await.is_navigated());

    // Map load keeps running to completion in the background
    tokio::time::sleep(MAP_DELAY * 2).await;
    assert_eq!(fx.map_calls(), 1);
    assert!(!fx.store.is_loaded(MAP));
    assert!(fx.store.is_loaded(GALLERY));
    assert_eq!(fx.router.history(), vec![ROOT, GALLERY]);
    assert_eq!(fx.feedback.starts(), 2);
    assert_eq!(fx.feedback.ends(), 2);
    assert!(fx.feedback.errors().is_empty());
}

/// Map then home: home navigates at once and the map result is ignored
#[tokio::test(start_paused = true)]
async fn test_plain_route_supersedes_slow_preload() {
    let fx = Fixture::new();

    let map = fx.coordinator.begin_navigation(&fx.item(MAP), true).unwrap();
    settle_spawned().await;
    let home = fx.coordinator.begin_navigation(&fx.item(HOME), true).unwrap();

    assert_eq!(fx.current_path(), HOME);
    assert!(home.finish().await.is_navigated());
    assert!(map.finish().await.is_canceled());

    tokio::time::sleep(MAP_DELAY * 2).await;
    assert_eq!(fx.router.history(), vec![ROOT, HOME]);
    assert!(!fx.store.is_loaded(MAP));
    assert_eq!(fx.feedback.starts(), 1);
    assert_eq!(fx.feedback.ends(), 1);
}

/// A failing preload reports one error, ends once and leaves everything untouched
#[tokio::test(start_paused = true)]
async fn test_failed_preload_reports_and_stays() {
    let fx = Fixture::new();

    let outcome = fx.coordinator.navigate_to(BROKEN).await.unwrap();

    match outcome {
        NavigationOutcome::Failed(PreloadError::Failed { path, message }) => {
            assert_eq!(path, BROKEN);
            assert!(message.contains("NetworkError"));
        }
        other => panic!("expected failure, got {:?}", other),
    }
    assert_eq!(fx.current_path(), ROOT);
    assert!(!fx.store.is_loaded(BROKEN));
    assert!(fx.store.last_error(BROKEN).unwrap().contains("NetworkError"));
    assert_eq!(fx.feedback.errors(), vec!["Failed to load Broken.".to_string()]);
    assert_eq!(fx.feedback.starts(), 1);
    assert_eq!(fx.feedback.ends(), 1);
}

/// Explicit cancellation is silent: no error, no commit, no navigation
#[tokio::test(start_paused = true)]
async fn test_cancel_active() {
    let fx = Fixture::new();

    let map = fx.coordinator.begin_navigation(&fx.item(MAP), true).unwrap();
    assert_eq!(fx.coordinator.active_task().unwrap().path, MAP);

    assert!(fx.coordinator.cancel_active());
    assert!(fx.coordinator.active_task().is_none());
    assert!(map.finish().await.is_canceled());

    assert_eq!(fx.current_path(), ROOT);
    assert!(fx.feedback.errors().is_empty());
    assert_eq!(fx.feedback.ends(), 1);
    assert!(!fx.coordinator.cancel_active());
}

/// Canceling after the load settled changes nothing
#[tokio::test(start_paused = true)]
async fn test_cancel_after_settlement_keeps_commit() {
    let fx = Fixture::new();

    assert!(fx.coordinator.navigate_to(MAP).await.unwrap().is_navigated());
    assert!(!fx.coordinator.cancel_active());

    assert!(fx.store.is_loaded(MAP));
    assert_eq!(fx.current_path(), MAP);
}

/// Clicking the current page does nothing
#[tokio::test(start_paused = true)]
async fn test_click_on_current_path_is_ignored() {
    let fx = Fixture::new();
    fx.coordinator.navigate_to(MAP).await.unwrap();

    let outcome = fx.coordinator.navigate_to(MAP).await.unwrap();

    assert!(matches!(outcome, NavigationOutcome::AlreadyThere { .. }));
    assert_eq!(fx.map_calls(), 1);
    assert_eq!(fx.feedback.starts(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_unknown_route() {
    let fx = Fixture::new();

    let err = fx.coordinator.navigate_to("/nowhere").await.unwrap_err();
    assert!(matches!(err, PreloadError::UnknownRoute(path) if path == "/nowhere"));
}

/// A coordinator without a store fails fast instead of loading into nothing
#[tokio::test(start_paused = true)]
async fn test_uninitialized_store_fails_fast() {
    let fx = Fixture::without_store();

    let err = fx.coordinator.navigate_to(MAP).await.unwrap_err();

    assert!(matches!(err, PreloadError::StoreUninitialized));
    assert_eq!(fx.feedback.starts(), 0);
    assert!(!fx.coordinator.is_loading());
    assert_eq!(fx.map_calls(), 0);
}

/// Feedback text alone is enough to go through the coordinator
#[tokio::test(start_paused = true)]
async fn test_feedback_only_item() {
    let fx = Fixture::new();

    let outcome = fx.coordinator.navigate_to(SLOW_TOAST).await.unwrap();

    assert!(outcome.is_navigated());
    assert!(!fx.store.is_loaded(SLOW_TOAST));
    assert_eq!(
        fx.feedback.events(),
        vec![
            FeedbackEvent::Start(Some("Just a toast".to_string())),
            FeedbackEvent::Success("Toast Only loaded!".to_string()),
            FeedbackEvent::End,
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn test_loading_flag_follows_navigation() {
    let fx = Fixture::new();
    let loading = fx.coordinator.subscribe_loading();
    assert!(!fx.coordinator.is_loading());

    let map = fx.coordinator.begin_navigation(&fx.item(MAP), true).unwrap();
    assert!(fx.coordinator.is_loading());
    assert!(*loading.borrow());

    map.finish().await;
    assert!(!fx.coordinator.is_loading());
    assert!(!*loading.borrow());
}

/// Superseding keeps the flag up until the last navigation ends
#[tokio::test(start_paused = true)]
async fn test_loading_flag_stays_up_across_supersede() {
    let fx = Fixture::new();

    let map = fx.coordinator.begin_navigation(&fx.item(MAP), true).unwrap();
    let gallery = fx.coordinator.begin_navigation(&fx.item(GALLERY), true).unwrap();

    map.finish().await;
    assert!(fx.coordinator.is_loading());

    gallery.finish().await;
    assert!(!fx.coordinator.is_loading());
}

/// A preload exceeding the configured timeout is reported as a failure
#[tokio::test(start_paused = true)]
async fn test_timeout_is_reported() {
    let config = PreloaderConfig {
        preload_timeout_ms: Some(500),
        ..PreloaderConfig::default()
    };
    let fx = Fixture::with_config(config);

    let outcome = fx.coordinator.navigate_to(MAP).await.unwrap();

    assert!(matches!(
        outcome,
        NavigationOutcome::Failed(PreloadError::TimedOut { ref path, .. }) if path == MAP
    ));
    assert_eq!(fx.feedback.errors(), vec!["Failed to load Interactive Map.".to_string()]);
    assert_eq!(fx.feedback.ends(), 1);

    tokio::time::sleep(MAP_DELAY * 2).await;
    assert!(!fx.store.is_loaded(MAP));
    assert_eq!(fx.current_path(), ROOT);
}

/// Progress from a superseded load never reaches the feedback channel
#[tokio::test(start_paused = true)]
async fn test_stale_progress_is_dropped() {
    let fx = Fixture::new();

    let map = fx.coordinator.begin_navigation(&fx.item(MAP), true).unwrap();
    settle_spawned().await;
    let gallery = fx.coordinator.begin_navigation(&fx.item(GALLERY), true).unwrap();

    map.finish().await;
    gallery.finish().await;
    tokio::time::sleep(MAP_DELAY * 2).await;

    assert_eq!(fx.feedback.updates(), vec![0.5]);
}

/// Coming back to a page whose superseded load is still running joins that load
#[tokio::test(start_paused = true)]
async fn test_reselect_joins_in_flight_load() {
    let fx = Fixture::new();

    let first = fx.coordinator.begin_navigation(&fx.item(MAP), true).unwrap();
    settle_spawned().await;
    let gallery = fx.coordinator.begin_navigation(&fx.item(GALLERY), true).unwrap();
    let again = fx.coordinator.begin_navigation(&fx.item(MAP), true).unwrap();

    assert!(first.finish().await.is_canceled());
    assert!(gallery.finish().await.is_canceled());
    assert!(again.finish().await.is_navigated());

    assert_eq!(fx.map_calls(), 1);
    assert!(fx.store.is_loaded(MAP));
    assert_eq!(fx.router.history(), vec![ROOT, MAP]);
}

/// Two coordinators never cancel each other
#[tokio::test(start_paused = true)]
async fn test_independent_coordinators() {
    let a = Fixture::new();
    let b = Fixture::new();

    let map = a.coordinator.begin_navigation(&a.item(MAP), true).unwrap();
    let gallery = b.coordinator.begin_navigation(&b.item(GALLERY), true).unwrap();

    assert!(gallery.finish().await.is_navigated());
    assert!(map.finish().await.is_navigated());
    assert_eq!(a.current_path(), MAP);
    assert_eq!(b.current_path(), GALLERY);
}
