use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use bookshelf_client::{
    config::{NotificationsConfig, SearchConfig},
    models::Book,
    services::{
        notifications::{Level, Notifications},
        search::{NavKey, Phase, SearchController},
    },
};

use crate::support::{advance, Call, FakeApi, DUNE_ISBN};

struct Harness {
    search: SearchController,
    imported: mpsc::UnboundedReceiver<Book>,
    notifications: Notifications,
}

fn controller(api: &Arc<FakeApi>, editing: bool) -> Harness {
    let notifications = Notifications::new(&NotificationsConfig::default());
    let (search, imported) = SearchController::spawn(
        api.clone(),
        &SearchConfig::default(),
        editing,
        notifications.clone(),
    );
    search.focus();
    Harness {
        search,
        imported,
        notifications,
    }
}

async fn type_text(search: &SearchController, text: &str) {
    for end in 1..=text.len() {
        search.input(&text[..end]);
        advance(100).await;
    }
}

#[tokio::test(start_paused = true)]
async fn test_typing_sends_one_search_after_quiet_period() {
    let api = Arc::new(FakeApi::new(3));
    let Harness { search, .. } = controller(&api, false);

    type_text(&search, "dune").await;
    assert!(api.searches().is_empty());

    advance(400).await;
    assert_eq!(api.searches(), vec![("dune".to_string(), 10)]);

    let view = search.view();
    assert_eq!(view.phase, Phase::ResultsShown);
    assert_eq!(view.results.len(), 3);
    assert_eq!(view.results[0].title, "dune 0");
    assert_eq!(view.ceiling, Some(10));
    assert!(!view.can_load_more);
}

#[tokio::test(start_paused = true)]
async fn test_load_more_grows_ceiling() {
    let api = Arc::new(FakeApi::new(25));
    let Harness { search, .. } = controller(&api, false);

    search.input("dune");
    advance(500).await;
    assert!(search.view().can_load_more);

    search.load_more();
    advance(10).await;
    search.load_more();
    advance(10).await;

    assert_eq!(
        api.searches(),
        vec![
            ("dune".to_string(), 10),
            ("dune".to_string(), 20),
            ("dune".to_string(), 30),
        ]
    );
    let view = search.view();
    assert_eq!(view.results.len(), 25);
    assert!(!view.can_load_more);

    // Short response: nothing more to fetch
    search.load_more();
    advance(10).await;
    assert_eq!(api.searches().len(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_superseded_response_is_discarded() {
    let api = Arc::new(FakeApi {
        search_delay: Duration::from_millis(1000),
        ..FakeApi::new(2)
    });
    let Harness { search, .. } = controller(&api, false);

    search.input("dun");
    advance(500).await;
    search.input("dune");
    advance(1000).await;

    // "dun" answered at 1400ms but "dune" was already in flight
    assert_eq!(api.searches().len(), 2);
    let view = search.view();
    assert_eq!(view.phase, Phase::Searching);
    assert!(view.results.is_empty());

    advance(500).await;
    let view = search.view();
    assert_eq!(view.phase, Phase::ResultsShown);
    assert_eq!(view.results[0].title, "dune 0");
}

#[tokio::test(start_paused = true)]
async fn test_keyboard_selection_imports_book() {
    let api = Arc::new(FakeApi::new(3));
    let Harness {
        search,
        mut imported,
        ..
    } = controller(&api, false);

    search.input("dune");
    advance(500).await;
    search.key(NavKey::Down);
    search.key(NavKey::Down);
    search.key(NavKey::Up);
    advance(1).await;
    assert_eq!(search.view().cursor, Some(0));

    search.key(NavKey::Enter);
    let book = tokio::time::timeout(Duration::from_secs(1), imported.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(book.title, "Dune");
    assert!(api.calls().contains(&Call::Import(DUNE_ISBN.to_string())));

    advance(1).await;
    let view = search.view();
    assert_eq!(view.phase, Phase::Idle);
    assert!(view.input.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_editing_form_never_searches() {
    let api = Arc::new(FakeApi::new(3));
    let Harness { search, .. } = controller(&api, true);

    type_text(&search, "dune").await;
    advance(1000).await;

    assert!(api.searches().is_empty());
    assert_eq!(search.view().phase, Phase::Idle);
    assert!(search.view().editing);
}

#[tokio::test(start_paused = true)]
async fn test_blur_closes_dropdown_after_grace() {
    let api = Arc::new(FakeApi::new(3));
    let Harness { search, .. } = controller(&api, false);

    search.input("dune");
    advance(500).await;

    // Focus comes back within the grace period
    search.blur();
    advance(100).await;
    search.focus();
    advance(300).await;
    assert_eq!(search.view().phase, Phase::ResultsShown);

    search.blur();
    advance(300).await;
    let view = search.view();
    assert_eq!(view.phase, Phase::Idle);
    assert!(view.results.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_escape_then_new_query() {
    let api = Arc::new(FakeApi::new(3));
    let Harness { search, .. } = controller(&api, false);

    search.input("dune");
    advance(500).await;
    search.key(NavKey::Escape);
    advance(1).await;
    assert_eq!(search.view().phase, Phase::Idle);

    search.input("dune messiah");
    advance(500).await;
    assert_eq!(
        api.searches(),
        vec![("dune".to_string(), 10), ("dune messiah".to_string(), 10)]
    );
}

#[tokio::test(start_paused = true)]
async fn test_failed_import_keeps_results() {
    let api = Arc::new(FakeApi {
        hit_isbn: Some("9780000000002".to_string()),
        ..FakeApi::new(2)
    });
    let mut harness = controller(&api, false);

    harness.search.input("dune");
    advance(500).await;
    harness.search.select(7);
    advance(1).await;
    assert!(!api.calls().iter().any(|c| matches!(c, Call::Import(_))));

    harness.search.select(1);
    advance(1).await;
    assert!(api
        .calls()
        .contains(&Call::Import("9780000000002".to_string())));
    assert!(harness.imported.try_recv().is_err());

    let view = harness.search.view();
    assert_eq!(view.phase, Phase::ResultsShown);
    assert_eq!(view.results.len(), 2);

    let errors = harness.notifications.drain();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].level, Level::Error);
    assert_eq!(errors[0].status, Some(404));
}

#[tokio::test(start_paused = true)]
async fn test_result_without_isbn_is_not_imported() {
    let api = Arc::new(FakeApi {
        hit_isbn: None,
        ..FakeApi::new(2)
    });
    let harness = controller(&api, false);

    harness.search.input("dune");
    advance(500).await;
    harness.search.select(0);
    advance(1).await;

    assert!(!api.calls().iter().any(|c| matches!(c, Call::Import(_))));
    assert_eq!(harness.search.view().phase, Phase::ResultsShown);
    let errors = harness.notifications.drain();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].status, None);
    assert!(errors[0].message.contains("no ISBN"));
}

#[tokio::test(start_paused = true)]
async fn test_close_discards_inflight_search() {
    let api = Arc::new(FakeApi {
        search_delay: Duration::from_millis(1000),
        ..FakeApi::new(2)
    });
    let Harness { search, .. } = controller(&api, false);

    search.input("dune");
    advance(500).await;
    search.close();
    advance(2000).await;

    let view = search.view();
    assert_eq!(view.phase, Phase::Idle);
    assert!(view.input.is_empty());
    assert!(view.results.is_empty());
}
