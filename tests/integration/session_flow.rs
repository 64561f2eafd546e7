use std::sync::Arc;
use std::time::Duration;

use bookshelf_client::{
    models::CreateBook,
    services::{
        authoring::{BookForm, FormMode},
        notifications::Level,
        search::Phase,
    },
    AppError,
};

use crate::support::{advance, author, session, Call, FakeApi, DUNE_ISBN};

fn dune_form(author_name: &str) -> BookForm {
    BookForm {
        title: "Dune".to_string(),
        author_name: author_name.to_string(),
        isbn: DUNE_ISBN.to_string(),
        year: 1965,
        ..Default::default()
    }
}

#[tokio::test(start_paused = true)]
async fn test_import_refreshes_lists_and_closes_form() {
    let api = Arc::new(FakeApi::new(3));
    let mut session = session(api.clone());
    session.start().await.unwrap();

    let search = session.open_form(FormMode::Create).unwrap();
    search.input("dune");
    advance(500).await;
    session.search().unwrap().select(0);

    let imported = tokio::time::timeout(Duration::from_secs(1), session.next_import())
        .await
        .unwrap()
        .unwrap();
    session.finish_import(imported).await;

    assert!(session.form_mode().is_none());
    assert!(!session.services().modal.is_locked());

    let calls = api.calls();
    let import = api.position(&Call::Import(DUNE_ISBN.to_string())).unwrap();
    assert!(calls[import..].contains(&Call::ListBooks));
    assert!(calls[import..].contains(&Call::ListAuthors));

    let books = session.services().catalog.books().await;
    assert_eq!(books.len(), 1);
    assert_eq!(books[0].title, "Dune");
    assert_eq!(session.services().catalog.authors().await.len(), 1);

    let notices = session.services().notifications.drain();
    assert!(notices
        .iter()
        .any(|n| n.level == Level::Success && n.message.contains("Dune")));
}

#[tokio::test]
async fn test_manual_entry_creates_author_first() {
    let api = Arc::new(FakeApi::new(0));
    let mut session = session(api.clone());
    session.start().await.unwrap();
    session.open_form(FormMode::Create).unwrap();

    let saved = session.submit(dune_form("Frank Herbert")).await.unwrap();
    assert_eq!(saved.author.name, "Frank Herbert");

    let create_author = api
        .position(&Call::CreateAuthor("Frank Herbert".to_string()))
        .unwrap();
    let create_book = api
        .calls()
        .iter()
        .position(|c| matches!(c, Call::CreateBook(_)))
        .unwrap();
    assert!(create_author < create_book);
    assert!(session.form_mode().is_none());
    assert_eq!(session.services().catalog.books().await.len(), 1);
}

#[tokio::test]
async fn test_manual_entry_reuses_existing_author() {
    let api = Arc::new(FakeApi::new(0).with_author(7, "Frank Herbert"));
    let mut session = session(api.clone());
    session.start().await.unwrap();
    session.open_form(FormMode::Create).unwrap();

    session.submit(dune_form("  frank HERBERT ")).await.unwrap();

    let calls = api.calls();
    assert!(!calls.iter().any(|c| matches!(c, Call::CreateAuthor(_))));
    assert!(calls.contains(&Call::CreateBook(CreateBook {
        title: "Dune".to_string(),
        author_id: 7,
        isbn: DUNE_ISBN.to_string(),
        year: 1965,
        publisher_id: None,
    })));
}

#[tokio::test]
async fn test_edit_updates_existing_book() {
    let api = Arc::new(FakeApi::new(0).with_author(7, "Frank Herbert"));
    let mut session = session(api.clone());
    session.start().await.unwrap();

    let existing = session
        .services()
        .authoring
        .submit(&FormMode::Create, &dune_form("Frank Herbert"), &[author(7, "Frank Herbert")])
        .await
        .unwrap();

    session.open_form(FormMode::Edit(existing.clone())).unwrap();
    let mut values = BookForm::from_book(&existing);
    values.title = "Dune (40th anniversary)".to_string();
    let updated = session.submit(values).await.unwrap();

    assert_eq!(updated.id, existing.id);
    assert_eq!(updated.title, "Dune (40th anniversary)");
    assert!(api
        .calls()
        .iter()
        .any(|c| matches!(c, Call::UpdateBook(id, _) if *id == existing.id)));
    assert!(session.form_mode().is_none());
}

#[tokio::test]
async fn test_failed_save_keeps_form_open() {
    let api = Arc::new(FakeApi {
        fail_create_book: Some(AppError::Conflict("ISBN already exists".to_string())),
        ..FakeApi::new(0).with_author(7, "Frank Herbert")
    });
    let mut session = session(api.clone());
    session.start().await.unwrap();
    session.open_form(FormMode::Create).unwrap();

    let err = session.submit(dune_form("Frank Herbert")).await.unwrap_err();
    assert_eq!(err, AppError::Conflict("ISBN already exists".to_string()));
    assert_eq!(session.form_mode(), Some(&FormMode::Create));

    let notices = session.services().notifications.drain();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].status, Some(409));
    assert_eq!(notices[0].message, "ISBN already exists");
}

#[tokio::test]
async fn test_retry_after_failed_save_reuses_created_author() {
    let api = Arc::new(FakeApi {
        fail_create_book: Some(AppError::Conflict("ISBN already exists".to_string())),
        ..FakeApi::new(0)
    });
    let mut session = session(api.clone());
    session.start().await.unwrap();
    session.open_form(FormMode::Create).unwrap();

    assert!(session.submit(dune_form("Frank Herbert")).await.is_err());
    assert!(session.submit(dune_form("Frank Herbert")).await.is_err());

    assert_eq!(api.count(|c| matches!(c, Call::CreateAuthor(_))), 1);
    assert_eq!(api.authors.lock().unwrap().len(), 1);

    let author_ids: Vec<i32> = api
        .calls()
        .iter()
        .filter_map(|c| match c {
            Call::CreateBook(request) => Some(request.author_id),
            _ => None,
        })
        .collect();
    assert_eq!(author_ids.len(), 2);
    assert_eq!(author_ids[0], author_ids[1]);

    let authors = session.services().catalog.authors().await;
    assert_eq!(authors.len(), 1);
    assert_eq!(authors[0].name, "Frank Herbert");
}

#[tokio::test(start_paused = true)]
async fn test_closing_during_import_refreshes_lists_when_it_lands() {
    let api = Arc::new(FakeApi {
        import_delay: Duration::from_millis(1000),
        ..FakeApi::new(3)
    });
    let mut session = session(api.clone());
    session.start().await.unwrap();

    session.open_form(FormMode::Create).unwrap().input("dune");
    advance(500).await;
    session.search().unwrap().select(0);
    advance(1).await;
    assert_eq!(session.search().unwrap().view().phase, Phase::Importing);

    session.close_form();
    assert!(session.form_mode().is_none());
    assert!(!session.services().modal.is_locked());
    assert!(session.services().catalog.books().await.is_empty());

    advance(2000).await;
    let import = api.position(&Call::Import(DUNE_ISBN.to_string())).unwrap();
    assert!(api.calls()[import..].contains(&Call::ListBooks));
    let books = session.services().catalog.books().await;
    assert_eq!(books.len(), 1);
    assert_eq!(books[0].title, "Dune");
}

#[tokio::test]
async fn test_invalid_form_makes_no_calls() {
    let api = Arc::new(FakeApi::new(0));
    let mut session = session(api.clone());
    session.open_form(FormMode::Create).unwrap();

    let mut values = dune_form("Frank Herbert");
    values.isbn = "12345".to_string();
    let err = session.submit(values).await.unwrap_err();

    assert!(matches!(err, AppError::Validation(_)));
    assert!(api.calls().is_empty());
}

#[tokio::test]
async fn test_one_form_at_a_time() {
    let api = Arc::new(FakeApi::new(0));
    let mut session = session(api);

    session.open_form(FormMode::Create).unwrap();
    assert!(session.services().modal.is_locked());
    assert!(session.open_form(FormMode::Create).is_err());

    session.close_form();
    assert!(!session.services().modal.is_locked());
    assert!(session.search().is_none());
    assert!(session.open_form(FormMode::Create).is_ok());
}

#[tokio::test]
async fn test_author_mutations_refresh_lists() {
    let api = Arc::new(FakeApi::new(0).with_author(7, "Frank Herbert"));
    let session = session(api.clone());
    let catalog = &session.services().catalog;
    catalog.refresh().await.unwrap();

    let created = catalog.create_author("Brian Herbert").await.unwrap();
    assert_eq!(catalog.authors().await.len(), 2);

    catalog.update_author(created.id, "Brian P. Herbert").await.unwrap();
    assert!(catalog
        .authors()
        .await
        .iter()
        .any(|a| a.name == "Brian P. Herbert"));

    catalog.delete_author(created.id).await.unwrap();
    assert_eq!(catalog.authors().await.len(), 1);

    let lists = api
        .calls()
        .iter()
        .filter(|c| matches!(c, Call::ListAuthors))
        .count();
    assert_eq!(lists, 4);

    let missing = catalog.get_book(404).await.unwrap_err();
    assert_eq!(missing.status(), Some(404));
    assert!(catalog.get_book_by_isbn(DUNE_ISBN).await.is_err());
    assert_eq!(catalog.get_author(7).await.unwrap().name, "Frank Herbert");
}
