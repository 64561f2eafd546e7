//! Line-oriented terminal front-end.
//!
//! While a form is open, plain text replaces the search input; slash
//! commands drive keyboard/pointer actions and the CRUD operations.

use std::io::Write;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_stream::{wrappers::WatchStream, StreamExt};

use crate::{
    error::AppResult,
    models::{Author, Book},
    services::{
        authoring::{BookForm, FormMode},
        notifications::Level,
        search::{NavKey, Phase, SearchController, SearchView},
    },
    session::Session,
};

const HELP: &str = "\
Forms:    /new  /edit <id>  /close  /save title=..; author=..; isbn=..; year=..[; description=..; thumbnail=..; publisher=<id>]
Dropdown: /down  /up  /enter  /esc  /pick <n>  /more  /blur  /focus  (any other text is the search input)
Books:    /books  /book <id>  /isbn <isbn>  /delete <id>
Authors:  /authors  /author <id>  /add-author <name>  /rename-author <id> <name>  /delete-author <id>
Other:    /refresh  /help  /quit";

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Input(String),
    New,
    Edit(i32),
    Close,
    Save(Vec<FormField>),
    Key(NavKey),
    Pick(usize),
    More,
    Blur,
    Focus,
    Books,
    Book(i32),
    Isbn(String),
    DeleteBook(i32),
    Authors,
    Author(i32),
    AddAuthor(String),
    RenameAuthor(i32, String),
    DeleteAuthor(i32),
    Refresh,
    Help,
    Quit,
}

/// Parse one input line. Errors are user-facing messages.
pub fn parse(line: &str) -> Result<Command, String> {
    let line = line.trim_end_matches(['\r', '\n']);
    let Some(rest) = line.strip_prefix('/') else {
        return Ok(Command::Input(line.to_string()));
    };
    let (name, args) = match rest.split_once(char::is_whitespace) {
        Some((name, args)) => (name, args.trim()),
        None => (rest, ""),
    };

    let command = match name {
        "new" => Command::New,
        "edit" => Command::Edit(parse_id(args)?),
        "close" => Command::Close,
        "save" => Command::Save(parse_form(args)?),
        "down" => Command::Key(NavKey::Down),
        "up" => Command::Key(NavKey::Up),
        "enter" => Command::Key(NavKey::Enter),
        "esc" => Command::Key(NavKey::Escape),
        "pick" => {
            let n: usize = args
                .parse()
                .map_err(|_| format!("Expected a result number, got {:?}", args))?;
            if n == 0 {
                return Err("Result numbers start at 1".to_string());
            }
            Command::Pick(n - 1)
        }
        "more" => Command::More,
        "blur" => Command::Blur,
        "focus" => Command::Focus,
        "books" => Command::Books,
        "book" => Command::Book(parse_id(args)?),
        "isbn" if !args.is_empty() => Command::Isbn(args.to_string()),
        "delete" => Command::DeleteBook(parse_id(args)?),
        "authors" => Command::Authors,
        "author" => Command::Author(parse_id(args)?),
        "add-author" if !args.is_empty() => Command::AddAuthor(args.to_string()),
        "rename-author" => {
            let (id, name) = args
                .split_once(char::is_whitespace)
                .ok_or_else(|| "Usage: /rename-author <id> <name>".to_string())?;
            Command::RenameAuthor(parse_id(id)?, name.trim().to_string())
        }
        "delete-author" => Command::DeleteAuthor(parse_id(args)?),
        "refresh" => Command::Refresh,
        "help" => Command::Help,
        "quit" | "exit" => Command::Quit,
        _ => return Err(format!("Unknown command /{} (try /help)", name)),
    };
    Ok(command)
}

fn parse_id(arg: &str) -> Result<i32, String> {
    arg.trim()
        .parse()
        .map_err(|_| format!("Expected a numeric id, got {:?}", arg))
}

/// One `key=value` pair of `/save`
#[derive(Debug, Clone, PartialEq)]
pub enum FormField {
    Title(String),
    Author(String),
    Isbn(String),
    Year(i32),
    Publisher(i32),
    Description(String),
    Thumbnail(String),
}

/// `key=value` pairs separated by `;`
fn parse_form(args: &str) -> Result<Vec<FormField>, String> {
    let mut fields = Vec::new();
    for pair in args.split(';').map(str::trim).filter(|p| !p.is_empty()) {
        let (key, value) = pair
            .split_once('=')
            .ok_or_else(|| format!("Expected key=value, got {:?}", pair))?;
        let value = value.trim().to_string();
        let field = match key.trim() {
            "title" => FormField::Title(value),
            "author" => FormField::Author(value),
            "isbn" => FormField::Isbn(value),
            "year" => FormField::Year(
                value
                    .parse()
                    .map_err(|_| format!("Year must be a number, got {:?}", value))?,
            ),
            "publisher" => FormField::Publisher(parse_id(&value)?),
            "description" => FormField::Description(value),
            "thumbnail" => FormField::Thumbnail(value),
            other => return Err(format!("Unknown field {:?}", other)),
        };
        fields.push(field);
    }
    Ok(fields)
}

/// Form values for `mode`: blank when creating, the book's current values
/// when editing, with `fields` applied on top.
pub fn fill_form(mode: &FormMode, fields: Vec<FormField>) -> BookForm {
    let mut form = match mode {
        FormMode::Create => BookForm::default(),
        FormMode::Edit(book) => BookForm::from_book(book),
    };
    for field in fields {
        match field {
            FormField::Title(title) => form.title = title,
            FormField::Author(name) => form.author_name = name,
            FormField::Isbn(isbn) => form.isbn = isbn,
            FormField::Year(year) => form.year = year,
            FormField::Publisher(id) => form.publisher_id = Some(id),
            FormField::Description(text) => form.description = Some(text),
            FormField::Thumbnail(url) => form.thumbnail = Some(url),
        }
    }
    form
}

/// Run the console until `/quit` or end of input
pub async fn run(session: &mut Session) -> AppResult<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut views: Option<WatchStream<SearchView>> = None;

    println!("Bookshelf client. Type /help for commands.");
    flush_notifications(session);
    prompt(session);

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let line = match line {
                    Ok(Some(line)) => line,
                    Ok(None) => break,
                    Err(e) => {
                        tracing::error!("Failed to read input: {}", e);
                        break;
                    }
                };
                match parse(&line) {
                    Ok(Command::Quit) => break,
                    Ok(command) => execute(session, command, &mut views).await,
                    Err(message) => println!("{}", message),
                }
                flush_notifications(session);
                prompt(session);
            }
            Some(book) = session.next_import() => {
                session.finish_import(book).await;
                views = None;
                flush_notifications(session);
                prompt(session);
            }
            Some(view) = next_view(&mut views) => {
                render_view(&view);
                flush_notifications(session);
            }
        }
    }

    session.close_form();
    Ok(())
}

async fn next_view(views: &mut Option<WatchStream<SearchView>>) -> Option<SearchView> {
    match views {
        Some(stream) => stream.next().await,
        None => std::future::pending().await,
    }
}

async fn execute(
    session: &mut Session,
    command: Command,
    views: &mut Option<WatchStream<SearchView>>,
) {
    let notifications = session.services().notifications.clone();
    let catalog = session.services().catalog.clone();

    match command {
        Command::Input(text) => match session.search() {
            Some(search) => search.input(text),
            None if text.trim().is_empty() => {}
            None => println!("No form open. Use /new to search the catalog."),
        },
        Command::New => open(session, FormMode::Create, views),
        Command::Edit(id) => match catalog.get_book(id).await {
            Ok(book) => {
                print_book(&book);
                open(session, FormMode::Edit(book), views);
            }
            Err(e) => {
                notifications.error(e.to_notice());
            }
        },
        Command::Close => {
            session.close_form();
            *views = None;
        }
        Command::Save(fields) => {
            let Some(mode) = session.form_mode() else {
                println!("No form open. Use /new or /edit <id> first.");
                return;
            };
            let values = fill_form(mode, fields);
            if let Ok(book) = session.submit(values).await {
                *views = None;
                print_book(&book);
            }
        }
        Command::Key(key) => with_search(session, |s| s.key(key)),
        Command::Pick(index) => with_search(session, |s| s.select(index)),
        Command::More => with_search(session, |s| s.load_more()),
        Command::Blur => with_search(session, |s| s.blur()),
        Command::Focus => with_search(session, |s| s.focus()),
        Command::Books => {
            let books = catalog.books().await;
            if books.is_empty() {
                println!("No books.");
            }
            for book in &books {
                println!("{}", book_line(book));
            }
        }
        Command::Book(id) => match catalog.get_book(id).await {
            Ok(book) => print_book(&book),
            Err(e) => {
                notifications.error(e.to_notice());
            }
        },
        Command::Isbn(isbn) => match catalog.get_book_by_isbn(&isbn).await {
            Ok(book) => print_book(&book),
            Err(e) => {
                notifications.error(e.to_notice());
            }
        },
        Command::DeleteBook(id) => match catalog.delete_book(id).await {
            Ok(()) => {
                notifications.success(format!("Deleted book {}", id));
            }
            Err(e) => {
                notifications.error(e.to_notice());
            }
        },
        Command::Authors => {
            let authors = catalog.authors().await;
            if authors.is_empty() {
                println!("No authors.");
            }
            for author in &authors {
                println!("{}", author_line(author));
            }
        }
        Command::Author(id) => match catalog.get_author(id).await {
            Ok(author) => println!("{}", author_line(&author)),
            Err(e) => {
                notifications.error(e.to_notice());
            }
        },
        Command::AddAuthor(name) => match catalog.create_author(&name).await {
            Ok(author) => {
                notifications.success(format!("Created author {} ({})", author.name, author.id));
            }
            Err(e) => {
                notifications.error(e.to_notice());
            }
        },
        Command::RenameAuthor(id, name) => match catalog.update_author(id, &name).await {
            Ok(author) => {
                notifications.success(format!("Renamed author {} to {}", author.id, author.name));
            }
            Err(e) => {
                notifications.error(e.to_notice());
            }
        },
        Command::DeleteAuthor(id) => match catalog.delete_author(id).await {
            Ok(()) => {
                notifications.success(format!("Deleted author {}", id));
            }
            Err(e) => {
                notifications.error(e.to_notice());
            }
        },
        Command::Refresh => {
            if session.refresh().await.is_ok() {
                notifications.info("Lists refreshed");
            }
        }
        Command::Help => println!("{}", HELP),
        Command::Quit => {}
    }
}

fn open(session: &mut Session, mode: FormMode, views: &mut Option<WatchStream<SearchView>>) {
    let editing = mode.is_edit();
    match session.open_form(mode) {
        Ok(search) => {
            *views = Some(WatchStream::from_changes(search.subscribe()));
            if editing {
                println!("Editing. Enter new values with /save; /close to cancel.");
            } else {
                println!("Type to search the catalog, or enter values with /save.");
            }
        }
        Err(e) => println!("{}", e),
    }
}

fn with_search(session: &Session, action: impl FnOnce(&SearchController)) {
    match session.search() {
        Some(search) => action(search),
        None => println!("No form open."),
    }
}

fn render_view(view: &SearchView) {
    match view.phase {
        Phase::Idle => {}
        Phase::Searching => println!("  searching {:?}...", view.input),
        Phase::Importing => println!("  importing..."),
        Phase::ResultsShown => {
            if view.results.is_empty() {
                println!("  no results");
            }
            for (i, hit) in view.results.iter().enumerate() {
                let marker = if view.cursor == Some(i) { '>' } else { ' ' };
                let isbn = hit.importable_isbn().unwrap_or("no ISBN");
                println!("{} {:>2}. {} [{}]", marker, i + 1, hit.label(), isbn);
            }
            if view.can_load_more {
                println!("  /more for more results");
            }
        }
    }
}

fn flush_notifications(session: &Session) {
    let notifications = &session.services().notifications;
    notifications.expire(chrono::Utc::now());
    for n in notifications.drain() {
        let tag = match n.level {
            Level::Info => "info",
            Level::Success => "ok",
            Level::Error => "error",
        };
        match n.status {
            Some(status) => println!("[{}] {} ({})", tag, n.message, status),
            None => println!("[{}] {}", tag, n.message),
        }
    }
}

fn prompt(session: &Session) {
    let label = match session.form_mode() {
        Some(FormMode::Create) => "new",
        Some(FormMode::Edit(_)) => "edit",
        None => "",
    };
    print!("{}> ", label);
    let _ = std::io::stdout().flush();
}

fn book_line(book: &Book) -> String {
    let mut line = format!("{:>5}  {} - {}", book.id, book.title, book.author.name);
    if let Some(year) = book.year {
        line.push_str(&format!(" ({})", year));
    }
    if let Some(isbn) = &book.isbn {
        line.push_str(&format!(" [{}]", isbn));
    }
    line
}

fn print_book(book: &Book) {
    println!("{}", book_line(book));
    if let Some(publisher) = &book.publisher {
        println!("       Publisher: {}", publisher.name);
    }
    if let Some(description) = book.description() {
        println!("       {}", description);
    }
}

fn author_line(author: &Author) -> String {
    match author.book_count() {
        Some(count) => format!("{:>5}  {} ({} books)", author.id, author.name, count),
        None => format!("{:>5}  {}", author.id, author.name),
    }
}
