//! libris CLI - terminal client for a hosted library-catalog backend.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use libris::api::CatalogApi;
use libris::config::Config;
use libris::console::{Console, Style};
use libris::detail::{AddOutcome, BookDetail};
use libris::lists::{DeleteOutcome, ListManager, SubmitOutcome};
use libris::models::{Book, NewReview, ReadingList, RecommendationRequest, Review};
use libris::session::Session;
use libris::HttpCatalogApi;

/// Terminal client for a hosted library-catalog backend.
#[derive(Parser, Debug)]
#[command(name = "libris")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to an alternate config file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List the catalog.
    Books,

    /// Show a book, its reviews, and optionally add it to a reading list.
    Book {
        /// Book identifier.
        id: String,
    },

    /// Manage reading lists interactively.
    Lists,

    /// Fetch recommendations.
    Recommend {
        /// Genre to recommend from (repeatable).
        #[arg(long = "genre")]
        genres: Vec<String>,

        /// Favourite book id to seed recommendations (repeatable).
        #[arg(long = "favorite")]
        favorites: Vec<String>,
    },

    /// Post a review for a book.
    Review {
        /// Book identifier.
        book_id: String,

        /// Rating from 1 to 5.
        #[arg(long, value_parser = clap::value_parser!(u8).range(1..=5))]
        rating: u8,

        /// Review text.
        #[arg(long)]
        comment: String,
    },

    /// Show the identity asserted by the configured session token.
    Whoami,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let args = Cli::parse();
    let console = Console::new();

    let config = match &args.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
    .context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;

    let session = Session::load(&config.session);
    let api = HttpCatalogApi::new(
        &config.backend.base_url,
        session.token().map(str::to_string),
    );

    match args.command {
        Commands::Books => run_books(&api, &console).await,
        Commands::Book { id } => run_detail(&api, &console, &id).await,
        Commands::Lists => run_lists(&api, &console).await,
        Commands::Recommend { genres, favorites } => {
            run_recommend(&api, &console, genres, favorites).await
        }
        Commands::Review {
            book_id,
            rating,
            comment,
        } => run_review(&api, &console, book_id, rating, comment).await,
        Commands::Whoami => {
            run_whoami(&console, &session);
            Ok(())
        }
    }
}

async fn run_books(api: &dyn CatalogApi, console: &Console) -> Result<()> {
    console.step("Fetching catalog...");
    match api.list_books().await {
        Ok(books) => {
            console.success(&format!("Found {} books", books.len()));
            for book in &books {
                render_book_line(console, book);
            }
        }
        Err(e) => console.error(&e.to_string()),
    }
    Ok(())
}

async fn run_detail(api: &dyn CatalogApi, console: &Console, id: &str) -> Result<()> {
    console.step("Loading book...");
    let mut detail = match BookDetail::open(api, id).await {
        Ok(Some(detail)) => detail,
        Ok(None) => {
            console.warning("Book not found");
            return Ok(());
        }
        Err(e) => {
            console.error(&e.to_string());
            return Ok(());
        }
    };

    render_book(console, detail.book());
    render_reviews(console, detail.reviews());

    if !console.confirm("Add this book to a reading list?")? {
        return Ok(());
    }

    if let Err(e) = detail.begin_add().await {
        console.error(&e.to_string());
        return Ok(());
    }
    if detail.lists().is_empty() {
        console.warning("You have no reading lists yet");
        return Ok(());
    }

    console.section("Add to reading list");
    for (index, list) in detail.lists().iter().enumerate() {
        let marker = if Some(list.id.as_str()) == detail.selected() {
            "*"
        } else {
            " "
        };
        println!(" {marker} {}. {}", index + 1, list.name);
    }

    let choice = console.input("List number (blank keeps the marked one)")?;
    if !choice.trim().is_empty() {
        match choice.trim().parse::<usize>() {
            Ok(n) if n >= 1 && n <= detail.lists().len() => {
                let list_id = detail.lists()[n - 1].id.clone();
                detail.select(&list_id);
            }
            _ => {
                console.warning("No such list");
                return Ok(());
            }
        }
    }

    match detail.confirm_add().await {
        Ok(AddOutcome::Added) => console.success("Added to reading list"),
        Ok(AddOutcome::NoSelection) => console.warning("Please select a reading list first"),
        Ok(AddOutcome::ListMissing) => console.warning("That reading list no longer exists"),
        Ok(AddOutcome::Duplicate) => console.warning("This book is already in that reading list"),
        Err(e) => console.error(&e.to_string()),
    }
    Ok(())
}

async fn run_lists(api: &dyn CatalogApi, console: &Console) -> Result<()> {
    let mut manager = ListManager::new(api);

    console.step("Loading reading lists...");
    if let Err(e) = manager.reload().await {
        console.error(&e.to_string());
        return Ok(());
    }

    loop {
        render_lists(console, manager.lists());

        let command = console.input("Command (new, edit <n>, quit)")?;
        let command = command.trim();
        if command == "quit" || command == "q" {
            break;
        }
        if command.is_empty() {
            continue;
        }

        if command == "new" {
            manager.open_create();
            run_create_modal(&mut manager, console).await?;
        } else if let Some(rest) = command.strip_prefix("edit") {
            let Ok(index) = rest.trim().parse::<usize>() else {
                console.warning("Usage: edit <number>");
                continue;
            };
            let Some(list) = index.checked_sub(1).and_then(|i| manager.lists().get(i)) else {
                console.warning("No such list");
                continue;
            };
            let id = list.id.clone();
            manager.open_edit(&id);
            run_edit_modal(&mut manager, console).await?;
        } else {
            console.warning("Unknown command");
        }
    }
    Ok(())
}

/// Drives the create modal: prompt the fields, submit, repeat on rejection.
async fn run_create_modal(manager: &mut ListManager<'_>, console: &Console) -> Result<()> {
    console.section("Create reading list");
    loop {
        fill_draft(manager, console)?;
        match manager.submit().await {
            Ok(SubmitOutcome::Saved) => {
                console.success("Reading list created");
                return Ok(());
            }
            Ok(SubmitOutcome::EmptyName) => {
                console.warning("Please enter a name for the reading list");
            }
            Ok(SubmitOutcome::NoModal) => return Ok(()),
            Err(e) => console.error(&e.to_string()),
        }
        // The modal is still open; let the user retry or back out.
        if !console.confirm("Try again?")? {
            manager.cancel();
            return Ok(());
        }
    }
}

/// Drives the edit modal: save, delete (after confirmation), or cancel.
async fn run_edit_modal(manager: &mut ListManager<'_>, console: &Console) -> Result<()> {
    console.section("Edit reading list");
    loop {
        let action = console.input("Action (save, delete, cancel)")?;
        match action.trim() {
            "save" | "s" => {
                fill_draft(manager, console)?;
                match manager.submit().await {
                    Ok(SubmitOutcome::Saved) => {
                        console.success("Reading list updated");
                        return Ok(());
                    }
                    Ok(SubmitOutcome::EmptyName) => {
                        console.warning("Please enter a name for the reading list");
                    }
                    Ok(SubmitOutcome::NoModal) => return Ok(()),
                    Err(e) => console.error(&e.to_string()),
                }
            }
            "delete" | "d" => {
                if !console.confirm("Delete this reading list?")? {
                    continue;
                }
                match manager.delete_open().await {
                    Ok(DeleteOutcome::Deleted) => {
                        console.success("Reading list deleted");
                        return Ok(());
                    }
                    Ok(DeleteOutcome::NoModal) => return Ok(()),
                    Err(e) => console.error(&e.to_string()),
                }
            }
            "cancel" | "c" | "" => {
                manager.cancel();
                return Ok(());
            }
            _ => console.warning("Unknown action"),
        }
    }
}

/// Prompts for the modal's fields. Blank input keeps the pre-filled value,
/// so a fresh create with no name entered still trips validation.
fn fill_draft(manager: &mut ListManager<'_>, console: &Console) -> Result<()> {
    let current = manager.draft().cloned().unwrap_or_default();

    let name = console.input(&format!("Name [{}]", current.name))?;
    let description = console.input(&format!("Description [{}]", current.description))?;

    if let Some(draft) = manager.draft_mut() {
        if !name.trim().is_empty() {
            draft.name = name;
        }
        if !description.trim().is_empty() {
            draft.description = description;
        }
    }
    Ok(())
}

async fn run_recommend(
    api: &dyn CatalogApi,
    console: &Console,
    genres: Vec<String>,
    favorites: Vec<String>,
) -> Result<()> {
    let request = RecommendationRequest {
        genres,
        favorite_book_ids: favorites,
    };

    console.step("Fetching recommendations...");
    match api.recommend(&request).await {
        Ok(books) if books.is_empty() => console.info("No recommendations"),
        Ok(books) => {
            console.success(&format!("{} recommendations", books.len()));
            for book in &books {
                render_book_line(console, book);
            }
        }
        Err(e) => console.error(&e.to_string()),
    }
    Ok(())
}

async fn run_review(
    api: &dyn CatalogApi,
    console: &Console,
    book_id: String,
    rating: u8,
    comment: String,
) -> Result<()> {
    if comment.trim().is_empty() {
        console.warning("Please enter a comment");
        return Ok(());
    }

    let review = NewReview {
        book_id,
        rating,
        comment,
    };
    match api.create_review(&review).await {
        Ok(posted) => console.success(&format!("Review posted ({}/5)", posted.rating)),
        Err(e) => console.error(&e.to_string()),
    }
    Ok(())
}

fn run_whoami(console: &Console, session: &Session) {
    match session.user() {
        Some(user) => {
            console.info(&format!("{} <{}>", user.name, user.email));
            console.info(&format!("Role: {}", user.role));
        }
        None if session.token().is_some() => {
            console.warning("Session token present but its payload could not be decoded");
        }
        None => console.info("Anonymous (no session token configured)"),
    }
}

fn render_book_line(console: &Console, book: &Book) {
    println!(
        "  {} — {} ({}, {})",
        console.style(&book.title, &[Style::Bold]),
        book.author,
        book.genre,
        book.published_year
    );
}

fn render_book(console: &Console, book: &Book) {
    console.section(&book.title);
    console.info(&format!("Author: {}", book.author));
    console.info(&format!("Genre: {}", book.genre));
    console.info(&format!("Published: {}", book.published_year));
    console.info(&format!("ISBN: {}", book.isbn));
    console.info(&format!("Rating: {:.1}/5", book.rating));
    if !book.description.is_empty() {
        println!();
        println!("{}", book.description);
    }
}

fn render_reviews(console: &Console, reviews: &[Review]) {
    console.section("Reviews");
    if reviews.is_empty() {
        console.info("No reviews yet");
        return;
    }
    for review in reviews {
        println!(
            "  {} {}",
            console.style(&format!("{}/5", review.rating), &[Style::Yellow, Style::Bold]),
            review.comment
        );
    }
}

fn render_lists(console: &Console, lists: &[ReadingList]) {
    console.section("Your reading lists");
    if lists.is_empty() {
        console.info("No reading lists yet");
        return;
    }
    for (index, list) in lists.iter().enumerate() {
        let count = list.book_ids.len();
        let noun = if count == 1 { "book" } else { "books" };
        println!(
            "{:>3}. {} ({count} {noun})",
            index + 1,
            console.style(&list.name, &[Style::Bold])
        );
        if let Some(description) = &list.description {
            println!("     {description}");
        }
    }
}
