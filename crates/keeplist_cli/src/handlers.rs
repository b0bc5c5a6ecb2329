//! Command handlers: open the store, drive the core, print results.

use crate::commands::{NoteCommand, TaskCommand};
use keeplist_core::db::open_db;
use keeplist_core::{
    EditCommit, Note, NoteBook, ReorderOutcome, SqliteKvStore, SystemClock, Task,
    TaskBoard, UuidIdGenerator,
};
use std::error::Error;
use std::path::Path;

pub type HandlerResult = Result<(), Box<dyn Error>>;

pub fn handle_tasks(db: &Path, command: TaskCommand) -> HandlerResult {
    let conn = open_db(db)?;
    let kv = SqliteKvStore::try_new(&conn)?;
    let mut board = TaskBoard::open(&kv, UuidIdGenerator)?;
    warn_if_recovered(board.collection().recovered_error());

    match command {
        TaskCommand::Add { text } => match board.add_task(&text.join(" "))? {
            Some(task) => println!("added {}", task.id),
            None => println!("nothing to add"),
        },
        TaskCommand::List { filter } => {
            board.set_filter(filter);
            for task in board.visible() {
                print_task(&task);
            }
            let counts = board.counts();
            println!(
                "{} active, {} completed, {} total",
                counts.active, counts.completed, counts.total
            );
        }
        TaskCommand::Toggle { id } => match board.toggle_complete(&id)? {
            Some(task) => print_task(&task),
            None => println!("no task {id}"),
        },
        TaskCommand::Edit { id, text } => {
            board.begin_edit(&id)?;
            match board.commit_edit(&text.join(" "))? {
                EditCommit::Updated(task) => print_task(&task),
                EditCommit::Removed(id) => println!("deleted {id}"),
                EditCommit::Discarded(id) => println!("no task {id}"),
            }
        }
        TaskCommand::Delete { id } => {
            if board.delete_task(&id)? {
                println!("deleted {id}");
            } else {
                println!("no task {id}");
            }
        }
        TaskCommand::Move { id, before } => match board.reorder(&id, &before)? {
            ReorderOutcome::Moved => println!("moved {id} before {before}"),
            ReorderOutcome::NoOp => println!("nothing moved"),
        },
    }
    Ok(())
}

pub fn handle_notes(db: &Path, command: NoteCommand) -> HandlerResult {
    let conn = open_db(db)?;
    let kv = SqliteKvStore::try_new(&conn)?;
    let mut book = NoteBook::open(&kv, UuidIdGenerator, SystemClock)?;
    warn_if_recovered(book.collection().recovered_error());

    match command {
        NoteCommand::List => {
            for note in book.notes() {
                println!("{}  {}", note.id, note.display_title());
            }
        }
        NoteCommand::Show { id } => {
            let note = match id {
                Some(id) => book.select(&id).cloned(),
                None => book.selected().cloned(),
            };
            match note {
                Some(note) => print_note(&note),
                None => println!("no note"),
            }
        }
        NoteCommand::Save { id, title, content } => {
            match id {
                Some(id) => {
                    if book.select(&id).is_none() {
                        return Err(format!("no note {id}").into());
                    }
                }
                None => book.new_note(),
            }
            match book.save(&title, &content)? {
                Some(note) => println!("saved {}", note.id),
                None => println!("nothing to save"),
            }
        }
        NoteCommand::Delete { id } => {
            if book.delete(&id)? {
                println!("deleted {id}");
            } else {
                println!("no note {id}");
            }
        }
    }
    Ok(())
}

fn warn_if_recovered(error: Option<&impl Error>) {
    if let Some(err) = error {
        eprintln!("warning: stored data was unreadable and has been ignored ({err})");
    }
}

fn print_task(task: &Task) {
    let mark = if task.completed { "x" } else { " " };
    println!("[{mark}] {}  {}", task.id, task.text);
}

fn print_note(note: &Note) {
    println!("{}", note.display_title());
    if !note.content.is_empty() {
        println!();
        println!("{}", note.content);
    }
}
