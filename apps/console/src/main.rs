use std::io::{self, BufRead, Write};
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use client_core::{DeletePrompt, DirectoryEvent, HttpUserStore, UserDirectory};
use shared::domain::{UserId, UserRecord};
use tokio::sync::broadcast;
use tracing::debug;

#[derive(Parser, Debug)]
#[command(about = "Console front-end for the user directory")]
struct Args {
    /// Base URL of the record store service, e.g. http://localhost:3000
    #[arg(long)]
    server_url: String,
}

struct StdinPrompt;

impl DeletePrompt for StdinPrompt {
    fn confirm(&self, record: &UserRecord) -> bool {
        print!(
            "Are you sure you want to delete {} <{}>? [y/N] ",
            record.name, record.email
        );
        let _ = io::stdout().flush();
        let mut answer = String::new();
        if io::stdin().read_line(&mut answer).is_err() {
            return false;
        }
        matches!(answer.trim(), "y" | "Y" | "yes")
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().init();
    let args = Args::parse();
    debug!("console: using record store at {}", args.server_url);

    let store = Arc::new(HttpUserStore::new(args.server_url));
    let mut directory = UserDirectory::new(store, Arc::new(StdinPrompt));
    let mut events = directory.subscribe_events();

    if let Err(err) = directory.load_users().await {
        println!("error: {err}");
    }
    drain_events(&mut events);
    render_list(directory.users());
    print_help();

    let stdin = io::stdin();
    loop {
        print!("> ");
        let _ = io::stdout().flush();
        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim();
        let (command, rest) = match line.split_once(char::is_whitespace) {
            Some((command, rest)) => (command, rest.trim()),
            None => (line, ""),
        };

        match command {
            "" => {}
            "list" => render_list(directory.users()),
            "name" => directory.set_name(rest),
            "email" => directory.set_email(rest),
            "submit" => {
                // The form feeds create or update depending on edit mode,
                // mirroring the single submit button of a list-view form.
                let outcome = if directory.edit_target().is_some() {
                    directory.update_user().await
                } else {
                    directory.create_user().await
                };
                if let Err(err) = outcome {
                    println!("error: {err}");
                }
            }
            "edit" => match parse_id(rest) {
                Some(id) => match directory.begin_edit(id) {
                    Ok(()) => println!("editing record {}; adjust name/email, then submit", id.0),
                    Err(err) => println!("error: {err}"),
                },
                None => println!("usage: edit <id>"),
            },
            "delete" => match parse_id(rest) {
                Some(id) => {
                    if let Err(err) = directory.delete_user(id).await {
                        println!("error: {err}");
                    }
                }
                None => println!("usage: delete <id>"),
            },
            "help" => print_help(),
            "quit" | "exit" => break,
            other => println!("unknown command: {other}"),
        }

        drain_events(&mut events);
    }

    Ok(())
}

fn parse_id(input: &str) -> Option<UserId> {
    input.parse().ok().map(UserId)
}

fn drain_events(events: &mut broadcast::Receiver<DirectoryEvent>) {
    while let Ok(event) = events.try_recv() {
        match event {
            DirectoryEvent::ListLoaded { count } => println!("loaded {count} records"),
            DirectoryEvent::RecordCreated(record) => {
                println!("created record {} ({})", record.id.0, record.name);
            }
            DirectoryEvent::RecordUpdated(record) => {
                println!("updated record {} ({})", record.id.0, record.name);
            }
            DirectoryEvent::RecordDeleted(id) => println!("deleted record {}", id.0),
            // Failure events mirror the Result the command loop already
            // printed, so only successes render here.
            DirectoryEvent::ValidationRejected(_)
            | DirectoryEvent::LoadFailed(_)
            | DirectoryEvent::CreationFailed(_)
            | DirectoryEvent::UpdateFailed(_)
            | DirectoryEvent::DeletionFailed(_) => {}
        }
    }
}

fn render_list(records: &[UserRecord]) {
    if records.is_empty() {
        println!("(no records)");
        return;
    }
    for record in records {
        println!("{:>4}  {}  <{}>", record.id.0, record.name, record.email);
    }
}

fn print_help() {
    println!("commands:");
    println!("  list            show the loaded records");
    println!("  name <value>    set the form name field");
    println!("  email <value>   set the form email field");
    println!("  submit          create a record, or update the one being edited");
    println!("  edit <id>       load a record into the form for editing");
    println!("  delete <id>     delete a record (asks for confirmation)");
    println!("  quit            exit");
}
