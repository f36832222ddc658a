//! Interactive stdin host for the page annotator.
//!
//! # Responsibility
//! - Load a page snapshot, attach the annotator and pump its watcher.
//! - Provide the stdin text-input surface for note editing.
//!
//! Commands: `cards`, `notes`, `edit <name>`, `add <name>`, `goto <url>`,
//! `scan`, `save <path>`, `quit`.

use notepin_core::editor::TextInputProvider;
use notepin_core::page::{Element, PageDocument};
use notepin_core::render::ENTITY_NAME_ATTR;
use notepin_core::scan::ScanSummary;
use notepin_core::store::FileStorage;
use notepin_core::watch::WatcherConfig;
use notepin_core::{Annotator, MarkerLocator};
use std::error::Error;
use std::io::{BufRead, Write};
use std::time::{Duration, Instant};

const DEFAULT_DATA_DIR: &str = ".notepin";

/// Built-in demo snapshot used when no page file is given.
const SAMPLE_PAGE: &str = r#"{
  "location": "https://host.example/room/demo",
  "body": {
    "tag": "body",
    "children": [
      {
        "tag": "a",
        "attrs": {"data-testid": "playerCard", "href": "/players/Alice"},
        "children": [
          {
            "tag": "div",
            "attrs": {"class": "styles__Container-sc-5688573a-0"},
            "children": [
              {"tag": "span", "attrs": {"class": "styles__Nickname-sc-3441c003-2"}, "text": "Alice"}
            ]
          }
        ]
      },
      {
        "tag": "a",
        "attrs": {"data-testid": "playerCard", "href": "/players/Bob"},
        "children": [
          {
            "tag": "div",
            "attrs": {"class": "styles__Container-sc-5688573a-0"},
            "children": [
              {"tag": "span", "attrs": {"class": "styles__Nickname-sc-3441c003-2"}, "text": "Bob"}
            ]
          }
        ]
      }
    ]
  }
}"#;

/// Blocking stdin prompt. A lone `.` cancels; anything else (including an
/// empty line) is a submission.
struct StdinPrompt;

impl TextInputProvider for StdinPrompt {
    fn prompt(&mut self, message: &str, initial: &str) -> Option<String> {
        if initial.is_empty() {
            println!("{message}");
        } else {
            println!("{message} [current: {initial}]");
        }
        print!("note (empty line deletes, `.` cancels)> ");
        let _ = std::io::stdout().flush();

        let mut line = String::new();
        if std::io::stdin().lock().read_line(&mut line).ok()? == 0 {
            return None;
        }
        let line = line.trim_end_matches(['\n', '\r']).to_string();
        if line == "." {
            return None;
        }
        Some(line)
    }
}

fn main() {
    if let Err(err) = run() {
        eprintln!("notepin: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let mut page_path = None;
    let mut data_dir = DEFAULT_DATA_DIR.to_string();
    let mut log_dir = None;

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--data" => data_dir = args.next().ok_or("--data needs a directory")?,
            "--log" => log_dir = Some(args.next().ok_or("--log needs a directory")?),
            "--help" | "-h" => {
                print_usage();
                return Ok(());
            }
            other => page_path = Some(other.to_string()),
        }
    }

    if let Some(dir) = log_dir {
        if let Err(err) = notepin_core::init_logging(notepin_core::default_log_level(), &dir) {
            eprintln!("notepin: logging disabled: {err}");
        }
    }

    let snapshot = match &page_path {
        Some(path) => std::fs::read_to_string(path)?,
        None => SAMPLE_PAGE.to_string(),
    };
    let mut doc = PageDocument::from_json(&snapshot)?;

    let mut annotator = Annotator::attach(
        FileStorage::new(&data_dir),
        MarkerLocator::default(),
        StdinPrompt,
        WatcherConfig::default(),
        &mut doc,
        Instant::now(),
    );

    println!(
        "notepin {} on page {} (notes in {data_dir})",
        notepin_core::core_version(),
        doc.location
    );
    settle(&mut annotator, &mut doc, Duration::ZERO);
    print_cards(&annotator, &doc);

    let stdin = std::io::stdin();
    loop {
        print!("> ");
        let _ = std::io::stdout().flush();
        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let mut words = line.split_whitespace();
        match words.next() {
            Some("cards") => print_cards(&annotator, &doc),
            Some("notes") => print_notes(&annotator),
            Some("edit") => {
                let name = words.collect::<Vec<_>>().join(" ");
                if name.is_empty() {
                    println!("usage: edit <entity name>");
                    continue;
                }
                match annotator.edit_entity(&name, Instant::now()) {
                    Ok(outcome) => println!("{outcome:?}"),
                    Err(err) => eprintln!("edit failed: {err}"),
                }
                settle(&mut annotator, &mut doc, Duration::from_millis(300));
            }
            Some("add") => {
                let name = words.collect::<Vec<_>>().join(" ");
                if name.is_empty() {
                    println!("usage: add <entity name>");
                    continue;
                }
                let card = sample_card(&name);
                annotator.record_mutation(&card, Instant::now());
                doc.body.push_child(card);
                println!("card inserted; waiting for the debounced rescan...");
                settle(&mut annotator, &mut doc, Duration::from_millis(2500));
                print_cards(&annotator, &doc);
            }
            Some("goto") => {
                let url = words.collect::<Vec<_>>().join(" ");
                if url.is_empty() {
                    println!("usage: goto <url>");
                    continue;
                }
                doc.location = url;
                println!("location changed; waiting for the navigation rescan...");
                settle(&mut annotator, &mut doc, Duration::from_millis(4000));
            }
            Some("scan") => {
                let summary = annotator.scan_now(&mut doc);
                print_summary(&summary);
            }
            Some("save") => match words.next() {
                Some(path) => {
                    std::fs::write(path, doc.to_json()?)?;
                    println!("snapshot written to {path}");
                }
                None => println!("usage: save <path>"),
            },
            Some("quit") | Some("exit") => break,
            Some("help") => print_usage(),
            Some(other) => println!("unknown command `{other}`; try `help`"),
            None => {}
        }
    }

    Ok(())
}

/// Pumps the watcher for `window`, running any scans that come due.
fn settle<S, L, P>(
    annotator: &mut Annotator<S, L, P>,
    doc: &mut PageDocument,
    window: Duration,
) where
    S: notepin_core::StorageBackend,
    L: notepin_core::EntityLocator,
    P: TextInputProvider,
{
    let deadline = Instant::now() + window;
    loop {
        if let Some((reason, summary)) = annotator.pump(doc, Instant::now()) {
            print!("[{reason:?}] ");
            print_summary(&summary);
        }
        if Instant::now() >= deadline {
            break;
        }
        std::thread::sleep(Duration::from_millis(25));
    }
}

fn sample_card(name: &str) -> Element {
    let mut nick = Element::new("span");
    nick.add_class("styles__Nickname-sc-3441c003-2");
    nick.text = name.to_string();
    let mut container = Element::new("div");
    container.add_class("styles__Container-sc-5688573a-0");
    container.push_child(nick);
    let mut card = Element::new("a");
    card.set_attr("data-testid", "playerCard");
    card.push_child(container);
    card
}

fn print_summary(summary: &ScanSummary) {
    println!(
        "cards={} affordances={} skipped={}",
        summary.cards_seen,
        summary.affordances_added,
        summary.skipped()
    );
}

fn print_cards<S, L, P>(annotator: &Annotator<S, L, P>, doc: &PageDocument)
where
    S: notepin_core::StorageBackend,
    L: notepin_core::EntityLocator,
    P: TextInputProvider,
{
    let buttons = doc
        .body
        .find_paths(&|el| el.attr(ENTITY_NAME_ATTR).is_some());
    if buttons.is_empty() {
        println!("no annotated cards on this page");
        return;
    }
    for path in buttons {
        let Some(button) = doc.body.node_at(&path) else {
            continue;
        };
        let name = button.attr(ENTITY_NAME_ATTR).unwrap_or("?");
        let note = annotator.store().get_note(name);
        if note.is_empty() {
            println!("  {name} (no note)");
        } else {
            println!("  {name}: {note}");
        }
    }
}

fn print_notes<S, L, P>(annotator: &Annotator<S, L, P>)
where
    S: notepin_core::StorageBackend,
    L: notepin_core::EntityLocator,
    P: TextInputProvider,
{
    let notes = annotator.store().load();
    if notes.is_empty() {
        println!("no notes saved yet");
        return;
    }
    for (name, text) in notes {
        println!("  {name}: {text}");
    }
}

fn print_usage() {
    println!("usage: notepin [page.json] [--data <dir>] [--log <absolute dir>]");
    println!("  cards        list annotated cards on the page");
    println!("  notes        list all saved notes");
    println!("  edit <name>  edit the note for one entity");
    println!("  add <name>   insert a demo card and watch the debounce");
    println!("  goto <url>   simulate an SPA navigation");
    println!("  scan         force one scan pass");
    println!("  save <path>  write the current page snapshot");
    println!("  quit         exit");
}
