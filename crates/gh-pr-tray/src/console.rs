//! Console front-end
//!
//! Stand-in for a system tray: the entry set is printed as a numbered list
//! and clicks are typed on stdin.

use crate::menu::MenuSurface;
use crate::orchestrator::{RefreshHandle, RefreshReason};
use crate::selector::EntrySource;
use std::io::{self, BufRead, Write};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread;
use tokio_util::sync::CancellationToken;

enum ConsoleItem {
    Label(String),
    Entry(String, EntrySource),
    Separator,
}

/// Menu surface printing to stdout
#[derive(Default)]
pub struct ConsoleMenu {
    items: Mutex<Vec<ConsoleItem>>,
}

impl ConsoleMenu {
    pub fn new() -> Self {
        Self::default()
    }

    fn items(&self) -> MutexGuard<'_, Vec<ConsoleItem>> {
        self.items.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// The current entry set, entries numbered from 1
    pub fn render(&self) -> String {
        let mut out = String::new();
        let mut number = 0;
        for item in self.items().iter() {
            match item {
                ConsoleItem::Label(text) => out.push_str(&format!("      {}\n", text)),
                ConsoleItem::Entry(text, _) => {
                    number += 1;
                    out.push_str(&format!("  {:>2}) {}\n", number, text));
                }
                ConsoleItem::Separator => out.push_str("  ----\n"),
            }
        }
        out
    }

    /// Click entry `number` (1-based); false if there is no such entry
    pub fn click(&self, number: usize) -> bool {
        let items = self.items();
        let source = items
            .iter()
            .filter_map(|item| match item {
                ConsoleItem::Entry(_, source) => Some(source),
                _ => None,
            })
            .nth(number.wrapping_sub(1));
        source.is_some_and(EntrySource::fire)
    }

    /// Click the last entry, which is always Quit
    pub fn click_last(&self) -> bool {
        let items = self.items();
        let source = items.iter().rev().find_map(|item| match item {
            ConsoleItem::Entry(_, source) => Some(source),
            _ => None,
        });
        source.is_some_and(EntrySource::fire)
    }
}

impl MenuSurface for ConsoleMenu {
    fn reset(&self) {
        self.items().clear();
    }

    fn add_label(&self, text: &str) {
        self.items().push(ConsoleItem::Label(text.to_string()));
    }

    fn add_entry(&self, text: &str, source: EntrySource) {
        self.items()
            .push(ConsoleItem::Entry(text.to_string(), source));
    }

    fn add_separator(&self) {
        self.items().push(ConsoleItem::Separator);
    }

    fn flush(&self) {
        let mut stdout = io::stdout().lock();
        let _ = writeln!(stdout, "\n{}  [number] select, r refresh, q quit", self.render());
        let _ = stdout.flush();
    }
}

/// Typed console command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Select(usize),
    Refresh,
    Quit,
}

fn parse_command(line: &str) -> Option<Command> {
    match line.trim() {
        "r" | "refresh" => Some(Command::Refresh),
        "q" | "quit" => Some(Command::Quit),
        other => other.parse().ok().map(Command::Select),
    }
}

/// Read commands from stdin on a dedicated thread
///
/// The thread ends with stdin or once `shutdown` fires.
pub fn spawn_input_reader(
    menu: Arc<ConsoleMenu>,
    refresh: RefreshHandle,
    shutdown: CancellationToken,
) -> io::Result<thread::JoinHandle<()>> {
    thread::Builder::new()
        .name("console-input".to_string())
        .spawn(move || {
            for line in io::stdin().lock().lines() {
                let Ok(line) = line else { break };
                if shutdown.is_cancelled() {
                    break;
                }
                match parse_command(&line) {
                    Some(Command::Select(number)) => {
                        if !menu.click(number) {
                            eprintln!("No entry {}", number);
                        }
                    }
                    Some(Command::Refresh) => {
                        refresh.refresh(RefreshReason::Manual);
                    }
                    Some(Command::Quit) => {
                        if !menu.click_last() {
                            shutdown.cancel();
                        }
                    }
                    None => log::debug!("Ignoring console input '{}'", line),
                }
            }
        })
}
