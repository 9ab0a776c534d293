use anyhow::Result;
use chrono::NaiveDate;
use tokio::io::{self, AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{info, warn};

use crate::features::action_items::{
    ActionItem, ActionItemCandidate, ActionItemId, ActionItemStore, ActionItemUpdate,
};
use crate::features::extraction::{ActionItemExtractor, GeminiExtractor, GeminiExtractorConfig};
use crate::shared::Config;

const HELP: &str = "\
Commands:
  add <title> | <owner> | <YYYY-MM-DD>   add an action item
  edit <id> | title=.. | owner=.. | due=..  edit a pending item
  toggle <id>                            mark done / reopen
  list                                   show items, earliest due first
  stats                                  show totals
  extract                                paste notes, end with an empty line
  help                                   show this help
  quit                                   exit";

/// A parsed shell command
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Add(ActionItemCandidate),
    Edit(ActionItemId, ActionItemUpdate),
    Toggle(ActionItemId),
    List,
    Stats,
    Extract,
    Help,
    Quit,
}

impl Command {
    /// Parse one input line; `Err` carries a usage message
    pub fn parse(line: &str) -> Result<Option<Command>, String> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }

        let (verb, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let rest = rest.trim();

        let command = match verb.to_ascii_lowercase().as_str() {
            "add" => {
                let fields: Vec<&str> = rest.split('|').map(str::trim).collect();
                match fields.as_slice() {
                    [title, owner, due_date] => {
                        Command::Add(ActionItemCandidate::new(*title, *owner, *due_date))
                    }
                    _ => return Err("usage: add <title> | <owner> | <YYYY-MM-DD>".to_string()),
                }
            }
            "edit" => {
                let mut fields = rest.split('|').map(str::trim);
                let id = fields
                    .next()
                    .and_then(parse_id)
                    .ok_or_else(|| "usage: edit <id> | title=.. | owner=.. | due=..".to_string())?;
                let mut update = ActionItemUpdate::default();
                for field in fields {
                    let (key, value) = field
                        .split_once('=')
                        .ok_or_else(|| format!("expected key=value, got '{field}'"))?;
                    update = match key.trim() {
                        "title" => update.with_title(value.trim()),
                        "owner" => update.with_owner(value.trim()),
                        "due" => update.with_due_date(value.trim()),
                        other => return Err(format!("unknown field '{other}'")),
                    };
                }
                if update.is_empty() {
                    return Err("nothing to edit".to_string());
                }
                Command::Edit(id, update)
            }
            "toggle" => Command::Toggle(
                parse_id(rest).ok_or_else(|| "usage: toggle <id>".to_string())?,
            ),
            "list" | "ls" => Command::List,
            "stats" => Command::Stats,
            "extract" => Command::Extract,
            "help" | "?" => Command::Help,
            "quit" | "exit" | "q" => Command::Quit,
            other => return Err(format!("unknown command '{other}', try 'help'")),
        };

        Ok(Some(command))
    }
}

/// Accepts `3` or `#3`
fn parse_id(raw: &str) -> Option<ActionItemId> {
    raw.trim()
        .trim_start_matches('#')
        .parse::<u64>()
        .ok()
        .map(ActionItemId)
}

/// One list line: id, status box, title, owner, due date and badges
pub fn format_item(item: &ActionItem, today: NaiveDate) -> String {
    let check = if item.is_read_only() { "[x]" } else { "[ ]" };
    let mut line = format!(
        "{:>4} {check} {}  @{}  due {}",
        item.id.to_string(),
        item.title,
        item.owner,
        item.due_date
    );
    if item.is_overdue_on(today) {
        line.push_str("  OVERDUE");
    }
    if item.is_read_only() {
        line.push_str("  (read-only)");
    }
    line
}

/// Main application state
pub struct App {
    /// Flag to indicate if the app should quit
    pub should_quit: bool,
    /// Action item store
    pub store: ActionItemStore,
    /// Extractor, absent when no API key is configured
    extractor: Option<Box<dyn ActionItemExtractor>>,
}

impl App {
    /// Create a new App instance
    pub fn new(config: Config) -> Result<Self> {
        let extractor: Option<Box<dyn ActionItemExtractor>> =
            match GeminiExtractorConfig::from_config(&config) {
                Some(extractor_config) => Some(Box::new(GeminiExtractor::new(extractor_config)?)),
                None => {
                    warn!("no Gemini API key set, 'extract' is disabled");
                    None
                }
            };

        Ok(Self::with_extractor(extractor))
    }

    pub fn with_extractor(extractor: Option<Box<dyn ActionItemExtractor>>) -> Self {
        Self {
            should_quit: false,
            store: ActionItemStore::new(),
            extractor,
        }
    }

    /// Run the read-eval-print loop until quit or end of input
    pub async fn run(&mut self) -> Result<()> {
        let mut lines = BufReader::new(io::stdin()).lines();
        let mut stdout = io::stdout();

        stdout.write_all(b"Action tracker. Type 'help' for commands.\n").await?;

        while !self.should_quit {
            stdout.write_all(b"> ").await?;
            stdout.flush().await?;

            let Some(line) = lines.next_line().await? else {
                break;
            };

            let output = match Command::parse(&line) {
                Ok(Some(Command::Extract)) => {
                    let notes = read_notes(&mut lines).await?;
                    self.extract(&notes).await
                }
                Ok(Some(command)) => self.execute(command, today()),
                Ok(None) => continue,
                Err(usage) => usage,
            };

            stdout.write_all(output.as_bytes()).await?;
            stdout.write_all(b"\n").await?;
        }

        info!(items = self.store.len(), "session ended");
        Ok(())
    }

    /// Apply a synchronous command and describe the outcome
    pub fn execute(&mut self, command: Command, today: NaiveDate) -> String {
        match command {
            Command::Add(candidate) => {
                if self.store.add(candidate) {
                    "Added".to_string()
                } else {
                    "Rejected: duplicate or invalid item".to_string()
                }
            }
            Command::Edit(id, update) => {
                if !self.store.contains(id) {
                    return format!("No item {id}");
                }
                if self.store.get(id).is_some_and(ActionItem::is_read_only) {
                    return format!("Item {id} is read-only");
                }

                let supplied = update.supplied_fields().len();
                let invalid = update.invalid_fields();
                self.store.update(id, update);

                if invalid.is_empty() {
                    format!("Updated {id}")
                } else if invalid.len() == supplied {
                    format!("Nothing updated for {id} (invalid: {})", invalid.join(", "))
                } else {
                    format!("Updated {id} (ignored invalid: {})", invalid.join(", "))
                }
            }
            Command::Toggle(id) => {
                if !self.store.contains(id) {
                    return format!("No item {id}");
                }
                self.store.toggle_status(id);
                match self.store.get(id) {
                    Some(item) => format!("{id} is now {}", item.status),
                    None => format!("No item {id}"),
                }
            }
            Command::List => {
                if self.store.is_empty() {
                    "No action items yet".to_string()
                } else {
                    self.store
                        .list()
                        .iter()
                        .map(|item| format_item(item, today))
                        .collect::<Vec<_>>()
                        .join("\n")
                }
            }
            Command::Stats => {
                let stats = self.store.stats(today);
                format!(
                    "{} total, {} pending, {} done, {} overdue ({:.0}% complete)",
                    stats.total,
                    stats.pending,
                    stats.done,
                    stats.overdue,
                    stats.completion_percentage
                )
            }
            Command::Extract => "Paste notes after 'extract'".to_string(),
            Command::Help => HELP.to_string(),
            Command::Quit => {
                self.should_quit = true;
                "Bye".to_string()
            }
        }
    }

    /// Run the extractor over `notes` and import whatever it proposes
    pub async fn extract(&mut self, notes: &str) -> String {
        let Some(extractor) = self.extractor.as_ref() else {
            return "Extraction unavailable: set GEMINI_API_KEY".to_string();
        };
        if notes.trim().is_empty() {
            return "No notes given".to_string();
        }

        let candidates = match extractor.extract(notes).await {
            Ok(candidates) => candidates,
            Err(e) => {
                warn!("extraction failed: {e}");
                return format!("Extraction failed: {e}");
            }
        };

        let summary = self.store.import(candidates);
        format!(
            "Extracted {} item(s), {} rejected",
            summary.added, summary.rejected
        )
    }
}

async fn read_notes<R>(lines: &mut io::Lines<R>) -> Result<String>
where
    R: io::AsyncBufRead + Unpin,
{
    let mut notes = String::new();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            break;
        }
        notes.push_str(&line);
        notes.push('\n');
    }
    Ok(notes)
}

fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}
