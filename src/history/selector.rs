use crate::Result;
use crate::ReqlabError;
use crate::history::model::HistoryEntry;
use crate::history::storage::HistoryStorage;
use inquire::Select;

/// Selection strategy for history entries
pub enum SelectionStrategy {
    Interactive,
    Latest,
    Id(i64),
}

/// Select a single history entry based on the given strategy
pub fn select_entry(
    storage: &HistoryStorage,
    strategy: SelectionStrategy,
) -> Result<Option<HistoryEntry>> {
    match strategy {
        SelectionStrategy::Interactive => select_interactive(storage),
        SelectionStrategy::Latest => Ok(storage.head(1)?.into_iter().next()),
        SelectionStrategy::Id(id) => storage.get(id),
    }
}

/// Interactively pick a history entry using a TUI
fn select_interactive(storage: &HistoryStorage) -> Result<Option<HistoryEntry>> {
    // 1. Fetch recent history (newest first)
    let entries = storage.head(50)?;

    if entries.is_empty() {
        return Ok(None);
    }

    // 2. Prompt user (using wrapped struct for indices)
    #[derive(Clone)]
    struct EntryWrapper {
        index: usize,
        display: String,
    }

    impl std::fmt::Display for EntryWrapper {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "{}", self.display)
        }
    }

    let options: Vec<EntryWrapper> = entries
        .iter()
        .map(format_entry_for_display)
        .enumerate()
        .map(|(index, display)| EntryWrapper { index, display })
        .collect();

    let selected = Select::new("Select a request to replay:", options)
        .with_page_size(15)
        .with_help_message("Enter to select, type to filter")
        .prompt()
        .map_err(|e| ReqlabError::Other(format!("Interaction canceled or failed: {}", e)))?;

    // 3. Map back to entry
    Ok(entries.into_iter().nth(selected.index))
}

fn format_entry_for_display(e: &HistoryEntry) -> String {
    let time = e.timestamp.format("%Y-%m-%d %H:%M:%S");
    let method = &e.request.method;
    let url = &e.request.url;
    let status = if e.response.is_failure() {
        "ERROR".to_string()
    } else {
        e.response.status.to_string()
    };
    format!("[{status}] {method} {url} ({time})")
}
