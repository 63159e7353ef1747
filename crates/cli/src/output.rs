//! Plain-text rendering of navigation outcomes.

use dirscope_client::NavigateOutcome;
use dirscope_core::{
    ChildEntry, EntryKind, LoadingLabel, NavigationError, NavigationResult, RequestState,
};

/// Progress line shown while the request is in flight; goes to stderr so
/// piped listings stay clean.
pub fn print_progress(refreshing: bool) {
    let label = if refreshing {
        LoadingLabel::Refreshing
    } else {
        LoadingLabel::Analyzing
    };
    eprintln!("{}", label.display());
}

pub fn print_outcome(outcome: &NavigateOutcome) {
    if let Some(notice) = &outcome.notice {
        eprintln!("warning: {notice}");
    }
    match &outcome.state {
        RequestState::Succeeded(result) => print_listing(result),
        RequestState::Failed(error) => print_failure(error),
        RequestState::Idle | RequestState::Loading(_) => {}
    }
}

fn print_listing(result: &NavigationResult) {
    let report = &result.report;
    let marker = if result.from_cache { " (Cached)" } else { "" };
    if let Some(path) = report.canonical_path() {
        println!("Current: {path}{marker}");
    }
    match report.total_items_in_dir {
        Some(total) => println!("Analyzed {total} items.{marker}"),
        None => println!("Analyzed directory.{marker}"),
    }

    if report.results.is_empty() {
        println!("  Directory is empty.");
    } else {
        println!(
            "  {:>3}  {:<5} {:<40} {:>14}  {}",
            "#", "TYPE", "NAME", "SIZE", "STATUS"
        );
        for (index, entry) in report.results.iter().enumerate() {
            print_entry(index, entry);
        }
    }
    print_logs(&report.logs);
}

fn print_entry(index: usize, entry: &ChildEntry) {
    let size = entry.human_readable_size.as_deref().unwrap_or("[Error]");
    // A per-entry failure gets an inline marker; it never fails the listing.
    let status = entry.error.as_deref().unwrap_or("OK");
    println!(
        "  {:>3}  {:<5} {:<40} {:>14}  {}",
        index,
        kind_label(entry.kind),
        entry.name,
        size,
        status
    );
}

fn print_failure(error: &NavigationError) {
    let marker = if error.from_cache { " (Cached)" } else { "" };
    if let Some(path) = &error.path {
        println!("Current: {path}{marker}");
    }
    eprintln!("error: {}", error.message);
    print_logs(&error.logs);
}

fn print_logs(logs: &[String]) {
    if logs.is_empty() {
        return;
    }
    println!("Logs:");
    for line in logs {
        println!("  {line}");
    }
}

fn kind_label(kind: EntryKind) -> &'static str {
    match kind {
        EntryKind::File => "file",
        EntryKind::Directory => "dir",
        EntryKind::Symlink => "link",
        EntryKind::Unknown => "?",
    }
}
