//! Interactive browse loop: one directory at a time, parent navigation and
//! refresh offered only when the gate enables them.

use std::io::{BufRead, Write};

use anyhow::Result;

use dirscope_core::{paths, EntryKind, RequestState};

use crate::output;
use crate::CliNavigator;

pub async fn run_browse(
    nav: &mut CliNavigator,
    start_path: &str,
    session: Option<&str>,
) -> Result<()> {
    if let Some(name) = session {
        let outcome = nav.activate_session(name)?;
        if let Some(notice) = outcome.notice {
            eprintln!("warning: {notice}");
        }
    }
    navigate_and_print(nav, start_path, false).await;

    let stdin = std::io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        prompt(nav)?;
        let Some(line) = lines.next() else {
            break;
        };
        let line = line?;
        let input = line.trim();
        match input {
            "" => {}
            "q" | "quit" | "exit" => break,
            "up" => go_up(nav).await,
            "r" | "refresh" => refresh(nav).await,
            "sessions" => {
                for name in nav.sessions()? {
                    println!("{name}");
                }
            }
            _ => {
                if let Some(name) = input.strip_prefix("session ") {
                    match nav.activate_session(name.trim()) {
                        Ok(outcome) => {
                            println!("Session '{}' active.", name.trim());
                            if let Some(notice) = outcome.notice {
                                eprintln!("warning: {notice}");
                            }
                        }
                        Err(err) => eprintln!("error: {err}"),
                    }
                } else if let Some(arg) = input.strip_prefix("cd ") {
                    change_dir(nav, arg.trim()).await;
                } else {
                    // Anything else is a path to analyze.
                    navigate_and_print(nav, input, false).await;
                }
            }
        }
    }
    Ok(())
}

async fn navigate_and_print(nav: &mut CliNavigator, path: &str, force: bool) {
    output::print_progress(force);
    let outcome = nav.navigate(path, force).await;
    output::print_outcome(&outcome);
}

fn prompt(nav: &CliNavigator) -> Result<()> {
    let controls = nav.controls();
    let mut hints = vec!["cd <#|path>"];
    if controls.navigate_up {
        hints.push("up");
    }
    if controls.refresh {
        hints.push("refresh");
    }
    hints.push("session <name>");
    hints.push("quit");
    print!("dirscope [{}] ({})> ", nav.current_path(), hints.join(", "));
    std::io::stdout().flush()?;
    Ok(())
}

async fn go_up(nav: &mut CliNavigator) {
    if !nav.controls().navigate_up {
        println!("Cannot go up from here.");
        return;
    }
    let Some(parent) = paths::parent_of(nav.current_path()) else {
        println!("Cannot go up from here.");
        return;
    };
    navigate_and_print(nav, &parent, false).await;
}

async fn refresh(nav: &mut CliNavigator) {
    if !nav.controls().refresh {
        println!("Nothing to refresh yet.");
        return;
    }
    let path = nav.current_path().to_string();
    navigate_and_print(nav, &path, true).await;
}

async fn change_dir(nav: &mut CliNavigator, arg: &str) {
    // A bare index picks a directory out of the current listing; anything
    // else is taken as a literal path.
    let target = match arg.parse::<usize>() {
        Ok(index) => match entry_path(nav, index) {
            Ok(path) => path,
            Err(message) => {
                println!("{message}");
                return;
            }
        },
        Err(_) => arg.to_string(),
    };
    navigate_and_print(nav, &target, false).await;
}

fn entry_path(nav: &CliNavigator, index: usize) -> std::result::Result<String, String> {
    let RequestState::Succeeded(result) = nav.state() else {
        return Err("No listing to pick from.".to_string());
    };
    let Some(entry) = result.report.results.get(index) else {
        return Err(format!("No entry #{index} in the current listing."));
    };
    if entry.kind != EntryKind::Directory || entry.has_error() {
        return Err(format!("'{}' is not a browsable directory.", entry.name));
    }
    Ok(entry.path.clone())
}
