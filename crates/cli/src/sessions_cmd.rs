use anyhow::Result;
use dialoguer::Confirm;

use crate::CliNavigator;

pub fn run_sessions(nav: &CliNavigator) -> Result<()> {
    let sessions = nav.sessions()?;
    if sessions.is_empty() {
        println!("No saved sessions.");
        return Ok(());
    }
    for name in sessions {
        let marker = if nav.session().active_name() == Some(name.as_str()) {
            " (active)"
        } else {
            ""
        };
        println!("{name}{marker}");
    }
    Ok(())
}

/// Deletion is destructive; the prompt here is the confirmation step the
/// session controller itself never performs.
pub fn run_clear(nav: &mut CliNavigator, name: &str, yes: bool) -> Result<()> {
    if !yes {
        let confirmed = Confirm::new()
            .with_prompt(format!("Delete session '{name}' and its cached results?"))
            .default(false)
            .interact()?;
        if !confirmed {
            println!("Aborted.");
            return Ok(());
        }
    }
    nav.clear_session(name)?;
    println!("Session '{name}' cleared.");
    Ok(())
}
