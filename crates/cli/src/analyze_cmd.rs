use anyhow::Result;

use crate::output;
use crate::CliNavigator;

pub async fn run_analyze(
    nav: &mut CliNavigator,
    path: &str,
    refresh: bool,
    session: Option<&str>,
) -> Result<()> {
    if let Some(name) = session {
        let outcome = nav.activate_session(name)?;
        if let Some(notice) = outcome.notice {
            eprintln!("warning: {notice}");
        }
    }
    output::print_progress(refresh);
    let outcome = nav.navigate(path, refresh).await;
    output::print_outcome(&outcome);
    Ok(())
}
