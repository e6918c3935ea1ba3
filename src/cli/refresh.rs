use crate::cli::print_record;
use crate::core::settings::Settings;
use crate::core::store::TicketStore;
use crate::refresher::Refresher;
use anyhow::Result;
use std::path::Path;

/// One refresh cycle, outside any server: fetch, extract, persist, print.
/// Exits nonzero when the cycle fell back so cron-style callers notice.
pub async fn run(config: Option<&Path>, json: bool) -> Result<()> {
    let settings = Settings::load(config)?;
    settings.validate()?;

    let refresher = Refresher::new(&settings, TicketStore::new())?;
    let outcome = refresher.refresh().await;

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        println!("{}", outcome.message);
        print_record(&outcome.record);
    }

    if !outcome.success {
        anyhow::bail!("Refresh fell back to the reserve record");
    }

    Ok(())
}
