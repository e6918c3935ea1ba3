use crate::cli::print_record;
use crate::core::settings::Settings;
use crate::refresher::ArtifactStore;
use anyhow::Result;
use std::path::Path;

/// Prints the persisted record without touching the network.
pub async fn run(config: Option<&Path>, json: bool) -> Result<()> {
    let settings = Settings::load(config)?;
    let artifacts = ArtifactStore::new(settings.storage.data_dir.clone());

    let Some(record) = artifacts.load_record() else {
        anyhow::bail!(
            "No ticket record at {}. Run `ticket-mirror refresh` first.",
            artifacts.record_path().display()
        );
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&record)?);
    } else {
        println!("Ticket record ({})", artifacts.record_path().display());
        print_record(&record);
        if !artifacts.has_qr() {
            println!("  (no QR image saved yet)");
        }
    }

    Ok(())
}
