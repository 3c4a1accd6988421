//! `tourguide resume`: inspect or reset the file-backed resume store.

use tracing::{info, warn};

use tourguide_config::{Config, StorageBackend};
use tourguide_resume::{FileKeyValueStore, ResumeKeys, ResumeStore};

pub(crate) async fn resume(config: &Config, clear: bool) -> Result<(), Box<dyn std::error::Error>> {
    if config.storage.backend_kind()? != StorageBackend::File {
        warn!(
            "Storage backend is '{}'; only the file backend can be inspected from the CLI",
            config.storage.backend
        );
    }

    let path = config.storage.resolved_path();
    let file_store = std::sync::Arc::new(FileKeyValueStore::new(&path).await?);
    let store = ResumeStore::new(file_store.clone(), ResumeKeys::from(&config.storage));

    if clear {
        store.clear().await?;
        info!("Cleared resume state in {}", path.display());
        println!("Resume state cleared ({})", path.display());
        return Ok(());
    }

    match store.read().await? {
        Some(state) => println!(
            "Resumable: mode={} step={} ({})",
            state.mode,
            state.step_index + 1,
            path.display()
        ),
        None => println!("Nothing to resume ({})", path.display()),
    }

    let (_, updated_at) = file_store.snapshot().await?;
    if let Some(updated_at) = updated_at {
        println!("Last written: {}", updated_at.to_rfc3339());
    }

    Ok(())
}
