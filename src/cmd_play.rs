//! `tourguide play`: run playback inside a live Chrome tab.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{error, info, warn};

use tourguide_config::{Config, StorageBackend};
use tourguide_core::{Player, ScriptLoader, ScriptSource, SequencerSettings};
use tourguide_driver_cdp::{CdpClient, CdpPage, LocalStorageStore, PageSession};
use tourguide_protocols::{
    KeyValueStore, PageEnvironment, PageEvent, PlaybackMode, PopupView, UiCommand,
};
use tourguide_resume::{FileKeyValueStore, MemoryKeyValueStore};

/// Buffered page events between the CDP pump and the player.
const EVENT_BUFFER: usize = 64;

/// Which tab to drive.
pub(crate) struct PlayTarget {
    url: Option<String>,
    attach: Option<String>,
}

impl PlayTarget {
    pub(crate) fn new(url: Option<String>, attach: Option<String>) -> Self {
        Self { url, attach }
    }

    async fn open(
        &self,
        client: &CdpClient,
        load_timeout: Duration,
    ) -> Result<PageSession, Box<dyn std::error::Error>> {
        let session = match (&self.attach, &self.url) {
            (Some(fragment), url) => {
                let page = client.find_page(fragment).await?;
                info!("Attaching to tab {} ({})", page.id, page.url);
                let session = client.attach_page(&page.id).await?;
                if let Some(url) = url {
                    session.navigate(url, load_timeout).await?;
                }
                session
            }
            (None, Some(url)) => {
                info!("Opening {}", url);
                client.new_page(url).await?
            }
            (None, None) => return Err("either --url or --attach is required".into()),
        };

        session.wait_for_load(load_timeout).await?;
        Ok(session)
    }
}

/// Pick the key/value store resume state lives in.
async fn open_storage(
    config: &Config,
    session: &Arc<PageSession>,
) -> Result<Arc<dyn KeyValueStore>, Box<dyn std::error::Error>> {
    let store: Arc<dyn KeyValueStore> = match config.storage.backend_kind()? {
        StorageBackend::Page => Arc::new(LocalStorageStore::new(session.clone())),
        StorageBackend::File => {
            let path = config.storage.resolved_path();
            info!("Resume state stored in {}", path.display());
            Arc::new(FileKeyValueStore::new(path).await?)
        }
        StorageBackend::Memory => Arc::new(MemoryKeyValueStore::new()),
    };
    Ok(store)
}

/// Connect, load the script, then hand the tab to a [`Player`] until the
/// tab closes or the process is interrupted.
pub(crate) async fn play(
    mut config: Config,
    target: PlayTarget,
    start: Option<PlaybackMode>,
    project_id: Option<String>,
    script: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    if project_id.is_some() {
        config.source.project_id = project_id;
    }
    if let Some(script) = script {
        config.source.script_path = script;
    }

    let load_timeout = Duration::from_secs(config.driver.page_load_timeout_seconds);
    let client = CdpClient::connect(&config.driver.cdp_endpoint).await?;
    let session = Arc::new(target.open(&client, load_timeout).await?);

    let (events_tx, events_rx) = mpsc::channel(EVENT_BUFFER);
    let page = CdpPage::attach(session.clone(), events_tx.clone()).await?;

    let page_url = session.get_url().await?;
    let source = ScriptSource::resolve(&config.source, Some(page_url.as_str()));
    let loader = ScriptLoader::from_config(&config.source)?;

    let loaded = match loader.load(&source).await {
        Ok(loaded) => loaded,
        Err(e) => {
            error!("Failed to load tour script: {}", e);
            if let Err(alert_err) = page.alert(&format!("Unable to load the tour: {}", e)).await {
                warn!("Could not show load failure on the page: {}", alert_err);
            }
            return Err(e.into());
        }
    };
    let storage = open_storage(&config, &session).await?;
    let env = PageEnvironment::from_page(page.clone(), storage);
    let player = Player::new(
        Arc::new(loaded.script),
        env,
        SequencerSettings::from(&config),
    );

    if let Some(mode) = start {
        events_tx
            .send(PageEvent::Command(UiCommand::Start(mode)))
            .await?;
    }
    // The CDP pump owns the remaining sender.
    drop(events_tx);

    info!("Tour ready on {}", page_url);
    tokio::select! {
        _ = player.run(events_rx) => {
            info!("Tab closed");
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Interrupted, stopping");
        }
    }

    Ok(())
}
