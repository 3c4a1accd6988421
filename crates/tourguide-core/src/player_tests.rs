use super::*;
use std::time::Duration;

use crate::test_support::{FakePage, PageCall};
use tourguide_protocols::{KeyValueStore, PlaybackMode, ScriptMeta, Step};
use tourguide_resume::MemoryKeyValueStore;

fn setup(steps: Vec<Step>, href: &str) -> (Arc<FakePage>, Arc<MemoryKeyValueStore>, Player) {
    let script = Arc::new(Script::new(ScriptMeta::default(), steps));
    let page = FakePage::at(href);
    let storage = Arc::new(MemoryKeyValueStore::new());
    let player = Player::new(
        script,
        page.environment(storage.clone()),
        SequencerSettings::default(),
    );
    (page, storage, player)
}

fn tour() -> Vec<Step> {
    vec![
        Step::popup("welcome", "Welcome").with_duration(6000),
        Step::popup("pricing", "Pricing").on_page("pricing").with_duration(6000),
    ]
}

#[tokio::test(start_paused = true)]
async fn test_bootstrap_mounts_launcher_without_resuming() {
    let (page, _storage, mut player) = setup(tour(), "http://localhost/");

    player.bootstrap().await;
    assert_eq!(page.calls(), vec![PageCall::MountLauncher]);
    assert!(!player.sequencer().is_active());
}

#[tokio::test(start_paused = true)]
async fn test_bootstrap_resumes_persisted_session() {
    let (page, storage, mut player) = setup(tour(), "http://localhost/pricing");
    storage.set("tourguide-mode", "full").await.unwrap();
    storage.set("tourguide-step", "1").await.unwrap();

    player.bootstrap().await;
    assert_eq!(player.sequencer().current_index(), Some(1));
    assert_eq!(page.counters(), vec!["2 / 2"]);
}

#[tokio::test(start_paused = true)]
async fn test_bootstrap_ignores_unrecognized_mode() {
    let (page, storage, mut player) = setup(tour(), "http://localhost/");
    storage.set("tourguide-mode", "everything").await.unwrap();
    storage.set("tourguide-step", "0").await.unwrap();

    player.bootstrap().await;
    assert!(!player.sequencer().is_active());
    assert!(page.popups().is_empty());
    assert!(storage.entries().await.is_empty());

    // Cleared, so the next load does not trip over it again.
    page.clear_calls();
    player.handle_event(PageEvent::Loaded).await;
    assert_eq!(
        page.calls(),
        vec![PageCall::MountLauncher, PageCall::SetMuted(false)]
    );
}

#[tokio::test(start_paused = true)]
async fn test_launcher_pick_closes_menu_and_starts() {
    let (page, _storage, mut player) = setup(tour(), "http://localhost/");
    player.bootstrap().await;

    player
        .handle_event(PageEvent::Command(UiCommand::ToggleMenu))
        .await;
    player
        .handle_event(PageEvent::Command(UiCommand::Start(PlaybackMode::Full)))
        .await;

    let calls = page.calls();
    assert_eq!(calls[1], PageCall::SetMenuOpen(true));
    assert_eq!(calls[2], PageCall::SetMenuOpen(false));
    assert_eq!(page.counters(), vec!["1 / 2"]);
}

#[tokio::test(start_paused = true)]
async fn test_commands_drive_sequencer() {
    let (page, storage, mut player) = setup(
        vec![Step::popup("a", "A"), Step::popup("b", "B")],
        "http://localhost/",
    );
    player
        .handle_event(PageEvent::Command(UiCommand::Start(PlaybackMode::Page)))
        .await;
    player.handle_event(PageEvent::Command(UiCommand::Next)).await;
    player.handle_event(PageEvent::Command(UiCommand::Prev)).await;
    player
        .handle_event(PageEvent::Command(UiCommand::ToggleMute))
        .await;
    assert!(page.calls().contains(&PageCall::SetMuted(true)));

    player.handle_event(PageEvent::Command(UiCommand::Close)).await;
    assert_eq!(page.counters(), vec!["1 / 2", "2 / 2", "1 / 2"]);
    assert!(!player.sequencer().is_active());
    assert!(storage.entries().await.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_page_load_rebuilds_sequencer_and_continues() {
    let (page, _storage, mut player) = setup(tour(), "http://localhost/");
    player.bootstrap().await;
    player
        .handle_event(PageEvent::Command(UiCommand::Start(PlaybackMode::Full)))
        .await;
    player.handle_event(PageEvent::Command(UiCommand::Next)).await;
    assert_eq!(page.navigations(), vec!["/pricing"]);

    page.clear_calls();
    player.handle_event(PageEvent::Loaded).await;
    assert_eq!(page.calls()[0], PageCall::MountLauncher);
    assert_eq!(page.counters(), vec!["2 / 2"]);
    assert_eq!(player.sequencer().current_index(), Some(1));
}

#[tokio::test(start_paused = true)]
async fn test_run_loop_auto_advances_to_the_end() {
    let (page, storage, player) = setup(
        vec![
            Step::popup("a", "A").with_duration(6000),
            Step::popup("b", "B").with_duration(6000),
        ],
        "http://localhost/",
    );
    let (tx, rx) = mpsc::channel(8);
    let handle = tokio::spawn(player.run(rx));

    tx.send(PageEvent::Command(UiCommand::Start(PlaybackMode::Full)))
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_secs(20)).await;

    drop(tx);
    handle.await.unwrap();

    assert_eq!(page.counters(), vec!["1 / 2", "2 / 2"]);
    assert!(page.calls().contains(&PageCall::HidePopup));
    assert!(storage.entries().await.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_same_document_load_resets_mute_control() {
    let (page, _storage, mut player) = setup(tour(), "http://localhost/#/");
    player.bootstrap().await;
    player
        .handle_event(PageEvent::Command(UiCommand::Start(PlaybackMode::Full)))
        .await;
    player
        .handle_event(PageEvent::Command(UiCommand::ToggleMute))
        .await;
    assert!(player.sequencer().narrator().is_muted());

    player.handle_event(PageEvent::Command(UiCommand::Next)).await;
    assert_eq!(page.navigations(), vec!["#/pricing"]);

    page.clear_calls();
    player.handle_event(PageEvent::Loaded).await;
    assert!(!player.sequencer().narrator().is_muted());
    assert_eq!(page.calls().last(), Some(&PageCall::SetMuted(false)));
    assert_eq!(page.spoken(), vec!["Pricing".to_string()]);
}
