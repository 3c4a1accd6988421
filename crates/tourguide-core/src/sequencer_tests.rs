use super::*;
use crate::presentation::NO_STEPS_MESSAGE;
use crate::test_support::{FakePage, PageCall};
use tourguide_protocols::{ActionVerb, KeyValueStore, Rect, ScriptMeta, StepAction};
use tourguide_resume::MemoryKeyValueStore;

struct Harness {
    script: Arc<Script>,
    page: Arc<FakePage>,
    storage: Arc<MemoryKeyValueStore>,
    sequencer: Sequencer,
    ticks: mpsc::UnboundedReceiver<AutoAdvance>,
}

impl Harness {
    fn new(steps: Vec<Step>, href: &str) -> Self {
        let script = Arc::new(Script::new(ScriptMeta::default(), steps));
        let page = FakePage::at(href);
        let storage = Arc::new(MemoryKeyValueStore::new());
        let (tx, ticks) = mpsc::unbounded_channel();
        let sequencer = Sequencer::new(
            script.clone(),
            page.environment(storage.clone()),
            SequencerSettings::default(),
            tx,
        );
        Self {
            script,
            page,
            storage,
            sequencer,
            ticks,
        }
    }

    /// Model a full page load: all in-memory state is gone, storage survives.
    fn reload(&mut self) {
        let (tx, ticks) = mpsc::unbounded_channel();
        self.sequencer = Sequencer::new(
            self.script.clone(),
            self.page.environment(self.storage.clone()),
            SequencerSettings::default(),
            tx,
        );
        self.ticks = ticks;
        self.page.clear_calls();
        self.page.clear_dom();
    }

    async fn persist(&self, mode: &str, step: &str) {
        self.storage.set("tourguide-mode", mode).await.unwrap();
        self.storage.set("tourguide-step", step).await.unwrap();
    }

    async fn stored(&self) -> (Option<String>, Option<String>) {
        (
            self.storage.get("tourguide-mode").await.unwrap(),
            self.storage.get("tourguide-step").await.unwrap(),
        )
    }

    async fn fire_timer(&mut self) {
        let tick = self.ticks.recv().await.unwrap();
        self.sequencer.on_auto_advance(tick).await;
    }
}

fn three_home_steps() -> Vec<Step> {
    vec![
        Step::popup("intro", "Welcome to the shop"),
        Step::popup("middle", "Here is the catalogue"),
        Step::popup("outro", "That is all"),
    ]
}

#[tokio::test(start_paused = true)]
async fn test_page_mode_plays_only_exact_page_steps() {
    let steps = vec![
        Step::popup("home", "Home").on_page(""),
        Step::popup("a", "Section A").on_page("a"),
        Step::popup("ab", "Section A/B").on_page("a/b"),
    ];
    let mut h = Harness::new(steps, "http://localhost/a");

    let outcome = h.sequencer.start(PlaybackMode::Page).await.unwrap();
    assert_eq!(outcome, StartOutcome::Started { index: 0 });
    assert_eq!(h.page.counters(), vec!["1 / 1"]);
    assert_eq!(h.page.popups()[0].content, "Section A");
}

#[tokio::test(start_paused = true)]
async fn test_out_of_range_persisted_index_resets_to_zero() {
    let mut h = Harness::new(three_home_steps(), "http://localhost/");
    h.persist("full", "7").await;

    let outcome = h.sequencer.start(PlaybackMode::Full).await.unwrap();
    assert_eq!(outcome, StartOutcome::Started { index: 0 });
    assert_eq!(h.stored().await, (Some("full".into()), Some("0".into())));
}

#[tokio::test(start_paused = true)]
async fn test_fresh_sequencer_resumes_persisted_index() {
    let mut h = Harness::new(three_home_steps(), "http://localhost/");
    h.persist("full", "2").await;

    let outcome = h.sequencer.start(PlaybackMode::Full).await.unwrap();
    assert_eq!(outcome, StartOutcome::Started { index: 2 });
    assert_eq!(h.page.counters(), vec!["3 / 3"]);
}

#[tokio::test(start_paused = true)]
async fn test_stop_clears_state_and_restarts_at_zero() {
    let mut h = Harness::new(three_home_steps(), "http://localhost/");
    h.sequencer.start(PlaybackMode::Full).await.unwrap();
    h.sequencer.next().await;
    assert_eq!(h.stored().await.1.as_deref(), Some("1"));

    h.page.clear_calls();
    h.sequencer.stop().await;
    assert!(!h.sequencer.is_active());
    assert!(!h.sequencer.timer.is_armed());
    assert_eq!(h.stored().await, (None, None));
    assert_eq!(
        h.page.calls(),
        vec![
            PageCall::HidePopup,
            PageCall::HideOverlay,
            PageCall::CancelSpeech,
        ]
    );

    let outcome = h.sequencer.start(PlaybackMode::Full).await.unwrap();
    assert_eq!(outcome, StartOutcome::Started { index: 0 });
}

#[tokio::test(start_paused = true)]
async fn test_stop_is_idempotent() {
    let mut h = Harness::new(three_home_steps(), "http://localhost/");
    h.sequencer.stop().await;
    h.sequencer.stop().await;
    assert!(!h.sequencer.is_active());
    assert_eq!(h.stored().await, (None, None));
}

#[tokio::test(start_paused = true)]
async fn test_manual_next_supersedes_pending_timer() {
    let steps = three_home_steps()
        .into_iter()
        .map(|s| s.with_duration(5000))
        .collect();
    let mut h = Harness::new(steps, "http://localhost/");
    h.sequencer.start(PlaybackMode::Full).await.unwrap();

    tokio::time::sleep(Duration::from_secs(1)).await;
    h.sequencer.next().await;

    // Past the first step's original deadline, before the second's.
    tokio::time::sleep(Duration::from_millis(4500)).await;
    assert!(h.ticks.try_recv().is_err());
    assert_eq!(h.page.counters(), vec!["1 / 3", "2 / 3"]);
    assert_eq!(h.sequencer.current_index(), Some(1));
}

#[tokio::test(start_paused = true)]
async fn test_stale_ticket_is_ignored() {
    let mut h = Harness::new(three_home_steps(), "http://localhost/");
    h.sequencer.start(PlaybackMode::Full).await.unwrap();

    h.sequencer.on_auto_advance(AutoAdvance { ticket: 0 }).await;
    assert_eq!(h.sequencer.current_index(), Some(0));
    assert_eq!(h.page.counters(), vec!["1 / 3"]);
}

#[tokio::test(start_paused = true)]
async fn test_timer_advances_then_finishes() {
    let steps = vec![
        Step::popup("one", "First").with_duration(6000),
        Step::popup("two", "Second").with_duration(6000),
    ];
    let mut h = Harness::new(steps, "http://localhost/");
    h.sequencer.start(PlaybackMode::Full).await.unwrap();

    h.fire_timer().await;
    assert_eq!(h.page.counters(), vec!["1 / 2", "2 / 2"]);
    assert_eq!(h.page.popups()[1].next_label, "Finish");

    h.fire_timer().await;
    assert!(!h.sequencer.is_active());
    assert_eq!(h.stored().await, (None, None));
}

#[tokio::test(start_paused = true)]
async fn test_default_duration_applies() {
    let mut h = Harness::new(vec![Step::popup("only", "Hi")], "http://localhost/");
    h.sequencer.start(PlaybackMode::Full).await.unwrap();

    tokio::time::sleep(Duration::from_millis(4900)).await;
    assert!(h.ticks.try_recv().is_err());
    tokio::time::sleep(Duration::from_millis(300)).await;
    assert!(h.ticks.try_recv().is_ok());
}

#[tokio::test(start_paused = true)]
async fn test_missing_target_still_shows_popup_and_arms_timer() {
    let steps = vec![Step::highlight("ghost", "#missing", "Look here")];
    let mut h = Harness::new(steps, "http://localhost/");

    let outcome = h.sequencer.start(PlaybackMode::Full).await.unwrap();
    assert_eq!(outcome, StartOutcome::Started { index: 0 });

    let calls = h.page.calls();
    assert_eq!(calls[0], PageCall::HideOverlay);
    assert!(matches!(calls[1], PageCall::ShowPopup(_)));
    assert!(h.sequencer.timer.is_armed());
}

#[tokio::test(start_paused = true)]
async fn test_render_effect_order() {
    let step = Step::highlight("cart", "#cart", "Your cart")
        .with_action(StepAction::click("#open"))
        .with_action(StepAction::click("#missing"));
    let mut h = Harness::new(vec![step], "http://localhost/");
    let cart = h.page.add_element("#cart", Rect::new(0.0, 0.0, 50.0, 20.0));
    let open = h.page.add_element("#open", Rect::default());

    h.sequencer.start(PlaybackMode::Full).await.unwrap();

    assert_eq!(
        h.page.calls(),
        vec![
            PageCall::ScrollIntoView(cart),
            PageCall::Frame(Rect::new(-4.0, -4.0, 58.0, 28.0)),
            PageCall::ShowPopup(crate::presentation::popup_model("Your cart", 0, 1)),
            PageCall::CancelSpeech,
            PageCall::Speak("Your cart".to_string()),
            PageCall::Click(open),
        ]
    );
    assert!(h.sequencer.timer.is_armed());
}

#[tokio::test(start_paused = true)]
async fn test_full_mode_redirects_to_entry() {
    let mut h = Harness::new(three_home_steps(), "http://localhost/pricing");

    let outcome = h.sequencer.start(PlaybackMode::Full).await.unwrap();
    assert_eq!(
        outcome,
        StartOutcome::Redirected {
            href: "/".to_string()
        }
    );
    assert!(!h.sequencer.is_active());
    assert!(h.page.popups().is_empty());
    assert_eq!(h.stored().await, (Some("full".into()), Some("0".into())));
}

#[tokio::test(start_paused = true)]
async fn test_failed_entry_redirect_leaves_nothing_to_resume() {
    let mut h = Harness::new(three_home_steps(), "http://localhost/pricing");
    h.page.set_navigation_fails(true);

    let result = h.sequencer.start(PlaybackMode::Full).await;
    assert!(matches!(
        result,
        Err(PlaybackError::Page(PageError::NavigationFailed(_)))
    ));
    assert!(!h.sequencer.is_active());
    assert_eq!(h.stored().await, (None, None));
    assert_eq!(h.page.alerts().len(), 1);

    // The next load on the same page must not pick a tour back up.
    h.reload();
    assert!(!h.sequencer.resume_store().is_resumable().await.unwrap());
}

#[tokio::test(start_paused = true)]
async fn test_absolute_entry_url_starts_in_place() {
    let meta = ScriptMeta {
        entry_url: "http://localhost/".to_string(),
        ..ScriptMeta::default()
    };
    let script = Arc::new(Script::new(meta, three_home_steps()));
    let page = FakePage::at("http://localhost/");
    let storage = Arc::new(MemoryKeyValueStore::new());
    let (tx, _ticks) = mpsc::unbounded_channel();
    let mut sequencer = Sequencer::new(
        script,
        page.environment(storage),
        SequencerSettings::default(),
        tx,
    );

    let outcome = sequencer.start(PlaybackMode::Full).await.unwrap();
    assert_eq!(outcome, StartOutcome::Started { index: 0 });
    assert!(page.navigations().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_restart_without_steps_tears_down_running_session() {
    let mut h = Harness::new(three_home_steps(), "http://localhost/other");
    h.persist("full", "0").await;
    let outcome = h.sequencer.start(PlaybackMode::Full).await.unwrap();
    assert_eq!(outcome, StartOutcome::Started { index: 0 });

    // Nothing is tagged for "other", so page mode has no steps here.
    h.page.clear_calls();
    let outcome = h.sequencer.start(PlaybackMode::Page).await.unwrap();
    assert_eq!(outcome, StartOutcome::NoSteps);
    assert!(!h.sequencer.is_active());
    assert!(!h.sequencer.timer.is_armed());
    assert_eq!(
        h.page.calls(),
        vec![
            PageCall::Alert(NO_STEPS_MESSAGE.to_string()),
            PageCall::HidePopup,
            PageCall::HideOverlay,
            PageCall::CancelSpeech,
        ]
    );
    assert_eq!(h.stored().await, (None, None));
}

#[tokio::test(start_paused = true)]
async fn test_actions_skip_unsupported_and_missing_targets() {
    let step = Step::popup("shop", "Shop").with_action(StepAction {
        verb: ActionVerb::Unsupported,
        selector: "#banner".to_string(),
    });
    let step = step
        .with_action(StepAction::click("#gone"))
        .with_action(StepAction::click("#buy"));
    let mut h = Harness::new(vec![step], "http://localhost/");
    h.page.add_element("#banner", Rect::default());
    let buy = h.page.add_element("#buy", Rect::default());

    h.sequencer.start(PlaybackMode::Full).await.unwrap();

    let clicks: Vec<_> = h
        .page
        .calls()
        .into_iter()
        .filter(|c| matches!(c, PageCall::Click(_)))
        .collect();
    assert_eq!(clicks, vec![PageCall::Click(buy)]);
    assert!(h.sequencer.timer.is_armed());
}

#[tokio::test(start_paused = true)]
async fn test_page_mode_restarts_at_zero_and_supersedes_full_state() {
    let mut h = Harness::new(three_home_steps(), "http://localhost/");
    h.persist("full", "2").await;

    let outcome = h.sequencer.start(PlaybackMode::Page).await.unwrap();
    assert_eq!(outcome, StartOutcome::Started { index: 0 });
    assert_eq!(h.stored().await, (Some("page".into()), Some("0".into())));
}

#[tokio::test(start_paused = true)]
async fn test_page_mode_never_navigates() {
    let steps = vec![Step::popup("a", "Only on A").on_page("a")];
    let mut h = Harness::new(steps, "http://localhost/a/");

    h.sequencer.start(PlaybackMode::Page).await.unwrap();
    assert!(h.page.navigations().is_empty());
    assert_eq!(h.page.counters(), vec!["1 / 1"]);
}

#[tokio::test(start_paused = true)]
async fn test_no_steps_alerts_and_stays_idle() {
    let mut h = Harness::new(three_home_steps(), "http://localhost/nowhere");
    h.persist("page", "0").await;

    let outcome = h.sequencer.start(PlaybackMode::Page).await.unwrap();
    assert_eq!(outcome, StartOutcome::NoSteps);
    assert!(!h.sequencer.is_active());
    assert_eq!(h.page.alerts(), vec![NO_STEPS_MESSAGE.to_string()]);
    assert_eq!(h.stored().await, (None, None));
}

#[tokio::test(start_paused = true)]
async fn test_prev_retreats_and_is_noop_on_first() {
    let mut h = Harness::new(three_home_steps(), "http://localhost/");
    h.sequencer.start(PlaybackMode::Full).await.unwrap();
    h.sequencer.next().await;
    h.sequencer.prev().await;
    assert_eq!(h.page.counters(), vec!["1 / 3", "2 / 3", "1 / 3"]);
    assert_eq!(h.stored().await.1.as_deref(), Some("0"));

    h.sequencer.prev().await;
    assert_eq!(h.page.counters().len(), 3);
    assert_eq!(h.sequencer.current_index(), Some(0));
    assert!(!h.sequencer.timer.is_armed());
}

#[tokio::test(start_paused = true)]
async fn test_transitions_on_idle_are_noops() {
    let mut h = Harness::new(three_home_steps(), "http://localhost/");
    h.sequencer.next().await;
    h.sequencer.prev().await;
    assert!(h.page.calls().is_empty());
    assert_eq!(h.stored().await, (None, None));
}

#[tokio::test(start_paused = true)]
async fn test_hash_routed_navigation_target() {
    let steps = vec![
        Step::popup("home", "Home"),
        Step::popup("about", "About us").on_page("/about"),
    ];
    let mut h = Harness::new(steps, "http://localhost/#/");

    h.sequencer.start(PlaybackMode::Full).await.unwrap();
    h.sequencer.next().await;

    assert_eq!(h.page.navigations(), vec!["#/about"]);
    assert_eq!(h.stored().await, (Some("full".into()), Some("1".into())));
    assert_eq!(h.page.location().page_id().as_str(), "about");
}

#[tokio::test(start_paused = true)]
async fn test_toggle_mute_updates_control_and_silences() {
    let mut h = Harness::new(three_home_steps(), "http://localhost/");
    h.sequencer.start(PlaybackMode::Full).await.unwrap();

    assert!(h.sequencer.toggle_mute().await);
    assert!(h.page.calls().contains(&PageCall::SetMuted(true)));

    h.sequencer.next().await;
    assert_eq!(h.page.spoken(), vec!["Welcome to the shop".to_string()]);
    assert_eq!(h.page.counters().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_end_to_end_multi_page_tour() {
    let steps = vec![
        Step::popup("welcome", "Welcome").on_page(""),
        Step::highlight("foo", "#foo", "This is foo").on_page(""),
        Step::popup("about", "About page").on_page("about"),
    ];
    let mut h = Harness::new(steps, "http://localhost/about");

    // Not on the entry page and nothing persisted: redirect home first.
    let outcome = h.sequencer.start(PlaybackMode::Full).await.unwrap();
    assert_eq!(
        outcome,
        StartOutcome::Redirected {
            href: "/".to_string()
        }
    );
    assert_eq!(h.stored().await, (Some("full".into()), Some("0".into())));

    // Home loads and the bootstrap resumes.
    h.reload();
    let foo = h.page.add_element("#foo", Rect::new(0.0, 0.0, 10.0, 10.0));
    let resume = h.sequencer.resume_store().read().await.unwrap().unwrap();
    assert_eq!(resume.mode, PlaybackMode::Full);
    let outcome = h.sequencer.start(resume.mode).await.unwrap();
    assert_eq!(outcome, StartOutcome::Started { index: 0 });

    h.sequencer.next().await;
    assert!(h.page.calls().contains(&PageCall::ScrollIntoView(foo)));

    // Step 2 lives on another page.
    h.sequencer.next().await;
    assert_eq!(h.page.navigations(), vec!["/about"]);
    assert!(!h.sequencer.is_active());
    assert_eq!(h.stored().await, (Some("full".into()), Some("2".into())));
    assert_eq!(h.page.counters(), vec!["1 / 3", "2 / 3"]);

    // The about page loads and picks up at index 2.
    h.reload();
    let outcome = h.sequencer.start(PlaybackMode::Full).await.unwrap();
    assert_eq!(outcome, StartOutcome::Started { index: 2 });
    assert_eq!(h.page.counters(), vec!["3 / 3"]);
    assert!(h.page.navigations().is_empty());
}
