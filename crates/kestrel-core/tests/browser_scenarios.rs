use std::sync::Arc;
use std::time::Duration;

use kestrel_backend::MockBackend;
use kestrel_core::{
    BackendCommand, BackendEvent, Browser, Config, FocusRequest, FocusTarget, HotkeyAction,
    KeyEvent, KeyOutcome,
};

async fn browser() -> (Browser, Arc<MockBackend>) {
    let backend = Arc::new(MockBackend::new());
    let browser = Browser::new(Config::default(), backend.clone()).unwrap();
    browser.initialize().await;
    (browser, backend)
}

/// Poll until `check` holds, failing after a second
async fn eventually(mut check: impl FnMut() -> bool) {
    for _ in 0..100 {
        if check() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("condition not reached");
}

#[tokio::test]
async fn page_load_through_event_pump() {
    let (browser, backend) = browser().await;
    let _pump = browser.spawn_event_pump().unwrap();
    let events = browser.event_sender();

    let id = browser.open_tab("https://github.com").await;
    assert!(browser.get_tab(&id).unwrap().is_loading);
    assert_eq!(backend.count(BackendCommand::CREATE_SURFACE), 1);

    events
        .send(BackendEvent::UrlChanged {
            tab_id: id.clone(),
            url: "https://github.com/".into(),
        })
        .unwrap();
    events
        .send(BackendEvent::TitleChanged {
            tab_id: id.clone(),
            title: "GitHub".into(),
        })
        .unwrap();

    eventually(|| browser.get_tab(&id).unwrap().title == "GitHub").await;

    let tab = browser.get_tab(&id).unwrap();
    assert!(!tab.is_loading);
    assert_eq!(tab.history, vec!["https://github.com", "https://github.com/"]);
    assert_eq!(
        browser.history().find_by_url("https://github.com/").unwrap().title,
        "GitHub"
    );

    // A generic title never replaces a good one
    events
        .send(BackendEvent::TitleChanged {
            tab_id: id.clone(),
            title: "GitHub &middot; Build and ship software".into(),
        })
        .unwrap();
    events
        .send(BackendEvent::TitleChanged {
            tab_id: id.clone(),
            title: "GitHub".into(),
        })
        .unwrap();
    events
        .send(BackendEvent::FaviconChanged {
            tab_id: id.clone(),
            favicon: Some("data:image/png;base64,AA==".into()),
        })
        .unwrap();

    eventually(|| browser.get_tab(&id).unwrap().favicon.is_some()).await;
    assert_eq!(
        browser.get_tab(&id).unwrap().title,
        "GitHub · Build and ship software"
    );
}

#[tokio::test]
async fn engine_opened_tab_becomes_active() {
    let (browser, backend) = browser().await;
    let _pump = browser.spawn_event_pump().unwrap();

    browser
        .event_sender()
        .send(BackendEvent::SurfaceCreated {
            tab_id: "popup-1".into(),
            url: "https://docs.rs".into(),
            title: "Docs.rs".into(),
            surface: "native-7".into(),
        })
        .unwrap();

    eventually(|| browser.tabs().len() == 2).await;

    let active = browser.active_tab().unwrap();
    assert_eq!(active.id, "popup-1");
    assert_eq!(active.surface.as_deref(), Some("native-7"));
    assert_eq!(backend.count(BackendCommand::CREATE_SURFACE), 0);
}

#[tokio::test]
async fn events_for_closed_tabs_are_dropped() {
    let (browser, _backend) = browser().await;
    let _pump = browser.spawn_event_pump().unwrap();
    let events = browser.event_sender();

    let id = browser.open_tab("https://a.test").await;
    browser.close_tab(&id).await;

    events
        .send(BackendEvent::LoadError {
            tab_id: id.clone(),
            error_message: "refused".into(),
        })
        .unwrap();
    events
        .send(BackendEvent::TitleChanged {
            tab_id: id.clone(),
            title: "Late Title".into(),
        })
        .unwrap();

    // A marker event behind them shows the pump has drained the queue
    let survivor = browser.active_tab().unwrap().id;
    events
        .send(BackendEvent::AudioChanged {
            tab_id: survivor.clone(),
            has_audio: true,
        })
        .unwrap();
    eventually(|| browser.get_tab(&survivor).unwrap().has_audio).await;

    assert!(browser.get_tab(&id).is_err());
    assert_eq!(browser.tabs().len(), 1);
}

#[tokio::test]
async fn registry_never_empty_under_churn() {
    let (browser, _backend) = browser().await;

    // Deterministic mix of opens and closes
    let mut seed: u32 = 7;
    for _ in 0..60 {
        seed = seed.wrapping_mul(1_103_515_245).wrapping_add(12_345);
        let tabs = browser.tabs();
        if seed % 3 == 0 {
            browser.new_tab().await;
        } else {
            let victim = &tabs[(seed as usize / 3) % tabs.len()];
            browser.close_tab(&victim.id).await;
        }

        let tabs = browser.tabs();
        assert!(!tabs.is_empty());
        assert_eq!(tabs.iter().filter(|t| t.is_active).count(), 1);
        assert!(browser.active_tab().is_some());
    }
}

#[tokio::test]
async fn back_and_forward_are_inverse() {
    let (browser, _backend) = browser().await;
    let id = browser.active_tab().unwrap().id;

    for url in ["https://a.test", "https://b.test", "https://c.test", "https://d.test"] {
        browser.registry().update_tab_url(&id, url).await;
    }

    // From every non-boundary position
    for steps_back in 1..4 {
        for _ in 0..steps_back {
            browser.go_back(&id).await;
        }
        let before = browser.get_tab(&id).unwrap();

        browser.go_back(&id).await;
        browser.go_forward(&id).await;

        let after = browser.get_tab(&id).unwrap();
        assert_eq!(after.url, before.url);
        assert_eq!(after.history_index, before.history_index);

        for _ in 0..steps_back {
            browser.go_forward(&id).await;
        }
        assert_eq!(browser.get_tab(&id).unwrap().url, "https://d.test");
    }
}

#[tokio::test]
async fn hotkeys_respect_text_fields() {
    let (browser, _backend) = browser().await;
    let mut focus = browser.subscribe_focus();

    let mut event = KeyEvent::new("t").ctrl().with_target(FocusTarget::input());
    assert_eq!(browser.handle_key(&mut event).await, KeyOutcome::Ignored);
    assert_eq!(browser.tabs().len(), 1);

    let mut event = KeyEvent::new("l").ctrl().with_target(FocusTarget::input());
    assert_eq!(
        browser.handle_key(&mut event).await,
        KeyOutcome::Handled(HotkeyAction::FocusAddressBar)
    );
    assert!(event.default_prevented);
    assert_eq!(focus.recv().await.unwrap(), FocusRequest::AddressBar);

    let mut event = KeyEvent::new("t").meta();
    browser.handle_key(&mut event).await;
    assert_eq!(browser.tabs().len(), 2);

    let mut event = KeyEvent::new("w").ctrl().with_target(FocusTarget::textarea());
    browser.handle_key(&mut event).await;
    assert_eq!(browser.tabs().len(), 1);
}

#[tokio::test]
async fn failing_backend_never_breaks_navigation() {
    let (browser, backend) = browser().await;
    for command in [
        BackendCommand::CREATE_SURFACE,
        BackendCommand::SHOW_SURFACE,
        BackendCommand::HIDE_ALL_SURFACES,
        BackendCommand::CLOSE_SURFACE,
        BackendCommand::NAVIGATE_SURFACE,
    ] {
        backend.fail(command);
    }

    let id = browser.open_tab("https://a.test").await;
    browser.navigate_input(&id, "b.test").await;
    browser.go_back(&id).await;
    browser.reload(&id).await;

    let tab = browser.get_tab(&id).unwrap();
    assert_eq!(tab.url, "https://a.test");
    assert!(tab.surface.is_none());
    assert!(!tab.is_loading);
    assert!(tab.is_active);
}
