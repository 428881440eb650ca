// Integration tests for binding live windows to stored sessions.

use serde_json::json;
use spaces::testing::Harness;
use spaces::{Browser, BrowserEvent, SessionStore};
use spaces_protocol::{Session, SessionId, Tab, WindowId};

fn tabs(urls: &[&str]) -> Vec<Tab> {
	urls.iter().map(|url| Tab::new(*url)).collect()
}

#[tokio::test]
async fn saved_session_reports_presence_until_its_window_closes() {
	let harness = Harness::new();
	let work = harness.browser.open_window(&["https://x.example", "https://y.example"]);

	let saved = harness
		.ask(json!({ "action": "saveNewSession", "windowId": work.get(), "sessionName": "Work" }))
		.await
		.unwrap();
	assert_eq!(saved["name"], "Work");
	assert_eq!(saved["windowId"], work.get());

	let presence = harness.ask(json!({ "action": "requestSessionPresence", "sessionName": "Work" })).await;
	assert_eq!(presence, Some(json!({ "exists": true, "isOpen": true, "sessionName": "Work" })));

	harness.browser.close_externally(work);
	harness.engine.handle_event(BrowserEvent::WindowRemoved { window_id: work }).await;

	let presence = harness.ask(json!({ "action": "requestSessionPresence", "sessionName": "work" })).await;
	assert_eq!(presence, Some(json!({ "exists": true, "isOpen": false, "sessionName": "Work" })));

	let stored = harness.store.session_by_name("Work").await.unwrap().unwrap();
	assert_eq!(stored.tabs.len(), 2, "closing the window keeps the session's tabs");
}

#[tokio::test]
async fn presence_of_unknown_name() {
	let harness = Harness::new();
	let presence = harness.ask(json!({ "action": "requestSessionPresence", "sessionName": "Nope" })).await;
	assert_eq!(presence, Some(json!({ "exists": false, "isOpen": false, "sessionName": false })));
}

#[tokio::test]
async fn content_fallback_picks_the_exact_url_sequence() {
	let harness = Harness::with_sessions(vec![
		Session::named("Short", tabs(&["https://a.example", "https://b.example"])),
		Session::named("Full", tabs(&["https://a.example", "https://b.example", "https://c.example"])),
	]);
	let window = harness
		.browser
		.open_window(&["https://a.example", "https://b.example", "https://c.example"]);

	let space = harness
		.ask(json!({ "action": "requestSpaceFromWindowId", "windowId": window.get(), "matchByTabs": true }))
		.await
		.unwrap();
	assert_eq!(space["name"], "Full");
	assert_eq!(space["windowId"], window.get());

	let full = harness.store.session_by_name("Full").await.unwrap().unwrap();
	assert_eq!(full.window_id, Some(window));
	let short = harness.store.session_by_name("Short").await.unwrap().unwrap();
	assert_eq!(short.window_id, None);
}

#[tokio::test]
async fn without_fallback_an_unbound_window_is_transient() {
	let harness = Harness::with_sessions(vec![Session::named("Full", tabs(&["https://a.example"]))]);
	let window = harness.browser.open_window(&["https://a.example"]);

	let space = harness
		.ask(json!({ "action": "requestSpaceFromWindowId", "windowId": window.get() }))
		.await
		.unwrap();
	assert_eq!(space["sessionId"], false);
	assert_eq!(space["name"], false);
	assert_eq!(space["history"], false);
	assert_eq!(space["windowId"], window.get());

	let missing = harness
		.ask(json!({ "action": "requestSpaceFromWindowId", "windowId": 999 }))
		.await;
	assert_eq!(missing, Some(json!(false)));
}

#[tokio::test]
async fn all_spaces_lists_open_sessions_first() {
	let harness = Harness::with_sessions(vec![
		Session {
			window_id: Some(WindowId(1)),
			last_access: Some(5),
			..Session::named("one", tabs(&["https://1.example"]))
		},
		Session {
			last_access: Some(100),
			..Session::named("closed", tabs(&["https://c.example"]))
		},
		Session {
			window_id: Some(WindowId(2)),
			last_access: Some(1),
			..Session::named("two", tabs(&["https://2.example"]))
		},
	]);

	let spaces = harness.ask(json!({ "action": "requestAllSpaces" })).await.unwrap();
	let order: Vec<_> = spaces.as_array().unwrap().iter().map(|space| space["windowId"].clone()).collect();
	assert_eq!(order, [json!(1), json!(2), json!(false)]);
}

#[tokio::test]
async fn all_spaces_adds_unbound_windows_and_skips_utility_windows() {
	let harness = Harness::with_sessions(vec![Session::named("empty", Vec::new())]);
	let loose = harness.browser.open_window(&["https://loose.example"]);
	harness.browser.open_popup_window(&harness.dashboard_url());
	harness.engine.initialize().await.unwrap();

	let spaces = harness.engine.all_spaces().await.unwrap();
	assert_eq!(spaces.len(), 1, "empty sessions and the dashboard are omitted");
	assert_eq!(spaces[0].window_id, Some(loose));
	assert_eq!(spaces[0].session_id, None);
}

#[tokio::test]
async fn tab_events_keep_the_bound_session_in_step() {
	let harness = Harness::new();
	let window = harness.browser.open_window(&["https://a.example", "https://b.example"]);
	let session = harness.engine.save_new_session(window, "Work", false).await.unwrap();
	let session_id = session.id.unwrap();

	harness.engine.add_link_to_window("https://c.example", window).await.unwrap();
	let closing = harness.browser.snapshot(window).unwrap().tabs[0].id.unwrap();

	harness.browser.remove_tab(closing).await.unwrap();
	harness
		.engine
		.handle_event(BrowserEvent::TabRemoved {
			tab_id: closing,
			window_id: window,
			window_closing: false,
		})
		.await;

	let stored = harness.store.session(session_id).await.unwrap().unwrap();
	let urls: Vec<&str> = stored.tabs.iter().map(|tab| tab.url.as_str()).collect();
	assert_eq!(urls, ["https://b.example", "https://c.example"]);
	assert_eq!(stored.history.len(), 1);
	assert_eq!(stored.history[0].url, "https://a.example");
	assert_eq!(stored.history[0].id, None);
}

#[tokio::test]
async fn browser_startup_clears_every_window_binding() {
	let harness = Harness::with_sessions(vec![
		Session {
			window_id: Some(WindowId(7)),
			..Session::named("a", tabs(&["https://a.example"]))
		},
		Session {
			window_id: Some(WindowId(8)),
			..Session::named("b", tabs(&["https://b.example"]))
		},
	]);

	harness.engine.handle_event(BrowserEvent::Startup).await;

	let sessions = harness.store.sessions().await.unwrap();
	assert!(sessions.iter().all(|session| session.window_id.is_none()));
}

#[tokio::test]
async fn focus_stamps_last_access() {
	let harness = Harness::new();
	let window = harness.browser.open_window(&["https://a.example"]);
	let saved = harness.engine.save_new_session(window, "Work", false).await.unwrap();
	let before = saved.last_access.unwrap();

	harness.engine.handle_event(BrowserEvent::WindowFocusChanged { window_id: window }).await;

	let after = harness.store.session(saved.id.unwrap()).await.unwrap().unwrap();
	assert!(after.last_access.unwrap() > before);
}

#[tokio::test]
async fn bounds_changes_are_captured() {
	let harness = Harness::new();
	let window = harness.browser.open_window(&["https://a.example"]);
	let saved = harness.engine.save_new_session(window, "Work", false).await.unwrap();

	harness.browser.set_bounds(window, spaces_protocol::WindowBounds::new(40, 50, 600, 500));
	let moved = harness.browser.snapshot(window).unwrap();
	harness.engine.handle_event(BrowserEvent::WindowBoundsChanged { window: moved }).await;

	let stored = harness.store.session(saved.id.unwrap()).await.unwrap().unwrap();
	let bounds = stored.window_bounds.unwrap().complete().unwrap();
	assert_eq!((bounds.left, bounds.top, bounds.width, bounds.height), (40, 50, 600, 500));
}

#[tokio::test]
async fn loading_a_closed_session_restores_and_binds_it() {
	let harness = Harness::with_sessions(vec![Session {
		tabs: vec![
			Tab {
				pinned: true,
				..Tab::new("https://pinned.example")
			},
			Tab::new("https://b.example"),
		],
		..Session::named("Work", Vec::new())
	}]);
	let session_id = SessionId(1);

	let reply = harness
		.dispatch(json!({ "action": "loadSession", "sessionId": "1", "tabUrl": "https://new.example" }))
		.await;
	assert!(reply.is_truthy());

	let session = harness.store.session(session_id).await.unwrap().unwrap();
	let window_id = session.window_id.expect("session bound to the restored window");
	let window = harness.browser.snapshot(window_id).unwrap();
	let urls: Vec<&str> = window.tab_urls().collect();
	assert_eq!(urls, ["https://pinned.example", "https://b.example", "https://new.example"]);
	assert!(window.tabs[0].pinned);
	assert!(window.tabs[2].active);
}
