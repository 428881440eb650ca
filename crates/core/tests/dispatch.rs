// Integration tests for request dispatch: failure values, naming, transfers.

use serde_json::{Value, json};
use spaces::testing::Harness;
use spaces::{SessionStore, UtilityKind};
use spaces_protocol::{Reply, Session, SessionId, Tab};

fn session(name: &str, urls: &[&str]) -> Session {
	Session::named(name, urls.iter().map(|url| Tab::new(*url)).collect())
}

#[tokio::test]
async fn missing_parameters_answer_the_failure_value() {
	let harness = Harness::new();
	harness.browser.open_window(&["https://a.example"]);

	let cases: &[(&str, Option<Value>)] = &[
		("requestSpaceFromWindowId", Some(json!(false))),
		("generatePopupParams", Some(json!(""))),
		("loadSession", None),
		("loadWindow", None),
		("loadTabInSession", None),
		("loadTabInWindow", None),
		("saveNewSession", Some(json!(false))),
		("importNewSession", Some(Value::Null)),
		("restoreFromBackup", Some(Value::Null)),
		("deleteSession", Some(json!(false))),
		("closeWindow", Some(json!(false))),
		("updateSessionName", Some(json!(false))),
		("requestSpaceDetail", Some(json!(false))),
		("requestTabDetail", Some(Value::Null)),
		("addLinkToNewSession", Some(Value::Null)),
		("moveTabToNewSession", Some(Value::Null)),
		("addLinkToSession", Some(json!(false))),
		("moveTabToSession", Some(json!(false))),
		("addLinkToWindow", Some(json!(false))),
		("moveTabToWindow", Some(json!(false))),
	];
	for (action, expected) in cases {
		let reply = harness.ask(json!({ "action": action })).await;
		assert_eq!(&reply, expected, "{action}");
	}
	assert_eq!(harness.browser.created_windows(), 0);
	assert!(harness.store.snapshot().is_empty());
}

#[tokio::test]
async fn malformed_ids_count_as_missing() {
	let harness = Harness::new();
	for window_id in [json!("abc"), json!(""), json!(0), json!(true), json!(null)] {
		let reply = harness
			.ask(json!({ "action": "closeWindow", "windowId": window_id }))
			.await;
		assert_eq!(reply, Some(json!(false)), "{window_id}");
	}
}

#[tokio::test]
async fn unknown_or_missing_actions_get_no_reply() {
	let harness = Harness::new();
	assert_eq!(harness.dispatch(json!({ "action": "launchRockets" })).await, Reply::Silent);
	assert_eq!(harness.dispatch(json!({ "windowId": 1 })).await, Reply::Silent);
	assert_eq!(harness.dispatch(json!("requestAllSpaces")).await, Reply::Silent);
}

#[tokio::test]
async fn faults_are_answered_with_the_failure_value() {
	let harness = Harness::with_sessions(vec![session("Work", &["https://a.example"])]);
	harness.browser.set_broken(true);

	assert_eq!(harness.ask(json!({ "action": "requestAllSpaces" })).await, Some(json!([])));
	assert_eq!(harness.ask(json!({ "action": "requestCurrentSpace" })).await, Some(json!(false)));
	assert_eq!(harness.dispatch(json!({ "action": "loadSession", "sessionId": 1 })).await, Reply::Silent);
	assert_eq!(
		harness.ask(json!({ "action": "switchToSpace", "sessionId": 1 })).await,
		Some(json!(true))
	);

	harness.browser.set_broken(false);
	let spaces = harness.ask(json!({ "action": "requestAllSpaces" })).await.unwrap();
	assert_eq!(spaces.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn renaming_to_a_different_case_of_the_same_name() {
	let harness = Harness::with_sessions(vec![session("work", &["https://a.example"])]);

	let renamed = harness
		.ask(json!({ "action": "updateSessionName", "sessionId": 1, "sessionName": "Work" }))
		.await
		.unwrap();
	assert_eq!(renamed["name"], "Work");
}

#[tokio::test]
async fn renaming_onto_another_session_needs_delete_old() {
	let harness = Harness::with_sessions(vec![
		session("Work", &["https://a.example"]),
		session("Home", &["https://b.example"]),
	]);

	let refused = harness
		.ask(json!({ "action": "updateSessionName", "sessionId": 2, "sessionName": "WORK" }))
		.await;
	assert_eq!(refused, Some(json!(false)));
	assert_eq!(harness.store.snapshot().len(), 2);

	let renamed = harness
		.ask(json!({ "action": "updateSessionName", "sessionId": 2, "sessionName": "WORK", "deleteOld": "true" }))
		.await
		.unwrap();
	assert_eq!(renamed["name"], "WORK");
	assert_eq!(renamed["sessionId"], Value::Null, "sessions serialize their id as `id`");
	assert_eq!(renamed["id"], 2);

	let remaining = harness.store.snapshot();
	assert_eq!(remaining.len(), 1);
	assert_eq!(remaining[0].id, Some(SessionId(2)));
}

#[tokio::test]
async fn delete_old_false_strings_are_not_truthy() {
	let harness = Harness::with_sessions(vec![
		session("Work", &["https://a.example"]),
		session("Home", &["https://b.example"]),
	]);
	let refused = harness
		.ask(json!({ "action": "updateSessionName", "sessionId": 2, "sessionName": "Work", "deleteOld": "false" }))
		.await;
	assert_eq!(refused, Some(json!(false)));
}

#[tokio::test]
async fn saving_over_an_existing_name() {
	let harness = Harness::with_sessions(vec![session("Work", &["https://old.example"])]);
	let window = harness.browser.open_window(&["https://new.example"]);

	let refused = harness
		.ask(json!({ "action": "saveNewSession", "windowId": window.get(), "sessionName": "work" }))
		.await;
	assert_eq!(refused, Some(json!(false)));

	let saved = harness
		.ask(json!({ "action": "saveNewSession", "windowId": window.get(), "sessionName": "work", "deleteOld": true }))
		.await
		.unwrap();
	assert_eq!(saved["tabs"][0]["url"], "https://new.example");
	assert_eq!(harness.store.snapshot().len(), 1);
}

#[tokio::test]
async fn deleting_a_session() {
	let harness = Harness::with_sessions(vec![session("Work", &["https://a.example"])]);
	assert_eq!(harness.ask(json!({ "action": "deleteSession", "sessionId": 1 })).await, Some(json!(true)));
	assert_eq!(harness.ask(json!({ "action": "deleteSession", "sessionId": 1 })).await, Some(json!(false)));
}

#[tokio::test]
async fn imported_url_lists_take_the_next_free_name() {
	let harness = Harness::with_sessions(vec![session("Imported space: 1", &["https://a.example"])]);

	let imported = harness
		.ask(json!({ "action": "importNewSession", "urlList": ["https://x.example", "https://y.example"] }))
		.await
		.unwrap();
	assert_eq!(imported["name"], "Imported space: 2");
	assert_eq!(imported["tabs"].as_array().unwrap().len(), 2);
	assert_eq!(imported["windowId"], false);
}

#[tokio::test]
async fn restoring_a_backup_space() {
	let harness = Harness::new();
	let space = json!({ "name": "Reading", "tabs": [{ "url": "https://r.example", "title": "R" }] });

	let restored = harness
		.ask(json!({ "action": "restoreFromBackup", "space": space, "deleteOld": false }))
		.await
		.unwrap();
	assert_eq!(restored["name"], "Reading");
	assert_eq!(restored["tabs"][0]["title"], "R");

	let again = harness
		.ask(json!({ "action": "restoreFromBackup", "space": space }))
		.await;
	assert_eq!(again, Some(Value::Null), "name already taken");
}

#[tokio::test]
async fn space_detail_by_window_or_session() {
	let harness = Harness::with_sessions(vec![session("Work", &["https://a.example", "https://a.example"])]);
	let window = harness.browser.open_window(&["https://w.example"]);

	let by_window = harness
		.ask(json!({ "action": "requestSpaceDetail", "windowId": window.get() }))
		.await
		.unwrap();
	assert_eq!(by_window["windowId"], window.get());

	let by_session = harness
		.ask(json!({ "action": "requestSpaceDetail", "sessionId": 1 }))
		.await
		.unwrap();
	assert_eq!(by_session["tabs"][1]["duplicate"], true);

	let missing = harness.ask(json!({ "action": "requestSpaceDetail", "sessionId": 9 })).await;
	assert_eq!(missing, Some(Value::Null));
}

#[tokio::test]
async fn adding_a_link_to_a_new_session_closes_the_popup() {
	let harness = Harness::new();
	harness.browser.open_window(&["https://a.example"]);
	harness.engine.show_popup("move", None).await.unwrap();
	let popup = harness.engine.state().slots.get(UtilityKind::Popup).unwrap();

	let created = harness
		.ask(json!({ "action": "addLinkToNewSession", "url": "https://l.example", "sessionName": "Links" }))
		.await
		.unwrap();
	assert_eq!(created["name"], "Links");
	assert!(harness.browser.snapshot(popup).is_none());

	let duplicate = harness
		.ask(json!({ "action": "addLinkToNewSession", "url": "https://l.example", "sessionName": "links" }))
		.await;
	assert_eq!(duplicate, Some(Value::Null));
}

#[tokio::test]
async fn moving_a_tab_into_a_closed_session() {
	let harness = Harness::with_sessions(vec![session("Later", &["https://later.example"])]);
	let window = harness
		.browser
		.open_window(&["https://keep.example", "https://move.example"]);
	let tab = harness.browser.snapshot(window).unwrap().tabs[1].id.unwrap();

	let moved = harness
		.ask(json!({ "action": "moveTabToSession", "tabId": tab.get(), "sessionId": 1 }))
		.await;
	assert_eq!(moved, Some(json!(true)));

	let later = harness.store.session(SessionId(1)).await.unwrap().unwrap();
	let urls: Vec<&str> = later.tabs.iter().map(|tab| tab.url.as_str()).collect();
	assert_eq!(urls, ["https://later.example", "https://move.example"]);
	assert_eq!(later.tabs[1].id, None);
	assert_eq!(harness.browser.snapshot(window).unwrap().tabs.len(), 1);

	let gone = harness
		.ask(json!({ "action": "moveTabToSession", "tabId": tab.get(), "sessionId": 1 }))
		.await;
	assert_eq!(gone, Some(json!(false)));
}

#[tokio::test]
async fn moving_a_tab_between_bound_windows_updates_both_sessions() {
	let harness = Harness::new();
	let source = harness.browser.open_window(&["https://a.example", "https://b.example"]);
	let target = harness.browser.open_window(&["https://c.example"]);
	let from = harness.engine.save_new_session(source, "From", false).await.unwrap();
	let to = harness.engine.save_new_session(target, "To", false).await.unwrap();
	let tab = harness.browser.snapshot(source).unwrap().tabs[1].id.unwrap();

	let moved = harness
		.ask(json!({ "action": "moveTabToWindow", "tabId": tab.get(), "windowId": target.get() }))
		.await;
	assert_eq!(moved, Some(json!(true)));

	let from = harness.store.session(from.id.unwrap()).await.unwrap().unwrap();
	let to = harness.store.session(to.id.unwrap()).await.unwrap().unwrap();
	assert_eq!(from.tabs.len(), 1);
	assert_eq!(to.tabs.len(), 2);
	assert_eq!(to.tabs[1].url, "https://b.example");
}

#[tokio::test]
async fn mutations_refresh_an_open_dashboard() {
	let harness = Harness::with_sessions(vec![session("Work", &["https://a.example"])]);
	harness.browser.open_window(&["https://a.example"]);
	harness.engine.show_dashboard(None, false).await.unwrap();

	harness.ask(json!({ "action": "deleteSession", "sessionId": 1 })).await;
	assert_eq!(harness.notifier.count(), 1);

	// Nothing deleted, nothing pushed.
	harness.ask(json!({ "action": "deleteSession", "sessionId": 1 })).await;
	assert_eq!(harness.notifier.count(), 1);
}

#[tokio::test]
async fn tab_detail_of_a_vanished_tab_closes_the_popup() {
	let harness = Harness::new();
	harness.browser.open_window(&["https://a.example"]);
	harness.engine.show_popup("move", None).await.unwrap();

	let detail = harness.ask(json!({ "action": "requestTabDetail", "tabId": 9999 })).await;

	assert_eq!(detail, Some(Value::Null));
	assert_eq!(harness.engine.state().slots.get(UtilityKind::Popup), None);
}
