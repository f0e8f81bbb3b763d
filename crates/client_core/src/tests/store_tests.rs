use super::*;
use crate::fixtures::{team, teams};
use shared::domain::{TeamId, TeamSummary};

#[test]
fn starts_empty_and_idle() {
    let store = ListSyncStore::<TeamSummary>::new();
    let snapshot = store.snapshot();
    assert!(snapshot.is_empty());
    assert_eq!(snapshot.active, None);
    assert!(!snapshot.loading);
}

#[test]
fn set_list_replaces_items_wholesale() {
    let store = ListSyncStore::new();
    store.set_list(teams(&["t1", "t2", "t3"]));
    store.set_list(teams(&["t4"]));

    assert_eq!(store.snapshot().items, teams(&["t4"]));
}

#[test]
fn set_list_keeps_selection_that_is_still_present() {
    let store = ListSyncStore::new();
    store.set_list(teams(&["t1", "t2"]));
    store.set_active_selection(Some(TeamId::from("t2")));

    store.set_list(teams(&["t2", "t3"]));
    let snapshot = store.snapshot();
    assert_eq!(snapshot.active, Some(TeamId::from("t2")));
    assert_eq!(snapshot.active_item(), Some(&team("t2")));
}

#[test]
fn set_list_clears_dangling_selection() {
    let store = ListSyncStore::new();
    store.set_list(teams(&["t1", "t2"]));
    store.set_active_selection(Some(TeamId::from("t1")));

    store.set_list(teams(&["t2"]));
    assert_eq!(store.snapshot().active, None);
}

#[test]
fn set_list_does_not_select_anything() {
    let store = ListSyncStore::new();
    store.set_list(teams(&["t1", "t2"]));
    assert_eq!(store.snapshot().active, None);
}

#[test]
fn set_active_selection_does_not_check_membership() {
    let store = ListSyncStore::<TeamSummary>::new();
    store.set_active_selection(Some(TeamId::from("ghost")));

    let snapshot = store.snapshot();
    assert_eq!(snapshot.active, Some(TeamId::from("ghost")));
    assert_eq!(snapshot.active_item(), None);

    store.set_active_selection(None);
    assert_eq!(store.snapshot().active, None);
}

#[test]
fn duplicate_identifiers_keep_first_occurrence() {
    let store = ListSyncStore::new();
    let mut renamed = team("t1");
    renamed.name = "Renamed".to_string();
    store.set_list(vec![team("t1"), team("t2"), renamed]);

    let snapshot = store.snapshot();
    assert_eq!(snapshot.len(), 2);
    assert_eq!(snapshot.items[0].name, "Team t1");
}

#[test]
fn update_publishes_multi_field_change_once() {
    let store = ListSyncStore::new();
    store.set_loading(true);
    let mut rx = store.subscribe();

    let changed = store.update(|draft| {
        draft.set_list(teams(&["t1"]));
        draft.set_active_selection(Some(TeamId::from("t1")));
        draft.set_loading(false);
    });
    assert!(changed);
    assert!(rx.has_changed().expect("store alive"));

    let seen = rx.borrow_and_update().clone();
    assert_eq!(seen.items, teams(&["t1"]));
    assert_eq!(seen.active, Some(TeamId::from("t1")));
    assert!(!seen.loading);
    assert!(!rx.has_changed().expect("store alive"));
}

#[test]
fn identical_list_does_not_notify_observers() {
    let store = ListSyncStore::new();
    store.set_list(teams(&["t1", "t2"]));
    let mut rx = store.subscribe();

    store.set_list(teams(&["t1", "t2"]));
    assert!(!rx.has_changed().expect("store alive"));

    store.set_loading(true);
    assert!(rx.has_changed().expect("store alive"));
    assert!(rx.borrow_and_update().loading);
}

#[test]
fn read_borrows_without_cloning() {
    let store = ListSyncStore::new();
    store.set_list(teams(&["t1", "t2", "t3"]));
    let names: Vec<String> = store.read(|snapshot| {
        snapshot
            .items
            .iter()
            .map(|item| item.name.clone())
            .collect()
    });
    assert_eq!(names, vec!["Team t1", "Team t2", "Team t3"]);
}
