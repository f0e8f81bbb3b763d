use super::*;
use crate::fixtures::{teams, RecordingNavigator};
use shared::domain::{TeamId, TeamSummary};

const CREATE_TEAM_ROUTE: &str = "/teams/new";

fn controller() -> (
    HydrationController<TeamSummary>,
    Arc<ListSyncStore<TeamSummary>>,
    Arc<RecordingNavigator>,
) {
    let store = Arc::new(ListSyncStore::new());
    let navigator = Arc::new(RecordingNavigator::default());
    let hydration = HydrationController::new(store.clone(), navigator.clone(), CREATE_TEAM_ROUTE);
    (hydration, store, navigator)
}

#[test]
fn empty_first_load_redirects_without_touching_store() {
    let (hydration, store, navigator) = controller();
    assert_eq!(hydration.state(), HydrationState::AwaitingFirstLoad);

    let outcome = hydration.on_list_fetched(Vec::new());
    assert_eq!(
        outcome,
        HydrationOutcome::Redirected {
            route: CREATE_TEAM_ROUTE.to_string()
        }
    );
    assert_eq!(navigator.routes(), vec![CREATE_TEAM_ROUTE.to_string()]);
    assert!(store.snapshot().is_empty());
    assert_eq!(hydration.state(), HydrationState::Redirected);
}

#[test]
fn empty_result_keeps_previously_cached_items() {
    let (hydration, store, navigator) = controller();
    hydration.on_list_fetched(teams(&["t1", "t2"]));
    let before = store.snapshot();

    hydration.on_list_fetched(Vec::new());
    assert_eq!(store.snapshot(), before);
    assert_eq!(navigator.routes(), vec![CREATE_TEAM_ROUTE.to_string()]);
}

#[test]
fn repeated_empty_results_navigate_once() {
    let (hydration, _store, navigator) = controller();
    hydration.on_list_fetched(Vec::new());
    let outcome = hydration.on_list_fetched(Vec::new());

    assert_eq!(outcome, HydrationOutcome::RedirectPending);
    assert_eq!(navigator.routes().len(), 1);
}

#[test]
fn non_empty_result_hydrates_store() {
    let (hydration, store, navigator) = controller();
    let outcome = hydration.on_list_fetched(teams(&["t1", "t2"]));

    assert_eq!(outcome, HydrationOutcome::Hydrated { count: 2 });
    assert_eq!(store.snapshot().items, teams(&["t1", "t2"]));
    assert_eq!(hydration.state(), HydrationState::Hydrated);
    assert!(navigator.routes().is_empty());
}

#[test]
fn identical_results_are_idempotent() {
    let (hydration, store, _navigator) = controller();
    hydration.on_list_fetched(teams(&["t1", "t2"]));
    let first = store.snapshot();
    let rx = store.subscribe();

    hydration.on_list_fetched(teams(&["t1", "t2"]));
    assert_eq!(store.snapshot(), first);
    assert!(!rx.has_changed().expect("store alive"));
}

#[test]
fn refetch_without_selected_team_clears_selection() {
    let (hydration, store, _navigator) = controller();
    hydration.on_list_fetched(teams(&["t1", "t2"]));
    store.set_active_selection(Some(TeamId::from("t1")));

    hydration.on_list_fetched(teams(&["t2"]));
    assert_eq!(store.snapshot().active, None);
}

#[test]
fn auto_select_first_picks_head_only_when_nothing_selected() {
    let store = Arc::new(ListSyncStore::new());
    let navigator = Arc::new(RecordingNavigator::default());
    let hydration = HydrationController::new(store.clone(), navigator, CREATE_TEAM_ROUTE)
        .with_auto_select_first(true);

    hydration.on_list_fetched(teams(&["t1", "t2"]));
    assert_eq!(store.snapshot().active, Some(TeamId::from("t1")));

    store.set_active_selection(Some(TeamId::from("t2")));
    hydration.on_list_fetched(teams(&["t3", "t2"]));
    assert_eq!(store.snapshot().active, Some(TeamId::from("t2")));

    hydration.on_list_fetched(teams(&["t4"]));
    assert_eq!(store.snapshot().active, Some(TeamId::from("t4")));
}

#[test]
fn redirect_then_new_data_returns_to_hydrated() {
    let (hydration, store, navigator) = controller();
    hydration.on_list_fetched(Vec::new());
    hydration.on_list_fetched(teams(&["t1"]));

    assert_eq!(hydration.state(), HydrationState::Hydrated);
    assert_eq!(store.snapshot().len(), 1);

    hydration.on_list_fetched(Vec::new());
    assert_eq!(navigator.routes().len(), 2);
}

#[test]
fn hydrated_count_reflects_deduplicated_list() {
    let (hydration, store, _navigator) = controller();
    let outcome = hydration.on_list_fetched(teams(&["t1", "t2", "t1"]));

    assert_eq!(outcome, HydrationOutcome::Hydrated { count: 2 });
    assert_eq!(store.snapshot().len(), 2);
}
