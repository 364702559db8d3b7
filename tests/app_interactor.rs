//! End-to-end runs of the application with fake services.

mod common;

use std::time::Duration;

use common::*;
use visits::app::deeplink::DeeplinkResult;
use visits::app::services::PresenterEvent;
use visits::app::{
    AppAction, AppInteractor, Destination, ReducerConfig, Tab, ViewState,
};
use visits::mvi::IllegalActionPolicy;
use visits::store::{MemoryUserStore, UserStore};

fn start(fakes: &Fakes) -> AppInteractor {
    AppInteractor::start(
        ReducerConfig::default(),
        IllegalActionPolicy::Strict,
        manual_clock(),
        fakes.services(),
    )
}

async fn boot(fakes: &Fakes, deeplink: Option<DeeplinkResult>) -> AppInteractor {
    let app = start(fakes);
    app.launch(&fakes.services()).await.unwrap();
    app.handle_action(AppAction::SplashScreenShown).unwrap();
    if let Some(result) = deeplink {
        app.handle_action(AppAction::DeeplinkChecked(result)).unwrap();
    }
    app
}

#[tokio::test]
async fn test_fresh_install_lands_on_sign_in() {
    let fakes = Fakes::new(FakeAuth::default(), MemoryUserStore::default());
    let app = boot(&fakes, Some(DeeplinkResult::NoDeeplink)).await;

    app.wait_for(|s| s.view() == Some(&ViewState::SignIn))
        .await
        .unwrap();
    app.shutdown().await.unwrap();

    let events = fakes.presenter.events();
    assert!(events.contains(&PresenterEvent::Navigate(Destination::SignIn)));
    assert!(matches!(
        events.last(),
        Some(PresenterEvent::Render(snapshot)) if snapshot.view == ViewState::SignIn
    ));
}

#[tokio::test]
async fn test_key_login_signs_in_and_persists() {
    let fakes = Fakes::new(FakeAuth::default(), MemoryUserStore::default());
    let app = boot(&fakes, Some(DeeplinkResult::NoDeeplink)).await;
    app.wait_for(|s| s.view() == Some(&ViewState::SignIn))
        .await
        .unwrap();

    app.handle_action(AppAction::InitiateLogin(key_login()))
        .unwrap();
    let state = app
        .wait_for(|s| s.session().is_some_and(|session| !session.trips.is_empty()))
        .await
        .unwrap();
    assert_eq!(state.view(), Some(&ViewState::Tabs(Tab::Map)));

    app.shutdown().await.unwrap();
    assert_eq!(fakes.store.stored(), Some(stored_user()));
    assert_eq!(fakes.auth.calls.lock().len(), 1);
    assert!(fakes
        .presenter
        .events()
        .contains(&PresenterEvent::Navigate(Destination::Tabs(Tab::Map))));
}

#[tokio::test]
async fn test_rejected_login_shows_error() {
    let fakes = Fakes::new(FakeAuth::failing(401), MemoryUserStore::default());
    let app = boot(&fakes, Some(DeeplinkResult::NoDeeplink)).await;
    app.wait_for(|s| s.view() == Some(&ViewState::SignIn))
        .await
        .unwrap();

    let mut updates = app.subscribe();
    updates.borrow_and_update();
    app.handle_action(AppAction::InitiateLogin(key_login()))
        .unwrap();
    // Login starts, then fails; either may be coalesced into the last value.
    loop {
        updates.changed().await.unwrap();
        let progress = matches!(
            &*updates.borrow_and_update(),
            visits::app::AppState::Initialized(s) if s.login_in_progress
        );
        if !progress {
            break;
        }
    }

    let state = app.shutdown().await.unwrap();
    assert!(state.session().is_none());
    assert_eq!(fakes.presenter.errors(), vec!["Invalid publishable key"]);
    assert_eq!(fakes.store.stored(), None);
}

#[tokio::test]
async fn test_deeplink_login_from_splash() {
    let fakes = Fakes::new(FakeAuth::default(), MemoryUserStore::default());
    let link = DeeplinkResult::from_url(
        "https://app.example/login?publishable_key=pk_link&email=linked%40example.com",
    );
    let app = boot(&fakes, Some(link)).await;

    let state = app
        .wait_for(|s| s.session().is_some())
        .await
        .unwrap();
    let session = state.session().unwrap();
    assert_eq!(session.publishable_key.as_str(), "pk_link");
    assert_eq!(
        session.user_data.email.as_deref(),
        Some("linked@example.com")
    );
    app.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_missing_deeplink_result_times_out_to_sign_in() {
    let fakes = Fakes::new(FakeAuth::default(), MemoryUserStore::default());
    let app = boot(&fakes, None).await;

    let state = app
        .wait_for(|s| s.view() == Some(&ViewState::SignIn))
        .await
        .unwrap();
    assert!(state.session().is_none());

    // The link showing up after the timeout is still honoured on sign-in.
    app.handle_action(AppAction::DeeplinkChecked(DeeplinkResult::from_url(
        "https://app.example/login?publishable_key=pk_late&driver_id=d-7",
    )))
    .unwrap();
    let state = app.wait_for(|s| s.session().is_some()).await.unwrap();
    assert_eq!(
        state.session().unwrap().user_data.driver_id.as_deref(),
        Some("d-7")
    );
    app.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_history_tab_loads_today_once() {
    let fakes = Fakes::new(
        FakeAuth::default(),
        MemoryUserStore::with_user(stored_user()),
    );
    let app = boot(&fakes, Some(DeeplinkResult::NoDeeplink)).await;
    app.wait_for(|s| s.view() == Some(&ViewState::Tabs(Tab::Map)))
        .await
        .unwrap();

    app.handle_action(AppAction::SelectTab(Tab::History)).unwrap();
    let state = app
        .wait_for(|s| {
            s.session()
                .and_then(|session| session.history.get(&today()))
                .is_some_and(|entry| entry.value().is_some())
        })
        .await
        .unwrap();
    assert_eq!(state.view(), Some(&ViewState::Tabs(Tab::History)));

    // Within the TTL: no second request.
    app.handle_action(AppAction::LoadHistory { day: today() })
        .unwrap();
    app.shutdown().await.unwrap();
    assert_eq!(*fakes.history.calls.lock(), vec![today()]);
}

#[tokio::test]
async fn test_sign_out_clears_store_and_tracking() {
    let fakes = Fakes::new(
        FakeAuth::default(),
        MemoryUserStore::with_user(stored_user()),
    );
    let app = boot(&fakes, Some(DeeplinkResult::NoDeeplink)).await;
    app.wait_for(|s| s.view() == Some(&ViewState::Tabs(Tab::Map)))
        .await
        .unwrap();

    app.handle_action(AppAction::SetTracking(true)).unwrap();
    app.wait_for(|s| {
        s.session()
            .is_some_and(|session| session.tracking == visits::app::model::TrackingState::Tracking)
    })
    .await
    .unwrap();
    assert!(fakes.tracker.tracked_device().is_some());

    app.handle_action(AppAction::SignOut).unwrap();
    app.wait_for(|s| s.view() == Some(&ViewState::SignIn))
        .await
        .unwrap();
    app.shutdown().await.unwrap();

    assert_eq!(fakes.store.load().unwrap(), None);
    assert_eq!(fakes.tracker.tracked_device(), None);
}

#[tokio::test(start_paused = true)]
async fn test_trips_refresh_on_timer() {
    let fakes = Fakes::new(
        FakeAuth::default(),
        MemoryUserStore::with_user(stored_user()),
    );
    let app = boot(&fakes, Some(DeeplinkResult::NoDeeplink)).await;
    app.wait_for(|s| s.session().is_some_and(|session| !session.trips.is_empty()))
        .await
        .unwrap();
    assert_eq!(*fakes.trips.calls.lock(), 1);

    tokio::time::sleep(Duration::from_secs(61)).await;
    for _ in 0..50 {
        if *fakes.trips.calls.lock() >= 2 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(*fakes.trips.calls.lock(), 2);
    app.shutdown().await.unwrap();
}
