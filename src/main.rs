use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use chrono::NaiveDate;
use clap::Parser;

use visits::api::ApiClient;
use visits::app::model::{LoginRequest, PublishableKey, UserData};
use visits::app::services::{ConsolePresenter, LocalTracker, TracingReporter};
use visits::app::{
    AppAction, AppInteractor, AppState, DeeplinkResult, Services, SystemClock, Tab, ViewState,
};
use visits::config::Config;
use visits::logging::init_tracing;
use visits::store::FileUserStore;

#[derive(Parser, Debug)]
#[command(name = "visits", version, about = "Field visits tracking client")]
struct Cli {
    /// Config file (default: <config_dir>/visits/config.toml)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Deep link the app was opened with
    #[arg(long, value_name = "URL")]
    deeplink: Option<String>,

    /// Sign in with a publishable key
    #[arg(long, value_name = "KEY", requires = "email")]
    publishable_key: Option<String>,

    /// Driver email used with --publishable-key
    #[arg(long, value_name = "EMAIL", requires = "publishable_key")]
    email: Option<String>,

    /// Show history for a day
    #[arg(long, value_name = "YYYY-MM-DD")]
    history_day: Option<NaiveDate>,

    /// Sign out before exiting
    #[arg(long)]
    sign_out: bool,
}

fn login_in_progress(state: &AppState) -> bool {
    matches!(state, AppState::Initialized(s) if s.login_in_progress)
}

fn settled(state: &AppState) -> bool {
    !login_in_progress(state) && matches!(state.view(), Some(view) if *view != ViewState::Splash)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let config = match &cli.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
    .context("loading configuration")?;

    let api = Arc::new(
        ApiClient::new(&config.api.base_url, config.api_timeout())
            .context("creating API client")?,
    );
    let services = Services {
        auth: api.clone(),
        history: api.clone(),
        trips: api,
        tracking: Arc::new(LocalTracker::default()),
        store: Arc::new(FileUserStore::new(FileUserStore::default_path())),
        presenter: Arc::new(ConsolePresenter),
        reporter: Arc::new(TracingReporter),
    };

    let interactor = AppInteractor::start(
        config.reducer_config(),
        config.illegal_action_policy(),
        Arc::new(SystemClock),
        services.clone(),
    );

    interactor.launch(&services).await?;
    interactor.handle_action(AppAction::SplashScreenShown)?;
    let deeplink = cli
        .deeplink
        .as_deref()
        .map_or(DeeplinkResult::NoDeeplink, DeeplinkResult::from_url);
    interactor.handle_action(AppAction::DeeplinkChecked(deeplink))?;
    let mut state = interactor.wait_for(settled).await?;

    if let (Some(key), Some(email)) = (cli.publishable_key, cli.email) {
        if state.session().is_none() {
            let mut updates = interactor.subscribe();
            updates.borrow_and_update();
            interactor.handle_action(AppAction::InitiateLogin(LoginRequest::PublishableKey {
                key: PublishableKey(key),
                user_data: UserData::with_email(email),
            }))?;
            // The first change is the login starting; intermediate values may
            // be coalesced, so only the latest one counts.
            loop {
                updates.changed().await.context("state machine stopped")?;
                let current = updates.borrow_and_update().clone();
                if !login_in_progress(&current) {
                    state = current;
                    break;
                }
            }
        }
    }

    if state.session().is_some() {
        if let Some(day) = cli.history_day {
            interactor.handle_action(AppAction::SelectTab(Tab::History))?;
            interactor.handle_action(AppAction::LoadHistory { day })?;
            state = interactor
                .wait_for(|s| {
                    s.session()
                        .and_then(|session| session.history.get(&day))
                        .is_some_and(|entry| !entry.is_loading())
                })
                .await?;
            if let Some(history) = state
                .session()
                .and_then(|session| session.history.get(&day))
                .and_then(|entry| entry.value())
            {
                println!(
                    "{}: {} visits, {:.1} km, {} min driving",
                    history.day,
                    history.visits.len(),
                    history.total_distance_m as f64 / 1000.0,
                    history.drive_duration_s / 60
                );
            }
        }

        if cli.sign_out {
            interactor.handle_action(AppAction::SignOut)?;
            interactor
                .wait_for(|s| s.session().is_none())
                .await?;
        }
    }

    let final_state = interactor.shutdown().await?;
    tracing::info!(
        signed_in = final_state.session().is_some(),
        "session finished"
    );
    Ok(())
}
