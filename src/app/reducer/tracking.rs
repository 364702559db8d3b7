use crate::app::action::AppAction;
use crate::app::effect::AppEffect;
use crate::app::model::TrackingState;
use crate::app::state::UserSession;
use crate::mvi::{IllegalActionError, ReducerResult};

pub const PERMISSIONS_DENIED_MESSAGE: &str = "Location permissions are required to track visits";

pub struct TrackingReducer;

impl TrackingReducer {
    pub fn reduce(
        &self,
        action: AppAction,
        session: &UserSession,
    ) -> Result<ReducerResult<UserSession, AppEffect>, IllegalActionError> {
        match action {
            AppAction::SetTracking(enabled) => Ok(ReducerResult::with_effect(
                session.clone(),
                AppEffect::SetTracking {
                    device_id: session.device_id.clone(),
                    enabled,
                },
            )),
            AppAction::TrackingStateChanged(tracking) => {
                let mut next = session.clone();
                next.tracking = tracking;
                let result = ReducerResult::new(next);
                if tracking == TrackingState::PermissionsDenied
                    && session.tracking != TrackingState::PermissionsDenied
                {
                    Ok(result.and([AppEffect::ShowError(PERMISSIONS_DENIED_MESSAGE.to_string())]))
                } else {
                    Ok(result)
                }
            }
            other => Err(IllegalActionError::new(&other, session)),
        }
    }
}
