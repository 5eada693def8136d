use crate::models::StreamInfo;
use crate::services::database::list_tracked_handles;
use crate::services::reconciler::run_reconcile;
use crate::services::twitch::{fetch_access_token, fetch_live_streams, map_stream_info};
use crate::AppState;
use log::{error, info};
use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::{get, post, State};

/// Streams currently live among the tracked streamers, mapped for the
/// dashboard.
#[get("/streams")]
pub async fn get_streams(state: &State<AppState>) -> Result<Json<Vec<StreamInfo>>, Status> {
    let handles = match list_tracked_handles(&state.db).await {
        Ok(handles) => handles,
        Err(e) => {
            error!("Failed to read tracked streamers: {e:?}");
            return Err(Status::InternalServerError);
        }
    };

    if handles.is_empty() {
        return Ok(Json(vec![]));
    }

    let token = match fetch_access_token().await {
        Ok(token) => token,
        Err(e) => {
            error!("Failed to fetch access token: {e:?}");
            return Err(Status::InternalServerError);
        }
    };

    match fetch_live_streams(&token, &handles).await {
        Ok(streams) => Ok(Json(map_stream_info(&streams))),
        Err(e) => {
            error!("Failed to fetch live streams: {e:?}");
            Err(Status::InternalServerError)
        }
    }
}

/// On-demand reconcile trigger. Shares the single-flight guard with the
/// scheduled run.
#[post("/streams/refresh")]
pub async fn refresh_streams(state: &State<AppState>) -> Result<Status, Status> {
    match run_reconcile(&state.db, &state.reconcile_guard).await {
        Ok(written) => {
            info!("Manual reconcile updated {written} streamers.");
            Ok(Status::Ok)
        }
        Err(e) => {
            error!("Manual reconcile failed: {e:?}");
            Err(Status::InternalServerError)
        }
    }
}
