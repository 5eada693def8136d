use crate::models::VideoItem;
use crate::services::youtube;
use crate::AppState;
use log::error;
use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::{get, State};

/// The aggregated promotional video listing, served from cache when fresh.
#[get("/videos")]
pub async fn get_videos(state: &State<AppState>) -> Result<Json<Vec<VideoItem>>, Status> {
    match youtube::get_videos(&state.video_cache).await {
        Ok(videos) => Ok(Json(videos)),
        Err(e) => {
            error!("Failed to aggregate videos: {e:?}");
            Err(Status::InternalServerError)
        }
    }
}
