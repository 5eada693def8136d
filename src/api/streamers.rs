use crate::models::{NewStreamer, StaffPin, Streamer};
use crate::services::database;
use crate::AppState;
use log::{error, info};
use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::{delete, get, post, put, State};

#[get("/streamers")]
pub async fn list_streamers(state: &State<AppState>) -> Result<Json<Vec<Streamer>>, Status> {
    match database::list_streamers(&state.db).await {
        Ok(streamers) => Ok(Json(streamers)),
        Err(e) => {
            error!("Failed to list streamers: {e:?}");
            Err(Status::InternalServerError)
        }
    }
}

#[post("/streamers", data = "<streamer>")]
pub async fn create_streamer(
    _pin: StaffPin,
    state: &State<AppState>,
    streamer: Json<NewStreamer>,
) -> Result<Status, Status> {
    match database::create_streamer(&state.db, &streamer).await {
        Ok(id) => {
            info!("Created streamer {id}: {}", streamer.user_name);
            Ok(Status::Created)
        }
        Err(e) => {
            error!("Failed to create streamer: {e:?}");
            Err(Status::InternalServerError)
        }
    }
}

#[put("/streamers/<id>", data = "<streamer>")]
pub async fn update_streamer(
    _pin: StaffPin,
    state: &State<AppState>,
    id: i64,
    streamer: Json<NewStreamer>,
) -> Result<Status, Status> {
    match database::update_streamer(&state.db, id, &streamer).await {
        Ok(true) => Ok(Status::Ok),
        Ok(false) => Err(Status::NotFound),
        Err(e) => {
            error!("Failed to update streamer {id}: {e:?}");
            Err(Status::InternalServerError)
        }
    }
}

#[delete("/streamers/<id>")]
pub async fn delete_streamer(
    _pin: StaffPin,
    state: &State<AppState>,
    id: i64,
) -> Result<Status, Status> {
    match database::delete_streamer(&state.db, id).await {
        Ok(true) => Ok(Status::Ok),
        Ok(false) => Err(Status::NotFound),
        Err(e) => {
            error!("Failed to delete streamer {id}: {e:?}");
            Err(Status::InternalServerError)
        }
    }
}
