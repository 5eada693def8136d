use crate::models::{Locale, NewLocale, StaffPin};
use crate::services::database;
use crate::AppState;
use log::{error, info};
use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::{delete, get, post, put, State};

#[get("/locales")]
pub async fn list_locales(state: &State<AppState>) -> Result<Json<Vec<Locale>>, Status> {
    match database::list_locales(&state.db).await {
        Ok(locales) => Ok(Json(locales)),
        Err(e) => {
            error!("Failed to list locales: {e:?}");
            Err(Status::InternalServerError)
        }
    }
}

#[post("/locales", data = "<locale>")]
pub async fn create_locale(
    _pin: StaffPin,
    state: &State<AppState>,
    locale: Json<NewLocale>,
) -> Result<Status, Status> {
    match database::create_locale(&state.db, &locale).await {
        Ok(id) => {
            info!("Created locale {id}: {}", locale.nombre);
            Ok(Status::Created)
        }
        Err(e) => {
            error!("Failed to create locale: {e:?}");
            Err(Status::InternalServerError)
        }
    }
}

#[put("/locales/<id>", data = "<locale>")]
pub async fn update_locale(
    _pin: StaffPin,
    state: &State<AppState>,
    id: i64,
    locale: Json<NewLocale>,
) -> Result<Status, Status> {
    match database::update_locale(&state.db, id, &locale).await {
        Ok(true) => Ok(Status::Ok),
        Ok(false) => Err(Status::NotFound),
        Err(e) => {
            error!("Failed to update locale {id}: {e:?}");
            Err(Status::InternalServerError)
        }
    }
}

#[delete("/locales/<id>")]
pub async fn delete_locale(
    _pin: StaffPin,
    state: &State<AppState>,
    id: i64,
) -> Result<Status, Status> {
    match database::delete_locale(&state.db, id).await {
        Ok(true) => Ok(Status::Ok),
        Ok(false) => Err(Status::NotFound),
        Err(e) => {
            error!("Failed to delete locale {id}: {e:?}");
            Err(Status::InternalServerError)
        }
    }
}
