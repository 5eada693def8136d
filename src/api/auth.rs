use crate::config::STAFF_PIN;
use crate::models::{LoginRequest, LoginResponse};
use log::info;
use rocket::post;
use rocket::serde::json::Json;

#[post("/login", data = "<login_request>")]
pub async fn staff_login(login_request: Json<LoginRequest>) -> Json<LoginResponse> {
    if login_request.pin == *STAFF_PIN {
        info!("Staff login accepted.");
        Json(LoginResponse {
            success: true,
            message: "Acceso concedido".to_string(),
        })
    } else {
        info!("Staff login rejected.");
        Json(LoginResponse {
            success: false,
            message: "PIN incorrecto".to_string(),
        })
    }
}
