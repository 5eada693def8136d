use rocket::http::{ContentType, Status};
use rocket::request::Request;
use rocket::response::Responder;
use rocket::serde::{Deserialize, Serialize};
use rocket::{response, Response};
use std::io::Cursor;

#[derive(Debug, Serialize, Deserialize)]
pub struct StaffPin(pub String);

#[derive(Serialize, Deserialize)]
pub struct LoginRequest {
    pub pin: String,
}

#[derive(Serialize, Deserialize)]
pub struct LoginResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Streamer {
    pub id: i64,
    pub user_name: String,
    pub plataforma: String,
    pub url: String,
    pub discord_id: Option<String>,
    pub estado: bool,
    pub ultima_actualizacion: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct NewStreamer {
    pub user_name: String,
    pub plataforma: String,
    pub url: String,
    pub discord_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Locale {
    pub id: i64,
    pub nombre: String,
    pub descripcion: Option<String>,
    pub imagen: Option<String>,
    pub estado: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct NewLocale {
    pub nombre: String,
    pub descripcion: Option<String>,
    pub imagen: Option<String>,
    pub estado: bool,
}

/// A live stream as reported by the streaming platform, already mapped for
/// the dashboard frontend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamInfo {
    pub user_name: String,
    pub title: String,
    pub thumbnail: String,
    pub url: String,
}

/// One accepted promotional video in the aggregated listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoItem {
    pub channel_id: String,
    pub video_id: String,
    pub title: String,
    pub position: usize,
}

#[derive(Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl<'r> Responder<'r, 'static> for ErrorResponse {
    fn respond_to(self, _: &'r Request<'_>) -> response::Result<'static> {
        let json = serde_json::to_string(&self).unwrap();
        Response::build()
            .status(Status::InternalServerError)
            .header(ContentType::JSON)
            .sized_body(json.len(), Cursor::new(json))
            .ok()
    }
}
