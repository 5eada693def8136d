use crate::models::StaffPin;
use crate::services::database::{create_db_pool, init_tables};
use crate::services::reconciler::setup_reconciler;
use crate::services::youtube::VideoCache;
use crate::AppState;
use anyhow::Result;
use env_logger::Builder;
use lazy_static::lazy_static;
use log::{info, LevelFilter};
use rocket::http::{Method, Status};
use rocket::request::{FromRequest, Outcome};
use rocket::Request;
use rocket_cors::{AllowedHeaders, AllowedOrigins, CorsOptions};
use std::env;
use std::sync::Arc;
use tokio::sync::Mutex;

lazy_static! {
    pub static ref DATABASE_URL: String =
        env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://panel.db?mode=rwc".to_string());
    pub static ref GAME_API_URL: String =
        env::var("GAME_API_URL").unwrap_or_else(|_| "http://185.230.55.63:4000".to_string());
    pub static ref TWITCH_CLIENT_ID: String =
        env::var("TWITCH_CLIENT_ID").expect("TWITCH_CLIENT_ID environment variable must be set");
    pub static ref TWITCH_CLIENT_SECRET: String = env::var("TWITCH_CLIENT_SECRET")
        .expect("TWITCH_CLIENT_SECRET environment variable must be set");
    pub static ref YOUTUBE_API_KEY: String =
        env::var("YOUTUBE_API_KEY").expect("YOUTUBE_API_KEY environment variable must be set");
    pub static ref YOUTUBE_CHANNELS: Vec<String> = env::var("YOUTUBE_CHANNELS")
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|channel| !channel.is_empty())
        .map(String::from)
        .collect();
    pub static ref VIDEO_KEYWORDS: Vec<String> = env::var("VIDEO_KEYWORDS")
        .unwrap_or_else(|_| "roleplay,rp".to_string())
        .split(',')
        .map(str::trim)
        .filter(|keyword| !keyword.is_empty())
        .map(|keyword| keyword.to_lowercase())
        .collect();
    pub static ref STAFF_PIN: String =
        env::var("STAFF_PIN").expect("STAFF_PIN environment variable must be set");
    pub static ref RECONCILE_SCHEDULE: String =
        env::var("RECONCILE_SCHEDULE").unwrap_or_else(|_| "0 */5 * * * *".to_string());
}

pub fn init_logger() {
    Builder::new().filter_level(LevelFilter::Info).init();
    info!("Starting panel-proxy backend...");
}

pub fn load_environment() {
    dotenv::dotenv().ok();
}

pub async fn create_app_state() -> Result<AppState> {
    let db = create_db_pool(&DATABASE_URL).await?;
    init_tables(&db).await?;

    let reconcile_guard = Arc::new(Mutex::new(()));
    let scheduler = setup_reconciler(db.clone(), reconcile_guard.clone()).await?;

    Ok(AppState {
        db,
        video_cache: Arc::new(VideoCache::new()),
        reconcile_guard,
        scheduler,
    })
}

pub fn create_cors() -> Result<rocket_cors::Cors> {
    let cors = CorsOptions::default()
        .allowed_origins(AllowedOrigins::all())
        .allowed_methods(
            vec![
                Method::Get,
                Method::Post,
                Method::Put,
                Method::Delete,
                Method::Options,
            ]
            .into_iter()
            .map(From::from)
            .collect(),
        )
        .allowed_headers(AllowedHeaders::some(&[
            "Accept",
            "Content-Type",
            "X-Staff-Pin",
        ]))
        .to_cors()
        .map_err(|e| anyhow::anyhow!("Failed to create CORS options: {}", e))?;

    Ok(cors)
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for StaffPin {
    type Error = &'static str;

    async fn from_request(request: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        match request.headers().get_one("X-Staff-Pin") {
            Some(pin) => {
                if pin == &*STAFF_PIN {
                    Outcome::Success(StaffPin(pin.to_string()))
                } else {
                    Outcome::Error((Status::Unauthorized, "Invalid PIN"))
                }
            }
            None => Outcome::Error((Status::Unauthorized, "Missing PIN")),
        }
    }
}
