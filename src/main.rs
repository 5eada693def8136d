#[macro_use]
extern crate rocket;

mod api;
mod config;
mod models;
mod services;
mod utils;

use services::youtube::VideoCache;
use sqlx::SqlitePool;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio_cron_scheduler::JobScheduler;

pub struct AppState {
    pub db: SqlitePool,
    pub video_cache: Arc<VideoCache>,
    pub reconcile_guard: Arc<Mutex<()>>,
    /// Held for the lifetime of the process; dropping it stops the cron jobs.
    pub scheduler: JobScheduler,
}

#[launch]
async fn rocket() -> _ {
    config::load_environment();
    config::init_logger();

    let state = config::create_app_state()
        .await
        .expect("Failed to initialize application state");
    let cors = config::create_cors().expect("Failed to create CORS options");

    rocket::build()
        .manage(state)
        .attach(cors)
        .mount("/", routes![api::get_players])
        .mount(
            "/api",
            routes![
                api::staff_login,
                api::get_streams,
                api::refresh_streams,
                api::get_videos,
                api::list_locales,
                api::create_locale,
                api::update_locale,
                api::delete_locale,
                api::list_streamers,
                api::create_streamer,
                api::update_streamer,
                api::delete_streamer,
            ],
        )
}
