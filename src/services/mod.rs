pub mod database;
pub mod reconciler;
pub mod twitch;
pub mod youtube;
