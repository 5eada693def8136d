pub mod auth;
pub mod locales;
pub mod players;
pub mod streamers;
pub mod streams;
pub mod videos;

pub use auth::*;
pub use locales::*;
pub use players::*;
pub use streamers::*;
pub use streams::*;
pub use videos::*;
