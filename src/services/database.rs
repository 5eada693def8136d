use anyhow::Result;
use log::info;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;

use crate::models::{Locale, NewLocale, NewStreamer, Streamer};

pub async fn create_db_pool(database_url: &str) -> Result<SqlitePool> {
    info!("Connecting to database at: {database_url}");

    let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    Ok(pool)
}

pub async fn init_tables(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS locales (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            nombre TEXT NOT NULL,
            descripcion TEXT,
            imagen TEXT,
            estado BOOLEAN NOT NULL DEFAULT 1
        )",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS streamers (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_name TEXT NOT NULL UNIQUE,
            plataforma TEXT NOT NULL,
            url TEXT NOT NULL,
            discord_id TEXT,
            estado BOOLEAN NOT NULL DEFAULT 0,
            ultima_actualizacion TEXT
        )",
    )
    .execute(pool)
    .await?;

    info!("Database tables ready.");
    Ok(())
}

pub async fn list_locales(pool: &SqlitePool) -> Result<Vec<Locale>> {
    let locales = sqlx::query_as::<_, Locale>("SELECT * FROM locales ORDER BY id")
        .fetch_all(pool)
        .await?;
    Ok(locales)
}

pub async fn create_locale(pool: &SqlitePool, locale: &NewLocale) -> Result<i64> {
    let result = sqlx::query(
        "INSERT INTO locales (nombre, descripcion, imagen, estado) VALUES (?, ?, ?, ?)",
    )
    .bind(&locale.nombre)
    .bind(&locale.descripcion)
    .bind(&locale.imagen)
    .bind(locale.estado)
    .execute(pool)
    .await?;
    Ok(result.last_insert_rowid())
}

pub async fn update_locale(pool: &SqlitePool, id: i64, locale: &NewLocale) -> Result<bool> {
    let result = sqlx::query(
        "UPDATE locales SET nombre = ?, descripcion = ?, imagen = ?, estado = ? WHERE id = ?",
    )
    .bind(&locale.nombre)
    .bind(&locale.descripcion)
    .bind(&locale.imagen)
    .bind(locale.estado)
    .bind(id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn delete_locale(pool: &SqlitePool, id: i64) -> Result<bool> {
    let result = sqlx::query("DELETE FROM locales WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn list_streamers(pool: &SqlitePool) -> Result<Vec<Streamer>> {
    let streamers = sqlx::query_as::<_, Streamer>("SELECT * FROM streamers ORDER BY user_name")
        .fetch_all(pool)
        .await?;
    Ok(streamers)
}

/// Handles tracked on the streaming platform, in stable order.
pub async fn list_tracked_handles(pool: &SqlitePool) -> Result<Vec<String>> {
    let handles: Vec<(String,)> =
        sqlx::query_as("SELECT user_name FROM streamers WHERE plataforma = 'twitch' ORDER BY id")
            .fetch_all(pool)
            .await?;
    Ok(handles.into_iter().map(|(h,)| h).collect())
}

pub async fn create_streamer(pool: &SqlitePool, streamer: &NewStreamer) -> Result<i64> {
    let result = sqlx::query(
        "INSERT INTO streamers (user_name, plataforma, url, discord_id) VALUES (?, ?, ?, ?)",
    )
    .bind(&streamer.user_name)
    .bind(&streamer.plataforma)
    .bind(&streamer.url)
    .bind(&streamer.discord_id)
    .execute(pool)
    .await?;
    Ok(result.last_insert_rowid())
}

pub async fn update_streamer(pool: &SqlitePool, id: i64, streamer: &NewStreamer) -> Result<bool> {
    let result = sqlx::query(
        "UPDATE streamers SET user_name = ?, plataforma = ?, url = ?, discord_id = ? WHERE id = ?",
    )
    .bind(&streamer.user_name)
    .bind(&streamer.plataforma)
    .bind(&streamer.url)
    .bind(&streamer.discord_id)
    .bind(id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn delete_streamer(pool: &SqlitePool, id: i64) -> Result<bool> {
    let result = sqlx::query("DELETE FROM streamers WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Write the live flag and a fresh timestamp for one tracked handle.
pub async fn update_streamer_status(
    pool: &SqlitePool,
    user_name: &str,
    live: bool,
    timestamp: &str,
) -> Result<()> {
    sqlx::query("UPDATE streamers SET estado = ?, ultima_actualizacion = ? WHERE user_name = ?")
        .bind(live)
        .bind(timestamp)
        .bind(user_name)
        .execute(pool)
        .await?;
    Ok(())
}

#[cfg(test)]
pub async fn test_pool() -> SqlitePool {
    let pool = SqlitePool::connect("sqlite::memory:").await.unwrap();
    init_tables(&pool).await.unwrap();
    pool
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn locale_crud_roundtrip() {
        let pool = test_pool().await;

        let id = create_locale(
            &pool,
            &NewLocale {
                nombre: "Taller Los Santos".to_string(),
                descripcion: Some("Mecánica y tuning".to_string()),
                imagen: None,
                estado: true,
            },
        )
        .await
        .unwrap();

        let locales = list_locales(&pool).await.unwrap();
        assert_eq!(locales.len(), 1);
        assert_eq!(locales[0].nombre, "Taller Los Santos");

        let updated = update_locale(
            &pool,
            id,
            &NewLocale {
                nombre: "Taller Los Santos".to_string(),
                descripcion: None,
                imagen: None,
                estado: false,
            },
        )
        .await
        .unwrap();
        assert!(updated);
        assert!(!list_locales(&pool).await.unwrap()[0].estado);

        assert!(delete_locale(&pool, id).await.unwrap());
        assert!(list_locales(&pool).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn tracked_handles_only_include_twitch_rows() {
        let pool = test_pool().await;

        for (name, plataforma) in [("ana", "twitch"), ("ben", "kick"), ("carla", "twitch")] {
            create_streamer(
                &pool,
                &NewStreamer {
                    user_name: name.to_string(),
                    plataforma: plataforma.to_string(),
                    url: format!("https://example.com/{name}"),
                    discord_id: None,
                },
            )
            .await
            .unwrap();
        }

        let handles = list_tracked_handles(&pool).await.unwrap();
        assert_eq!(handles, vec!["ana".to_string(), "carla".to_string()]);
    }

    #[tokio::test]
    async fn status_update_writes_flag_and_timestamp() {
        let pool = test_pool().await;

        create_streamer(
            &pool,
            &NewStreamer {
                user_name: "maryymme".to_string(),
                plataforma: "twitch".to_string(),
                url: "https://twitch.tv/maryymme".to_string(),
                discord_id: None,
            },
        )
        .await
        .unwrap();

        update_streamer_status(&pool, "maryymme", true, "2025-01-01T00:00:00Z")
            .await
            .unwrap();

        let streamers = list_streamers(&pool).await.unwrap();
        assert!(streamers[0].estado);
        assert_eq!(
            streamers[0].ultima_actualizacion.as_deref(),
            Some("2025-01-01T00:00:00Z")
        );
    }
}
