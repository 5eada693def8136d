use crate::config::GAME_API_URL;
use crate::models::ErrorResponse;
use log::error;
use reqwest::Client;
use rocket::get;
use rocket::serde::json::Json;
use serde_json::Value;

/// Passthrough to the game-server player list.
#[get("/players")]
pub async fn get_players() -> Result<Json<Value>, ErrorResponse> {
    let client = Client::new();
    let url = format!("{}/players", &*GAME_API_URL);

    match client.get(&url).send().await {
        Ok(response) => match response.json::<Value>().await {
            Ok(players) => Ok(Json(players)),
            Err(e) => {
                error!("Failed to parse player list: {e:?}");
                Err(ErrorResponse {
                    error: "upstream".to_string(),
                    message: "No se pudo obtener la respuesta de la API".to_string(),
                })
            }
        },
        Err(e) => {
            error!("Failed to reach game server API: {e:?}");
            Err(ErrorResponse {
                error: "upstream".to_string(),
                message: "No se pudo obtener la respuesta de la API".to_string(),
            })
        }
    }
}
