use crate::config::{TWITCH_CLIENT_ID, TWITCH_CLIENT_SECRET};
use crate::models::StreamInfo;
use anyhow::Result;
use reqwest::Client;
use serde_json::Value;
use std::collections::HashSet;

/// Fetch a fresh app access token via the client-credentials grant. Tokens
/// are not cached between runs.
pub async fn fetch_access_token() -> Result<String> {
    let client = Client::new();
    let client_id = &*TWITCH_CLIENT_ID;
    let client_secret = &*TWITCH_CLIENT_SECRET;

    let url = format!(
        "https://id.twitch.tv/oauth2/token?client_id={client_id}&client_secret={client_secret}&grant_type=client_credentials"
    );

    let response = client.post(&url).send().await?.json::<Value>().await?;

    let token = response["access_token"]
        .as_str()
        .ok_or_else(|| anyhow::anyhow!("No access_token in credential response"))?;

    Ok(token.to_string())
}

/// Query the live status of all given handles in a single batched request.
/// Returns the raw stream objects reported as currently live.
///
/// The Helix API documents a cap on logins per request; handle lists here
/// stay far below it and the cap is not enforced.
pub async fn fetch_live_streams(token: &str, handles: &[String]) -> Result<Vec<Value>> {
    let client = Client::new();

    // https://dev.twitch.tv/docs/api/reference/#get-streams
    let url = format!(
        "https://api.twitch.tv/helix/streams?user_login={}",
        handles.join("&user_login=")
    );

    let response = client
        .get(&url)
        .header("Client-ID", &*TWITCH_CLIENT_ID)
        .header("Authorization", format!("Bearer {token}"))
        .send()
        .await?
        .json::<Value>()
        .await?;

    let streams = response["data"]
        .as_array()
        .ok_or_else(|| anyhow::anyhow!("Unexpected streams response shape"))?
        .clone();

    Ok(streams)
}

/// Lower-cased login names of every stream reported live.
pub fn live_handle_set(streams: &[Value]) -> HashSet<String> {
    streams
        .iter()
        .filter_map(|stream| stream["user_login"].as_str())
        .map(|login| login.to_lowercase())
        .collect()
}

pub fn map_stream_info(streams: &[Value]) -> Vec<StreamInfo> {
    streams
        .iter()
        .filter_map(|stream| {
            let user_login = stream["user_login"].as_str()?;
            Some(StreamInfo {
                user_name: stream["user_name"].as_str().unwrap_or(user_login).to_string(),
                title: stream["title"].as_str().unwrap_or("").to_string(),
                thumbnail: stream["thumbnail_url"]
                    .as_str()
                    .unwrap_or("")
                    .replace("{width}", "480")
                    .replace("{height}", "270"),
                url: format!("https://twitch.tv/{user_login}"),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn live_set_is_lowercased() {
        let streams = vec![
            json!({"user_login": "MaryyMme", "user_name": "MaryyMme"}),
            json!({"user_login": "foobar", "user_name": "FooBar"}),
        ];
        let set = live_handle_set(&streams);
        assert!(set.contains("maryymme"));
        assert!(set.contains("foobar"));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn stream_info_substitutes_thumbnail_size() {
        let streams = vec![json!({
            "user_login": "maryymme",
            "user_name": "maryymme",
            "title": "Noche de rol",
            "thumbnail_url": "https://cdn.example/{width}x{height}.jpg"
        })];
        let info = map_stream_info(&streams);
        assert_eq!(info[0].thumbnail, "https://cdn.example/480x270.jpg");
        assert_eq!(info[0].url, "https://twitch.tv/maryymme");
    }
}
