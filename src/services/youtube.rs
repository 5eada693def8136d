use crate::config::{VIDEO_KEYWORDS, YOUTUBE_API_KEY, YOUTUBE_CHANNELS};
use crate::models::VideoItem;
use crate::utils::parse_iso8601_duration_to_seconds;
use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use log::info;
use reqwest::Client;
use serde_json::Value;
use std::collections::HashMap;
use std::future::Future;
use tokio::sync::{Mutex, RwLock};

/// Result cap for one aggregated listing.
const MAX_VIDEOS: usize = 15;

/// Shorter uploads are treated as clips and excluded. Inclusive floor.
const MIN_DURATION_SECS: i64 = 180;

const CACHE_TTL_HOURS: i64 = 3;

const PLAYLIST_FETCH_SIZE: u32 = 50;

struct CacheSnapshot {
    last_updated: Option<DateTime<Utc>>,
    videos: Vec<VideoItem>,
}

/// Process-wide cache for the aggregated video listing. The snapshot is only
/// ever replaced wholesale under the write lock; readers see either the old
/// or the new listing, never a mix.
pub struct VideoCache {
    snapshot: RwLock<CacheSnapshot>,
    refresh_guard: Mutex<()>,
}

impl Default for VideoCache {
    fn default() -> Self {
        Self::new()
    }
}

impl VideoCache {
    pub fn new() -> Self {
        VideoCache {
            snapshot: RwLock::new(CacheSnapshot {
                last_updated: None,
                videos: Vec::new(),
            }),
            refresh_guard: Mutex::new(()),
        }
    }

    /// The cached listing, if non-empty and younger than the TTL.
    pub async fn fresh_snapshot(&self) -> Option<Vec<VideoItem>> {
        let snapshot = self.snapshot.read().await;
        let last_updated = snapshot.last_updated?;
        if snapshot.videos.is_empty() {
            return None;
        }
        if Utc::now() - last_updated < Duration::hours(CACHE_TTL_HOURS) {
            Some(snapshot.videos.clone())
        } else {
            None
        }
    }

    pub async fn replace(&self, videos: Vec<VideoItem>) {
        let mut snapshot = self.snapshot.write().await;
        snapshot.videos = videos;
        snapshot.last_updated = Some(Utc::now());
    }

    pub async fn contents(&self) -> Vec<VideoItem> {
        self.snapshot.read().await.videos.clone()
    }

    #[cfg(test)]
    async fn last_updated(&self) -> Option<DateTime<Utc>> {
        self.snapshot.read().await.last_updated
    }

    #[cfg(test)]
    async fn backdate(&self, hours: i64) {
        let mut snapshot = self.snapshot.write().await;
        if let Some(ts) = snapshot.last_updated {
            snapshot.last_updated = Some(ts - Duration::hours(hours));
        }
    }
}

struct Upload {
    video_id: String,
    title: String,
    position: usize,
}

/// Serve the cached listing when fresh, otherwise refresh it. Concurrent
/// callers queue on the refresh guard; whoever arrives after a completed
/// refresh picks up the new snapshot instead of repeating the upstream work.
pub async fn get_videos(cache: &VideoCache) -> Result<Vec<VideoItem>> {
    get_videos_with(cache, refresh_videos()).await
}

async fn get_videos_with<F>(cache: &VideoCache, refresh: F) -> Result<Vec<VideoItem>>
where
    F: Future<Output = Result<Vec<VideoItem>>>,
{
    if let Some(videos) = cache.fresh_snapshot().await {
        return Ok(videos);
    }

    let _held = cache.refresh_guard.lock().await;
    if let Some(videos) = cache.fresh_snapshot().await {
        return Ok(videos);
    }

    let videos = refresh.await?;
    cache.replace(videos.clone()).await;
    Ok(videos)
}

/// Fetch, filter and merge recent uploads from every configured channel.
/// Any failed upstream call aborts the whole refresh; accumulated partial
/// results are discarded.
async fn refresh_videos() -> Result<Vec<VideoItem>> {
    info!("Refreshing video listing from YouTube...");

    let mut accumulated: Vec<VideoItem> = Vec::new();

    for channel_id in YOUTUBE_CHANNELS.iter() {
        let playlist_id = match get_uploads_playlist_id(channel_id).await? {
            Some(id) => id,
            None => {
                info!("Channel {channel_id} has no uploads playlist, skipping.");
                continue;
            }
        };

        let uploads = fetch_recent_uploads(&playlist_id).await?;
        let matching: Vec<Upload> = uploads
            .into_iter()
            .filter(|upload| title_matches(&upload.title, &VIDEO_KEYWORDS))
            .collect();

        if matching.is_empty() {
            continue;
        }

        let ids: Vec<String> = matching.iter().map(|u| u.video_id.clone()).collect();
        let durations = fetch_durations(&ids).await?;

        for upload in matching {
            let seconds = durations.get(&upload.video_id).copied().unwrap_or(0);
            if meets_duration_floor(seconds) {
                accumulated.push(VideoItem {
                    channel_id: channel_id.clone(),
                    video_id: upload.video_id,
                    title: upload.title,
                    position: upload.position,
                });
            }
        }
    }

    let merged = interleave_round_robin(accumulated, MAX_VIDEOS);
    info!("Video refresh produced {} items.", merged.len());
    Ok(merged)
}

pub fn title_matches(title: &str, keywords: &[String]) -> bool {
    let title = title.to_lowercase();
    keywords.iter().any(|keyword| title.contains(keyword))
}

pub fn meets_duration_floor(seconds: i64) -> bool {
    seconds >= MIN_DURATION_SECS
}

/// Group by source channel and take one item from each group in turn until
/// the cap is reached or every group is exhausted, so no single channel
/// dominates the listing.
pub fn interleave_round_robin(candidates: Vec<VideoItem>, cap: usize) -> Vec<VideoItem> {
    let mut groups: Vec<(String, std::collections::VecDeque<VideoItem>)> = Vec::new();

    for candidate in candidates {
        match groups.iter_mut().find(|(id, _)| *id == candidate.channel_id) {
            Some((_, group)) => group.push_back(candidate),
            None => {
                let channel_id = candidate.channel_id.clone();
                groups.push((channel_id, std::collections::VecDeque::from([candidate])));
            }
        }
    }

    let mut merged = Vec::new();
    while merged.len() < cap {
        let mut took_any = false;
        for (_, group) in groups.iter_mut() {
            if let Some(item) = group.pop_front() {
                merged.push(item);
                took_any = true;
                if merged.len() >= cap {
                    break;
                }
            }
        }
        if !took_any {
            break;
        }
    }
    merged
}

// returns the uploads playlist of the channel, or None when the API knows
// nothing about the given id
async fn get_uploads_playlist_id(channel_id: &str) -> Result<Option<String>> {
    let client = Client::new();
    let api_key = &*YOUTUBE_API_KEY;

    let url = format!(
        "https://www.googleapis.com/youtube/v3/channels?id={channel_id}&key={api_key}&part=contentDetails"
    );

    let response = client.get(&url).send().await?.json::<Value>().await?;

    Ok(
        response["items"][0]["contentDetails"]["relatedPlaylists"]["uploads"]
            .as_str()
            .map(String::from),
    )
}

async fn fetch_recent_uploads(playlist_id: &str) -> Result<Vec<Upload>> {
    let client = Client::new();
    let api_key = &*YOUTUBE_API_KEY;

    // https://developers.google.com/youtube/v3/docs/playlistItems
    let url = format!(
        "https://www.googleapis.com/youtube/v3/playlistItems?playlistId={playlist_id}&key={api_key}&part=snippet&maxResults={PLAYLIST_FETCH_SIZE}"
    );

    let response = client.get(&url).send().await?.json::<Value>().await?;

    let mut uploads = Vec::new();
    if let Some(items) = response["items"].as_array() {
        for (position, item) in items.iter().enumerate() {
            if let Some(video_id) = item["snippet"]["resourceId"]["videoId"].as_str() {
                uploads.push(Upload {
                    video_id: video_id.to_string(),
                    title: item["snippet"]["title"].as_str().unwrap_or("").to_string(),
                    position,
                });
            }
        }
    }

    Ok(uploads)
}

/// Duration metadata for a batch of video ids in one call, in total seconds.
async fn fetch_durations(video_ids: &[String]) -> Result<HashMap<String, i64>> {
    let client = Client::new();
    let api_key = &*YOUTUBE_API_KEY;

    let url = format!(
        "https://www.googleapis.com/youtube/v3/videos?id={}&key={api_key}&part=contentDetails",
        video_ids.join(",")
    );

    let response = client.get(&url).send().await?.json::<Value>().await?;

    let mut durations = HashMap::new();
    if let Some(items) = response["items"].as_array() {
        for item in items {
            if let Some(id) = item["id"].as_str() {
                let duration = item["contentDetails"]["duration"].as_str().unwrap_or("");
                durations.insert(id.to_string(), parse_iso8601_duration_to_seconds(duration));
            }
        }
    }

    Ok(durations)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(channel: &str, video: &str, position: usize) -> VideoItem {
        VideoItem {
            channel_id: channel.to_string(),
            video_id: video.to_string(),
            title: format!("{video} roleplay"),
            position,
        }
    }

    #[test]
    fn keyword_filter_is_case_insensitive() {
        let keywords = vec!["roleplay".to_string(), "rp".to_string()];
        assert!(title_matches("Gran ROLEPLAY en la ciudad", &keywords));
        assert!(title_matches("Mejores momentos RP", &keywords));
        assert!(!title_matches("Tutorial de Minecraft", &keywords));
    }

    #[test]
    fn duration_floor_is_inclusive() {
        assert!(!meets_duration_floor(179));
        assert!(meets_duration_floor(180));
    }

    #[test]
    fn round_robin_interleaves_fairly() {
        let mut candidates = Vec::new();
        for i in 0..10 {
            candidates.push(item("A", &format!("a{i}"), i));
        }
        for i in 0..2 {
            candidates.push(item("B", &format!("b{i}"), i));
        }

        let merged = interleave_round_robin(candidates, 5);

        let order: Vec<&str> = merged.iter().map(|v| v.channel_id.as_str()).collect();
        assert_eq!(order, vec!["A", "B", "A", "B", "A"]);
        assert_eq!(merged.iter().filter(|v| v.channel_id == "B").count(), 2);
    }

    #[test]
    fn round_robin_stops_when_groups_are_exhausted() {
        let candidates = vec![item("A", "a0", 0), item("B", "b0", 0)];
        let merged = interleave_round_robin(candidates, MAX_VIDEOS);
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn round_robin_caps_at_limit() {
        let candidates: Vec<VideoItem> =
            (0..40).map(|i| item("A", &format!("a{i}"), i)).collect();
        let merged = interleave_round_robin(candidates, MAX_VIDEOS);
        assert_eq!(merged.len(), MAX_VIDEOS);
    }

    #[tokio::test]
    async fn fresh_snapshot_respects_ttl() {
        let cache = VideoCache::new();
        assert!(cache.fresh_snapshot().await.is_none());

        cache.replace(vec![item("A", "a0", 0)]).await;
        let fresh = cache.fresh_snapshot().await.unwrap();
        assert_eq!(fresh.len(), 1);

        cache.backdate(CACHE_TTL_HOURS + 1).await;
        assert!(cache.fresh_snapshot().await.is_none());
    }

    #[tokio::test]
    async fn empty_listing_is_never_served_as_fresh() {
        let cache = VideoCache::new();
        cache.replace(Vec::new()).await;
        assert!(cache.fresh_snapshot().await.is_none());
    }

    // No channels are configured under test, so a refresh would replace the
    // listing with an empty one. A fresh cache must short-circuit first.
    #[tokio::test]
    async fn fresh_cache_serves_reads_without_refreshing() {
        let cache = VideoCache::new();
        cache.replace(vec![item("A", "a0", 0)]).await;

        let first = get_videos(&cache).await.unwrap();
        let second = get_videos(&cache).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn failed_refresh_leaves_the_cache_untouched() {
        let cache = VideoCache::new();
        cache.replace(vec![item("A", "a0", 0)]).await;
        cache.backdate(CACHE_TTL_HOURS + 1).await;

        let items_before = cache.contents().await;
        let stamp_before = cache.last_updated().await;

        let result =
            get_videos_with(&cache, async { Err(anyhow::anyhow!("upstream unreachable")) }).await;
        assert!(result.is_err());

        assert_eq!(cache.contents().await, items_before);
        assert_eq!(cache.last_updated().await, stamp_before);
    }

    #[tokio::test]
    async fn queued_caller_shares_the_completed_refresh() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        use std::sync::Arc;
        use tokio::sync::Notify;

        let cache = Arc::new(VideoCache::new());
        cache.replace(vec![item("old", "o0", 0)]).await;
        cache.backdate(CACHE_TTL_HOURS + 1).await;

        let refresh_started = Arc::new(Notify::new());
        let gate = Arc::new(Notify::new());

        let first = {
            let cache = cache.clone();
            let refresh_started = refresh_started.clone();
            let gate = gate.clone();
            tokio::spawn(async move {
                get_videos_with(&cache, async {
                    refresh_started.notify_one();
                    gate.notified().await;
                    Ok(vec![item("A", "a0", 0)])
                })
                .await
            })
        };

        // first caller is inside its refresh and holds the guard
        refresh_started.notified().await;

        let second_refreshes = Arc::new(AtomicUsize::new(0));
        let second = {
            let cache = cache.clone();
            let second_refreshes = second_refreshes.clone();
            tokio::spawn(async move {
                get_videos_with(&cache, async {
                    second_refreshes.fetch_add(1, Ordering::SeqCst);
                    Ok(vec![item("B", "b0", 0)])
                })
                .await
            })
        };

        tokio::task::yield_now().await;
        gate.notify_one();

        let first = first.await.unwrap().unwrap();
        let second = second.await.unwrap().unwrap();

        assert_eq!(first[0].channel_id, "A");
        assert_eq!(second, first);
        assert_eq!(second_refreshes.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn replace_swaps_the_whole_snapshot() {
        let cache = VideoCache::new();
        cache.replace(vec![item("A", "a0", 0), item("A", "a1", 1)]).await;
        cache.replace(vec![item("B", "b0", 0)]).await;

        let contents = cache.contents().await;
        assert_eq!(contents.len(), 1);
        assert_eq!(contents[0].channel_id, "B");
    }
}
