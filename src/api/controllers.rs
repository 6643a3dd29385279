use axum::extract::{Extension, Path, Query};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{NaiveDateTime, Utc};
use crate::api::{ApiContext, ApiError, Result};
use crate::entities::*;
use crate::liveness::{effective_status, EffectiveStatus};
use crate::playback::resolve_playback;

pub fn router() -> Router {
    Router::new()
        .route("/api/ping", get(ping))
        .route("/api/content", get(list_content).post(create_content))
        .route("/api/content/:content_id", get(get_content).put(update_content).delete(delete_content))
        .route("/api/playlists", get(list_playlists).post(create_playlist))
        .route("/api/playlists/:playlist_id", get(get_playlist).put(update_playlist).delete(delete_playlist))
        .route("/api/devices", get(list_devices).post(register_device))
        .route("/api/devices/:device_id", get(get_device).put(update_device).delete(delete_device))
        .route("/api/devices/:device_id/heartbeat", post(heartbeat))
        .route("/api/devices/:device_id/playback", get(get_device_playback))
        .route("/api/devices/:device_id/status", get(get_device_status))
}

async fn ping() -> String {
    "pong".to_string()
}

// ---- content items ----

async fn list_content(ctx: Extension<ApiContext>) -> Result<Json<Vec<ContentItem>>> {
    let client = ctx.client.read().await;
    Ok(Json(client.list_content()))
}

async fn create_content(
    ctx: Extension<ApiContext>,
    Json(draft): Json<ContentDraft>,
) -> Result<Json<ContentItem>> {
    let mut client = ctx.client.write().await;
    let content = client.create_content(draft).await?;
    Ok(Json(content))
}

async fn get_content(
    ctx: Extension<ApiContext>,
    Path(content_id): Path<String>,
) -> Result<Json<ContentItem>> {
    let client = ctx.client.read().await;
    let content = client.get_content(&content_id).ok_or(ApiError::NotFound)?;
    Ok(Json(content))
}

async fn update_content(
    ctx: Extension<ApiContext>,
    Path(content_id): Path<String>,
    Json(patch): Json<ContentPatch>,
) -> Result<Json<ContentItem>> {
    let mut client = ctx.client.write().await;
    let content = client.update_content(&content_id, patch).await?;
    Ok(Json(content))
}

async fn delete_content(
    ctx: Extension<ApiContext>,
    Path(content_id): Path<String>,
) -> Result<Json<ContentItem>> {
    let mut client = ctx.client.write().await;
    let content = client.delete_content(&content_id).await?;
    Ok(Json(content))
}

// ---- playlists ----

async fn list_playlists(ctx: Extension<ApiContext>) -> Result<Json<Vec<PlaylistWithItems>>> {
    let client = ctx.client.read().await;
    Ok(Json(client.list_playlists()))
}

async fn create_playlist(
    ctx: Extension<ApiContext>,
    Json(draft): Json<PlaylistDraft>,
) -> Result<Json<Playlist>> {
    let mut client = ctx.client.write().await;
    let playlist = client.create_playlist(draft).await?;
    Ok(Json(playlist))
}

async fn get_playlist(
    ctx: Extension<ApiContext>,
    Path(playlist_id): Path<String>,
) -> Result<Json<PlaylistWithItems>> {
    let client = ctx.client.read().await;
    let playlist = client.get_playlist_with_items(&playlist_id).ok_or(ApiError::NotFound)?;
    Ok(Json(playlist))
}

async fn update_playlist(
    ctx: Extension<ApiContext>,
    Path(playlist_id): Path<String>,
    Json(draft): Json<PlaylistDraft>,
) -> Result<Json<Playlist>> {
    let mut client = ctx.client.write().await;
    let playlist = client.update_playlist(&playlist_id, draft).await?;
    Ok(Json(playlist))
}

async fn delete_playlist(
    ctx: Extension<ApiContext>,
    Path(playlist_id): Path<String>,
) -> Result<Json<Playlist>> {
    let mut client = ctx.client.write().await;
    let playlist = client.delete_playlist(&playlist_id).await?;
    Ok(Json(playlist))
}

// ---- devices ----

#[derive(serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct DeviceResponse {
    #[serde(flatten)]
    device: DisplayDevice,
    effective_status: EffectiveStatus,
}

impl DeviceResponse {
    fn new(device: DisplayDevice, ctx: &ApiContext) -> Self {
        let effective_status = effective_status(device.status, device.last_seen, Utc::now(), ctx.cfg.heartbeat_timeout);
        Self { device, effective_status }
    }
}

async fn list_devices(ctx: Extension<ApiContext>) -> Result<Json<Vec<DeviceResponse>>> {
    let client = ctx.client.read().await;
    let devices = client.list_devices().into_iter()
        .map(|device| DeviceResponse::new(device, &ctx))
        .collect();
    Ok(Json(devices))
}

async fn register_device(
    ctx: Extension<ApiContext>,
    Json(registration): Json<DeviceRegistration>,
) -> Result<Json<DeviceResponse>> {
    let mut client = ctx.client.write().await;
    let device = client.register_device(registration).await?;
    Ok(Json(DeviceResponse::new(device, &ctx)))
}

async fn get_device(
    ctx: Extension<ApiContext>,
    Path(device_id): Path<String>,
) -> Result<Json<DeviceResponse>> {
    let client = ctx.client.read().await;
    let device = client.get_device(&device_id).ok_or(ApiError::NotFound)?;
    Ok(Json(DeviceResponse::new(device, &ctx)))
}

async fn update_device(
    ctx: Extension<ApiContext>,
    Path(device_id): Path<String>,
    Json(update): Json<DeviceUpdate>,
) -> Result<Json<DeviceResponse>> {
    let mut client = ctx.client.write().await;
    let device = client.update_device(&device_id, update).await?;
    Ok(Json(DeviceResponse::new(device, &ctx)))
}

async fn delete_device(
    ctx: Extension<ApiContext>,
    Path(device_id): Path<String>,
) -> Result<Json<DeviceResponse>> {
    let mut client = ctx.client.write().await;
    let device = client.delete_device(&device_id).await?;
    Ok(Json(DeviceResponse::new(device, &ctx)))
}

async fn heartbeat(
    ctx: Extension<ApiContext>,
    Path(device_id): Path<String>,
) -> Result<Json<DeviceResponse>> {
    let mut client = ctx.client.write().await;
    let device = client.heartbeat(&device_id).await?;
    Ok(Json(DeviceResponse::new(device, &ctx)))
}

// ---- playback and liveness polling ----

#[derive(serde::Deserialize, Debug, Default)]
struct PlaybackQuery {
    /// Reference instant in the device's local time; defaults to server-local
    /// now. Exposed mainly so display clients and tests behave
    /// deterministically.
    at: Option<NaiveDateTime>,
}

#[derive(serde::Serialize)]
struct PlaybackResponse {
    playlist: Option<PlaylistWithItems>,
}

async fn get_device_playback(
    ctx: Extension<ApiContext>,
    Path(device_id): Path<String>,
    Query(query): Query<PlaybackQuery>,
) -> Result<Json<PlaybackResponse>> {
    let client = ctx.client.read().await;
    let device = client.get_device(&device_id).ok_or(ApiError::NotFound)?;
    let at = query.at.unwrap_or_else(|| chrono::Local::now().naive_local());
    // a resolved id whose playlist has since emptied still answers with the
    // (empty) projection; the display renders "no content" either way
    let playlist = resolve_playback(&device, at)
        .and_then(|playlist_id| client.get_playlist_with_items(&playlist_id));
    Ok(Json(PlaybackResponse { playlist }))
}

#[derive(serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct StatusResponse {
    effective_status: EffectiveStatus,
}

async fn get_device_status(
    ctx: Extension<ApiContext>,
    Path(device_id): Path<String>,
) -> Result<Json<StatusResponse>> {
    let client = ctx.client.read().await;
    let device = client.get_device(&device_id).ok_or(ApiError::NotFound)?;
    let effective_status = effective_status(device.status, device.last_seen, Utc::now(), ctx.cfg.heartbeat_timeout);
    Ok(Json(StatusResponse { effective_status }))
}
