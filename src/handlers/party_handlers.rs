use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tower_sessions::Session;

use crate::auth::session;
use crate::error::{ApiError, ApiResult};
use crate::services::party_service::{CreateCampaignRequest, CreatePartyRequest};
use crate::AppState;

#[derive(Deserialize)]
pub struct CreatePartyBody {
    #[serde(default)]
    name: String,
    description: Option<String>,
    logo_url: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdatePartyBody {
    description: Option<String>,
    logo_url: Option<String>,
}

#[derive(Deserialize)]
pub struct CreateCampaignBody {
    #[serde(default)]
    title: String,
    description: Option<String>,
    image: Option<String>,
}

/// GET /api/party/profile — the caller's party, or null before creation.
pub async fn get_profile(
    State(state): State<AppState>,
    session_handle: Session,
) -> ApiResult<Json<Value>> {
    let user = current(&session_handle).await?;
    let profile = state.party_service.get_profile(user.id).await?;
    Ok(Json(json!({ "party": profile })))
}

/// POST /api/party/create
pub async fn create_party(
    State(state): State<AppState>,
    session_handle: Session,
    Json(body): Json<CreatePartyBody>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let user = current(&session_handle).await?;

    let party_id = state
        .party_service
        .create_party(
            user.id,
            CreatePartyRequest {
                name: body.name,
                description: body.description,
                logo_url: body.logo_url,
            },
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "party_id": party_id,
            "message": "Party created successfully",
        })),
    ))
}

/// PUT /api/party/update — partial update of description and logo.
pub async fn update_party(
    State(state): State<AppState>,
    session_handle: Session,
    Json(body): Json<UpdatePartyBody>,
) -> ApiResult<Json<Value>> {
    let user = current(&session_handle).await?;

    state
        .party_service
        .update_party(user.id, body.description, body.logo_url)
        .await?;

    Ok(Json(json!({
        "success": true,
        "message": "Party updated successfully",
    })))
}

/// POST /api/party/campaign — JSON body; the image may be a data URI,
/// an absolute URL, or absent.
pub async fn create_campaign(
    State(state): State<AppState>,
    session_handle: Session,
    Json(body): Json<CreateCampaignBody>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let user = current(&session_handle).await?;

    let campaign_id = state
        .party_service
        .create_campaign(
            user.id,
            CreateCampaignRequest {
                title: body.title,
                description: body.description,
                image: body.image,
            },
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "campaign_id": campaign_id,
            "message": "Campaign created successfully",
        })),
    ))
}

/// POST /api/party/campaign/upload — multipart image upload.
pub async fn upload_campaign_image(
    State(state): State<AppState>,
    session_handle: Session,
    multipart: Multipart,
) -> ApiResult<Json<Value>> {
    let user = current(&session_handle).await?;
    let (filename, bytes) = read_upload(multipart).await?;

    let (path, url) = state
        .party_service
        .upload_campaign_image(user.id, &filename, &bytes)
        .await?;

    Ok(Json(json!({ "success": true, "path": path, "url": url })))
}

/// POST /api/party/logo/upload — multipart logo upload; replaces and
/// deletes any previously stored logo file.
pub async fn upload_party_logo(
    State(state): State<AppState>,
    session_handle: Session,
    multipart: Multipart,
) -> ApiResult<Json<Value>> {
    let user = current(&session_handle).await?;
    let (filename, bytes) = read_upload(multipart).await?;

    let (path, url) = state
        .party_service
        .upload_party_logo(user.id, &filename, &bytes)
        .await?;

    Ok(Json(json!({ "success": true, "path": path, "url": url })))
}

/// GET /api/party/campaigns — the caller's own campaigns.
pub async fn list_campaigns(
    State(state): State<AppState>,
    session_handle: Session,
) -> ApiResult<Json<Value>> {
    let user = current(&session_handle).await?;
    let campaigns = state.party_service.list_campaigns(user.id).await?;
    Ok(Json(json!({ "campaigns": campaigns })))
}

/// GET /api/party/votes — the caller's tally, 0 before party creation.
pub async fn vote_count(
    State(state): State<AppState>,
    session_handle: Session,
) -> ApiResult<Json<Value>> {
    let user = current(&session_handle).await?;
    let count = state.party_service.vote_count(user.id).await?;
    Ok(Json(json!({ "voteCount": count })))
}

async fn current(session_handle: &Session) -> ApiResult<session::SessionUser> {
    session::current_user(session_handle)
        .await?
        .ok_or_else(ApiError::unauthenticated)
}

/// Pulls the first file field out of a multipart body.
async fn read_upload(mut multipart: Multipart) -> ApiResult<(String, Vec<u8>)> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::Validation(format!("Invalid multipart body: {}", e)))?
    {
        let Some(filename) = field.file_name().map(str::to_string) else {
            continue;
        };
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::Validation(format!("Failed to read upload: {}", e)))?;
        return Ok((filename, bytes.to_vec()));
    }

    Err(ApiError::Validation("No file provided".to_string()))
}
