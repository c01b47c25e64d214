//! Pieces API handlers.
//!
//! ```text
//! POST   /api/v1/pieces
//! GET    /api/v1/pieces?ownerId=...&includeArchived=true
//! GET    /api/v1/pieces/{id}
//! PUT    /api/v1/pieces/{id}
//! DELETE /api/v1/pieces/{id}
//! PUT    /api/v1/pieces/{id}/stages/{stage}
//! ```

use actix_web::{delete, get, post, put, web, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::domain::piece::{NewPiece, Piece, PieceId, PiecePatch};
use crate::domain::stage::{Priority, Stage};
use crate::domain::stage_detail::{PieceWithStages, StageDetail, StageDetailPatch};
use crate::domain::user::UserId;
use crate::domain::Error;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    missing_field_error, parse_optional_rfc3339_timestamp, parse_priority, parse_stage,
    parse_uuid, FieldName,
};
use crate::inbound::http::ApiResult;

const ID_FIELD: FieldName = FieldName::new("id");
const OWNER_ID_FIELD: FieldName = FieldName::new("ownerId");
const STAGE_FIELD: FieldName = FieldName::new("stage");
const PRIORITY_FIELD: FieldName = FieldName::new("priority");
const DUE_DATE_FIELD: FieldName = FieldName::new("dueDate");

/// Request body for `POST /api/v1/pieces`.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePieceRequest {
    /// Short title.
    pub title: String,
    /// Kind of ware.
    #[serde(rename = "type")]
    pub kind: String,
    /// Free-text description.
    #[serde(default)]
    pub details: Option<String>,
    /// Free-text status note.
    #[serde(default)]
    pub status: Option<String>,
    /// Priority name; defaults to `medium`.
    #[serde(default)]
    pub priority: Option<String>,
    /// Initial stage name; defaults to `ideas`.
    #[serde(default)]
    pub stage: Option<String>,
    /// Owning user id.
    #[serde(default)]
    pub owner_id: Option<String>,
    /// RFC 3339 target date.
    #[serde(default)]
    pub due_date: Option<String>,
}

impl CreatePieceRequest {
    fn into_draft(self) -> Result<NewPiece, Error> {
        let owner_id = self
            .owner_id
            .ok_or_else(|| missing_field_error(OWNER_ID_FIELD))?;
        let owner_id = UserId::from_uuid(parse_uuid(&owner_id, OWNER_ID_FIELD)?);
        let priority = match self.priority.as_deref() {
            Some(raw) => parse_priority(raw, PRIORITY_FIELD)?,
            None => Priority::Medium,
        };
        let stage = match self.stage.as_deref() {
            Some(raw) => parse_stage(raw, STAGE_FIELD)?,
            None => Stage::Ideas,
        };
        let due_date =
            parse_optional_rfc3339_timestamp(self.due_date.as_deref(), DUE_DATE_FIELD)?;
        Ok(NewPiece {
            title: self.title,
            kind: self.kind,
            details: self.details.unwrap_or_default(),
            status: self.status,
            priority,
            stage,
            owner_id,
            due_date,
        })
    }
}

/// Query string for `GET /api/v1/pieces`.
#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ListPiecesQuery {
    /// Owner to list pieces for.
    pub owner_id: Option<String>,
    /// Include archived pieces; defaults to false.
    #[serde(default)]
    pub include_archived: Option<bool>,
}

/// Request body for `PUT /api/v1/pieces/{id}`. Absent fields are unchanged.
#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePieceRequest {
    /// Replacement title.
    #[serde(default)]
    pub title: Option<String>,
    /// Replacement kind.
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    /// Replacement description.
    #[serde(default)]
    pub details: Option<String>,
    /// Replacement status note.
    #[serde(default)]
    pub status: Option<String>,
    /// Replacement priority name.
    #[serde(default)]
    pub priority: Option<String>,
    /// Replacement stage name.
    #[serde(default)]
    pub stage: Option<String>,
    /// Replacement archived flag.
    #[serde(default)]
    pub archived: Option<bool>,
    /// Replacement starred flag.
    #[serde(default)]
    pub starred: Option<bool>,
    /// Replacement RFC 3339 target date.
    #[serde(default)]
    pub due_date: Option<String>,
}

impl UpdatePieceRequest {
    fn into_patch(self) -> Result<PiecePatch, Error> {
        let priority = self
            .priority
            .as_deref()
            .map(|raw| parse_priority(raw, PRIORITY_FIELD))
            .transpose()?;
        let stage = self
            .stage
            .as_deref()
            .map(|raw| parse_stage(raw, STAGE_FIELD))
            .transpose()?;
        let due_date =
            parse_optional_rfc3339_timestamp(self.due_date.as_deref(), DUE_DATE_FIELD)?;
        Ok(PiecePatch {
            title: self.title,
            kind: self.kind,
            details: self.details,
            status: self.status,
            priority,
            stage,
            archived: self.archived,
            starred: self.starred,
            due_date,
        })
    }
}

/// Request body for `PUT /api/v1/pieces/{id}/stages/{stage}`.
#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStageDetailRequest {
    /// Replacement notes.
    #[serde(default)]
    pub notes: Option<String>,
    /// Replacement image reference.
    #[serde(default)]
    pub image_url: Option<String>,
    /// Replacement thrown weight in grams.
    #[serde(default)]
    pub weight: Option<i32>,
    /// Replacement glaze descriptions.
    #[serde(default)]
    pub glazes: Option<String>,
}

impl From<UpdateStageDetailRequest> for StageDetailPatch {
    fn from(request: UpdateStageDetailRequest) -> Self {
        Self {
            notes: request.notes,
            image_url: request.image_url,
            weight: request.weight,
            glazes: request.glazes,
        }
    }
}

/// Create a piece together with its six stage rows.
#[utoipa::path(
    post,
    path = "/api/v1/pieces",
    request_body = CreatePieceRequest,
    responses(
        (status = 201, description = "Piece created", body = PieceWithStages),
        (status = 400, description = "Invalid request", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["pieces"],
    operation_id = "createPiece"
)]
#[post("/pieces")]
pub async fn create_piece(
    state: web::Data<HttpState>,
    payload: web::Json<CreatePieceRequest>,
) -> ApiResult<HttpResponse> {
    let draft = payload.into_inner().into_draft()?;
    let created = state.pieces.create(draft).await?;
    Ok(HttpResponse::Created().json(created))
}

/// List an owner's pieces, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/pieces",
    params(ListPiecesQuery),
    responses(
        (status = 200, description = "Pieces", body = [Piece]),
        (status = 400, description = "Invalid request", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["pieces"],
    operation_id = "listPieces"
)]
#[get("/pieces")]
pub async fn list_pieces(
    state: web::Data<HttpState>,
    query: web::Query<ListPiecesQuery>,
) -> ApiResult<web::Json<Vec<Piece>>> {
    let query = query.into_inner();
    let owner_id = query
        .owner_id
        .ok_or_else(|| missing_field_error(OWNER_ID_FIELD))?;
    let owner_id = UserId::from_uuid(parse_uuid(&owner_id, OWNER_ID_FIELD)?);
    let pieces = state
        .pieces
        .list_for_owner(&owner_id, query.include_archived.unwrap_or(false))
        .await?;
    Ok(web::Json(pieces))
}

/// Fetch one piece merged with its stage rows.
#[utoipa::path(
    get,
    path = "/api/v1/pieces/{id}",
    params(("id" = String, Path, description = "Piece id")),
    responses(
        (status = 200, description = "Piece with stage details", body = PieceWithStages),
        (status = 400, description = "Invalid request", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["pieces"],
    operation_id = "getPiece"
)]
#[get("/pieces/{id}")]
pub async fn get_piece(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<PieceWithStages>> {
    let id = PieceId::from_uuid(parse_uuid(&path.into_inner(), ID_FIELD)?);
    let piece = state.pieces.get_with_stages(&id).await?;
    Ok(web::Json(piece))
}

/// Apply a partial update to a piece.
#[utoipa::path(
    put,
    path = "/api/v1/pieces/{id}",
    params(("id" = String, Path, description = "Piece id")),
    request_body = UpdatePieceRequest,
    responses(
        (status = 200, description = "Updated piece", body = Piece),
        (status = 400, description = "Invalid request", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["pieces"],
    operation_id = "updatePiece"
)]
#[put("/pieces/{id}")]
pub async fn update_piece(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    payload: web::Json<UpdatePieceRequest>,
) -> ApiResult<web::Json<Piece>> {
    let id = PieceId::from_uuid(parse_uuid(&path.into_inner(), ID_FIELD)?);
    let patch = payload.into_inner().into_patch()?;
    let updated = state.pieces.update(&id, patch).await?;
    Ok(web::Json(updated))
}

/// Delete a piece; its stage rows go with it.
#[utoipa::path(
    delete,
    path = "/api/v1/pieces/{id}",
    params(("id" = String, Path, description = "Piece id")),
    responses(
        (status = 204, description = "Piece deleted"),
        (status = 400, description = "Invalid request", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["pieces"],
    operation_id = "deletePiece"
)]
#[delete("/pieces/{id}")]
pub async fn delete_piece(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = PieceId::from_uuid(parse_uuid(&path.into_inner(), ID_FIELD)?);
    state.pieces.delete(&id).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Update one stage row of a piece.
#[utoipa::path(
    put,
    path = "/api/v1/pieces/{id}/stages/{stage}",
    params(
        ("id" = String, Path, description = "Piece id"),
        ("stage" = String, Path, description = "Stage name")
    ),
    request_body = UpdateStageDetailRequest,
    responses(
        (status = 200, description = "Updated stage detail", body = StageDetail),
        (status = 400, description = "Invalid request", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["pieces"],
    operation_id = "updateStageDetail"
)]
#[put("/pieces/{id}/stages/{stage}")]
pub async fn update_stage_detail(
    state: web::Data<HttpState>,
    path: web::Path<(String, String)>,
    payload: web::Json<UpdateStageDetailRequest>,
) -> ApiResult<web::Json<StageDetail>> {
    let (id, stage) = path.into_inner();
    let id = PieceId::from_uuid(parse_uuid(&id, ID_FIELD)?);
    let stage = parse_stage(&stage, STAGE_FIELD)?;
    let updated = state
        .pieces
        .update_stage_detail(&id, stage, payload.into_inner().into())
        .await?;
    Ok(web::Json(updated))
}
