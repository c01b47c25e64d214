//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] aggregates the REST surface for Swagger UI (debug builds) and
//! external tooling:
//!
//! - **Paths**: piece, user, image, and health endpoints from the inbound layer
//! - **Schemas**: wire types from the domain layer plus the request bodies
//!   defined alongside the handlers

use utoipa::OpenApi;

use crate::domain::error::{Error, ErrorCode};
use crate::domain::image_service::UserImage;
use crate::domain::piece::Piece;
use crate::domain::stage::{Priority, Stage};
use crate::domain::stage_detail::{PieceWithStages, StageDetail, StageEntries, StageEntry};
use crate::domain::stats::{PriorityCounts, StageCounts, UserStats};
use crate::domain::user::{User, UserSocials};
use crate::inbound::http::pieces::{
    CreatePieceRequest, UpdatePieceRequest, UpdateStageDetailRequest,
};
use crate::inbound::http::users::{CreateUserRequest, UpdateUserRequest};

/// OpenAPI document for the REST API.
/// Swagger UI is enabled in debug builds only and used by tooling.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Potterly backend API",
        description = "HTTP interface for pottery pieces, stage tracking, user profiles, \
                       image uploads, and health probes."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::pieces::create_piece,
        crate::inbound::http::pieces::list_pieces,
        crate::inbound::http::pieces::get_piece,
        crate::inbound::http::pieces::update_piece,
        crate::inbound::http::pieces::delete_piece,
        crate::inbound::http::pieces::update_stage_detail,
        crate::inbound::http::users::create_user,
        crate::inbound::http::users::lookup_user,
        crate::inbound::http::users::get_user,
        crate::inbound::http::users::update_user,
        crate::inbound::http::users::delete_user,
        crate::inbound::http::users::get_user_stats,
        crate::inbound::http::user_images::upload_image,
        crate::inbound::http::user_images::list_images,
        crate::inbound::http::user_images::delete_image,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        Error,
        ErrorCode,
        Piece,
        PieceWithStages,
        StageDetail,
        StageEntry,
        StageEntries,
        Stage,
        Priority,
        User,
        UserSocials,
        UserStats,
        StageCounts,
        PriorityCounts,
        UserImage,
        CreatePieceRequest,
        UpdatePieceRequest,
        UpdateStageDetailRequest,
        CreateUserRequest,
        UpdateUserRequest,
    )),
    tags(
        (name = "pieces", description = "Pottery pieces and their stage details"),
        (name = "users", description = "User profiles and statistics"),
        (name = "images", description = "User image uploads"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
