//! Users API handlers.
//!
//! ```text
//! POST   /api/v1/users
//! GET    /api/v1/users?googleId=... | ?username=...
//! GET    /api/v1/users/{id}
//! PUT    /api/v1/users/{id}
//! DELETE /api/v1/users/{id}
//! GET    /api/v1/users/{id}/stats
//! ```

use actix_web::{delete, get, post, put, web, HttpResponse};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::domain::ports::{UserRepositoryError, UserStatsQueryError};
use crate::domain::stats::UserStats;
use crate::domain::user::{
    NewUser, User, UserId, UserPatch, UserSocials, UserValidationError, Username,
};
use crate::domain::Error;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{parse_uuid, FieldName};
use crate::inbound::http::ApiResult;

const ID_FIELD: FieldName = FieldName::new("id");

/// Request body for `POST /api/v1/users`.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    /// Linked Google identity.
    #[serde(default)]
    pub google_id: Option<String>,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Unique contact address.
    pub email: String,
    /// Free-text location.
    #[serde(default)]
    pub location: Option<String>,
    /// Free-text title.
    #[serde(default)]
    pub title: Option<String>,
    /// Free-text biography.
    #[serde(default)]
    pub bio: Option<String>,
    /// Personal website URL.
    #[serde(default)]
    pub website: Option<String>,
    /// Social handles.
    #[serde(default)]
    pub socials: Option<UserSocials>,
    /// Unique handle.
    pub username: String,
    /// Profile picture URL.
    #[serde(default)]
    pub profile_picture: Option<String>,
}

impl CreateUserRequest {
    fn into_draft(self) -> Result<NewUser, Error> {
        let username = Username::new(self.username).map_err(map_user_validation_error)?;
        let draft = NewUser {
            google_id: self.google_id,
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            location: self.location.unwrap_or_default(),
            title: self.title.unwrap_or_default(),
            bio: self.bio.unwrap_or_default(),
            website: self.website.unwrap_or_default(),
            socials: self.socials.unwrap_or_default(),
            username,
            profile_picture: self.profile_picture,
        };
        draft.validate().map_err(map_user_validation_error)?;
        Ok(draft)
    }
}

/// Query string for `GET /api/v1/users` lookups.
#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct LookupUserQuery {
    /// Look up by linked Google identity.
    pub google_id: Option<String>,
    /// Look up by username.
    pub username: Option<String>,
}

/// Request body for `PUT /api/v1/users/{id}`. Absent fields are unchanged.
#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    /// Replacement given name.
    #[serde(default)]
    pub first_name: Option<String>,
    /// Replacement family name.
    #[serde(default)]
    pub last_name: Option<String>,
    /// Replacement contact address.
    #[serde(default)]
    pub email: Option<String>,
    /// Replacement location.
    #[serde(default)]
    pub location: Option<String>,
    /// Replacement title.
    #[serde(default)]
    pub title: Option<String>,
    /// Replacement biography.
    #[serde(default)]
    pub bio: Option<String>,
    /// Replacement website URL.
    #[serde(default)]
    pub website: Option<String>,
    /// Replacement social handles.
    #[serde(default)]
    pub socials: Option<UserSocials>,
    /// Replacement username.
    #[serde(default)]
    pub username: Option<String>,
    /// Replacement profile picture URL.
    #[serde(default)]
    pub profile_picture: Option<String>,
}

impl UpdateUserRequest {
    fn into_patch(self) -> Result<UserPatch, Error> {
        let username = self
            .username
            .map(Username::new)
            .transpose()
            .map_err(map_user_validation_error)?;
        let patch = UserPatch {
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            location: self.location,
            title: self.title,
            bio: self.bio,
            website: self.website,
            socials: self.socials,
            username,
            profile_picture: self.profile_picture,
        };
        patch.validate().map_err(map_user_validation_error)?;
        Ok(patch)
    }
}

fn map_user_validation_error(error: UserValidationError) -> Error {
    let (field, code) = match error {
        UserValidationError::EmptyUsername => ("username", "empty_username"),
        UserValidationError::UsernameTooShort => ("username", "username_too_short"),
        UserValidationError::UsernameTooLong => ("username", "username_too_long"),
        UserValidationError::UsernameInvalidCharacters => {
            ("username", "username_invalid_characters")
        }
        UserValidationError::InvalidEmail => ("email", "invalid_email"),
        UserValidationError::InvalidFirstName => ("firstName", "invalid_first_name"),
        UserValidationError::InvalidLastName => ("lastName", "invalid_last_name"),
    };
    Error::invalid_request(error.to_string()).with_details(json!({
        "field": field,
        "code": code,
    }))
}

fn map_user_repo_error(error: UserRepositoryError) -> Error {
    match error {
        UserRepositoryError::Connection { .. } => {
            Error::service_unavailable("user storage is unavailable")
        }
        UserRepositoryError::Query { message } => Error::internal(message),
        UserRepositoryError::Conflict { field } => {
            Error::conflict(format!("{field} already taken")).with_details(json!({
                "field": field,
                "code": "duplicate",
            }))
        }
    }
}

fn map_stats_error(error: UserStatsQueryError) -> Error {
    match error {
        UserStatsQueryError::Connection { .. } => {
            Error::service_unavailable("stats backend is unavailable")
        }
        UserStatsQueryError::Query { message } => Error::internal(message),
    }
}

/// Create a user profile.
#[utoipa::path(
    post,
    path = "/api/v1/users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = User),
        (status = 400, description = "Invalid request", body = Error),
        (status = 409, description = "Unique field already taken", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["users"],
    operation_id = "createUser"
)]
#[post("/users")]
pub async fn create_user(
    state: web::Data<HttpState>,
    payload: web::Json<CreateUserRequest>,
) -> ApiResult<HttpResponse> {
    let draft = payload.into_inner().into_draft()?;
    let created = state
        .users
        .insert(UserId::random(), &draft)
        .await
        .map_err(map_user_repo_error)?;
    Ok(HttpResponse::Created().json(created))
}

/// Look up a user by Google identity or username.
#[utoipa::path(
    get,
    path = "/api/v1/users",
    params(LookupUserQuery),
    responses(
        (status = 200, description = "User", body = User),
        (status = 400, description = "Invalid request", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["users"],
    operation_id = "lookupUser"
)]
#[get("/users")]
pub async fn lookup_user(
    state: web::Data<HttpState>,
    query: web::Query<LookupUserQuery>,
) -> ApiResult<web::Json<User>> {
    let query = query.into_inner();
    let found = match (query.google_id, query.username) {
        (Some(google_id), _) => state
            .users
            .find_by_google_id(&google_id)
            .await
            .map_err(map_user_repo_error)?,
        (None, Some(username)) => {
            let username = Username::new(username).map_err(map_user_validation_error)?;
            state
                .users
                .find_by_username(&username)
                .await
                .map_err(map_user_repo_error)?
        }
        (None, None) => {
            return Err(Error::invalid_request(
                "provide either googleId or username",
            ));
        }
    };
    found
        .map(web::Json)
        .ok_or_else(|| Error::not_found("user not found"))
}

/// Fetch one user by id.
#[utoipa::path(
    get,
    path = "/api/v1/users/{id}",
    params(("id" = String, Path, description = "User id")),
    responses(
        (status = 200, description = "User", body = User),
        (status = 400, description = "Invalid request", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["users"],
    operation_id = "getUser"
)]
#[get("/users/{id}")]
pub async fn get_user(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<User>> {
    let id = UserId::from_uuid(parse_uuid(&path.into_inner(), ID_FIELD)?);
    state
        .users
        .find_by_id(&id)
        .await
        .map_err(map_user_repo_error)?
        .map(web::Json)
        .ok_or_else(|| Error::not_found(format!("user {id} not found")))
}

/// Apply a partial update to a user profile.
#[utoipa::path(
    put,
    path = "/api/v1/users/{id}",
    params(("id" = String, Path, description = "User id")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "Updated user", body = User),
        (status = 400, description = "Invalid request", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 409, description = "Unique field already taken", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["users"],
    operation_id = "updateUser"
)]
#[put("/users/{id}")]
pub async fn update_user(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    payload: web::Json<UpdateUserRequest>,
) -> ApiResult<web::Json<User>> {
    let id = UserId::from_uuid(parse_uuid(&path.into_inner(), ID_FIELD)?);
    let patch = payload.into_inner().into_patch()?;
    if patch.is_empty() {
        return Err(Error::invalid_request("no fields to update"));
    }
    state
        .users
        .update(&id, &patch)
        .await
        .map_err(map_user_repo_error)?
        .map(web::Json)
        .ok_or_else(|| Error::not_found(format!("user {id} not found")))
}

/// Delete a user; their pieces cascade.
#[utoipa::path(
    delete,
    path = "/api/v1/users/{id}",
    params(("id" = String, Path, description = "User id")),
    responses(
        (status = 204, description = "User deleted"),
        (status = 400, description = "Invalid request", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["users"],
    operation_id = "deleteUser"
)]
#[delete("/users/{id}")]
pub async fn delete_user(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = UserId::from_uuid(parse_uuid(&path.into_inner(), ID_FIELD)?);
    state
        .users
        .find_by_id(&id)
        .await
        .map_err(map_user_repo_error)?
        .ok_or_else(|| Error::not_found(format!("user {id} not found")))?;
    // Remove the user's pieces through the service so every adapter matches
    // the database's ON DELETE CASCADE.
    let pieces = state.pieces.list_for_owner(&id, true).await?;
    for piece in pieces {
        state.pieces.delete(&piece.id).await?;
    }
    let deleted = state
        .users
        .delete(&id)
        .await
        .map_err(map_user_repo_error)?;
    if deleted {
        Ok(HttpResponse::NoContent().finish())
    } else {
        Err(Error::not_found(format!("user {id} not found")))
    }
}

/// Aggregate piece statistics for a user.
#[utoipa::path(
    get,
    path = "/api/v1/users/{id}/stats",
    params(("id" = String, Path, description = "User id")),
    responses(
        (status = 200, description = "Piece statistics", body = UserStats),
        (status = 400, description = "Invalid request", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["users"],
    operation_id = "getUserStats"
)]
#[get("/users/{id}/stats")]
pub async fn get_user_stats(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<UserStats>> {
    let id = UserId::from_uuid(parse_uuid(&path.into_inner(), ID_FIELD)?);
    state
        .users
        .find_by_id(&id)
        .await
        .map_err(map_user_repo_error)?
        .ok_or_else(|| Error::not_found(format!("user {id} not found")))?;
    let stats = state
        .stats
        .stats_for_user(&id)
        .await
        .map_err(map_stats_error)?;
    Ok(web::Json(stats))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{test as actix_test, App};
    use rstest::rstest;
    use serde_json::Value;

    fn test_app() -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        App::new()
            .app_data(web::Data::new(HttpState::in_memory()))
            .service(
                web::scope("/api/v1")
                    .service(create_user)
                    .service(lookup_user)
                    .service(get_user)
                    .service(update_user)
                    .service(delete_user)
                    .service(get_user_stats),
            )
    }

    fn create_body() -> Value {
        json!({
            "firstName": "Ada",
            "lastName": "Lovelace",
            "email": "ada@example.com",
            "username": "clay_ada",
            "googleId": "g-123",
        })
    }

    #[actix_web::test]
    async fn create_then_lookup_by_google_id_and_username() {
        let app = actix_test::init_service(test_app()).await;
        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/users")
                .set_json(create_body())
                .to_request(),
        )
        .await;
        assert_eq!(response.status(), actix_web::http::StatusCode::CREATED);
        let created: Value =
            serde_json::from_slice(&actix_test::read_body(response).await).expect("user JSON");
        assert_eq!(created["firstName"], "Ada");
        assert_eq!(created["username"], "clay_ada");
        assert_eq!(created["socials"], json!({}));

        for uri in [
            "/api/v1/users?googleId=g-123",
            "/api/v1/users?username=clay_ada",
        ] {
            let response = actix_test::call_service(
                &app,
                actix_test::TestRequest::get().uri(uri).to_request(),
            )
            .await;
            assert!(response.status().is_success(), "{uri}");
            let found: Value =
                serde_json::from_slice(&actix_test::read_body(response).await).expect("user JSON");
            assert_eq!(found["id"], created["id"]);
        }
    }

    #[actix_web::test]
    async fn lookup_without_parameters_is_rejected() {
        let app = actix_test::init_service(test_app()).await;
        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/api/v1/users")
                .to_request(),
        )
        .await;
        assert_eq!(response.status(), actix_web::http::StatusCode::BAD_REQUEST);
    }

    #[rstest]
    #[case("ab", "username_too_short")]
    #[case("has space", "username_invalid_characters")]
    #[actix_web::test]
    async fn create_rejects_invalid_usernames(#[case] username: &str, #[case] code: &str) {
        let app = actix_test::init_service(test_app()).await;
        let mut body = create_body();
        body["username"] = json!(username);

        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/users")
                .set_json(body)
                .to_request(),
        )
        .await;
        assert_eq!(response.status(), actix_web::http::StatusCode::BAD_REQUEST);
        let value: Value =
            serde_json::from_slice(&actix_test::read_body(response).await).expect("error JSON");
        assert_eq!(value["details"]["field"], "username");
        assert_eq!(value["details"]["code"], code);
    }

    #[actix_web::test]
    async fn duplicate_email_conflicts() {
        let app = actix_test::init_service(test_app()).await;
        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/users")
                .set_json(create_body())
                .to_request(),
        )
        .await;
        assert_eq!(response.status(), actix_web::http::StatusCode::CREATED);

        let mut body = create_body();
        body["username"] = json!("other_user");
        body["googleId"] = json!("g-456");
        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/users")
                .set_json(body)
                .to_request(),
        )
        .await;
        assert_eq!(response.status(), actix_web::http::StatusCode::CONFLICT);
        let value: Value =
            serde_json::from_slice(&actix_test::read_body(response).await).expect("error JSON");
        assert_eq!(value["code"], "conflict");
        assert_eq!(value["details"]["field"], "email");
    }

    #[actix_web::test]
    async fn update_changes_profile_fields() {
        let app = actix_test::init_service(test_app()).await;
        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/users")
                .set_json(create_body())
                .to_request(),
        )
        .await;
        let created: Value =
            serde_json::from_slice(&actix_test::read_body(response).await).expect("user JSON");
        let id = created["id"].as_str().expect("id");

        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::put()
                .uri(&format!("/api/v1/users/{id}"))
                .set_json(json!({
                    "bio": "wheel thrown, wood fired",
                    "socials": {"instagram": "@clay_ada"},
                }))
                .to_request(),
        )
        .await;
        assert!(response.status().is_success());
        let updated: Value =
            serde_json::from_slice(&actix_test::read_body(response).await).expect("user JSON");
        assert_eq!(updated["bio"], "wheel thrown, wood fired");
        assert_eq!(updated["socials"]["instagram"], "@clay_ada");
    }

    #[actix_web::test]
    async fn stats_for_unknown_user_is_not_found() {
        let app = actix_test::init_service(test_app()).await;
        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri(&format!("/api/v1/users/{}/stats", uuid::Uuid::new_v4()))
                .to_request(),
        )
        .await;
        assert_eq!(response.status(), actix_web::http::StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn stats_for_fresh_user_are_zero() {
        let app = actix_test::init_service(test_app()).await;
        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/users")
                .set_json(create_body())
                .to_request(),
        )
        .await;
        let created: Value =
            serde_json::from_slice(&actix_test::read_body(response).await).expect("user JSON");
        let id = created["id"].as_str().expect("id");

        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri(&format!("/api/v1/users/{id}/stats"))
                .to_request(),
        )
        .await;
        assert!(response.status().is_success());
        let stats: Value =
            serde_json::from_slice(&actix_test::read_body(response).await).expect("stats JSON");
        assert_eq!(stats["totalPieces"], 0);
        assert_eq!(stats["piecesByStage"]["ideas"], 0);
    }

    #[actix_web::test]
    async fn delete_then_get_is_not_found() {
        let app = actix_test::init_service(test_app()).await;
        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/users")
                .set_json(create_body())
                .to_request(),
        )
        .await;
        let created: Value =
            serde_json::from_slice(&actix_test::read_body(response).await).expect("user JSON");
        let id = created["id"].as_str().expect("id");

        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::delete()
                .uri(&format!("/api/v1/users/{id}"))
                .to_request(),
        )
        .await;
        assert_eq!(response.status(), actix_web::http::StatusCode::NO_CONTENT);

        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri(&format!("/api/v1/users/{id}"))
                .to_request(),
        )
        .await;
        assert_eq!(response.status(), actix_web::http::StatusCode::NOT_FOUND);
    }
}
