//! Shared harness for the REST integration suites.

use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::{test as actix_test, web, App};
use serde_json::{json, Value};

use backend::inbound::http::pieces::{
    create_piece, delete_piece, get_piece, list_pieces, update_piece, update_stage_detail,
};
use backend::inbound::http::state::HttpState;
use backend::inbound::http::user_images::{delete_image, list_images, upload_image};
use backend::inbound::http::users::{
    create_user, delete_user, get_user, get_user_stats, lookup_user, update_user,
};
use backend::Trace;

/// Bound alias for the initialised test service.
pub trait TestService:
    Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>
{
}

impl<S> TestService for S where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>
{
}

/// Initialise an in-memory application mounting the full REST surface.
pub async fn init_app() -> impl TestService {
    actix_test::init_service(
        App::new()
            .app_data(web::Data::new(HttpState::in_memory()))
            .wrap(Trace)
            .service(
                web::scope("/api/v1")
                    .service(create_piece)
                    .service(list_pieces)
                    .service(get_piece)
                    .service(update_piece)
                    .service(delete_piece)
                    .service(update_stage_detail)
                    .service(create_user)
                    .service(lookup_user)
                    .service(get_user)
                    .service(update_user)
                    .service(delete_user)
                    .service(get_user_stats)
                    .service(upload_image)
                    .service(list_images)
                    .service(delete_image),
            ),
    )
    .await
}

async fn send(app: &impl TestService, request: actix_http::Request) -> (StatusCode, Value) {
    let response = actix_test::call_service(app, request).await;
    let status = response.status();
    let bytes = actix_test::read_body(response).await;
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("response is JSON")
    };
    (status, body)
}

pub async fn get(app: &impl TestService, path: &str) -> (StatusCode, Value) {
    send(app, actix_test::TestRequest::get().uri(path).to_request()).await
}

pub async fn post_json(app: &impl TestService, path: &str, body: Value) -> (StatusCode, Value) {
    send(
        app,
        actix_test::TestRequest::post()
            .uri(path)
            .set_json(body)
            .to_request(),
    )
    .await
}

pub async fn put_json(app: &impl TestService, path: &str, body: Value) -> (StatusCode, Value) {
    send(
        app,
        actix_test::TestRequest::put()
            .uri(path)
            .set_json(body)
            .to_request(),
    )
    .await
}

pub async fn delete(app: &impl TestService, path: &str) -> (StatusCode, Value) {
    send(app, actix_test::TestRequest::delete().uri(path).to_request()).await
}

/// Create a user and return its id.
pub async fn create_test_user(app: &impl TestService, username: &str) -> String {
    let (status, body) = post_json(
        app,
        "/api/v1/users",
        json!({
            "firstName": "Demo",
            "lastName": "Potter",
            "email": format!("{username}@example.com"),
            "username": username,
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "user creation failed: {body}");
    body["id"].as_str().expect("user id").to_owned()
}

/// Create a piece for the owner and return the piece body (with stage details).
pub async fn create_test_piece(app: &impl TestService, owner_id: &str, title: &str) -> Value {
    let (status, body) = post_json(
        app,
        "/api/v1/pieces",
        json!({
            "title": title,
            "type": "mug",
            "ownerId": owner_id,
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "piece creation failed: {body}");
    body
}
