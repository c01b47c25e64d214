//! Behavioural tests for user profiles, lookups, and image uploads.

mod support;

use std::io::Cursor;

use actix_web::http::StatusCode;
use actix_web::test as actix_test;
use serde_json::{json, Value};

use support::{create_test_piece, create_test_user, delete, get, init_app, post_json, put_json};

#[actix_web::test]
async fn a_profile_can_be_created_looked_up_and_updated() {
    let app = init_app().await;

    let (status, created) = post_json(
        &app,
        "/api/v1/users",
        json!({
            "googleId": "google-123",
            "firstName": "Mira",
            "lastName": "Clay",
            "email": "mira@example.com",
            "username": "miraclay",
            "location": "Bristol",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "user creation failed: {created}");
    let user_id = created["id"].as_str().expect("user id");

    let (status, by_google) = get(&app, "/api/v1/users?googleId=google-123").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(by_google["id"], created["id"]);

    let (status, by_username) = get(&app, "/api/v1/users?username=miraclay").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(by_username["id"], created["id"]);

    let (status, updated) = put_json(
        &app,
        &format!("/api/v1/users/{user_id}"),
        json!({
            "bio": "Functional stoneware.",
            "socials": {"instagram": "@miraclay"},
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["bio"], "Functional stoneware.");
    assert_eq!(updated["socials"]["instagram"], "@miraclay");
    // Untouched fields survive the patch.
    assert_eq!(updated["location"], "Bristol");
}

#[actix_web::test]
async fn lookups_require_a_query_parameter() {
    let app = init_app().await;
    let (status, body) = get(&app, "/api/v1/users").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "invalid_request");
}

#[actix_web::test]
async fn duplicate_usernames_are_rejected_with_the_field() {
    let app = init_app().await;
    create_test_user(&app, "taken_handle").await;

    let (status, body) = post_json(
        &app,
        "/api/v1/users",
        json!({
            "firstName": "Other",
            "lastName": "Potter",
            "email": "other@example.com",
            "username": "taken_handle",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "conflict");
    assert_eq!(body["details"]["field"], "username");
    assert_eq!(body["details"]["code"], "duplicate");
}

#[actix_web::test]
async fn deleting_a_user_removes_the_profile() {
    let app = init_app().await;
    let user_id = create_test_user(&app, "leaving_potter").await;

    let (status, _) = delete(&app, &format!("/api/v1/users/{user_id}")).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = get(&app, &format!("/api/v1/users/{user_id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = delete(&app, &format!("/api/v1/users/{user_id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn deleting_a_user_cascades_to_their_pieces() {
    let app = init_app().await;
    let owner = create_test_user(&app, "departing_potter").await;
    let piece = create_test_piece(&app, &owner, "Left-behind mug").await;
    let piece_id = piece["id"].as_str().expect("piece id");

    let (status, _) = delete(&app, &format!("/api/v1/users/{owner}")).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    // The pieces went with the profile, stage rows included.
    let (status, listed) = get(
        &app,
        &format!("/api/v1/pieces?ownerId={owner}&includeArchived=true"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(listed.as_array().expect("array").is_empty());

    let (status, _) = get(&app, &format!("/api/v1/pieces/{piece_id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn stats_for_an_unknown_user_are_not_found() {
    let app = init_app().await;
    let (status, _) = get(&app, &format!("/api/v1/users/{}/stats", uuid::Uuid::new_v4())).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

fn png_payload() -> Vec<u8> {
    let image = image::DynamicImage::new_rgb8(24, 24);
    let mut encoded = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut encoded), image::ImageOutputFormat::Png)
        .expect("encode test png");
    encoded
}

#[actix_web::test]
async fn uploaded_images_are_scoped_to_their_owner() {
    let app = init_app().await;
    let first = create_test_user(&app, "first_potter").await;
    let second = create_test_user(&app, "second_potter").await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri(&format!("/api/v1/users/{first}/images"))
            .insert_header(("content-type", "image/png"))
            .set_payload(png_payload())
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let uploaded: Value =
        serde_json::from_slice(&actix_test::read_body(response).await).expect("image JSON");
    assert!(uploaded["imageKey"]
        .as_str()
        .expect("key")
        .starts_with(&format!("users/{first}/")));

    let (status, own) = get(&app, &format!("/api/v1/users/{first}/images")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(own.as_array().expect("array").len(), 1);

    let (status, other) = get(&app, &format!("/api/v1/users/{second}/images")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(other.as_array().expect("array").is_empty());
}
