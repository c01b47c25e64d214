//! Behavioural tests following a piece through the studio workflow.

mod support;

use actix_web::http::StatusCode;
use serde_json::json;

use support::{create_test_piece, create_test_user, delete, get, init_app, put_json};

#[actix_web::test]
async fn a_piece_moves_from_idea_to_finished() {
    let app = init_app().await;
    let owner = create_test_user(&app, "workflow_potter").await;
    let piece = create_test_piece(&app, &owner, "Tall mug").await;
    let piece_id = piece["id"].as_str().expect("piece id");

    // Created pieces start in ideas with all six stage entries present.
    assert_eq!(piece["stage"], "ideas");
    let details = piece["stageDetails"].as_object().expect("stage details");
    assert_eq!(details.len(), 6);

    // Throw it, recording the thrown weight against the throw stage.
    let (status, _) = put_json(
        &app,
        &format!("/api/v1/pieces/{piece_id}"),
        json!({"stage": "throw"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = put_json(
        &app,
        &format!("/api/v1/pieces/{piece_id}/stages/throw"),
        json!({"weight": 450, "notes": "thrown thin"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = get(&app, &format!("/api/v1/pieces/{piece_id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["stage"], "throw");
    assert_eq!(body["stageDetails"]["throw"]["weight"], 450);
    assert_eq!(body["stageDetails"]["throw"]["notes"], "thrown thin");
    // Other stages keep their defaults.
    assert_eq!(body["stageDetails"]["glaze"]["notes"], "");

    // Finish it and check the owner's stats move with it.
    let (status, _) = put_json(
        &app,
        &format!("/api/v1/pieces/{piece_id}"),
        json!({"stage": "finished"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, stats) = get(&app, &format!("/api/v1/users/{owner}/stats")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["totalPieces"], 1);
    assert_eq!(stats["activePieces"], 0);
    assert_eq!(stats["completedPieces"], 1);
    assert_eq!(stats["piecesByStage"]["finished"], 1);
}

#[actix_web::test]
async fn archiving_hides_a_piece_from_the_default_listing() {
    let app = init_app().await;
    let owner = create_test_user(&app, "archive_potter").await;
    let keep = create_test_piece(&app, &owner, "Keeper bowl").await;
    let shelved = create_test_piece(&app, &owner, "Shelved vase").await;
    let shelved_id = shelved["id"].as_str().expect("piece id");

    let (status, _) = put_json(
        &app,
        &format!("/api/v1/pieces/{shelved_id}"),
        json!({"archived": true}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, listed) = get(&app, &format!("/api/v1/pieces?ownerId={owner}")).await;
    assert_eq!(status, StatusCode::OK);
    let listed = listed.as_array().expect("array");
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["id"], keep["id"]);

    let (status, listed) = get(
        &app,
        &format!("/api/v1/pieces?ownerId={owner}&includeArchived=true"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed.as_array().expect("array").len(), 2);

    // Archived pieces still count in the stats breakdowns.
    let (_, stats) = get(&app, &format!("/api/v1/users/{owner}/stats")).await;
    assert_eq!(stats["totalPieces"], 2);
    assert_eq!(stats["archivedPieces"], 1);
    assert_eq!(stats["piecesByStage"]["ideas"], 2);
}

#[actix_web::test]
async fn deleting_a_piece_removes_its_stage_rows() {
    let app = init_app().await;
    let owner = create_test_user(&app, "delete_potter").await;
    let piece = create_test_piece(&app, &owner, "Doomed planter").await;
    let piece_id = piece["id"].as_str().expect("piece id");

    let (status, _) = delete(&app, &format!("/api/v1/pieces/{piece_id}")).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = get(&app, &format!("/api/v1/pieces/{piece_id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = put_json(
        &app,
        &format!("/api/v1/pieces/{piece_id}/stages/throw"),
        json!({"notes": "too late"}),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn rejected_input_names_the_offending_field() {
    let app = init_app().await;

    let (status, body) = support::post_json(
        &app,
        "/api/v1/pieces",
        json!({"title": "Orphan piece", "type": "mug"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "invalid_request");
    assert_eq!(body["details"]["field"], "ownerId");
    assert_eq!(body["details"]["code"], "missing_field");

    let owner = create_test_user(&app, "strict_potter").await;
    let (status, body) = support::post_json(
        &app,
        "/api/v1/pieces",
        json!({
            "title": "Misstaged piece",
            "type": "mug",
            "ownerId": owner,
            "stage": "kilning",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"]["field"], "stage");
    assert_eq!(body["details"]["code"], "invalid_stage");
}

#[actix_web::test]
async fn error_responses_carry_a_trace_id() {
    let app = init_app().await;
    let missing = uuid::Uuid::new_v4();

    let response = actix_web::test::call_service(
        &app,
        actix_web::test::TestRequest::get()
            .uri(&format!("/api/v1/pieces/{missing}"))
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(response.headers().contains_key("Trace-Id"));
}
