//! Server construction and middleware wiring.

mod config;
mod state_builders;

pub use config::ServerConfig;

use state_builders::build_http_state;

use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{web, App, HttpServer};

use backend::domain::image_service::MAX_UPLOAD_BYTES;
use backend::inbound::http::health::{live, ready, HealthState};
use backend::inbound::http::pieces::{
    create_piece, delete_piece, get_piece, list_pieces, update_piece, update_stage_detail,
};
use backend::inbound::http::state::HttpState;
use backend::inbound::http::user_images::{delete_image, list_images, upload_image};
use backend::inbound::http::users::{
    create_user, delete_user, get_user, get_user_stats, lookup_user, update_user,
};
use backend::Trace;
#[cfg(debug_assertions)]
use backend::doc::ApiDoc;
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

fn build_app(
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let api = web::scope("/api/v1")
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
        .service(delete_image);

    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        // Raise the default 256 KiB payload cap so image uploads fit.
        .app_data(web::PayloadConfig::new(MAX_UPLOAD_BYTES))
        .wrap(Trace)
        .service(api)
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));
    #[cfg(not(debug_assertions))]
    let app = app;

    app
}

/// Construct an Actix HTTP server using the provided health state and configuration.
///
/// # Parameters
/// - `health_state`: shared readiness state updated once the server is initialised.
/// - `config`: pre-built [`ServerConfig`] carrying binding and adapter settings.
///
/// # Returns
/// A spawned [`Server`] that must be awaited to drive the listener.
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket or starting the server fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let server_health_state = health_state.clone();
    let http_state = build_http_state(&config);
    let bind_addr = config.bind_addr;

    let server = HttpServer::new(move || {
        build_app(server_health_state.clone(), http_state.clone())
    })
    .bind(bind_addr)?
    .run();

    health_state.mark_ready();
    Ok(server)
}
