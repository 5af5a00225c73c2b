//! REST API layer: route handlers, DTOs, authentication, and router
//! composition.
//!
//! Every control route sits behind [`auth::require_token`]. The WebSocket
//! endpoints check their own token; `/health` and the API documentation
//! are open.

pub mod auth;
pub mod dto;
pub mod handlers;

use axum::Router;
use axum::middleware;
use axum::routing::get;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

use crate::app_state::AppState;
use crate::ws::handler::ws_handler;

/// OpenAPI document for the HTTP control surface.
#[derive(Debug, OpenApi)]
#[openapi(
    info(
        title = "wfl-relay",
        description = "Control relay between HTTP callers and a Rive renderer connected over WebSocket."
    ),
    paths(
        handlers::control::set_lip,
        handlers::control::set_head,
        handlers::control::set_talk,
        handlers::control::set_eyes,
        handlers::control::set_roast_level,
        handlers::control::set_pupils,
        handlers::control::look,
        handlers::control::reset,
        handlers::sequence::speak,
        handlers::sequence::shake,
        handlers::sequence::nod,
        handlers::sequence::react,
        handlers::sequence::lipsync,
        handlers::sequence::run_roast,
        handlers::sequence::start_idle,
        handlers::sequence::stop_idle,
        handlers::sequence::list_sequences,
        handlers::sequence::stop_sequences,
        handlers::animation::list_animations,
        handlers::animation::play_animation,
        handlers::animation::stop_animation,
        handlers::animation::bone_edit,
        handlers::animation::rotate_bone,
        handlers::animation::submit,
        handlers::admin::set_rive_url,
        handlers::admin::reload_rive,
        handlers::admin::admin_config,
        handlers::system::health_handler,
        handlers::system::status_handler,
    ),
    tags(
        (name = "Control", description = "Single commands: mouth, head, eyes, gaze"),
        (name = "Sequences", description = "Timed choreographies"),
        (name = "Animations", description = "Timeline animations, bones, roast submissions"),
        (name = "Admin", description = "Renderer asset settings"),
        (name = "System", description = "Health and status"),
    )
)]
pub struct ApiDoc;

/// Builds the complete application: control routes behind the token check,
/// the WebSocket endpoints, health, and API docs.
pub fn build_router(state: AppState) -> Router {
    let protected = handlers::routes().route_layer(middleware::from_fn_with_state(
        state.clone(),
        auth::require_token,
    ));

    Router::new()
        .merge(protected)
        .merge(handlers::system::public_routes())
        .merge(docs_routes())
        .route("/", get(ws_handler))
        .route("/ws", get(ws_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[cfg(feature = "swagger-ui")]
fn docs_routes() -> Router<AppState> {
    Router::new().merge(
        utoipa_swagger_ui::SwaggerUi::new("/swagger-ui")
            .url("/api-docs/openapi.json", ApiDoc::openapi()),
    )
}

#[cfg(not(feature = "swagger-ui"))]
fn docs_routes() -> Router<AppState> {
    Router::new().route(
        "/api-docs/openapi.json",
        get(|| async { axum::Json(ApiDoc::openapi()) }),
    )
}

#[cfg(test)]
#[allow(clippy::panic, clippy::indexing_slicing)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use serde_json::Value;
    use tower::ServiceExt;

    use super::*;
    use crate::config::RelayConfig;

    const TOKEN: &str = "s3cret";

    fn app_with_token(token: &str) -> Router {
        let config = RelayConfig {
            control_token: token.to_string(),
            ..RelayConfig::default()
        };
        build_router(AppState::new(config))
    }

    fn get_request(uri: &str) -> Request<Body> {
        let Ok(request) = Request::builder()
            .uri(uri)
            .header(auth::TOKEN_HEADER, TOKEN)
            .body(Body::empty())
        else {
            panic!("bad request for {uri}");
        };
        request
    }

    async fn call(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let Ok(response) = app.clone().oneshot(request).await;
        let status = response.status();
        let Ok(bytes) = axum::body::to_bytes(response.into_body(), 1024 * 1024).await else {
            panic!("body read failed");
        };
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }

    #[tokio::test]
    async fn health_needs_no_token() {
        let app = app_with_token(TOKEN);
        let Ok(request) = Request::builder().uri("/health").body(Body::empty()) else {
            panic!("bad request");
        };
        let (status, json) = call(&app, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "healthy");
    }

    #[tokio::test]
    async fn control_routes_reject_missing_token() {
        let app = app_with_token(TOKEN);
        let Ok(request) = Request::builder().uri("/status").body(Body::empty()) else {
            panic!("bad request");
        };
        let (status, json) = call(&app, request).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(json, serde_json::json!({ "error": "unauthorized" }));
    }

    #[tokio::test]
    async fn wrong_header_token_is_rejected() {
        let app = app_with_token(TOKEN);
        let Ok(request) = Request::builder()
            .uri("/status")
            .header(auth::TOKEN_HEADER, "nope")
            .body(Body::empty())
        else {
            panic!("bad request");
        };
        let (status, _) = call(&app, request).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn token_accepted_from_header_and_query() {
        let app = app_with_token(TOKEN);
        let (status, json) = call(&app, get_request("/status")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["flutter"], false);
        assert_eq!(json["webClients"], 0);

        let Ok(request) = Request::builder()
            .uri("/status?token=s3cret")
            .body(Body::empty())
        else {
            panic!("bad request");
        };
        let (status, _) = call(&app, request).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn header_token_takes_precedence_over_query() {
        let app = app_with_token(TOKEN);
        let Ok(request) = Request::builder()
            .uri("/status?token=s3cret")
            .header(auth::TOKEN_HEADER, "bad")
            .body(Body::empty())
        else {
            panic!("bad request");
        };
        let (status, json) = call(&app, request).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(json["error"], "unauthorized");

        let Ok(request) = Request::builder()
            .uri("/status?token=s3cret")
            .header(auth::TOKEN_HEADER, "   ")
            .body(Body::empty())
        else {
            panic!("bad request");
        };
        let (status, _) = call(&app, request).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn query_token_takes_precedence_over_body() {
        let app = app_with_token(TOKEN);
        let body = r#"{"token":"s3cret","character":"terry","cues":[{"time":0.0,"phoneme":"AA"}]}"#;
        let Ok(request) = Request::builder()
            .method("POST")
            .uri("/lipsync?token=bad")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body))
        else {
            panic!("bad request");
        };
        let (status, _) = call(&app, request).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn token_accepted_from_json_body() {
        let app = app_with_token(TOKEN);
        let body = r#"{"token":"s3cret","character":"nigel","cues":[{"time":0.0,"phoneme":"AA"}]}"#;
        let Ok(request) = Request::builder()
            .method("POST")
            .uri("/lipsync")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body))
        else {
            panic!("bad request");
        };
        let (status, json) = call(&app, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["started"], true);
        assert_eq!(json["sequence"], "lipsync");
    }

    #[tokio::test]
    async fn open_mode_needs_no_token() {
        let app = app_with_token("");
        let Ok(request) = Request::builder().uri("/pupils?x=5").body(Body::empty()) else {
            panic!("bad request");
        };
        let (status, json) = call(&app, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["sent"], false);
    }

    #[tokio::test]
    async fn head_and_pupils_are_clamped() {
        let app = app_with_token(TOKEN);
        let (status, json) = call(&app, get_request("/terry/head?angle=99")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["angle"], 40.0);
        assert_eq!(json["sent"], false);

        let (_, json) = call(&app, get_request("/pupils?x=-50&y=25")).await;
        assert_eq!(json["x"], -20.0);
        assert_eq!(json["y"], 10.0);

        let (_, json) = call(&app, get_request("/status")).await;
        assert_eq!(json["state"]["terry"]["headAngle"], 40.0);
    }

    #[tokio::test]
    async fn infinite_angle_clamps_to_limit() {
        let app = app_with_token(TOKEN);
        let (status, json) = call(&app, get_request("/nigel/head?angle=-inf")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["angle"], -40.0);
    }

    #[tokio::test]
    async fn lip_rounds_and_clamps() {
        let app = app_with_token(TOKEN);
        let (_, json) = call(&app, get_request("/nigel/lip?shape=12")).await;
        assert_eq!(json["shape"], 7);
        let (_, json) = call(&app, get_request("/nigel/lip")).await;
        assert_eq!(json["shape"], 0);
    }

    #[tokio::test]
    async fn invalid_parameters_are_bad_requests() {
        let app = app_with_token(TOKEN);
        let (status, _) = call(&app, get_request("/terry/lip?shape=wide")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, json) = call(&app, get_request("/bob/lip?shape=1")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "unknown character: bob");

        let (status, _) = call(&app, get_request("/terry/eyes?state=9")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn talk_and_eyes_echo() {
        let app = app_with_token(TOKEN);
        let (_, json) = call(&app, get_request("/terry/talk?on=1")).await;
        assert_eq!(json["talking"], true);
        let (_, json) = call(&app, get_request("/terry/talk?on=yes")).await;
        assert_eq!(json["talking"], false);

        let (_, json) = call(&app, get_request("/nigel/eyes?state=squint")).await;
        assert_eq!(json["eyes"], "squint");
        let (_, json) = call(&app, get_request("/nigel/roast?level=5")).await;
        assert_eq!(json["roast"], 2);
    }

    #[tokio::test]
    async fn look_uses_preset_offsets() {
        let app = app_with_token(TOKEN);
        let (_, json) = call(&app, get_request("/look?direction=upleft")).await;
        assert_eq!(json["direction"], "upleft");
        assert_eq!(json["x"], -10.0);
        assert_eq!(json["y"], -5.0);

        let (_, json) = call(&app, get_request("/look?direction=sideways")).await;
        assert_eq!(json["direction"], "center");
    }

    #[tokio::test]
    async fn animation_name_is_required() {
        let app = app_with_token(TOKEN);
        let (status, json) = call(&app, get_request("/anim/play")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "name required");

        let (status, json) = call(&app, get_request("/anim/stop?name=blink")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["action"], "stop");
        assert_eq!(json["animation"], "blink");
    }

    #[tokio::test]
    async fn unknown_reaction_lists_alternatives() {
        let app = app_with_token(TOKEN);
        let (status, json) = call(&app, get_request("/react?name=moonwalk")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let Some(available) = json["available"].as_array() else {
            panic!("no available list: {json}");
        };
        assert_eq!(available.len(), 11);
    }

    #[tokio::test]
    async fn reset_returns_neutral_state() {
        let app = app_with_token(TOKEN);
        let _ = call(&app, get_request("/terry/head?angle=20")).await;
        let (status, json) = call(&app, get_request("/reset")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["reset"], true);
        assert_eq!(json["state"]["terry"]["headAngle"], 0.0);
        assert_eq!(json["state"]["pupil"]["x"], 0.0);
    }

    #[tokio::test]
    async fn rive_url_is_trimmed_and_stored() {
        let app = app_with_token(TOKEN);
        let Ok(request) = Request::builder()
            .method("POST")
            .uri("/admin/rive-url")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from("token=s3cret&url=%20https%3A%2F%2Fcdn.test%2Fa.riv%20"))
        else {
            panic!("bad request");
        };
        let (status, json) = call(&app, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["riveUrl"], "https://cdn.test/a.riv");

        let (_, json) = call(&app, get_request("/admin/config")).await;
        assert_eq!(json["riveUrl"], "https://cdn.test/a.riv");
        assert_eq!(json["theme"], "dark");
        assert_eq!(json["autoConnect"], true);

        let (_, json) = call(&app, get_request("/admin/reload-rive")).await;
        assert_eq!(json["message"], "Flutter not connected");
    }

    #[tokio::test]
    async fn submit_defaults_target() {
        let app = app_with_token(TOKEN);
        let Ok(request) = Request::builder()
            .method("POST")
            .uri("/submit")
            .header(auth::TOKEN_HEADER, TOKEN)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from("videoUrl=https%3A%2F%2Fclip.test%2Fx.mp4"))
        else {
            panic!("bad request");
        };
        let (status, json) = call(&app, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["received"], true);
        assert_eq!(json["target"], "Unknown");
    }

    #[tokio::test(start_paused = true)]
    async fn speak_waits_for_completion() {
        let app = app_with_token(TOKEN);
        let (status, json) = call(&app, get_request("/speak?text=hey")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["done"], true);
        assert_eq!(json["phonemes"], 3);
    }

    #[tokio::test(start_paused = true)]
    async fn idle_starts_once_and_stops() {
        let app = app_with_token(TOKEN);
        let (_, json) = call(&app, get_request("/idle/start")).await;
        assert_eq!(json["started"], true);
        let (_, json) = call(&app, get_request("/idle/start")).await;
        assert_eq!(json["started"], false);

        let (_, json) = call(&app, get_request("/sequences")).await;
        assert_eq!(json["running"], serde_json::json!(["idle"]));

        let (_, json) = call(&app, get_request("/idle/stop?reset=true")).await;
        assert_eq!(json["stopped"], 1);
        assert_eq!(json["reset"], true);

        let (_, json) = call(&app, get_request("/sequences")).await;
        assert_eq!(json["running"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn openapi_document_is_served() {
        let app = app_with_token(TOKEN);
        let Ok(request) = Request::builder()
            .uri("/api-docs/openapi.json")
            .body(Body::empty())
        else {
            panic!("bad request");
        };
        let (status, json) = call(&app, request).await;
        assert_eq!(status, StatusCode::OK);
        assert!(json["paths"]["/reset"].is_object());
    }
}
