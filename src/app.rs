/*
 * Responsibility
 * - Config読み込み → 依存生成 → Router 組み立て
 * - tracing / panic hook の初期化
 * - axum::serve() で起動
 */
use anyhow::Result;
use axum::Router;
use std::{panic, process};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::{
    api,
    config::Config,
    repos::{book_repo::BookRepo, user_repo::UserRepo},
    services::auth::TokenService,
    state::AppState,
};

fn init_tracing() {
    // Prefer RUST_LOG if set; otherwise use a sensible default.
    // Ex:
    // RUST_LOG=info,bookshelf=debug,tower_http=debug cargo run
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn init_panic_hook(abort_on_panic: bool) {
    // Keep the default hook as a fallback (prints to stderr with location/payload).
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        // Always surface panics via tracing so they don't get "lost"
        // (stderr can be hidden depending on how the process is launched.)
        tracing::error!(?info, "panic");

        // In development, fail fast: crash the whole process so we notice
        // immediately. In production, prefer the default behavior (stderr)
        // and let the server keep running.
        if abort_on_panic {
            process::abort();
        } else {
            default_hook(info);
        }
    }))
}

pub async fn run() -> Result<()> {
    init_tracing();
    let config = Config::from_env()?;

    let abort_on_panic = !config.app_env.is_production();
    init_panic_hook(abort_on_panic);

    tracing::info!(
        "starting API in {:?} mode on {}",
        config.app_env,
        config.addr
    );

    let state = build_state(&config);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn build_state(config: &Config) -> AppState {
    AppState::new(
        TokenService::new(&config.jwt_secret, config.access_token_ttl_seconds),
        UserRepo::seeded(),
        BookRepo::seeded(),
    )
}

fn build_router(state: AppState) -> Router {
    api::routes(state.clone())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode, header};
    use jsonwebtoken::{Algorithm, EncodingKey, Header};
    use serde_json::{Value, json};
    use tower::ServiceExt;

    const SECRET: &str = "test-secret";

    fn test_app() -> Router {
        build_router(AppState::new(
            TokenService::new(SECRET, 3600),
            UserRepo::seeded(),
            BookRepo::seeded(),
        ))
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_text(resp: axum::response::Response) -> String {
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    async fn body_json(resp: axum::response::Response) -> Value {
        serde_json::from_str(&body_text(resp).await).unwrap()
    }

    async fn login_token(app: &Router) -> String {
        let resp = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/login",
                json!({"username": "user1", "password": "password1"}),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        body_json(resp).await["token"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn root_greets() {
        let resp = test_app().oneshot(get("/")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_text(resp).await, "Hello Mommy!");
    }

    #[tokio::test]
    async fn login_issues_verifiable_token() {
        let app = test_app();
        let token = login_token(&app).await;

        let svc = TokenService::new(SECRET, 3600);
        assert_eq!(svc.verify(&token).unwrap(), "user1");
    }

    #[tokio::test]
    async fn login_with_bad_credentials_is_401() {
        let app = test_app();
        for body in [
            json!({"username": "user1", "password": "password2"}),
            json!({"username": "nobody", "password": "password1"}),
        ] {
            let resp = app
                .clone()
                .oneshot(json_request("POST", "/login", body))
                .await
                .unwrap();
            assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
            // Uniform body: no hint about which field was wrong.
            let err = body_json(resp).await;
            assert_eq!(err["error"]["code"], "INVALID_CREDENTIALS");
        }
    }

    #[tokio::test]
    async fn login_with_malformed_body_is_400() {
        let req = Request::builder()
            .method("POST")
            .uri("/login")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("not json"))
            .unwrap();
        let resp = test_app().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn protected_route_welcomes_token_subject() {
        let app = test_app();
        let token = login_token(&app).await;

        let req = Request::builder()
            .uri("/protected")
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_text(resp).await, "Welcome, user1");
    }

    #[tokio::test]
    async fn protected_route_rejects_bad_authorization() {
        let app = test_app();

        // no header at all
        let resp = app.clone().oneshot(get("/protected")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        // wrong scheme / garbage token
        for value in ["Token abc", "Bearer ", "Bearer not.a.jwt"] {
            let req = Request::builder()
                .uri("/protected")
                .header(header::AUTHORIZATION, value)
                .body(Body::empty())
                .unwrap();
            let resp = app.clone().oneshot(req).await.unwrap();
            assert_eq!(resp.status(), StatusCode::UNAUTHORIZED, "header: {value:?}");
        }
    }

    #[tokio::test]
    async fn protected_route_rejects_expired_token() {
        let token = jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            &json!({"sub": "user1", "exp": chrono::Utc::now().timestamp() - 120}),
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        let req = Request::builder()
            .uri("/protected")
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap();
        let resp = test_app().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn book_lifecycle() {
        let app = test_app();

        let resp = app.clone().oneshot(get("/books")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_json(resp).await.as_array().unwrap().len(), 2);

        // create: two seeded books, so the next id is 3
        let resp = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/books",
                json!({"title": "T", "category": "C", "author": "A"}),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let created = body_json(resp).await;
        assert_eq!(
            created,
            json!({"id": 3, "title": "T", "category": "C", "author": "A"})
        );

        let resp = app.clone().oneshot(get("/books/3")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_json(resp).await, created);

        // full replace, path id wins
        let resp = app
            .clone()
            .oneshot(json_request(
                "PUT",
                "/books/3",
                json!({"id": 99, "title": "T2", "category": "C2", "author": "A2"}),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_json(resp).await["id"], 3);

        let resp = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri("/books/3")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);

        let resp = app.clone().oneshot(get("/books/3")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn create_ignores_client_supplied_id() {
        let resp = test_app()
            .oneshot(json_request(
                "POST",
                "/books",
                json!({"id": 99, "title": "T", "category": "C", "author": "A"}),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_json(resp).await["id"], 3);
    }

    #[tokio::test]
    async fn malformed_book_id_is_400_not_404() {
        let resp = test_app().oneshot(get("/books/abc")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn unknown_book_id_is_404() {
        let app = test_app();

        let resp = app.clone().oneshot(get("/books/99")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let resp = app
            .clone()
            .oneshot(json_request(
                "PUT",
                "/books/99",
                json!({"title": "T", "category": "C", "author": "A"}),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let resp = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri("/books/99")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        // nothing got mutated along the way
        let resp = app.oneshot(get("/books")).await.unwrap();
        assert_eq!(body_json(resp).await.as_array().unwrap().len(), 2);
    }
}
