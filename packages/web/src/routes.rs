use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::handlers::{calendar, callback, debug};
use crate::state::AppState;

/// Application routes. The session layer is added by the caller so tests can use an
/// in-memory store.
pub fn router(state: AppState) -> Router {
    let mut router = Router::new()
        .route("/healthz", get(|| async { "ok" }))
        .route("/api/auth/google-calendar", get(calendar::google))
        .route("/api/auth/outlook-calendar", get(calendar::outlook))
        .route("/auth/callback", get(callback::auth_callback));

    if state.config.debug_endpoints {
        router = router
            .route("/api/debug/session", get(debug::session))
            .route("/api/debug/profile", get(debug::profile));
    }

    router.layer(TraceLayer::new_for_http()).with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use axum::response::Response;
    use chrono::Utc;
    use http_body_util::BodyExt;
    use pam_api::memory::{issue_session, MemoryIdentity, MemoryProfileStore};
    use pam_api::{AppConfig, Settings, Url, User};
    use serde_json::Value;
    use tower::ServiceExt;
    use tower_sessions::{MemoryStore, SessionManagerLayer};
    use uuid::Uuid;

    use super::*;

    struct TestApp {
        router: Router,
        identity: MemoryIdentity,
        profiles: MemoryProfileStore,
    }

    impl TestApp {
        fn new(settings: Settings) -> Self {
            let identity = MemoryIdentity::new();
            let profiles = MemoryProfileStore::new();
            let config = AppConfig::try_from(settings).unwrap();
            let state = AppState::new(
                config,
                Arc::new(identity.clone()),
                Arc::new(profiles.clone()),
            );
            let router = router(state).layer(SessionManagerLayer::new(MemoryStore::default()));

            Self {
                router,
                identity,
                profiles,
            }
        }

        fn configured() -> Self {
            Self::new(Settings {
                google_client_id: Some("google-client".into()),
                microsoft_client_id: Some("ms-client".into()),
                next_public_app_url: "https://pam.example.com".into(),
                ..Settings::default()
            })
        }

        async fn get(&self, uri: &str) -> Response {
            self.request(Request::builder().uri(uri)).await
        }

        async fn request(&self, builder: axum::http::request::Builder) -> Response {
            self.router
                .clone()
                .oneshot(builder.body(Body::empty()).unwrap())
                .await
                .unwrap()
        }

        fn sign_in(&self, code: &str) -> User {
            let user = User {
                id: Uuid::new_v4(),
                email: Some("parent@example.com".into()),
                created_at: Utc::now(),
            };
            self.identity.register(code, issue_session(user.clone()));
            user
        }
    }

    fn location(response: &Response) -> &str {
        response
            .headers()
            .get(header::LOCATION)
            .unwrap()
            .to_str()
            .unwrap()
    }

    fn session_cookie(response: &Response) -> String {
        let set_cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .unwrap()
            .to_str()
            .unwrap();
        set_cookie.split(';').next().unwrap().to_string()
    }

    async fn json(response: Response) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_healthz() {
        let app = TestApp::configured();
        let response = app.get("/healthz").await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_google_calendar_redirects_to_consent_screen() {
        let app = TestApp::configured();
        let response = app.get("/api/auth/google-calendar").await;

        assert_eq!(response.status(), StatusCode::FOUND);
        let url = Url::parse(location(&response)).unwrap();
        assert_eq!(url.host_str(), Some("accounts.google.com"));

        let params: std::collections::HashMap<_, _> = url.query_pairs().into_owned().collect();
        assert_eq!(params["client_id"], "google-client");
        assert_eq!(
            params["redirect_uri"],
            "https://pam.example.com/api/auth/google-calendar/callback"
        );
        assert_eq!(params["scope"], "https://www.googleapis.com/auth/calendar");
        assert_eq!(params["state"], "default");
        assert_eq!(params["access_type"], "offline");
        assert_eq!(params["prompt"], "consent");
    }

    #[tokio::test]
    async fn test_outlook_calendar_passes_scopes_and_state() {
        let app = TestApp::configured();
        let response = app
            .get("/api/auth/outlook-calendar?scopes=Calendars.Read%20offline_access&state=kid-7")
            .await;

        assert_eq!(response.status(), StatusCode::FOUND);
        let url = Url::parse(location(&response)).unwrap();
        assert_eq!(url.host_str(), Some("login.microsoftonline.com"));

        let params: std::collections::HashMap<_, _> = url.query_pairs().into_owned().collect();
        assert_eq!(params["client_id"], "ms-client");
        assert_eq!(params["scope"], "Calendars.Read offline_access");
        assert_eq!(params["state"], "kid-7");
        assert_eq!(params["response_mode"], "query");
    }

    #[tokio::test]
    async fn test_unconfigured_provider_returns_500_json() {
        let app = TestApp::new(Settings::default());

        for (uri, message) in [
            ("/api/auth/google-calendar", "Google OAuth not configured"),
            ("/api/auth/outlook-calendar", "Microsoft OAuth not configured"),
        ] {
            let response = app.get(uri).await;
            assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
            assert!(response.headers().get(header::LOCATION).is_none());
            assert_eq!(json(response).await, serde_json::json!({ "error": message }));
        }
    }

    #[tokio::test]
    async fn test_callback_without_code_is_idempotent() {
        let app = TestApp::configured();

        for _ in 0..3 {
            let response = app.get("/auth/callback").await;
            assert_eq!(response.status(), StatusCode::FOUND);
            assert_eq!(
                location(&response),
                "https://pam.example.com/login?error=auth_failed"
            );
        }
    }

    #[tokio::test]
    async fn test_callback_with_invalid_code() {
        let app = TestApp::configured();
        let response = app.get("/auth/callback?code=expired").await;

        assert_eq!(
            location(&response),
            "https://pam.example.com/login?error=auth_failed"
        );
    }

    #[tokio::test]
    async fn test_callback_recovery() {
        let app = TestApp::configured();
        app.sign_in("valid");

        let response = app.get("/auth/callback?code=valid&type=recovery").await;
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(
            location(&response),
            "https://pam.example.com/reset-password"
        );
    }

    #[tokio::test]
    async fn test_callback_without_profile_goes_to_onboarding() {
        let app = TestApp::configured();
        app.sign_in("valid");

        let response = app.get("/auth/callback?code=valid").await;
        assert_eq!(location(&response), "https://pam.example.com/onboarding");
    }

    #[tokio::test]
    async fn test_callback_with_profile_goes_to_dashboard() {
        let app = TestApp::configured();
        let user = app.sign_in("valid");
        app.profiles.insert_for(user.id);

        let response = app.get("/auth/callback?code=valid").await;
        assert_eq!(
            location(&response),
            "https://pam.example.com/dashboard/today"
        );
    }

    #[tokio::test]
    async fn test_callback_honours_next() {
        let app = TestApp::configured();
        let user = app.sign_in("valid");
        app.profiles.insert_for(user.id);

        let response = app
            .get("/auth/callback?code=valid&next=%2Fdashboard%2Fsettings")
            .await;
        assert_eq!(
            location(&response),
            "https://pam.example.com/dashboard/settings"
        );
    }

    #[tokio::test]
    async fn test_callback_with_repeated_code_goes_to_login() {
        let app = TestApp::configured();
        app.sign_in("a");

        let response = app.get("/auth/callback?code=a&code=b").await;
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(
            location(&response),
            "https://pam.example.com/login?error=auth_failed"
        );
    }

    #[tokio::test]
    async fn test_repeated_calendar_query_key_returns_500_json() {
        let app = TestApp::configured();

        let response = app.get("/api/auth/google-calendar?state=a&state=b").await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(response.headers().get(header::LOCATION).is_none());
        let body = json(response).await;
        assert_eq!(body["error"], "Invalid query string");
        assert!(body["message"].as_str().unwrap().contains("state"));
    }

    #[tokio::test]
    async fn test_callback_ignores_next_with_line_breaks() {
        let app = TestApp::configured();
        let user = app.sign_in("valid");
        app.profiles.insert_for(user.id);

        let response = app
            .get("/auth/callback?code=valid&next=%2Fdash%0D%0AX-Evil%3A1")
            .await;
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(
            location(&response),
            "https://pam.example.com/dashboard/today"
        );
        assert!(response.headers().get("x-evil").is_none());
    }

    #[tokio::test]
    async fn test_callback_sends_verifier_cookie_to_exchange() {
        let app = TestApp::configured();
        let user = User {
            id: Uuid::new_v4(),
            email: None,
            created_at: Utc::now(),
        };
        app.identity
            .register_pkce("valid", "v3r1f13r", issue_session(user.clone()));
        app.profiles.insert_for(user.id);

        let response = app
            .request(
                Request::builder()
                    .uri("/auth/callback?code=valid")
                    .header(
                        header::COOKIE,
                        "sb-pam-auth-token-code-verifier=%22v3r1f13r%22",
                    ),
            )
            .await;
        assert_eq!(
            location(&response),
            "https://pam.example.com/dashboard/today"
        );

        app.identity
            .register_pkce("again", "v3r1f13r", issue_session(user));
        let response = app.get("/auth/callback?code=again").await;
        assert_eq!(
            location(&response),
            "https://pam.example.com/login?error=auth_failed"
        );
    }

    #[tokio::test]
    async fn test_callback_redirects_on_request_origin() {
        let app = TestApp::configured();
        app.sign_in("valid");

        let response = app
            .request(
                Request::builder()
                    .uri("/auth/callback?code=valid")
                    .header(header::HOST, "localhost:3000")
                    .header("x-forwarded-proto", "http"),
            )
            .await;
        assert_eq!(location(&response), "http://localhost:3000/onboarding");
    }

    #[tokio::test]
    async fn test_debug_endpoints_follow_the_session() {
        let app = TestApp::configured();

        let anonymous = json(app.get("/api/debug/session").await).await;
        assert_eq!(anonymous["authenticated"], false);

        let user = app.sign_in("valid");
        let response = app.get("/auth/callback?code=valid").await;
        let cookie = session_cookie(&response);

        let response = app
            .request(
                Request::builder()
                    .uri("/api/debug/session")
                    .header(header::COOKIE, &cookie),
            )
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        let report = json(response).await;
        assert_eq!(report["authenticated"], true);
        assert_eq!(report["user"]["id"], user.id.to_string());
        assert_eq!(report["session"]["token_type"], "bearer");
        assert!(report["session"].get("access_token").is_none());

        let report = json(
            app.request(
                Request::builder()
                    .uri("/api/debug/profile")
                    .header(header::COOKIE, &cookie),
            )
            .await,
        )
        .await;
        assert_eq!(report["authenticated"], true);
        assert_eq!(report["has_profile"], false);

        app.profiles.insert_for(user.id);
        let report = json(
            app.request(
                Request::builder()
                    .uri("/api/debug/profile")
                    .header(header::COOKIE, &cookie),
            )
            .await,
        )
        .await;
        assert_eq!(report["has_profile"], true);
        assert_eq!(report["profile"]["id"], user.id.to_string());
    }

    #[tokio::test]
    async fn test_debug_endpoints_can_be_disabled() {
        let app = TestApp::new(Settings {
            enable_debug_endpoints: false,
            ..Settings::default()
        });

        let response = app.get("/api/debug/session").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
