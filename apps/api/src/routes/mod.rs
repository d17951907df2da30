pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post, put},
    Router,
};

use crate::presentation::page;
use crate::session::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let max_upload_bytes = state.config.max_upload_bytes;

    Router::new()
        .route("/health", get(health::health_handler))
        // Browser UI
        .route("/", get(page::handle_index))
        .route("/sessions/:id", get(page::handle_session_page))
        .route("/sessions/:id/uploads", post(page::handle_page_upload))
        .route("/sessions/:id/end", post(page::handle_page_end))
        // Session API
        .route("/api/v1/sessions", post(handlers::handle_create_session))
        .route("/api/v1/sessions/:id", delete(handlers::handle_end_session))
        .route(
            "/api/v1/sessions/:id/uploads",
            post(handlers::handle_upload),
        )
        .route(
            "/api/v1/sessions/:id/resumes",
            get(handlers::handle_list_resumes),
        )
        .route(
            "/api/v1/sessions/:id/resumes/:file_name",
            get(handlers::handle_get_resume),
        )
        .route(
            "/api/v1/sessions/:id/selection",
            put(handlers::handle_select_resume),
        )
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
        response::Response,
    };
    use serde_json::Value;
    use tower::ServiceExt;
    use uuid::Uuid;

    use super::*;
    use crate::config::Config;
    use crate::extraction::pdf::tests::pdf_fixture;
    use crate::llm_client::tests::MockCompletionClient;
    use crate::session::SessionRegistry;

    const BOUNDARY: &str = "resume-reader-test-boundary";
    const ACME_REPLY: &str = r#"{
        "name": "John Doe",
        "experience": [{"company_name": "Acme Corp", "position": "Software Engineer", "duration": "2019-2022"}]
    }"#;

    fn app(llm: Arc<MockCompletionClient>) -> (Router, SessionRegistry) {
        app_with_config(llm, Config::default())
    }

    fn app_with_config(llm: Arc<MockCompletionClient>, config: Config) -> (Router, SessionRegistry) {
        let sessions = SessionRegistry::new(config.session_idle_timeout);
        let state = AppState {
            llm,
            sessions: sessions.clone(),
            config,
        };
        (build_router(state), sessions)
    }

    fn multipart_body(api_key: Option<&str>, files: &[(&str, &[u8])]) -> Body {
        let mut body = Vec::new();
        if let Some(key) = api_key {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"api_key\"\r\n\r\n{key}\r\n"
                )
                .as_bytes(),
            );
        }
        for (name, bytes) in files {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"resumes\"; filename=\"{name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
                )
                .as_bytes(),
            );
            body.extend_from_slice(bytes);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        Body::from(body)
    }

    fn upload_request(uri: &str, body: Body) -> Request<Body> {
        Request::post(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(body)
            .unwrap()
    }

    async fn json_body(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn text_body(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn location(response: &Response) -> &str {
        response
            .headers()
            .get(header::LOCATION)
            .unwrap()
            .to_str()
            .unwrap()
    }

    async fn create_session(router: &Router) -> Uuid {
        let response = router
            .clone()
            .oneshot(Request::post("/api/v1/sessions").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let body = json_body(response).await;
        body["session_id"].as_str().unwrap().parse().unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let (router, _) = app(Arc::new(MockCompletionClient::replying("{}")));
        let response = router
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["service"], "resume-reader");
    }

    #[tokio::test]
    async fn test_index_starts_a_session() {
        let (router, sessions) = app(Arc::new(MockCompletionClient::replying("{}")));
        let response = router
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert!(location(&response).starts_with("/sessions/"));
        assert_eq!(sessions.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_abandoned_index_sessions_are_reclaimed() {
        let (router, sessions) = app(Arc::new(MockCompletionClient::replying("{}")));
        for _ in 0..50 {
            router
                .clone()
                .oneshot(Request::get("/").body(Body::empty()).unwrap())
                .await
                .unwrap();
        }
        assert_eq!(sessions.len(), 50);

        tokio::time::advance(Config::default().session_idle_timeout).await;
        router
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(sessions.len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_session_page_redirects_home() {
        let (router, _) = app(Arc::new(MockCompletionClient::replying("{}")));
        let uri = format!("/sessions/{}", Uuid::new_v4());
        let response = router
            .oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/");
    }

    #[tokio::test]
    async fn test_unknown_session_is_404_on_api() {
        let (router, _) = app(Arc::new(MockCompletionClient::replying("{}")));
        let uri = format!("/api/v1/sessions/{}/resumes", Uuid::new_v4());
        let response = router
            .oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = json_body(response).await;
        assert_eq!(body["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_api_upload_list_and_view() {
        let llm = Arc::new(MockCompletionClient::replying(ACME_REPLY));
        let (router, _) = app(llm.clone());
        let id = create_session(&router).await;
        let pdf = pdf_fixture(&["John Doe, Software Engineer at Acme Corp, 2019-2022"]);

        let response = router
            .clone()
            .oneshot(upload_request(
                &format!("/api/v1/sessions/{id}/uploads"),
                multipart_body(Some("sk-test"), &[("resume1.pdf", pdf.as_slice())]),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let outcome = json_body(response).await;
        assert_eq!(outcome["processed"][0], "resume1.pdf");

        let response = router
            .clone()
            .oneshot(
                Request::get(format!("/api/v1/sessions/{id}/resumes"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let list = json_body(response).await;
        assert_eq!(list["file_names"][0], "resume1.pdf");
        assert_eq!(list["selected"], "resume1.pdf");

        let response = router
            .oneshot(
                Request::get(format!("/api/v1/sessions/{id}/resumes/resume1.pdf"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let resume = json_body(response).await;
        assert_eq!(resume["view"]["title"], "Resume Analysis: resume1.pdf");
        let experience = resume["view"]["sections"]
            .as_array()
            .unwrap()
            .iter()
            .find(|s| s["kind"] == "experience")
            .unwrap();
        assert_eq!(
            experience["blocks"][0]["title"],
            "Software Engineer at Acme Corp"
        );
        assert_eq!(experience["blocks"][0]["fields"][0]["value"], "2019-2022");
        assert_eq!(llm.calls(), 1);
    }

    #[tokio::test]
    async fn test_reupload_does_not_call_llm_again() {
        let llm = Arc::new(MockCompletionClient::replying(ACME_REPLY));
        let (router, _) = app(llm.clone());
        let id = create_session(&router).await;
        let pdf = pdf_fixture(&["John Doe"]);
        let uri = format!("/api/v1/sessions/{id}/uploads");

        for _ in 0..2 {
            router
                .clone()
                .oneshot(upload_request(
                    &uri,
                    multipart_body(Some("sk-test"), &[("resume1.pdf", pdf.as_slice())]),
                ))
                .await
                .unwrap();
        }

        assert_eq!(llm.calls(), 1);
    }

    #[tokio::test]
    async fn test_api_upload_without_key_is_rejected() {
        let llm = Arc::new(MockCompletionClient::replying(ACME_REPLY));
        let (router, sessions) = app(llm.clone());
        let id = create_session(&router).await;
        let pdf = pdf_fixture(&["John Doe"]);

        let response = router
            .oneshot(upload_request(
                &format!("/api/v1/sessions/{id}/uploads"),
                multipart_body(Some("   "), &[("resume1.pdf", pdf.as_slice())]),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert_eq!(llm.calls(), 0);
        assert!(sessions.get(id).unwrap().lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_oversized_upload_is_413() {
        let llm = Arc::new(MockCompletionClient::replying(ACME_REPLY));
        let config = Config {
            max_upload_bytes: 1024,
            ..Config::default()
        };
        let (router, _) = app_with_config(llm.clone(), config);
        let id = create_session(&router).await;
        let big = vec![b'x'; 64 * 1024];

        let response = router
            .oneshot(upload_request(
                &format!("/api/v1/sessions/{id}/uploads"),
                multipart_body(Some("sk-test"), &[("resume1.pdf", big.as_slice())]),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        let body = json_body(response).await;
        assert_eq!(body["error"]["code"], "UPLOAD_TOO_LARGE");
        assert_eq!(llm.calls(), 0);
    }

    #[tokio::test]
    async fn test_txt_upload_leaves_selector_unchanged() {
        let llm = Arc::new(MockCompletionClient::replying(ACME_REPLY));
        let (router, _) = app(llm.clone());
        let id = create_session(&router).await;

        let response = router
            .clone()
            .oneshot(upload_request(
                &format!("/api/v1/sessions/{id}/uploads"),
                multipart_body(Some("sk-test"), &[("notes.txt", &b"John Doe"[..])]),
            ))
            .await
            .unwrap();
        let outcome = json_body(response).await;
        assert_eq!(outcome["notices"].as_array().unwrap().len(), 1);
        assert_eq!(outcome["notices"][0]["level"], "error");

        let response = router
            .oneshot(
                Request::get(format!("/api/v1/sessions/{id}/resumes"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let list = json_body(response).await;
        assert!(list["file_names"].as_array().unwrap().is_empty());
        assert!(list["selected"].is_null());
        assert_eq!(llm.calls(), 0);
    }

    #[tokio::test]
    async fn test_select_unknown_file_is_404() {
        let (router, _) = app(Arc::new(MockCompletionClient::replying(ACME_REPLY)));
        let id = create_session(&router).await;
        let response = router
            .oneshot(
                Request::put(format!("/api/v1/sessions/{id}/selection"))
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"file_name":"missing.pdf"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_end_session_drops_store() {
        let (router, sessions) = app(Arc::new(MockCompletionClient::replying(ACME_REPLY)));
        let id = create_session(&router).await;

        let response = router
            .clone()
            .oneshot(
                Request::delete(format!("/api/v1/sessions/{id}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert!(sessions.get(id).is_none());

        let response = router
            .oneshot(
                Request::delete(format!("/api/v1/sessions/{id}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_page_upload_then_render() {
        let llm = Arc::new(MockCompletionClient::replying(ACME_REPLY));
        let (router, sessions) = app(llm);
        let id = sessions.create();
        let pdf = pdf_fixture(&["John Doe, Software Engineer at Acme Corp, 2019-2022"]);

        let response = router
            .clone()
            .oneshot(upload_request(
                &format!("/sessions/{id}/uploads"),
                multipart_body(Some("sk-test"), &[("resume1.pdf", pdf.as_slice())]),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), format!("/sessions/{id}"));

        let response = router
            .oneshot(
                Request::get(format!("/sessions/{id}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let html = text_body(response).await;
        assert!(html.contains("Resume Analysis: resume1.pdf"));
        assert!(html.contains("Software Engineer at Acme Corp"));
    }

    #[tokio::test]
    async fn test_page_upload_without_key_warns() {
        let llm = Arc::new(MockCompletionClient::replying(ACME_REPLY));
        let (router, sessions) = app(llm.clone());
        let id = sessions.create();
        let pdf = pdf_fixture(&["John Doe"]);

        router
            .clone()
            .oneshot(upload_request(
                &format!("/sessions/{id}/uploads"),
                multipart_body(None, &[("resume1.pdf", pdf.as_slice())]),
            ))
            .await
            .unwrap();

        let response = router
            .oneshot(
                Request::get(format!("/sessions/{id}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let html = text_body(response).await;
        assert!(html.contains("Please enter your OpenAI API key to continue."));
        assert_eq!(llm.calls(), 0);
    }

    #[tokio::test]
    async fn test_page_end_redirects_home() {
        let (router, sessions) = app(Arc::new(MockCompletionClient::replying("{}")));
        let id = sessions.create();
        let response = router
            .oneshot(
                Request::post(format!("/sessions/{id}/end"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/");
        assert!(sessions.get(id).is_none());
    }
}
