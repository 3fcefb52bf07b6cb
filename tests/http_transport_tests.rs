//! HTTP transport tests against a local fake server

mod common;

use std::time::Duration;

use common::ScriptedInteraction;
use serde_json::json;
use testbank::api::{QuestionBank, TestId};
use testbank::commands::{execute_modify, ModifyOptions};
use testbank::config::Endpoints;
use testbank::{Config, FileViewer, Flow, FlowOutcome, HttpTransport, Transport, UiState};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

/// Canned reply: status line, content type, body
type Reply = (&'static str, &'static str, String);

async fn read_request(socket: &mut TcpStream) -> String {
    let mut data = Vec::new();
    let mut buf = [0u8; 4096];
    loop {
        let n = socket.read(&mut buf).await.unwrap();
        if n == 0 {
            break;
        }
        data.extend_from_slice(&buf[..n]);

        let text = String::from_utf8_lossy(&data).to_string();
        if let Some(end) = text.find("\r\n\r\n") {
            let length = text[..end]
                .lines()
                .find_map(|l| {
                    let (name, value) = l.split_once(':')?;
                    name.eq_ignore_ascii_case("content-length")
                        .then(|| value.trim().parse::<usize>().ok())
                        .flatten()
                })
                .unwrap_or(0);
            if data.len() >= end + 4 + length {
                break;
            }
        }
    }
    String::from_utf8_lossy(&data).to_string()
}

/// Serves one reply per connection and hands back the raw requests
async fn fake_server(replies: Vec<Reply>) -> (String, JoinHandle<Vec<String>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let task = tokio::spawn(async move {
        let mut requests = Vec::new();
        for (status, content_type, body) in replies {
            let (mut socket, _) = listener.accept().await.unwrap();
            requests.push(read_request(&mut socket).await);

            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                content_type,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.flush().await.unwrap();
            let _ = socket.shutdown().await;
        }
        requests
    });

    (format!("http://{}", addr), task)
}

mod transport_tests {
    use super::*;

    #[tokio::test]
    async fn test_status_and_body_pass_through() {
        let (url, server) = fake_server(vec![(
            "422 Unprocessable Entity",
            "application/json",
            json!({"status": "error", "available_questions": 3}).to_string(),
        )])
        .await;
        let transport = HttpTransport::new(&url, Duration::from_secs(5)).unwrap();

        let response = transport
            .post_json("/select_questions", &json!({"num_questions": 5}))
            .await
            .unwrap();

        assert_eq!(response.status.as_u16(), 422);
        assert_eq!(response.content_type.as_deref(), Some("application/json"));
        let body: serde_json::Value = response.parse_json().unwrap();
        assert_eq!(body["available_questions"], 3);

        let requests = server.await.unwrap();
        assert!(requests[0].starts_with("POST /select_questions HTTP/1.1"));
        assert!(requests[0].contains("\"num_questions\":5"));
    }

    #[tokio::test]
    async fn test_form_and_query_encoding() {
        let (url, server) = fake_server(vec![
            ("200 OK", "text/html", "<p>ok</p>".to_string()),
            ("200 OK", "text/html", "<p>ok</p>".to_string()),
        ])
        .await;
        let transport = HttpTransport::new(&url, Duration::from_secs(5)).unwrap();

        transport
            .post_form("/generate_test", &[("test_id", "41".to_string())])
            .await
            .unwrap();
        transport
            .get(
                "/display_history",
                &[("testerId", "7".to_string()), ("testId", "41".to_string())],
            )
            .await
            .unwrap();

        let requests = server.await.unwrap();
        assert!(requests[0].to_ascii_lowercase().contains("application/x-www-form-urlencoded"));
        assert!(requests[0].ends_with("test_id=41"));
        assert!(requests[1].starts_with("GET /display_history?testerId=7&testId=41 HTTP/1.1"));
    }
}

mod end_to_end_tests {
    use super::*;

    #[tokio::test]
    async fn test_random_creation_over_http() {
        let (url, server) = fake_server(vec![
            (
                "200 OK",
                "application/json",
                json!({"selected_questions": [
                    {"question_id": 1, "max_points": 5},
                    {"question_id": 2, "max_points": 5}
                ]})
                .to_string(),
            ),
            (
                "200 OK",
                "application/json",
                json!({
                    "question_order": [{"question_id": 2, "question_order": 1}],
                    "total_score": 5
                })
                .to_string(),
            ),
            (
                "200 OK",
                "application/json",
                json!({"status": "success", "test_id": 41}).to_string(),
            ),
            ("200 OK", "text/html; charset=utf-8", "<h1>Quiz</h1>".to_string()),
        ])
        .await;

        let transport = HttpTransport::new(&url, Duration::from_secs(5)).unwrap();
        let bank = QuestionBank::new(transport, Endpoints::default());
        let mut ui = ScriptedInteraction::default();
        let dir = tempfile::tempdir().unwrap();
        let mut viewer = FileViewer::new(dir.path(), false);

        let mut state = UiState::default();
        state.form.question_count = "1".to_string();
        state.form.max_points = "5".to_string();
        state.form.test_name = "Quiz".to_string();
        state.form.test_description = "Week 1".to_string();

        let outcome = Flow::new(&bank, &mut ui, &mut viewer)
            .create_random(&mut state, 5)
            .await
            .unwrap();

        let path = dir.path().join("test-41.html");
        assert_eq!(
            outcome,
            FlowOutcome::Created {
                test_id: TestId(41),
                artifact: Some(path.clone()),
            }
        );
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "<h1>Quiz</h1>");

        let requests = server.await.unwrap();
        let lines: Vec<&str> = requests
            .iter()
            .map(|r| r.lines().next().unwrap_or_default())
            .collect();
        assert_eq!(
            lines,
            vec![
                "POST /get_questions HTTP/1.1",
                "POST /select_questions HTTP/1.1",
                "POST /test_creation HTTP/1.1",
                "POST /generate_test HTTP/1.1",
            ]
        );
    }

    #[tokio::test]
    async fn test_unreachable_server_is_reported() {
        // Bind then drop to get a port nobody listens on
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        drop(listener);

        let transport = HttpTransport::new(&url, Duration::from_secs(2)).unwrap();
        let bank = QuestionBank::new(transport, Endpoints::default());
        let mut ui = ScriptedInteraction::default();
        let mut viewer = common::CountingViewer::default();

        let mut state = UiState::default();
        state.form.question_count = "3".to_string();
        state.form.max_points = "10".to_string();
        state.form.test_name = "Quiz".to_string();
        state.form.test_description = "Week 1".to_string();

        let outcome = Flow::new(&bank, &mut ui, &mut viewer)
            .create_random(&mut state, 5)
            .await
            .unwrap();

        assert!(matches!(outcome, FlowOutcome::Failed(_)));
        assert!(state.is_reset());
        assert!(state.trigger_enabled());
        assert!(!ui.overlay);
        assert!(viewer.opened.is_empty());
    }
}

mod modify_command_tests {
    use super::*;

    fn loaded_test() -> Reply {
        (
            "200 OK",
            "application/json",
            json!({
                "question_order": [{"question_id": 3, "question_order": 1, "max_points": 4}],
                "total_score": 4,
                "test_name": "Midterm",
                "test_description": "Chapters 1-4",
                "is_active": true
            })
            .to_string(),
        )
    }

    fn config(url: &str, dir: &std::path::Path) -> Config {
        Config {
            server_url: url.to_string(),
            artifact_dir: Some(dir.to_path_buf()),
            open_artifacts: false,
            ..Config::default()
        }
    }

    fn adding(ids: &[&str]) -> ModifyOptions {
        ModifyOptions {
            test_id: 12,
            add: ids.iter().map(|id| id.to_string()).collect(),
            yes: true,
            ..ModifyOptions::default()
        }
    }

    #[tokio::test]
    async fn test_additions_without_question_cap_fail() {
        let (url, server) = fake_server(vec![loaded_test()]).await;
        let dir = tempfile::tempdir().unwrap();

        let err = execute_modify(adding(&["20"]), &config(&url, dir.path()))
            .await
            .unwrap_err();

        assert!(err.to_string().contains("could not be added"));
        let requests = server.await.unwrap();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].starts_with("POST /get-questions-for-modify/12 HTTP/1.1"));
    }

    #[tokio::test]
    async fn test_additions_with_empty_search_fail() {
        let (url, server) = fake_server(vec![
            loaded_test(),
            ("204 No Content", "application/json", String::new()),
        ])
        .await;
        let dir = tempfile::tempdir().unwrap();
        let mut options = adding(&["20", "21:2"]);
        options.question_max_points = Some(5);

        let err = execute_modify(options, &config(&url, dir.path()))
            .await
            .unwrap_err();

        assert!(err.to_string().contains("20, 21:2"));
        let requests = server.await.unwrap();
        assert_eq!(requests.len(), 2);
        assert!(requests
            .iter()
            .all(|r| !r.contains("/handle_test_creation_for_modify")));
    }
}
