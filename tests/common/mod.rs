//! Scripted collaborators for flow tests

#![allow(dead_code)]

use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::Mutex;

use serde_json::Value;
use testbank::api::TestId;
use testbank::{Artifact, ArtifactViewer, Interaction, Notice, RawResponse, Transport};

/// A request as the transport saw it
#[derive(Debug, Clone, PartialEq)]
pub enum Sent {
    Json { path: String, body: Value },
    Form { path: String, fields: Vec<(String, String)> },
    Get { path: String, query: Vec<(String, String)> },
}

impl Sent {
    pub fn path(&self) -> &str {
        match self {
            Sent::Json { path, .. } | Sent::Form { path, .. } | Sent::Get { path, .. } => path,
        }
    }

    pub fn json(&self) -> &Value {
        match self {
            Sent::Json { body, .. } => body,
            other => panic!("expected a JSON request, got {:?}", other),
        }
    }
}

/// Answers requests from a queue and records what was sent
#[derive(Default)]
pub struct ScriptedTransport {
    replies: Mutex<VecDeque<RawResponse>>,
    sent: Mutex<Vec<Sent>>,
}

impl ScriptedTransport {
    pub fn new(replies: Vec<RawResponse>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().clone()
    }

    pub fn sent_to(&self, path: &str) -> Vec<Sent> {
        self.sent()
            .into_iter()
            .filter(|s| s.path() == path)
            .collect()
    }

    pub fn remaining(&self) -> usize {
        self.replies.lock().unwrap().len()
    }

    fn reply(&self, sent: Sent) -> testbank::Result<RawResponse> {
        let path = sent.path().to_string();
        self.sent.lock().unwrap().push(sent);
        let reply = self.replies.lock().unwrap().pop_front();
        Ok(reply.unwrap_or_else(|| panic!("no scripted reply left for {}", path)))
    }
}

fn owned(pairs: &[(&str, String)]) -> Vec<(String, String)> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}

impl Transport for ScriptedTransport {
    async fn post_json(&self, path: &str, body: &Value) -> testbank::Result<RawResponse> {
        self.reply(Sent::Json {
            path: path.to_string(),
            body: body.clone(),
        })
    }

    async fn post_form(&self, path: &str, fields: &[(&str, String)]) -> testbank::Result<RawResponse> {
        self.reply(Sent::Form {
            path: path.to_string(),
            fields: owned(fields),
        })
    }

    async fn get(&self, path: &str, query: &[(&str, String)]) -> testbank::Result<RawResponse> {
        self.reply(Sent::Get {
            path: path.to_string(),
            query: owned(query),
        })
    }
}

/// Records everything shown and answers confirmations from a queue
#[derive(Debug, Default)]
pub struct ScriptedInteraction {
    pub notices: Vec<(Notice, String)>,
    pub questions: Vec<String>,
    pub answers: VecDeque<bool>,
    pub overlay: bool,
    pub overlay_shown: usize,
    /// Whether the overlay was up when a confirmation was asked
    pub overlay_during_confirm: bool,
}

impl ScriptedInteraction {
    pub fn answering(answers: &[bool]) -> Self {
        Self {
            answers: answers.iter().copied().collect(),
            ..Self::default()
        }
    }

    pub fn said(&self, text: &str) -> bool {
        self.notices.iter().any(|(_, m)| m.contains(text))
    }
}

impl Interaction for ScriptedInteraction {
    fn notify(&mut self, notice: Notice, message: &str) {
        self.notices.push((notice, message.to_string()));
    }

    fn confirm(&mut self, message: &str) -> testbank::Result<bool> {
        self.overlay_during_confirm |= self.overlay;
        self.questions.push(message.to_string());
        Ok(self.answers.pop_front().unwrap_or(false))
    }

    fn prompt(&mut self, _message: &str, default: Option<&str>) -> testbank::Result<Option<String>> {
        Ok(default.map(str::to_string))
    }

    fn show_overlay(&mut self, _message: &str) {
        if !self.overlay {
            self.overlay_shown += 1;
        }
        self.overlay = true;
    }

    fn hide_overlay(&mut self) {
        self.overlay = false;
    }
}

/// Counts opened documents without touching the filesystem
#[derive(Debug, Default)]
pub struct CountingViewer {
    pub opened: Vec<TestId>,
}

impl ArtifactViewer for CountingViewer {
    fn open(&mut self, artifact: &Artifact) -> testbank::Result<Option<PathBuf>> {
        self.opened.push(artifact.test_id);
        Ok(Some(PathBuf::from(artifact.file_name())))
    }
}

pub fn json(status: u16, body: Value) -> RawResponse {
    RawResponse::json(status, &body)
}

pub fn document() -> RawResponse {
    RawResponse::new(reqwest::StatusCode::OK, "<html>test</html>")
        .with_content_type("text/html")
}
