#![forbid(unsafe_code)]

//! @acp:module "Testbank Library"
//! @acp:summary "Question bank client for assembling tests and managing tester records"
//! @acp:domain cli
//! @acp:layer api
//! @acp:stability stable
//!
//! # testbank
//!
//! Terminal client for a question bank server: assemble tests by randomized
//! or manual selection, modify existing tests, submit questions and keep
//! tester attempt records.
//!
//! ## Randomized selection
//!
//! The server first returns a pool of questions matching the filters, then
//! picks a count- and point-bounded subset from it. When it cannot, it
//! reports what it can offer and the user decides whether to accept. See
//! [`flow::negotiation`].
//!
//! ## Example
//!
//! ```rust,no_run
//! use testbank::{Config, FileViewer, Flow, HttpTransport, QuestionBank, TerminalInteraction, UiState};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::default();
//!     let transport = HttpTransport::new(&config.server_url, config.request_timeout())?;
//!     let bank = QuestionBank::new(transport, config.endpoints.clone());
//!     let mut ui = TerminalInteraction::new(false);
//!     let mut viewer = FileViewer::new(config.artifact_dir(), true);
//!
//!     let mut state = UiState::default();
//!     state.form.question_count = "10".to_string();
//!     state.form.max_points = "50".to_string();
//!     state.form.test_name = "Routing quiz".to_string();
//!     state.form.test_description = "Week 3".to_string();
//!
//!     let outcome = Flow::new(&bank, &mut ui, &mut viewer)
//!         .create_random(&mut state, config.max_negotiation_rounds)
//!         .await?;
//!     println!("{:?}", outcome);
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod artifact;
pub mod commands;
pub mod compose;
pub mod config;
pub mod error;
pub mod flow;
pub mod records;
pub mod ui;

// Re-exports
pub use api::{
    Failure, FailureKind, HttpTransport, Limits, QuestionBank, RawResponse, Transport,
};
pub use artifact::{Artifact, ArtifactViewer, FileViewer};
pub use compose::TestDraft;
pub use config::Config;
pub use error::{Result, TestbankError};
pub use flow::{Flow, FlowOutcome};
pub use records::RecordBook;
pub use ui::{Interaction, Notice, TerminalInteraction, UiState};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
