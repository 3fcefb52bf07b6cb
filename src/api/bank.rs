//! @acp:module "Question Bank Client"
//! @acp:summary "Typed calls for the test-authoring endpoints"
//! @acp:domain cli
//! @acp:layer service
//!
//! Question bank client
//!
//! Typed calls for the test-authoring endpoints on top of a [`Transport`].

use tracing::{debug, info};

use super::outcome::{
    classify_creation, classify_load, classify_pool, classify_submit, classify_subset,
    CreateOutcome, Limits, LoadOutcome, PoolOutcome, SubmitOutcome, SubsetOutcome,
};
use super::transport::Transport;
use super::wire::{
    ModifyRequest, NewQuestion, PoolEntry, PoolQuery, Question, SubsetRequest,
    TestCreationRequest, TestId,
};
use crate::artifact::Artifact;
use crate::config::Endpoints;
use crate::error::{Result, TestbankError};

pub struct QuestionBank<T> {
    transport: T,
    endpoints: Endpoints,
}

impl<T: Transport> QuestionBank<T> {
    pub fn new(transport: T, endpoints: Endpoints) -> Self {
        Self {
            transport,
            endpoints,
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    /// Retrieve the questions matching a filter (random pool or manual search)
    pub async fn request_pool(&self, query: &PoolQuery) -> Result<PoolOutcome> {
        let path = &self.endpoints.pool;
        let response = self
            .transport
            .post_json(path, &serde_json::to_value(query)?)
            .await?;
        info!(status = response.status.as_u16(), "pool request answered");
        classify_pool(path, &response)
    }

    /// Ask the server to pick `limits.count` questions totalling at most
    /// `limits.max_points`
    pub async fn select_subset(&self, pool: &[Question], limits: Limits) -> Result<SubsetOutcome> {
        let path = &self.endpoints.select;
        let request = SubsetRequest {
            question_pool: pool.iter().map(PoolEntry::from).collect(),
            num_questions: limits.count,
            max_points: limits.max_points,
        };
        debug!(
            pool = pool.len(),
            count = limits.count,
            max_points = limits.max_points,
            "requesting subset"
        );
        let response = self
            .transport
            .post_json(path, &serde_json::to_value(&request)?)
            .await?;
        classify_subset(path, &response)
    }

    pub async fn create_test(&self, request: &TestCreationRequest) -> Result<CreateOutcome> {
        let path = &self.endpoints.create;
        let response = self
            .transport
            .post_json(path, &serde_json::to_value(request)?)
            .await?;
        classify_creation(path, &response)
    }

    /// Fetch the rendered document for a created test
    pub async fn generate_artifact(&self, test_id: TestId) -> Result<Artifact> {
        let path = &self.endpoints.generate;
        let response = self
            .transport
            .post_form(path, &[("test_id", test_id.to_string())])
            .await?;
        if !response.status.is_success() {
            return Err(TestbankError::invalid_response(
                path.as_str(),
                response.status.as_u16(),
                "document generation failed",
            ));
        }
        Ok(Artifact {
            test_id,
            content_type: response.content_type,
            bytes: response.body,
        })
    }

    /// Questions and metadata of an existing test
    pub async fn load_test(&self, test_id: TestId) -> Result<LoadOutcome> {
        let path = format!(
            "{}/{}",
            self.endpoints.modify_load.trim_end_matches('/'),
            test_id
        );
        let response = self
            .transport
            .post_form(&path, &[("test_id", test_id.to_string())])
            .await?;
        classify_load(&path, &response)
    }

    pub async fn update_test(&self, request: &ModifyRequest) -> Result<SubmitOutcome> {
        let response = self
            .transport
            .post_json(
                &self.endpoints.modify_submit,
                &serde_json::to_value(request)?,
            )
            .await?;
        Ok(classify_submit(&response))
    }

    /// Submit a new question; the server replies with plain text
    pub async fn submit_question(&self, question: &NewQuestion) -> Result<String> {
        let path = &self.endpoints.process_question;
        let response = self
            .transport
            .post_form(path, &question.form_fields())
            .await?;
        if !response.status.is_success() {
            return Err(TestbankError::invalid_response(
                path.as_str(),
                response.status.as_u16(),
                response.text(),
            ));
        }
        Ok(response.text())
    }
}
