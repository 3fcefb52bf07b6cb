//! @acp:module "Server API"
//! @acp:summary "Wire types, transport and response interpretation"
//! @acp:domain cli
//! @acp:layer api
//!
//! Question bank server API
//!
//! Wire types, the raw [`Transport`] seam, status interpretation and the
//! typed [`QuestionBank`] client.

pub mod bank;
pub mod outcome;
pub mod transport;
pub mod wire;

pub use bank::QuestionBank;
pub use outcome::{
    CreateOutcome, Failure, FailureKind, Limits, LoadOutcome, PoolOutcome, Shortfall,
    ShortfallReason, SubmitOutcome, SubsetOutcome,
};
pub use transport::{HttpTransport, RawResponse, Transport};
pub use wire::{
    ErrorBody, LoadedQuestion, LoadedTest, ModifyOrder, ModifyRequest, NewQuestion, PoolQuery,
    Question, QuestionFilter, QuestionId, QuestionOrder, SelectionResult, TestCreationRequest,
    TestId, TestMetadata, TestType,
};
