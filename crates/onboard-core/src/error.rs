use crate::steps::StepId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OnboardError {
    #[error("not initialized: run 'onboard init'")]
    NotInitialized,

    #[error("invalid value for {field}: '{value}'")]
    InvalidValue { field: &'static str, value: String },

    #[error("body type '{body_type}' is not offered for sex '{sex}'")]
    BodyTypeOutOfDomain { body_type: String, sex: String },

    #[error("step {step} is incomplete: {reason}")]
    Incomplete { step: StepId, reason: String },

    #[error("step {0} is the last step: finalize the flow instead")]
    AtTerminal(StepId),

    #[error("already at the landing step")]
    AtStart,

    #[error("step {0} does not accept this answer")]
    WrongStep(StepId),

    #[error("flow not finished: currently at step {0}")]
    NotFinished(StepId),

    #[error("flow already finalized")]
    Finalized,

    #[error("no onboarding record in the hand-off slot")]
    NoHandoffRecord,

    #[error("signup form invalid: {0}")]
    InvalidForm(String),

    #[error("signup rejected: {0}")]
    SignupRejected(String),

    #[error("signup transport error: {0}")]
    SignupTransport(String),

    #[error("hand-off store error: {0}")]
    Store(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, OnboardError>;
