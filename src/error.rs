use crate::schemas::{ExpenseId, ParticipantId};
use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use serde_json::json;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Expense {expense} references unknown participant {participant}")]
    InvalidReference {
        expense: ExpenseId,
        participant: ParticipantId,
    },

    #[error("Group not found: {0}")]
    GroupNotFound(String),

    #[error("Group already exists: {0}")]
    GroupExists(String),

    #[error("Participant not found: {0}")]
    ParticipantNotFound(ParticipantId),

    #[error("Expense not found: {0}")]
    ExpenseNotFound(ExpenseId),

    #[error("Names can't be empty")]
    EmptyName,

    #[error("Expense amount must be a positive number, got {0}")]
    InvalidAmount(f64),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl ResponseError for Error {
    fn error_response(&self) -> HttpResponse {
        let status_code = self.status_code();

        HttpResponse::build(status_code).json(json!({
            "error": {
                "code": status_code.as_u16(),
                "message": self.to_string(),
                "type": self.error_type()
            }
        }))
    }

    fn status_code(&self) -> StatusCode {
        match self {
            Error::InvalidReference { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            Error::GroupNotFound(_) => StatusCode::NOT_FOUND,
            Error::GroupExists(_) => StatusCode::CONFLICT,
            Error::ParticipantNotFound(_) => StatusCode::NOT_FOUND,
            Error::ExpenseNotFound(_) => StatusCode::NOT_FOUND,
            Error::EmptyName => StatusCode::BAD_REQUEST,
            Error::InvalidAmount(_) => StatusCode::BAD_REQUEST,
            Error::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl Error {
    fn error_type(&self) -> &str {
        match self {
            Error::InvalidReference { .. } => "invalid_reference",
            Error::GroupNotFound(_) => "not_found",
            Error::GroupExists(_) => "duplicate_error",
            Error::ParticipantNotFound(_) => "not_found",
            Error::ExpenseNotFound(_) => "not_found",
            Error::EmptyName => "validation_error",
            Error::InvalidAmount(_) => "validation_error",
            Error::Config(_) => "config_error",
        }
    }
}
