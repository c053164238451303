use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    HttpResponse,
};
use bazaar_engine::{traits::StoreError, AccountApiError, AuthApiError, CartApiError, CatalogApiError};
use log::error;
use thiserror::Error;

use crate::data_objects::JsonResponse;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Could not initialize server. {0}")]
    InitializeError(String),
    #[error("An error occurred on the backend of the server. {0}")]
    BackendError(String),
    #[error("The service is temporarily unavailable. Please try again. {0}")]
    Unavailable(String),
    #[error("Could not read request body: {0}")]
    InvalidRequestBody(String),
    #[error("Could not read request path: {0}")]
    InvalidRequestPath(String),
    #[error("{0}")]
    ValidationError(String),
    #[error("{0}")]
    RuleViolation(String),
    #[error("The data was not found. {0}")]
    NoRecordFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("An I/O error happened in the server. {0}")]
    IOError(#[from] std::io::Error),
    #[error("Invalid server configuration. {0}")]
    ConfigurationError(String),
    #[error("UnspecifiedError. {0}")]
    Unspecified(String),
    #[error("Authentication Error. {0}")]
    AuthenticationError(#[from] AuthError),
}

impl ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequestBody(_) => StatusCode::BAD_REQUEST,
            Self::InvalidRequestPath(_) => StatusCode::BAD_REQUEST,
            Self::ValidationError(_) => StatusCode::BAD_REQUEST,
            Self::RuleViolation(_) => StatusCode::BAD_REQUEST,
            Self::NoRecordFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::AuthenticationError(e) => match e {
                AuthError::MissingToken => StatusCode::UNAUTHORIZED,
                AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
                AuthError::ValidationError(_) => StatusCode::UNAUTHORIZED,
                AuthError::PoorlyFormattedToken(_) => StatusCode::UNAUTHORIZED,
                AuthError::InsufficientPermissions(_) => StatusCode::FORBIDDEN,
            },
            Self::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::InitializeError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BackendError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::IOError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ConfigurationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unspecified(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        // Internal details stay in the log
        let message = if status.is_server_error() {
            error!("💻️ {self}");
            match status {
                StatusCode::SERVICE_UNAVAILABLE => "The service is temporarily unavailable. Please try again.".to_string(),
                _ => "Internal Server Error".to_string(),
            }
        } else {
            self.to_string()
        };
        HttpResponse::build(status).insert_header(ContentType::json()).json(JsonResponse::failure(message))
    }
}

#[derive(Debug, Clone, Error)]
pub enum AuthError {
    #[error("Access token missing")]
    MissingToken,
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Token is invalid or expired. {0}")]
    ValidationError(String),
    #[error("Access token is not in the correct format. {0}")]
    PoorlyFormattedToken(String),
    #[error("Insufficient Permissions. {0}")]
    InsufficientPermissions(String),
}

impl From<StoreError> for ServerError {
    fn from(e: StoreError) -> Self {
        if e.is_transient() {
            Self::Unavailable(e.to_string())
        } else {
            Self::BackendError(format!("Database error: {e}"))
        }
    }
}

impl From<CartApiError> for ServerError {
    fn from(e: CartApiError) -> Self {
        match e {
            CartApiError::Store(e) => e.into(),
            CartApiError::CustomerNotFound(_) |
            CartApiError::ProductNotFound(_) |
            CartApiError::ItemNotFound(_) |
            CartApiError::OrderNotFound(_) => Self::NoRecordFound(e.to_string()),
            CartApiError::ValidationError(_) => Self::ValidationError(e.to_string()),
            CartApiError::EmptyCart | CartApiError::ProductUnavailable(_) => Self::RuleViolation(e.to_string()),
            CartApiError::Conflict(_) => Self::Conflict(e.to_string()),
        }
    }
}

impl From<CatalogApiError> for ServerError {
    fn from(e: CatalogApiError) -> Self {
        match e {
            CatalogApiError::Store(e) => e.into(),
            CatalogApiError::ValidationError(_) => Self::ValidationError(e.to_string()),
            CatalogApiError::ProductNotFound(_) | CatalogApiError::MerchantNotFound(_) => {
                Self::NoRecordFound(e.to_string())
            },
        }
    }
}

impl From<AuthApiError> for ServerError {
    fn from(e: AuthApiError) -> Self {
        match e {
            AuthApiError::Store(e) => e.into(),
            AuthApiError::ValidationError(_) => Self::ValidationError(e.to_string()),
            AuthApiError::EmailInUse(_) => Self::RuleViolation(e.to_string()),
        }
    }
}

impl From<AccountApiError> for ServerError {
    fn from(e: AccountApiError) -> Self {
        match e {
            AccountApiError::Store(e) => e.into(),
            AccountApiError::CustomerNotFound(_) | AccountApiError::MerchantNotFound(_) => {
                Self::NoRecordFound(e.to_string())
            },
        }
    }
}
