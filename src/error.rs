use rocket::http::Status;
use rocket::response::{self, Responder};
use rocket::Request;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("database pool error: {0}")]
    Pool(#[from] r2d2::Error),
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("configuration error: {0}")]
    Config(#[from] rocket::figment::Error),
    #[error("unit not found: {0}")]
    UnitNotFound(i64),
    #[error("record not found: {0}")]
    RecordNotFound(i64),
}

impl AppError {
    pub fn status(&self) -> Status {
        match self {
            AppError::UnitNotFound(_) | AppError::RecordNotFound(_) => Status::NotFound,
            AppError::Pool(_) | AppError::Database(_) | AppError::Io(_) | AppError::Config(_) => {
                Status::InternalServerError
            }
        }
    }
}

/// Logs the failure and hands the status to the registered catchers.
impl<'r> Responder<'r, 'static> for AppError {
    fn respond_to(self, req: &'r Request<'_>) -> response::Result<'static> {
        let status = self.status();
        if status.code >= 500 {
            tracing::error!(error = %self, uri = %req.uri(), "request failed");
        } else {
            tracing::warn!(error = %self, uri = %req.uri(), "request rejected");
        }
        Err(status)
    }
}
