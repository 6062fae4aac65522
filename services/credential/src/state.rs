use sea_orm::DatabaseConnection;

use crate::infra::db::{DbOtpRepository, DbPasswordRepository};
use crate::infra::mqtt::MqttPublisher;

/// Shared application state passed to every handler via axum `State`.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub publisher: MqttPublisher,
    /// Topic that receives the outcome of every verification.
    pub verification_topic: String,
}

impl AppState {
    pub fn otp_repo(&self) -> DbOtpRepository {
        DbOtpRepository {
            db: self.db.clone(),
        }
    }

    pub fn password_repo(&self) -> DbPasswordRepository {
        DbPasswordRepository {
            db: self.db.clone(),
        }
    }
}
