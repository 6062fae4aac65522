use anyhow::Context as _;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait,
    ActiveValue::{NotSet, Set},
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    sea_query::Expr,
};

use otpgate_credential_schema::{otps, passwords};

use crate::domain::repository::{OtpRepository, PasswordRepository};
use crate::domain::types::{NewOneTimeCode, OneTimeCode, RotatingPassword};
use crate::error::CredentialServiceError;

// ── OTP repository ────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbOtpRepository {
    pub db: DatabaseConnection,
}

impl OtpRepository for DbOtpRepository {
    async fn save(&self, otp: &NewOneTimeCode) -> Result<OneTimeCode, CredentialServiceError> {
        let model = otps::ActiveModel {
            id: NotSet,
            code: Set(otp.code.clone()),
            created_at: Set(otp.created_at),
            expires_at: Set(otp.expires_at),
        }
        .insert(&self.db)
        .await
        .context("insert otp")?;
        Ok(otp_from_model(model))
    }

    async fn find_by_code(
        &self,
        code: &str,
    ) -> Result<Option<OneTimeCode>, CredentialServiceError> {
        let model = otps::Entity::find()
            .filter(otps::Column::Code.eq(code))
            .order_by_desc(otps::Column::Id)
            .one(&self.db)
            .await
            .context("find otp by code")?;
        Ok(model.map(otp_from_model))
    }

    async fn list(&self) -> Result<Vec<OneTimeCode>, CredentialServiceError> {
        let models = otps::Entity::find()
            .order_by_asc(otps::Column::Id)
            .all(&self.db)
            .await
            .context("list otps")?;
        Ok(models.into_iter().map(otp_from_model).collect())
    }
}

fn otp_from_model(model: otps::Model) -> OneTimeCode {
    OneTimeCode {
        id: model.id,
        code: model.code,
        created_at: model.created_at,
        expires_at: model.expires_at,
    }
}

// ── Password repository ───────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbPasswordRepository {
    pub db: DatabaseConnection,
}

impl PasswordRepository for DbPasswordRepository {
    async fn deactivate_all_active(&self) -> Result<u64, CredentialServiceError> {
        let result = passwords::Entity::update_many()
            .col_expr(passwords::Column::IsActive, Expr::value(false))
            .filter(passwords::Column::IsActive.eq(true))
            .exec(&self.db)
            .await
            .context("deactivate active passwords")?;
        Ok(result.rows_affected)
    }

    async fn create_active(
        &self,
        password: &str,
        created_at: DateTime<Utc>,
    ) -> Result<RotatingPassword, CredentialServiceError> {
        let model = passwords::ActiveModel {
            id: NotSet,
            password: Set(password.to_owned()),
            is_active: Set(true),
            created_at: Set(created_at),
        }
        .insert(&self.db)
        .await
        .context("insert active password")?;
        Ok(password_from_model(model))
    }

    async fn find_latest_active(&self) -> Result<Option<RotatingPassword>, CredentialServiceError> {
        let model = passwords::Entity::find()
            .filter(passwords::Column::IsActive.eq(true))
            .order_by_desc(passwords::Column::Id)
            .one(&self.db)
            .await
            .context("find latest active password")?;
        Ok(model.map(password_from_model))
    }
}

fn password_from_model(model: passwords::Model) -> RotatingPassword {
    RotatingPassword {
        id: model.id,
        password: model.password,
        is_active: model.is_active,
        created_at: model.created_at,
    }
}
