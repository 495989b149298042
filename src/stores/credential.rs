use super::CredentialStore;
use crate::entities::user_entity as users;
use crate::error::{AppError, AppResult};
use crate::models::{NewUser, User};
use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};

pub struct SeaOrmCredentialStore {
    pool: DatabaseConnection,
}

impl SeaOrmCredentialStore {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CredentialStore for SeaOrmCredentialStore {
    async fn find_by_mobile(&self, mobile: &str) -> AppResult<Option<User>> {
        let user = users::Entity::find()
            .filter(users::Column::Mobile.eq(mobile))
            .one(&self.pool)
            .await?;
        Ok(user.map(User::from))
    }

    async fn create(&self, user: NewUser) -> AppResult<User> {
        let now = Utc::now();
        let model = users::ActiveModel {
            mobile: Set(user.mobile.clone()),
            first_name: Set(user.first_name),
            last_name: Set(user.last_name),
            email: Set(user.email),
            verified: Set(false),
            device_id: Set(user.device_id),
            created_at: Set(Some(now)),
            updated_at: Set(Some(now)),
            ..Default::default()
        };

        // a taken mobile inserts nothing instead of raising a unique violation
        let inserted = users::Entity::insert(model)
            .on_conflict(
                OnConflict::column(users::Column::Mobile)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&self.pool)
            .await?;
        if inserted == 0 {
            return Err(AppError::Conflict(format!(
                "Mobile {} is already registered",
                user.mobile
            )));
        }

        self.find_by_mobile(&user.mobile).await?.ok_or_else(|| {
            AppError::InternalError(format!("User {} missing after insert", user.mobile))
        })
    }

    async fn update_verified(&self, mobile: &str, verified: bool) -> AppResult<()> {
        let result = users::Entity::update_many()
            .col_expr(users::Column::Verified, Expr::value(verified))
            .col_expr(users::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(users::Column::Mobile.eq(mobile))
            .exec(&self.pool)
            .await?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound("User not found".to_string()));
        }
        Ok(())
    }
}
