use sea_orm::entity::prelude::*;
use sea_orm::{ConnectionTrait, NotSet, Set};
use serde::{Deserialize, Serialize};

use crate::errors::ModelError;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "hogwarts_user")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub username: String,
    /// Encoded password hash; never the plaintext.
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub enabled: bool,
    pub role: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

pub fn validate_username(username: &str) -> Result<(), ModelError> {
    if username.trim().is_empty() { return Err(ModelError::Validation("username is required".into())); }
    if username.len() > 64 { return Err(ModelError::Validation("username too long (<=64)".into())); }
    Ok(())
}

pub fn validate_role(role: &str) -> Result<(), ModelError> {
    if role.trim().is_empty() { return Err(ModelError::Validation("role is required".into())); }
    Ok(())
}

pub async fn create<C: ConnectionTrait>(
    db: &C,
    username: &str,
    password_hash: String,
    enabled: bool,
    role: &str,
) -> Result<Model, ModelError> {
    validate_username(username)?;
    validate_role(role)?;
    if password_hash.trim().is_empty() {
        return Err(ModelError::Validation("password hash required".into()));
    }
    let am = ActiveModel {
        id: NotSet,
        username: Set(username.to_string()),
        password_hash: Set(password_hash),
        enabled: Set(enabled),
        role: Set(role.to_string()),
    };
    Ok(am.insert(db).await?)
}

pub async fn find_by_username<C: ConnectionTrait>(db: &C, username: &str) -> Result<Option<Model>, ModelError> {
    Ok(Entity::find().filter(Column::Username.eq(username)).one(db).await?)
}
