use sea_orm::entity::prelude::*;
use sea_orm::sea_query::Expr;
use sea_orm::{ConnectionTrait, Set};
use serde::{Deserialize, Serialize};

use crate::errors::ModelError;
use crate::wizard;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "artifact")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub image_url: String,
    /// Back-reference to the owning wizard; `None` means unowned.
    pub owner_id: Option<i32>,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Owner,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Owner => Entity::belongs_to(wizard::Entity)
                .from(Column::OwnerId)
                .to(wizard::Column::Id)
                .on_delete(sea_orm::sea_query::ForeignKeyAction::SetNull)
                .into(),
        }
    }
}

impl Related<wizard::Entity> for Entity {
    fn to() -> RelationDef { Relation::Owner.def() }
}

impl ActiveModelBehavior for ActiveModel {}

pub fn validate(name: &str, description: &str, image_url: &str) -> Result<(), ModelError> {
    if name.trim().is_empty() { return Err(ModelError::Validation("name is required".into())); }
    if description.trim().is_empty() { return Err(ModelError::Validation("description is required".into())); }
    if image_url.trim().is_empty() { return Err(ModelError::Validation("imageUrl is required".into())); }
    Ok(())
}

/// Insert an unowned artifact under an externally generated id.
pub async fn create<C: ConnectionTrait>(
    db: &C,
    id: &str,
    name: &str,
    description: &str,
    image_url: &str,
) -> Result<Model, ModelError> {
    validate(name, description, image_url)?;
    let am = ActiveModel {
        id: Set(id.to_string()),
        name: Set(name.to_string()),
        description: Set(description.to_string()),
        image_url: Set(image_url.to_string()),
        owner_id: Set(None),
    };
    Ok(am.insert(db).await?)
}

/// Clear `owner_id` on every artifact owned by `wizard_id`; returns rows touched.
pub async fn detach_all<C: ConnectionTrait>(db: &C, wizard_id: i32) -> Result<u64, ModelError> {
    let res = Entity::update_many()
        .col_expr(Column::OwnerId, Expr::value(sea_orm::Value::Int(None)))
        .filter(Column::OwnerId.eq(wizard_id))
        .exec(db)
        .await?;
    Ok(res.rows_affected)
}
