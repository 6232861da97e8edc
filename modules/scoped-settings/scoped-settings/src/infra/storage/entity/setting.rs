use sea_orm::entity::prelude::*;
use time::{Date, OffsetDateTime};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "scoped_settings_setting")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub vendor: String,
    pub plugin: String,
    pub path: String,
    pub channel_code: Option<String>,
    pub locale_code: Option<String>,
    pub storage_type: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub text_value: Option<String>,
    pub boolean_value: Option<bool>,
    pub integer_value: Option<i64>,
    pub float_value: Option<f64>,
    pub datetime_value: Option<OffsetDateTime>,
    pub date_value: Option<Date>,
    pub json_value: Option<Json>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
