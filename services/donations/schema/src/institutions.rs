use sea_orm::entity::prelude::*;

/// Partner organisation that receives donations.
///
/// `type` holds one of `foundation`, `ngo`, `local_collection`.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "institutions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub name: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    #[sea_orm(column_name = "type")]
    pub institution_type: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::donations::Entity")]
    Donations,
    #[sea_orm(has_many = "super::institution_categories::Entity")]
    InstitutionCategories,
}

impl Related<super::donations::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Donations.def()
    }
}

impl Related<super::institution_categories::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::InstitutionCategories.def()
    }
}

impl Related<super::categories::Entity> for Entity {
    fn to() -> RelationDef {
        super::institution_categories::Relation::Category.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::institution_categories::Relation::Institution.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
