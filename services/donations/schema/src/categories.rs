use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "categories")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub name: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::institution_categories::Entity")]
    InstitutionCategories,
    #[sea_orm(has_many = "super::donation_categories::Entity")]
    DonationCategories,
}

impl Related<super::institution_categories::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::InstitutionCategories.def()
    }
}

impl Related<super::donation_categories::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DonationCategories.def()
    }
}

impl Related<super::institutions::Entity> for Entity {
    fn to() -> RelationDef {
        super::institution_categories::Relation::Institution.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::institution_categories::Relation::Category.def().rev())
    }
}

impl Related<super::donations::Entity> for Entity {
    fn to() -> RelationDef {
        super::donation_categories::Relation::Donation.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::donation_categories::Relation::Category.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
