use sea_orm::entity::prelude::*;

/// Scheduled pickup of donated bags.
///
/// `status` is one of `pending`, `in_progress`, `completed`. The two `is_taken_*`
/// flags move independently of it.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "donations")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub quantity: i32,
    pub institution_id: i32,
    pub address: String,
    pub city: String,
    pub zip_code: String,
    pub phone_number: String,
    pub pick_up_date: Date,
    pub pick_up_time: Time,
    #[sea_orm(column_type = "Text", nullable)]
    pub pick_up_comment: Option<String>,
    pub user_id: Option<Uuid>,
    pub is_taken_by_user: bool,
    pub is_taken_by_courier: bool,
    pub courier_id: Option<Uuid>,
    pub status: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::institutions::Entity",
        from = "Column::InstitutionId",
        to = "super::institutions::Column::Id",
        on_delete = "Cascade"
    )]
    Institution,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id",
        on_delete = "SetNull"
    )]
    User,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::CourierId",
        to = "super::users::Column::Id",
        on_delete = "SetNull"
    )]
    Courier,
    #[sea_orm(has_many = "super::donation_categories::Entity")]
    DonationCategories,
}

impl Related<super::institutions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Institution.def()
    }
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::donation_categories::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DonationCategories.def()
    }
}

impl Related<super::categories::Entity> for Entity {
    fn to() -> RelationDef {
        super::donation_categories::Relation::Category.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::donation_categories::Relation::Donation.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
