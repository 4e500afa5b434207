use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "show")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i32,
    pub name: Option<String>,
    pub language: Option<String>,
    pub network_id: Option<i32>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::network::Entity",
        from = "Column::NetworkId",
        to = "super::network::Column::Id",
        on_delete = "Restrict"
    )]
    Network,
    #[sea_orm(has_one = "super::externals::Entity")]
    Externals,
    #[sea_orm(has_one = "super::rating::Entity")]
    Rating,
}

impl Related<super::network::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Network.def()
    }
}

impl Related<super::externals::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Externals.def()
    }
}

impl Related<super::rating::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Rating.def()
    }
}

impl Related<super::genre::Entity> for Entity {
    fn to() -> RelationDef {
        super::show_genre::Relation::Genre.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::show_genre::Relation::Show.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
