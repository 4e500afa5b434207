use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Country::Table)
                    .if_not_exists()
                    .col(integer(Country::Id).primary_key())
                    .col(string_null(Country::Name))
                    .col(string_null(Country::Code))
                    .col(string_null(Country::Timezone))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Network::Table)
                    .if_not_exists()
                    .col(integer(Network::Id).primary_key())
                    .col(string_null(Network::Name))
                    .col(integer_null(Network::CountryId))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_network_country")
                            .from(Network::Table, Network::CountryId)
                            .to(Country::Table, Country::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Show::Table)
                    .if_not_exists()
                    .col(integer(Show::Id).primary_key())
                    .col(string_null(Show::Name))
                    .col(string_null(Show::Language))
                    .col(integer_null(Show::NetworkId))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_show_network")
                            .from(Show::Table, Show::NetworkId)
                            .to(Network::Table, Network::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_show_network_id")
                    .table(Show::Table)
                    .col(Show::NetworkId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Genre::Table)
                    .if_not_exists()
                    .col(pk_auto(Genre::Id))
                    .col(string(Genre::Name))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ShowGenre::Table)
                    .if_not_exists()
                    .col(integer(ShowGenre::ShowId))
                    .col(integer(ShowGenre::GenreId))
                    .primary_key(Index::create().col(ShowGenre::ShowId).col(ShowGenre::GenreId))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_show_genre_show")
                            .from(ShowGenre::Table, ShowGenre::ShowId)
                            .to(Show::Table, Show::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_show_genre_genre")
                            .from(ShowGenre::Table, ShowGenre::GenreId)
                            .to(Genre::Table, Genre::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Externals::Table)
                    .if_not_exists()
                    .col(integer(Externals::ShowId).primary_key())
                    .col(string_null(Externals::Imdb))
                    .col(integer_null(Externals::Tvrage))
                    .col(integer_null(Externals::Thetvdb))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_externals_show")
                            .from(Externals::Table, Externals::ShowId)
                            .to(Show::Table, Show::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Rating::Table)
                    .if_not_exists()
                    .col(integer(Rating::ShowId).primary_key())
                    .col(double_null(Rating::Average))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_rating_show")
                            .from(Rating::Table, Rating::ShowId)
                            .to(Show::Table, Show::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Rating::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Externals::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(ShowGenre::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Genre::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Show::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Network::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Country::Table).to_owned()).await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Country {
    Table,
    Id,
    Name,
    Code,
    Timezone,
}

#[derive(DeriveIden)]
enum Network {
    Table,
    Id,
    Name,
    CountryId,
}

#[derive(DeriveIden)]
enum Show {
    Table,
    Id,
    Name,
    Language,
    NetworkId,
}

#[derive(DeriveIden)]
enum Genre {
    Table,
    Id,
    Name,
}

#[derive(DeriveIden)]
enum ShowGenre {
    Table,
    ShowId,
    GenreId,
}

#[derive(DeriveIden)]
enum Externals {
    Table,
    ShowId,
    Imdb,
    Tvrage,
    Thetvdb,
}

#[derive(DeriveIden)]
enum Rating {
    Table,
    ShowId,
    Average,
}
