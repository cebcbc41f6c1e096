use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240301_000001_create_code_registry_tables::Migration),
            Box::new(m20240301_000002_create_assets_table::Migration),
            Box::new(m20240301_000003_create_asset_history_tables::Migration),
        ]
    }
}

// Shared identifiers; each migration module re-uses the ones it references.
#[derive(DeriveIden)]
pub(crate) enum Locations {
    Table,
    Id,
    Name,
    Code,
}

#[derive(DeriveIden)]
pub(crate) enum SubLocations {
    Table,
    Id,
    Name,
    Code,
    LocationId,
}

#[derive(DeriveIden)]
pub(crate) enum Categories {
    Table,
    Id,
    Name,
    Code,
}

#[derive(DeriveIden)]
pub(crate) enum SubCategories {
    Table,
    Id,
    Name,
    Code,
    CategoryId,
}

#[derive(DeriveIden)]
pub(crate) enum Assets {
    Table,
    Id,
    Name,
    #[sea_orm(iden = "type")]
    AssetType,
    CategoryId,
    SubcategoryId,
    LocationId,
    SublocationId,
    Status,
    AssignedTo,
    Depreciation,
    PurchasedOn,
    PurchasePrice,
    SerialNumber,
    CreatedAt,
    UpdatedAt,
}

mod m20240301_000001_create_code_registry_tables {

    use super::{Categories, Locations, SubCategories, SubLocations};
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000001_create_code_registry_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Locations::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Locations::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(Locations::Name)
                                .string_len(50)
                                .not_null()
                                .unique_key(),
                        )
                        .col(
                            ColumnDef::new(Locations::Code)
                                .string_len(10)
                                .not_null()
                                .unique_key(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(SubLocations::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(SubLocations::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(SubLocations::Name).string_len(50).not_null())
                        .col(ColumnDef::new(SubLocations::Code).string_len(10).not_null())
                        .col(ColumnDef::new(SubLocations::LocationId).integer().not_null())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_sub_locations_location_id")
                                .from(SubLocations::Table, SubLocations::LocationId)
                                .to(Locations::Table, Locations::Id)
                                .on_delete(ForeignKeyAction::Restrict)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            // Sub-location codes repeat across sites (RM1 at HQ and at BR2)
            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_sub_locations_location_code")
                        .table(SubLocations::Table)
                        .col(SubLocations::LocationId)
                        .col(SubLocations::Code)
                        .unique()
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Categories::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Categories::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(Categories::Name)
                                .string_len(50)
                                .not_null()
                                .unique_key(),
                        )
                        .col(
                            ColumnDef::new(Categories::Code)
                                .string_len(10)
                                .not_null()
                                .unique_key(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(SubCategories::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(SubCategories::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(SubCategories::Name).string_len(50).not_null())
                        .col(ColumnDef::new(SubCategories::Code).string_len(10).not_null())
                        .col(ColumnDef::new(SubCategories::CategoryId).integer().not_null())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_sub_categories_category_id")
                                .from(SubCategories::Table, SubCategories::CategoryId)
                                .to(Categories::Table, Categories::Id)
                                .on_delete(ForeignKeyAction::Restrict)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_sub_categories_category_code")
                        .table(SubCategories::Table)
                        .col(SubCategories::CategoryId)
                        .col(SubCategories::Code)
                        .unique()
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(SubCategories::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Categories::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(SubLocations::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Locations::Table).to_owned())
                .await
        }
    }
}

mod m20240301_000002_create_assets_table {

    use super::{Assets, Categories, Locations, SubCategories, SubLocations};
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000002_create_assets_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Assets::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Assets::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Assets::Name).string_len(100).not_null())
                        .col(ColumnDef::new(Assets::AssetType).string_len(50).not_null())
                        .col(ColumnDef::new(Assets::CategoryId).integer().not_null())
                        .col(ColumnDef::new(Assets::SubcategoryId).integer().not_null())
                        .col(ColumnDef::new(Assets::LocationId).integer().not_null())
                        .col(ColumnDef::new(Assets::SublocationId).integer().not_null())
                        .col(ColumnDef::new(Assets::Status).string_len(50).not_null())
                        .col(ColumnDef::new(Assets::AssignedTo).string_len(100).null())
                        .col(ColumnDef::new(Assets::Depreciation).double().not_null())
                        .col(ColumnDef::new(Assets::PurchasedOn).date().not_null())
                        .col(ColumnDef::new(Assets::PurchasePrice).double().null())
                        .col(
                            ColumnDef::new(Assets::SerialNumber)
                                .string_len(100)
                                .not_null()
                                .unique_key(),
                        )
                        .col(
                            ColumnDef::new(Assets::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Assets::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_assets_category_id")
                                .from(Assets::Table, Assets::CategoryId)
                                .to(Categories::Table, Categories::Id),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_assets_subcategory_id")
                                .from(Assets::Table, Assets::SubcategoryId)
                                .to(SubCategories::Table, SubCategories::Id),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_assets_location_id")
                                .from(Assets::Table, Assets::LocationId)
                                .to(Locations::Table, Locations::Id),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_assets_sublocation_id")
                                .from(Assets::Table, Assets::SublocationId)
                                .to(SubLocations::Table, SubLocations::Id),
                        )
                        .to_owned(),
                )
                .await?;

            // Sequence derivation counts by (category, subcategory)
            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_assets_category_subcategory")
                        .table(Assets::Table)
                        .col(Assets::CategoryId)
                        .col(Assets::SubcategoryId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_assets_location_id")
                        .table(Assets::Table)
                        .col(Assets::LocationId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_assets_status")
                        .table(Assets::Table)
                        .col(Assets::Status)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Assets::Table).to_owned())
                .await
        }
    }
}

mod m20240301_000003_create_asset_history_tables {

    use super::{Assets, Locations};
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000003_create_asset_history_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(AssetMovements::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(AssetMovements::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(AssetMovements::AssetId).integer().not_null())
                        .col(
                            ColumnDef::new(AssetMovements::FromLocationId)
                                .integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(AssetMovements::ToLocationId)
                                .integer()
                                .not_null(),
                        )
                        .col(ColumnDef::new(AssetMovements::MovementDate).date().not_null())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_asset_movements_asset_id")
                                .from(AssetMovements::Table, AssetMovements::AssetId)
                                .to(Assets::Table, Assets::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_asset_movements_from_location_id")
                                .from(AssetMovements::Table, AssetMovements::FromLocationId)
                                .to(Locations::Table, Locations::Id),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_asset_movements_to_location_id")
                                .from(AssetMovements::Table, AssetMovements::ToLocationId)
                                .to(Locations::Table, Locations::Id),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_asset_movements_asset_id")
                        .table(AssetMovements::Table)
                        .col(AssetMovements::AssetId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Maintenance::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Maintenance::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Maintenance::AssetId).integer().not_null())
                        .col(ColumnDef::new(Maintenance::StartDate).date().not_null())
                        .col(ColumnDef::new(Maintenance::EndDate).date().null())
                        .col(
                            ColumnDef::new(Maintenance::MaintenanceType)
                                .string_len(50)
                                .not_null(),
                        )
                        .col(ColumnDef::new(Maintenance::Description).string_len(200).null())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_maintenance_asset_id")
                                .from(Maintenance::Table, Maintenance::AssetId)
                                .to(Assets::Table, Assets::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_maintenance_asset_id")
                        .table(Maintenance::Table)
                        .col(Maintenance::AssetId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Disposals::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Disposals::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Disposals::AssetId).integer().not_null())
                        .col(ColumnDef::new(Disposals::DisposalDate).date().not_null())
                        .col(ColumnDef::new(Disposals::Reason).string_len(200).null())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_disposals_asset_id")
                                .from(Disposals::Table, Disposals::AssetId)
                                .to(Assets::Table, Assets::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Disposals::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Maintenance::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(AssetMovements::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum AssetMovements {
        Table,
        Id,
        AssetId,
        FromLocationId,
        ToLocationId,
        MovementDate,
    }

    #[derive(DeriveIden)]
    enum Maintenance {
        Table,
        Id,
        AssetId,
        StartDate,
        EndDate,
        #[sea_orm(iden = "type")]
        MaintenanceType,
        Description,
    }

    #[derive(DeriveIden)]
    enum Disposals {
        Table,
        Id,
        AssetId,
        DisposalDate,
        Reason,
    }
}
