//! Schéma initial : users, recipe, review, favorite

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ============================================================
        // 1. users
        // ============================================================
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Users::Id).integer().not_null().auto_increment().primary_key())
                    .col(ColumnDef::new(Users::Name).string_len(100).not_null())
                    .col(ColumnDef::new(Users::Lastname).string_len(100).not_null())
                    .col(ColumnDef::new(Users::Pseudo).string_len(10).not_null())
                    .col(ColumnDef::new(Users::Email).string_len(255).not_null())
                    .col(ColumnDef::new(Users::PasswordHash).string_len(255).not_null())
                    .col(ColumnDef::new(Users::Role).string_len(16).not_null().default("user"))
                    .col(ColumnDef::new(Users::ProfilePicture).string_len(512).not_null().default(""))
                    .col(ColumnDef::new(Users::IsActive).boolean().not_null().default(true))
                    .col(ColumnDef::new(Users::CreatedAt).timestamp_with_time_zone().not_null())
                    .col(ColumnDef::new(Users::UpdatedAt).timestamp_with_time_zone().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_users_email")
                    .table(Users::Table)
                    .col(Users::Email)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_users_pseudo")
                    .table(Users::Table)
                    .col(Users::Pseudo)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ============================================================
        // 2. recipe
        // ============================================================
        manager
            .create_table(
                Table::create()
                    .table(Recipe::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Recipe::Id).integer().not_null().auto_increment().primary_key())
                    .col(ColumnDef::new(Recipe::Title).string_len(100).not_null())
                    .col(ColumnDef::new(Recipe::Description).text().not_null())
                    .col(ColumnDef::new(Recipe::Ingredients).json().not_null())
                    .col(ColumnDef::new(Recipe::Instructions).json().not_null())
                    .col(ColumnDef::new(Recipe::CookingTime).integer().not_null())
                    .col(ColumnDef::new(Recipe::PreparationTime).integer().not_null())
                    .col(ColumnDef::new(Recipe::Servings).integer().not_null())
                    .col(ColumnDef::new(Recipe::Difficulty).string_len(16).not_null().default("Medium"))
                    .col(ColumnDef::new(Recipe::Category).string_len(16).not_null())
                    .col(ColumnDef::new(Recipe::Tags).json().not_null())
                    .col(ColumnDef::new(Recipe::Image).string_len(512).not_null().default(""))
                    .col(ColumnDef::new(Recipe::NutritionalInfo).json().not_null())
                    .col(ColumnDef::new(Recipe::Source).string_len(8).not_null().default("human"))
                    .col(ColumnDef::new(Recipe::RequestedBy).integer().not_null())
                    .col(ColumnDef::new(Recipe::Status).string_len(16).not_null().default("pending"))
                    .col(ColumnDef::new(Recipe::RejectionReason).text().null())
                    .col(ColumnDef::new(Recipe::ReviewedBy).integer().null())
                    .col(ColumnDef::new(Recipe::ReviewedAt).timestamp_with_time_zone().null())
                    .col(ColumnDef::new(Recipe::AverageRating).double().not_null().default(0.0))
                    .col(ColumnDef::new(Recipe::TotalReviews).integer().not_null().default(0))
                    .col(ColumnDef::new(Recipe::CreatedAt).timestamp_with_time_zone().not_null())
                    .col(ColumnDef::new(Recipe::UpdatedAt).timestamp_with_time_zone().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_recipe_requested_by")
                            .from(Recipe::Table, Recipe::RequestedBy)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_recipe_reviewed_by")
                            .from(Recipe::Table, Recipe::ReviewedBy)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        for (name, column) in [
            ("idx_recipe_status", Recipe::Status),
            ("idx_recipe_category", Recipe::Category),
            ("idx_recipe_requested_by", Recipe::RequestedBy),
        ] {
            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name(name)
                        .table(Recipe::Table)
                        .col(column)
                        .to_owned(),
                )
                .await?;
        }

        // ============================================================
        // 3. review (un avis par couple user/recette)
        // ============================================================
        manager
            .create_table(
                Table::create()
                    .table(Review::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Review::Id).integer().not_null().auto_increment().primary_key())
                    .col(ColumnDef::new(Review::UserId).integer().not_null())
                    .col(ColumnDef::new(Review::RecipeId).integer().not_null())
                    .col(ColumnDef::new(Review::Rating).integer().not_null())
                    .col(ColumnDef::new(Review::Comment).text().not_null())
                    .col(ColumnDef::new(Review::CreatedAt).timestamp_with_time_zone().not_null())
                    .col(ColumnDef::new(Review::UpdatedAt).timestamp_with_time_zone().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_review_user_id")
                            .from(Review::Table, Review::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_review_recipe_id")
                            .from(Review::Table, Review::RecipeId)
                            .to(Recipe::Table, Recipe::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_review_user_recipe")
                    .table(Review::Table)
                    .col(Review::UserId)
                    .col(Review::RecipeId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ============================================================
        // 4. favorite (un favori par couple user/recette)
        // ============================================================
        manager
            .create_table(
                Table::create()
                    .table(Favorite::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Favorite::Id).integer().not_null().auto_increment().primary_key())
                    .col(ColumnDef::new(Favorite::UserId).integer().not_null())
                    .col(ColumnDef::new(Favorite::RecipeId).integer().not_null())
                    .col(ColumnDef::new(Favorite::Notes).text().not_null().default(""))
                    .col(ColumnDef::new(Favorite::CreatedAt).timestamp_with_time_zone().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_favorite_user_id")
                            .from(Favorite::Table, Favorite::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_favorite_recipe_id")
                            .from(Favorite::Table, Favorite::RecipeId)
                            .to(Recipe::Table, Recipe::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_favorite_user_recipe")
                    .table(Favorite::Table)
                    .col(Favorite::UserId)
                    .col(Favorite::RecipeId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Favorite::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Review::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Recipe::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Users::Table).to_owned()).await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    Name,
    Lastname,
    Pseudo,
    Email,
    PasswordHash,
    Role,
    ProfilePicture,
    IsActive,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden, Clone, Copy)]
enum Recipe {
    Table,
    Id,
    Title,
    Description,
    Ingredients,
    Instructions,
    CookingTime,
    PreparationTime,
    Servings,
    Difficulty,
    Category,
    Tags,
    Image,
    NutritionalInfo,
    Source,
    RequestedBy,
    Status,
    RejectionReason,
    ReviewedBy,
    ReviewedAt,
    AverageRating,
    TotalReviews,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Review {
    Table,
    Id,
    UserId,
    RecipeId,
    Rating,
    Comment,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Favorite {
    Table,
    Id,
    UserId,
    RecipeId,
    Notes,
    CreatedAt,
}
