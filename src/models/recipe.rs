// ============================================================================
// MODÈLE : RECIPE
// ============================================================================
//
// Description:
//   Recette soumise par un utilisateur, modérée par un admin.
//
// Colonnes de modération:
//   - status : pending | approved | rejected (pending à la création)
//   - rejection_reason : présent seulement si rejected
//   - reviewed_by / reviewed_at : posés seulement après une décision admin
//   Ces quatre colonnes ne sont modifiées que via services::moderation.
//
// Colonnes dérivées:
//   - average_rating / total_reviews : cache recalculé par
//     services::rating_service après chaque mutation de review
//
// Points d'attention:
//   - ingredients, instructions, tags, nutritional_info sont des colonnes
//     JSON typées, validées une seule fois à l'entrée de l'API
//   - ON DELETE CASCADE vers users (requested_by)
//
// ============================================================================

use serde::{Serialize, Deserialize};
use sea_orm::entity::prelude::*;
use sea_orm::FromJsonQueryResult;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, Default)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum RecipeStatus {
    #[sea_orm(string_value = "pending")]
    #[default]
    Pending,
    #[sea_orm(string_value = "approved")]
    Approved,
    #[sea_orm(string_value = "rejected")]
    Rejected,
}

impl RecipeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecipeStatus::Pending => "pending",
            RecipeStatus::Approved => "approved",
            RecipeStatus::Rejected => "rejected",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, Default)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum Difficulty {
    #[sea_orm(string_value = "Easy")]
    Easy,
    #[sea_orm(string_value = "Medium")]
    #[default]
    Medium,
    #[sea_orm(string_value = "Hard")]
    Hard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum Category {
    #[sea_orm(string_value = "Breakfast")]
    Breakfast,
    #[sea_orm(string_value = "Lunch")]
    Lunch,
    #[sea_orm(string_value = "Dinner")]
    Dinner,
    #[sea_orm(string_value = "Dessert")]
    Dessert,
    #[sea_orm(string_value = "Snack")]
    Snack,
    #[sea_orm(string_value = "Beverage")]
    Beverage,
}

/// Origine de la recette : saisie à la main ou reprise d'un brouillon IA
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, Default)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(8))")]
#[serde(rename_all = "lowercase")]
pub enum RecipeSource {
    #[sea_orm(string_value = "human")]
    #[default]
    Human,
    #[sea_orm(string_value = "ai")]
    Ai,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Validate)]
pub struct Ingredient {
    #[validate(length(min = 1, message = "Ingredient name is required"))]
    pub name: String,
    #[validate(range(exclusive_min = 0.0, message = "Ingredient quantity must be positive"))]
    pub quantity: f64,
    #[validate(length(min = 1, message = "Ingredient unit is required"))]
    pub unit: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Validate)]
pub struct Instruction {
    #[validate(range(min = 1, message = "Step number must be at least 1"))]
    pub step: i32,
    #[validate(length(min = 1, message = "Instruction text is required"))]
    pub description: String,
}

#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct NutritionalInfo {
    pub calories: Option<f64>,
    pub protein: Option<f64>,
    pub carbs: Option<f64>,
    pub fat: Option<f64>,
}

#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize, FromJsonQueryResult)]
pub struct Ingredients(pub Vec<Ingredient>);

#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize, FromJsonQueryResult)]
pub struct Instructions(pub Vec<Instruction>);

#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize, FromJsonQueryResult)]
pub struct Tags(pub Vec<String>);

#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize, FromJsonQueryResult)]
pub struct Nutrition(pub NutritionalInfo);

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "recipe")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    #[sea_orm(column_type = "Json")]
    pub ingredients: Ingredients,
    #[sea_orm(column_type = "Json")]
    pub instructions: Instructions,
    pub cooking_time: i32,
    pub preparation_time: i32,
    pub servings: i32,
    pub difficulty: Difficulty,
    pub category: Category,
    #[sea_orm(column_type = "Json")]
    pub tags: Tags,
    pub image: String,
    #[sea_orm(column_type = "Json")]
    pub nutritional_info: Nutrition,
    pub source: RecipeSource,
    pub requested_by: i32,

    pub status: RecipeStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
    pub reviewed_by: Option<i32>,
    pub reviewed_at: Option<DateTimeUtc>,

    pub average_rating: f64,
    pub total_reviews: i32,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::RequestedBy",
        to = "super::users::Column::Id",
        on_delete = "Cascade"
    )]
    Owner,

    #[sea_orm(has_many = "super::review::Entity")]
    Review,

    #[sea_orm(has_many = "super::favorite::Entity")]
    Favorite,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Owner.def()
    }
}

impl Related<super::review::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Review.def()
    }
}

impl Related<super::favorite::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Favorite.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
