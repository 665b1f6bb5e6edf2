//pour les payloads d'entrée et la réponse structurée
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::recipe::{
    self, Category, Difficulty, Ingredient, Instruction, NutritionalInfo, RecipeSource, RecipeStatus,
};
use crate::models::users;

// ----------------------------------------------------------------------------
// Enveloppe { success, message, count?, data? }
// ----------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            count: None,
            data: Some(data),
        }
    }
}

impl<T: Serialize> ApiResponse<Vec<T>> {
    pub fn list(message: impl Into<String>, data: Vec<T>) -> Self {
        Self {
            success: true,
            message: message.into(),
            count: Some(data.len()),
            data: Some(data),
        }
    }
}

impl ApiResponse<()> {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            count: None,
            data: None,
        }
    }
}

// ----------------------------------------------------------------------------
// Auth
// ----------------------------------------------------------------------------

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[validate(length(min = 1, message = "Lastname is required"))]
    pub lastname: String,
    #[validate(length(min = 3, max = 10, message = "Pseudo must be between 3 and 10 characters"))]
    pub pseudo: String,
    #[validate(email(message = "Please enter a valid email"))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
}

impl RegisterRequest {
    /// trim partout, email en minuscules (avant validation)
    pub fn normalized(self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            lastname: self.lastname.trim().to_string(),
            pseudo: self.pseudo.trim().to_string(),
            email: normalize_email(&self.email),
            password: self.password,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    #[validate(length(min = 1, message = "Name cannot be empty"))]
    pub name: Option<String>,
    #[validate(length(min = 1, message = "Lastname cannot be empty"))]
    pub lastname: Option<String>,
    #[validate(length(min = 3, max = 10, message = "Pseudo must be between 3 and 10 characters"))]
    pub pseudo: Option<String>,
    pub profile_picture: Option<String>,
}

impl UpdateProfileRequest {
    /// trim avant validation, comme à l'inscription
    pub fn normalized(self) -> Self {
        Self {
            name: self.name.map(|n| n.trim().to_string()),
            lastname: self.lastname.map(|l| l.trim().to_string()),
            pseudo: self.pseudo.map(|p| p.trim().to_string()),
            profile_picture: self.profile_picture.map(|p| p.trim().to_string()),
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    #[validate(length(min = 1, message = "Current password is required"))]
    pub current_password: String,
    #[validate(length(min = 6, message = "New password must be at least 6 characters"))]
    pub new_password: String,
}

// Réponse après login/register
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub success: bool,
    pub message: String,
    pub token: String,
    pub data: users::Model,
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

// ----------------------------------------------------------------------------
// Recettes
// ----------------------------------------------------------------------------

/// Payload de création et de modification (PUT = remplacement complet)
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RecipeInput {
    #[validate(length(min = 3, max = 100, message = "Title must be between 3 and 100 characters"))]
    pub title: String,
    #[validate(length(min = 1, max = 500, message = "Description is required and cannot exceed 500 characters"))]
    pub description: String,
    #[validate(length(min = 1, message = "At least one ingredient is required"), nested)]
    pub ingredients: Vec<Ingredient>,
    #[validate(length(min = 1, message = "At least one instruction is required"), nested)]
    pub instructions: Vec<Instruction>,
    #[validate(range(min = 1, message = "Cooking time must be a positive number"))]
    pub cooking_time: i32,
    #[validate(range(min = 1, message = "Preparation time must be a positive number"))]
    pub preparation_time: i32,
    #[validate(range(min = 1, message = "Servings must be at least 1"))]
    pub servings: i32,
    #[serde(default)]
    pub difficulty: Difficulty,
    pub category: Category,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Chemin renvoyé par POST /api/uploads (stocké tel quel)
    pub image: Option<String>,
    pub nutritional_info: Option<NutritionalInfo>,
    #[serde(default)]
    pub source: RecipeSource,
}

impl RecipeInput {
    pub fn normalized(mut self) -> Self {
        self.title = self.title.trim().to_string();
        self.description = self.description.trim().to_string();
        self.tags = self
            .tags
            .into_iter()
            .map(|tag| tag.trim().to_string())
            .filter(|tag| !tag.is_empty())
            .collect();
        for ingredient in &mut self.ingredients {
            ingredient.name = ingredient.name.trim().to_string();
            ingredient.unit = ingredient.unit.trim().to_string();
        }
        for instruction in &mut self.instructions {
            instruction.description = instruction.description.trim().to_string();
        }
        self
    }
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub search: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AdminRecipeFilter {
    pub status: Option<RecipeStatus>,
    pub source: Option<RecipeSource>,
}

#[derive(Debug, Deserialize)]
pub struct RejectRequest {
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    #[serde(default)]
    pub ingredients: Vec<String>,
}

/// Auteur affiché à côté d'une recette (jamais l'email)
#[derive(Debug, Clone, Serialize)]
pub struct AuthorSummary {
    pub id: i32,
    pub name: String,
    pub pseudo: String,
}

impl From<users::Model> for AuthorSummary {
    fn from(user: users::Model) -> Self {
        Self {
            id: user.id,
            name: user.name,
            pseudo: user.pseudo,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RecipeWithAuthor {
    #[serde(flatten)]
    pub recipe: recipe::Model,
    pub author: Option<AuthorSummary>,
}

impl From<(recipe::Model, Option<users::Model>)> for RecipeWithAuthor {
    fn from((recipe, author): (recipe::Model, Option<users::Model>)) -> Self {
        Self {
            recipe,
            author: author.map(AuthorSummary::from),
        }
    }
}

// ----------------------------------------------------------------------------
// Reviews
// ----------------------------------------------------------------------------

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateReviewRequest {
    pub recipe_id: i32,
    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5"))]
    pub rating: i32,
    #[validate(length(min = 10, max = 500, message = "Comment must be between 10 and 500 characters"))]
    pub comment: String,
}

impl CreateReviewRequest {
    pub fn normalized(mut self) -> Self {
        self.comment = self.comment.trim().to_string();
        self
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateReviewRequest {
    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5"))]
    pub rating: Option<i32>,
    #[validate(length(min = 10, max = 500, message = "Comment must be between 10 and 500 characters"))]
    pub comment: Option<String>,
}

impl UpdateReviewRequest {
    pub fn normalized(mut self) -> Self {
        self.comment = self.comment.map(|c| c.trim().to_string());
        self
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewWithAuthor {
    #[serde(flatten)]
    pub review: crate::models::review::Model,
    pub author: Option<AuthorSummary>,
}

// ----------------------------------------------------------------------------
// Favoris
// ----------------------------------------------------------------------------

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AddFavoriteRequest {
    pub recipe_id: i32,
    #[validate(length(max = 500, message = "Notes cannot exceed 500 characters"))]
    pub notes: Option<String>,
}

impl AddFavoriteRequest {
    pub fn normalized(mut self) -> Self {
        self.notes = self.notes.map(|n| n.trim().to_string());
        self
    }
}

#[derive(Debug, Serialize)]
pub struct FavoriteWithRecipe {
    #[serde(flatten)]
    pub favorite: crate::models::favorite::Model,
    pub recipe: Option<recipe::Model>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteCheck {
    pub success: bool,
    pub is_favorited: bool,
    pub favorite_id: Option<i32>,
}

// ----------------------------------------------------------------------------
// Admin
// ----------------------------------------------------------------------------

#[derive(Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformStats {
    pub total_users: u64,
    pub total_recipes: u64,
    pub approved_recipes: u64,
    pub pending_recipes: u64,
    pub rejected_recipes: u64,
    pub total_favorites: u64,
    pub total_reviews: u64,
    pub ai_recipes: u64,
    pub human_recipes: u64,
}
