//! Jeu de données commun aux tests des services

use chrono::Utc;
use sea_orm::*;

use crate::models::dto::RecipeInput;
use crate::models::recipe::{self, Category, Difficulty, Ingredient, Instruction, RecipeSource};
use crate::models::users::{self, Role};
use crate::models::{favorite, review};
use crate::services::access::Actor;
use crate::services::recipe_service::RecipeService;
use crate::utils::password;

/// Scénario de base : "Tomato Soup", une ligne par champ obligatoire
pub fn tomato_soup() -> RecipeInput {
    RecipeInput {
        title: "Tomato Soup".to_string(),
        description: "A warm, simple soup.".to_string(),
        ingredients: vec![Ingredient {
            name: "Tomato".to_string(),
            quantity: 4.0,
            unit: "pieces".to_string(),
        }],
        instructions: vec![Instruction {
            step: 1,
            description: "Simmer the tomatoes".to_string(),
        }],
        cooking_time: 10,
        preparation_time: 5,
        servings: 2,
        difficulty: Difficulty::Easy,
        category: Category::Lunch,
        tags: vec!["Quick".to_string()],
        image: None,
        nutritional_info: None,
        source: RecipeSource::Human,
    }
}

pub async fn insert_user(db: &DatabaseConnection, pseudo: &str, role: Role) -> users::Model {
    let now = Utc::now();
    users::ActiveModel {
        name: Set(pseudo.to_string()),
        lastname: Set("Tester".to_string()),
        pseudo: Set(pseudo.to_string()),
        email: Set(format!("{}@example.com", pseudo)),
        password_hash: Set(password::hash_password("secret123").unwrap()),
        role: Set(role),
        profile_picture: Set(String::new()),
        is_active: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap()
}

pub struct Fixture {
    pub alice: users::Model,
    pub bob: users::Model,
    pub admin: users::Model,
}

impl Fixture {
    pub async fn new(db: &DatabaseConnection) -> Self {
        Self {
            alice: insert_user(db, "alice", Role::User).await,
            bob: insert_user(db, "bob", Role::User).await,
            admin: insert_user(db, "root", Role::Admin).await,
        }
    }

    pub fn alice_actor(&self) -> Actor {
        Actor { id: self.alice.id, role: Role::User }
    }

    pub fn bob_actor(&self) -> Actor {
        Actor { id: self.bob.id, role: Role::User }
    }

    pub fn admin_actor(&self) -> Actor {
        Actor { id: self.admin.id, role: Role::Admin }
    }

    pub async fn recipe(&self, db: &DatabaseConnection, owner_id: i32) -> recipe::Model {
        let owner = Actor { id: owner_id, role: Role::User };
        RecipeService::create(db, &owner, tomato_soup()).await.unwrap()
    }

    /// Insertion brute, sans recalcul de la note
    pub async fn review(&self, db: &DatabaseConnection, user_id: i32, recipe_id: i32, rating: i32) -> review::Model {
        let now = Utc::now();
        review::ActiveModel {
            user_id: Set(user_id),
            recipe_id: Set(recipe_id),
            rating: Set(rating),
            comment: Set("Lovely and easy to make".to_string()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(db)
        .await
        .unwrap()
    }

    pub async fn favorite(&self, db: &DatabaseConnection, user_id: i32, recipe_id: i32) -> favorite::Model {
        favorite::ActiveModel {
            user_id: Set(user_id),
            recipe_id: Set(recipe_id),
            notes: Set(String::new()),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(db)
        .await
        .unwrap()
    }
}
