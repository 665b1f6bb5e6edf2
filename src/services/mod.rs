pub mod access;
pub mod ai_service;
pub mod favorite_service;
pub mod moderation;
pub mod rating_service;
pub mod recipe_service;
pub mod review_service;
pub mod upload_service;
pub mod user_service;

#[cfg(test)]
pub mod test_support;
