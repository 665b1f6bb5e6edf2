// ============================================================================
// GÉNÉRATION DE RECETTES PAR IA
// ============================================================================
//
// Flow:
//   1. POST /api/recipes/generate { ingredients: [...] }
//   2. RecipeGenerator::generate → brouillons (jamais enregistrés)
//   3. L'utilisateur en garde un et le soumet via POST /api/recipes
//      (source = ai), il passe alors en pending comme les autres
//
// Nettoyage de la réponse du modèle (souvent du "presque JSON"):
//   - blocs ```json retirés
//   - guillemets typographiques remplacés
//   - tableau extérieur extrait, refermé après le dernier objet complet
//     si la réponse a été coupée
//   - virgules finales supprimées
//
// ============================================================================

use async_trait::async_trait;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::errors::AppError;
use crate::models::recipe::{Category, Difficulty, Ingredient, Instruction, NutritionalInfo, RecipeSource};

const GEMINI_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const PEXELS_ENDPOINT: &str = "https://api.pexels.com/v1/search";
const PLACEHOLDER_IMAGE: &str = "https://placehold.co/800x600/667eea/ffffff";

/// Brouillon renvoyé au client, même forme que le payload de création
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeDraft {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub ingredients: Vec<Ingredient>,
    #[serde(default)]
    pub instructions: Vec<Instruction>,
    #[serde(default)]
    pub cooking_time: i32,
    #[serde(default)]
    pub preparation_time: i32,
    #[serde(default)]
    pub servings: i32,
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(default)]
    pub category: Option<Category>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub nutritional_info: Option<NutritionalInfo>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub source: RecipeSource,
}

#[async_trait]
pub trait RecipeGenerator: Send + Sync {
    async fn generate(&self, ingredients: &[String]) -> Result<Vec<RecipeDraft>, AppError>;
}

pub struct AiService;

impl AiService {
    /// Valide la liste d'ingrédients puis délègue au générateur
    pub async fn generate(
        generator: &dyn RecipeGenerator,
        ingredients: Vec<String>,
    ) -> Result<Vec<RecipeDraft>, AppError> {
        let ingredients: Vec<String> = ingredients
            .into_iter()
            .map(|i| i.trim().to_string())
            .filter(|i| !i.is_empty())
            .collect();

        if ingredients.is_empty() {
            return Err(AppError::validation("Please provide at least one ingredient"));
        }

        let mut drafts = generator.generate(&ingredients).await?;
        for draft in &mut drafts {
            draft.source = RecipeSource::Ai;
        }

        info!(count = drafts.len(), ingredients = ingredients.len(), "AI recipes generated");
        Ok(drafts)
    }
}

// ----------------------------------------------------------------------------
// Gemini + Pexels
// ----------------------------------------------------------------------------

pub struct GeminiGenerator {
    api_key: Option<String>,
    model: String,
    pexels_api_key: Option<String>,
    client: reqwest::Client,
}

impl GeminiGenerator {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            api_key: config.gemini_api_key.clone(),
            model: config.gemini_model.clone(),
            pexels_api_key: config.pexels_api_key.clone(),
            client: reqwest::Client::new(),
        }
    }

    async fn complete(&self, prompt: &str) -> Result<String, AppError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| AppError::Dependency("GEMINI_API_KEY is not configured".to_string()))?;

        let body = json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
            "generationConfig": {
                "temperature": 0.4,
                "maxOutputTokens": 8192,
                "topP": 0.8,
                "topK": 40
            }
        });

        let response = self
            .client
            .post(format!("{}/{}:generateContent", GEMINI_ENDPOINT, self.model))
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("Gemini request failed: {}", e)))?;

        let status = response.status();
        let payload: Value = response
            .json()
            .await
            .map_err(|e| AppError::Upstream(format!("Gemini returned an unreadable body: {}", e)))?;

        if !status.is_success() {
            let message = payload["error"]["message"].as_str().unwrap_or("unknown error");
            return Err(AppError::Upstream(format!("Gemini API error ({}): {}", status.as_u16(), message)));
        }

        payload["candidates"][0]["content"]["parts"][0]["text"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| AppError::Upstream("Invalid response structure from Gemini".to_string()))
    }

    /// Première photo Pexels pour le titre, None si rien ou en cas d'échec
    async fn find_image(&self, title: &str) -> Option<String> {
        let api_key = self.pexels_api_key.as_deref()?;
        let query = format!("{} food", title.to_lowercase());

        let result = async {
            let payload: Value = self
                .client
                .get(PEXELS_ENDPOINT)
                .query(&[("query", query.as_str()), ("per_page", "1")])
                .header("Authorization", api_key)
                .send()
                .await?
                .error_for_status()?
                .json()
                .await?;
            Ok::<Value, reqwest::Error>(payload)
        }
        .await;

        match result {
            Ok(payload) => {
                let src = &payload["photos"][0]["src"];
                src["large"].as_str().or_else(|| src["medium"].as_str()).map(str::to_string)
            }
            Err(e) => {
                warn!(title, error = %e, "Pexels lookup failed");
                None
            }
        }
    }
}

#[async_trait]
impl RecipeGenerator for GeminiGenerator {
    async fn generate(&self, ingredients: &[String]) -> Result<Vec<RecipeDraft>, AppError> {
        let text = self.complete(&build_prompt(ingredients)).await?;
        let mut drafts = parse_drafts(&text)?;

        for draft in &mut drafts {
            let image = match self.find_image(&draft.title).await {
                Some(url) => url,
                None => placeholder_image(&draft.title),
            };
            draft.image = Some(image);
        }

        Ok(drafts)
    }
}

fn build_prompt(ingredients: &[String]) -> String {
    format!(
        r#"Generate 4 SHORT recipes using: {}

IMPORTANT: Keep recipes concise. Return ONLY valid JSON array.

Format:
[
  {{
    "title": "Recipe Name",
    "description": "Brief description under 100 chars",
    "ingredients": [{{"name": "item", "quantity": 2, "unit": "cups"}}],
    "instructions": [{{"step": 1, "description": "Short instruction"}}],
    "cookingTime": 15,
    "preparationTime": 5,
    "servings": 2,
    "difficulty": "Easy",
    "category": "Breakfast",
    "tags": ["Quick"],
    "nutritionalInfo": {{"calories": 200, "protein": 10, "carbs": 25, "fat": 8}}
  }}
]

difficulty is one of Easy, Medium, Hard. category is one of Breakfast, Lunch, Dinner, Dessert, Snack, Beverage.
Keep instructions to 10-15 steps maximum. Return ONLY the JSON array."#,
        ingredients.join(", ")
    )
}

pub fn placeholder_image(title: &str) -> String {
    match Url::parse_with_params(PLACEHOLDER_IMAGE, &[("text", title)]) {
        Ok(url) => url.to_string(),
        Err(_) => PLACEHOLDER_IMAGE.to_string(),
    }
}

/// Texte du modèle → brouillons. Les éléments qui ne ressemblent pas à une
/// recette sont ignorés, un tableau vide à l'arrivée est une erreur.
pub fn parse_drafts(text: &str) -> Result<Vec<RecipeDraft>, AppError> {
    let cleaned = extract_recipe_array(text)?;

    let items: Vec<Value> = serde_json::from_str(&cleaned)
        .map_err(|e| AppError::Upstream(format!("AI response is not a JSON array: {}", e)))?;

    let total = items.len();
    let drafts: Vec<RecipeDraft> = items
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| match serde_json::from_value::<RecipeDraft>(item) {
            Ok(draft) => Some(draft),
            Err(e) => {
                warn!(index, error = %e, "Skipping malformed AI recipe");
                None
            }
        })
        .collect();

    if drafts.is_empty() {
        return Err(AppError::Upstream(format!("AI returned no usable recipe ({} item(s))", total)));
    }

    Ok(drafts)
}

/// Isole le tableau JSON dans la réponse brute du modèle
pub fn extract_recipe_array(text: &str) -> Result<String, AppError> {
    let text = text
        .replace("```json", "")
        .replace("```", "")
        .replace(['\u{201C}', '\u{201D}'], "\"")
        .replace(['\u{2018}', '\u{2019}'], "'");

    let start = text
        .find('[')
        .ok_or_else(|| AppError::Upstream("Could not find a JSON array in the AI response".to_string()))?;

    let array = close_array(&text[start..])
        .ok_or_else(|| AppError::Upstream("AI response was cut off and cannot be recovered".to_string()))?;

    Ok(strip_trailing_commas(&array))
}

/// Coupe après le ']' qui ferme le tableau. Si la réponse est tronquée,
/// garde les objets complets et referme le tableau.
fn close_array(text: &str) -> Option<String> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    let mut last_complete_item = None;

    for (index, c) in text.char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match c {
            '"' => in_string = true,
            '[' | '{' => depth += 1,
            ']' | '}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(text[..=index].to_string());
                }
                if depth == 1 && c == '}' {
                    last_complete_item = Some(index);
                }
            }
            _ => {}
        }
    }

    last_complete_item.map(|end| format!("{}\n]", &text[..=end]))
}

/// ",}" et ",]" (avec espaces éventuels) hors des chaînes
fn strip_trailing_commas(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut in_string = false;
    let mut escaped = false;

    for (index, &c) in chars.iter().enumerate() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            out.push(c);
            continue;
        }

        if c == ',' {
            let next = chars[index + 1..].iter().find(|n| !n.is_whitespace());
            if matches!(next, Some('}') | Some(']')) {
                continue;
            }
        }
        if c == '"' {
            in_string = true;
        }
        out.push(c);
    }

    out
}

/// Générateur figé pour les tests de routes
#[cfg(test)]
pub struct FixedGenerator(pub Vec<RecipeDraft>);

#[cfg(test)]
#[async_trait]
impl RecipeGenerator for FixedGenerator {
    async fn generate(&self, _ingredients: &[String]) -> Result<Vec<RecipeDraft>, AppError> {
        Ok(self.0.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ONE_RECIPE: &str = r#"{"title": "Egg Fried Rice", "description": "Fast", "ingredients": [{"name": "egg", "quantity": 2, "unit": "pieces"}], "instructions": [{"step": 1, "description": "Fry"}], "cookingTime": 10, "preparationTime": 5, "servings": 2, "difficulty": "Easy", "category": "Dinner", "tags": ["Quick"]}"#;

    #[test]
    fn test_code_fences_and_prose_are_removed() {
        let raw = format!("Sure! Here you go:\n```json\n[{}]\n```\nEnjoy [really]", ONE_RECIPE);
        let drafts = parse_drafts(&raw).unwrap();

        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].title, "Egg Fried Rice");
        assert_eq!(drafts[0].category, Some(Category::Dinner));
        assert_eq!(drafts[0].ingredients[0].quantity, 2.0);
    }

    #[test]
    fn test_truncated_array_keeps_complete_recipes() {
        let raw = format!("[{}, {{\"title\": \"Half a recipe\", \"ingredients\": [{{\"name\": \"fl", ONE_RECIPE);
        let drafts = parse_drafts(&raw).unwrap();

        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].title, "Egg Fried Rice");
    }

    #[test]
    fn test_trailing_commas_and_smart_quotes() {
        let raw = "[{\u{201C}title\u{201D}: \"Chef\u{2019}s toast\", \"tags\": [\"Quick\",],},]";
        let drafts = parse_drafts(raw).unwrap();

        assert_eq!(drafts[0].title, "Chef's toast");
        assert_eq!(drafts[0].tags, vec!["Quick".to_string()]);
    }

    #[test]
    fn test_commas_inside_strings_are_kept() {
        let cleaned = extract_recipe_array(r#"[{"title": "Salt, }pepper"}]"#).unwrap();
        assert_eq!(cleaned, r#"[{"title": "Salt, }pepper"}]"#);
    }

    #[test]
    fn test_unusable_output() {
        assert!(matches!(parse_drafts("I cannot help with that."), Err(AppError::Upstream(_))));
        assert!(matches!(parse_drafts("[]"), Err(AppError::Upstream(_))));
        assert!(matches!(parse_drafts("[{\"title\": \"cut"), Err(AppError::Upstream(_))));
        assert!(matches!(parse_drafts("[{\"description\": \"no title\"}]"), Err(AppError::Upstream(_))));
    }

    #[test]
    fn test_placeholder_image_encodes_title() {
        let url = placeholder_image("Egg Fried Rice");
        assert!(url.starts_with(PLACEHOLDER_IMAGE));
        assert!(url.contains("text=Egg+Fried+Rice"));
    }

    #[tokio::test]
    async fn test_empty_ingredients_are_rejected() {
        let generator = FixedGenerator(Vec::new());
        let result = AiService::generate(&generator, vec!["  ".to_string()]).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_drafts_are_marked_as_ai() {
        let draft: RecipeDraft = serde_json::from_str(ONE_RECIPE).unwrap();
        let generator = FixedGenerator(vec![draft]);

        let drafts = AiService::generate(&generator, vec!["egg".to_string()]).await.unwrap();
        assert_eq!(drafts[0].source, RecipeSource::Ai);
    }

    #[tokio::test]
    async fn test_missing_key_is_a_dependency_failure() {
        let generator = GeminiGenerator::from_config(&AppConfig::for_tests());
        let result = generator.generate(&["egg".to_string()]).await;
        assert!(matches!(result, Err(AppError::Dependency(_))));
    }
}
