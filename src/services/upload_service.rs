use std::path::Path;

use tokio::fs;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;

/// Extension de fichier pour chaque type d'image accepté
pub fn extension_for(content_type: &str) -> Option<&'static str> {
    let mime = content_type.split(';').next().unwrap_or("").trim().to_ascii_lowercase();
    match mime.as_str() {
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/gif" => Some("gif"),
        _ => None,
    }
}

pub struct UploadService;

impl UploadService {
    /// Écrit l'image sous un nom aléatoire et renvoie le chemin public
    /// "/uploads/<fichier>", stocké tel quel dans la recette ou le profil.
    pub async fn save_image(upload_dir: &str, content_type: Option<&str>, bytes: &[u8]) -> Result<String, AppError> {
        let extension = content_type
            .and_then(extension_for)
            .ok_or_else(|| AppError::validation("Only image files are allowed (jpeg, jpg, png, gif)"))?;

        if bytes.is_empty() {
            return Err(AppError::validation("No file uploaded"));
        }

        fs::create_dir_all(upload_dir)
            .await
            .map_err(|e| AppError::Dependency(format!("Failed to prepare upload directory: {}", e)))?;

        let file_name = format!("{}.{}", Uuid::new_v4(), extension);
        let target = Path::new(upload_dir).join(&file_name);
        fs::write(&target, bytes)
            .await
            .map_err(|e| AppError::Dependency(format!("Failed to store uploaded file: {}", e)))?;

        info!(file = %file_name, size = bytes.len(), "Image uploaded");
        Ok(format!("/uploads/{}", file_name))
    }
}
