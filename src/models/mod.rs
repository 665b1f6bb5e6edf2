// ============================================================================
// MODELS - MODULE PRINCIPAL
// ============================================================================
//
// Description:
//   Point d'entrée pour tous les modèles de données.
//   Chaque entité correspond à une table (Postgres en prod, SQLite en test).
//
// Liste des modules:
//   - users : Comptes (role admin/user, is_active)
//   - recipe : Recettes + colonnes de modération + note moyenne en cache
//   - review : Avis (1 par couple user/recette)
//   - favorite : Favoris (1 par couple user/recette)
//   - dto : Payloads d'entrée validés et enveloppe de réponse
//
// Points d'attention:
//   - La propriété passe toujours par une clé étrangère (requested_by,
//     user_id), jamais par de l'embarqué
//   - Les tables sont créées par le migrator (crate::migrator)
//
// ============================================================================

pub mod users;
pub mod recipe;
pub mod review;
pub mod favorite;
pub mod dto;
