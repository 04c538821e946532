use crate::errors::CoreError;
use crate::models::session::CategoryType;

/// Maintains the category-type taxonomy held in the session.
///
/// Every operation returns the updated list and leaves the input untouched
/// on error.
pub struct TaxonomyService;

impl TaxonomyService {
    pub fn new() -> Self {
        Self
    }

    /// `"Emergency Fund"` → `"emergency-fund"`
    pub fn slug(&self, label: &str) -> String {
        label
            .to_lowercase()
            .split_whitespace()
            .collect::<Vec<_>>()
            .join("-")
    }

    pub fn add(&self, types: &[CategoryType], label: &str) -> Result<Vec<CategoryType>, CoreError> {
        let label = self.validated_label(label)?;
        let id = self.slug(label);
        if types.iter().any(|t| t.id == id) {
            return Err(CoreError::DuplicateCategoryType(label.to_string()));
        }
        let mut updated = types.to_vec();
        updated.push(CategoryType::new(id, label));
        Ok(updated)
    }

    /// Relabel `old_id`; its id becomes the slug of the new label. Fails if
    /// that slug belongs to a different entry.
    pub fn rename(
        &self,
        types: &[CategoryType],
        old_id: &str,
        new_label: &str,
    ) -> Result<Vec<CategoryType>, CoreError> {
        let new_label = self.validated_label(new_label)?;
        let new_id = self.slug(new_label);
        if new_id != old_id && types.iter().any(|t| t.id == new_id) {
            return Err(CoreError::DuplicateCategoryType(new_label.to_string()));
        }
        Ok(types
            .iter()
            .map(|t| {
                if t.id == old_id {
                    CategoryType::new(new_id.clone(), new_label)
                } else {
                    t.clone()
                }
            })
            .collect())
    }

    /// Removing an unknown id is not an error.
    pub fn remove(&self, types: &[CategoryType], id: &str) -> Vec<CategoryType> {
        types.iter().filter(|t| t.id != id).cloned().collect()
    }

    fn validated_label<'a>(&self, label: &'a str) -> Result<&'a str, CoreError> {
        let trimmed = label.trim();
        if trimmed.is_empty() {
            return Err(CoreError::ValidationError(
                "Category type label must not be empty".into(),
            ));
        }
        Ok(trimmed)
    }
}

impl Default for TaxonomyService {
    fn default() -> Self {
        Self::new()
    }
}
