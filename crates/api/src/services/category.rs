//! Category use cases.
//!
//! Both the list and single categories are cached. Updates and deletes also
//! drop the complaint list, which embeds category title and answer.
//!
//! As with complaints, a miss that repopulates after a concurrent write's
//! invalidation can keep pre-write data cached until the TTL expires.

use std::sync::Arc;

use complaints_cache::CacheAside;
use complaints_core::cache_keys;
use complaints_core::category as rules;
use complaints_core::error::CoreError;
use complaints_core::types::DbId;
use complaints_db::models::category::{Category, CreateCategory, UpdateCategory};
use complaints_db::store::{CategoryStore, StoreError};
use mockable::Clock;

pub struct CategoryService {
    categories: Arc<dyn CategoryStore>,
    cache: CacheAside,
    clock: Arc<dyn Clock>,
}

fn title_taken(title: &str) -> impl FnOnce(StoreError) -> CoreError + '_ {
    move |err| match err {
        StoreError::UniqueViolation { .. } => {
            CoreError::Conflict(format!("A category titled '{title}' already exists"))
        }
        other => other.into(),
    }
}

impl CategoryService {
    pub fn new(
        categories: Arc<dyn CategoryStore>,
        cache: CacheAside,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            categories,
            cache,
            clock,
        }
    }

    pub async fn list(&self) -> Result<Vec<Category>, CoreError> {
        if let Some(cached) = self.cache.get_json(cache_keys::CATEGORIES_ALL).await {
            return Ok(cached);
        }
        let categories = self.categories.list().await?;
        self.cache
            .put_json(cache_keys::CATEGORIES_ALL, &categories)
            .await;
        Ok(categories)
    }

    pub async fn get(&self, id: DbId) -> Result<Category, CoreError> {
        let key = cache_keys::category(id);
        if let Some(cached) = self.cache.get_json(&key).await {
            return Ok(cached);
        }
        let category = self
            .categories
            .find_by_id(id)
            .await?
            .ok_or_else(|| CoreError::not_found("Category", id))?;
        self.cache.put_json(&key, &category).await;
        Ok(category)
    }

    pub async fn create(&self, input: CreateCategory) -> Result<Category, CoreError> {
        let input = CreateCategory {
            title: input.title.trim().to_string(),
            description: input.description.trim().to_string(),
            answer: input.answer,
        };
        rules::validate_title(&input.title)?;
        rules::validate_description(&input.description)?;
        rules::validate_answer(&input.answer)?;

        let category = self
            .categories
            .create(&input)
            .await
            .map_err(title_taken(&input.title))?;

        self.cache.invalidate(&cache_keys::category_create()).await;
        tracing::info!(category_id = %category.id, title = %category.title, "Category created");
        Ok(category)
    }

    /// Partially update a category. Absent fields are left unchanged.
    pub async fn update(&self, id: DbId, input: UpdateCategory) -> Result<Category, CoreError> {
        let input = UpdateCategory {
            title: input.title.map(|t| t.trim().to_string()),
            description: input.description.map(|d| d.trim().to_string()),
            answer: input.answer,
        };
        if let Some(title) = &input.title {
            rules::validate_title(title)?;
        }
        if let Some(description) = &input.description {
            rules::validate_description(description)?;
        }
        if let Some(answer) = &input.answer {
            rules::validate_answer(answer)?;
        }

        let title = input.title.clone().unwrap_or_default();
        let category = self
            .categories
            .update(id, &input, self.clock.utc())
            .await
            .map_err(title_taken(&title))?
            .ok_or_else(|| CoreError::not_found("Category", id))?;

        self.cache.invalidate(&cache_keys::category_write(id)).await;
        tracing::info!(category_id = %id, "Category updated");
        Ok(category)
    }

    /// Delete a category. `Conflict` while complaints still reference it.
    pub async fn delete(&self, id: DbId) -> Result<(), CoreError> {
        let deleted = self.categories.delete(id).await.map_err(|err| {
            if err.is_foreign_key_violation() {
                CoreError::Conflict(
                    "Category still has complaints; reassign or delete them first".into(),
                )
            } else {
                err.into()
            }
        })?;
        if !deleted {
            return Err(CoreError::not_found("Category", id));
        }

        self.cache.invalidate(&cache_keys::category_write(id)).await;
        tracing::info!(category_id = %id, "Category deleted");
        Ok(())
    }
}
