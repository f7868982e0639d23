use crate::{
    error::{unique_violation_as_field, AppError, AppResult, FieldErrors},
    models::{category, Category, CategoryModel},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder,
};

const SLUG_TAKEN: &str = "Category with this slug already exists";

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryInput {
    pub title: String,
    pub description: String,
    pub slug: String,
    pub is_published: bool,
}

pub struct CategoryService {
    db: DatabaseConnection,
}

impl CategoryService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn list(&self) -> AppResult<Vec<CategoryModel>> {
        let categories = Category::find()
            .order_by_asc(category::Column::Title)
            .all(&self.db)
            .await?;
        Ok(categories)
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<CategoryModel> {
        Category::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)
    }

    /// Unpublished categories do not resolve by slug at all.
    pub async fn get_published_by_slug(&self, slug: &str) -> AppResult<CategoryModel> {
        Category::find()
            .filter(category::Column::Slug.eq(slug))
            .filter(category::Column::IsPublished.eq(true))
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)
    }

    async fn ensure_slug_free(&self, slug: &str, except_id: Option<i32>) -> AppResult<()> {
        let mut query = Category::find().filter(category::Column::Slug.eq(slug));
        if let Some(id) = except_id {
            query = query.filter(category::Column::Id.ne(id));
        }
        if query.count(&self.db).await? > 0 {
            return Err(AppError::Form(FieldErrors::single("slug", SLUG_TAKEN)));
        }
        Ok(())
    }

    pub async fn create(&self, input: CategoryInput) -> AppResult<CategoryModel> {
        self.ensure_slug_free(&input.slug, None).await?;

        let now = chrono::Utc::now().naive_utc();
        let new_category = category::ActiveModel {
            title: sea_orm::ActiveValue::Set(input.title),
            description: sea_orm::ActiveValue::Set(input.description),
            slug: sea_orm::ActiveValue::Set(input.slug),
            is_published: sea_orm::ActiveValue::Set(input.is_published),
            created_at: sea_orm::ActiveValue::Set(now),
            ..Default::default()
        };

        // A concurrent insert can still win the race; the unique index has
        // the final word.
        let category = new_category
            .insert(&self.db)
            .await
            .map_err(|e| unique_violation_as_field(e, "slug", SLUG_TAKEN))?;
        tracing::info!(category_id = category.id, slug = %category.slug, "Category created");
        Ok(category)
    }

    pub async fn update(&self, id: i32, input: CategoryInput) -> AppResult<CategoryModel> {
        let existing = self.get_by_id(id).await?;
        self.ensure_slug_free(&input.slug, Some(id)).await?;

        let mut active: category::ActiveModel = existing.into();
        active.title = sea_orm::ActiveValue::Set(input.title);
        active.description = sea_orm::ActiveValue::Set(input.description);
        active.slug = sea_orm::ActiveValue::Set(input.slug);
        active.is_published = sea_orm::ActiveValue::Set(input.is_published);

        let updated = active
            .update(&self.db)
            .await
            .map_err(|e| unique_violation_as_field(e, "slug", SLUG_TAKEN))?;
        Ok(updated)
    }

    /// Posts of a deleted category stay, with their category cleared.
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let result = Category::delete_by_id(id).exec(&self.db).await?;
        if result.rows_affected == 0 {
            return Err(AppError::NotFound);
        }
        tracing::info!(category_id = id, "Category deleted");
        Ok(())
    }
}
