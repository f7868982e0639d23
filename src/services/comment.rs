use crate::{
    error::{AppError, AppResult},
    models::{comment, user, Comment, CommentModel, User, UserModel},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
};
use std::collections::HashMap;

pub struct CommentService {
    db: DatabaseConnection,
}

impl CommentService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Comments of a post, oldest first, each with its author.
    pub async fn list_by_post(
        &self,
        post_id: i32,
    ) -> AppResult<Vec<(CommentModel, Option<UserModel>)>> {
        let comments = Comment::find()
            .filter(comment::Column::PostId.eq(post_id))
            .order_by_asc(comment::Column::CreatedAt)
            .order_by_asc(comment::Column::Id)
            .all(&self.db)
            .await?;

        let author_ids: Vec<i32> = comments.iter().map(|c| c.author_id).collect();
        let authors: HashMap<i32, UserModel> = if author_ids.is_empty() {
            HashMap::new()
        } else {
            User::find()
                .filter(user::Column::Id.is_in(author_ids))
                .all(&self.db)
                .await?
                .into_iter()
                .map(|u| (u.id, u))
                .collect()
        };

        Ok(comments
            .into_iter()
            .map(|c| {
                let author = authors.get(&c.author_id).cloned();
                (c, author)
            })
            .collect())
    }

    /// A comment addressed through the wrong post does not exist.
    pub async fn get_in_post(&self, comment_id: i32, post_id: i32) -> AppResult<CommentModel> {
        Comment::find_by_id(comment_id)
            .filter(comment::Column::PostId.eq(post_id))
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)
    }

    pub async fn create(&self, post_id: i32, author_id: i32, text: &str) -> AppResult<CommentModel> {
        let now = chrono::Utc::now().naive_utc();

        let new_comment = comment::ActiveModel {
            text: sea_orm::ActiveValue::Set(text.to_string()),
            created_at: sea_orm::ActiveValue::Set(now),
            author_id: sea_orm::ActiveValue::Set(author_id),
            post_id: sea_orm::ActiveValue::Set(post_id),
            ..Default::default()
        };

        let comment = new_comment.insert(&self.db).await?;
        Ok(comment)
    }

    pub async fn update(&self, existing: CommentModel, text: &str) -> AppResult<CommentModel> {
        let mut active: comment::ActiveModel = existing.into();
        active.text = sea_orm::ActiveValue::Set(text.to_string());

        let updated = active.update(&self.db).await?;
        Ok(updated)
    }

    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let result = Comment::delete_by_id(id).exec(&self.db).await?;
        if result.rows_affected == 0 {
            return Err(AppError::NotFound);
        }
        Ok(())
    }
}
