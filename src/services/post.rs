use crate::{
    error::{reference_violation_as_field, AppError, AppResult, FieldErrors},
    models::{
        category, comment, location, post, user, Category, CategoryModel, Comment, Location,
        LocationModel, Post, PostModel, User, UserModel,
    },
    policy::ProfileScope,
    response::{resolve_page, POSTS_PER_PAGE},
};
use chrono::NaiveDateTime;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, JoinType, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, RelationTrait, Select,
};
use std::collections::HashMap;

const INVALID_CHOICE: &str = "Select a valid choice";

/// Foreign keys a post form can break, by the field that sets them.
const REFERENCE_FIELDS: &[(&str, &str)] = &[
    ("fk_posts_category_id", "category"),
    ("fk_posts_location_id", "location"),
];

/// Field values of a post after the form has been cleaned.
#[derive(Debug, Clone, PartialEq)]
pub struct PostInput {
    pub title: String,
    pub text: String,
    pub pub_date: NaiveDateTime,
    pub category_id: Option<i32>,
    pub location_id: Option<i32>,
    pub is_published: bool,
    pub image: Option<String>,
}

/// A post with everything a listing or detail view shows next to it.
#[derive(Debug, Clone)]
pub struct PostCard {
    pub post: PostModel,
    pub author: Option<UserModel>,
    pub category: Option<CategoryModel>,
    pub location: Option<LocationModel>,
    pub comment_count: u64,
}

/// One resolved page of post cards.
#[derive(Debug)]
pub struct PostPage {
    pub cards: Vec<PostCard>,
    pub total: u64,
    pub page: u64,
}

pub struct PostService {
    db: DatabaseConnection,
}

impl PostService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Front page: published posts in published categories whose
    /// publication time has come.
    pub async fn list_published(
        &self,
        now: NaiveDateTime,
        page: Option<u64>,
    ) -> AppResult<PostPage> {
        let query = Post::find()
            .join(JoinType::InnerJoin, post::Relation::Category.def())
            .filter(post::Column::IsPublished.eq(true))
            .filter(post::Column::PubDate.lte(now))
            .filter(category::Column::IsPublished.eq(true));

        self.paginate(query, page).await
    }

    /// Posts of one (already resolved, published) category.
    pub async fn list_by_category(
        &self,
        category_id: i32,
        now: NaiveDateTime,
        page: Option<u64>,
    ) -> AppResult<PostPage> {
        let query = Post::find()
            .filter(post::Column::CategoryId.eq(category_id))
            .filter(post::Column::IsPublished.eq(true))
            .filter(post::Column::PubDate.lte(now));

        self.paginate(query, page).await
    }

    pub async fn list_by_author(
        &self,
        author_id: i32,
        scope: ProfileScope,
        now: NaiveDateTime,
        page: Option<u64>,
    ) -> AppResult<PostPage> {
        let query = Post::find().filter(post::Column::AuthorId.eq(author_id));
        let query = match scope {
            ProfileScope::Owner => query,
            ProfileScope::Visitor => query.filter(post::Column::PubDate.lte(now)),
        };

        self.paginate(query, page).await
    }

    async fn paginate(&self, query: Select<Post>, page: Option<u64>) -> AppResult<PostPage> {
        let paginator = query
            .order_by_desc(post::Column::PubDate)
            .order_by_desc(post::Column::Id)
            .paginate(&self.db, POSTS_PER_PAGE);

        let total = paginator.num_items().await?;
        let page = resolve_page(page, total, POSTS_PER_PAGE);
        let posts = paginator.fetch_page(page - 1).await?;
        let cards = self.load_cards(posts).await?;

        Ok(PostPage { cards, total, page })
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<PostModel> {
        Post::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)
    }

    pub async fn get_with_category(
        &self,
        id: i32,
    ) -> AppResult<(PostModel, Option<CategoryModel>)> {
        Post::find_by_id(id)
            .find_also_related(Category)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)
    }

    pub async fn load_card(&self, post: PostModel) -> AppResult<PostCard> {
        self.load_cards(vec![post])
            .await?
            .pop()
            .ok_or(AppError::NotFound)
    }

    /// Batch-load authors, categories, locations and comment counts for a
    /// page of posts, keeping the page order.
    pub async fn load_cards(&self, posts: Vec<PostModel>) -> AppResult<Vec<PostCard>> {
        if posts.is_empty() {
            return Ok(Vec::new());
        }

        let post_ids: Vec<i32> = posts.iter().map(|p| p.id).collect();
        let author_ids: Vec<i32> = posts.iter().map(|p| p.author_id).collect();
        let category_ids: Vec<i32> = posts.iter().filter_map(|p| p.category_id).collect();
        let location_ids: Vec<i32> = posts.iter().filter_map(|p| p.location_id).collect();

        let authors: HashMap<i32, UserModel> = User::find()
            .filter(user::Column::Id.is_in(author_ids))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|u| (u.id, u))
            .collect();

        let categories: HashMap<i32, CategoryModel> = if category_ids.is_empty() {
            HashMap::new()
        } else {
            Category::find()
                .filter(category::Column::Id.is_in(category_ids))
                .all(&self.db)
                .await?
                .into_iter()
                .map(|c| (c.id, c))
                .collect()
        };

        let locations: HashMap<i32, LocationModel> = if location_ids.is_empty() {
            HashMap::new()
        } else {
            Location::find()
                .filter(location::Column::Id.is_in(location_ids))
                .all(&self.db)
                .await?
                .into_iter()
                .map(|l| (l.id, l))
                .collect()
        };

        let counts = self.comment_counts(post_ids).await?;

        let cards = posts
            .into_iter()
            .map(|post| PostCard {
                author: authors.get(&post.author_id).cloned(),
                category: post.category_id.and_then(|id| categories.get(&id).cloned()),
                location: post.location_id.and_then(|id| locations.get(&id).cloned()),
                comment_count: counts.get(&post.id).copied().unwrap_or(0),
                post,
            })
            .collect();

        Ok(cards)
    }

    async fn comment_counts(&self, post_ids: Vec<i32>) -> AppResult<HashMap<i32, u64>> {
        let rows: Vec<(i32, i64)> = Comment::find()
            .select_only()
            .column(comment::Column::PostId)
            .column_as(comment::Column::Id.count(), "comment_count")
            .filter(comment::Column::PostId.is_in(post_ids))
            .group_by(comment::Column::PostId)
            .into_tuple()
            .all(&self.db)
            .await?;

        Ok(rows
            .into_iter()
            .map(|(post_id, count)| (post_id, count.max(0) as u64))
            .collect())
    }

    /// Foreign references submitted in a post form must point at rows that
    /// exist; unknown ids are reported on their field.
    pub async fn check_references(&self, input: &PostInput) -> AppResult<FieldErrors> {
        let mut errors = FieldErrors::new();

        if let Some(category_id) = input.category_id {
            if Category::find_by_id(category_id)
                .one(&self.db)
                .await?
                .is_none()
            {
                errors.add("category", INVALID_CHOICE);
            }
        }

        if let Some(location_id) = input.location_id {
            if Location::find_by_id(location_id)
                .one(&self.db)
                .await?
                .is_none()
            {
                errors.add("location", INVALID_CHOICE);
            }
        }

        Ok(errors)
    }

    /// The author always comes from the session, never from the form.
    pub async fn create(&self, author_id: i32, input: PostInput) -> AppResult<PostModel> {
        self.check_references(&input).await?.into_result()?;

        let now = chrono::Utc::now().naive_utc();

        let new_post = post::ActiveModel {
            title: sea_orm::ActiveValue::Set(input.title),
            text: sea_orm::ActiveValue::Set(input.text),
            pub_date: sea_orm::ActiveValue::Set(input.pub_date),
            author_id: sea_orm::ActiveValue::Set(author_id),
            location_id: sea_orm::ActiveValue::Set(input.location_id),
            category_id: sea_orm::ActiveValue::Set(input.category_id),
            is_published: sea_orm::ActiveValue::Set(input.is_published),
            image: sea_orm::ActiveValue::Set(input.image),
            created_at: sea_orm::ActiveValue::Set(now),
            ..Default::default()
        };

        // The referenced rows can disappear between the check and the write.
        let post = new_post
            .insert(&self.db)
            .await
            .map_err(|e| reference_violation_as_field(e, REFERENCE_FIELDS, INVALID_CHOICE))?;
        tracing::info!(post_id = post.id, author_id, "Post created");
        Ok(post)
    }

    /// Overwrite the editable fields; `author_id` and `created_at` stay.
    pub async fn update(&self, existing: PostModel, input: PostInput) -> AppResult<PostModel> {
        self.check_references(&input).await?.into_result()?;

        let mut active: post::ActiveModel = existing.into();
        active.title = sea_orm::ActiveValue::Set(input.title);
        active.text = sea_orm::ActiveValue::Set(input.text);
        active.pub_date = sea_orm::ActiveValue::Set(input.pub_date);
        active.category_id = sea_orm::ActiveValue::Set(input.category_id);
        active.location_id = sea_orm::ActiveValue::Set(input.location_id);
        active.is_published = sea_orm::ActiveValue::Set(input.is_published);
        active.image = sea_orm::ActiveValue::Set(input.image);

        let updated = active
            .update(&self.db)
            .await
            .map_err(|e| reference_violation_as_field(e, REFERENCE_FIELDS, INVALID_CHOICE))?;
        Ok(updated)
    }

    /// Comments go with the post through the cascading foreign key.
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let result = Post::delete_by_id(id).exec(&self.db).await?;
        if result.rows_affected == 0 {
            return Err(AppError::NotFound);
        }
        tracing::info!(post_id = id, "Post deleted");
        Ok(())
    }
}
