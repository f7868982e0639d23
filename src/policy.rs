//! Read and write rules for blog content.
//!
//! Everything here is pure: callers pass the viewer and the clock in, so the
//! same rules back both the handlers and the unit tests. A viewer is the
//! authenticated user's id, or `None` for an anonymous visitor.

use crate::models::{CategoryModel, CommentModel, PostModel};
use chrono::NaiveDateTime;

/// Entities whose mutation is reserved to the user who wrote them.
pub trait Authored {
    fn author_id(&self) -> i32;
}

impl Authored for PostModel {
    fn author_id(&self) -> i32 {
        self.author_id
    }
}

impl Authored for CommentModel {
    fn author_id(&self) -> i32 {
        self.author_id
    }
}

pub fn is_author<E: Authored>(entity: &E, viewer: Option<i32>) -> bool {
    viewer == Some(entity.author_id())
}

/// Edit and delete of posts and comments are allowed to their author only.
pub fn can_modify<E: Authored>(entity: &E, viewer: Option<i32>) -> bool {
    is_author(entity, viewer)
}

/// A post is public once it is published, filed under a published category
/// and its publication time has come. A post whose category was removed is
/// never public.
pub fn is_public(post: &PostModel, category: Option<&CategoryModel>, now: NaiveDateTime) -> bool {
    post.is_published && category.is_some_and(|c| c.is_published) && post.pub_date <= now
}

/// Authors always see their own posts; everybody else only sees public ones.
pub fn is_visible(
    post: &PostModel,
    category: Option<&CategoryModel>,
    viewer: Option<i32>,
    now: NaiveDateTime,
) -> bool {
    is_author(post, viewer) || is_public(post, category, now)
}

/// Which of a user's posts a profile page lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileScope {
    /// The owner looking at their own profile: every post, any state.
    Owner,
    /// Anyone else: posts whose publication time has come. Publication and
    /// category flags are not consulted here.
    Visitor,
}

pub fn profile_scope(profile_user_id: i32, viewer: Option<i32>) -> ProfileScope {
    if viewer == Some(profile_user_id) {
        ProfileScope::Owner
    } else {
        ProfileScope::Visitor
    }
}
