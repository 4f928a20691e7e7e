use sea_orm::{DatabaseConnection, TransactionTrait};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::{
    entity::prelude::*,
    ids::{PostId, UserId},
};

#[derive(Debug, Error)]
pub enum PostsServiceError {
    #[error("fatal database error")]
    DbError(#[from] DbErr),

    #[error("post not found")]
    PostNotFound,

    #[error("user not found")]
    UserNotFound,

    #[error("a post needs at least one content segment")]
    EmptyPostBody,

    #[error("unauthorized: not the post author")]
    Unauthorized,
}

/// Content segment supplied at post creation time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPostChild {
    pub content: String,
    pub media_ref: Option<String>,
    pub location: Option<String>,
    pub category: Option<String>,
}

#[derive(Clone)]
pub struct PostsService {
    db: DatabaseConnection,
}

impl PostsService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Publish a post with its content segments, in one transaction.
    ///
    /// A post owns at least one segment; segments are immutable once written
    /// and only go away with the post.
    pub async fn create_post(
        &self,
        author_id: UserId,
        title: String,
        children: Vec<NewPostChild>,
    ) -> Result<(PostModel, Vec<PostChildModel>), PostsServiceError> {
        if children.is_empty() {
            return Err(PostsServiceError::EmptyPostBody);
        }

        let txn = self.db.begin().await?;

        // Verify author exists
        let author_exists = User::find_by_id(author_id).one(&txn).await?.is_some();
        if !author_exists {
            return Err(PostsServiceError::UserNotFound);
        }

        let post = PostActiveModel {
            id: NotSet,
            author_id: Set(author_id),
            title: Set(title),
            created_at: Set(chrono::Utc::now()),
        };

        let post = Post::insert(post).exec_with_returning(&txn).await?;

        let mut stored_children = Vec::with_capacity(children.len());
        for child in children {
            let child = PostChildActiveModel {
                id: NotSet,
                post_id: Set(post.id),
                content: Set(child.content),
                media_ref: Set(child.media_ref),
                location: Set(child.location),
                category: Set(child.category),
            };
            let child = PostChild::insert(child).exec_with_returning(&txn).await?;
            stored_children.push(child);
        }

        txn.commit().await?;
        debug!(post_id = %post.id, author_id = %author_id, segments = stored_children.len(), "post created");
        Ok((post, stored_children))
    }

    /// Get a specific post by id
    pub async fn get_post(&self, post_id: PostId) -> Result<PostModel, PostsServiceError> {
        Post::find_by_id(post_id)
            .one(&self.db)
            .await?
            .ok_or(PostsServiceError::PostNotFound)
    }

    /// List a post's content segments in the order they were written
    pub async fn list_children(
        &self,
        post_id: PostId,
    ) -> Result<Vec<PostChildModel>, PostsServiceError> {
        let children = PostChild::find()
            .filter(PostChildColumn::PostId.eq(post_id))
            .order_by_asc(PostChildColumn::Id)
            .all(&self.db)
            .await?;

        Ok(children)
    }

    /// List posts by a specific author, newest first, with pagination
    pub async fn list_posts_by_author(
        &self,
        author_id: UserId,
        limit: u64,
        offset: u64,
    ) -> Result<Vec<PostModel>, PostsServiceError> {
        let posts = Post::find()
            .filter(PostColumn::AuthorId.eq(author_id))
            .order_by_desc(PostColumn::CreatedAt)
            .order_by_desc(PostColumn::Id)
            .limit(limit)
            .offset(offset)
            .all(&self.db)
            .await?;

        Ok(posts)
    }

    /// Delete a post (only by its author)
    pub async fn delete_post(
        &self,
        post_id: PostId,
        acting_user_id: UserId,
    ) -> Result<(), PostsServiceError> {
        let post = self.get_post(post_id).await?;

        if post.author_id != acting_user_id {
            return Err(PostsServiceError::Unauthorized);
        }

        // Children, goods and comments cascade with the post
        Post::delete_by_id(post_id).exec(&self.db).await?;

        debug!(%post_id, "post deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils;

    async fn setup_test_service() -> PostsService {
        PostsService::new(test_utils::setup_test_db().await)
    }

    async fn create_test_user(service: &PostsService, username: &str) -> UserId {
        let user = UserActiveModel {
            id: NotSet,
            username: Set(username.to_string()),
            email: Set(format!("{}@example.com", username)),
            password_hash: Set("hash".to_string()),
            created_at: Set(chrono::Utc::now()),
        };
        let user = User::insert(user)
            .exec_with_returning(&service.db)
            .await
            .unwrap();
        user.id
    }

    fn text_child(content: &str) -> NewPostChild {
        NewPostChild {
            content: content.to_string(),
            media_ref: None,
            location: None,
            category: None,
        }
    }

    #[tokio::test]
    async fn test_create_post_with_children() {
        let service = setup_test_service().await;
        let author = create_test_user(&service, "alice").await;

        let (post, children) = service
            .create_post(
                author,
                "First post".to_string(),
                vec![
                    text_child("hello"),
                    NewPostChild {
                        content: "a picture".to_string(),
                        media_ref: Some("pic.jpg".to_string()),
                        location: Some("home".to_string()),
                        category: Some("photos".to_string()),
                    },
                ],
            )
            .await
            .expect("Failed to create post");

        assert_eq!(post.author_id, author);
        assert_eq!(post.title, "First post");
        assert_eq!(children.len(), 2);
        assert!(children.iter().all(|child| child.post_id == post.id));
        assert_eq!(children[1].media_ref, Some("pic.jpg".to_string()));
    }

    #[tokio::test]
    async fn test_create_post_without_children_rejected() {
        let service = setup_test_service().await;
        let author = create_test_user(&service, "alice").await;

        let result = service
            .create_post(author, "Empty".to_string(), Vec::new())
            .await;

        assert!(matches!(result, Err(PostsServiceError::EmptyPostBody)));
    }

    #[tokio::test]
    async fn test_create_post_unknown_author() {
        let service = setup_test_service().await;

        let result = service
            .create_post(
                UserId::from_i64(999),
                "Ghost post".to_string(),
                vec![text_child("boo")],
            )
            .await;

        assert!(matches!(result, Err(PostsServiceError::UserNotFound)));
    }

    #[tokio::test]
    async fn test_get_post() {
        let service = setup_test_service().await;
        let author = create_test_user(&service, "alice").await;

        let (created, _children) = service
            .create_post(author, "Post".to_string(), vec![text_child("body")])
            .await
            .unwrap();

        let fetched = service.get_post(created.id).await.unwrap();
        assert_eq!(fetched.id, created.id);

        let missing = service.get_post(PostId::from_i64(999)).await;
        assert!(matches!(missing, Err(PostsServiceError::PostNotFound)));
    }

    #[tokio::test]
    async fn test_list_children_in_insertion_order() {
        let service = setup_test_service().await;
        let author = create_test_user(&service, "alice").await;

        let (post, _children) = service
            .create_post(
                author,
                "Segments".to_string(),
                vec![text_child("one"), text_child("two"), text_child("three")],
            )
            .await
            .unwrap();

        let children = service.list_children(post.id).await.unwrap();
        let contents: Vec<&str> = children.iter().map(|child| child.content.as_str()).collect();
        assert_eq!(contents, vec!["one", "two", "three"]);
    }

    #[tokio::test]
    async fn test_list_posts_by_author_newest_first() {
        let service = setup_test_service().await;
        let author = create_test_user(&service, "alice").await;

        for i in 0..5 {
            service
                .create_post(author, format!("Post {}", i), vec![text_child("body")])
                .await
                .unwrap();
        }

        let posts = service.list_posts_by_author(author, 10, 0).await.unwrap();
        assert_eq!(posts.len(), 5);
        assert_eq!(posts[0].title, "Post 4", "Newest post should come first");

        // Pagination
        let page1 = service.list_posts_by_author(author, 2, 0).await.unwrap();
        let page2 = service.list_posts_by_author(author, 2, 2).await.unwrap();
        assert_eq!(page1.len(), 2);
        assert_eq!(page2.len(), 2);
        assert!(page1[1].id > page2[0].id);
    }

    #[tokio::test]
    async fn test_delete_post_by_author() {
        let service = setup_test_service().await;
        let author = create_test_user(&service, "alice").await;

        let (post, _children) = service
            .create_post(author, "Doomed".to_string(), vec![text_child("body")])
            .await
            .unwrap();

        service
            .delete_post(post.id, author)
            .await
            .expect("Author should be able to delete");

        let result = service.get_post(post.id).await;
        assert!(result.is_err(), "Post should be deleted");

        let children = service.list_children(post.id).await.unwrap();
        assert!(children.is_empty(), "Children should be cascade deleted");
    }

    #[tokio::test]
    async fn test_delete_post_by_non_author_fails() {
        let service = setup_test_service().await;
        let author = create_test_user(&service, "alice").await;
        let other = create_test_user(&service, "bob").await;

        let (post, _children) = service
            .create_post(author, "Mine".to_string(), vec![text_child("body")])
            .await
            .unwrap();

        let result = service.delete_post(post.id, other).await;
        assert!(matches!(result, Err(PostsServiceError::Unauthorized)));

        assert!(service.get_post(post.id).await.is_ok(), "Post should survive");
    }
}
