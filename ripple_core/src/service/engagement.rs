use sea_orm::{DatabaseConnection, TransactionTrait};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::{
    entity::prelude::*,
    error,
    ids::{CommentId, PostId, UserId},
};

#[derive(Debug, Error)]
pub enum EngagementServiceError {
    #[error("fatal database error")]
    DbError(#[from] DbErr),

    #[error("user not found")]
    UserNotFound,

    #[error("post not found")]
    PostNotFound,

    #[error("comment not found")]
    CommentNotFound,

    #[error("a comment needs content")]
    EmptyComment,

    #[error("conflicting engagement write, retry")]
    Conflict,

    #[error("unauthorized: not the comment author")]
    Unauthorized,
}

/// Outcome of a like toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GoodToggle {
    Liked,
    Unliked,
}

/// Likes ("goods") and comments on posts. Counts are computed on read;
/// nothing here is cached or denormalized.
#[derive(Clone)]
pub struct EngagementService {
    db: DatabaseConnection,
}

impl EngagementService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Flip the calling user's like on a post.
    ///
    /// The existence checks and the insert/delete run in one transaction;
    /// the unique index on (user_id, post_id) is the backstop when two
    /// toggles race, surfacing as [`EngagementServiceError::Conflict`]
    /// rather than a raw storage error or a duplicate row.
    pub async fn toggle_good(
        &self,
        user_id: UserId,
        post_id: PostId,
    ) -> Result<GoodToggle, EngagementServiceError> {
        let txn = self.db.begin().await?;

        let user_exists = User::find_by_id(user_id).one(&txn).await?.is_some();
        if !user_exists {
            return Err(EngagementServiceError::UserNotFound);
        }

        let post_exists = Post::find_by_id(post_id).one(&txn).await?.is_some();
        if !post_exists {
            return Err(EngagementServiceError::PostNotFound);
        }

        let existing = Good::find()
            .filter(GoodColumn::UserId.eq(user_id))
            .filter(GoodColumn::PostId.eq(post_id))
            .one(&txn)
            .await?;

        let outcome = match existing {
            Some(good) => {
                Good::delete_by_id(good.id).exec(&txn).await?;
                GoodToggle::Unliked
            }
            None => {
                let good = GoodActiveModel {
                    id: NotSet,
                    user_id: Set(user_id),
                    post_id: Set(post_id),
                };

                match Good::insert(good).exec(&txn).await {
                    Ok(_) => GoodToggle::Liked,
                    // A concurrent toggle inserted the row first
                    Err(err) if error::is_unique_violation(&err) => {
                        return Err(EngagementServiceError::Conflict);
                    }
                    // The post can vanish between the check and the write
                    Err(err) if error::is_foreign_key_violation(&err) => {
                        return Err(EngagementServiceError::PostNotFound);
                    }
                    Err(err) => return Err(err.into()),
                }
            }
        };

        txn.commit().await?;
        debug!(%user_id, %post_id, ?outcome, "good toggled");
        Ok(outcome)
    }

    /// Whether the user currently likes the post
    pub async fn has_good(
        &self,
        user_id: UserId,
        post_id: PostId,
    ) -> Result<bool, EngagementServiceError> {
        let good = Good::find()
            .filter(GoodColumn::UserId.eq(user_id))
            .filter(GoodColumn::PostId.eq(post_id))
            .one(&self.db)
            .await?;

        Ok(good.is_some())
    }

    /// Number of likes on a post. Unknown posts count zero.
    pub async fn good_count(&self, post_id: PostId) -> Result<u64, EngagementServiceError> {
        let count = Good::find()
            .filter(GoodColumn::PostId.eq(post_id))
            .count(&self.db)
            .await?;

        Ok(count)
    }

    /// Number of comments on a post. Unknown posts count zero.
    pub async fn comment_count(&self, post_id: PostId) -> Result<u64, EngagementServiceError> {
        let count = Comment::find()
            .filter(CommentColumn::PostId.eq(post_id))
            .count(&self.db)
            .await?;

        Ok(count)
    }

    /// Attach a comment to a post
    pub async fn add_comment(
        &self,
        author_id: UserId,
        post_id: PostId,
        content: String,
    ) -> Result<CommentModel, EngagementServiceError> {
        if content.is_empty() {
            return Err(EngagementServiceError::EmptyComment);
        }

        let author_exists = User::find_by_id(author_id).one(&self.db).await?.is_some();
        if !author_exists {
            return Err(EngagementServiceError::UserNotFound);
        }

        let post_exists = Post::find_by_id(post_id).one(&self.db).await?.is_some();
        if !post_exists {
            return Err(EngagementServiceError::PostNotFound);
        }

        let comment = CommentActiveModel {
            id: NotSet,
            author_id: Set(author_id),
            post_id: Set(post_id),
            content: Set(content),
        };

        let comment = match Comment::insert(comment).exec_with_returning(&self.db).await {
            Ok(comment) => comment,
            // The post can vanish between the check and the write
            Err(err) if error::is_foreign_key_violation(&err) => {
                return Err(EngagementServiceError::PostNotFound);
            }
            Err(err) => return Err(err.into()),
        };

        debug!(comment_id = %comment.id, %post_id, "comment added");
        Ok(comment)
    }

    /// List comments on a post in the order they were written, with pagination
    pub async fn list_comments(
        &self,
        post_id: PostId,
        limit: u64,
        offset: u64,
    ) -> Result<Vec<CommentModel>, EngagementServiceError> {
        let comments = Comment::find()
            .filter(CommentColumn::PostId.eq(post_id))
            .order_by_asc(CommentColumn::Id)
            .limit(limit)
            .offset(offset)
            .all(&self.db)
            .await?;

        Ok(comments)
    }

    /// Delete a comment (only by its author). Comments cannot be edited.
    pub async fn delete_comment(
        &self,
        comment_id: CommentId,
        acting_user_id: UserId,
    ) -> Result<(), EngagementServiceError> {
        let comment = Comment::find_by_id(comment_id)
            .one(&self.db)
            .await?
            .ok_or(EngagementServiceError::CommentNotFound)?;

        if comment.author_id != acting_user_id {
            return Err(EngagementServiceError::Unauthorized);
        }

        Comment::delete_by_id(comment_id).exec(&self.db).await?;

        debug!(%comment_id, "comment deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils;

    async fn setup_test_service() -> EngagementService {
        EngagementService::new(test_utils::setup_test_db().await)
    }

    async fn create_test_user(service: &EngagementService, username: &str) -> UserId {
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

    async fn create_test_post(service: &EngagementService, author_id: UserId) -> PostId {
        let post = PostActiveModel {
            id: NotSet,
            author_id: Set(author_id),
            title: Set("Test post".to_string()),
            created_at: Set(chrono::Utc::now()),
        };
        let post = Post::insert(post)
            .exec_with_returning(&service.db)
            .await
            .unwrap();
        post.id
    }

    #[tokio::test]
    async fn test_toggle_good_like_then_unlike() {
        let service = setup_test_service().await;
        let alice = create_test_user(&service, "alice").await;
        let bob = create_test_user(&service, "bob").await;
        let post = create_test_post(&service, bob).await;

        let first = service.toggle_good(alice, post).await.unwrap();
        assert_eq!(first, GoodToggle::Liked);
        assert_eq!(service.good_count(post).await.unwrap(), 1);
        assert!(service.has_good(alice, post).await.unwrap());

        let second = service.toggle_good(alice, post).await.unwrap();
        assert_eq!(second, GoodToggle::Unliked);
        assert_eq!(service.good_count(post).await.unwrap(), 0);
        assert!(!service.has_good(alice, post).await.unwrap());
    }

    #[tokio::test]
    async fn test_repeated_toggles_settle() {
        let service = setup_test_service().await;
        let alice = create_test_user(&service, "alice").await;
        let bob = create_test_user(&service, "bob").await;
        let post = create_test_post(&service, bob).await;

        for round in 1..=5 {
            service.toggle_good(alice, post).await.unwrap();
            let count = service.good_count(post).await.unwrap();
            let expected = (round % 2) as u64;
            assert_eq!(count, expected, "Count should alternate, never exceed 1");
        }
    }

    #[tokio::test]
    async fn test_good_count_multiple_users() {
        let service = setup_test_service().await;
        let author = create_test_user(&service, "author").await;
        let post = create_test_post(&service, author).await;

        for name in ["alice", "bob", "carol"] {
            let user = create_test_user(&service, name).await;
            let outcome = service.toggle_good(user, post).await.unwrap();
            assert_eq!(outcome, GoodToggle::Liked);
        }

        assert_eq!(service.good_count(post).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_toggle_good_unknown_post() {
        let service = setup_test_service().await;
        let alice = create_test_user(&service, "alice").await;

        let result = service.toggle_good(alice, PostId::from_i64(999)).await;
        assert!(matches!(result, Err(EngagementServiceError::PostNotFound)));
    }

    #[tokio::test]
    async fn test_toggle_good_unknown_user() {
        let service = setup_test_service().await;
        let author = create_test_user(&service, "author").await;
        let post = create_test_post(&service, author).await;

        let result = service.toggle_good(UserId::from_i64(999), post).await;
        assert!(matches!(result, Err(EngagementServiceError::UserNotFound)));
    }

    #[tokio::test]
    async fn test_interleaved_toggles_never_duplicate() {
        let service = setup_test_service().await;
        let alice = create_test_user(&service, "alice").await;
        let bob = create_test_user(&service, "bob").await;
        let post = create_test_post(&service, bob).await;

        let (a, b) = tokio::join!(
            service.toggle_good(alice, post),
            service.toggle_good(alice, post),
        );

        // Each attempt either toggled or lost the race with a clean Conflict
        for result in [a, b] {
            match result {
                Ok(_) | Err(EngagementServiceError::Conflict) => {}
                Err(other) => panic!("unexpected toggle error: {:?}", other),
            }
        }

        let rows = Good::find()
            .filter(GoodColumn::UserId.eq(alice))
            .filter(GoodColumn::PostId.eq(post))
            .all(&service.db)
            .await
            .unwrap();
        assert!(rows.len() <= 1, "Racing toggles must never duplicate the row");
    }

    #[tokio::test]
    async fn test_add_comment_and_count() {
        let service = setup_test_service().await;
        let alice = create_test_user(&service, "alice").await;
        let bob = create_test_user(&service, "bob").await;
        let post = create_test_post(&service, bob).await;

        let comment = service
            .add_comment(alice, post, "nice one".to_string())
            .await
            .expect("Failed to add comment");

        assert_eq!(comment.author_id, alice);
        assert_eq!(comment.post_id, post);
        assert_eq!(service.comment_count(post).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_empty_comment_rejected() {
        let service = setup_test_service().await;
        let alice = create_test_user(&service, "alice").await;
        let post = create_test_post(&service, alice).await;

        let result = service.add_comment(alice, post, String::new()).await;
        assert!(matches!(result, Err(EngagementServiceError::EmptyComment)));

        assert_eq!(
            service.comment_count(post).await.unwrap(),
            0,
            "Rejected comment must not change the count"
        );
    }

    #[tokio::test]
    async fn test_add_comment_unknown_post_or_author() {
        let service = setup_test_service().await;
        let alice = create_test_user(&service, "alice").await;
        let post = create_test_post(&service, alice).await;

        let result = service
            .add_comment(alice, PostId::from_i64(999), "hello".to_string())
            .await;
        assert!(matches!(result, Err(EngagementServiceError::PostNotFound)));

        let result = service
            .add_comment(UserId::from_i64(999), post, "hello".to_string())
            .await;
        assert!(matches!(result, Err(EngagementServiceError::UserNotFound)));
    }

    #[tokio::test]
    async fn test_add_comment_racing_post_delete_stays_typed() {
        let service = setup_test_service().await;
        let alice = create_test_user(&service, "alice").await;
        let bob = create_test_user(&service, "bob").await;
        let post = create_test_post(&service, bob).await;

        let (comment_result, _) = tokio::join!(
            service.add_comment(alice, post, "racing".to_string()),
            Post::delete_by_id(post).exec(&service.db),
        );

        // The loser of the race sees the typed error, never a raw storage one
        match comment_result {
            Ok(_) | Err(EngagementServiceError::PostNotFound) => {}
            Err(other) => panic!("unexpected comment error: {:?}", other),
        }

        // Either order leaves no comment behind: the post cascades it away
        // or the insert never landed
        assert_eq!(service.comment_count(post).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_list_comments_in_insertion_order() {
        let service = setup_test_service().await;
        let alice = create_test_user(&service, "alice").await;
        let bob = create_test_user(&service, "bob").await;
        let post = create_test_post(&service, bob).await;

        for i in 0..3 {
            service
                .add_comment(alice, post, format!("comment {}", i))
                .await
                .unwrap();
        }

        let comments = service.list_comments(post, 10, 0).await.unwrap();
        let contents: Vec<&str> = comments
            .iter()
            .map(|comment| comment.content.as_str())
            .collect();
        assert_eq!(contents, vec!["comment 0", "comment 1", "comment 2"]);

        // Pagination keeps the same order
        let page = service.list_comments(post, 2, 1).await.unwrap();
        assert_eq!(page[0].content, "comment 1");
    }

    #[tokio::test]
    async fn test_counts_zero_for_unknown_post() {
        let service = setup_test_service().await;
        let ghost = PostId::from_i64(999);

        assert_eq!(service.good_count(ghost).await.unwrap(), 0);
        assert_eq!(service.comment_count(ghost).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_delete_comment_by_author() {
        let service = setup_test_service().await;
        let alice = create_test_user(&service, "alice").await;
        let bob = create_test_user(&service, "bob").await;
        let post = create_test_post(&service, bob).await;

        let comment = service
            .add_comment(alice, post, "delete me".to_string())
            .await
            .unwrap();

        service.delete_comment(comment.id, alice).await.unwrap();
        assert_eq!(service.comment_count(post).await.unwrap(), 0);

        let result = service.delete_comment(comment.id, alice).await;
        assert!(matches!(
            result,
            Err(EngagementServiceError::CommentNotFound)
        ));
    }

    #[tokio::test]
    async fn test_delete_comment_by_non_author_fails() {
        let service = setup_test_service().await;
        let alice = create_test_user(&service, "alice").await;
        let bob = create_test_user(&service, "bob").await;
        let post = create_test_post(&service, bob).await;

        let comment = service
            .add_comment(alice, post, "mine".to_string())
            .await
            .unwrap();

        let result = service.delete_comment(comment.id, bob).await;
        assert!(matches!(result, Err(EngagementServiceError::Unauthorized)));

        assert_eq!(
            service.comment_count(post).await.unwrap(),
            1,
            "Comment should survive"
        );
    }
}
