use sea_orm::DatabaseConnection;
use thiserror::Error;

use crate::{entity::prelude::*, ids::UserId};

#[derive(Debug, Error)]
pub enum FeedServiceError {
    #[error("fatal database error")]
    DbError(#[from] DbErr),

    #[error("user not found")]
    UserNotFound,
}

/// Read-side view over the follow graph and the post store. The feed is
/// recomputed on every call and never persisted.
#[derive(Clone)]
pub struct FeedService {
    db: DatabaseConnection,
}

impl FeedService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Posts authored by the users the given user follows, newest first.
    ///
    /// Timestamp ties are broken by the higher post id, so two posts written
    /// in the same instant still order by insertion. The requesting user's
    /// own posts never appear: a self edge cannot exist in the follow graph.
    pub async fn followed_posts(
        &self,
        user_id: UserId,
        limit: u64,
        offset: u64,
    ) -> Result<Vec<PostModel>, FeedServiceError> {
        let user_exists = User::find_by_id(user_id).one(&self.db).await?.is_some();
        if !user_exists {
            return Err(FeedServiceError::UserNotFound);
        }

        let following: Vec<UserId> = Follow::find()
            .filter(FollowColumn::FollowerId.eq(user_id))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|edge| edge.followed_id)
            .collect();

        // Following no one means an empty feed; skip the posts query entirely
        if following.is_empty() {
            return Ok(Vec::new());
        }

        let posts = Post::find()
            .filter(PostColumn::AuthorId.is_in(following))
            .order_by_desc(PostColumn::CreatedAt)
            .order_by_desc(PostColumn::Id)
            .limit(limit)
            .offset(offset)
            .all(&self.db)
            .await?;

        Ok(posts)
    }
}
