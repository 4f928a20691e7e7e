use std::collections::HashSet;

use sea_orm::{DatabaseConnection, TransactionTrait};
use thiserror::Error;
use tracing::debug;

use crate::{entity::prelude::*, error, ids::UserId};

#[derive(Debug, Error)]
pub enum FollowsServiceError {
    #[error("fatal database error")]
    DbError(#[from] DbErr),

    #[error("user not found")]
    UserNotFound,

    #[error("cannot follow yourself")]
    SelfFollow,
}

/// Directed follow graph over users. Edges carry no payload; an edge either
/// exists or it does not, and the composite primary key keeps it that way.
#[derive(Clone)]
pub struct FollowsService {
    db: DatabaseConnection,
}

impl FollowsService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Create a follow edge from follower to followed.
    ///
    /// Following someone already followed is a no-op. Mutual follows are two
    /// independent edges.
    pub async fn follow(
        &self,
        follower_id: UserId,
        followed_id: UserId,
    ) -> Result<(), FollowsServiceError> {
        // Rejected before any storage access, whether or not the id exists
        if follower_id == followed_id {
            return Err(FollowsServiceError::SelfFollow);
        }

        let txn = self.db.begin().await?;

        // Verify both endpoints exist
        let follower_exists = User::find_by_id(follower_id).one(&txn).await?.is_some();
        if !follower_exists {
            return Err(FollowsServiceError::UserNotFound);
        }

        let followed_exists = User::find_by_id(followed_id).one(&txn).await?.is_some();
        if !followed_exists {
            return Err(FollowsServiceError::UserNotFound);
        }

        let already_following = Follow::find_by_id((follower_id, followed_id))
            .one(&txn)
            .await?
            .is_some();
        if already_following {
            txn.commit().await?;
            debug!(%follower_id, %followed_id, "already following, no-op");
            return Ok(());
        }

        let edge = FollowActiveModel {
            follower_id: Set(follower_id),
            followed_id: Set(followed_id),
        };

        match Follow::insert(edge).exec(&txn).await {
            Ok(_) => {
                txn.commit().await?;
                debug!(%follower_id, %followed_id, "follow edge created");
                Ok(())
            }
            // A concurrent call inserted the same edge first; the requested
            // end state holds either way.
            Err(err) if error::is_unique_violation(&err) => {
                debug!(%follower_id, %followed_id, "follow edge raced, already present");
                Ok(())
            }
            // An endpoint can vanish between the check and the write
            Err(err) if error::is_foreign_key_violation(&err) => {
                Err(FollowsServiceError::UserNotFound)
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Remove a follow edge. Removing an absent edge is a no-op.
    pub async fn unfollow(
        &self,
        follower_id: UserId,
        followed_id: UserId,
    ) -> Result<(), FollowsServiceError> {
        let result = Follow::delete_by_id((follower_id, followed_id))
            .exec(&self.db)
            .await?;

        if result.rows_affected > 0 {
            debug!(%follower_id, %followed_id, "follow edge removed");
        }

        Ok(())
    }

    /// Whether follower currently follows followed
    pub async fn is_following(
        &self,
        follower_id: UserId,
        followed_id: UserId,
    ) -> Result<bool, FollowsServiceError> {
        let edge = Follow::find_by_id((follower_id, followed_id))
            .one(&self.db)
            .await?;

        Ok(edge.is_some())
    }

    /// Everyone following the given user. Unknown ids yield an empty set.
    pub async fn followers_of(
        &self,
        user_id: UserId,
    ) -> Result<HashSet<UserId>, FollowsServiceError> {
        let edges = Follow::find()
            .filter(FollowColumn::FollowedId.eq(user_id))
            .all(&self.db)
            .await?;

        Ok(edges.into_iter().map(|edge| edge.follower_id).collect())
    }

    /// Everyone the given user follows. Unknown ids yield an empty set.
    pub async fn following_of(
        &self,
        user_id: UserId,
    ) -> Result<HashSet<UserId>, FollowsServiceError> {
        let edges = Follow::find()
            .filter(FollowColumn::FollowerId.eq(user_id))
            .all(&self.db)
            .await?;

        Ok(edges.into_iter().map(|edge| edge.followed_id).collect())
    }

    /// Number of followers the given user has
    pub async fn follower_count(&self, user_id: UserId) -> Result<u64, FollowsServiceError> {
        let count = Follow::find()
            .filter(FollowColumn::FollowedId.eq(user_id))
            .count(&self.db)
            .await?;

        Ok(count)
    }

    /// Number of users the given user follows
    pub async fn following_count(&self, user_id: UserId) -> Result<u64, FollowsServiceError> {
        let count = Follow::find()
            .filter(FollowColumn::FollowerId.eq(user_id))
            .count(&self.db)
            .await?;

        Ok(count)
    }
}
