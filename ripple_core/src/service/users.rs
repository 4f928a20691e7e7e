use sea_orm::{DatabaseConnection, TransactionTrait};
use thiserror::Error;
use tracing::debug;

use crate::{entity::prelude::*, error, ids::UserId};

/// Avatar reference assigned when onboarding supplies none.
static DEFAULT_AVATAR: &str = "default.jpg";

#[derive(Debug, Error)]
pub enum UsersServiceError {
    #[error("fatal database error")]
    DbError(#[from] DbErr),

    #[error("user not found")]
    UserNotFound,

    #[error("profile not found")]
    ProfileNotFound,

    #[error("username already taken")]
    UsernameTaken,

    #[error("email already registered")]
    EmailTaken,

    #[error("unauthorized: not the profile owner")]
    Unauthorized,
}

#[derive(Clone)]
pub struct UsersService {
    db: DatabaseConnection,
}

impl UsersService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Register a new user together with their profile, in one transaction.
    ///
    /// The credential hash is stored as-is; hashing happens upstream.
    pub async fn create_user(
        &self,
        username: String,
        email: String,
        password_hash: String,
        avatar: Option<String>,
        bio: Option<String>,
        location: Option<String>,
    ) -> Result<(UserModel, ProfileModel), UsersServiceError> {
        let txn = self.db.begin().await?;

        // Check both unique columns so the caller learns which one
        // collided; the unique indexes stay the backstop for concurrent
        // registrations.
        let username_taken = User::find()
            .filter(UserColumn::Username.eq(&username))
            .one(&txn)
            .await?
            .is_some();
        if username_taken {
            return Err(UsersServiceError::UsernameTaken);
        }

        let email_taken = User::find()
            .filter(UserColumn::Email.eq(&email))
            .one(&txn)
            .await?
            .is_some();
        if email_taken {
            return Err(UsersServiceError::EmailTaken);
        }

        let user = UserActiveModel {
            id: NotSet,
            username: Set(username),
            email: Set(email),
            password_hash: Set(password_hash),
            created_at: Set(chrono::Utc::now()),
        };

        let user = match User::insert(user).exec_with_returning(&txn).await {
            Ok(user) => user,
            // Lost a registration race after the pre-checks passed
            Err(err) if error::unique_violation_on(&err, "username") => {
                return Err(UsersServiceError::UsernameTaken);
            }
            Err(err) if error::is_unique_violation(&err) => {
                return Err(UsersServiceError::EmailTaken);
            }
            Err(err) => return Err(err.into()),
        };

        let profile = ProfileActiveModel {
            id: NotSet,
            user_id: Set(user.id),
            avatar: Set(avatar.unwrap_or_else(|| DEFAULT_AVATAR.to_string())),
            bio: Set(bio),
            location: Set(location),
        };

        let profile = Profile::insert(profile).exec_with_returning(&txn).await?;

        txn.commit().await?;
        debug!(user_id = %user.id, username = %user.username, "user created");
        Ok((user, profile))
    }

    /// Get a user record by id
    pub async fn get_user(&self, user_id: UserId) -> Result<UserModel, UsersServiceError> {
        User::find_by_id(user_id)
            .one(&self.db)
            .await?
            .ok_or(UsersServiceError::UserNotFound)
    }

    /// Look a user up by username
    pub async fn get_user_by_username(
        &self,
        username: &str,
    ) -> Result<UserModel, UsersServiceError> {
        User::find()
            .filter(UserColumn::Username.eq(username))
            .one(&self.db)
            .await?
            .ok_or(UsersServiceError::UserNotFound)
    }

    /// Get the profile belonging to a user
    pub async fn get_profile(&self, user_id: UserId) -> Result<ProfileModel, UsersServiceError> {
        Profile::find()
            .filter(ProfileColumn::UserId.eq(user_id))
            .one(&self.db)
            .await?
            .ok_or(UsersServiceError::ProfileNotFound)
    }

    /// Update profile fields (only by the owning user)
    pub async fn update_profile(
        &self,
        acting_user_id: UserId,
        user_id: UserId,
        avatar: Option<String>,
        bio: Option<String>,
        location: Option<String>,
    ) -> Result<ProfileModel, UsersServiceError> {
        if acting_user_id != user_id {
            return Err(UsersServiceError::Unauthorized);
        }

        let profile = self.get_profile(user_id).await?;

        // Only update fields that were provided
        let mut profile_active: ProfileActiveModel = profile.into();

        if let Some(new_avatar) = avatar {
            profile_active.avatar = Set(new_avatar);
        }

        if let Some(new_bio) = bio {
            profile_active.bio = Set(Some(new_bio));
        }

        if let Some(new_location) = location {
            profile_active.location = Set(Some(new_location));
        }

        let updated = profile_active.update(&self.db).await?;
        Ok(updated)
    }

    /// Delete a user account
    pub async fn delete_user(&self, user_id: UserId) -> Result<(), UsersServiceError> {
        // Error on unknown ids rather than silently doing nothing
        self.get_user(user_id).await?;

        // Profile, posts (with their children, goods and comments), goods,
        // comments and follow edges in both directions all cascade.
        User::delete_by_id(user_id).exec(&self.db).await?;

        debug!(%user_id, "user deleted");
        Ok(())
    }
}
