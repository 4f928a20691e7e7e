pub mod entity;
pub mod ids;
pub mod models;
use tokio::sync::OnceCell;

use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::service::engagement::EngagementService;
use crate::service::feed::FeedService;
use crate::service::follows::FollowsService;
use crate::service::posts::PostsService;
use crate::service::users::UsersService;

pub mod service;

pub mod error;

pub mod config;

#[cfg(test)]
mod test_utils;

static RIPPLE_CORE: OnceCell<Arc<RippleCore>> = OnceCell::const_new();

pub async fn core() -> Arc<RippleCore> {
    RIPPLE_CORE
        .get_or_init(|| async move { Arc::new(RippleCore::start().await.expect("failed to init")) })
        .await
        .clone()
}

/// Main runtime handle for Ripple.
pub struct RippleCore {
    pub config: config::RippleConfig,

    /// Live connection shared by every service.
    pub db: DatabaseConnection,

    /// Domain services, all backed by the same database.
    pub users: UsersService,
    pub follows: FollowsService,
    pub posts: PostsService,
    pub feed: FeedService,
    pub engagement: EngagementService,
}

impl RippleCore {
    pub async fn start() -> Result<Self, Box<dyn std::error::Error>> {
        let config = config::get_or_init().await?;
        tracing::info!(?config, "starting ripple core");

        // DB + migrations
        let db = models::open_or_create_db(&config).await;
        models::migrate_up(db.clone()).await;

        let users = UsersService::new(db.clone());
        let follows = FollowsService::new(db.clone());
        let posts = PostsService::new(db.clone());
        let feed = FeedService::new(db.clone());
        let engagement = EngagementService::new(db.clone());

        Ok(Self {
            config,
            db,
            users,
            follows,
            posts,
            feed,
            engagement,
        })
    }

    pub async fn shutdown(self) -> Result<(), Box<dyn std::error::Error>> {
        // Close the shared pool; service clones become inert
        self.db.close().await?;
        Ok(())
    }
}

pub mod prelude {
    pub use super::ids;
    pub use super::entity;
    pub use super::models;

    pub use super::service;

    pub use super::error;

    pub use super::config;
}
