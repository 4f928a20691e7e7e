pub mod engagement;
pub mod feed;
pub mod follows;
pub mod posts;
pub mod users;
