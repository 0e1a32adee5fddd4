pub mod base;
pub mod booking;
pub mod conversation;
pub mod lease;
pub mod maintenance;
pub mod notification;
pub mod property;
pub mod review;
pub mod transaction;
pub mod user;

pub use base::{BaseDao, DaoError, DaoResult};
