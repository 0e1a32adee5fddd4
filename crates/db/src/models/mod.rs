pub mod booking;
pub mod conversation;
pub mod lease;
pub mod maintenance_request;
pub mod notification;
pub mod property;
pub mod review;
pub mod transaction;
pub mod user;

pub use booking::*;
pub use conversation::*;
pub use lease::*;
pub use maintenance_request::*;
pub use notification::*;
pub use property::*;
pub use review::*;
pub use transaction::*;
pub use user::*;
