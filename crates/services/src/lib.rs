pub mod auth;
pub mod dao;
pub mod references;
pub mod upstream;

pub use auth::{AuthService, Principal};
pub use dao::*;
pub use references::ReferenceIndex;
pub use upstream::{GoogleClient, PredictionClient, UpstreamError};
