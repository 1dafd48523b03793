pub mod auth;

pub use auth::AuthenticatedStudent;
