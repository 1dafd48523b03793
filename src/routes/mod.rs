pub mod announcements;
pub mod auth;
pub mod chat;
pub mod conversations;
pub mod health;
pub mod listings;
pub mod orders;
pub mod purchase;
