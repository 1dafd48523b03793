pub mod announcement;
pub mod chat;
pub mod conversation;
pub mod listing;
pub mod order;
pub mod student;

pub use announcement::Announcement;
pub use chat::{ChatMessage, ChatRoom};
pub use conversation::{Conversation, Message};
pub use listing::Listing;
pub use order::{Order, OrderStatus, PaymentMethod};
pub use student::{Student, StudentProfile};
