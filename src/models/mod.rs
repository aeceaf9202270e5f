pub mod chat;
pub mod validation;
