pub mod health;
pub mod providers;
pub mod chat;
pub mod stream;
pub mod moderate;
