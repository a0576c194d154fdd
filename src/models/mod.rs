pub mod health;
pub mod message;
pub mod retry;
pub mod sms;
pub mod status;
