pub mod messages;
pub mod seed;
pub mod session;
