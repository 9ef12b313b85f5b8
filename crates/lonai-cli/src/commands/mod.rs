pub mod batch;
pub mod chat;
pub mod config;
pub mod history;
pub mod research;
