pub mod catalog;
pub mod clear;
pub mod config;
pub mod context;
pub mod history;
pub mod interactive;
pub mod prompts;
pub mod session;
pub mod ui;
