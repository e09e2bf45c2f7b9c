pub mod action;
pub mod canonical;
pub mod config;
pub mod document;
pub mod observability;
