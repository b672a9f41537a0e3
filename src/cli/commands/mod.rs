//! CLI command implementations

pub mod activity;
pub mod company;
pub mod completions;
pub mod contact;
pub mod doc;
pub mod group;
pub mod init;
pub mod member;
pub mod project;
pub mod rfi;
pub mod spec;
pub mod status;
pub mod submittal;
pub mod task;
