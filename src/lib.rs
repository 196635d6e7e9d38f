pub mod ai;
pub mod autotagger;
pub mod config;
pub mod db;
pub mod models;
pub mod service;
pub mod utils;

pub use db::Database;
pub use models::{
    FilterState, ItemId, ItemUpdate, KnowledgeItem, KnowledgeType, NewKnowledgeItem, SortOption,
    TagSource, ValidationError,
};
pub use service::KnowledgeService;
