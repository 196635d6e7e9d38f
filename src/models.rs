mod filter;
mod ids;
mod knowledge_item;
mod knowledge_type;
mod tag_source;

pub use filter::{FilterState, SortOption};
pub use ids::ItemId;
pub use knowledge_item::{
    ItemUpdate, KnowledgeItem, MAX_CONTENT_LEN, MAX_TITLE_LEN, NewKnowledgeItem, ValidationError,
};
pub use knowledge_type::KnowledgeType;
pub use tag_source::TagSource;
