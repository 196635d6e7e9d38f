/// Complete database schema for the knowledge base.
///
/// Uses CREATE TABLE/INDEX IF NOT EXISTS for idempotent execution.
/// Timestamps are unix milliseconds.
pub const INITIAL_SCHEMA: &str = r#"
-- Knowledge items: notes, links and insights
CREATE TABLE IF NOT EXISTS knowledge_items (
    id INTEGER PRIMARY KEY,
    title TEXT NOT NULL,
    content TEXT NOT NULL,
    type TEXT NOT NULL DEFAULT 'note' CHECK (type IN ('note', 'link', 'insight')),
    source_url TEXT,
    summary TEXT,
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL
);

-- Item tags, kept in the order the user gave them
CREATE TABLE IF NOT EXISTS item_tags (
    item_id INTEGER NOT NULL,
    tag TEXT NOT NULL,
    position INTEGER NOT NULL,
    PRIMARY KEY (item_id, tag),
    FOREIGN KEY (item_id) REFERENCES knowledge_items(id) ON DELETE CASCADE
);

-- Index for sorting items by creation date
CREATE INDEX IF NOT EXISTS idx_items_created ON knowledge_items(created_at);

-- Index for title sort
CREATE INDEX IF NOT EXISTS idx_items_title ON knowledge_items(title COLLATE NOCASE);

-- Index for tag filters and the distinct tag list
CREATE INDEX IF NOT EXISTS idx_item_tags_tag ON item_tags(tag);
"#;
