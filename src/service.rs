use crate::{
    Database, FilterState, ItemId, ItemUpdate, KnowledgeItem, KnowledgeType, NewKnowledgeItem,
    SortOption, autotagger::TagNormalizer,
};
use anyhow::{Context, Result};
use rusqlite::{Connection, OptionalExtension, ToSql};
use time::OffsetDateTime;
use tracing::debug;

/// Service layer providing knowledge item management.
///
/// KnowledgeService owns a Database instance and provides the create, read,
/// update, delete and filtered listing operations used by the CLI.
///
/// # Examples
///
/// ```
/// use secondbrain::{Database, FilterState, KnowledgeService, NewKnowledgeItem};
///
/// # fn main() -> anyhow::Result<()> {
/// let service = KnowledgeService::new(Database::in_memory()?);
///
/// service.create_item(NewKnowledgeItem::new("Rust traits", "Shared behavior").tags(["rust"]))?;
///
/// let items = service.list_items(&FilterState::default().tags(["rust"]))?;
/// assert_eq!(items.len(), 1);
/// # Ok(())
/// # }
/// ```
pub struct KnowledgeService {
    db: Database,
}

impl KnowledgeService {
    /// Creates a new KnowledgeService with the given database.
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Returns a reference to the underlying database.
    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Creates a new item.
    ///
    /// Validates the input, then inserts the item and its tags in one
    /// transaction. `created_at` and `updated_at` are both set to now.
    ///
    /// # Errors
    ///
    /// Returns a [`crate::ValidationError`] (inside `anyhow::Error`) for bad
    /// input, or a database error.
    ///
    /// # Examples
    ///
    /// ```
    /// use secondbrain::{Database, KnowledgeService, KnowledgeType, NewKnowledgeItem};
    ///
    /// # fn main() -> anyhow::Result<()> {
    /// let service = KnowledgeService::new(Database::in_memory()?);
    ///
    /// let item = service.create_item(
    ///     NewKnowledgeItem::new("Tokio", "An async runtime").kind(KnowledgeType::Link),
    /// )?;
    /// assert!(item.id.get() > 0);
    /// assert_eq!(item.kind, KnowledgeType::Link);
    /// # Ok(())
    /// # }
    /// ```
    pub fn create_item(&self, new_item: NewKnowledgeItem) -> Result<KnowledgeItem> {
        new_item.validate()?;

        let conn = self.db.connection();
        let now = now_millis();
        let tags = TagNormalizer::normalize_tags(&new_item.tags);

        // Use a transaction for atomicity
        conn.execute("BEGIN TRANSACTION", [])?;

        let result: Result<i64> = (|| {
            conn.execute(
                "INSERT INTO knowledge_items
                     (title, content, type, source_url, summary, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)",
                (
                    &new_item.title,
                    &new_item.content,
                    new_item.kind.as_str(),
                    &new_item.source_url,
                    &new_item.summary,
                    now,
                ),
            )?;

            let id = conn.last_insert_rowid();
            insert_tags(conn, id, &tags)?;
            Ok(id)
        })();

        let id = match result {
            Ok(id) => {
                conn.execute("COMMIT", [])?;
                id
            }
            Err(e) => {
                conn.execute("ROLLBACK", []).ok();
                return Err(e);
            }
        };

        debug!(id, tags = tags.len(), "Created knowledge item");

        let timestamp = from_millis(now)?;
        Ok(KnowledgeItem {
            id: ItemId::new(id),
            title: new_item.title,
            content: new_item.content,
            kind: new_item.kind,
            tags,
            source_url: new_item.source_url,
            summary: new_item.summary,
            created_at: timestamp,
            updated_at: timestamp,
        })
    }

    /// Retrieves an item by its ID, or `None` if it does not exist.
    pub fn get_item(&self, id: ItemId) -> Result<Option<KnowledgeItem>> {
        let conn = self.db.connection();

        let row = conn
            .query_row(
                "SELECT id, title, content, type, source_url, summary, created_at, updated_at
                 FROM knowledge_items WHERE id = ?1",
                [id.get()],
                |row| {
                    Ok(ItemRow {
                        id: row.get(0)?,
                        title: row.get(1)?,
                        content: row.get(2)?,
                        kind: row.get(3)?,
                        source_url: row.get(4)?,
                        summary: row.get(5)?,
                        created_at: row.get(6)?,
                        updated_at: row.get(7)?,
                    })
                },
            )
            .optional()?;

        match row {
            Some(row) => {
                let tags = load_tags(conn, row.id)?;
                Ok(Some(row.into_item(tags)?))
            }
            None => Ok(None),
        }
    }

    /// Applies a partial update and bumps `updated_at`.
    ///
    /// Tags are replaced only when the update carries them. Returns `None`
    /// if the item does not exist.
    ///
    /// # Errors
    ///
    /// Returns a [`crate::ValidationError`] if the merged item is invalid.
    pub fn update_item(&self, id: ItemId, update: ItemUpdate) -> Result<Option<KnowledgeItem>> {
        let Some(current) = self.get_item(id)? else {
            return Ok(None);
        };

        let mut updated = update.apply_to(&current);
        updated.validate()?;
        let now = now_millis();
        updated.updated_at = from_millis(now)?;

        let conn = self.db.connection();
        conn.execute("BEGIN TRANSACTION", [])?;

        let result: Result<()> = (|| {
            conn.execute(
                "UPDATE knowledge_items
                 SET title = ?1, content = ?2, type = ?3, source_url = ?4, summary = ?5,
                     updated_at = ?6
                 WHERE id = ?7",
                (
                    &updated.title,
                    &updated.content,
                    updated.kind.as_str(),
                    &updated.source_url,
                    &updated.summary,
                    now,
                    id.get(),
                ),
            )?;

            if update.tags.is_some() {
                conn.execute("DELETE FROM item_tags WHERE item_id = ?1", [id.get()])?;
                insert_tags(conn, id.get(), &updated.tags)?;
            }
            Ok(())
        })();

        match result {
            Ok(()) => {
                conn.execute("COMMIT", [])?;
                debug!(id = id.get(), "Updated knowledge item");
                Ok(Some(updated))
            }
            Err(e) => {
                conn.execute("ROLLBACK", []).ok();
                Err(e)
            }
        }
    }

    /// Stores a summary for an item. Returns `false` if the item does not exist.
    pub fn set_summary(&self, id: ItemId, summary: &str) -> Result<bool> {
        let update = ItemUpdate {
            summary: Some(summary.to_string()),
            ..Default::default()
        };
        Ok(self.update_item(id, update)?.is_some())
    }

    /// Deletes an item and its tags.
    ///
    /// Returns `true` if an item was removed.
    ///
    /// # Examples
    ///
    /// ```
    /// use secondbrain::{Database, KnowledgeService, NewKnowledgeItem};
    ///
    /// # fn main() -> anyhow::Result<()> {
    /// let service = KnowledgeService::new(Database::in_memory()?);
    /// let item = service.create_item(NewKnowledgeItem::new("Temp", "To be deleted"))?;
    ///
    /// assert!(service.delete_item(item.id)?);
    /// assert!(!service.delete_item(item.id)?);
    /// assert_eq!(service.get_item(item.id)?, None);
    /// # Ok(())
    /// # }
    /// ```
    pub fn delete_item(&self, id: ItemId) -> Result<bool> {
        let conn = self.db.connection();

        let deleted = conn.execute("DELETE FROM knowledge_items WHERE id = ?1", [id.get()])?;

        Ok(deleted > 0)
    }

    /// Lists items matching every active filter, in the requested order.
    ///
    /// - `kind`: exact type match.
    /// - `tags`: the item must carry all of them.
    /// - `search`: case-insensitive substring of the title or the content.
    ///   `%` and `_` in the term match literally.
    ///
    /// Ties in the sort key are broken by id so output is deterministic.
    pub fn list_items(&self, filter: &FilterState) -> Result<Vec<KnowledgeItem>> {
        let conn = self.db.connection();

        let mut clauses: Vec<String> = Vec::new();
        let mut params: Vec<Box<dyn ToSql>> = Vec::new();

        if let Some(kind) = filter.kind {
            params.push(Box::new(kind.as_str()));
            clauses.push(format!("type = ?{}", params.len()));
        }

        let tags = TagNormalizer::normalize_tags(&filter.tags);
        if !tags.is_empty() {
            let mut placeholders = Vec::with_capacity(tags.len());
            for tag in &tags {
                params.push(Box::new(tag.clone()));
                placeholders.push(format!("?{}", params.len()));
            }
            params.push(Box::new(tags.len() as i64));
            // Items must have ALL filter tags
            clauses.push(format!(
                "(SELECT COUNT(*) FROM item_tags t
                  WHERE t.item_id = knowledge_items.id AND t.tag IN ({})) = ?{}",
                placeholders.join(", "),
                params.len()
            ));
        }

        if let Some(term) = filter.search_term() {
            params.push(Box::new(format!("%{}%", escape_like(term))));
            let n = params.len();
            clauses.push(format!(
                "(title LIKE ?{n} ESCAPE '\\' OR content LIKE ?{n} ESCAPE '\\')"
            ));
        }

        let where_clause = if clauses.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", clauses.join(" AND "))
        };
        let order_clause = match filter.sort {
            SortOption::Recent => "created_at DESC, id DESC",
            SortOption::Oldest => "created_at ASC, id ASC",
            SortOption::Title => "title COLLATE NOCASE ASC, id ASC",
        };
        let query = format!(
            "SELECT id FROM knowledge_items{} ORDER BY {}",
            where_clause, order_clause
        );

        let mut stmt = conn.prepare(&query)?;
        let rows = stmt.query_map(
            rusqlite::params_from_iter(params.iter().map(|p| p.as_ref())),
            |row| row.get::<_, i64>(0),
        )?;

        let mut ids = Vec::new();
        for row_result in rows {
            ids.push(row_result?);
        }

        debug!(matches = ids.len(), sort = %filter.sort, "Listed knowledge items");

        // Now load each item with its tags
        let mut items = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(item) = self.get_item(ItemId::new(id))? {
                items.push(item);
            }
        }

        Ok(items)
    }

    /// Returns every tag in use, deduplicated and sorted ascending.
    pub fn all_tags(&self) -> Result<Vec<String>> {
        let conn = self.db.connection();

        let mut stmt = conn.prepare("SELECT DISTINCT tag FROM item_tags ORDER BY tag ASC")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;

        let mut tags = Vec::new();
        for row_result in rows {
            tags.push(row_result?);
        }

        Ok(tags)
    }
}

/// Raw `knowledge_items` row before tags are attached.
struct ItemRow {
    id: i64,
    title: String,
    content: String,
    kind: String,
    source_url: Option<String>,
    summary: Option<String>,
    created_at: i64,
    updated_at: i64,
}

impl ItemRow {
    fn into_item(self, tags: Vec<String>) -> Result<KnowledgeItem> {
        let kind: KnowledgeType = self
            .kind
            .parse()
            .with_context(|| format!("Item {} has a corrupt type column", self.id))?;

        Ok(KnowledgeItem {
            id: ItemId::new(self.id),
            title: self.title,
            content: self.content,
            kind,
            tags,
            source_url: self.source_url,
            summary: self.summary,
            created_at: from_millis(self.created_at)?,
            updated_at: from_millis(self.updated_at)?,
        })
    }
}

fn insert_tags(conn: &Connection, item_id: i64, tags: &[String]) -> Result<()> {
    let mut stmt =
        conn.prepare("INSERT INTO item_tags (item_id, tag, position) VALUES (?1, ?2, ?3)")?;
    for (position, tag) in tags.iter().enumerate() {
        stmt.execute((item_id, tag, position as i64))?;
    }
    Ok(())
}

fn load_tags(conn: &Connection, item_id: i64) -> Result<Vec<String>> {
    let mut stmt =
        conn.prepare("SELECT tag FROM item_tags WHERE item_id = ?1 ORDER BY position")?;
    let rows = stmt.query_map([item_id], |row| row.get::<_, String>(0))?;

    let mut tags = Vec::new();
    for row_result in rows {
        tags.push(row_result?);
    }
    Ok(tags)
}

/// Escapes LIKE wildcards so the term matches literally under `ESCAPE '\'`.
fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn now_millis() -> i64 {
    (OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as i64
}

fn from_millis(millis: i64) -> Result<OffsetDateTime> {
    OffsetDateTime::from_unix_timestamp_nanos(i128::from(millis) * 1_000_000)
        .with_context(|| format!("Invalid timestamp {}", millis))
}
