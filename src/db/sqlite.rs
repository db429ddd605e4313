use crate::db::models::{Item, ItemType, NewItem};
use crate::db::schema::{SQLITE_INIT, SQLITE_RESET};
use crate::error::LostFoundError;
use serde_json::Value;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Pool, Row, Sqlite};
use std::str::FromStr;
use tracing::info;

pub type SqlitePool = Pool<Sqlite>;

#[derive(Clone)]
pub struct ItemsStorage {
    pool: SqlitePool,
}

impl ItemsStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open (creating the file if missing) and ensure the schema exists.
    pub async fn connect(database_url: &str) -> Result<Self, LostFoundError> {
        let connect_opts = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new().connect_with(connect_opts).await?;
        let storage = Self::new(pool);
        storage.init_schema().await?;
        info!(database_url = %database_url, "item storage ready");
        Ok(storage)
    }

    /// Idempotent; safe on every start.
    pub async fn init_schema(&self) -> Result<(), LostFoundError> {
        self.execute_script(SQLITE_INIT).await
    }

    /// Drop every stored item and recreate the empty table.
    pub async fn reset(&self) -> Result<(), LostFoundError> {
        self.execute_script(SQLITE_RESET).await?;
        self.execute_script(SQLITE_INIT).await?;
        info!("item storage reset");
        Ok(())
    }

    async fn execute_script(&self, script: &str) -> Result<(), LostFoundError> {
        // sqlx::query runs one statement at a time
        for stmt in script.split(';') {
            let s = stmt.trim();
            if s.is_empty() {
                continue;
            }
            sqlx::query(s).execute(&self.pool).await?;
        }
        Ok(())
    }

    /// Insert one row and return it with its assigned id.
    pub async fn insert(&self, item: NewItem) -> Result<Item, LostFoundError> {
        let attributes_json = item
            .attributes
            .as_ref()
            .map(serde_json::to_string)
            .transpose()
            .map_err(LostFoundError::InvalidAttributes)?;

        let id = sqlx::query(
            r#"INSERT INTO items (type, description, attributes, imagePath)
               VALUES (?, ?, ?, ?)"#,
        )
        .bind(item.item_type.as_str())
        .bind(&item.description)
        .bind(attributes_json)
        .bind(&item.image_path)
        .execute(&self.pool)
        .await
        .map_err(LostFoundError::StorageWrite)?
        .last_insert_rowid();

        Ok(item.into_item(id))
    }

    /// Substring match on `description` over `lost` items. An empty query matches all of them.
    pub async fn search_lost(&self, query: &str) -> Result<Vec<Item>, LostFoundError> {
        let pattern = format!("%{}%", escape_like(query));
        let rows = sqlx::query(
            r#"SELECT id, type, description, attributes, imagePath
               FROM items
               WHERE type = ? AND description LIKE ? ESCAPE '\'
               ORDER BY id"#,
        )
        .bind(ItemType::Lost.as_str())
        .bind(pattern)
        .fetch_all(&self.pool)
        .await
        .map_err(LostFoundError::StorageRead)?;

        rows.into_iter()
            .map(|row| Self::row_to_model(row).map_err(LostFoundError::StorageRead))
            .collect()
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Option<Item>, LostFoundError> {
        let row = sqlx::query(
            r#"SELECT id, type, description, attributes, imagePath
               FROM items WHERE id = ?"#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(LostFoundError::StorageRead)?;
        row.map(Self::row_to_model)
            .transpose()
            .map_err(LostFoundError::StorageRead)
    }

    fn row_to_model(row: SqliteRow) -> Result<Item, sqlx::Error> {
        let id: i64 = row.try_get("id")?;
        let type_str: String = row.try_get("type")?;
        let description: String = row.try_get("description")?;
        let attributes_json: Option<String> = row.try_get("attributes")?;
        let image_path: Option<String> = row.try_get("imagePath")?;

        let item_type = ItemType::from_str(&type_str).map_err(|e| sqlx::Error::Decode(e.into()))?;
        let attributes: Option<Value> = match attributes_json {
            Some(s) => {
                Some(serde_json::from_str(&s).map_err(|e| sqlx::Error::Decode(Box::new(e)))?)
            }
            None => None,
        };

        Ok(Item {
            id,
            item_type,
            description,
            attributes,
            image_path,
        })
    }
}

/// Escape LIKE wildcards so user input matches literally.
fn escape_like(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
