use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Item tag. Only `Lost` is written today; `Found` is reserved in the schema.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ItemType {
    Lost,
    Found,
}

impl ItemType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemType::Lost => "lost",
            ItemType::Found => "found",
        }
    }
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ItemType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "lost" => Ok(ItemType::Lost),
            "found" => Ok(ItemType::Found),
            other => Err(format!("unknown item type `{other}`")),
        }
    }
}

/// A stored item as returned by search.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: i64,
    #[serde(rename = "type")]
    pub item_type: ItemType,
    pub description: String,
    pub attributes: Option<Value>,
    pub image_path: Option<String>,
}

/// Insert payload; `id` is assigned by the database.
#[derive(Debug, Clone, PartialEq)]
pub struct NewItem {
    pub item_type: ItemType,
    pub description: String,
    pub attributes: Option<Value>,
    pub image_path: Option<String>,
}

impl NewItem {
    pub fn lost(description: String, attributes: Option<Value>, image_path: Option<String>) -> Self {
        Self {
            item_type: ItemType::Lost,
            description,
            attributes,
            image_path,
        }
    }

    pub fn into_item(self, id: i64) -> Item {
        Item {
            id,
            item_type: self.item_type,
            description: self.description,
            attributes: self.attributes,
            image_path: self.image_path,
        }
    }
}
