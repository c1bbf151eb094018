//! Catalog entity types.

use crate::error::GuessError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Catalog category an entity belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Region,
    Constellation,
    /// ESI calls these `solar_system`.
    #[serde(alias = "solar_system")]
    System,
    InventoryType,
}

impl Category {
    /// Every category, in refresh order.
    pub const ALL: [Category; 4] = [
        Category::Region,
        Category::Constellation,
        Category::System,
        Category::InventoryType,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Region => "region",
            Category::Constellation => "constellation",
            Category::System => "system",
            Category::InventoryType => "inventory_type",
        }
    }

    /// Name of the persisted snapshot for this category.
    pub fn snapshot_file_name(&self) -> String {
        format!(
            "{}.{}",
            self.as_str(),
            crate::config::CatalogConfig::SNAPSHOT_EXTENSION
        )
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Category {
    type Err = GuessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "region" | "regions" => Ok(Category::Region),
            "constellation" | "constellations" => Ok(Category::Constellation),
            "system" | "systems" | "solar_system" => Ok(Category::System),
            "inventory_type" | "type" | "types" | "item" | "items" => Ok(Category::InventoryType),
            _ => Err(GuessError::UnknownCategory(s.to_string())),
        }
    }
}

/// A named record from one catalog category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    pub id: i64,
    pub name: String,
    pub category: Category,
}

impl Entity {
    pub fn new(id: i64, name: impl Into<String>, category: Category) -> Self {
        Self {
            id,
            name: name.into(),
            category,
        }
    }
}

/// Anything that can hand out the entity it wraps.
///
/// Lets the published filter work on plain entities and on pipeline
/// candidates alike.
pub trait AsEntity {
    fn entity(&self) -> &Entity;
}

impl AsEntity for Entity {
    fn entity(&self) -> &Entity {
        self
    }
}

impl<T: AsEntity + ?Sized> AsEntity for &T {
    fn entity(&self) -> &Entity {
        (**self).entity()
    }
}

/// The subset of `/universe/types/{id}/` the filter cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeInfo {
    pub type_id: i64,
    pub published: bool,
}

/// The subset of `/status/` used for cache validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerStatus {
    pub server_version: String,
    #[serde(default)]
    pub players: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_roundtrip() {
        for category in Category::ALL {
            let parsed: Category = category.as_str().parse().expect("Should parse");
            assert_eq!(category, parsed);
        }
    }

    #[test]
    fn test_category_aliases() {
        assert_eq!("item".parse::<Category>().unwrap(), Category::InventoryType);
        assert_eq!("Type".parse::<Category>().unwrap(), Category::InventoryType);
        assert_eq!("solar_system".parse::<Category>().unwrap(), Category::System);
        assert!("planet".parse::<Category>().is_err());
    }

    #[test]
    fn test_entity_accepts_esi_category_names() {
        let json = r#"[{"id":30000142,"name":"Jita","category":"solar_system"}]"#;
        let entities: Vec<Entity> = serde_json::from_str(json).unwrap();
        assert_eq!(entities[0], Entity::new(30000142, "Jita", Category::System));

        let serialized = serde_json::to_string(&entities[0]).unwrap();
        assert!(serialized.contains(r#""category":"system""#));
    }

    #[test]
    fn test_snapshot_file_name() {
        assert_eq!(
            Category::InventoryType.snapshot_file_name(),
            "inventory_type.json"
        );
    }
}
