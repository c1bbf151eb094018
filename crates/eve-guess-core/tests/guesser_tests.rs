//! Integration tests for the Guesser public interface.
//!
//! Every test runs against an in-memory universe, so nothing here touches
//! the network.

use async_trait::async_trait;
use eve_guess::{
    Category, Entity, EntityIdFetcher, GuessError, Guesser, NameResolver, Result, TypeInfo,
    TypeMetadataFetcher, VersionProbe,
};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

struct TestUniverse {
    version: Mutex<String>,
    entities: Mutex<HashMap<Category, Vec<Entity>>>,
    unpublished: HashSet<i64>,
}

impl TestUniverse {
    fn new() -> Arc<Self> {
        let mut entities = HashMap::new();
        entities.insert(
            Category::Region,
            vec![
                Entity::new(10000002, "The Forge", Category::Region),
                Entity::new(10000043, "Domain", Category::Region),
            ],
        );
        entities.insert(
            Category::Constellation,
            vec![Entity::new(20000020, "Kimotoro", Category::Constellation)],
        );
        entities.insert(
            Category::System,
            vec![
                Entity::new(30000142, "Jita", Category::System),
                Entity::new(30000144, "Perimeter", Category::System),
                Entity::new(30002187, "Amarr", Category::System),
            ],
        );
        entities.insert(
            Category::InventoryType,
            vec![
                Entity::new(12274, "Ballistic Control System I", Category::InventoryType),
                Entity::new(22291, "Ballistic Control System II", Category::InventoryType),
                Entity::new(4405, "Drone Damage Amplifier II", Category::InventoryType),
                Entity::new(34, "Tritanium", Category::InventoryType),
                Entity::new(35, "Tritanium Blueprint", Category::InventoryType),
            ],
        );

        Arc::new(Self {
            version: Mutex::new("2237000".to_string()),
            entities: Mutex::new(entities),
            unpublished: [35].into_iter().collect(),
        })
    }
}

#[async_trait]
impl VersionProbe for TestUniverse {
    async fn server_version(&self) -> Result<String> {
        Ok(self.version.lock().unwrap().clone())
    }
}

#[async_trait]
impl EntityIdFetcher for TestUniverse {
    async fn entity_ids(&self, category: Category) -> Result<Vec<i64>> {
        Ok(self.entities.lock().unwrap()[&category]
            .iter()
            .map(|e| e.id)
            .collect())
    }
}

#[async_trait]
impl NameResolver for TestUniverse {
    async fn resolve_names(&self, ids: &[i64]) -> Result<Vec<Entity>> {
        let entities = self.entities.lock().unwrap();
        Ok(ids
            .iter()
            .filter_map(|id| entities.values().flatten().find(|e| e.id == *id).cloned())
            .collect())
    }
}

#[async_trait]
impl TypeMetadataFetcher for TestUniverse {
    async fn type_info(&self, type_id: i64) -> Result<TypeInfo> {
        Ok(TypeInfo {
            type_id,
            published: !self.unpublished.contains(&type_id),
        })
    }
}

fn guesser(universe: &Arc<TestUniverse>, temp_dir: &TempDir) -> Guesser {
    Guesser::builder()
        .data_dir(temp_dir.path())
        .with_source(universe.clone())
        .with_type_metadata(universe.clone())
        .build()
        .expect("Guesser should build")
}

async fn ready_guesser(universe: &Arc<TestUniverse>, temp_dir: &TempDir) -> Guesser {
    let guesser = guesser(universe, temp_dir);
    guesser.refresh_now().await.expect("Refresh should succeed");
    guesser
}

async fn name(guesser: &Guesser, category: Category, query: &str) -> Option<String> {
    guesser
        .resolve(category, query)
        .await
        .expect("Query should be valid")
        .map(|e| e.name)
}

#[tokio::test]
async fn test_not_ready_before_first_refresh() {
    let temp_dir = TempDir::new().unwrap();
    let guesser = guesser(&TestUniverse::new(), &temp_dir);

    assert!(!guesser.is_ready());
    assert!(guesser.last_refreshed_at().is_none());
    assert!(matches!(
        guesser.resolve(Category::System, "").await,
        Err(GuessError::Validation { .. })
    ));
}

#[tokio::test]
async fn test_jita_queries() {
    let temp_dir = TempDir::new().unwrap();
    let guesser = ready_guesser(&TestUniverse::new(), &temp_dir).await;

    for query in ["jita", "JITA", "30000142", "jit"] {
        assert_eq!(
            name(&guesser, Category::System, query).await.as_deref(),
            Some("Jita"),
            "query {:?}",
            query
        );
    }
    assert_eq!(name(&guesser, Category::System, "xyzxyz").await, None);
}

#[tokio::test]
async fn test_shortcuts_and_published_filter() {
    let temp_dir = TempDir::new().unwrap();
    let guesser = ready_guesser(&TestUniverse::new(), &temp_dir).await;

    assert_eq!(
        name(&guesser, Category::InventoryType, "bcs").await.as_deref(),
        Some("Ballistic Control System I")
    );
    assert_eq!(
        name(&guesser, Category::InventoryType, "dda").await.as_deref(),
        Some("Drone Damage Amplifier II")
    );
    assert_eq!(
        name(&guesser, Category::InventoryType, "tritanium blue").await.as_deref(),
        None
    );
    assert_eq!(guesser.shortcuts().len(), 13);
}

#[tokio::test]
async fn test_query_longer_than_any_name_is_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let guesser = ready_guesser(&TestUniverse::new(), &temp_dir).await;

    let longest = guesser.longest_known_name_length();
    assert_eq!(longest, "Ballistic Control System II".chars().count());

    let result = guesser
        .resolve(Category::Region, &"a".repeat(longest + 3))
        .await;
    assert!(matches!(result, Err(GuessError::Validation { .. })));
}

#[tokio::test]
async fn test_failed_refresh_keeps_serving_old_catalog() {
    let temp_dir = TempDir::new().unwrap();
    let universe = TestUniverse::new();
    let guesser = ready_guesser(&universe, &temp_dir).await;
    assert!(temp_dir.path().join("version.txt").exists());

    *universe.version.lock().unwrap() = "2237001".to_string();
    universe
        .entities
        .lock()
        .unwrap()
        .insert(Category::Region, Vec::new());

    let result = guesser.refresh_now().await;
    assert!(matches!(result, Err(GuessError::RefreshIncomplete { .. })));
    assert!(!temp_dir.path().join("version.txt").exists());
    assert_eq!(
        name(&guesser, Category::Region, "forge").await.as_deref(),
        Some("The Forge")
    );
}

#[tokio::test]
async fn test_restart_serves_from_snapshots() {
    let temp_dir = TempDir::new().unwrap();
    let universe = TestUniverse::new();
    ready_guesser(&universe, &temp_dir).await;

    // A second process over the same data directory, with the remote gone quiet.
    universe.entities.lock().unwrap().clear();
    let restarted = guesser(&universe, &temp_dir);
    restarted.refresh_now().await.expect("Snapshots should be reused");

    assert_eq!(
        name(&restarted, Category::System, "amar").await.as_deref(),
        Some("Amarr")
    );
}

#[tokio::test]
async fn test_memo_is_dropped_with_its_bucket() {
    let temp_dir = TempDir::new().unwrap();
    let universe = TestUniverse::new();
    let guesser = ready_guesser(&universe, &temp_dir).await;
    assert_eq!(
        name(&guesser, Category::System, "peri").await.as_deref(),
        Some("Perimeter")
    );

    *universe.version.lock().unwrap() = "2237001".to_string();
    universe.entities.lock().unwrap().insert(
        Category::System,
        vec![
            Entity::new(30000142, "Jita", Category::System),
            Entity::new(30045349, "Perimeter Gate", Category::System),
            Entity::new(30002187, "Amarr", Category::System),
        ],
    );
    guesser.refresh_now().await.unwrap();

    assert_eq!(
        name(&guesser, Category::System, "peri").await.as_deref(),
        Some("Perimeter Gate")
    );
}
