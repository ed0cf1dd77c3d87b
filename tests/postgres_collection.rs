//! Runs against a live PostgreSQL. `DATABASE_URL=postgres://... cargo test -- --ignored`

use resource_hub::config::StoreConfig;
use resource_hub::{store, Collection, Document, PgCollection, ID_FIELD};
use serde_json::{json, Value};

fn doc(v: Value) -> Document {
    v.as_object().cloned().unwrap()
}

async fn fresh_collection(resource: &str) -> PgCollection {
    let config = StoreConfig {
        database_url: std::env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
        schema: "hub_test".into(),
        ..StoreConfig::default()
    };
    let pool = store::connect(&config).await.expect("connect");
    sqlx::query(&format!("DROP TABLE IF EXISTS hub_test.{}", resource))
        .execute(&pool)
        .await
        .expect("drop");
    PgCollection::open(pool, &config.schema, resource).await.expect("open")
}

#[tokio::test]
#[ignore]
async fn crud_against_postgres() {
    let games = fresh_collection("games_crud").await;

    let created = games
        .insert(doc(json!({ "name": "Catan", "genre": "strategy" })))
        .await
        .unwrap();
    let id = created[ID_FIELD].as_str().unwrap().to_string();
    let second = games.insert(doc(json!({ "name": "Azul" }))).await.unwrap();

    assert_eq!(games.find_all().await.unwrap(), vec![created.clone(), second.clone()]);
    assert_eq!(games.find_one(&id).await.unwrap(), Some(created));

    let updated = games
        .replace(&id, doc(json!({ "name": "Catan", "genre": "family" })))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated["genre"], "family");
    assert_eq!(updated[ID_FIELD], id.as_str());

    assert_eq!(games.remove(&id).await.unwrap(), Some(updated));
    assert_eq!(games.find_one(&id).await.unwrap(), None);
    assert_eq!(games.find_all().await.unwrap(), vec![second]);
    games.ping().await.unwrap();
}

#[tokio::test]
#[ignore]
async fn seeds_only_empty_tables() {
    let games = fresh_collection("games_seed").await;
    let seed = vec![doc(json!({ "name": "Chess" })), doc(json!({ "name": "Go" }))];

    assert_eq!(games.seed_if_empty(seed.clone()).await.unwrap(), 2);
    assert_eq!(games.seed_if_empty(seed).await.unwrap(), 0);
    assert_eq!(games.find_all().await.unwrap().len(), 2);
}
