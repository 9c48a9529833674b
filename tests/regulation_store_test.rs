mod common;

use common::setup_test_db;
use urbanista::adapters::sqlite::SqliteRegulationStore;
use urbanista::domain::ports::RegulationStore;

#[tokio::test]
async fn test_regime_lookup_matches_accented_and_unaccented_spellings() {
    let pool = setup_test_db().await;
    let store = SqliteRegulationStore::new(pool);

    // Stored spelling is accented; both variants must match.
    let accented = store
        .regime_by_neighborhood(&["TRÊS FIGUEIRAS".to_string(), "TRES FIGUEIRAS".to_string()])
        .await
        .expect("query failed");
    assert_eq!(accented.len(), 1);
    assert_eq!(accented[0].zone, "ZOT 08.3B");
    assert_eq!(accented[0].max_height_m, Some(60.0));
}

#[tokio::test]
async fn test_regime_by_zone_lists_all_neighborhoods() {
    let pool = setup_test_db().await;
    let store = SqliteRegulationStore::new(pool);

    let rows = store.regime_by_zone("zot 05").await.expect("query failed");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].neighborhood, "CRISTAL");
}

#[tokio::test]
async fn test_zone_membership_and_count() {
    let pool = setup_test_db().await;
    let store = SqliteRegulationStore::new(pool);

    let memberships = store
        .zones_for_neighborhood(&["PETRÓPOLIS".to_string()])
        .await
        .expect("query failed");
    assert_eq!(memberships.len(), 2);
    assert_eq!(memberships[0].zones_in_neighborhood, Some(2));

    let count = store.neighborhood_count().await.expect("count failed");
    assert_eq!(count, 3);
}

#[tokio::test]
async fn test_tallest_regime_picks_maximum_height() {
    let pool = setup_test_db().await;
    let store = SqliteRegulationStore::new(pool);

    let tallest = store
        .tallest_regime()
        .await
        .expect("query failed")
        .expect("no rows");
    assert_eq!(tallest.neighborhood, "PETRÓPOLIS");
    assert_eq!(tallest.max_height_m, Some(90.0));
}

#[tokio::test]
async fn test_risks_and_capabilities() {
    let pool = setup_test_db().await;
    let store = SqliteRegulationStore::new(pool);

    let risks = store
        .risks_for_neighborhood(&["CRISTAL".to_string()])
        .await
        .expect("query failed");
    assert_eq!(risks.len(), 1);
    assert_eq!(risks[0].risk_kind.as_deref(), Some("inundação"));

    let capabilities = store.capabilities().await.expect("query failed");
    assert!(capabilities.regime_queries);
    assert!(capabilities.risk_data);
    assert!(capabilities
        .domains
        .contains(&"regime_urbanistico".to_string()));
}

#[tokio::test]
async fn test_empty_pattern_list_returns_empty() {
    let pool = setup_test_db().await;
    let store = SqliteRegulationStore::new(pool);

    let rows = store.regime_by_neighborhood(&[]).await.expect("query failed");
    assert!(rows.is_empty());
    let risks = store.risks_for_neighborhood(&[]).await.expect("query failed");
    assert!(risks.is_empty());
}
