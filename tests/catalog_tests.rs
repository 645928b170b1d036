//! End-to-end tests over a small real-world-shaped catalog
//!
//! The fixture mixes canonical names with legacy aliases and carries a known
//! set of data-quality problems.

use chrono::{TimeZone, Utc};
use serde_json::Value;

use tablet_catalog::config::ImportConfig;
use tablet_catalog::export::{export_catalog, ExportOptions};
use tablet_catalog::import::parse_catalog;
use tablet_catalog::{
    audit, filter, sort, CatalogStore, Category, Enricher, ExportDigest, Field, Filter, RevertOutcome, Severity,
    SortCriterion, TabletRecord,
};

fn fixture() -> Vec<Value> {
    let document: Value = serde_json::from_str(include_str!("fixtures/tablets.json")).unwrap();
    parse_catalog(&document, &ImportConfig::default()).unwrap()
}

fn records() -> Vec<TabletRecord> {
    let now = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
    Enricher::at(now).enrich(&fixture())
}

fn ids(records: &[&TabletRecord]) -> Vec<String> {
    records.iter().map(|r| r.id().to_string()).collect()
}

fn by_id<'a>(records: &'a [TabletRecord], id: &str) -> &'a TabletRecord {
    records.iter().find(|r| r.id() == id).unwrap()
}

// =============================================================================
// Normalization & Enrichment
// =============================================================================

#[test]
fn test_aliases_resolve_to_canonical_fields() {
    let records = records();
    let deco = by_id(&records, "xpp-1");

    assert_eq!(deco.brand(), Some("XP-Pen"));
    assert_eq!(deco.model_id(), Some("PTH-660"));
    assert_eq!(deco.model_name(), Some("Deco Pro Medium"));
    assert_eq!(deco.model_type(), Some("pen tablet"));
    assert_eq!(deco.get(Field::ModelLaunchYear), Some("2019"));
    assert_eq!(deco.get(Field::DigitizerDimensions), Some("279 x 157"));
    assert_eq!(by_id(&records, "hui-1").brand(), Some("Huion"));
}

#[test]
fn test_identity_defaults() {
    let records = records();
    let gaomon = by_id(&records, "gao-1");
    assert_eq!(gaomon.model_name(), Some("Unknown"));
    assert_eq!(gaomon.model_type(), Some("Unknown"));
    assert_eq!(gaomon.model_id(), None);
    assert_eq!(gaomon.get(Field::ModelLaunchYear), None);
    assert_eq!(gaomon.get(Field::ModelAge), None);
}

#[test]
fn test_derived_fields() {
    let records = records();

    let intuos = by_id(&records, "wac-1");
    assert_eq!(intuos.get(Field::DigitizerDiagonal), Some("268.48"));
    assert_eq!(intuos.get(Field::DigitizerArea), Some("33152.00"));
    assert_eq!(intuos.get(Field::DigitizerAspectRatio), Some("3:2"));
    assert_eq!(intuos.get(Field::ModelAge), Some("7"));
    assert_eq!(intuos.get(Field::DisplayPixelDensity), None);

    let cintiq = by_id(&records, "wac-2");
    assert_eq!(cintiq.get(Field::DisplayPixelDensity), Some("141"));
    assert_eq!(cintiq.get(Field::DigitizerAspectRatio), Some("16:9"));

    let kamvas = by_id(&records, "hui-1");
    assert_eq!(kamvas.get(Field::DisplayPixelDensity), Some("102"));
}

#[test]
fn test_enrichment_is_idempotent() {
    let now = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
    let enricher = Enricher::at(now);
    for record in records() {
        assert_eq!(enricher.refresh(record.clone()), record);
    }
}

// =============================================================================
// Queries
// =============================================================================

#[test]
fn test_free_text_search() {
    let records = records();
    assert_eq!(ids(&filter(&records, "Wacom Pro", &[])), vec!["wac-1"]);
    assert_eq!(ids(&filter(&records, "\"kamvas pro\"", &[])), vec!["hui-1"]);
    assert_eq!(ids(&filter(&records, "pth-660", &[])), vec!["wac-1", "xpp-1"]);
    assert_eq!(filter(&records, "", &[]).len(), records.len());
}

#[test]
fn test_field_conditions() {
    let records = records();

    let recent: Filter = "ModelLaunchYear:gte:2018".parse().unwrap();
    assert_eq!(ids(&filter(&records, "", &[recent])), vec!["wac-2", "hui-1", "xpp-1"]);

    let window: Filter = "LaunchYear:range:2018:2017".parse().unwrap();
    assert_eq!(ids(&filter(&records, "", &[window])), vec!["wac-1", "wac-2"]);

    let tablets: Filter = "ModelType:equals:PEN TABLET".parse().unwrap();
    let wacom: Filter = "Brand:begins_with:wac".parse().unwrap();
    assert_eq!(ids(&filter(&records, "", &[tablets, wacom])), vec!["wac-1"]);

    let heavy: Filter = "PhysicalWeight:gt:1000".parse().unwrap();
    assert_eq!(ids(&filter(&records, "", &[heavy])), vec!["wac-2"]);
}

#[test]
fn test_filter_then_sort() {
    let records = records();
    let criteria: Vec<SortCriterion> = vec!["ModelLaunchYear:desc".parse().unwrap()];
    assert_eq!(
        ids(&sort(&records, &criteria)),
        vec!["hui-1", "xpp-1", "wac-2", "wac-1", "gao-1"]
    );

    let pen_displays = filter(&records, "", &["ModelType:equals:Pen Display".parse::<Filter>().unwrap()]);
    let criteria = vec![SortCriterion::asc("Brand"), SortCriterion::desc("DigitizerDiagonal")];
    assert_eq!(ids(&sort(pen_displays, &criteria)), vec!["hui-1", "wac-2"]);
}

// =============================================================================
// Audit
// =============================================================================

#[test]
fn test_audit_report() {
    let records = records();
    let report = audit(&records);

    assert_eq!(report.stats.total, 8);
    assert_eq!(report.stats.critical, 5);
    assert_eq!(report.stats.warning, 3);
    assert_eq!(report.stats.by_category[&Category::DuplicateId], 2);
    assert_eq!(report.stats.by_category[&Category::MissingField], 3);

    let summary: Vec<(Severity, Category, &str)> = report
        .warnings
        .iter()
        .map(|w| (w.severity, w.category, w.record_id.as_str()))
        .collect();
    assert_eq!(
        summary,
        vec![
            (Severity::Critical, Category::MissingField, "gao-1"),
            (Severity::Critical, Category::MissingField, "gao-1"),
            (Severity::Critical, Category::MissingField, "gao-1"),
            (Severity::Critical, Category::DuplicateId, "wac-1"),
            (Severity::Critical, Category::DuplicateId, "xpp-1"),
            (Severity::Warning, Category::Whitespace, "hui-1"),
            (Severity::Warning, Category::InvalidFormat, "hui-1"),
            (Severity::Warning, Category::SchemaMismatch, "xpp-1"),
        ]
    );
}

// =============================================================================
// Store & Change Tracking
// =============================================================================

#[test]
fn test_editing_session() {
    let mut store = CatalogStore::from_inputs(&fixture());
    assert!(store.changes().is_empty());

    // A whitespace-only fix is not a content change
    let mut kamvas = store.get("hui-1").unwrap().clone();
    kamvas.set(Field::DisplayPanelTech, "IPS");
    kamvas.set(Field::DisplayRefreshRate, "60");
    store.update(kamvas).unwrap();

    let added = store.add(&serde_json::json!({ "Brand": "Wacom", "ModelId": "DTH-167", "ModelName": "Cintiq Pro 16" }));
    store.remove("gao-1").unwrap();

    let changes = store.changes();
    assert_eq!(changes.added.len(), 1);
    assert_eq!(changes.added[0].id(), added);
    assert_eq!(changes.modified.len(), 1);
    let fields: Vec<Field> = changes.modified[0].changes.iter().map(|c| c.field).collect();
    assert_eq!(fields, vec![Field::DisplayRefreshRate]);
    assert_eq!(store.get("hui-1").unwrap().get(Field::DisplayPanelTech), Some("IPS"));
    assert_eq!(changes.removed.len(), 1);
    assert_eq!(changes.removed[0].id(), "gao-1");

    assert_eq!(store.revert(&added).unwrap(), RevertOutcome::Removed);
    assert_eq!(store.revert("hui-1").unwrap(), RevertOutcome::Restored);
    assert_eq!(store.revert("gao-1").unwrap(), RevertOutcome::Restored);
    assert!(store.changes().is_empty());
}

#[test]
fn test_comparison_flags() {
    let mut store = CatalogStore::from_inputs(&fixture());
    store.toggle_flag("xpp-1");
    store.toggle_flag("wac-1");
    let flagged: Vec<&str> = store.flagged_records().iter().map(|r| r.id()).collect();
    assert_eq!(flagged, vec!["wac-1", "xpp-1"]);

    store.remove("wac-1").unwrap();
    assert!(!store.is_flagged("wac-1"));
    assert_eq!(store.flagged().len(), 1);
}

// =============================================================================
// Export
// =============================================================================

#[test]
fn test_export_order_and_shape() {
    let records = records();
    let text = export_catalog(&records, &ExportOptions::default()).unwrap();
    let document: Value = serde_json::from_str(&text).unwrap();

    let exported = document["DrawingTablets"].as_array().unwrap();
    let order: Vec<&str> = exported.iter().map(|r| r["_id"].as_str().unwrap()).collect();
    assert_eq!(order, vec!["gao-1", "hui-1", "wac-2", "wac-1", "xpp-1"]);

    let intuos = &exported[3];
    assert_eq!(intuos["ModelBrand"], "Wacom");
    assert_eq!(intuos["DigitizerDimensions"], "224 x 148");
    assert!(intuos.get("DigitizerAspectRatio").is_none());
    assert!(intuos.get("Brand").is_none());
}

#[test]
fn test_export_reimport_is_byte_stable() {
    let options = ExportOptions::default();
    let first = export_catalog(&records(), &options).unwrap();

    let document: Value = serde_json::from_str(&first).unwrap();
    let reimported = Enricher::new().enrich(&parse_catalog(&document, &ImportConfig::default()).unwrap());
    let second = export_catalog(&reimported, &options).unwrap();

    assert_eq!(first, second);
    assert_eq!(ExportDigest::of(&first), ExportDigest::of(&second));
}
