//! Tablet Catalog
//!
//! Normalization, enrichment and query engine for curated catalogs of drawing
//! tablets (pen tablets and pen displays).
//!
//! ## Features
//!
//! - **Lenient Normalization**: Legacy and aliased field names map onto one canonical record
//! - **Derived Fields**: Active-area diagonal, area, aspect ratio, pixel density and model age
//! - **Query Engines**: Free-text search, typed filters and stable multi-key sorting
//! - **Change Tracking**: Added, modified and removed records against a load-time baseline
//! - **Data-Quality Audit**: Missing identity fields, duplicate ids, stray whitespace and more
//! - **Canonical Export**: Byte-stable JSON with a SHA-256 digest
//!
//! ## Pipeline
//!
//! ```text
//! JSON document
//!   └─ import::parse_catalog      (gate: array present, brand-like key)
//!        └─ normalize::normalize  (aliases, defaults, identity)
//!             └─ enrich::Enricher (calculated fields)
//!                  └─ store::CatalogStore ── filter / sort / diff / audit
//!                                         └─ export::export_catalog
//! ```

pub mod audit;
pub mod checksum;
pub mod config;
pub mod diff;
pub mod enrich;
pub mod error;
pub mod export;
pub mod filter;
pub mod geometry;
pub mod import;
pub mod normalize;
pub mod record;
pub mod schema;
pub mod sort;
pub mod store;
pub mod text;
pub mod units;

pub use audit::{audit, AuditReport, AuditStats, AuditWarning, Auditor, Category, Severity};
pub use checksum::ExportDigest;
pub use config::CatalogConfig;
pub use diff::{diff, ChangeSet, FieldChange};
pub use enrich::{enrich, enrich_one, Enricher};
pub use error::{CatalogError, Result};
pub use export::{export_catalog, project, ExportOptions};
pub use filter::{filter, Condition, Filter};
pub use normalize::normalize;
pub use record::TabletRecord;
pub use schema::{registry, Field, FieldDescriptor, ValueKind};
pub use sort::{sort, SortCriterion, SortDirection};
pub use store::{CatalogStore, RevertOutcome};
