//! Shared types, error model, and configuration for StratBuilder.
//!
//! This crate is the foundation depended on by all other StratBuilder crates.
//! It provides:
//! - [`StratBuilderError`] — the unified error type
//! - The strategy data model ([`FrameworkOutput`] and everything inside it)
//! - Configuration ([`AppConfig`], [`BrandConfig`], config loading)
//! - The validated stage defaults catalog ([`StageDefaults`])

pub mod config;
pub mod defaults;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, BrandConfig, DefaultsConfig, config_dir, config_file_path, init_config,
    load_brand_config, load_config, load_config_from, sanitize_entity,
};
pub use defaults::{
    ABBREVIATIONS, FanoutPattern, KpiTemplate, PersonaTemplate, SUFFIX_FAMILIES, StageDefaults,
    entity_types_for_goal, expected_topics_for_goal, fanout_patterns, kpi_catalog,
    persona_templates, personas_for_goal,
};
pub use error::{Result, StratBuilderError};
pub use types::{
    AuditPrompt, BusinessGoal, CURRENT_SCHEMA_VERSION, CandidateEntity, ContentHub, ContentSpec,
    Entity, EntityType, FrameworkOutput, HubPage, HubRole, Intent, Kpi, MeasurementPlan,
    NodeLink, Ontology, Persona, Priority, Query, QueryCluster, RelationType, Relationship,
    SourceMode, StrategySummary, Taxonomy, TaxonomyNode, stable_id,
};
