//! Core domain types for StratBuilder content strategies.
//!
//! Everything in the final document cross-references by stable string id.
//! Ids derive from normalized names (slug + truncated SHA-256), so two runs
//! over the same input produce identical ids.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Current schema version for the exported strategy document.
pub const CURRENT_SCHEMA_VERSION: u32 = 1;

// ---------------------------------------------------------------------------
// Stable ids
// ---------------------------------------------------------------------------

/// Derive a deterministic id from a normalized seed string.
///
/// Format: `[prefix-]slug-hhhhhhhh` where the slug is the first 24
/// alphanumeric-ish chars of the lowercased seed and the suffix is the
/// first 8 hex chars of its SHA-256 digest. The digest disambiguates
/// names that collapse to the same slug.
pub fn stable_id(prefix: &str, seed: &str) -> String {
    let normalized = seed.trim().to_lowercase();

    let mut slug: String = normalized
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '-' })
        .collect();
    while slug.contains("--") {
        slug = slug.replace("--", "-");
    }
    let slug = slug.trim_matches('-');
    let slug: String = slug.chars().take(24).collect();
    let slug = slug.trim_matches('-');

    let digest = Sha256::digest(normalized.as_bytes());
    let suffix: String = format!("{digest:x}").chars().take(8).collect();

    if prefix.is_empty() {
        format!("{slug}-{suffix}")
    } else {
        format!("{prefix}-{slug}-{suffix}")
    }
}

// ---------------------------------------------------------------------------
// Enumerations
// ---------------------------------------------------------------------------

/// How entities are sourced for analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceMode {
    Seed,
    Sitemap,
    Hybrid,
}

impl SourceMode {
    /// Whether this mode pulls candidate entities from a sitemap.
    pub fn uses_sitemap(self) -> bool {
        matches!(self, Self::Sitemap | Self::Hybrid)
    }

    /// Whether this mode requires seed entities.
    pub fn uses_seeds(self) -> bool {
        matches!(self, Self::Seed | Self::Hybrid)
    }
}

/// Business goals for strategic alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BusinessGoal {
    BrandAwareness,
    LeadGeneration,
    EcommerceSales,
    ThoughtLeadership,
    LocalVisibility,
    ProductAdoption,
}

/// Category an entity belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    Core,
    Supporting,
    Competitor,
    Attribute,
}

impl EntityType {
    /// All types in declaration order (used for deterministic grouping).
    pub const ALL: [EntityType; 4] = [
        EntityType::Core,
        EntityType::Supporting,
        EntityType::Competitor,
        EntityType::Attribute,
    ];

    /// Human-readable label used for taxonomy root nodes.
    pub fn label(self) -> &'static str {
        match self {
            Self::Core => "Core Topics",
            Self::Supporting => "Supporting Topics",
            Self::Competitor => "Competitors",
            Self::Attribute => "Attributes",
        }
    }

    /// Base weight used in the commercial value formula.
    pub fn base_weight(self) -> f64 {
        match self {
            Self::Core => 1.0,
            Self::Supporting => 0.5,
            Self::Competitor => 0.3,
            Self::Attribute => 0.6,
        }
    }
}

/// Semantic relationship kinds. Declaration order is the tie-break order
/// for dominant-relation selection in the taxonomy builder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationType {
    IsA,
    PartOf,
    UsedFor,
    RelatesTo,
    Requires,
    AlternativeTo,
    Enables,
    ContrastsWith,
}

impl RelationType {
    /// All relation types in declaration order.
    pub const ALL: [RelationType; 8] = [
        RelationType::IsA,
        RelationType::PartOf,
        RelationType::UsedFor,
        RelationType::RelatesTo,
        RelationType::Requires,
        RelationType::AlternativeTo,
        RelationType::Enables,
        RelationType::ContrastsWith,
    ];

    /// Fixed edge weight for this relation kind.
    pub fn weight(self) -> f64 {
        match self {
            Self::IsA => 1.0,
            Self::PartOf => 0.9,
            Self::UsedFor => 0.8,
            Self::RelatesTo => 0.6,
            Self::Requires => 0.7,
            Self::AlternativeTo => 0.5,
            Self::Enables => 0.8,
            Self::ContrastsWith => 0.4,
        }
    }

    /// Whether the relation reads in both directions.
    pub fn bidirectional(self) -> bool {
        matches!(self, Self::RelatesTo | Self::AlternativeTo | Self::ContrastsWith)
    }

    /// Label used when a taxonomy root is subdivided by this relation.
    pub fn group_label(self) -> &'static str {
        match self {
            Self::IsA => "Classification",
            Self::PartOf => "Components",
            Self::UsedFor => "Applications",
            Self::RelatesTo => "Related Concepts",
            Self::Requires => "Dependencies",
            Self::AlternativeTo => "Alternatives",
            Self::Enables => "Capabilities",
            Self::ContrastsWith => "Contrasts",
        }
    }
}

/// Search intent vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Informational,
    Navigational,
    Commercial,
    Transactional,
    Local,
}

impl Intent {
    /// All intents in declaration order.
    pub const ALL: [Intent; 5] = [
        Intent::Informational,
        Intent::Navigational,
        Intent::Commercial,
        Intent::Transactional,
        Intent::Local,
    ];

    /// Stable key used in id derivation and map keys.
    pub fn key(self) -> &'static str {
        match self {
            Self::Informational => "informational",
            Self::Navigational => "navigational",
            Self::Commercial => "commercial",
            Self::Transactional => "transactional",
            Self::Local => "local",
        }
    }

    /// SERP feature most likely to surface for this intent. Static lookup,
    /// not a prediction.
    pub fn serp_feature(self) -> &'static str {
        match self {
            Self::Informational => "featured_snippet",
            Self::Navigational => "sitelinks",
            Self::Commercial => "review_snippet",
            Self::Transactional => "shopping_results",
            Self::Local => "local_pack",
        }
    }
}

/// Content priority tiers. Lower rank wins on conflict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Critical,
    High,
    Medium,
    Low,
}

impl Priority {
    /// Numeric rank, 0 = highest priority.
    pub fn rank(self) -> u8 {
        match self {
            Self::Critical => 0,
            Self::High => 1,
            Self::Medium => 2,
            Self::Low => 3,
        }
    }
}

/// Role a page plays inside a content hub.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HubRole {
    Pillar,
    Cluster,
}

// ---------------------------------------------------------------------------
// Sitemap candidates
// ---------------------------------------------------------------------------

/// A candidate entity extracted from sitemap URL paths by the sitemap
/// collaborator. Input material for the ontology builder, never part of
/// the final document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateEntity {
    /// Display name reconstructed from the URL slug.
    pub name: String,
    /// How many sitemap URLs produced this name (case-insensitive).
    pub frequency: usize,
    /// Up to five source URLs that mentioned the candidate.
    pub source_urls: Vec<String>,
}

// ---------------------------------------------------------------------------
// Ontology
// ---------------------------------------------------------------------------

/// A named concept tracked across the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    /// Stable id derived from the normalized name.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Category.
    pub entity_type: EntityType,
    /// Short description, when one can be derived.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Synonyms/variants. Grows during expansion, read-only afterward.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
    /// Normalized relationship degree in [0, 1].
    pub centrality: f64,
    /// Commercial value score in [0, 1].
    pub commercial_value: f64,
    /// Sitemap URLs this entity was derived from, if any.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub source_urls: Vec<String>,
}

/// A directed semantic edge between two entities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    /// Source entity id.
    pub source_id: String,
    /// Target entity id.
    pub target_id: String,
    /// Relation kind.
    pub relation: RelationType,
    /// Fixed weight of the relation kind.
    pub weight: f64,
    /// Whether the edge reads in both directions.
    pub bidirectional: bool,
}

/// The entity set plus relationship set for a brand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ontology {
    /// Brand the ontology was built for.
    pub brand_name: String,
    /// Entities in stable insertion order.
    pub entities: Vec<Entity>,
    /// Inferred relationships in stable rule order.
    pub relationships: Vec<Relationship>,
}

impl Ontology {
    /// Look up an entity by id.
    pub fn entity(&self, id: &str) -> Option<&Entity> {
        self.entities.iter().find(|e| e.id == id)
    }

    /// Whether an entity id exists in this ontology.
    pub fn contains(&self, id: &str) -> bool {
        self.entity(id).is_some()
    }

    /// Relationship count touching the given entity (in + out).
    pub fn degree(&self, id: &str) -> usize {
        self.relationships
            .iter()
            .filter(|r| r.source_id == id || r.target_id == id)
            .count()
    }
}

// ---------------------------------------------------------------------------
// Taxonomy
// ---------------------------------------------------------------------------

/// A node in the taxonomy forest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxonomyNode {
    /// Stable node id.
    pub id: String,
    /// Display label.
    pub label: String,
    /// Parent node id; `None` only for roots.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    /// Entities classified under this node (exclusive membership).
    pub entity_ids: Vec<String>,
    /// Cross-cutting facet labels.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub facet_tags: Vec<String>,
}

/// A directed internal-link edge between sibling taxonomy nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeLink {
    pub source_node_id: String,
    pub target_node_id: String,
}

/// Forest of taxonomy nodes plus the declared facet vocabulary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Taxonomy {
    /// Nodes, roots first, in deterministic creation order.
    pub nodes: Vec<TaxonomyNode>,
    /// Facet dimension -> allowed labels.
    pub facets: BTreeMap<String, Vec<String>>,
    /// Proposed internal links between sibling nodes.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub links: Vec<NodeLink>,
}

impl Taxonomy {
    /// Look up a node by id.
    pub fn node(&self, id: &str) -> Option<&TaxonomyNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Root nodes in creation order.
    pub fn roots(&self) -> impl Iterator<Item = &TaxonomyNode> {
        self.nodes.iter().filter(|n| n.parent_id.is_none())
    }

    /// Direct children of a node, in creation order.
    pub fn children(&self, id: &str) -> impl Iterator<Item = &TaxonomyNode> {
        self.nodes
            .iter()
            .filter(move |n| n.parent_id.as_deref() == Some(id))
    }
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// A generated search query targeting one entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Query {
    /// Stable id derived from (entity, pattern).
    pub id: String,
    /// Query text.
    pub text: String,
    /// Entity this query targets.
    pub entity_id: String,
    /// Declared intent of the winning pattern.
    pub intent: Intent,
    /// Priority of the winning pattern.
    pub priority: Priority,
    /// Name of the fan-out pattern that produced this query.
    pub fanout_pattern: String,
    /// SERP feature most likely for this intent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_serp_feature: Option<String>,
}

/// Queries grouped by (taxonomy node, primary intent).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryCluster {
    /// Stable id derived from (node, intent).
    pub id: String,
    /// Owning taxonomy node.
    pub taxonomy_node_id: String,
    /// Shared intent of all queries in the cluster.
    pub intent: Intent,
    /// Queries in generation order. This is the canonical home of every
    /// query; everything else references them by id.
    pub queries: Vec<Query>,
}

// ---------------------------------------------------------------------------
// Hubs
// ---------------------------------------------------------------------------

/// A single page inside a content hub.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HubPage {
    /// Stable page id.
    pub id: String,
    /// Working title.
    pub title: String,
    /// Pillar or cluster.
    pub role: HubRole,
    /// Taxonomy node this page covers.
    pub taxonomy_node_id: String,
    /// Queries this page targets, by id.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub linked_query_ids: Vec<String>,
    /// Internal link edges to other hub pages (directed; cycles allowed,
    /// real site link graphs contain them).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub linked_hub_ids: Vec<String>,
    /// Recommended content format key.
    pub recommended_format: String,
    /// Publishing priority.
    pub priority: Priority,
}

/// A pillar page plus its cluster pages covering a taxonomy subtree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentHub {
    /// Stable hub id.
    pub id: String,
    /// Hub name (root node label).
    pub name: String,
    /// The pillar page.
    pub pillar: HubPage,
    /// Cluster pages in creation order.
    pub clusters: Vec<HubPage>,
    /// Fraction of the subtree's entities addressed by linked queries.
    pub coverage_score: f64,
}

// ---------------------------------------------------------------------------
// Personas & content specs
// ---------------------------------------------------------------------------

/// An audience persona derived from business goals and competitors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Persona {
    pub id: String,
    pub name: String,
    pub knowledge_level: String,
    /// What this persona is trying to achieve.
    pub goals: Vec<String>,
    pub pain_points: Vec<String>,
    /// Preferred content format keys.
    pub preferred_formats: Vec<String>,
    /// Tone guidance when writing for this persona.
    pub tone: String,
}

/// A per-page content specification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentSpec {
    /// Hub page this spec describes.
    pub hub_page_id: String,
    /// Page title (mirrors the hub page for readability of exports).
    pub title: String,
    /// Ordered section labels.
    pub recommended_structure: Vec<String>,
    /// Schema.org types to mark the page up with.
    pub schema_markup_types: Vec<String>,
    /// Tone guidance.
    pub tone: String,
    /// Optimization notes assembled from entity/persona names.
    pub ai_optimization_notes: Vec<String>,
}

// ---------------------------------------------------------------------------
// Measurement
// ---------------------------------------------------------------------------

/// A key performance indicator from the fixed catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Kpi {
    pub name: String,
    pub description: String,
    pub measurement_method: String,
    /// "daily" | "weekly" | "monthly".
    pub refresh_cadence: String,
    pub priority: Priority,
}

/// A fixed prompt used to audit AI systems about the brand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditPrompt {
    pub category: String,
    pub prompt: String,
    /// What to look for in the response.
    pub check_for: String,
}

/// KPIs, monitoring queries, and audit prompts for a strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasurementPlan {
    pub kpis: Vec<Kpi>,
    /// Query ids to monitor, highest-priority query per valuable entity.
    pub monitoring_query_ids: Vec<String>,
    pub audit_prompts: Vec<AuditPrompt>,
}

// ---------------------------------------------------------------------------
// FrameworkOutput
// ---------------------------------------------------------------------------

/// Counts summarizing a completed strategy.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StrategySummary {
    pub total_entities: usize,
    pub total_relationships: usize,
    pub taxonomy_nodes: usize,
    pub query_clusters: usize,
    pub total_queries: usize,
    pub content_hubs: usize,
    pub hub_pages: usize,
    pub content_specs: usize,
    pub personas: usize,
    pub kpis: usize,
}

/// The root aggregate: one instance of every stage's output plus a
/// summary. The sole externally emitted object; every cross-reference
/// inside it resolves (validated before it is returned or exported).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameworkOutput {
    /// Schema version for forward compatibility.
    pub schema_version: u32,
    pub brand_name: String,
    pub primary_niche: String,
    /// Assembly timestamp. The only field allowed to differ between two
    /// runs over identical configuration.
    pub generated_at: DateTime<Utc>,
    pub ontology: Ontology,
    pub taxonomy: Taxonomy,
    pub query_clusters: Vec<QueryCluster>,
    pub hubs: Vec<ContentHub>,
    pub personas: Vec<Persona>,
    pub content_specs: Vec<ContentSpec>,
    pub measurement: MeasurementPlan,
    pub summary: StrategySummary,
}

impl FrameworkOutput {
    /// Iterate every query in the document (clusters are the canonical home).
    pub fn queries(&self) -> impl Iterator<Item = &Query> {
        self.query_clusters.iter().flat_map(|c| c.queries.iter())
    }

    /// Iterate every hub page (pillars and clusters).
    pub fn hub_pages(&self) -> impl Iterator<Item = &HubPage> {
        self.hubs
            .iter()
            .flat_map(|h| std::iter::once(&h.pillar).chain(h.clusters.iter()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stable_id_is_deterministic() {
        let a = stable_id("", "Acme Widget");
        let b = stable_id("", "acme widget");
        assert_eq!(a, b);
        assert!(a.starts_with("acme-widget-"));
        assert_eq!(a.len(), "acme-widget-".len() + 8);
    }

    #[test]
    fn stable_id_disambiguates_slug_collisions() {
        // Long names truncate to the same slug but keep distinct digests
        let a = stable_id("node", "enterprise resource planning software");
        let b = stable_id("node", "enterprise resource planning platform");
        assert_ne!(a, b);
        assert!(a.starts_with("node-"));
    }

    #[test]
    fn enum_serde_uses_snake_case() {
        assert_eq!(
            serde_json::to_string(&RelationType::AlternativeTo).unwrap(),
            "\"alternative_to\""
        );
        assert_eq!(serde_json::to_string(&Intent::Informational).unwrap(), "\"informational\"");
        assert_eq!(serde_json::to_string(&SourceMode::Hybrid).unwrap(), "\"hybrid\"");
    }

    #[test]
    fn priority_rank_orders_conflicts() {
        assert!(Priority::Critical.rank() < Priority::High.rank());
        assert!(Priority::High.rank() < Priority::Medium.rank());
        assert!(Priority::Medium.rank() < Priority::Low.rank());
    }

    #[test]
    fn ontology_degree_counts_both_directions() {
        let ontology = Ontology {
            brand_name: "Acme".into(),
            entities: vec![
                Entity {
                    id: "a".into(),
                    name: "A".into(),
                    entity_type: EntityType::Core,
                    description: None,
                    aliases: vec![],
                    centrality: 0.0,
                    commercial_value: 0.5,
                    source_urls: vec![],
                },
                Entity {
                    id: "b".into(),
                    name: "B".into(),
                    entity_type: EntityType::Core,
                    description: None,
                    aliases: vec![],
                    centrality: 0.0,
                    commercial_value: 0.5,
                    source_urls: vec![],
                },
            ],
            relationships: vec![Relationship {
                source_id: "a".into(),
                target_id: "b".into(),
                relation: RelationType::RelatesTo,
                weight: RelationType::RelatesTo.weight(),
                bidirectional: true,
            }],
        };

        assert_eq!(ontology.degree("a"), 1);
        assert_eq!(ontology.degree("b"), 1);
        assert!(ontology.contains("a"));
        assert!(!ontology.contains("c"));
    }

    #[test]
    fn entity_serde_roundtrip() {
        let entity = Entity {
            id: stable_id("", "Content Marketing"),
            name: "Content Marketing".into(),
            entity_type: EntityType::Core,
            description: Some("Seed entity".into()),
            aliases: vec!["content marketings".into()],
            centrality: 0.75,
            commercial_value: 0.8,
            source_urls: vec![],
        };

        let json = serde_json::to_string_pretty(&entity).expect("serialize");
        let parsed: Entity = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(parsed, entity);
    }
}
