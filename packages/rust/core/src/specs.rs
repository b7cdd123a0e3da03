//! Content specs: derive audience personas from the configured goals and
//! write one per-page specification for every hub page.

use tracing::{info, instrument};

use stratbuilder_shared::{
    BrandConfig, ContentHub, ContentSpec, HubPage, HubRole, Intent, Persona, PersonaTemplate,
    Query, QueryCluster, StageDefaults, personas_for_goal, stable_id,
};

/// Persona keys used when the goal mapping produces nothing.
const FALLBACK_PERSONAS: &[&str] = &["beginner", "practitioner"];

/// Derive personas and generate one content spec per hub page.
///
/// Persona selection follows the configured goals in order, adds the
/// decision maker when competitors are configured, and deduplicates
/// first-wins. Every hub page gets exactly one spec keyed by its role
/// and primary intent.
#[instrument(skip_all, fields(hubs = hubs.len()))]
pub fn generate_all_specs(
    hubs: &[ContentHub],
    clusters: &[QueryCluster],
    config: &BrandConfig,
    defaults: &StageDefaults,
) -> (Vec<Persona>, Vec<ContentSpec>) {
    let personas = select_personas(config, &defaults.persona_templates);

    let mut specs: Vec<ContentSpec> = Vec::new();
    for hub in hubs {
        for page in std::iter::once(&hub.pillar).chain(hub.clusters.iter()) {
            specs.push(page_spec(page, clusters, &personas));
        }
    }

    info!(personas = personas.len(), specs = specs.len(), "content specs generated");

    (personas, specs)
}

// ---------------------------------------------------------------------------
// Personas
// ---------------------------------------------------------------------------

/// Instantiate the persona templates relevant to this configuration.
fn select_personas(config: &BrandConfig, templates: &[PersonaTemplate]) -> Vec<Persona> {
    let mut keys: Vec<&str> = Vec::new();

    for goal in &config.business_goals {
        for key in personas_for_goal(*goal) {
            if !keys.contains(key) {
                keys.push(key);
            }
        }
    }

    if !config.competitors.is_empty() && !keys.contains(&"decision_maker") {
        keys.push("decision_maker");
    }

    if keys.is_empty() {
        keys.extend(FALLBACK_PERSONAS);
    }

    keys.iter()
        .filter_map(|key| templates.iter().find(|t| t.key == *key))
        .map(|template| Persona {
            id: stable_id("persona", &template.key),
            name: template.name.clone(),
            knowledge_level: template.knowledge_level.clone(),
            goals: template.motivations.clone(),
            pain_points: template.pain_points.clone(),
            preferred_formats: template.preferred_formats.clone(),
            tone: template.tone.clone(),
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Per-page specs
// ---------------------------------------------------------------------------

/// Write the spec for one hub page.
fn page_spec(page: &HubPage, clusters: &[QueryCluster], personas: &[Persona]) -> ContentSpec {
    let linked: Vec<&Query> = page
        .linked_query_ids
        .iter()
        .filter_map(|id| find_query(clusters, id))
        .collect();

    let intent = primary_intent(&linked);

    let tone = personas
        .first()
        .map(|p| p.tone.clone())
        .unwrap_or_else(|| "practical, detailed, example-driven".to_string());

    ContentSpec {
        hub_page_id: page.id.clone(),
        title: page.title.clone(),
        recommended_structure: structure(page.role, intent),
        schema_markup_types: schema_types(page.role, intent),
        tone,
        ai_optimization_notes: optimization_notes(&linked, personas),
    }
}

fn find_query<'a>(clusters: &'a [QueryCluster], id: &str) -> Option<&'a Query> {
    clusters
        .iter()
        .flat_map(|c| c.queries.iter())
        .find(|q| q.id == id)
}

/// Most frequent intent among the page's linked queries, ties resolving
/// by intent declaration order. Informational when nothing is linked.
fn primary_intent(queries: &[&Query]) -> Intent {
    Intent::ALL
        .iter()
        .map(|intent| (*intent, queries.iter().filter(|q| q.intent == *intent).count()))
        .filter(|(_, n)| *n > 0)
        .max_by_key(|(_, n)| *n)
        .map(|(intent, _)| intent)
        .unwrap_or(Intent::Informational)
}

/// Ordered section labels by page role and primary intent.
fn structure(role: HubRole, intent: Intent) -> Vec<String> {
    let sections: &[&str] = match (role, intent) {
        (HubRole::Pillar, _) => &[
            "Overview",
            "Key Concepts",
            "Subtopic Deep Dives",
            "Best Practices",
            "FAQ",
        ],
        (HubRole::Cluster, Intent::Informational) => {
            &["Direct Answer", "Step-by-Step Walkthrough", "Examples", "Common Pitfalls", "FAQ"]
        }
        (HubRole::Cluster, Intent::Commercial) => {
            &["Summary Verdict", "Comparison Criteria", "Option Breakdown", "Recommendation"]
        }
        (HubRole::Cluster, Intent::Transactional) => {
            &["Pricing Overview", "Plan Comparison", "How to Buy", "FAQ"]
        }
        (HubRole::Cluster, Intent::Navigational | Intent::Local) => {
            &["Quick Answer", "Details", "Related Resources"]
        }
    };
    sections.iter().map(|s| s.to_string()).collect()
}

/// Schema.org types by page role and primary intent. Pillars always carry
/// breadcrumb markup on top of the intent types.
fn schema_types(role: HubRole, intent: Intent) -> Vec<String> {
    let mut types: Vec<String> = match intent {
        Intent::Informational => vec!["Article".into(), "FAQPage".into()],
        Intent::Navigational => vec!["WebPage".into()],
        Intent::Commercial => vec!["ItemList".into(), "Review".into()],
        Intent::Transactional => vec!["Product".into(), "Offer".into()],
        Intent::Local => vec!["LocalBusiness".into()],
    };
    if role == HubRole::Pillar {
        types.push("BreadcrumbList".into());
    }
    types
}

/// Assemble optimization notes from linked query texts and persona names.
fn optimization_notes(queries: &[&Query], personas: &[Persona]) -> Vec<String> {
    let mut notes = vec![
        "Answer the primary question in the first paragraph".to_string(),
        "Use target query phrasing verbatim in section headings".to_string(),
    ];

    if let Some(query) = queries.first() {
        notes.push(format!("Lead with coverage of \"{}\"", query.text));
    }

    if !personas.is_empty() {
        let names: Vec<&str> = personas.iter().map(|p| p.name.as_str()).collect();
        notes.push(format!("Write for: {}", names.join(", ")));
    }

    notes
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
