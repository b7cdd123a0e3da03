//! Ontology construction: configuration + optional sitemap candidates
//! into an initial entity set with heuristically inferred relationships.

use tracing::{debug, info, instrument};

use stratbuilder_shared::{
    BrandConfig, CandidateEntity, Entity, EntityType, Ontology, RelationType, Relationship,
    Result, StratBuilderError, sanitize_entity, stable_id,
};

/// Words ignored when testing name overlap between two entities.
const OVERLAP_STOP_WORDS: &[&str] = &[
    "the", "a", "an", "and", "or", "for", "with", "best", "top", "how", "what",
];

/// Build the initial ontology from configuration and sitemap candidates.
///
/// SEED mode ignores `candidates`; SITEMAP mode ignores seeds; HYBRID uses
/// both, with seed entities winning conflicts (their type and commercial
/// value are kept). Deduplication is case-insensitive on the normalized
/// name. Relationship inference is a fixed rule set applied in declaration
/// order; the first matching rule wins per entity pair and no pair gets two
/// relationships of the same type.
#[instrument(skip_all, fields(brand = %config.brand_name, candidates = candidates.len()))]
pub fn build(config: &BrandConfig, candidates: &[CandidateEntity]) -> Result<Ontology> {
    let seeds = config.trimmed_seeds();
    if config.source_mode.uses_seeds() && seeds.is_empty() {
        return Err(StratBuilderError::configuration(format!(
            "seed entities are required when source_mode is {:?}",
            config.source_mode
        )));
    }

    let mut entities: Vec<Entity> = Vec::new();

    if config.source_mode.uses_seeds() {
        for seed in &seeds {
            push_unique(
                &mut entities,
                make_entity(seed, EntityType::Core, None, 0.8, vec![]),
            );
        }
    }

    for competitor in &config.competitors {
        let name = sanitize_entity(competitor);
        if name.is_empty() {
            continue;
        }
        push_unique(
            &mut entities,
            make_entity(
                &name,
                EntityType::Competitor,
                Some("Competitor brand".into()),
                0.3,
                vec![],
            ),
        );
    }

    if config.source_mode.uses_sitemap() {
        for candidate in candidates {
            let name = sanitize_entity(&candidate.name);
            if name.len() < 2 {
                continue;
            }
            // Frequently recurring sitemap topics are treated as core coverage
            let (entity_type, commercial_value) = if candidate.frequency > 1 {
                (EntityType::Core, 0.6)
            } else {
                (EntityType::Supporting, 0.4)
            };
            push_unique(
                &mut entities,
                make_entity(
                    &name,
                    entity_type,
                    None,
                    commercial_value,
                    candidate.source_urls.clone(),
                ),
            );
        }
    }

    let relationships = infer_relationships(&entities);

    info!(
        entities = entities.len(),
        relationships = relationships.len(),
        "ontology built"
    );

    Ok(Ontology {
        brand_name: config.brand_name.trim().to_string(),
        entities,
        relationships,
    })
}

/// Create an entity with a name-derived id and default scores.
fn make_entity(
    name: &str,
    entity_type: EntityType,
    description: Option<String>,
    commercial_value: f64,
    source_urls: Vec<String>,
) -> Entity {
    Entity {
        id: stable_id("", name),
        name: name.to_string(),
        entity_type,
        description,
        aliases: vec![],
        centrality: 0.0,
        commercial_value,
        source_urls,
    }
}

/// Append an entity unless one with the same normalized name exists.
/// Earlier sources (seeds) win conflicts by insertion order.
fn push_unique(entities: &mut Vec<Entity>, entity: Entity) {
    let key = entity.name.to_lowercase();
    if entities.iter().any(|e| e.name.to_lowercase() == key) {
        debug!(name = %entity.name, "duplicate entity skipped");
        return;
    }
    entities.push(entity);
}

// ---------------------------------------------------------------------------
// Relationship inference
// ---------------------------------------------------------------------------

/// Apply the fixed inference rules to every entity pair, in input order.
fn infer_relationships(entities: &[Entity]) -> Vec<Relationship> {
    let mut relationships: Vec<Relationship> = Vec::new();
    let mut seen: std::collections::HashSet<(String, String, RelationType)> =
        std::collections::HashSet::new();

    for i in 0..entities.len() {
        for j in (i + 1)..entities.len() {
            let a = &entities[i];
            let b = &entities[j];

            let Some((source, target, relation)) = match_rule(a, b) else {
                continue;
            };

            let key = (source.clone(), target.clone(), relation);
            if seen.insert(key) {
                relationships.push(Relationship {
                    source_id: source,
                    target_id: target,
                    relation,
                    weight: relation.weight(),
                    bidirectional: relation.bidirectional(),
                });
            }
        }
    }

    relationships
}

/// First matching inference rule for a pair, or `None`.
///
/// Rule order:
/// 1. name containment: the longer name is-a the shorter one
/// 2. competitor vs core sharing a word: alternative_to
/// 3. attribute vs core sharing a word: the attribute is part_of the core topic
/// 4. any pair sharing a word: relates_to
fn match_rule(a: &Entity, b: &Entity) -> Option<(String, String, RelationType)> {
    let a_lower = a.name.to_lowercase();
    let b_lower = b.name.to_lowercase();

    if a_lower != b_lower {
        if a_lower.contains(&b_lower) {
            return Some((a.id.clone(), b.id.clone(), RelationType::IsA));
        }
        if b_lower.contains(&a_lower) {
            return Some((b.id.clone(), a.id.clone(), RelationType::IsA));
        }
    }

    if !shares_meaningful_word(&a_lower, &b_lower) {
        return None;
    }

    use EntityType::*;
    match (a.entity_type, b.entity_type) {
        (Competitor, Core) => Some((a.id.clone(), b.id.clone(), RelationType::AlternativeTo)),
        (Core, Competitor) => Some((b.id.clone(), a.id.clone(), RelationType::AlternativeTo)),
        (Attribute, Core) => Some((a.id.clone(), b.id.clone(), RelationType::PartOf)),
        (Core, Attribute) => Some((b.id.clone(), a.id.clone(), RelationType::PartOf)),
        _ => Some((a.id.clone(), b.id.clone(), RelationType::RelatesTo)),
    }
}

/// Whether two lowercased names share at least one non-stop word.
pub(crate) fn shares_meaningful_word(a: &str, b: &str) -> bool {
    let words_a: Vec<&str> = a
        .split_whitespace()
        .filter(|w| !OVERLAP_STOP_WORDS.contains(w))
        .collect();

    b.split_whitespace()
        .filter(|w| !OVERLAP_STOP_WORDS.contains(w))
        .any(|w| words_a.contains(&w))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
