//! Entity expansion: deterministic alias generation, centrality and
//! commercial value scoring, and the entity gap report.

use tracing::{info, instrument};

use stratbuilder_shared::{
    ABBREVIATIONS, BrandConfig, Entity, Ontology, SUFFIX_FAMILIES, entity_types_for_goal,
    expected_topics_for_goal, sanitize_entity,
};

use crate::ontology::shares_meaningful_word;

/// Weight of goal alignment in the commercial value formula.
const W_GOAL_ALIGNMENT: f64 = 0.3;

/// Weight of competitor name overlap (differentiation signal, never a penalty).
const W_COMPETITOR_OVERLAP: f64 = 0.2;

/// Weight of the entity type's base value.
const W_TYPE: f64 = 0.5;

/// Expand every entity with aliases and recompute its scores.
///
/// Takes the ontology by value and returns the updated one; the caller's
/// copy is never mutated in place. Alias generation is purely lexical and
/// deterministic: the same entity name always yields the same alias list,
/// in the same order.
#[instrument(skip_all, fields(entities = ontology.entities.len()))]
pub fn expand_all_entities(mut ontology: Ontology, config: &BrandConfig) -> Ontology {
    let max_degree = ontology
        .entities
        .iter()
        .map(|e| ontology.degree(&e.id))
        .max()
        .unwrap_or(0);

    let degrees: Vec<usize> = ontology
        .entities
        .iter()
        .map(|e| ontology.degree(&e.id))
        .collect();

    let single_entity = ontology.entities.len() <= 1;

    for (entity, degree) in ontology.entities.iter_mut().zip(degrees) {
        entity.aliases = alias_variants(&entity.name);

        entity.centrality = if single_entity || max_degree == 0 {
            0.0
        } else {
            degree as f64 / max_degree as f64
        };

        entity.commercial_value = commercial_value(entity, config);
    }

    let total_aliases: usize = ontology.entities.iter().map(|e| e.aliases.len()).sum();
    info!(total_aliases, max_degree, "entities expanded");

    ontology
}

/// Compute the weighted commercial value for one entity, clamped to [0, 1].
fn commercial_value(entity: &Entity, config: &BrandConfig) -> f64 {
    let goal_alignment = if config
        .business_goals
        .iter()
        .any(|g| entity_types_for_goal(*g).contains(&entity.entity_type))
    {
        1.0
    } else {
        0.0
    };

    let name_lower = entity.name.to_lowercase();
    let competitor_overlap = if config
        .competitors
        .iter()
        .map(|c| sanitize_entity(c).to_lowercase())
        .any(|c| !c.is_empty() && shares_meaningful_word(&name_lower, &c))
    {
        1.0
    } else {
        0.0
    };

    let score = W_GOAL_ALIGNMENT * goal_alignment
        + W_COMPETITOR_OVERLAP * competitor_overlap
        + W_TYPE * entity.entity_type.base_weight();

    score.clamp(0.0, 1.0)
}

// ---------------------------------------------------------------------------
// Alias generation
// ---------------------------------------------------------------------------

/// Generate alias variants for an entity name.
///
/// Rules apply in a fixed order: abbreviation expansion, singular/plural,
/// hyphen/space/concatenation plus camelCase splitting, then suffix
/// families. Duplicates keep their first occurrence; the name itself is
/// never an alias; variants shorter than two chars are dropped.
pub fn alias_variants(name: &str) -> Vec<String> {
    let name_lower = name.to_lowercase();
    let mut variants: Vec<String> = Vec::new();

    collect(&mut variants, abbreviation_variants(&name_lower));
    collect(&mut variants, number_variants(&name_lower));
    collect(&mut variants, format_variants(name));
    collect(&mut variants, suffix_variants(&name_lower));

    variants
        .into_iter()
        .filter(|v| v.len() >= 2 && v.to_lowercase() != name_lower)
        .collect()
}

/// Append variants preserving first-occurrence order.
fn collect(variants: &mut Vec<String>, new: Vec<String>) {
    for v in new {
        if !v.is_empty() && !variants.iter().any(|existing| existing == &v) {
            variants.push(v);
        }
    }
}

/// Expand known abbreviations in both directions.
fn abbreviation_variants(name_lower: &str) -> Vec<String> {
    let mut out = Vec::new();

    for (abbr, expansion) in ABBREVIATIONS {
        if name_lower == *abbr {
            out.push(expansion.to_string());
        }
    }

    let words: Vec<&str> = name_lower.split_whitespace().collect();
    for (i, word) in words.iter().enumerate() {
        for (abbr, expansion) in ABBREVIATIONS {
            if word == abbr {
                let mut expanded = words.clone();
                expanded[i] = expansion;
                out.push(expanded.join(" "));
            }
        }
    }

    for (abbr, expansion) in ABBREVIATIONS {
        if name_lower.contains(expansion) {
            out.push(name_lower.replace(expansion, abbr));
        }
    }

    out
}

/// Singular/plural variants.
fn number_variants(name_lower: &str) -> Vec<String> {
    let mut out = Vec::new();

    if name_lower.ends_with('s') && !name_lower.ends_with("ss") {
        out.push(name_lower[..name_lower.len() - 1].to_string());
        if name_lower.ends_with("ies") {
            out.push(format!("{}y", &name_lower[..name_lower.len() - 3]));
        } else if name_lower.ends_with("es") {
            out.push(name_lower[..name_lower.len() - 2].to_string());
        }
    } else if name_lower.ends_with('y') && name_lower.len() > 2 {
        let before_y = name_lower.as_bytes()[name_lower.len() - 2] as char;
        if "aeiou".contains(before_y) {
            out.push(format!("{name_lower}s"));
        } else {
            out.push(format!("{}ies", &name_lower[..name_lower.len() - 1]));
        }
    } else if name_lower.ends_with('x')
        || name_lower.ends_with('z')
        || name_lower.ends_with("ch")
        || name_lower.ends_with("sh")
    {
        out.push(format!("{name_lower}es"));
    } else {
        out.push(format!("{name_lower}s"));
    }

    out
}

/// Hyphen/space/concatenation variants and camelCase splitting.
fn format_variants(name: &str) -> Vec<String> {
    let mut out = Vec::new();

    if name.contains('-') {
        out.push(name.replace('-', " ").to_lowercase());
        out.push(name.replace('-', "").to_lowercase());
    } else if name.contains(' ') {
        out.push(name.replace(' ', "-").to_lowercase());
        out.push(name.replace(' ', "").to_lowercase());
    } else {
        // Single token: split camelCase boundaries
        let split = split_camel_case(name);
        if split != name.to_lowercase() {
            out.push(split.clone());
            out.push(split.replace(' ', "-"));
        }
    }

    out
}

/// Lowercase a camelCase token with spaces at case boundaries.
fn split_camel_case(name: &str) -> String {
    let mut result = String::with_capacity(name.len() + 4);
    let mut prev_lower = false;

    for c in name.chars() {
        if c.is_uppercase() && prev_lower {
            result.push(' ');
        }
        prev_lower = c.is_lowercase();
        result.extend(c.to_lowercase());
    }

    result
}

/// Variants from suffix families ("x tool" also answers to "x software").
fn suffix_variants(name_lower: &str) -> Vec<String> {
    let mut out = Vec::new();

    for (base, family) in SUFFIX_FAMILIES {
        if let Some(prefix) = name_lower.strip_suffix(base) {
            for suffix in *family {
                out.push(format!("{prefix}{suffix}"));
            }
        }
    }

    out
}

// ---------------------------------------------------------------------------
// Gap analysis
// ---------------------------------------------------------------------------

/// Report names implied by the configured goals and competitors that no
/// entity (or alias) covers. Returned as missing names in stable order,
/// never auto-created.
pub fn find_entity_gaps(ontology: &Ontology, config: &BrandConfig) -> Vec<String> {
    let mut coverage: Vec<String> = ontology
        .entities
        .iter()
        .map(|e| e.name.to_lowercase())
        .collect();
    for entity in &ontology.entities {
        coverage.extend(entity.aliases.iter().map(|a| a.to_lowercase()));
    }

    let mut targets: Vec<String> = Vec::new();
    for goal in &config.business_goals {
        for topic in expected_topics_for_goal(*goal) {
            targets.push(topic.to_string());
        }
    }
    for competitor in &config.competitors {
        let name = sanitize_entity(competitor);
        if !name.is_empty() {
            targets.push(name);
        }
    }

    let mut gaps: Vec<String> = Vec::new();
    for target in targets {
        let lower = target.to_lowercase();
        if !coverage.contains(&lower) && !gaps.iter().any(|g| g.to_lowercase() == lower) {
            gaps.push(target);
        }
    }

    gaps
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use stratbuilder_shared::{BusinessGoal, EntityType, SourceMode};

    fn config_with_goals(goals: Vec<BusinessGoal>) -> BrandConfig {
        BrandConfig {
            brand_name: "Acme".into(),
            primary_niche: "widgets".into(),
            business_goals: goals,
            source_mode: SourceMode::Seed,
            sitemap_url: None,
            seed_entities: vec!["Widget".into()],
            competitors: vec![],
            target_regions: vec!["US".into()],
        }
    }

    #[test]
    fn alias_generation_is_deterministic() {
        let first = alias_variants("Content Strategy");
        let second = alias_variants("Content Strategy");
        assert_eq!(first, second);
        assert!(!first.is_empty());
    }

    #[test]
    fn plural_rules() {
        assert!(alias_variants("strategy").contains(&"strategies".to_string()));
        assert!(alias_variants("tax").contains(&"taxes".to_string()));
        assert!(alias_variants("widget").contains(&"widgets".to_string()));
        assert!(alias_variants("strategies").contains(&"strategy".to_string()));
    }

    #[test]
    fn abbreviation_expansion_both_ways() {
        assert!(alias_variants("seo").contains(&"search engine optimization".to_string()));
        assert!(alias_variants("seo tools").contains(&"search engine optimization tools".to_string()));
        assert!(alias_variants("machine learning").contains(&"ml".to_string()));
    }

    #[test]
    fn format_variants_cover_hyphens_and_camel_case() {
        let hyphenated = alias_variants("how-to");
        assert!(hyphenated.contains(&"how to".to_string()));
        assert!(hyphenated.contains(&"howto".to_string()));

        let spaced = alias_variants("link building");
        assert!(spaced.contains(&"link-building".to_string()));
        assert!(spaced.contains(&"linkbuilding".to_string()));

        let camel = alias_variants("WidgetBuilder");
        assert!(camel.contains(&"widget builder".to_string()));
        assert!(camel.contains(&"widget-builder".to_string()));
    }

    #[test]
    fn name_itself_never_an_alias() {
        for alias in alias_variants("Email Marketing") {
            assert_ne!(alias.to_lowercase(), "email marketing");
        }
    }

    #[test]
    fn centrality_is_zero_for_single_entity() {
        let ontology = Ontology {
            brand_name: "Acme".into(),
            entities: vec![Entity {
                id: "solo".into(),
                name: "Solo Topic".into(),
                entity_type: EntityType::Core,
                description: None,
                aliases: vec![],
                centrality: 0.5,
                commercial_value: 0.5,
                source_urls: vec![],
            }],
            relationships: vec![],
        };

        let expanded = expand_all_entities(ontology, &config_with_goals(vec![BusinessGoal::BrandAwareness]));
        assert_eq!(expanded.entities[0].centrality, 0.0);
    }

    #[test]
    fn centrality_normalizes_by_max_degree() {
        let config = BrandConfig {
            seed_entities: vec![
                "Email Marketing".into(),
                "Email Automation".into(),
                "Email Templates".into(),
            ],
            ..config_with_goals(vec![BusinessGoal::BrandAwareness])
        };
        let ontology = crate::ontology::build(&config, &[]).expect("build");
        let expanded = expand_all_entities(ontology, &config);

        let max = expanded
            .entities
            .iter()
            .map(|e| e.centrality)
            .fold(0.0f64, f64::max);
        assert_eq!(max, 1.0);
        assert!(expanded.entities.iter().all(|e| (0.0..=1.0).contains(&e.centrality)));
    }

    #[test]
    fn commercial_value_weights_goal_and_type() {
        let config = config_with_goals(vec![BusinessGoal::LeadGeneration]);
        let core = Entity {
            id: "a".into(),
            name: "Widget".into(),
            entity_type: EntityType::Core,
            description: None,
            aliases: vec![],
            centrality: 0.0,
            commercial_value: 0.0,
            source_urls: vec![],
        };
        // Goal-aligned core entity: 0.3 * 1.0 + 0.5 * 1.0
        assert!((commercial_value(&core, &config) - 0.8).abs() < 1e-9);

        let supporting = Entity {
            entity_type: EntityType::Supporting,
            ..core.clone()
        };
        // LeadGeneration only aligns core entities: 0.5 * 0.5
        assert!((commercial_value(&supporting, &config) - 0.25).abs() < 1e-9);
    }

    #[test]
    fn competitor_overlap_adds_signal() {
        let mut config = config_with_goals(vec![BusinessGoal::LeadGeneration]);
        config.competitors = vec!["Widget Rival".into()];

        let entity = Entity {
            id: "a".into(),
            name: "Widget".into(),
            entity_type: EntityType::Core,
            description: None,
            aliases: vec![],
            centrality: 0.0,
            commercial_value: 0.0,
            source_urls: vec![],
        };
        assert!((commercial_value(&entity, &config) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn gaps_report_uncovered_targets() {
        let mut build_config = config_with_goals(vec![BusinessGoal::EcommerceSales]);
        build_config.seed_entities = vec!["Pricing".into()];

        let ontology = crate::ontology::build(&build_config, &[]).expect("build");
        let expanded = expand_all_entities(ontology, &build_config);

        // A competitor added after the ontology was built has no entity
        let mut gap_config = build_config;
        gap_config.competitors = vec!["Rivalcorp".into()];

        let gaps = find_entity_gaps(&expanded, &gap_config);
        assert!(gaps.contains(&"product reviews".to_string()));
        assert!(gaps.contains(&"Rivalcorp".to_string()));
        // "pricing" is covered by the seed entity
        assert!(!gaps.iter().any(|g| g.to_lowercase() == "pricing"));
    }
}
