//! Taxonomy construction: group entities into a typed forest, split
//! oversized roots along their dominant relation, tag facets, and propose
//! internal links between sibling nodes.

use std::collections::BTreeMap;

use tracing::{debug, info, instrument};

use stratbuilder_shared::{
    Entity, EntityType, NodeLink, Ontology, RelationType, Result, StratBuilderError, Taxonomy,
    TaxonomyNode, stable_id,
};

/// A root with more entities than this is split once by its dominant
/// intra-group relation.
const SPLIT_THRESHOLD: usize = 6;

/// Mean commercial value at or above this is tagged "high".
const FACET_HIGH: f64 = 0.66;

/// Mean commercial value at or above this (and below high) is "medium".
const FACET_MEDIUM: f64 = 0.33;

/// Mean alias count at or above this earns the "alias-rich" tag.
const ALIAS_RICH_THRESHOLD: f64 = 3.0;

/// Build the taxonomy forest from an ontology.
///
/// One root per entity type present, in first-occurrence order. Roots
/// holding more than [`SPLIT_THRESHOLD`] entities are subdivided once by
/// their dominant internal relation. Every entity belongs to exactly one
/// node.
#[instrument(skip_all, fields(entities = ontology.entities.len()))]
pub fn build(ontology: &Ontology) -> Result<Taxonomy> {
    if ontology.entities.is_empty() {
        return Err(StratBuilderError::EmptyOntology);
    }

    let mut nodes: Vec<TaxonomyNode> = Vec::new();

    for entity_type in types_in_first_seen_order(&ontology.entities) {
        let label = entity_type.label();
        let entity_ids: Vec<String> = ontology
            .entities
            .iter()
            .filter(|e| e.entity_type == entity_type)
            .map(|e| e.id.clone())
            .collect();

        let root = TaxonomyNode {
            id: stable_id("node", label),
            label: label.to_string(),
            parent_id: None,
            entity_ids,
            facet_tags: vec![],
        };

        if root.entity_ids.len() > SPLIT_THRESHOLD {
            let (root, child) = split_root(root, ontology);
            nodes.push(root);
            if let Some(child) = child {
                nodes.push(child);
            }
        } else {
            nodes.push(root);
        }
    }

    for node in &mut nodes {
        node.facet_tags = facet_tags(node, ontology);
    }

    let links = sibling_links(&nodes, ontology);

    info!(nodes = nodes.len(), links = links.len(), "taxonomy built");

    Ok(Taxonomy {
        nodes,
        facets: facet_vocabulary(),
        links,
    })
}

/// Entity types in the order they first appear in the entity list.
fn types_in_first_seen_order(entities: &[Entity]) -> Vec<EntityType> {
    let mut order: Vec<EntityType> = Vec::new();
    for entity in entities {
        if !order.contains(&entity.entity_type) {
            order.push(entity.entity_type);
        }
    }
    order
}

/// The declared facet vocabulary for this taxonomy shape.
fn facet_vocabulary() -> BTreeMap<String, Vec<String>> {
    let mut facets = BTreeMap::new();
    facets.insert(
        "commercial_value".to_string(),
        vec!["high".to_string(), "medium".to_string(), "low".to_string()],
    );
    facets.insert("alias_richness".to_string(), vec!["alias-rich".to_string()]);
    facets
}

// ---------------------------------------------------------------------------
// Root splitting
// ---------------------------------------------------------------------------

/// Split an oversized root once along its dominant internal relation.
///
/// Entities participating in that relation (as source or target, with both
/// endpoints inside the root) move to a child node; the rest stay on the
/// root. If either side would be empty the split is skipped.
fn split_root(mut root: TaxonomyNode, ontology: &Ontology) -> (TaxonomyNode, Option<TaxonomyNode>) {
    let Some(relation) = dominant_relation(&root.entity_ids, ontology) else {
        return (root, None);
    };

    let movers: Vec<String> = root
        .entity_ids
        .iter()
        .filter(|id| {
            ontology.relationships.iter().any(|r| {
                r.relation == relation
                    && (r.source_id == **id || r.target_id == **id)
                    && root.entity_ids.contains(&r.source_id)
                    && root.entity_ids.contains(&r.target_id)
            })
        })
        .cloned()
        .collect();

    if movers.is_empty() || movers.len() == root.entity_ids.len() {
        debug!(root = %root.label, "split skipped, group would be empty");
        return (root, None);
    }

    root.entity_ids.retain(|id| !movers.contains(id));

    let label = format!("{} ({})", root.label, relation.group_label());
    let child = TaxonomyNode {
        id: stable_id("node", &label),
        label,
        parent_id: Some(root.id.clone()),
        entity_ids: movers,
        facet_tags: vec![],
    };

    (root, Some(child))
}

/// Most frequent relation type among edges internal to the given entity
/// set. Ties resolve by relation declaration order.
fn dominant_relation(entity_ids: &[String], ontology: &Ontology) -> Option<RelationType> {
    let mut counts: Vec<(RelationType, usize)> =
        RelationType::ALL.iter().map(|r| (*r, 0)).collect();

    for rel in &ontology.relationships {
        if entity_ids.contains(&rel.source_id) && entity_ids.contains(&rel.target_id) {
            if let Some(entry) = counts.iter_mut().find(|(r, _)| *r == rel.relation) {
                entry.1 += 1;
            }
        }
    }

    counts
        .into_iter()
        .filter(|(_, n)| *n > 0)
        .max_by_key(|(_, n)| *n)
        .map(|(r, _)| r)
}

// ---------------------------------------------------------------------------
// Facets
// ---------------------------------------------------------------------------

/// Facet tags for a node from the mean scores of its entities.
fn facet_tags(node: &TaxonomyNode, ontology: &Ontology) -> Vec<String> {
    let members: Vec<&Entity> = node
        .entity_ids
        .iter()
        .filter_map(|id| ontology.entity(id))
        .collect();

    if members.is_empty() {
        return vec![];
    }

    let mean_value: f64 =
        members.iter().map(|e| e.commercial_value).sum::<f64>() / members.len() as f64;
    let band = if mean_value >= FACET_HIGH {
        "high"
    } else if mean_value >= FACET_MEDIUM {
        "medium"
    } else {
        "low"
    };

    let mut tags = vec![band.to_string()];

    let mean_aliases: f64 =
        members.iter().map(|e| e.aliases.len()).sum::<usize>() as f64 / members.len() as f64;
    if mean_aliases >= ALIAS_RICH_THRESHOLD {
        tags.push("alias-rich".to_string());
    }

    tags
}

// ---------------------------------------------------------------------------
// Sibling links
// ---------------------------------------------------------------------------

/// Propose internal links between sibling nodes whose entity sets are
/// connected by at least one relationship. Links go both ways, one
/// [`NodeLink`] each.
fn sibling_links(nodes: &[TaxonomyNode], ontology: &Ontology) -> Vec<NodeLink> {
    let mut links: Vec<NodeLink> = Vec::new();

    for i in 0..nodes.len() {
        for j in (i + 1)..nodes.len() {
            let a = &nodes[i];
            let b = &nodes[j];
            if a.parent_id != b.parent_id {
                continue;
            }

            let connected = ontology.relationships.iter().any(|r| {
                (a.entity_ids.contains(&r.source_id) && b.entity_ids.contains(&r.target_id))
                    || (b.entity_ids.contains(&r.source_id) && a.entity_ids.contains(&r.target_id))
            });

            if connected {
                links.push(NodeLink {
                    source_node_id: a.id.clone(),
                    target_node_id: b.id.clone(),
                });
                links.push(NodeLink {
                    source_node_id: b.id.clone(),
                    target_node_id: a.id.clone(),
                });
            }
        }
    }

    links
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use stratbuilder_shared::{BrandConfig, BusinessGoal, SourceMode};

    fn seed_config(seeds: &[&str]) -> BrandConfig {
        BrandConfig {
            brand_name: "Acme".into(),
            primary_niche: "widgets".into(),
            business_goals: vec![BusinessGoal::BrandAwareness],
            source_mode: SourceMode::Seed,
            sitemap_url: None,
            seed_entities: seeds.iter().map(|s| s.to_string()).collect(),
            competitors: vec![],
            target_regions: vec!["US".into()],
        }
    }

    fn build_ontology(seeds: &[&str]) -> Ontology {
        crate::ontology::build(&seed_config(seeds), &[]).expect("ontology")
    }

    #[test]
    fn empty_ontology_is_an_error() {
        let ontology = Ontology {
            brand_name: "Acme".into(),
            entities: vec![],
            relationships: vec![],
        };
        let err = build(&ontology).unwrap_err();
        assert!(matches!(err, StratBuilderError::EmptyOntology));
    }

    #[test]
    fn one_root_per_entity_type_present() {
        let mut config = seed_config(&["Widgets", "Gadgets"]);
        config.competitors = vec!["Rivalcorp".into()];
        let ontology = crate::ontology::build(&config, &[]).expect("ontology");

        let taxonomy = build(&ontology).expect("taxonomy");
        let labels: Vec<&str> = taxonomy.roots().map(|n| n.label.as_str()).collect();
        assert_eq!(labels, vec!["Core Topics", "Competitors"]);
    }

    #[test]
    fn every_entity_lands_in_exactly_one_node() {
        let ontology = build_ontology(&["Email Marketing", "Email Automation", "Newsletters"]);
        let taxonomy = build(&ontology).expect("taxonomy");

        for entity in &ontology.entities {
            let homes = taxonomy
                .nodes
                .iter()
                .filter(|n| n.entity_ids.contains(&entity.id))
                .count();
            assert_eq!(homes, 1, "entity {} in {homes} nodes", entity.name);
        }
    }

    #[test]
    fn oversized_root_splits_by_dominant_relation() {
        // Seven core seeds; the four sharing "email" form a relates_to
        // group and move to the child, the unrelated three stay put
        let ontology = build_ontology(&[
            "Email Marketing",
            "Email Automation",
            "Email Templates",
            "Email Deliverability",
            "Gizmos",
            "Doohickeys",
            "Whatsits",
        ]);
        let taxonomy = build(&ontology).expect("taxonomy");

        let child = taxonomy
            .nodes
            .iter()
            .find(|n| n.parent_id.is_some())
            .expect("child node");
        assert_eq!(child.label, "Core Topics (Related Concepts)");

        let root = taxonomy.node(child.parent_id.as_deref().unwrap()).unwrap();
        assert_eq!(root.label, "Core Topics");
        // Exclusive membership after the split
        for id in &child.entity_ids {
            assert!(!root.entity_ids.contains(id));
        }
    }

    #[test]
    fn small_root_is_not_split() {
        let ontology = build_ontology(&["Widgets", "Gadgets", "Gizmos"]);
        let taxonomy = build(&ontology).expect("taxonomy");
        assert!(taxonomy.nodes.iter().all(|n| n.parent_id.is_none()));
    }

    #[test]
    fn facet_tags_band_mean_commercial_value() {
        // Seeds get commercial value 0.8, well into the high band
        let ontology = build_ontology(&["Widgets", "Gadgets"]);
        let taxonomy = build(&ontology).expect("taxonomy");
        assert!(taxonomy.nodes[0].facet_tags.contains(&"high".to_string()));
    }

    #[test]
    fn facet_vocabulary_is_declared() {
        let ontology = build_ontology(&["Widgets"]);
        let taxonomy = build(&ontology).expect("taxonomy");
        assert!(taxonomy.facets.contains_key("commercial_value"));
        assert!(taxonomy.facets.contains_key("alias_richness"));
    }

    #[test]
    fn connected_sibling_roots_link_both_ways() {
        let mut config = seed_config(&["Widget Platform"]);
        config.competitors = vec!["Rival Widget Co".into()];
        let ontology = crate::ontology::build(&config, &[]).expect("ontology");
        let taxonomy = build(&ontology).expect("taxonomy");

        assert_eq!(taxonomy.links.len(), 2);
        assert_eq!(taxonomy.links[0].source_node_id, taxonomy.links[1].target_node_id);
        assert_eq!(taxonomy.links[0].target_node_id, taxonomy.links[1].source_node_id);
    }

    #[test]
    fn determinism_across_runs() {
        let ontology = build_ontology(&["Email Marketing", "Email Automation", "Newsletters"]);
        let a = build(&ontology).expect("first");
        let b = build(&ontology).expect("second");
        assert_eq!(a, b);
    }
}
