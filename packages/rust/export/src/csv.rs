//! CSV rendering: flat per-collection files for spreadsheet analysis.

use std::fmt::Write;

use stratbuilder_shared::FrameworkOutput;

use crate::ExportFile;

/// Render the CSV export set: entities, relationships, queries, and hub
/// pages, one file each.
pub fn csv_exports(output: &FrameworkOutput) -> Vec<ExportFile> {
    vec![
        ExportFile {
            filename: "entities.csv".to_string(),
            content: entities_csv(output),
        },
        ExportFile {
            filename: "relationships.csv".to_string(),
            content: relationships_csv(output),
        },
        ExportFile {
            filename: "queries.csv".to_string(),
            content: queries_csv(output),
        },
        ExportFile {
            filename: "content_hubs.csv".to_string(),
            content: hubs_csv(output),
        },
    ]
}

fn entities_csv(output: &FrameworkOutput) -> String {
    let mut csv = String::from("id,name,type,centrality,commercial_value,aliases\n");
    for e in &output.ontology.entities {
        let _ = writeln!(
            csv,
            "{},{},{},{:.3},{:.3},{}",
            escape(&e.id),
            escape(&e.name),
            escape(&format!("{:?}", e.entity_type).to_lowercase()),
            e.centrality,
            e.commercial_value,
            escape(&e.aliases.join("; "))
        );
    }
    csv
}

fn relationships_csv(output: &FrameworkOutput) -> String {
    let mut csv = String::from("source_id,target_id,relation,weight,bidirectional\n");
    for r in &output.ontology.relationships {
        let _ = writeln!(
            csv,
            "{},{},{},{:.2},{}",
            escape(&r.source_id),
            escape(&r.target_id),
            escape(&serde_variant_name(r.relation)),
            r.weight,
            r.bidirectional
        );
    }
    csv
}

fn queries_csv(output: &FrameworkOutput) -> String {
    let mut csv = String::from("id,text,entity_id,intent,priority,fanout_pattern,serp_feature\n");
    for q in output.queries() {
        let _ = writeln!(
            csv,
            "{},{},{},{},{},{},{}",
            escape(&q.id),
            escape(&q.text),
            escape(&q.entity_id),
            q.intent.key(),
            escape(&format!("{:?}", q.priority).to_lowercase()),
            escape(&q.fanout_pattern),
            escape(q.estimated_serp_feature.as_deref().unwrap_or(""))
        );
    }
    csv
}

fn hubs_csv(output: &FrameworkOutput) -> String {
    let mut csv =
        String::from("hub_id,hub_name,page_id,title,role,format,priority,linked_queries\n");
    for hub in &output.hubs {
        for page in std::iter::once(&hub.pillar).chain(hub.clusters.iter()) {
            let _ = writeln!(
                csv,
                "{},{},{},{},{:?},{},{},{}",
                escape(&hub.id),
                escape(&hub.name),
                escape(&page.id),
                escape(&page.title),
                page.role,
                escape(&page.recommended_format),
                escape(&format!("{:?}", page.priority).to_lowercase()),
                page.linked_query_ids.len()
            );
        }
    }
    csv
}

/// snake_case name of a relation variant, matching the JSON export.
fn serde_variant_name(relation: stratbuilder_shared::RelationType) -> String {
    // serde_json wraps the name in quotes; strip them
    serde_json::to_string(&relation)
        .unwrap_or_default()
        .trim_matches('"')
        .to_string()
}

/// Quote a CSV field when it contains a comma, quote, or newline.
fn escape(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
