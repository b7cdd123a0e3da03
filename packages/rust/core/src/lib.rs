//! The StratBuilder strategy engine.
//!
//! Each stage of the pipeline lives in its own module and is a pure
//! function over the previous stage's output:
//!
//! 1. [`ontology`] — entities and inferred relationships
//! 2. [`expansion`] — aliases, centrality, commercial value
//! 3. [`taxonomy`] — the typed topic forest with facets and links
//! 4. [`queries`] — fan-out query generation and clustering
//! 5. [`hubs`] — pillar/cluster hub design with coverage scoring
//! 6. [`specs`] — personas and per-page content specifications
//! 7. [`measurement`] — KPIs, monitoring queries, audit prompts
//!
//! [`pipeline`] orchestrates the stages and [`integrity`] validates the
//! assembled document before anyone sees it.

pub mod expansion;
pub mod hubs;
pub mod integrity;
pub mod measurement;
pub mod ontology;
pub mod pipeline;
pub mod queries;
pub mod specs;
pub mod taxonomy;

pub use pipeline::{PipelineOptions, SilentProgress, StageReporter, assemble, run};
