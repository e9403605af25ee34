//! Dependency DAG planner for the docket issue tracker.
//!
//! Pure functions over issues and relations: the canonical blocker graph,
//! phased topological sorting, execution plan generation, work-ready
//! discovery, file-collision sub-phasing, and scoped graph traversal.
//! No I/O; the storage layer supplies the inputs.

pub mod collide;
pub mod error;
pub mod graph;
pub mod plan;
pub mod ready;
pub mod topo;
pub mod traverse;

pub use collide::split_file_collisions;
pub use error::PlanError;
pub use graph::Dag;
pub use plan::{Phase, Plan, PlanFilter, generate_plan};
pub use ready::{DEFAULT_READY_STATUSES, find_ready};
pub use topo::topo_phases;
pub use traverse::{Direction, GraphNode, traverse};
