//! Directive resolution engine.
//!
//! Every command-line argument runs through the same pipeline, one file at a
//! time, before the results are partitioned and linearized:
//!
//! ```text
//! arg ── template token? ──yes──▶ template.rs (glob roots) ──▶ Entry::Template
//!         │ no
//!         v
//!       gate::accept            directory / missing / '[' / suffix / datatype
//!         │ Accept
//!         v
//!       rule_table::resolve     static options, all matching rules
//!         v
//!       intensity::compute_ranges   -dr from the image's own maximum
//!         v
//!       naming::resolve_names   -n, only when a static rule matched
//!         v
//!       Entry::Resolved { path, directive }
//!
//! entries ── partition::partition ──▶ Partition { matched, unmatched }
//!                                        │
//!                                        v
//!                           linearize::linearize(viewer) ──▶ Invocation
//! ```
//!
//! ## Responsibilities by module
//!
//! - `gate.rs`: input probing, fatal/skip classification, datatype allow-list.
//! - `rule_table.rs`: static pattern → options table.
//! - `intensity.rs`: data-driven display ranges.
//! - `naming.rs`: overlay names, including the parent-directory sentinel.
//! - `partition.rs`: matched/unmatched split (substring or exact mode).
//! - `linearize.rs`: final argv order.
//! - `pipeline.rs`: drives the above for a batch of arguments.
//!
//! ## Debugging
//!
//! Run with `FSLEYES_PRESET_LOG=fsleyes_preset=debug` to trace which rules
//! fired for every file.

#[path = "engine/gate.rs"]
mod gate;
#[path = "engine/intensity.rs"]
mod intensity;
#[path = "engine/linearize.rs"]
mod linearize;
#[path = "engine/naming.rs"]
mod naming;
#[path = "engine/partition.rs"]
mod partition;
#[path = "engine/pipeline.rs"]
mod pipeline;
#[path = "engine/rule_table.rs"]
mod rule_table;

#[allow(unused_imports)]
pub use gate::{InputFile, SkipReason, Verdict, VoxelTypes, is_nifti_name};
pub use linearize::{Invocation, linearize};
#[allow(unused_imports)]
pub use partition::{Entry, Partition};
pub use pipeline::{FileReport, Outcome, Pipeline};
