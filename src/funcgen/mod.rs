//! Procedural function/derivative generation
//!
//! A `FunctionRecord` bundles a closed-form expression with its display metadata.
//! Expressions are plain coefficient data, not closures: `f`, `f'` and `f''` are
//! evaluated by dispatching on the family tag, so every record is serializable
//! and analytically self-consistent by construction.

pub mod catalog;
pub mod expr;
pub mod record;
pub mod synth;

pub use catalog::{CATALOG_LEN, catalog};
pub use expr::{Expr, Waveform};
pub use record::FunctionRecord;
pub use synth::{Family, FunctionGenerator, GenerateError};
