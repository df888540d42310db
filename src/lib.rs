pub mod cli;

pub mod detector;
pub mod error;
pub mod generator;
pub mod merger;
pub mod naming;
pub mod schema;
pub mod templates;
pub mod writer;

pub use error::GenError;
pub use merger::{
    classify_file, strategy_of, Conflict, ConflictKind, DecisionProvider, FileKind, MergeDecision,
    MergeEngine, MergeStrategy, Resolution,
};
pub use schema::{load_schema, Schema};
pub use writer::{FileOperation, OperationKind, Writer};
