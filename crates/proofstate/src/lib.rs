//! Proof-state data model and preprocessing.
//!
//! Provides the AST and goal/context types consumed by the `gast` network,
//! the s-expression term parser with its parse cache, the read-only
//! symbolic-expression cache, fixed-length context padding, state hashing,
//! and dataset split enumeration.

pub mod cache;
pub mod dataset;
pub mod parser;
pub mod process;
pub mod tactic;
pub mod types;

pub use cache::SexpCache;
pub use dataset::{files_on_split, load_sample, SplitFiles};
pub use parser::TermParser;
pub use process::{
    pad_global_context, pad_local_context, process_global_context, process_local_env, state_id,
    GLOBAL_CONTEXT_LEN, LOCAL_CONTEXT_LEN,
};
pub use types::{Ast, ContextEntry, Goal, RawSample, RawState};
