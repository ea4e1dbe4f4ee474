// ABOUTME: SQL dump generation for schema and row data
// ABOUTME: Literal rendering, CREATE block rewriting and batched INSERT output

pub mod literal;
pub mod rows;
pub mod schema;

pub use rows::{emit_data, DataOptions, InsertBatcher, BATCH_LIMIT};
pub use schema::{emit_schema, reset_auto_increment};
