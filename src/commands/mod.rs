// Lifecycle commands
pub mod apply;
pub mod import;
pub mod plan;
pub mod refresh;

// Inspection commands
pub mod render;
pub mod schema;
pub mod show;
pub mod validate;
