//! Resolved IDL type graph
//!
//! This crate holds the immutable, fully linked schema graph that the code
//! generator consumes: structs, unions, exceptions, enums, typedefs, constants
//! and services, with every cross-file reference already bound to an arena id.
//! It performs no generation of its own.

pub mod builder;
pub mod constant;
pub mod program;
pub mod types;

// Re-export commonly used types at the crate root
pub use builder::ProgramBuilder;
pub use constant::*;
pub use program::{GraphError, Program};
pub use types::*;
