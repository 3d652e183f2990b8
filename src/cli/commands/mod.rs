//! CLI command implementations

pub mod compare;
pub mod completions;
pub mod contrib;
pub mod det;
pub mod layers;
pub mod run;
