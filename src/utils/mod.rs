// Utility modules shared across the engine.

pub mod alias_generator;
pub use alias_generator::AliasGenerator;

pub mod string_utils;
pub use string_utils::{
    join_columns, qualify, qualify_all, split_columns, strip_outer_parens, strip_where_prefix,
    unqualify,
};

pub mod logging;
