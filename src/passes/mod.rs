//! Tree-to-tree rewrite passes run after decoding.

mod partial_eval;
mod reduce;
mod special_names;

pub use partial_eval::{partial_evaluate, PartialEvaluator};
pub use reduce::{reduce_extensions, ExtensionReducer};
pub use special_names::{replace_special_names, SpecialNameMethodReplacer};
