//! Type model, symbol references and token resolution.

mod table;
mod types;

pub use table::MetadataTable;
pub use types::*;

use std::sync::Arc;

use crate::opcode::Token;

/// Resolves metadata tokens found in IL to the symbols they denote.
///
/// Implementations must be deterministic and free of side effects; a `None`
/// answer aborts decoding.
pub trait MetadataResolver {
    fn resolve_method(&self, token: Token) -> Option<Arc<MethodRef>>;
    fn resolve_constructor(&self, token: Token) -> Option<Arc<ConstructorRef>>;
    fn resolve_field(&self, token: Token) -> Option<Arc<FieldRef>>;
    fn resolve_type(&self, token: Token) -> Option<ClrType>;
    fn resolve_string(&self, token: Token) -> Option<Arc<str>>;
}
