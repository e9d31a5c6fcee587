use std::collections::HashMap;
use std::sync::Arc;

use crate::opcode::Token;

use super::{ClrType, ConstructorRef, FieldRef, MetadataResolver, MethodRef};

#[derive(Clone, Debug)]
enum Symbol {
    Method(Arc<MethodRef>),
    Constructor(Arc<ConstructorRef>),
    Field(Arc<FieldRef>),
    Type(ClrType),
    String(Arc<str>),
}

/// An in-memory token table.
///
/// A token answers only the kind of lookup it was registered for: a field
/// token resolved as a method is unresolved.
#[derive(Clone, Debug, Default)]
pub struct MetadataTable {
    symbols: HashMap<Token, Symbol>,
}

impl MetadataTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_method(mut self, token: u32, method: MethodRef) -> Self {
        self.symbols
            .insert(Token(token), Symbol::Method(Arc::new(method)));
        self
    }

    pub fn with_constructor(mut self, token: u32, constructor: ConstructorRef) -> Self {
        self.symbols
            .insert(Token(token), Symbol::Constructor(Arc::new(constructor)));
        self
    }

    pub fn with_field(mut self, token: u32, field: FieldRef) -> Self {
        self.symbols.insert(Token(token), Symbol::Field(Arc::new(field)));
        self
    }

    pub fn with_type(mut self, token: u32, ty: ClrType) -> Self {
        self.symbols.insert(Token(token), Symbol::Type(ty));
        self
    }

    pub fn with_string(mut self, token: u32, value: &str) -> Self {
        self.symbols
            .insert(Token(token), Symbol::String(Arc::from(value)));
        self
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

impl MetadataResolver for MetadataTable {
    fn resolve_method(&self, token: Token) -> Option<Arc<MethodRef>> {
        match self.symbols.get(&token)? {
            Symbol::Method(m) => Some(m.clone()),
            _ => None,
        }
    }

    fn resolve_constructor(&self, token: Token) -> Option<Arc<ConstructorRef>> {
        match self.symbols.get(&token)? {
            Symbol::Constructor(c) => Some(c.clone()),
            _ => None,
        }
    }

    fn resolve_field(&self, token: Token) -> Option<Arc<FieldRef>> {
        match self.symbols.get(&token)? {
            Symbol::Field(f) => Some(f.clone()),
            _ => None,
        }
    }

    fn resolve_type(&self, token: Token) -> Option<ClrType> {
        match self.symbols.get(&token)? {
            Symbol::Type(t) => Some(t.clone()),
            _ => None,
        }
    }

    fn resolve_string(&self, token: Token) -> Option<Arc<str>> {
        match self.symbols.get(&token)? {
            Symbol::String(s) => Some(s.clone()),
            _ => None,
        }
    }
}
