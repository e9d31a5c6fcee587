use thiserror::Error;

use crate::opcode::Token;

/// What a metadata token was expected to resolve to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenKind {
    Method,
    Constructor,
    Field,
    Type,
    String,
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            TokenKind::Method => "method",
            TokenKind::Constructor => "constructor",
            TokenKind::Field => "field",
            TokenKind::Type => "type",
            TokenKind::String => "string",
        };
        f.write_str(name)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum StackError {
    #[error("stack underflow: requested {requested} value(s) with depth {depth}")]
    Underflow { requested: usize, depth: usize },
    #[error("stack overflow: capacity {capacity} exceeded")]
    Overflow { capacity: usize },
}

/// Rejected construction of an event subscribe/unsubscribe node.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum AccessorError {
    #[error("event `{event}` is declared on `{declaring_type}`, not on instance type `{instance_type}`")]
    EventNotDeclaredOnInstanceType {
        event: String,
        declaring_type: String,
        instance_type: String,
    },
    #[error("handler of type `{handler_type}` is not a delegate")]
    HandlerNotDelegate { handler_type: String },
}

#[derive(Clone, Debug, PartialEq, Error)]
pub enum DecompileError {
    #[error("unsupported instruction 0x{opcode:02x} at IL_{offset:04x}")]
    UnsupportedInstruction { offset: usize, opcode: u16 },
    #[error("instruction 0x{opcode:02x} at IL_{offset:04x} is truncated")]
    TruncatedInstruction { offset: usize, opcode: u16 },
    #[error("method body ended at IL_{offset:04x} without a ret instruction")]
    MissingReturn { offset: usize },
    #[error("cannot resolve {kind} token {token} at IL_{offset:04x}")]
    UnresolvedToken {
        offset: usize,
        token: Token,
        kind: TokenKind,
    },
    #[error("at IL_{offset:04x}: {source}")]
    Stack {
        offset: usize,
        #[source]
        source: StackError,
    },
    #[error("local variable {index} is read before it is assigned")]
    UnsetLocal { index: usize },
    #[error("local variable index {index} is out of range")]
    LocalOutOfRange { index: usize },
    #[error("argument index {index} is out of range")]
    ArgumentOutOfRange { index: usize },
    #[error("invalid operand: {message}")]
    InvalidOperand { message: String },
    #[error(transparent)]
    Accessor(#[from] AccessorError),
}

pub type DecompileResult<T> = Result<T, DecompileError>;
