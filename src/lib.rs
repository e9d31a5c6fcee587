//! Decompiles CIL delegate bodies into expression trees.
//!
//! A [`Delegate`](metadata::Delegate) carries the method to decompile. Its IL
//! is decoded by [`reader::read`], which drives an
//! [`InstructionSink`](reader::InstructionSink); the
//! [`DecompilationContext`](decompile::DecompilationContext) sink executes the
//! instructions symbolically and produces a lambda [`Expr`](expr::Expr). The
//! passes in [`passes`] then lift accessor calls into properties, indexers,
//! operators and event subscriptions, and fold constant field reads.
//!
//! ```rust
//! use il_decompiler::metadata::*;
//! use il_decompiler::{decompile, MetadataTable};
//!
//! // static int Twice(int x) => x + x;
//! let method = MethodDef {
//!     name: "Twice".into(),
//!     declaring_type: ClrType::Object,
//!     parameters: vec![ParameterInfo::new("x", ClrType::Int32)],
//!     return_type: ClrType::Int32,
//!     attributes: MethodAttributes::STATIC,
//!     body: MethodBody {
//!         il: vec![0x02, 0x02, 0x58, 0x2a],
//!         max_stack: 2,
//!         ..Default::default()
//!     },
//! };
//! let func = ClassInfo::new("Func`2", TypeKind::Delegate).into_type();
//! let tree = decompile(&Delegate::new(func, method), &MetadataTable::new()).unwrap();
//! assert_eq!(tree.to_string(), "x => (x + x)");
//! ```

#[macro_use]
extern crate bitflags;

pub mod decompile;
pub mod error;
pub mod expr;
pub mod metadata;
pub mod opcode;
pub mod passes;
pub mod reader;
pub mod stack;

pub use decompile::{decompile, decompile_with_options, DecompileOptions};
pub use error::{DecompileError, DecompileResult};
pub use metadata::MetadataTable;
