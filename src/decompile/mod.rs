//! Delegate decompilation: symbolic execution followed by the rewrite passes.

mod context;

pub use context::DecompilationContext;

use tracing::debug;

use crate::error::DecompileResult;
use crate::expr::ExprRef;
use crate::metadata::{Delegate, MetadataResolver};
use crate::passes;
use crate::reader;

/// Options controlling which rewrite passes run after decoding.
#[derive(Clone, Debug)]
pub struct DecompileOptions {
    /// Turn accessor and operator calls into properties, indexers, comparisons
    /// and event subscriptions.
    pub special_names: bool,
    /// Fold field reads on constant objects.
    pub partial_evaluation: bool,
    /// Replace event subscriptions by calls to their accessors.
    pub reduce_extensions: bool,
}

impl Default for DecompileOptions {
    fn default() -> Self {
        Self {
            special_names: true,
            partial_evaluation: true,
            reduce_extensions: false,
        }
    }
}

/// Decompiles a delegate's method body into a lambda without running any
/// rewrite pass.
pub fn decompile(delegate: &Delegate, resolver: &dyn MetadataResolver) -> DecompileResult<ExprRef> {
    let mut context = DecompilationContext::new(delegate);
    reader::read(&delegate.method.body.il, resolver, &mut context)?;
    let tree = context.into_result()?;
    debug!(method = %delegate.method.name, %tree, "decompiled method body");
    Ok(tree)
}

/// Decompiles a delegate and runs the passes enabled in `options`, in the
/// order accessor recognition, constant folding, extension reduction.
pub fn decompile_with_options(
    delegate: &Delegate,
    resolver: &dyn MetadataResolver,
    options: &DecompileOptions,
) -> DecompileResult<ExprRef> {
    let mut tree = decompile(delegate, resolver)?;
    if options.special_names {
        tree = passes::replace_special_names(&tree);
    }
    if options.partial_evaluation {
        tree = passes::partial_evaluate(&tree);
    }
    if options.reduce_extensions {
        tree = passes::reduce_extensions(&tree);
    }
    Ok(tree)
}
