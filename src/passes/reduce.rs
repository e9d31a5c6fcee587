use crate::expr::{EventAccessorCall, ExprFolder, ExprRef};

/// Replaces event subscriptions with calls to their add/remove accessors.
#[derive(Clone, Copy, Debug, Default)]
pub struct ExtensionReducer;

impl ExtensionReducer {
    fn reduce(&mut self, expr: &ExprRef) -> ExprRef {
        let folded = self.super_fold_expr(expr);
        folded.reduce().unwrap_or(folded)
    }
}

impl ExprFolder for ExtensionReducer {
    fn fold_event_subscribe(&mut self, expr: &ExprRef, _call: &EventAccessorCall) -> ExprRef {
        self.reduce(expr)
    }

    fn fold_event_unsubscribe(&mut self, expr: &ExprRef, _call: &EventAccessorCall) -> ExprRef {
        self.reduce(expr)
    }
}

/// Runs [`ExtensionReducer`] over `expr`.
pub fn reduce_extensions(expr: &ExprRef) -> ExprRef {
    ExtensionReducer.fold_expr(expr)
}
