use tracing::debug;

use crate::expr::{Expr, ExprFolder, ExprRef};
use crate::metadata::Value;

/// Folds reads of fields on constant objects into constants.
///
/// Only [`Expr::FieldAccess`] over a constant [`Value::Object`] is folded;
/// properties, static fields and fields the object does not carry are left
/// alone.
#[derive(Clone, Copy, Debug, Default)]
pub struct PartialEvaluator;

impl ExprFolder for PartialEvaluator {
    fn fold_field_access(&mut self, expr: &ExprRef) -> ExprRef {
        let folded = self.super_fold_expr(expr);
        match constant_field(&folded) {
            Some(constant) => {
                debug!(from = %folded, to = %constant, "folded constant field read");
                constant
            }
            None => folded,
        }
    }
}

fn constant_field(expr: &Expr) -> Option<ExprRef> {
    let Expr::FieldAccess {
        instance: Some(instance),
        field,
    } = expr
    else {
        return None;
    };
    let Expr::Constant {
        value: Value::Object(object),
        ..
    } = &**instance
    else {
        return None;
    };
    let value = object.field(&field.name)?;
    Some(Expr::constant(value.clone(), field.field_type.clone()))
}

/// Runs [`PartialEvaluator`] over `expr`.
pub fn partial_evaluate(expr: &ExprRef) -> ExprRef {
    PartialEvaluator.fold_expr(expr)
}
