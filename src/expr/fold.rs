use std::sync::Arc;

use tracing::warn;

use super::event::EventAccessorCall;
use super::types::{Expr, ExprRef};

/// Trait for rewriting expression trees.
///
/// `fold_expr` dispatches on the node kind to one of the `fold_*` hooks; each
/// hook defaults to [`ExprFolder::super_fold_expr`], which folds the children
/// and rebuilds the node only if some child changed. Unchanged subtrees are
/// returned as the same [`ExprRef`].
///
/// Event subscribe/unsubscribe nodes have their own hooks so folders that
/// understand events can intercept them; folders that do not simply recurse
/// into their operands.
pub trait ExprFolder {
    fn fold_expr(&mut self, expr: &ExprRef) -> ExprRef {
        match &**expr {
            Expr::Call { .. } => self.fold_call(expr),
            Expr::FieldAccess { .. } => self.fold_field_access(expr),
            Expr::EventSubscribe(call) => self.fold_event_subscribe(expr, call),
            Expr::EventUnsubscribe(call) => self.fold_event_unsubscribe(expr, call),
            _ => self.super_fold_expr(expr),
        }
    }

    fn fold_call(&mut self, expr: &ExprRef) -> ExprRef {
        self.super_fold_expr(expr)
    }

    fn fold_field_access(&mut self, expr: &ExprRef) -> ExprRef {
        self.super_fold_expr(expr)
    }

    fn fold_event_subscribe(&mut self, expr: &ExprRef, _call: &EventAccessorCall) -> ExprRef {
        self.super_fold_expr(expr)
    }

    fn fold_event_unsubscribe(&mut self, expr: &ExprRef, _call: &EventAccessorCall) -> ExprRef {
        self.super_fold_expr(expr)
    }

    /// Default recursion into child nodes.
    ///
    /// Override the `fold_*` hooks instead of this method.
    fn super_fold_expr(&mut self, expr: &ExprRef) -> ExprRef {
        match &**expr {
            Expr::Constant { .. } | Expr::Parameter(_) => expr.clone(),

            Expr::FieldAccess { instance, field } => match fold_opt(self, instance) {
                Some(instance) => Arc::new(Expr::FieldAccess {
                    instance,
                    field: field.clone(),
                }),
                None => expr.clone(),
            },

            Expr::Binary {
                op,
                left,
                right,
                ty,
            } => {
                let new_left = self.fold_expr(left);
                let new_right = self.fold_expr(right);
                if Arc::ptr_eq(left, &new_left) && Arc::ptr_eq(right, &new_right) {
                    return expr.clone();
                }
                Arc::new(Expr::Binary {
                    op: *op,
                    left: new_left,
                    right: new_right,
                    ty: ty.clone(),
                })
            }

            Expr::Unary { op, operand, ty } => {
                let new_operand = self.fold_expr(operand);
                if Arc::ptr_eq(operand, &new_operand) {
                    return expr.clone();
                }
                Expr::unary(*op, new_operand, ty.clone())
            }

            Expr::Call {
                instance,
                method,
                arguments,
            } => {
                let new_instance = fold_opt(self, instance);
                let new_arguments = fold_list(self, arguments);
                if new_instance.is_none() && new_arguments.is_none() {
                    return expr.clone();
                }
                Expr::call(
                    new_instance.unwrap_or_else(|| instance.clone()),
                    method.clone(),
                    new_arguments.unwrap_or_else(|| arguments.clone()),
                )
            }

            Expr::New {
                constructor,
                arguments,
            } => match fold_list(self, arguments) {
                Some(arguments) => Expr::new_object(constructor.clone(), arguments),
                None => expr.clone(),
            },

            Expr::NewArray {
                element_type,
                length,
            } => {
                let new_length = self.fold_expr(length);
                if Arc::ptr_eq(length, &new_length) {
                    return expr.clone();
                }
                Expr::new_array(element_type.clone(), new_length)
            }

            Expr::ArrayIndex { array, index, ty } => {
                let new_array = self.fold_expr(array);
                let new_index = self.fold_expr(index);
                if Arc::ptr_eq(array, &new_array) && Arc::ptr_eq(index, &new_index) {
                    return expr.clone();
                }
                Expr::array_index(new_array, new_index, ty.clone())
            }

            Expr::Lambda {
                parameters,
                body,
                ty,
            } => {
                let new_body = self.fold_expr(body);
                if Arc::ptr_eq(body, &new_body) {
                    return expr.clone();
                }
                Expr::lambda(parameters.clone(), new_body, ty.clone())
            }

            Expr::PropertyAccess {
                instance,
                declaring_type,
                name,
                ty,
            } => match fold_opt(self, instance) {
                Some(instance) => Arc::new(Expr::PropertyAccess {
                    instance,
                    declaring_type: declaring_type.clone(),
                    name: name.clone(),
                    ty: ty.clone(),
                }),
                None => expr.clone(),
            },

            Expr::IndexerAccess {
                instance,
                declaring_type,
                name,
                arguments,
                ty,
            } => {
                let new_instance = self.fold_expr(instance);
                let new_arguments = fold_list(self, arguments);
                if Arc::ptr_eq(instance, &new_instance) && new_arguments.is_none() {
                    return expr.clone();
                }
                Expr::indexer(
                    new_instance,
                    declaring_type.clone(),
                    name.clone(),
                    new_arguments.unwrap_or_else(|| arguments.clone()),
                    ty.clone(),
                )
            }

            Expr::Assign { target, value } => {
                let new_target = self.fold_expr(target);
                let new_value = self.fold_expr(value);
                if Arc::ptr_eq(target, &new_target) && Arc::ptr_eq(value, &new_value) {
                    return expr.clone();
                }
                Expr::assign(new_target, new_value)
            }

            Expr::EventSubscribe(call) => fold_event(self, expr, call, true),

            Expr::EventUnsubscribe(call) => fold_event(self, expr, call, false),
        }
    }
}

/// Folds an optional child. Returns `None` when nothing changed.
fn fold_opt<F: ExprFolder + ?Sized>(folder: &mut F, expr: &Option<ExprRef>) -> Option<Option<ExprRef>> {
    let expr = expr.as_ref()?;
    let folded = folder.fold_expr(expr);
    if Arc::ptr_eq(expr, &folded) {
        None
    } else {
        Some(Some(folded))
    }
}

/// Folds every element of a list. Returns `None` when nothing changed.
fn fold_list<F: ExprFolder + ?Sized>(folder: &mut F, exprs: &[ExprRef]) -> Option<Vec<ExprRef>> {
    let folded: Vec<ExprRef> = exprs.iter().map(|e| folder.fold_expr(e)).collect();
    let changed = exprs.iter().zip(&folded).any(|(old, new)| !Arc::ptr_eq(old, new));
    changed.then_some(folded)
}

/// Folds the operands of an event node and rebuilds it through the checked
/// constructor. Operands that no longer satisfy the checks fall back to the
/// plain accessor call.
fn fold_event<F: ExprFolder + ?Sized>(
    folder: &mut F,
    expr: &ExprRef,
    call: &EventAccessorCall,
    subscribe: bool,
) -> ExprRef {
    let instance = folder.fold_expr(call.instance());
    let handler = folder.fold_expr(call.handler());
    if Arc::ptr_eq(call.instance(), &instance) && Arc::ptr_eq(call.handler(), &handler) {
        return expr.clone();
    }

    let event = call.event().clone();
    let rebuilt = if subscribe {
        Expr::subscribe(instance.clone(), event.clone(), handler.clone())
    } else {
        Expr::unsubscribe(instance.clone(), event.clone(), handler.clone())
    };
    rebuilt.unwrap_or_else(|error| {
        warn!(%error, event = %event.name, "rewritten operands no longer form an event node, keeping call");
        let accessor = if subscribe {
            &event.add_method
        } else {
            &event.remove_method
        };
        Expr::call(Some(instance), accessor.clone(), vec![handler])
    })
}
