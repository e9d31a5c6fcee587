use std::sync::Arc;

use tracing::{debug, warn};

use crate::expr::{BinaryOp, Expr, ExprFolder, ExprRef};
use crate::metadata::MethodRef;

/// Rewrites calls to compiler-generated special-name methods into the
/// constructs they implement:
///
/// | call                         | becomes                 |
/// |------------------------------|-------------------------|
/// | `op_Equality(a, b)`          | `a == b`                |
/// | `op_Inequality(a, b)`        | `a != b`                |
/// | `r.get_Name()`               | `r.Name`                |
/// | `r.get_Item(i)`              | `r[i]` (default member) |
/// | `r.set_Name(v)`              | `r.Name = v`            |
/// | `r.set_Item(i, v)`           | `r[i] = v`              |
/// | `r.add_Event(h)`             | `r.Event += h`          |
/// | `r.remove_Event(h)`          | `r.Event -= h`          |
///
/// Calls without the special-name attribute are never rewritten, only their
/// operands are.
#[derive(Clone, Copy, Debug, Default)]
pub struct SpecialNameMethodReplacer;

impl ExprFolder for SpecialNameMethodReplacer {
    fn fold_call(&mut self, expr: &ExprRef) -> ExprRef {
        let folded = self.super_fold_expr(expr);
        match replace(&folded) {
            Some(replacement) => {
                debug!(from = %folded, to = %replacement, "replaced special-name call");
                replacement
            }
            None => folded,
        }
    }
}

fn replace(expr: &Expr) -> Option<ExprRef> {
    let Expr::Call {
        instance,
        method,
        arguments,
    } = expr
    else {
        return None;
    };
    if !method.is_special_name() {
        return None;
    }

    let name = method.name.as_str();
    if name.starts_with("op_Equality") {
        comparison(BinaryOp::Equal, arguments)
    } else if name.starts_with("op_Inequality") {
        comparison(BinaryOp::NotEqual, arguments)
    } else if let Some(property) = name.strip_prefix("get_") {
        getter(instance.as_ref(), method, property, arguments)
    } else if let Some(property) = name.strip_prefix("set_") {
        setter(instance.as_ref(), method, property, arguments)
    } else if let Some(event) = name.strip_prefix("add_") {
        event_accessor(instance.as_ref(), event, arguments, true)
    } else if let Some(event) = name.strip_prefix("remove_") {
        event_accessor(instance.as_ref(), event, arguments, false)
    } else {
        None
    }
}

fn comparison(op: BinaryOp, arguments: &[ExprRef]) -> Option<ExprRef> {
    match arguments {
        [left, right] => Some(Expr::binary(op, left.clone(), right.clone())),
        _ => None,
    }
}

/// Whether `name` is the default indexed member of the receiver's type.
fn is_default_member(instance: Option<&ExprRef>, name: &str) -> bool {
    let Some(instance) = instance else {
        return false;
    };
    let ty = instance.ty();
    ty.class_info()
        .and_then(|info| info.default_member.as_deref())
        .is_some_and(|member| member == name)
}

fn getter(
    instance: Option<&ExprRef>,
    method: &Arc<MethodRef>,
    name: &str,
    arguments: &[ExprRef],
) -> Option<ExprRef> {
    if arguments.is_empty() {
        return Some(Expr::property(
            instance.cloned(),
            method.declaring_type.clone(),
            name,
            method.return_type.clone(),
        ));
    }
    match instance {
        Some(receiver) if is_default_member(instance, name) => Some(Expr::indexer(
            receiver.clone(),
            method.declaring_type.clone(),
            name,
            arguments.to_vec(),
            method.return_type.clone(),
        )),
        _ => {
            warn!(property = name, "indexed accessor is not the default member, keeping call");
            None
        }
    }
}

fn setter(instance: Option<&ExprRef>, method: &Arc<MethodRef>, name: &str, arguments: &[ExprRef]) -> Option<ExprRef> {
    let (value, indices) = arguments.split_last()?;
    let ty = method
        .parameters
        .last()
        .map_or_else(|| value.ty(), |p| p.ty.clone());

    let target = match instance {
        _ if indices.is_empty() => Expr::property(instance.cloned(), method.declaring_type.clone(), name, ty),
        Some(receiver) if is_default_member(instance, name) => Expr::indexer(
            receiver.clone(),
            method.declaring_type.clone(),
            name,
            indices.to_vec(),
            ty,
        ),
        _ => {
            warn!(property = name, "indexed accessor is not the default member, keeping call");
            return None;
        }
    };
    Some(Expr::assign(target, value.clone()))
}

fn event_accessor(instance: Option<&ExprRef>, name: &str, arguments: &[ExprRef], subscribe: bool) -> Option<ExprRef> {
    let receiver = instance?;
    let [handler] = arguments else {
        return None;
    };

    let receiver_type = receiver.ty();
    let Some(event) = receiver_type
        .class_info()
        .and_then(|info| info.find_event(name))
        .cloned()
    else {
        warn!(event = name, receiver_type = %receiver_type, "event not declared on receiver type, keeping call");
        return None;
    };

    let node = if subscribe {
        Expr::subscribe(receiver.clone(), event, handler.clone())
    } else {
        Expr::unsubscribe(receiver.clone(), event, handler.clone())
    };
    match node {
        Ok(node) => Some(node),
        Err(error) => {
            warn!(%error, "cannot build event accessor node, keeping call");
            None
        }
    }
}

/// Runs [`SpecialNameMethodReplacer`] over `expr`.
pub fn replace_special_names(expr: &ExprRef) -> ExprRef {
    SpecialNameMethodReplacer.fold_expr(expr)
}
