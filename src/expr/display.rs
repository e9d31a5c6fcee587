use std::fmt::{self, Display, Formatter, Write};

use super::types::{Expr, ExprRef, UnaryOp};

/// Renders trees as C#-like source text, e.g. `x => (x.Count + 1)`.
impl Display for Expr {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Constant { value, .. } => write!(f, "{value}"),
            Expr::Parameter(p) => f.write_str(&p.name),
            Expr::FieldAccess { instance, field } => match instance {
                Some(instance) => write!(f, "{instance}.{}", field.name),
                None => write!(f, "{}.{}", field.declaring_type, field.name),
            },
            Expr::Binary { op, left, right, .. } => write!(f, "({left} {} {right})", op.as_str()),
            Expr::Unary { op, operand, ty } => match op {
                UnaryOp::Convert => write!(f, "Convert({operand}, {ty})"),
                UnaryOp::Negate => write!(f, "-{operand}"),
                UnaryOp::Not => write!(f, "~{operand}"),
                UnaryOp::TypeAs => write!(f, "({operand} as {ty})"),
                UnaryOp::ArrayLength => write!(f, "{operand}.Length"),
            },
            Expr::Call {
                instance,
                method,
                arguments,
            } => {
                match instance {
                    Some(instance) => write!(f, "{instance}.{}", method.name)?,
                    None => write!(f, "{}.{}", method.declaring_type, method.name)?,
                }
                f.write_char('(')?;
                write_list(f, arguments)?;
                f.write_char(')')
            }
            Expr::New {
                constructor,
                arguments,
            } => {
                write!(f, "new {}(", constructor.declaring_type)?;
                write_list(f, arguments)?;
                f.write_char(')')
            }
            Expr::NewArray {
                element_type,
                length,
            } => write!(f, "new {element_type}[{length}]"),
            Expr::ArrayIndex { array, index, .. } => write!(f, "{array}[{index}]"),
            Expr::Lambda {
                parameters, body, ..
            } => {
                if parameters.len() == 1 {
                    f.write_str(&parameters[0].name)?;
                } else {
                    f.write_char('(')?;
                    for (i, p) in parameters.iter().enumerate() {
                        if i > 0 {
                            f.write_str(", ")?;
                        }
                        f.write_str(&p.name)?;
                    }
                    f.write_char(')')?;
                }
                write!(f, " => {body}")
            }
            Expr::PropertyAccess {
                instance,
                declaring_type,
                name,
                ..
            } => match instance {
                Some(instance) => write!(f, "{instance}.{name}"),
                None => write!(f, "{declaring_type}.{name}"),
            },
            Expr::IndexerAccess {
                instance,
                arguments,
                ..
            } => {
                write!(f, "{instance}[")?;
                write_list(f, arguments)?;
                f.write_char(']')
            }
            Expr::Assign { target, value } => write!(f, "{target} = {value}"),
            Expr::EventSubscribe(call) => write!(
                f,
                "{}.{} += {}",
                call.instance(),
                call.event().name,
                call.handler()
            ),
            Expr::EventUnsubscribe(call) => write!(
                f,
                "{}.{} -= {}",
                call.instance(),
                call.event().name,
                call.handler()
            ),
        }
    }
}

fn write_list(f: &mut Formatter<'_>, exprs: &[ExprRef]) -> fmt::Result {
    for (i, expr) in exprs.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{expr}")?;
    }
    Ok(())
}
