use std::sync::Arc;

use crate::metadata::{ClrType, ConstructorRef, FieldRef, MethodRef, Value};

use super::event::EventAccessorCall;

/// Shared handle to an immutable tree node.
pub type ExprRef = Arc<Expr>;

/// Binary operators.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    And,
    Or,
    ExclusiveOr,
    LeftShift,
    RightShift,
    Equal,
    NotEqual,
    GreaterThan,
    LessThan,
}

impl BinaryOp {
    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            BinaryOp::Equal | BinaryOp::NotEqual | BinaryOp::GreaterThan | BinaryOp::LessThan
        )
    }

    /// C# source token for this operator.
    pub fn as_str(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Subtract => "-",
            BinaryOp::Multiply => "*",
            BinaryOp::Divide => "/",
            BinaryOp::Modulo => "%",
            BinaryOp::And => "&",
            BinaryOp::Or => "|",
            BinaryOp::ExclusiveOr => "^",
            BinaryOp::LeftShift => "<<",
            BinaryOp::RightShift => ">>",
            BinaryOp::Equal => "==",
            BinaryOp::NotEqual => "!=",
            BinaryOp::GreaterThan => ">",
            BinaryOp::LessThan => "<",
        }
    }
}

/// Unary operators.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnaryOp {
    /// Conversion (or boxing) to the node's type.
    Convert,
    Negate,
    /// Bitwise complement.
    Not,
    /// Checked reference conversion yielding null on failure.
    TypeAs,
    ArrayLength,
}

/// A named, typed parameter placeholder.
#[derive(Clone, Debug, PartialEq)]
pub struct ParameterExpr {
    pub name: String,
    pub ty: ClrType,
}

impl ParameterExpr {
    pub fn new(name: impl Into<String>, ty: ClrType) -> Self {
        ParameterExpr {
            name: name.into(),
            ty,
        }
    }
}

/// Expression tree node.
///
/// Nodes are immutable and own their children through [`ExprRef`]; the same
/// child may appear more than once after a `dup`.
#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    Constant {
        value: Value,
        ty: ClrType,
    },
    Parameter(ParameterExpr),
    /// Field read; `instance` is `None` for static fields.
    FieldAccess {
        instance: Option<ExprRef>,
        field: Arc<FieldRef>,
    },
    Binary {
        op: BinaryOp,
        left: ExprRef,
        right: ExprRef,
        ty: ClrType,
    },
    Unary {
        op: UnaryOp,
        operand: ExprRef,
        ty: ClrType,
    },
    Call {
        instance: Option<ExprRef>,
        method: Arc<MethodRef>,
        arguments: Vec<ExprRef>,
    },
    New {
        constructor: Arc<ConstructorRef>,
        arguments: Vec<ExprRef>,
    },
    NewArray {
        element_type: ClrType,
        length: ExprRef,
    },
    ArrayIndex {
        array: ExprRef,
        index: ExprRef,
        ty: ClrType,
    },
    Lambda {
        parameters: Vec<ParameterExpr>,
        body: ExprRef,
        ty: ClrType,
    },
    PropertyAccess {
        instance: Option<ExprRef>,
        declaring_type: String,
        name: String,
        ty: ClrType,
    },
    /// Read of an indexed property. Indexers are always instance members;
    /// `declaring_type` names the type that declares the accessor.
    IndexerAccess {
        instance: ExprRef,
        declaring_type: String,
        name: String,
        arguments: Vec<ExprRef>,
        ty: ClrType,
    },
    Assign {
        target: ExprRef,
        value: ExprRef,
    },
    EventSubscribe(EventAccessorCall),
    EventUnsubscribe(EventAccessorCall),
}

impl Expr {
    pub fn constant(value: Value, ty: ClrType) -> ExprRef {
        Arc::new(Expr::Constant { value, ty })
    }

    pub fn null() -> ExprRef {
        Expr::constant(Value::Null, ClrType::Object)
    }

    pub fn parameter(parameter: &ParameterExpr) -> ExprRef {
        Arc::new(Expr::Parameter(parameter.clone()))
    }

    pub fn field(instance: Option<ExprRef>, field: Arc<FieldRef>) -> ExprRef {
        Arc::new(Expr::FieldAccess { instance, field })
    }

    /// Builds a binary node. Comparisons are typed `Boolean`, everything else
    /// takes the type of its left operand.
    pub fn binary(op: BinaryOp, left: ExprRef, right: ExprRef) -> ExprRef {
        let ty = if op.is_comparison() {
            ClrType::Boolean
        } else {
            left.ty()
        };
        Arc::new(Expr::Binary {
            op,
            left,
            right,
            ty,
        })
    }

    pub fn unary(op: UnaryOp, operand: ExprRef, ty: ClrType) -> ExprRef {
        Arc::new(Expr::Unary { op, operand, ty })
    }

    pub fn convert(operand: ExprRef, ty: ClrType) -> ExprRef {
        Expr::unary(UnaryOp::Convert, operand, ty)
    }

    pub fn call(instance: Option<ExprRef>, method: Arc<MethodRef>, arguments: Vec<ExprRef>) -> ExprRef {
        Arc::new(Expr::Call {
            instance,
            method,
            arguments,
        })
    }

    pub fn new_object(constructor: Arc<ConstructorRef>, arguments: Vec<ExprRef>) -> ExprRef {
        Arc::new(Expr::New {
            constructor,
            arguments,
        })
    }

    pub fn new_array(element_type: ClrType, length: ExprRef) -> ExprRef {
        Arc::new(Expr::NewArray {
            element_type,
            length,
        })
    }

    pub fn array_index(array: ExprRef, index: ExprRef, ty: ClrType) -> ExprRef {
        Arc::new(Expr::ArrayIndex { array, index, ty })
    }

    pub fn lambda(parameters: Vec<ParameterExpr>, body: ExprRef, ty: ClrType) -> ExprRef {
        Arc::new(Expr::Lambda {
            parameters,
            body,
            ty,
        })
    }

    pub fn property(
        instance: Option<ExprRef>,
        declaring_type: impl Into<String>,
        name: impl Into<String>,
        ty: ClrType,
    ) -> ExprRef {
        Arc::new(Expr::PropertyAccess {
            instance,
            declaring_type: declaring_type.into(),
            name: name.into(),
            ty,
        })
    }

    pub fn indexer(
        instance: ExprRef,
        declaring_type: impl Into<String>,
        name: impl Into<String>,
        arguments: Vec<ExprRef>,
        ty: ClrType,
    ) -> ExprRef {
        Arc::new(Expr::IndexerAccess {
            instance,
            declaring_type: declaring_type.into(),
            name: name.into(),
            arguments,
            ty,
        })
    }

    pub fn assign(target: ExprRef, value: ExprRef) -> ExprRef {
        Arc::new(Expr::Assign { target, value })
    }

    /// The type of the value this node produces.
    pub fn ty(&self) -> ClrType {
        match self {
            Expr::Constant { ty, .. } => ty.clone(),
            Expr::Parameter(p) => p.ty.clone(),
            Expr::FieldAccess { field, .. } => field.field_type.clone(),
            Expr::Binary { ty, .. } => ty.clone(),
            Expr::Unary { ty, .. } => ty.clone(),
            Expr::Call { method, .. } => method.return_type.clone(),
            Expr::New { constructor, .. } => constructor.declaring_type.clone(),
            Expr::NewArray { element_type, .. } => ClrType::array_of(element_type.clone()),
            Expr::ArrayIndex { ty, .. } => ty.clone(),
            Expr::Lambda { ty, .. } => ty.clone(),
            Expr::PropertyAccess { ty, .. } => ty.clone(),
            Expr::IndexerAccess { ty, .. } => ty.clone(),
            Expr::Assign { target, .. } => target.ty(),
            Expr::EventSubscribe(_) | Expr::EventUnsubscribe(_) => ClrType::Void,
        }
    }

    pub fn is_constant(&self) -> bool {
        matches!(self, Expr::Constant { .. })
    }

    /// Canonical call form of an event node; `None` for every other kind.
    pub fn reduce(&self) -> Option<ExprRef> {
        match self {
            Expr::EventSubscribe(call) => Some(call.reduce_to(&call.event().add_method)),
            Expr::EventUnsubscribe(call) => Some(call.reduce_to(&call.event().remove_method)),
            _ => None,
        }
    }
}
