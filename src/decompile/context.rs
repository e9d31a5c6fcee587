use std::sync::Arc;

use tracing::debug;

use crate::error::{DecompileError, DecompileResult, StackError};
use crate::expr::{BinaryOp, Expr, ExprRef, ParameterExpr, UnaryOp};
use crate::metadata::{ClrType, ConstructorRef, Delegate, FieldRef, MethodRef, ParameterInfo, Value};
use crate::opcode::Instruction;
use crate::reader::InstructionSink;
use crate::stack::ArrayStack;

/// Symbolically executes one method body, turning stack operations into
/// expression nodes.
///
/// A context is single-use: build one per [`Delegate`], drive it with
/// [`read`](crate::reader::read), then take the tree with
/// [`DecompilationContext::into_result`].
#[derive(Debug)]
pub struct DecompilationContext {
    stack: ArrayStack<ExprRef>,
    locals: Vec<Option<ExprRef>>,
    parameters: Vec<ParameterExpr>,
    /// Current value of each declared parameter; `starg` rebinds entries.
    arguments: Vec<ExprRef>,
    /// Implicit receiver of an instance method.
    this_value: Option<ExprRef>,
    lambda_type: ClrType,
    offset: usize,
    result: Option<ExprRef>,
}

impl DecompilationContext {
    pub fn new(delegate: &Delegate) -> Self {
        let method = &delegate.method;
        let body = &method.body;

        let locals = body
            .locals
            .iter()
            .map(|ty| {
                body.init_locals
                    .then(|| Expr::constant(Value::default_for(ty), ty.clone()))
            })
            .collect();

        let parameters: Vec<ParameterExpr> = method
            .parameters
            .iter()
            .map(|p| ParameterExpr::new(p.name.clone(), p.ty.clone()))
            .collect();
        let arguments = parameters.iter().map(Expr::parameter).collect();

        let this_value = (!method.is_static()).then(|| match &delegate.target {
            Some(target) => Expr::constant(target.clone(), method.declaring_type.clone()),
            None => Expr::parameter(&ParameterExpr::new("this", method.declaring_type.clone())),
        });

        DecompilationContext {
            stack: ArrayStack::new(usize::from(body.max_stack)),
            locals,
            parameters,
            arguments,
            this_value,
            lambda_type: delegate.delegate_type.clone(),
            offset: 0,
            result: None,
        }
    }

    /// Current stack depth.
    pub fn depth(&self) -> usize {
        self.stack.depth()
    }

    /// The finished lambda, available once `ret` has been executed.
    pub fn into_result(self) -> DecompileResult<ExprRef> {
        self.result
            .ok_or(DecompileError::MissingReturn { offset: self.offset })
    }

    fn stack_error(&self, source: StackError) -> DecompileError {
        DecompileError::Stack {
            offset: self.offset,
            source,
        }
    }

    fn push(&mut self, expr: ExprRef) -> DecompileResult<()> {
        self.stack.push(expr).map_err(|e| self.stack_error(e))
    }

    fn pop_value(&mut self) -> DecompileResult<ExprRef> {
        self.stack.pop().map_err(|e| self.stack_error(e))
    }

    fn binary(&mut self, op: BinaryOp) -> DecompileResult<()> {
        let right = self.pop_value()?;
        let left = self.pop_value()?;
        self.push(Expr::binary(op, left, right))
    }

    fn unary(&mut self, op: UnaryOp) -> DecompileResult<()> {
        let operand = self.pop_value()?;
        let ty = operand.ty();
        self.push(Expr::unary(op, operand, ty))
    }

    fn convert(&mut self, ty: ClrType) -> DecompileResult<()> {
        let operand = self.pop_value()?;
        self.push(Expr::convert(operand, ty))
    }

    /// Pops one value per declared parameter, coercing mismatched constants.
    fn pop_arguments(&mut self, parameters: &[ParameterInfo]) -> DecompileResult<Vec<ExprRef>> {
        let arguments = self
            .stack
            .pop_many(parameters.len())
            .map_err(|e| self.stack_error(e))?;
        Ok(arguments
            .into_iter()
            .zip(parameters)
            .map(|(argument, parameter)| coerce(argument, parameter))
            .collect())
    }

    fn invoke(&mut self, method: Arc<MethodRef>) -> DecompileResult<()> {
        let arguments = self.pop_arguments(&method.parameters)?;
        let instance = if method.is_static() {
            None
        } else {
            Some(self.pop_value()?)
        };
        self.push(Expr::call(instance, method, arguments))
    }

    fn load_argument(&self, index: u8) -> DecompileResult<ExprRef> {
        let index = usize::from(index);
        let slot = match &self.this_value {
            Some(this) if index == 0 => return Ok(this.clone()),
            Some(_) => index - 1,
            None => index,
        };
        self.arguments
            .get(slot)
            .cloned()
            .ok_or(DecompileError::ArgumentOutOfRange { index })
    }

    fn store_argument(&mut self, index: u8, value: ExprRef) -> DecompileResult<()> {
        let index = usize::from(index);
        let slot = if self.this_value.is_some() {
            if index == 0 {
                self.this_value = Some(value);
                return Ok(());
            }
            index - 1
        } else {
            index
        };
        match self.arguments.get_mut(slot) {
            Some(argument) => {
                *argument = value;
                Ok(())
            }
            None => Err(DecompileError::ArgumentOutOfRange { index }),
        }
    }

    fn load_local(&self, index: u8) -> DecompileResult<ExprRef> {
        let index = usize::from(index);
        match self.locals.get(index) {
            Some(Some(value)) => Ok(value.clone()),
            Some(None) => Err(DecompileError::UnsetLocal { index }),
            None => Err(DecompileError::LocalOutOfRange { index }),
        }
    }
}

/// Retypes a constant argument whose type the parameter does not accept.
///
/// The value itself is kept as-is, so e.g. an `Int32` literal passed to a
/// `Char` parameter becomes a `Char`-typed node still holding an `I32`.
fn coerce(argument: ExprRef, parameter: &ParameterInfo) -> ExprRef {
    if let Expr::Constant { value, ty } = &*argument {
        if !parameter.ty.is_assignable_from(ty) {
            debug!(
                parameter = %parameter.name,
                from = %ty,
                to = %parameter.ty,
                "coercing constant argument"
            );
            return Expr::constant(value.clone(), parameter.ty.clone());
        }
    }
    argument
}

impl InstructionSink for DecompilationContext {
    fn instruction(&mut self, offset: usize, _instruction: &Instruction) -> DecompileResult<()> {
        self.offset = offset;
        Ok(())
    }

    // ---- Stack and constants ----

    fn dup(&mut self) -> DecompileResult<()> {
        let top = self.stack.peek().map_err(|e| self.stack_error(e))?;
        self.push(top)
    }

    fn pop(&mut self) -> DecompileResult<()> {
        let value = self.pop_value()?;
        debug!(offset = self.offset, %value, "discarding value");
        Ok(())
    }

    fn ldnull(&mut self) -> DecompileResult<()> {
        self.push(Expr::null())
    }

    fn ldc_i4(&mut self, value: i32) -> DecompileResult<()> {
        self.push(Expr::constant(Value::I32(value), ClrType::Int32))
    }

    fn ldc_i8(&mut self, value: i64) -> DecompileResult<()> {
        self.push(Expr::constant(Value::I64(value), ClrType::Int64))
    }

    fn ldc_r4(&mut self, value: f32) -> DecompileResult<()> {
        self.push(Expr::constant(Value::F32(value), ClrType::Single))
    }

    fn ldc_r8(&mut self, value: f64) -> DecompileResult<()> {
        self.push(Expr::constant(Value::F64(value), ClrType::Double))
    }

    fn ldstr(&mut self, value: Arc<str>) -> DecompileResult<()> {
        self.push(Expr::constant(Value::String(value), ClrType::String))
    }

    fn ret(&mut self) -> DecompileResult<()> {
        let body = self.pop_value()?;
        if !self.stack.is_empty() {
            return Err(DecompileError::InvalidOperand {
                message: format!(
                    "{} value(s) left on the stack at ret (IL_{:04x})",
                    self.stack.depth(),
                    self.offset
                ),
            });
        }
        self.result = Some(Expr::lambda(
            self.parameters.clone(),
            body,
            self.lambda_type.clone(),
        ));
        Ok(())
    }

    // ---- Arguments and locals ----

    fn ldarg(&mut self, index: u8) -> DecompileResult<()> {
        let value = self.load_argument(index)?;
        self.push(value)
    }

    fn ldarga(&mut self, index: u8) -> DecompileResult<()> {
        self.ldarg(index)
    }

    fn starg(&mut self, index: u8) -> DecompileResult<()> {
        let value = self.pop_value()?;
        self.store_argument(index, value)
    }

    fn ldloc(&mut self, index: u8) -> DecompileResult<()> {
        let value = self.load_local(index)?;
        self.push(value)
    }

    fn ldloca(&mut self, index: u8) -> DecompileResult<()> {
        self.ldloc(index)
    }

    fn stloc(&mut self, index: u8) -> DecompileResult<()> {
        let value = self.pop_value()?;
        let index = usize::from(index);
        match self.locals.get_mut(index) {
            Some(slot) => {
                *slot = Some(value);
                Ok(())
            }
            None => Err(DecompileError::LocalOutOfRange { index }),
        }
    }

    // ---- Arithmetic and logic ----

    fn add(&mut self) -> DecompileResult<()> {
        self.binary(BinaryOp::Add)
    }

    fn sub(&mut self) -> DecompileResult<()> {
        self.binary(BinaryOp::Subtract)
    }

    fn mul(&mut self) -> DecompileResult<()> {
        self.binary(BinaryOp::Multiply)
    }

    fn div(&mut self) -> DecompileResult<()> {
        self.binary(BinaryOp::Divide)
    }

    fn div_un(&mut self) -> DecompileResult<()> {
        self.binary(BinaryOp::Divide)
    }

    fn rem(&mut self) -> DecompileResult<()> {
        self.binary(BinaryOp::Modulo)
    }

    fn rem_un(&mut self) -> DecompileResult<()> {
        self.binary(BinaryOp::Modulo)
    }

    fn and(&mut self) -> DecompileResult<()> {
        self.binary(BinaryOp::And)
    }

    fn or(&mut self) -> DecompileResult<()> {
        self.binary(BinaryOp::Or)
    }

    fn xor(&mut self) -> DecompileResult<()> {
        self.binary(BinaryOp::ExclusiveOr)
    }

    fn shl(&mut self) -> DecompileResult<()> {
        self.binary(BinaryOp::LeftShift)
    }

    fn shr(&mut self) -> DecompileResult<()> {
        self.binary(BinaryOp::RightShift)
    }

    fn shr_un(&mut self) -> DecompileResult<()> {
        self.binary(BinaryOp::RightShift)
    }

    fn neg(&mut self) -> DecompileResult<()> {
        self.unary(UnaryOp::Negate)
    }

    fn not(&mut self) -> DecompileResult<()> {
        self.unary(UnaryOp::Not)
    }

    fn ceq(&mut self) -> DecompileResult<()> {
        self.binary(BinaryOp::Equal)
    }

    fn cgt(&mut self) -> DecompileResult<()> {
        self.binary(BinaryOp::GreaterThan)
    }

    fn cgt_un(&mut self) -> DecompileResult<()> {
        self.binary(BinaryOp::GreaterThan)
    }

    fn clt(&mut self) -> DecompileResult<()> {
        self.binary(BinaryOp::LessThan)
    }

    fn clt_un(&mut self) -> DecompileResult<()> {
        self.binary(BinaryOp::LessThan)
    }

    // ---- Conversions ----

    fn conv_i1(&mut self) -> DecompileResult<()> {
        self.convert(ClrType::SByte)
    }

    fn conv_i2(&mut self) -> DecompileResult<()> {
        self.convert(ClrType::Int16)
    }

    fn conv_i4(&mut self) -> DecompileResult<()> {
        self.convert(ClrType::Int32)
    }

    fn conv_i8(&mut self) -> DecompileResult<()> {
        self.convert(ClrType::Int64)
    }

    fn conv_u1(&mut self) -> DecompileResult<()> {
        self.convert(ClrType::Byte)
    }

    fn conv_u2(&mut self) -> DecompileResult<()> {
        self.convert(ClrType::UInt16)
    }

    fn conv_u4(&mut self) -> DecompileResult<()> {
        self.convert(ClrType::UInt32)
    }

    fn conv_u8(&mut self) -> DecompileResult<()> {
        self.convert(ClrType::UInt64)
    }

    fn conv_r4(&mut self) -> DecompileResult<()> {
        self.convert(ClrType::Single)
    }

    fn conv_r8(&mut self) -> DecompileResult<()> {
        self.convert(ClrType::Double)
    }

    fn box_value(&mut self, _ty: ClrType) -> DecompileResult<()> {
        self.convert(ClrType::Object)
    }

    fn castclass(&mut self, ty: ClrType) -> DecompileResult<()> {
        self.convert(ty)
    }

    fn isinst(&mut self, ty: ClrType) -> DecompileResult<()> {
        let operand = self.pop_value()?;
        self.push(Expr::unary(UnaryOp::TypeAs, operand, ty))
    }

    // ---- Objects, fields and arrays ----

    fn call(&mut self, method: Arc<MethodRef>) -> DecompileResult<()> {
        self.invoke(method)
    }

    fn callvirt(&mut self, method: Arc<MethodRef>) -> DecompileResult<()> {
        self.invoke(method)
    }

    fn newobj(&mut self, constructor: Arc<ConstructorRef>) -> DecompileResult<()> {
        let arguments = self.pop_arguments(&constructor.parameters)?;
        self.push(Expr::new_object(constructor, arguments))
    }

    fn ldfld(&mut self, field: Arc<FieldRef>) -> DecompileResult<()> {
        let instance = self.pop_value()?;
        self.push(Expr::field(Some(instance), field))
    }

    fn ldflda(&mut self, field: Arc<FieldRef>) -> DecompileResult<()> {
        self.ldfld(field)
    }

    fn ldsfld(&mut self, field: Arc<FieldRef>) -> DecompileResult<()> {
        self.push(Expr::field(None, field))
    }

    fn ldsflda(&mut self, field: Arc<FieldRef>) -> DecompileResult<()> {
        self.ldsfld(field)
    }

    fn newarr(&mut self, element_type: ClrType) -> DecompileResult<()> {
        let length = self.pop_value()?;
        self.push(Expr::new_array(element_type, length))
    }

    fn ldlen(&mut self) -> DecompileResult<()> {
        let array = self.pop_value()?;
        let array_type = array.ty();
        if array_type.element_type().is_none() {
            return Err(DecompileError::InvalidOperand {
                message: format!("ldlen on non-array type {array_type}"),
            });
        }
        self.push(Expr::unary(UnaryOp::ArrayLength, array, ClrType::Int32))
    }

    fn ldelem(&mut self, element_type: ClrType) -> DecompileResult<()> {
        let index = self.pop_value()?;
        let array = self.pop_value()?;
        let ty = array.ty().element_type().cloned().unwrap_or(element_type);
        self.push(Expr::array_index(array, index, ty))
    }
}
