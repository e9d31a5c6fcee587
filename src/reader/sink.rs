use std::sync::Arc;

use crate::error::DecompileResult;
use crate::metadata::{ClrType, ConstructorRef, FieldRef, MethodRef};
use crate::opcode::Instruction;

/// Consumer of decoded instructions.
///
/// [`read`](super::read) calls [`InstructionSink::instruction`] for every
/// instruction and then the operation for its opcode, with token operands
/// already resolved. Every method defaults to doing nothing, so a sink only
/// implements the opcodes it cares about. Returning an error aborts decoding.
///
/// Short and long forms of an opcode share one operation: `ldarg.0` and
/// `ldarg.s 0` both call [`InstructionSink::ldarg`]. The exact instruction is
/// available through the `instruction` hook.
#[allow(unused_variables)]
pub trait InstructionSink {
    /// Called before the per-opcode operation with the instruction's offset.
    fn instruction(&mut self, offset: usize, instruction: &Instruction) -> DecompileResult<()> {
        Ok(())
    }

    // ---- Stack and constants ----

    fn nop(&mut self) -> DecompileResult<()> {
        Ok(())
    }

    fn dup(&mut self) -> DecompileResult<()> {
        Ok(())
    }

    fn pop(&mut self) -> DecompileResult<()> {
        Ok(())
    }

    fn ldnull(&mut self) -> DecompileResult<()> {
        Ok(())
    }

    /// `ldc.i4`, `ldc.i4.s` and the `ldc.i4.<n>` short forms.
    fn ldc_i4(&mut self, value: i32) -> DecompileResult<()> {
        Ok(())
    }

    fn ldc_i8(&mut self, value: i64) -> DecompileResult<()> {
        Ok(())
    }

    fn ldc_r4(&mut self, value: f32) -> DecompileResult<()> {
        Ok(())
    }

    fn ldc_r8(&mut self, value: f64) -> DecompileResult<()> {
        Ok(())
    }

    fn ldstr(&mut self, value: Arc<str>) -> DecompileResult<()> {
        Ok(())
    }

    fn ret(&mut self) -> DecompileResult<()> {
        Ok(())
    }

    // ---- Arguments and locals ----

    fn ldarg(&mut self, index: u8) -> DecompileResult<()> {
        Ok(())
    }

    fn ldarga(&mut self, index: u8) -> DecompileResult<()> {
        Ok(())
    }

    fn starg(&mut self, index: u8) -> DecompileResult<()> {
        Ok(())
    }

    fn ldloc(&mut self, index: u8) -> DecompileResult<()> {
        Ok(())
    }

    fn ldloca(&mut self, index: u8) -> DecompileResult<()> {
        Ok(())
    }

    fn stloc(&mut self, index: u8) -> DecompileResult<()> {
        Ok(())
    }

    // ---- Arithmetic and logic ----

    fn add(&mut self) -> DecompileResult<()> {
        Ok(())
    }

    fn sub(&mut self) -> DecompileResult<()> {
        Ok(())
    }

    fn mul(&mut self) -> DecompileResult<()> {
        Ok(())
    }

    fn div(&mut self) -> DecompileResult<()> {
        Ok(())
    }

    fn div_un(&mut self) -> DecompileResult<()> {
        Ok(())
    }

    fn rem(&mut self) -> DecompileResult<()> {
        Ok(())
    }

    fn rem_un(&mut self) -> DecompileResult<()> {
        Ok(())
    }

    fn and(&mut self) -> DecompileResult<()> {
        Ok(())
    }

    fn or(&mut self) -> DecompileResult<()> {
        Ok(())
    }

    fn xor(&mut self) -> DecompileResult<()> {
        Ok(())
    }

    fn shl(&mut self) -> DecompileResult<()> {
        Ok(())
    }

    fn shr(&mut self) -> DecompileResult<()> {
        Ok(())
    }

    fn shr_un(&mut self) -> DecompileResult<()> {
        Ok(())
    }

    fn neg(&mut self) -> DecompileResult<()> {
        Ok(())
    }

    fn not(&mut self) -> DecompileResult<()> {
        Ok(())
    }

    fn ceq(&mut self) -> DecompileResult<()> {
        Ok(())
    }

    fn cgt(&mut self) -> DecompileResult<()> {
        Ok(())
    }

    fn cgt_un(&mut self) -> DecompileResult<()> {
        Ok(())
    }

    fn clt(&mut self) -> DecompileResult<()> {
        Ok(())
    }

    fn clt_un(&mut self) -> DecompileResult<()> {
        Ok(())
    }

    // ---- Conversions ----

    fn conv_i1(&mut self) -> DecompileResult<()> {
        Ok(())
    }

    fn conv_i2(&mut self) -> DecompileResult<()> {
        Ok(())
    }

    fn conv_i4(&mut self) -> DecompileResult<()> {
        Ok(())
    }

    fn conv_i8(&mut self) -> DecompileResult<()> {
        Ok(())
    }

    fn conv_u1(&mut self) -> DecompileResult<()> {
        Ok(())
    }

    fn conv_u2(&mut self) -> DecompileResult<()> {
        Ok(())
    }

    fn conv_u4(&mut self) -> DecompileResult<()> {
        Ok(())
    }

    fn conv_u8(&mut self) -> DecompileResult<()> {
        Ok(())
    }

    fn conv_r4(&mut self) -> DecompileResult<()> {
        Ok(())
    }

    fn conv_r8(&mut self) -> DecompileResult<()> {
        Ok(())
    }

    fn box_value(&mut self, ty: ClrType) -> DecompileResult<()> {
        Ok(())
    }

    fn castclass(&mut self, ty: ClrType) -> DecompileResult<()> {
        Ok(())
    }

    fn isinst(&mut self, ty: ClrType) -> DecompileResult<()> {
        Ok(())
    }

    // ---- Objects, fields and arrays ----

    fn call(&mut self, method: Arc<MethodRef>) -> DecompileResult<()> {
        Ok(())
    }

    fn callvirt(&mut self, method: Arc<MethodRef>) -> DecompileResult<()> {
        Ok(())
    }

    fn newobj(&mut self, constructor: Arc<ConstructorRef>) -> DecompileResult<()> {
        Ok(())
    }

    fn ldfld(&mut self, field: Arc<FieldRef>) -> DecompileResult<()> {
        Ok(())
    }

    fn ldflda(&mut self, field: Arc<FieldRef>) -> DecompileResult<()> {
        Ok(())
    }

    fn ldsfld(&mut self, field: Arc<FieldRef>) -> DecompileResult<()> {
        Ok(())
    }

    fn ldsflda(&mut self, field: Arc<FieldRef>) -> DecompileResult<()> {
        Ok(())
    }

    fn newarr(&mut self, element_type: ClrType) -> DecompileResult<()> {
        Ok(())
    }

    fn ldlen(&mut self) -> DecompileResult<()> {
        Ok(())
    }

    /// `ldelem <type>` and the typed `ldelem.*` forms, which pass the type
    /// their opcode names (`ldelem.ref` passes `Object`).
    fn ldelem(&mut self, element_type: ClrType) -> DecompileResult<()> {
        Ok(())
    }
}
