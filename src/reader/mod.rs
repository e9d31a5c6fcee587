//! Decode loop driving an [`InstructionSink`].

mod sink;

pub use sink::InstructionSink;

use std::fmt::Write;

use tracing::{debug, trace};

use crate::error::{DecompileError, DecompileResult, TokenKind};
use crate::metadata::{ClrType, MetadataResolver};
use crate::opcode::{self, Instruction, Token};

/// Decodes `il` from offset 0, feeding every instruction to `sink`.
///
/// Decoding stops after the first `ret` has been dispatched. An unrecognized
/// opcode, an unresolvable token, or a sink error aborts with that error; a
/// stream that ends without `ret` fails with [`DecompileError::MissingReturn`].
pub fn read<S: InstructionSink + ?Sized>(
    il: &[u8],
    resolver: &dyn MetadataResolver,
    sink: &mut S,
) -> DecompileResult<()> {
    let mut offset = 0;
    loop {
        let (instruction, next) = opcode::decode_at(il, offset)?;
        trace!(offset, opcode = instruction.mnemonic(), "decoded instruction");

        sink.instruction(offset, &instruction)?;
        dispatch(&instruction, offset, resolver, sink)?;

        if instruction == Instruction::Ret {
            debug!(offset, length = il.len(), "reached ret, decoding finished");
            return Ok(());
        }
        offset = next;
    }
}

fn resolved<T>(value: Option<T>, offset: usize, token: Token, kind: TokenKind) -> DecompileResult<T> {
    value.ok_or(DecompileError::UnresolvedToken {
        offset,
        token,
        kind,
    })
}

fn dispatch<S: InstructionSink + ?Sized>(
    instruction: &Instruction,
    offset: usize,
    resolver: &dyn MetadataResolver,
    sink: &mut S,
) -> DecompileResult<()> {
    let method = |t: Token| resolved(resolver.resolve_method(t), offset, t, TokenKind::Method);
    let field = |t: Token| resolved(resolver.resolve_field(t), offset, t, TokenKind::Field);
    let ty = |t: Token| resolved(resolver.resolve_type(t), offset, t, TokenKind::Type);

    match *instruction {
        Instruction::Nop => sink.nop(),
        Instruction::Dup => sink.dup(),
        Instruction::Pop => sink.pop(),
        Instruction::Ret => sink.ret(),
        Instruction::Ldnull => sink.ldnull(),

        Instruction::LdcI4M1 => sink.ldc_i4(-1),
        Instruction::LdcI40 => sink.ldc_i4(0),
        Instruction::LdcI41 => sink.ldc_i4(1),
        Instruction::LdcI42 => sink.ldc_i4(2),
        Instruction::LdcI43 => sink.ldc_i4(3),
        Instruction::LdcI44 => sink.ldc_i4(4),
        Instruction::LdcI45 => sink.ldc_i4(5),
        Instruction::LdcI46 => sink.ldc_i4(6),
        Instruction::LdcI47 => sink.ldc_i4(7),
        Instruction::LdcI48 => sink.ldc_i4(8),
        Instruction::LdcI4S(v) => sink.ldc_i4(i32::from(v)),
        Instruction::LdcI4(v) => sink.ldc_i4(v),
        Instruction::LdcI8(v) => sink.ldc_i8(v),
        Instruction::LdcR4(v) => sink.ldc_r4(v),
        Instruction::LdcR8(v) => sink.ldc_r8(v),
        Instruction::Ldstr(t) => {
            let value = resolved(resolver.resolve_string(t), offset, t, TokenKind::String)?;
            sink.ldstr(value)
        }

        Instruction::Ldarg0 => sink.ldarg(0),
        Instruction::Ldarg1 => sink.ldarg(1),
        Instruction::Ldarg2 => sink.ldarg(2),
        Instruction::Ldarg3 => sink.ldarg(3),
        Instruction::LdargS(i) => sink.ldarg(i),
        Instruction::LdargaS(i) => sink.ldarga(i),
        Instruction::StargS(i) => sink.starg(i),
        Instruction::Ldloc0 => sink.ldloc(0),
        Instruction::Ldloc1 => sink.ldloc(1),
        Instruction::Ldloc2 => sink.ldloc(2),
        Instruction::Ldloc3 => sink.ldloc(3),
        Instruction::LdlocS(i) => sink.ldloc(i),
        Instruction::LdlocaS(i) => sink.ldloca(i),
        Instruction::Stloc0 => sink.stloc(0),
        Instruction::Stloc1 => sink.stloc(1),
        Instruction::Stloc2 => sink.stloc(2),
        Instruction::Stloc3 => sink.stloc(3),
        Instruction::StlocS(i) => sink.stloc(i),

        Instruction::Add => sink.add(),
        Instruction::Sub => sink.sub(),
        Instruction::Mul => sink.mul(),
        Instruction::Div => sink.div(),
        Instruction::DivUn => sink.div_un(),
        Instruction::Rem => sink.rem(),
        Instruction::RemUn => sink.rem_un(),
        Instruction::And => sink.and(),
        Instruction::Or => sink.or(),
        Instruction::Xor => sink.xor(),
        Instruction::Shl => sink.shl(),
        Instruction::Shr => sink.shr(),
        Instruction::ShrUn => sink.shr_un(),
        Instruction::Neg => sink.neg(),
        Instruction::Not => sink.not(),
        Instruction::Ceq => sink.ceq(),
        Instruction::Cgt => sink.cgt(),
        Instruction::CgtUn => sink.cgt_un(),
        Instruction::Clt => sink.clt(),
        Instruction::CltUn => sink.clt_un(),

        Instruction::ConvI1 => sink.conv_i1(),
        Instruction::ConvI2 => sink.conv_i2(),
        Instruction::ConvI4 => sink.conv_i4(),
        Instruction::ConvI8 => sink.conv_i8(),
        Instruction::ConvU1 => sink.conv_u1(),
        Instruction::ConvU2 => sink.conv_u2(),
        Instruction::ConvU4 => sink.conv_u4(),
        Instruction::ConvU8 => sink.conv_u8(),
        Instruction::ConvR4 => sink.conv_r4(),
        Instruction::ConvR8 => sink.conv_r8(),
        Instruction::Box(t) => sink.box_value(ty(t)?),
        Instruction::Castclass(t) => sink.castclass(ty(t)?),
        Instruction::Isinst(t) => sink.isinst(ty(t)?),

        Instruction::Call(t) => sink.call(method(t)?),
        Instruction::Callvirt(t) => sink.callvirt(method(t)?),
        Instruction::Newobj(t) => {
            let constructor = resolved(
                resolver.resolve_constructor(t),
                offset,
                t,
                TokenKind::Constructor,
            )?;
            sink.newobj(constructor)
        }
        Instruction::Ldfld(t) => sink.ldfld(field(t)?),
        Instruction::Ldflda(t) => sink.ldflda(field(t)?),
        Instruction::Ldsfld(t) => sink.ldsfld(field(t)?),
        Instruction::Ldsflda(t) => sink.ldsflda(field(t)?),

        Instruction::Newarr(t) => sink.newarr(ty(t)?),
        Instruction::Ldlen => sink.ldlen(),
        Instruction::Ldelem(t) => sink.ldelem(ty(t)?),
        Instruction::LdelemI1 => sink.ldelem(ClrType::SByte),
        Instruction::LdelemU1 => sink.ldelem(ClrType::Byte),
        Instruction::LdelemI2 => sink.ldelem(ClrType::Int16),
        Instruction::LdelemU2 => sink.ldelem(ClrType::UInt16),
        Instruction::LdelemI4 => sink.ldelem(ClrType::Int32),
        Instruction::LdelemU4 => sink.ldelem(ClrType::UInt32),
        Instruction::LdelemI8 => sink.ldelem(ClrType::Int64),
        Instruction::LdelemI => sink.ldelem(ClrType::IntPtr),
        Instruction::LdelemR4 => sink.ldelem(ClrType::Single),
        Instruction::LdelemR8 => sink.ldelem(ClrType::Double),
        Instruction::LdelemRef => sink.ldelem(ClrType::Object),
    }
}

/// A sink that records an ILDasm-style listing, one line per instruction.
///
/// Token operands are shown raw since the listing is taken before
/// resolution.
#[derive(Clone, Debug, Default)]
pub struct Disassembler {
    lines: Vec<String>,
}

impl Disassembler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn into_listing(self) -> String {
        let mut out = String::new();
        for line in &self.lines {
            let _ = writeln!(out, "{line}");
        }
        out
    }
}

impl InstructionSink for Disassembler {
    fn instruction(&mut self, offset: usize, instruction: &Instruction) -> DecompileResult<()> {
        self.lines.push(format!("IL_{offset:04x}: {instruction}"));
        Ok(())
    }
}

/// Disassembles `il` up to and including its `ret`.
pub fn disassemble(il: &[u8], resolver: &dyn MetadataResolver) -> DecompileResult<String> {
    let mut disassembler = Disassembler::new();
    read(il, resolver, &mut disassembler)?;
    Ok(disassembler.into_listing())
}
