//! CIL opcode decoding.

mod types;

pub use types::*;
use types::OPCODES;

use std::fmt;
use std::io::Cursor;

use binrw::BinRead;

use crate::error::DecompileError;

/// Prefix byte of two-byte opcodes.
pub const EXTENDED_PREFIX: u8 = 0xfe;

/// Looks up a recognized opcode.
pub fn opcode_info(opcode: u16) -> Option<&'static OpcodeInfo> {
    OPCODES.iter().find(|info| info.opcode == opcode)
}

/// Reads the opcode value at `offset` without its operand. Returns the value
/// and its width in bytes, or `None` when `offset` is past the end.
pub fn peek_opcode(code: &[u8], offset: usize) -> Option<(u16, usize)> {
    let first = *code.get(offset)?;
    if first == EXTENDED_PREFIX {
        match code.get(offset + 1) {
            Some(second) => Some((u16::from_be_bytes([first, *second]), 2)),
            None => Some((u16::from(first), 1)),
        }
    } else {
        Some((u16::from(first), 1))
    }
}

/// Decodes the instruction starting at `offset`, returning it together with
/// the offset of the next instruction.
pub fn decode_at(code: &[u8], offset: usize) -> Result<(Instruction, usize), DecompileError> {
    let Some((opcode, width)) = peek_opcode(code, offset) else {
        return Err(DecompileError::MissingReturn { offset });
    };

    let mut cursor = Cursor::new(code);
    cursor.set_position(offset as u64);
    match Instruction::read(&mut cursor) {
        Ok(instruction) => Ok((instruction, cursor.position() as usize)),
        Err(_) => {
            // A lone trailing 0xfe is an extended opcode cut short.
            let truncated_prefix = opcode == u16::from(EXTENDED_PREFIX) && width == 1;
            if truncated_prefix || opcode_info(opcode).is_some() {
                Err(DecompileError::TruncatedInstruction { offset, opcode })
            } else {
                Err(DecompileError::UnsupportedInstruction { offset, opcode })
            }
        }
    }
}

impl Instruction {
    pub fn opcode(&self) -> u16 {
        match self {
            Instruction::Nop => 0x00,
            Instruction::Ldarg0 => 0x02,
            Instruction::Ldarg1 => 0x03,
            Instruction::Ldarg2 => 0x04,
            Instruction::Ldarg3 => 0x05,
            Instruction::Ldloc0 => 0x06,
            Instruction::Ldloc1 => 0x07,
            Instruction::Ldloc2 => 0x08,
            Instruction::Ldloc3 => 0x09,
            Instruction::Stloc0 => 0x0a,
            Instruction::Stloc1 => 0x0b,
            Instruction::Stloc2 => 0x0c,
            Instruction::Stloc3 => 0x0d,
            Instruction::LdargS(_) => 0x0e,
            Instruction::LdargaS(_) => 0x0f,
            Instruction::StargS(_) => 0x10,
            Instruction::LdlocS(_) => 0x11,
            Instruction::LdlocaS(_) => 0x12,
            Instruction::StlocS(_) => 0x13,
            Instruction::Ldnull => 0x14,
            Instruction::LdcI4M1 => 0x15,
            Instruction::LdcI40 => 0x16,
            Instruction::LdcI41 => 0x17,
            Instruction::LdcI42 => 0x18,
            Instruction::LdcI43 => 0x19,
            Instruction::LdcI44 => 0x1a,
            Instruction::LdcI45 => 0x1b,
            Instruction::LdcI46 => 0x1c,
            Instruction::LdcI47 => 0x1d,
            Instruction::LdcI48 => 0x1e,
            Instruction::LdcI4S(_) => 0x1f,
            Instruction::LdcI4(_) => 0x20,
            Instruction::LdcI8(_) => 0x21,
            Instruction::LdcR4(_) => 0x22,
            Instruction::LdcR8(_) => 0x23,
            Instruction::Dup => 0x25,
            Instruction::Pop => 0x26,
            Instruction::Call(_) => 0x28,
            Instruction::Ret => 0x2a,
            Instruction::Add => 0x58,
            Instruction::Sub => 0x59,
            Instruction::Mul => 0x5a,
            Instruction::Div => 0x5b,
            Instruction::DivUn => 0x5c,
            Instruction::Rem => 0x5d,
            Instruction::RemUn => 0x5e,
            Instruction::And => 0x5f,
            Instruction::Or => 0x60,
            Instruction::Xor => 0x61,
            Instruction::Shl => 0x62,
            Instruction::Shr => 0x63,
            Instruction::ShrUn => 0x64,
            Instruction::Neg => 0x65,
            Instruction::Not => 0x66,
            Instruction::ConvI1 => 0x67,
            Instruction::ConvI2 => 0x68,
            Instruction::ConvI4 => 0x69,
            Instruction::ConvI8 => 0x6a,
            Instruction::ConvR4 => 0x6b,
            Instruction::ConvR8 => 0x6c,
            Instruction::ConvU4 => 0x6d,
            Instruction::ConvU8 => 0x6e,
            Instruction::Callvirt(_) => 0x6f,
            Instruction::Ldstr(_) => 0x72,
            Instruction::Newobj(_) => 0x73,
            Instruction::Castclass(_) => 0x74,
            Instruction::Isinst(_) => 0x75,
            Instruction::Ldfld(_) => 0x7b,
            Instruction::Ldflda(_) => 0x7c,
            Instruction::Ldsfld(_) => 0x7e,
            Instruction::Ldsflda(_) => 0x7f,
            Instruction::Box(_) => 0x8c,
            Instruction::Newarr(_) => 0x8d,
            Instruction::Ldlen => 0x8e,
            Instruction::LdelemI1 => 0x90,
            Instruction::LdelemU1 => 0x91,
            Instruction::LdelemI2 => 0x92,
            Instruction::LdelemU2 => 0x93,
            Instruction::LdelemI4 => 0x94,
            Instruction::LdelemU4 => 0x95,
            Instruction::LdelemI8 => 0x96,
            Instruction::LdelemI => 0x97,
            Instruction::LdelemR4 => 0x98,
            Instruction::LdelemR8 => 0x99,
            Instruction::LdelemRef => 0x9a,
            Instruction::Ldelem(_) => 0xa3,
            Instruction::ConvU2 => 0xd1,
            Instruction::ConvU1 => 0xd2,
            Instruction::Ceq => 0xfe01,
            Instruction::Cgt => 0xfe02,
            Instruction::CgtUn => 0xfe03,
            Instruction::Clt => 0xfe04,
            Instruction::CltUn => 0xfe05,
        }
    }

    pub fn mnemonic(&self) -> &'static str {
        opcode_info(self.opcode()).map_or("???", |info| info.mnemonic)
    }

    /// Encoded size in bytes, opcode included.
    pub fn size(&self) -> usize {
        let opcode = self.opcode();
        let width = if opcode > 0xff { 2 } else { 1 };
        width + opcode_info(opcode).map_or(0, |info| info.operand_size)
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())?;
        match self {
            Instruction::LdargS(v)
            | Instruction::LdargaS(v)
            | Instruction::StargS(v)
            | Instruction::LdlocS(v)
            | Instruction::LdlocaS(v)
            | Instruction::StlocS(v) => write!(f, " {v}"),
            Instruction::LdcI4S(v) => write!(f, " {v}"),
            Instruction::LdcI4(v) => write!(f, " {v}"),
            Instruction::LdcI8(v) => write!(f, " {v}"),
            Instruction::LdcR4(v) => write!(f, " {v}"),
            Instruction::LdcR8(v) => write!(f, " {v}"),
            Instruction::Box(t)
            | Instruction::Call(t)
            | Instruction::Callvirt(t)
            | Instruction::Castclass(t)
            | Instruction::Isinst(t)
            | Instruction::Ldelem(t)
            | Instruction::Ldfld(t)
            | Instruction::Ldflda(t)
            | Instruction::Ldsfld(t)
            | Instruction::Ldsflda(t)
            | Instruction::Ldstr(t)
            | Instruction::Newarr(t)
            | Instruction::Newobj(t) => write!(f, " {t}"),
            _ => Ok(()),
        }
    }
}
