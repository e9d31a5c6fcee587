use binrw::binrw;

/// An opaque metadata token, resolved through a
/// [`MetadataResolver`](crate::metadata::MetadataResolver).
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
#[binrw]
#[brw(little)]
pub struct Token(pub u32);

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "0x{:08x}", self.0)
    }
}

/// The recognized CIL instructions and their inline operands.
#[derive(Clone, Debug, PartialEq)]
#[binrw]
#[br(return_unexpected_error)]
#[brw(little)]
pub enum Instruction {
    #[brw(magic = 0x58u8)]
    Add,
    #[brw(magic = 0x5fu8)]
    And,
    #[brw(magic = 0x8cu8)]
    Box(Token),
    #[brw(magic = 0x28u8)]
    Call(Token),
    #[brw(magic = 0x6fu8)]
    Callvirt(Token),
    #[brw(magic = 0x74u8)]
    Castclass(Token),
    #[brw(magic = b"\xfe\x01")]
    Ceq,
    #[brw(magic = b"\xfe\x02")]
    Cgt,
    #[brw(magic = b"\xfe\x03")]
    CgtUn,
    #[brw(magic = b"\xfe\x04")]
    Clt,
    #[brw(magic = b"\xfe\x05")]
    CltUn,
    #[brw(magic = 0x67u8)]
    ConvI1,
    #[brw(magic = 0x68u8)]
    ConvI2,
    #[brw(magic = 0x69u8)]
    ConvI4,
    #[brw(magic = 0x6au8)]
    ConvI8,
    #[brw(magic = 0x6bu8)]
    ConvR4,
    #[brw(magic = 0x6cu8)]
    ConvR8,
    #[brw(magic = 0xd2u8)]
    ConvU1,
    #[brw(magic = 0xd1u8)]
    ConvU2,
    #[brw(magic = 0x6du8)]
    ConvU4,
    #[brw(magic = 0x6eu8)]
    ConvU8,
    #[brw(magic = 0x5bu8)]
    Div,
    #[brw(magic = 0x5cu8)]
    DivUn,
    #[brw(magic = 0x25u8)]
    Dup,
    #[brw(magic = 0x75u8)]
    Isinst(Token),
    #[brw(magic = 0x02u8)]
    Ldarg0,
    #[brw(magic = 0x03u8)]
    Ldarg1,
    #[brw(magic = 0x04u8)]
    Ldarg2,
    #[brw(magic = 0x05u8)]
    Ldarg3,
    #[brw(magic = 0x0eu8)]
    LdargS(u8),
    #[brw(magic = 0x0fu8)]
    LdargaS(u8),
    #[brw(magic = 0x20u8)]
    LdcI4(i32),
    #[brw(magic = 0x15u8)]
    LdcI4M1,
    #[brw(magic = 0x16u8)]
    LdcI40,
    #[brw(magic = 0x17u8)]
    LdcI41,
    #[brw(magic = 0x18u8)]
    LdcI42,
    #[brw(magic = 0x19u8)]
    LdcI43,
    #[brw(magic = 0x1au8)]
    LdcI44,
    #[brw(magic = 0x1bu8)]
    LdcI45,
    #[brw(magic = 0x1cu8)]
    LdcI46,
    #[brw(magic = 0x1du8)]
    LdcI47,
    #[brw(magic = 0x1eu8)]
    LdcI48,
    #[brw(magic = 0x1fu8)]
    LdcI4S(i8),
    #[brw(magic = 0x21u8)]
    LdcI8(i64),
    #[brw(magic = 0x22u8)]
    LdcR4(f32),
    #[brw(magic = 0x23u8)]
    LdcR8(f64),
    #[brw(magic = 0xa3u8)]
    Ldelem(Token),
    #[brw(magic = 0x90u8)]
    LdelemI1,
    #[brw(magic = 0x91u8)]
    LdelemU1,
    #[brw(magic = 0x92u8)]
    LdelemI2,
    #[brw(magic = 0x93u8)]
    LdelemU2,
    #[brw(magic = 0x94u8)]
    LdelemI4,
    #[brw(magic = 0x95u8)]
    LdelemU4,
    #[brw(magic = 0x96u8)]
    LdelemI8,
    #[brw(magic = 0x97u8)]
    LdelemI,
    #[brw(magic = 0x98u8)]
    LdelemR4,
    #[brw(magic = 0x99u8)]
    LdelemR8,
    #[brw(magic = 0x9au8)]
    LdelemRef,
    #[brw(magic = 0x7bu8)]
    Ldfld(Token),
    #[brw(magic = 0x7cu8)]
    Ldflda(Token),
    #[brw(magic = 0x8eu8)]
    Ldlen,
    #[brw(magic = 0x06u8)]
    Ldloc0,
    #[brw(magic = 0x07u8)]
    Ldloc1,
    #[brw(magic = 0x08u8)]
    Ldloc2,
    #[brw(magic = 0x09u8)]
    Ldloc3,
    #[brw(magic = 0x11u8)]
    LdlocS(u8),
    #[brw(magic = 0x12u8)]
    LdlocaS(u8),
    #[brw(magic = 0x14u8)]
    Ldnull,
    #[brw(magic = 0x7eu8)]
    Ldsfld(Token),
    #[brw(magic = 0x7fu8)]
    Ldsflda(Token),
    #[brw(magic = 0x72u8)]
    Ldstr(Token),
    #[brw(magic = 0x5au8)]
    Mul,
    #[brw(magic = 0x65u8)]
    Neg,
    #[brw(magic = 0x8du8)]
    Newarr(Token),
    #[brw(magic = 0x73u8)]
    Newobj(Token),
    #[brw(magic = 0x00u8)]
    Nop,
    #[brw(magic = 0x66u8)]
    Not,
    #[brw(magic = 0x60u8)]
    Or,
    #[brw(magic = 0x26u8)]
    Pop,
    #[brw(magic = 0x5du8)]
    Rem,
    #[brw(magic = 0x5eu8)]
    RemUn,
    #[brw(magic = 0x2au8)]
    Ret,
    #[brw(magic = 0x62u8)]
    Shl,
    #[brw(magic = 0x63u8)]
    Shr,
    #[brw(magic = 0x64u8)]
    ShrUn,
    #[brw(magic = 0x10u8)]
    StargS(u8),
    #[brw(magic = 0x0au8)]
    Stloc0,
    #[brw(magic = 0x0bu8)]
    Stloc1,
    #[brw(magic = 0x0cu8)]
    Stloc2,
    #[brw(magic = 0x0du8)]
    Stloc3,
    #[brw(magic = 0x13u8)]
    StlocS(u8),
    #[brw(magic = 0x59u8)]
    Sub,
    #[brw(magic = 0x61u8)]
    Xor,
}

/// Static description of a recognized opcode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OpcodeInfo {
    /// One-byte opcodes as-is, extended opcodes as `0xfe00 | second byte`.
    pub opcode: u16,
    pub mnemonic: &'static str,
    /// Size of the inline operand in bytes: 0, 1, 4 or 8.
    pub operand_size: usize,
}

const fn op(opcode: u16, mnemonic: &'static str, operand_size: usize) -> OpcodeInfo {
    OpcodeInfo {
        opcode,
        mnemonic,
        operand_size,
    }
}

pub(crate) const OPCODES: &[OpcodeInfo] = &[
    op(0x00, "nop", 0),
    op(0x02, "ldarg.0", 0),
    op(0x03, "ldarg.1", 0),
    op(0x04, "ldarg.2", 0),
    op(0x05, "ldarg.3", 0),
    op(0x06, "ldloc.0", 0),
    op(0x07, "ldloc.1", 0),
    op(0x08, "ldloc.2", 0),
    op(0x09, "ldloc.3", 0),
    op(0x0a, "stloc.0", 0),
    op(0x0b, "stloc.1", 0),
    op(0x0c, "stloc.2", 0),
    op(0x0d, "stloc.3", 0),
    op(0x0e, "ldarg.s", 1),
    op(0x0f, "ldarga.s", 1),
    op(0x10, "starg.s", 1),
    op(0x11, "ldloc.s", 1),
    op(0x12, "ldloca.s", 1),
    op(0x13, "stloc.s", 1),
    op(0x14, "ldnull", 0),
    op(0x15, "ldc.i4.m1", 0),
    op(0x16, "ldc.i4.0", 0),
    op(0x17, "ldc.i4.1", 0),
    op(0x18, "ldc.i4.2", 0),
    op(0x19, "ldc.i4.3", 0),
    op(0x1a, "ldc.i4.4", 0),
    op(0x1b, "ldc.i4.5", 0),
    op(0x1c, "ldc.i4.6", 0),
    op(0x1d, "ldc.i4.7", 0),
    op(0x1e, "ldc.i4.8", 0),
    op(0x1f, "ldc.i4.s", 1),
    op(0x20, "ldc.i4", 4),
    op(0x21, "ldc.i8", 8),
    op(0x22, "ldc.r4", 4),
    op(0x23, "ldc.r8", 8),
    op(0x25, "dup", 0),
    op(0x26, "pop", 0),
    op(0x28, "call", 4),
    op(0x2a, "ret", 0),
    op(0x58, "add", 0),
    op(0x59, "sub", 0),
    op(0x5a, "mul", 0),
    op(0x5b, "div", 0),
    op(0x5c, "div.un", 0),
    op(0x5d, "rem", 0),
    op(0x5e, "rem.un", 0),
    op(0x5f, "and", 0),
    op(0x60, "or", 0),
    op(0x61, "xor", 0),
    op(0x62, "shl", 0),
    op(0x63, "shr", 0),
    op(0x64, "shr.un", 0),
    op(0x65, "neg", 0),
    op(0x66, "not", 0),
    op(0x67, "conv.i1", 0),
    op(0x68, "conv.i2", 0),
    op(0x69, "conv.i4", 0),
    op(0x6a, "conv.i8", 0),
    op(0x6b, "conv.r4", 0),
    op(0x6c, "conv.r8", 0),
    op(0x6d, "conv.u4", 0),
    op(0x6e, "conv.u8", 0),
    op(0x6f, "callvirt", 4),
    op(0x72, "ldstr", 4),
    op(0x73, "newobj", 4),
    op(0x74, "castclass", 4),
    op(0x75, "isinst", 4),
    op(0x7b, "ldfld", 4),
    op(0x7c, "ldflda", 4),
    op(0x7e, "ldsfld", 4),
    op(0x7f, "ldsflda", 4),
    op(0x8c, "box", 4),
    op(0x8d, "newarr", 4),
    op(0x8e, "ldlen", 0),
    op(0x90, "ldelem.i1", 0),
    op(0x91, "ldelem.u1", 0),
    op(0x92, "ldelem.i2", 0),
    op(0x93, "ldelem.u2", 0),
    op(0x94, "ldelem.i4", 0),
    op(0x95, "ldelem.u4", 0),
    op(0x96, "ldelem.i8", 0),
    op(0x97, "ldelem.i", 0),
    op(0x98, "ldelem.r4", 0),
    op(0x99, "ldelem.r8", 0),
    op(0x9a, "ldelem.ref", 0),
    op(0xa3, "ldelem", 4),
    op(0xd1, "conv.u2", 0),
    op(0xd2, "conv.u1", 0),
    op(0xfe01, "ceq", 0),
    op(0xfe02, "cgt", 0),
    op(0xfe03, "cgt.un", 0),
    op(0xfe04, "clt", 0),
    op(0xfe05, "clt.un", 0),
];
