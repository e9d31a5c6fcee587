mod common;

use std::sync::Arc;

use pretty_assertions::assert_eq;

use common::*;
use il_decompiler::error::{DecompileError, DecompileResult, TokenKind};
use il_decompiler::metadata::{ClrType, FieldRef, MetadataTable};
use il_decompiler::opcode::{self, Instruction, Token};
use il_decompiler::reader::{self, Disassembler, InstructionSink};

// ---- Opcode decoding tests ----

#[test]
fn test_decode_single_byte_opcodes() {
    let code = [0x02, 0x58, 0x2a];
    assert_eq!(opcode::decode_at(&code, 0).unwrap(), (Instruction::Ldarg0, 1));
    assert_eq!(opcode::decode_at(&code, 1).unwrap(), (Instruction::Add, 2));
    assert_eq!(opcode::decode_at(&code, 2).unwrap(), (Instruction::Ret, 3));
}

#[test]
fn test_decode_extended_opcodes() {
    let code = [0xfe, 0x01, 0xfe, 0x03, 0xfe, 0x05];
    assert_eq!(opcode::decode_at(&code, 0).unwrap(), (Instruction::Ceq, 2));
    assert_eq!(opcode::decode_at(&code, 2).unwrap(), (Instruction::CgtUn, 4));
    assert_eq!(opcode::decode_at(&code, 4).unwrap(), (Instruction::CltUn, 6));
}

#[test]
fn test_decode_inline_operands() {
    assert_eq!(
        opcode::decode_at(&[0x1f, 0xff], 0).unwrap(),
        (Instruction::LdcI4S(-1), 2)
    );
    assert_eq!(
        opcode::decode_at(&[0x20, 0x78, 0x56, 0x34, 0x12], 0).unwrap(),
        (Instruction::LdcI4(0x1234_5678), 5)
    );
    assert_eq!(
        opcode::decode_at(&[0x28, 0x01, 0x00, 0x00, 0x0a], 0).unwrap(),
        (Instruction::Call(Token(0x0a00_0001)), 5)
    );
    assert_eq!(
        opcode::decode_at(&[0x13, 0x07], 0).unwrap(),
        (Instruction::StlocS(7), 2)
    );

    let mut r8 = vec![0x23];
    r8.extend(1.5f64.to_le_bytes());
    assert_eq!(opcode::decode_at(&r8, 0).unwrap(), (Instruction::LdcR8(1.5), 9));

    let mut i8 = vec![0x21];
    i8.extend((-2i64).to_le_bytes());
    assert_eq!(opcode::decode_at(&i8, 0).unwrap(), (Instruction::LdcI8(-2), 9));
}

#[test]
fn test_decode_unsupported_opcode() {
    // brfalse.s
    assert_eq!(
        opcode::decode_at(&[0x2c, 0x00], 0),
        Err(DecompileError::UnsupportedInstruction {
            offset: 0,
            opcode: 0x2c
        })
    );
    // ldftn
    assert_eq!(
        opcode::decode_at(&[0x00, 0xfe, 0x06, 0, 0, 0, 0], 1),
        Err(DecompileError::UnsupportedInstruction {
            offset: 1,
            opcode: 0xfe06
        })
    );
}

#[test]
fn test_decode_truncated_operand() {
    assert_eq!(
        opcode::decode_at(&[0x20, 0x01, 0x00], 0),
        Err(DecompileError::TruncatedInstruction {
            offset: 0,
            opcode: 0x20
        })
    );
    assert_eq!(
        opcode::decode_at(&[0xfe], 0),
        Err(DecompileError::TruncatedInstruction {
            offset: 0,
            opcode: 0xfe
        })
    );
}

#[test]
fn test_decode_past_end() {
    assert_eq!(
        opcode::decode_at(&[0x2a], 1),
        Err(DecompileError::MissingReturn { offset: 1 })
    );
}

#[test]
fn test_instruction_metadata() {
    assert_eq!(Instruction::Ceq.opcode(), 0xfe01);
    assert_eq!(Instruction::Ceq.size(), 2);
    assert_eq!(Instruction::LdcI8(0).size(), 9);
    assert_eq!(Instruction::LdargS(4).size(), 2);
    assert_eq!(Instruction::Newobj(Token(1)).size(), 5);
    assert_eq!(Instruction::LdelemRef.mnemonic(), "ldelem.ref");
    assert_eq!(Instruction::LdcI4S(-3).to_string(), "ldc.i4.s -3");
    assert_eq!(Instruction::Ldsfld(Token(0x0400_0003)).to_string(), "ldsfld 0x04000003");
    assert!(opcode::opcode_info(0x2c).is_none());
}

// ---- Sink dispatch tests ----

/// Records which sink operations ran, and in what order.
#[derive(Default)]
struct Recorder {
    offsets: Vec<usize>,
    calls: Vec<String>,
}

impl InstructionSink for Recorder {
    fn instruction(&mut self, offset: usize, _instruction: &Instruction) -> DecompileResult<()> {
        self.offsets.push(offset);
        Ok(())
    }

    fn ldarg(&mut self, index: u8) -> DecompileResult<()> {
        self.calls.push(format!("ldarg {index}"));
        Ok(())
    }

    fn ldc_i4(&mut self, value: i32) -> DecompileResult<()> {
        self.calls.push(format!("ldc.i4 {value}"));
        Ok(())
    }

    fn ldstr(&mut self, value: Arc<str>) -> DecompileResult<()> {
        self.calls.push(format!("ldstr {value}"));
        Ok(())
    }

    fn ldsfld(&mut self, field: Arc<FieldRef>) -> DecompileResult<()> {
        self.calls.push(format!("ldsfld {}", field.name));
        Ok(())
    }

    fn ldsflda(&mut self, field: Arc<FieldRef>) -> DecompileResult<()> {
        self.calls.push(format!("ldsflda {}", field.name));
        Ok(())
    }

    fn ldelem(&mut self, element_type: ClrType) -> DecompileResult<()> {
        self.calls.push(format!("ldelem {element_type}"));
        Ok(())
    }

    fn ret(&mut self) -> DecompileResult<()> {
        self.calls.push("ret".into());
        Ok(())
    }
}

#[test]
fn test_read_dispatches_short_and_long_forms() {
    let il = Il::new()
        .op(0x03) // ldarg.1
        .op_u8(0x0e, 5) // ldarg.s 5
        .op(0x15) // ldc.i4.m1
        .op_u8(0x1f, 0x80) // ldc.i4.s -128
        .op(0x1e) // ldc.i4.8
        .op(0x58) // add, default no-op
        .op(0x2a)
        .build();

    let mut recorder = Recorder::default();
    reader::read(&il, &MetadataTable::new(), &mut recorder).unwrap();

    assert_eq!(
        recorder.calls,
        vec!["ldarg 1", "ldarg 5", "ldc.i4 -1", "ldc.i4 -128", "ldc.i4 8", "ret"]
    );
    assert_eq!(recorder.offsets, vec![0, 1, 3, 4, 6, 7, 8]);
}

#[test]
fn test_read_resolves_tokens() {
    let il = Il::new()
        .op_token(0x72, STR_HELLO)
        .op_token(0x7e, FIELD_DEFAULT)
        .op_token(0x7f, FIELD_DEFAULT)
        .op_token(0xa3, TYPE_WIDGET)
        .op(0x9a) // ldelem.ref
        .op(0x94) // ldelem.i4
        .op(0x2a)
        .build();

    let mut recorder = Recorder::default();
    reader::read(&il, &table(), &mut recorder).unwrap();

    assert_eq!(
        recorder.calls,
        vec![
            "ldstr hello",
            "ldsfld Default",
            "ldsflda Default",
            "ldelem Widget",
            "ldelem Object",
            "ldelem Int32",
            "ret",
        ]
    );
}

#[test]
fn test_read_stops_after_ret() {
    // Trailing bytes after ret are never decoded.
    let il = Il::new().op(0x17).op(0x2a).op(0x2c).op(0xff).build();
    let mut recorder = Recorder::default();
    reader::read(&il, &MetadataTable::new(), &mut recorder).unwrap();
    assert_eq!(recorder.calls, vec!["ldc.i4 1", "ret"]);
}

#[test]
fn test_read_fails_on_unsupported_opcode() {
    let il = Il::new().op(0x17).op_u8(0x2c, 0x01).op(0x17).op(0x2a).build();
    let mut recorder = Recorder::default();
    let err = reader::read(&il, &MetadataTable::new(), &mut recorder).unwrap_err();
    assert_eq!(
        err,
        DecompileError::UnsupportedInstruction {
            offset: 1,
            opcode: 0x2c
        }
    );
    assert_eq!(recorder.calls, vec!["ldc.i4 1"]);
}

#[test]
fn test_read_fails_without_ret() {
    let il = Il::new().op(0x17).op(0x17).build();
    let err = reader::read(&il, &MetadataTable::new(), &mut Recorder::default()).unwrap_err();
    assert_eq!(err, DecompileError::MissingReturn { offset: 2 });
}

#[test]
fn test_read_fails_on_unresolved_token() {
    let il = Il::new().op(0x02).op_token(0x28, 0x0a00_00ff).op(0x2a).build();
    let err = reader::read(&il, &table(), &mut Recorder::default()).unwrap_err();
    assert_eq!(
        err,
        DecompileError::UnresolvedToken {
            offset: 1,
            token: Token(0x0a00_00ff),
            kind: TokenKind::Method,
        }
    );
}

#[test]
fn test_read_rejects_token_of_wrong_kind() {
    // A field token used as a call target.
    let il = Il::new().op_token(0x28, FIELD_X).op(0x2a).build();
    let err = reader::read(&il, &table(), &mut Recorder::default()).unwrap_err();
    assert_eq!(
        err,
        DecompileError::UnresolvedToken {
            offset: 0,
            token: Token(FIELD_X),
            kind: TokenKind::Method,
        }
    );
}

struct FailOnConstant;

impl InstructionSink for FailOnConstant {
    fn ldc_i4(&mut self, value: i32) -> DecompileResult<()> {
        Err(DecompileError::InvalidOperand {
            message: format!("constant {value}"),
        })
    }

    fn ret(&mut self) -> DecompileResult<()> {
        panic!("decoding should have stopped at the failing constant");
    }
}

#[test]
fn test_sink_error_aborts_read() {
    let il = Il::new().op(0x02).op(0x18).op(0x2a).build();
    let err = reader::read(&il, &MetadataTable::new(), &mut FailOnConstant).unwrap_err();
    assert_eq!(
        err,
        DecompileError::InvalidOperand {
            message: "constant 2".into()
        }
    );
}

// ---- Disassembler tests ----

#[test]
fn test_disassembler_listing() {
    let il = Il::new()
        .op(0x02)
        .op_token(0x7b, FIELD_X)
        .op(0x17)
        .op(0x58)
        .op(0x2a)
        .build();

    let listing = reader::disassemble(&il, &table()).unwrap();
    assert_eq!(
        listing,
        "IL_0000: ldarg.0\n\
         IL_0001: ldfld 0x04000001\n\
         IL_0006: ldc.i4.1\n\
         IL_0007: add\n\
         IL_0008: ret\n"
    );
}

#[test]
fn test_disassembler_extended_opcodes() {
    let il = Il::new().op(0x02).op(0x03).bytes(&[0xfe, 0x02]).op(0x2a).build();
    let mut disassembler = Disassembler::new();
    reader::read(&il, &MetadataTable::new(), &mut disassembler).unwrap();
    assert_eq!(
        disassembler.lines(),
        &[
            "IL_0000: ldarg.0".to_string(),
            "IL_0001: ldarg.1".to_string(),
            "IL_0002: cgt".to_string(),
            "IL_0004: ret".to_string(),
        ]
    );
}
