#![allow(dead_code)]

use std::sync::Arc;

use il_decompiler::metadata::*;

pub const GET_COUNT: u32 = 0x0a00_0001;
pub const SET_VALUE: u32 = 0x0a00_0002;
pub const ADD_CHANGED: u32 = 0x0a00_0003;
pub const REMOVE_CHANGED: u32 = 0x0a00_0004;
pub const GET_ITEM: u32 = 0x0a00_0005;
pub const SET_ITEM: u32 = 0x0a00_0006;
pub const OP_EQUALITY: u32 = 0x0a00_0007;
pub const MATH_MAX: u32 = 0x0a00_0008;
pub const DESCRIBE: u32 = 0x0a00_0009;
pub const GET_CELL: u32 = 0x0a00_000a;
pub const ADD_MISSING: u32 = 0x0a00_000b;

pub const FIELD_X: u32 = 0x0400_0001;
pub const FIELD_SIZE: u32 = 0x0400_0002;
pub const FIELD_DEFAULT: u32 = 0x0400_0003;

pub const WIDGET_CTOR: u32 = 0x0600_0001;

pub const TYPE_INT32: u32 = 0x0200_0001;
pub const TYPE_STRING: u32 = 0x0200_0002;
pub const TYPE_WIDGET: u32 = 0x0200_0003;

pub const STR_HELLO: u32 = 0x7000_0001;

pub fn handler_type() -> ClrType {
    ClassInfo::new("EventHandler", TypeKind::Delegate).into_type()
}

pub fn func_type() -> ClrType {
    ClassInfo::new("Func", TypeKind::Delegate).into_type()
}

pub fn changed_event() -> Arc<EventRef> {
    Arc::new(EventRef::new("Widget", "Changed", handler_type()))
}

/// `class Widget { event EventHandler Changed; [DefaultMember("Item")] }`
pub fn widget_type() -> ClrType {
    ClassInfo::new("Widget", TypeKind::Class)
        .with_event(changed_event())
        .with_default_member("Item")
        .into_type()
}

pub fn point_type() -> ClrType {
    ClassInfo::new("Point", TypeKind::ValueType).into_type()
}

fn accessor(name: &str, parameters: Vec<ParameterInfo>, return_type: ClrType) -> MethodRef {
    MethodRef::new(
        "Widget",
        name,
        parameters,
        return_type,
        MethodAttributes::SPECIAL_NAME,
    )
}

pub fn get_count() -> MethodRef {
    accessor("get_Count", vec![], ClrType::Int32)
}

pub fn set_value() -> MethodRef {
    accessor(
        "set_Value",
        vec![ParameterInfo::new("value", ClrType::Int32)],
        ClrType::Void,
    )
}

pub fn get_item() -> MethodRef {
    accessor(
        "get_Item",
        vec![ParameterInfo::new("index", ClrType::Int32)],
        ClrType::String,
    )
}

pub fn set_item() -> MethodRef {
    accessor(
        "set_Item",
        vec![
            ParameterInfo::new("index", ClrType::Int32),
            ParameterInfo::new("value", ClrType::String),
        ],
        ClrType::Void,
    )
}

pub fn get_cell() -> MethodRef {
    accessor(
        "get_Cell",
        vec![ParameterInfo::new("index", ClrType::Int32)],
        ClrType::String,
    )
}

pub fn set_cell() -> MethodRef {
    accessor(
        "set_Cell",
        vec![
            ParameterInfo::new("index", ClrType::Int32),
            ParameterInfo::new("value", ClrType::String),
        ],
        ClrType::Void,
    )
}

pub fn add_missing() -> MethodRef {
    accessor(
        "add_Missing",
        vec![ParameterInfo::new("value", handler_type())],
        ClrType::Void,
    )
}

pub fn op_equality() -> MethodRef {
    MethodRef::new(
        "Widget",
        "op_Equality",
        vec![
            ParameterInfo::new("left", widget_type()),
            ParameterInfo::new("right", widget_type()),
        ],
        ClrType::Boolean,
        MethodAttributes::STATIC | MethodAttributes::SPECIAL_NAME,
    )
}

pub fn math_max() -> MethodRef {
    MethodRef::new(
        "Math",
        "Max",
        vec![
            ParameterInfo::new("val1", ClrType::Int32),
            ParameterInfo::new("val2", ClrType::Int32),
        ],
        ClrType::Int32,
        MethodAttributes::STATIC,
    )
}

pub fn describe() -> MethodRef {
    MethodRef::new(
        "Widget",
        "Describe",
        vec![ParameterInfo::new("verbose", ClrType::Boolean)],
        ClrType::String,
        MethodAttributes::STATIC,
    )
}

pub fn field_x() -> FieldRef {
    FieldRef::new("Point", "X", ClrType::Int32, FieldAttributes::empty())
}

pub fn field_size() -> FieldRef {
    FieldRef::new("Widget", "Size", ClrType::Int32, FieldAttributes::empty())
}

pub fn field_default() -> FieldRef {
    FieldRef::new(
        "Widget",
        "Default",
        widget_type(),
        FieldAttributes::STATIC | FieldAttributes::INIT_ONLY,
    )
}

pub fn widget_ctor() -> ConstructorRef {
    ConstructorRef::new(
        widget_type(),
        vec![ParameterInfo::new("size", ClrType::Int32)],
    )
}

pub fn table() -> MetadataTable {
    let event = changed_event();
    MetadataTable::new()
        .with_method(GET_COUNT, get_count())
        .with_method(SET_VALUE, set_value())
        .with_method(ADD_CHANGED, (*event.add_method).clone())
        .with_method(REMOVE_CHANGED, (*event.remove_method).clone())
        .with_method(GET_ITEM, get_item())
        .with_method(SET_ITEM, set_item())
        .with_method(OP_EQUALITY, op_equality())
        .with_method(MATH_MAX, math_max())
        .with_method(DESCRIBE, describe())
        .with_method(GET_CELL, get_cell())
        .with_method(ADD_MISSING, add_missing())
        .with_field(FIELD_X, field_x())
        .with_field(FIELD_SIZE, field_size())
        .with_field(FIELD_DEFAULT, field_default())
        .with_constructor(WIDGET_CTOR, widget_ctor())
        .with_type(TYPE_INT32, ClrType::Int32)
        .with_type(TYPE_STRING, ClrType::String)
        .with_type(TYPE_WIDGET, widget_type())
        .with_string(STR_HELLO, "hello")
}

/// Little IL assembler for test bodies.
#[derive(Default)]
pub struct Il(Vec<u8>);

impl Il {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn op(mut self, opcode: u8) -> Self {
        self.0.push(opcode);
        self
    }

    pub fn op_u8(mut self, opcode: u8, operand: u8) -> Self {
        self.0.extend([opcode, operand]);
        self
    }

    pub fn op_token(mut self, opcode: u8, token: u32) -> Self {
        self.0.push(opcode);
        self.0.extend(token.to_le_bytes());
        self
    }

    pub fn bytes(mut self, bytes: &[u8]) -> Self {
        self.0.extend_from_slice(bytes);
        self
    }

    pub fn build(self) -> Vec<u8> {
        self.0
    }
}

pub fn body(il: Vec<u8>) -> MethodBody {
    MethodBody {
        il,
        max_stack: 8,
        locals: Vec::new(),
        init_locals: false,
    }
}

pub fn static_method(parameters: Vec<ParameterInfo>, return_type: ClrType, il: Vec<u8>) -> MethodDef {
    MethodDef {
        name: "Lambda".into(),
        declaring_type: ClassInfo::new("Closure", TypeKind::Class).into_type(),
        parameters,
        return_type,
        attributes: MethodAttributes::STATIC,
        body: body(il),
    }
}

pub fn widget_method(parameters: Vec<ParameterInfo>, return_type: ClrType, il: Vec<u8>) -> MethodDef {
    MethodDef {
        name: "Lambda".into(),
        declaring_type: widget_type(),
        parameters,
        return_type,
        attributes: MethodAttributes::empty(),
        body: body(il),
    }
}

pub fn delegate(method: MethodDef) -> Delegate {
    Delegate::new(func_type(), method)
}
