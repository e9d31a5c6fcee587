use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

bitflags! {
    #[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
    pub struct MethodAttributes: u16 {
        const STATIC = 0x0010;          // Defined on type, not per instance.
        const FINAL = 0x0020;           // Cannot be overridden.
        const VIRTUAL = 0x0040;         // Virtual method.
        const SPECIAL_NAME = 0x0800;    // Name is special (accessor, operator).
        const RT_SPECIAL_NAME = 0x1000; // Runtime checks the name encoding (.ctor).
    }
}

bitflags! {
    #[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
    pub struct FieldAttributes: u16 {
        const STATIC = 0x0010;    // Defined on type, not per instance.
        const INIT_ONLY = 0x0020; // Field can only be initialized, not written after init.
        const LITERAL = 0x0040;   // Value is a compile time constant.
    }
}

/// Category of a user-defined type.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TypeKind {
    Class,
    ValueType,
    Interface,
    Delegate,
}

/// A user-defined type together with the metadata the rewrite passes need.
#[derive(Debug)]
pub struct ClassInfo {
    pub name: String,
    pub kind: TypeKind,
    pub events: Vec<Arc<EventRef>>,
    /// Name of the indexed property marked as the type's default member.
    pub default_member: Option<String>,
}

impl ClassInfo {
    pub fn new(name: impl Into<String>, kind: TypeKind) -> Self {
        ClassInfo {
            name: name.into(),
            kind,
            events: Vec::new(),
            default_member: None,
        }
    }

    pub fn with_event(mut self, event: Arc<EventRef>) -> Self {
        self.events.push(event);
        self
    }

    pub fn with_default_member(mut self, name: impl Into<String>) -> Self {
        self.default_member = Some(name.into());
        self
    }

    pub fn find_event(&self, name: &str) -> Option<&Arc<EventRef>> {
        self.events.iter().find(|e| e.name == name)
    }

    pub fn into_type(self) -> ClrType {
        ClrType::Class(Arc::new(self))
    }
}

// Types are identified by name.
impl PartialEq for ClassInfo {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

/// Types as seen by the decompiler.
#[derive(Clone, Debug, PartialEq)]
pub enum ClrType {
    Void,
    Boolean,
    Char,
    SByte,
    Byte,
    Int16,
    UInt16,
    Int32,
    UInt32,
    Int64,
    UInt64,
    IntPtr,
    Single,
    Double,
    String,
    Object,
    Array(Box<ClrType>),
    Class(Arc<ClassInfo>),
}

impl ClrType {
    pub fn array_of(element: ClrType) -> Self {
        ClrType::Array(Box::new(element))
    }

    /// Returns the type name used in rendered trees and error messages.
    pub fn name(&self) -> String {
        match self {
            ClrType::Void => "Void".into(),
            ClrType::Boolean => "Boolean".into(),
            ClrType::Char => "Char".into(),
            ClrType::SByte => "SByte".into(),
            ClrType::Byte => "Byte".into(),
            ClrType::Int16 => "Int16".into(),
            ClrType::UInt16 => "UInt16".into(),
            ClrType::Int32 => "Int32".into(),
            ClrType::UInt32 => "UInt32".into(),
            ClrType::Int64 => "Int64".into(),
            ClrType::UInt64 => "UInt64".into(),
            ClrType::IntPtr => "IntPtr".into(),
            ClrType::Single => "Single".into(),
            ClrType::Double => "Double".into(),
            ClrType::String => "String".into(),
            ClrType::Object => "Object".into(),
            ClrType::Array(inner) => format!("{}[]", inner.name()),
            ClrType::Class(info) => info.name.clone(),
        }
    }

    pub fn is_value_type(&self) -> bool {
        match self {
            ClrType::Void | ClrType::String | ClrType::Object | ClrType::Array(_) => false,
            ClrType::Class(info) => info.kind == TypeKind::ValueType,
            _ => true,
        }
    }

    pub fn is_delegate(&self) -> bool {
        matches!(self, ClrType::Class(info) if info.kind == TypeKind::Delegate)
    }

    pub fn element_type(&self) -> Option<&ClrType> {
        match self {
            ClrType::Array(inner) => Some(inner),
            _ => None,
        }
    }

    pub fn class_info(&self) -> Option<&Arc<ClassInfo>> {
        match self {
            ClrType::Class(info) => Some(info),
            _ => None,
        }
    }

    /// Whether a value of type `source` can be passed where `self` is declared
    /// without a conversion.
    ///
    /// Only identity and widening to `Object` are recognised; interface and
    /// base-class relationships are not modelled.
    pub fn is_assignable_from(&self, source: &ClrType) -> bool {
        self == source || (*self == ClrType::Object && *source != ClrType::Void)
    }
}

impl fmt::Display for ClrType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

/// An object instance whose fields can be read while folding constants.
#[derive(Clone, Debug, PartialEq)]
pub struct ObjectValue {
    pub ty: ClrType,
    fields: BTreeMap<String, Value>,
}

impl ObjectValue {
    pub fn new(ty: ClrType) -> Self {
        ObjectValue {
            ty,
            fields: BTreeMap::new(),
        }
    }

    pub fn with_field(mut self, name: impl Into<String>, value: Value) -> Self {
        self.fields.insert(name.into(), value);
        self
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }
}

/// A concrete value carried by a constant node.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Null,
    Boolean(bool),
    Char(u16),
    I8(i8),
    U8(u8),
    I16(i16),
    U16(u16),
    I32(i32),
    U32(u32),
    I64(i64),
    U64(u64),
    F32(f32),
    F64(f64),
    String(Arc<str>),
    Object(Arc<ObjectValue>),
}

impl Value {
    pub fn object(object: ObjectValue) -> Self {
        Value::Object(Arc::new(object))
    }

    /// The value a zero-initialized slot of type `ty` holds.
    pub fn default_for(ty: &ClrType) -> Self {
        match ty {
            ClrType::Boolean => Value::Boolean(false),
            ClrType::Char => Value::Char(0),
            ClrType::SByte => Value::I8(0),
            ClrType::Byte => Value::U8(0),
            ClrType::Int16 => Value::I16(0),
            ClrType::UInt16 => Value::U16(0),
            ClrType::Int32 => Value::I32(0),
            ClrType::UInt32 => Value::U32(0),
            ClrType::Int64 | ClrType::IntPtr => Value::I64(0),
            ClrType::UInt64 => Value::U64(0),
            ClrType::Single => Value::F32(0.0),
            ClrType::Double => Value::F64(0.0),
            ClrType::Class(info) if info.kind == TypeKind::ValueType => {
                Value::object(ObjectValue::new(ty.clone()))
            }
            _ => Value::Null,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Boolean(v) => write!(f, "{v}"),
            Value::Char(c) => match char::from_u32(u32::from(*c)) {
                Some(c) => write!(f, "'{}'", c.escape_default()),
                None => write!(f, "'\\u{c:04x}'"),
            },
            Value::I8(v) => write!(f, "{v}"),
            Value::U8(v) => write!(f, "{v}"),
            Value::I16(v) => write!(f, "{v}"),
            Value::U16(v) => write!(f, "{v}"),
            Value::I32(v) => write!(f, "{v}"),
            Value::U32(v) => write!(f, "{v}"),
            Value::I64(v) => write!(f, "{v}"),
            Value::U64(v) => write!(f, "{v}"),
            Value::F32(v) => write!(f, "{v}"),
            Value::F64(v) => write!(f, "{v}"),
            Value::String(s) => write!(f, "\"{}\"", s.escape_default()),
            Value::Object(obj) => write!(f, "value({})", obj.ty),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ParameterInfo {
    pub name: String,
    pub ty: ClrType,
}

impl ParameterInfo {
    pub fn new(name: impl Into<String>, ty: ClrType) -> Self {
        ParameterInfo {
            name: name.into(),
            ty,
        }
    }
}

/// A method referenced by a `call`/`callvirt` token.
#[derive(Clone, Debug, PartialEq)]
pub struct MethodRef {
    pub name: String,
    pub declaring_type: String,
    pub parameters: Vec<ParameterInfo>,
    pub return_type: ClrType,
    pub attributes: MethodAttributes,
}

impl MethodRef {
    pub fn new(
        declaring_type: impl Into<String>,
        name: impl Into<String>,
        parameters: Vec<ParameterInfo>,
        return_type: ClrType,
        attributes: MethodAttributes,
    ) -> Self {
        MethodRef {
            name: name.into(),
            declaring_type: declaring_type.into(),
            parameters,
            return_type,
            attributes,
        }
    }

    pub fn is_static(&self) -> bool {
        self.attributes.contains(MethodAttributes::STATIC)
    }

    pub fn is_special_name(&self) -> bool {
        self.attributes.contains(MethodAttributes::SPECIAL_NAME)
    }
}

/// A constructor referenced by a `newobj` token.
#[derive(Clone, Debug, PartialEq)]
pub struct ConstructorRef {
    pub declaring_type: ClrType,
    pub parameters: Vec<ParameterInfo>,
}

impl ConstructorRef {
    pub fn new(declaring_type: ClrType, parameters: Vec<ParameterInfo>) -> Self {
        ConstructorRef {
            declaring_type,
            parameters,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct FieldRef {
    pub name: String,
    pub declaring_type: String,
    pub field_type: ClrType,
    pub attributes: FieldAttributes,
}

impl FieldRef {
    pub fn new(
        declaring_type: impl Into<String>,
        name: impl Into<String>,
        field_type: ClrType,
        attributes: FieldAttributes,
    ) -> Self {
        FieldRef {
            name: name.into(),
            declaring_type: declaring_type.into(),
            field_type,
            attributes,
        }
    }

    pub fn is_static(&self) -> bool {
        self.attributes.contains(FieldAttributes::STATIC)
    }
}

/// An event and its registered add/remove accessors.
#[derive(Clone, Debug, PartialEq)]
pub struct EventRef {
    pub name: String,
    pub declaring_type: String,
    pub handler_type: ClrType,
    pub add_method: Arc<MethodRef>,
    pub remove_method: Arc<MethodRef>,
}

impl EventRef {
    /// Builds an event whose accessors follow the `add_<Name>`/`remove_<Name>`
    /// convention and take the handler as their single parameter.
    pub fn new(declaring_type: impl Into<String>, name: impl Into<String>, handler_type: ClrType) -> Self {
        let declaring_type = declaring_type.into();
        let name = name.into();
        let accessor = |prefix: &str| {
            Arc::new(MethodRef::new(
                declaring_type.clone(),
                format!("{prefix}{name}"),
                vec![ParameterInfo::new("value", handler_type.clone())],
                ClrType::Void,
                MethodAttributes::SPECIAL_NAME | MethodAttributes::VIRTUAL,
            ))
        };
        let add_method = accessor("add_");
        let remove_method = accessor("remove_");
        EventRef {
            name,
            declaring_type,
            handler_type,
            add_method,
            remove_method,
        }
    }
}

/// Raw body of a method: IL plus the frame layout the decoder needs.
#[derive(Clone, Debug, Default)]
pub struct MethodBody {
    pub il: Vec<u8>,
    pub max_stack: u16,
    pub locals: Vec<ClrType>,
    pub init_locals: bool,
}

/// The method a delegate points at.
#[derive(Clone, Debug)]
pub struct MethodDef {
    pub name: String,
    pub declaring_type: ClrType,
    pub parameters: Vec<ParameterInfo>,
    pub return_type: ClrType,
    pub attributes: MethodAttributes,
    pub body: MethodBody,
}

impl MethodDef {
    pub fn is_static(&self) -> bool {
        self.attributes.contains(MethodAttributes::STATIC)
    }
}

/// A callable to decompile: a method, the delegate type it is bound to and,
/// for instance methods, the bound target object.
#[derive(Clone, Debug)]
pub struct Delegate {
    pub delegate_type: ClrType,
    pub method: Arc<MethodDef>,
    pub target: Option<Value>,
}

impl Delegate {
    pub fn new(delegate_type: ClrType, method: MethodDef) -> Self {
        Delegate {
            delegate_type,
            method: Arc::new(method),
            target: None,
        }
    }

    pub fn with_target(mut self, target: Value) -> Self {
        self.target = Some(target);
        self
    }
}
