use crate::foundation::value::{Value, ValueType};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ConstIdx(pub(crate) u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct NameIdx(pub(crate) u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct TypeIdx(pub(crate) u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum MethodId {
    Len,
    Lower,
    Upper,
    Trim,
    Contains,
    StartsWith,
    EndsWith,
    Abs,
    Min,
    Max,
    IsNull,
}

impl MethodId {
    pub(crate) fn from_name(name: &str) -> Option<Self> {
        match name {
            "len" => Some(Self::Len),
            "lower" => Some(Self::Lower),
            "upper" => Some(Self::Upper),
            "trim" => Some(Self::Trim),
            "contains" => Some(Self::Contains),
            "starts_with" => Some(Self::StartsWith),
            "ends_with" => Some(Self::EndsWith),
            "abs" => Some(Self::Abs),
            "min" => Some(Self::Min),
            "max" => Some(Self::Max),
            "is_null" => Some(Self::IsNull),
            _ => None,
        }
    }

    pub(crate) fn name(self) -> &'static str {
        match self {
            Self::Len => "len",
            Self::Lower => "lower",
            Self::Upper => "upper",
            Self::Trim => "trim",
            Self::Contains => "contains",
            Self::StartsWith => "starts_with",
            Self::EndsWith => "ends_with",
            Self::Abs => "abs",
            Self::Min => "min",
            Self::Max => "max",
            Self::IsNull => "is_null",
        }
    }

    /// Operand count, receiver included.
    pub(crate) fn operands(self) -> usize {
        match self {
            Self::Len | Self::Lower | Self::Upper | Self::Trim | Self::Abs | Self::IsNull => 1,
            Self::Contains | Self::StartsWith | Self::EndsWith | Self::Min | Self::Max => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Op {
    PushConst(ConstIdx),
    LoadArg(u8),
    LoadMember(NameIdx),
    Convert(TypeIdx),

    Neg,
    Not,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,

    /// Short-circuit `&&`: a false top stays and jumps, a true top is popped.
    AndElse(u32),
    /// Short-circuit `||`: a true top stays and jumps, a false top is popped.
    OrElse(u32),
    /// Fails unless the top of the stack is a bool.
    CheckBool,
    /// Pops a bool and jumps when it is false.
    JumpIfFalse(u32),
    Jump(u32),

    CallMethod { id: MethodId, argc: u8 },
}

#[derive(Debug, Clone, Default)]
pub(crate) struct BytecodeProgram {
    pub(crate) ops: Vec<Op>,
    pub(crate) consts: Vec<Value>,
    pub(crate) names: Vec<String>,
    pub(crate) types: Vec<ValueType>,
}

impl BytecodeProgram {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push_const(&mut self, c: Value) -> ConstIdx {
        let idx = ConstIdx(self.consts.len() as u32);
        self.consts.push(c);
        idx
    }

    pub(crate) fn push_name(&mut self, name: &str) -> NameIdx {
        if let Some(i) = self.names.iter().position(|n| n == name) {
            return NameIdx(i as u32);
        }
        let idx = NameIdx(self.names.len() as u32);
        self.names.push(name.to_owned());
        idx
    }

    pub(crate) fn push_type(&mut self, ty: &ValueType) -> TypeIdx {
        if let Some(i) = self.types.iter().position(|t| t == ty) {
            return TypeIdx(i as u32);
        }
        let idx = TypeIdx(self.types.len() as u32);
        self.types.push(ty.clone());
        idx
    }

    /// Index the next emitted op will occupy.
    pub(crate) fn here(&self) -> u32 {
        self.ops.len() as u32
    }

    /// Point the jump at `at` to `target`.
    pub(crate) fn patch_jump(&mut self, at: u32, target: u32) {
        let op = &mut self.ops[at as usize];
        *op = match *op {
            Op::AndElse(_) => Op::AndElse(target),
            Op::OrElse(_) => Op::OrElse(target),
            Op::JumpIfFalse(_) => Op::JumpIfFalse(target),
            Op::Jump(_) => Op::Jump(target),
            other => other,
        };
    }
}
