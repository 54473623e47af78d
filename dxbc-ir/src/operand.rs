use dxbc_tokens::{OperandMinPrecision, OperandModifier, OperandType, SpecialName, SwizzleSource};

/// How the active components of a 4-component operand are selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentSelection {
    /// No selection field present (0- and 1-component operands).
    None,
    /// Destination write mask, 4 bits xyzw.
    Mask(u32),
    /// Per-channel source reorder.
    Swizzle([SwizzleSource; 4]),
    /// Single-channel replicate.
    Select1(SwizzleSource),
}

/// Inline immediate payload of an `Immediate32`/`Immediate64` operand.
#[derive(Debug, Clone, PartialEq)]
pub enum Immediates {
    None,
    /// 1 or 4 raw 32-bit words; interpretation (float or int) comes from the
    /// data-type hint.
    Imm32(Vec<u32>),
    /// 1 or 2 doubles.
    Imm64(Vec<f64>),
}

/// Value-type hint attached by context (declarations, min-precision moves).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OperandDataType {
    #[default]
    Float,
    Int,
    Uint,
    Double,
}

/// One index dimension of an operand. Relative sub-operands are owned by
/// value; dropping the parent drops the whole chain.
#[derive(Debug, Clone, PartialEq)]
pub enum OperandIndex {
    Immediate32(u32),
    Relative(Box<Operand>),
    Immediate32PlusRelative(u32, Box<Operand>),
}

impl OperandIndex {
    /// The immediate part, zero when the index is purely relative.
    pub fn immediate(&self) -> u32 {
        match self {
            Self::Immediate32(value) | Self::Immediate32PlusRelative(value, _) => *value,
            Self::Relative(_) => 0,
        }
    }

    pub fn relative(&self) -> Option<&Operand> {
        match self {
            Self::Immediate32(_) => None,
            Self::Relative(op) | Self::Immediate32PlusRelative(_, op) => Some(op),
        }
    }
}

/// A fully decoded operand.
#[derive(Debug, Clone, PartialEq)]
pub struct Operand {
    pub ty: OperandType,
    /// 0, 1 or 4.
    pub num_components: u32,
    pub selection: ComponentSelection,
    pub modifier: OperandModifier,
    pub min_precision: OperandMinPrecision,
    /// Register number from the last immediate index dimension; 0 when the
    /// operand has none (purely relative, or no indices at all).
    pub register_number: u32,
    /// Up to 3 index dimensions, outermost first.
    pub indices: Vec<OperandIndex>,
    pub immediates: Immediates,
    /// System-value name attached by an SIV/SGV declaration.
    pub special_name: SpecialName,
    pub data_type: OperandDataType,
    /// Set when context says an inline immediate is integral (`case` labels,
    /// moves into int/uint min-precision destinations).
    pub integer_immediate: bool,
}

impl Operand {
    pub fn new(ty: OperandType) -> Self {
        Self {
            ty,
            num_components: 0,
            selection: ComponentSelection::None,
            modifier: OperandModifier::None,
            min_precision: OperandMinPrecision::Default,
            register_number: 0,
            indices: Vec::new(),
            immediates: Immediates::None,
            special_name: SpecialName::Undefined,
            data_type: OperandDataType::Float,
            integer_immediate: false,
        }
    }

    /// A `null` operand, used where an emulated instruction leaves a slot
    /// unwritten.
    pub fn null() -> Self {
        Self::new(OperandType::Null)
    }

    /// Destination write mask, all-ones when the operand carries none.
    pub fn write_mask(&self) -> u32 {
        match self.selection {
            ComponentSelection::Mask(mask) => mask,
            _ => 0xF,
        }
    }
}
