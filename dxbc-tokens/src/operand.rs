//! Operand-token enums and bit-field accessors.

/// Register file / value class an operand refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum OperandType {
    Temp = 0,
    Input = 1,
    Output = 2,
    IndexableTemp = 3,
    Immediate32 = 4,
    Immediate64 = 5,
    Sampler = 6,
    Resource = 7,
    ConstantBuffer = 8,
    ImmediateConstantBuffer = 9,
    Label = 10,
    InputPrimitiveId = 11,
    OutputDepth = 12,
    Null = 13,
    Rasterizer = 14,
    OutputCoverageMask = 15,
    Stream = 16,
    FunctionBody = 17,
    FunctionTable = 18,
    Interface = 19,
    FunctionInput = 20,
    FunctionOutput = 21,
    OutputControlPointId = 22,
    InputForkInstanceId = 23,
    InputJoinInstanceId = 24,
    InputControlPoint = 25,
    OutputControlPoint = 26,
    InputPatchConstant = 27,
    InputDomainPoint = 28,
    ThisPointer = 29,
    UnorderedAccessView = 30,
    ThreadGroupSharedMemory = 31,
    InputThreadId = 32,
    InputThreadGroupId = 33,
    InputThreadIdInGroup = 34,
    InputCoverageMask = 35,
    InputThreadIdInGroupFlattened = 36,
    InputGsInstanceId = 37,
    OutputDepthGreaterEqual = 38,
    OutputDepthLessEqual = 39,
    CycleCounter = 40,
}

impl OperandType {
    pub fn from_u32(value: u32) -> Option<Self> {
        use OperandType::*;
        Some(match value {
            0 => Temp,
            1 => Input,
            2 => Output,
            3 => IndexableTemp,
            4 => Immediate32,
            5 => Immediate64,
            6 => Sampler,
            7 => Resource,
            8 => ConstantBuffer,
            9 => ImmediateConstantBuffer,
            10 => Label,
            11 => InputPrimitiveId,
            12 => OutputDepth,
            13 => Null,
            14 => Rasterizer,
            15 => OutputCoverageMask,
            16 => Stream,
            17 => FunctionBody,
            18 => FunctionTable,
            19 => Interface,
            20 => FunctionInput,
            21 => FunctionOutput,
            22 => OutputControlPointId,
            23 => InputForkInstanceId,
            24 => InputJoinInstanceId,
            25 => InputControlPoint,
            26 => OutputControlPoint,
            27 => InputPatchConstant,
            28 => InputDomainPoint,
            29 => ThisPointer,
            30 => UnorderedAccessView,
            31 => ThreadGroupSharedMemory,
            32 => InputThreadId,
            33 => InputThreadGroupId,
            34 => InputThreadIdInGroup,
            35 => InputCoverageMask,
            36 => InputThreadIdInGroupFlattened,
            37 => InputGsInstanceId,
            38 => OutputDepthGreaterEqual,
            39 => OutputDepthLessEqual,
            40 => CycleCounter,
            _ => return None,
        })
    }

    /// Depth-output operand classes carry no register index; the encoding
    /// fixes their register number and mask to all-ones.
    pub fn is_depth_output(self) -> bool {
        matches!(
            self,
            Self::OutputDepth | Self::OutputDepthGreaterEqual | Self::OutputDepthLessEqual
        )
    }
}

/// Encoded component count of an operand ([1:0] of token0).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum OperandNumComponents {
    Zero = 0,
    One = 1,
    Four = 2,
    /// N-component; not produced by the opcode set this crate handles.
    Variable = 3,
}

/// Component selection mode for a 4-component operand ([3:2] of token0).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum OperandSelectionMode {
    Mask = 0,
    Swizzle = 1,
    Select1 = 2,
}

impl OperandSelectionMode {
    pub fn from_u32(value: u32) -> Option<Self> {
        match value {
            0 => Some(Self::Mask),
            1 => Some(Self::Swizzle),
            2 => Some(Self::Select1),
            _ => None,
        }
    }
}

/// One source channel of a swizzle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum SwizzleSource {
    X = 0,
    Y = 1,
    Z = 2,
    W = 3,
}

impl SwizzleSource {
    pub fn from_u32(value: u32) -> Self {
        // Total over its 2-bit field.
        match value & 3 {
            0 => Self::X,
            1 => Self::Y,
            2 => Self::Z,
            _ => Self::W,
        }
    }
}

/// The 8-bit swizzle encoding of `.xyzw` (no reordering).
pub const IDENTITY_SWIZZLE: u32 = 0xE4;

/// How one index dimension of an operand is encoded ([24:22]/[27:25]/[30:28]).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum IndexRepresentation {
    Immediate32 = 0,
    Immediate64 = 1,
    Relative = 2,
    Immediate32PlusRelative = 3,
    Immediate64PlusRelative = 4,
}

impl IndexRepresentation {
    pub fn from_u32(value: u32) -> Option<Self> {
        match value {
            0 => Some(Self::Immediate32),
            1 => Some(Self::Immediate64),
            2 => Some(Self::Relative),
            3 => Some(Self::Immediate32PlusRelative),
            4 => Some(Self::Immediate64PlusRelative),
            _ => None,
        }
    }
}

/// Source modifier from an extended operand token ([13:6]).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[repr(u32)]
pub enum OperandModifier {
    #[default]
    None = 0,
    Neg = 1,
    Abs = 2,
    AbsNeg = 3,
}

impl OperandModifier {
    pub fn from_u32(value: u32) -> Option<Self> {
        match value {
            0 => Some(Self::None),
            1 => Some(Self::Neg),
            2 => Some(Self::Abs),
            3 => Some(Self::AbsNeg),
            _ => None,
        }
    }

    /// Flip the sign part of the modifier, leaving the abs part alone.
    /// Used by the legacy decoder's `sub` -> `add` rewrite.
    pub fn negated(self) -> Self {
        match self {
            Self::None => Self::Neg,
            Self::Neg => Self::None,
            Self::Abs => Self::AbsNeg,
            Self::AbsNeg => Self::Abs,
        }
    }
}

/// Minimum-precision hint from an extended operand token ([16:14]).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[repr(u32)]
pub enum OperandMinPrecision {
    #[default]
    Default = 0,
    Float16 = 1,
    Float2_8 = 2,
    Sint16 = 4,
    Uint16 = 5,
}

impl OperandMinPrecision {
    pub fn from_u32(value: u32) -> Option<Self> {
        match value {
            0 => Some(Self::Default),
            1 => Some(Self::Float16),
            2 => Some(Self::Float2_8),
            4 => Some(Self::Sint16),
            5 => Some(Self::Uint16),
            _ => None,
        }
    }
}

/// Discriminator of an extended operand token ([5:0]).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ExtendedOperandType {
    Empty = 0,
    Modifier = 1,
}

impl ExtendedOperandType {
    pub fn from_u32(value: u32) -> Option<Self> {
        match value {
            0 => Some(Self::Empty),
            1 => Some(Self::Modifier),
            _ => None,
        }
    }
}

// --- token0 field accessors ------------------------------------------------

pub fn num_components(token: u32) -> OperandNumComponents {
    match token & 3 {
        0 => OperandNumComponents::Zero,
        1 => OperandNumComponents::One,
        2 => OperandNumComponents::Four,
        _ => OperandNumComponents::Variable,
    }
}

pub fn selection_mode_raw(token: u32) -> u32 {
    (token >> 2) & 3
}

pub fn component_mask(token: u32) -> u32 {
    (token >> 4) & 0xF
}

pub fn swizzle_bits(token: u32) -> u32 {
    (token >> 4) & 0xFF
}

pub fn swizzle_source(token: u32, component: u32) -> SwizzleSource {
    debug_assert!(component < 4);
    SwizzleSource::from_u32((token >> (4 + 2 * component)) & 3)
}

pub fn select1_source(token: u32) -> SwizzleSource {
    SwizzleSource::from_u32((token >> 4) & 3)
}

pub fn operand_type_raw(token: u32) -> u32 {
    (token >> 12) & 0xFF
}

pub fn index_dimension(token: u32) -> u32 {
    (token >> 20) & 3
}

pub fn index_representation_raw(dimension: u32, token: u32) -> u32 {
    debug_assert!(dimension < 3);
    (token >> (22 + 3 * dimension)) & 7
}

pub fn is_extended(token: u32) -> bool {
    token & 0x8000_0000 != 0
}

// --- extended token accessors ----------------------------------------------

pub fn extended_type_raw(token: u32) -> u32 {
    token & 0x3F
}

pub fn extended_modifier_raw(token: u32) -> u32 {
    (token >> 6) & 0xFF
}

pub fn extended_min_precision_raw(token: u32) -> u32 {
    (token >> 14) & 7
}
