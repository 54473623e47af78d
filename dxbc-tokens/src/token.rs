//! Opcode-token enums and bit-field accessors for the SM4/SM5 encoding.

use bitflags::bitflags;

/// Shader stage, from the program-type field of the version token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum ShaderType {
    Pixel = 0,
    Vertex = 1,
    Geometry = 2,
    Hull = 3,
    Domain = 4,
    Compute = 5,
}

impl ShaderType {
    pub fn from_u32(value: u32) -> Option<Self> {
        match value {
            0 => Some(Self::Pixel),
            1 => Some(Self::Vertex),
            2 => Some(Self::Geometry),
            3 => Some(Self::Hull),
            4 => Some(Self::Domain),
            5 => Some(Self::Compute),
            _ => None,
        }
    }
}

/// Boolean test polarity on conditional instructions (bit 18).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[repr(u32)]
pub enum TestBoolean {
    #[default]
    Zero = 0,
    NonZero = 1,
}

/// Return type selector on `resinfo` ([12:11]).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[repr(u32)]
pub enum ResInfoReturnType {
    #[default]
    Float = 0,
    RcpFloat = 1,
    Uint = 2,
}

impl ResInfoReturnType {
    pub fn from_u32(value: u32) -> Option<Self> {
        match value {
            0 => Some(Self::Float),
            1 => Some(Self::RcpFloat),
            2 => Some(Self::Uint),
            _ => None,
        }
    }
}

/// Resource dimension on `dcl_resource` and friends ([15:11]).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum ResourceDimension {
    #[default]
    Unknown = 0,
    Buffer = 1,
    Texture1D = 2,
    Texture2D = 3,
    Texture2DMs = 4,
    Texture3D = 5,
    TextureCube = 6,
    Texture1DArray = 7,
    Texture2DArray = 8,
    Texture2DMsArray = 9,
    TextureCubeArray = 10,
    RawBuffer = 11,
    StructuredBuffer = 12,
}

impl ResourceDimension {
    pub fn from_u32(value: u32) -> Option<Self> {
        use ResourceDimension::*;
        Some(match value {
            0 => Unknown,
            1 => Buffer,
            2 => Texture1D,
            3 => Texture2D,
            4 => Texture2DMs,
            5 => Texture3D,
            6 => TextureCube,
            7 => Texture1DArray,
            8 => Texture2DArray,
            9 => Texture2DMsArray,
            10 => TextureCubeArray,
            11 => RawBuffer,
            12 => StructuredBuffer,
            _ => return None,
        })
    }
}

/// Per-component return type of a typed resource view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[repr(u32)]
pub enum ResourceReturnType {
    #[default]
    Unused = 0,
    Unorm = 1,
    Snorm = 2,
    Sint = 3,
    Uint = 4,
    Float = 5,
    Mixed = 6,
    Double = 7,
    Continued = 8,
}

impl ResourceReturnType {
    pub fn from_u32(value: u32) -> Option<Self> {
        use ResourceReturnType::*;
        Some(match value {
            0 => Unused,
            1 => Unorm,
            2 => Snorm,
            3 => Sint,
            4 => Uint,
            5 => Float,
            6 => Mixed,
            7 => Double,
            8 => Continued,
            _ => return None,
        })
    }
}

/// Constant-buffer indexing pattern (bit 11 of `dcl_constantbuffer`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum CbAccessPattern {
    ImmediateIndexed = 0,
    DynamicIndexed = 1,
}

/// Pixel-shader input interpolation mode ([14:11]).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[repr(u32)]
pub enum InterpolationMode {
    #[default]
    Undefined = 0,
    Constant = 1,
    Linear = 2,
    LinearCentroid = 3,
    LinearNoPerspective = 4,
    LinearNoPerspectiveCentroid = 5,
    LinearSample = 6,
    LinearNoPerspectiveSample = 7,
}

impl InterpolationMode {
    pub fn from_u32(value: u32) -> Option<Self> {
        use InterpolationMode::*;
        Some(match value {
            0 => Undefined,
            1 => Constant,
            2 => Linear,
            3 => LinearCentroid,
            4 => LinearNoPerspective,
            5 => LinearNoPerspectiveCentroid,
            6 => LinearSample,
            7 => LinearNoPerspectiveSample,
            _ => return None,
        })
    }
}

/// Geometry-shader output topology ([16:11]).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[repr(u32)]
pub enum PrimitiveTopology {
    #[default]
    Undefined = 0,
    PointList = 1,
    LineList = 2,
    LineStrip = 3,
    TriangleList = 4,
    TriangleStrip = 5,
}

impl PrimitiveTopology {
    pub fn from_u32(value: u32) -> Option<Self> {
        use PrimitiveTopology::*;
        Some(match value {
            0 => Undefined,
            1 => PointList,
            2 => LineList,
            3 => LineStrip,
            4 => TriangleList,
            5 => TriangleStrip,
            _ => return None,
        })
    }
}

/// Geometry-shader input primitive ([16:11]). Patch variants carry their
/// control-point count.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Primitive {
    #[default]
    Undefined,
    Point,
    Line,
    Triangle,
    LineAdj,
    TriangleAdj,
    /// SM5 patch primitive with 1-32 control points.
    ControlPointPatch(u32),
}

impl Primitive {
    pub fn from_u32(value: u32) -> Option<Self> {
        Some(match value {
            0 => Self::Undefined,
            1 => Self::Point,
            2 => Self::Line,
            3 => Self::Triangle,
            6 => Self::LineAdj,
            7 => Self::TriangleAdj,
            8..=39 => Self::ControlPointPatch(value - 7),
            _ => return None,
        })
    }
}

/// Tessellator domain ([12:11]).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[repr(u32)]
pub enum TessDomain {
    #[default]
    Undefined = 0,
    Isoline = 1,
    Tri = 2,
    Quad = 3,
}

impl TessDomain {
    pub fn from_u32(value: u32) -> Option<Self> {
        match value {
            0 => Some(Self::Undefined),
            1 => Some(Self::Isoline),
            2 => Some(Self::Tri),
            3 => Some(Self::Quad),
            _ => None,
        }
    }
}

/// Tessellator partitioning mode ([13:11]).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[repr(u32)]
pub enum TessPartitioning {
    #[default]
    Undefined = 0,
    Integer = 1,
    Pow2 = 2,
    FractionalOdd = 3,
    FractionalEven = 4,
}

impl TessPartitioning {
    pub fn from_u32(value: u32) -> Option<Self> {
        use TessPartitioning::*;
        Some(match value {
            0 => Undefined,
            1 => Integer,
            2 => Pow2,
            3 => FractionalOdd,
            4 => FractionalEven,
            _ => return None,
        })
    }
}

/// Tessellator output primitive ([13:11]).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[repr(u32)]
pub enum TessOutputPrimitive {
    #[default]
    Undefined = 0,
    Point = 1,
    Line = 2,
    TriangleCw = 3,
    TriangleCcw = 4,
}

impl TessOutputPrimitive {
    pub fn from_u32(value: u32) -> Option<Self> {
        use TessOutputPrimitive::*;
        Some(match value {
            0 => Undefined,
            1 => Point,
            2 => Line,
            3 => TriangleCw,
            4 => TriangleCcw,
            _ => return None,
        })
    }
}

/// Payload class of a `customdata` block ([31:11]).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum CustomDataClass {
    Comment = 0,
    DebugInfo = 1,
    Opaque = 2,
    DclImmediateConstantBuffer = 3,
    ShaderMessage = 4,
}

impl CustomDataClass {
    pub fn from_u32(value: u32) -> Option<Self> {
        use CustomDataClass::*;
        Some(match value {
            0 => Comment,
            1 => DebugInfo,
            2 => Opaque,
            3 => DclImmediateConstantBuffer,
            4 => ShaderMessage,
            _ => return None,
        })
    }
}

/// Discriminator of an extended opcode token ([5:0]).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ExtendedOpcodeType {
    Empty = 0,
    SampleControls = 1,
    ResourceDim = 2,
    ResourceReturnType = 3,
}

impl ExtendedOpcodeType {
    pub fn from_u32(value: u32) -> Option<Self> {
        match value {
            0 => Some(Self::Empty),
            1 => Some(Self::SampleControls),
            2 => Some(Self::ResourceDim),
            3 => Some(Self::ResourceReturnType),
            _ => None,
        }
    }
}

bitflags! {
    /// `dcl_globalflags` payload ([23:11] of its opcode token).
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
    pub struct GlobalFlags: u32 {
        const REFACTORING_ALLOWED = 1 << 11;
        const ENABLE_DOUBLE_PRECISION = 1 << 12;
        const FORCE_EARLY_DEPTH_STENCIL = 1 << 13;
        const ENABLE_RAW_AND_STRUCTURED_BUFFERS = 1 << 14;
        const SKIP_OPTIMIZATION = 1 << 15;
        const ENABLE_MINIMUM_PRECISION = 1 << 16;
        const ENABLE_DOUBLE_EXTENSIONS = 1 << 17;
        const ENABLE_SHADER_EXTENSIONS = 1 << 18;
    }
}

bitflags! {
    /// `sync` barrier scope flags (bits 11-14 of its opcode token).
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
    pub struct SyncFlags: u32 {
        const THREADS_IN_GROUP = 1 << 11;
        const THREAD_GROUP_SHARED_MEMORY = 1 << 12;
        const UAV_MEMORY_GROUP = 1 << 13;
        const UAV_MEMORY_GLOBAL = 1 << 14;
    }
}

/// Channel selector for the immediate sample-offset fields of an extended
/// opcode token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressOffsetChannel {
    U,
    V,
    W,
}

// --- opcode token0 accessors ------------------------------------------------

pub fn opcode_raw(token: u32) -> u32 {
    token & 0x7FF
}

/// Instruction length in 32-bit words, opcode token included.
pub fn instruction_length(token: u32) -> u32 {
    (token >> 24) & 0x7F
}

pub fn is_extended(token: u32) -> bool {
    token & 0x8000_0000 != 0
}

pub fn saturate(token: u32) -> bool {
    token & 0x2000 != 0
}

pub fn test_boolean(token: u32) -> TestBoolean {
    if token & 0x0004_0000 != 0 {
        TestBoolean::NonZero
    } else {
        TestBoolean::Zero
    }
}

pub fn resinfo_return_type_raw(token: u32) -> u32 {
    (token >> 11) & 3
}

pub fn sync_flags(token: u32) -> SyncFlags {
    SyncFlags::from_bits_truncate(token)
}

pub fn global_flags(token: u32) -> GlobalFlags {
    GlobalFlags::from_bits_truncate(token)
}

pub fn resource_dimension_raw(token: u32) -> u32 {
    (token >> 11) & 0x1F
}

pub fn cb_access_pattern(token: u32) -> CbAccessPattern {
    if token & 0x800 != 0 {
        CbAccessPattern::DynamicIndexed
    } else {
        CbAccessPattern::ImmediateIndexed
    }
}

pub fn interpolation_mode_raw(token: u32) -> u32 {
    (token >> 11) & 0xF
}

pub fn output_topology_raw(token: u32) -> u32 {
    (token >> 11) & 0x3F
}

pub fn input_primitive_raw(token: u32) -> u32 {
    (token >> 11) & 0x3F
}

pub fn output_control_point_count(token: u32) -> u32 {
    (token >> 11) & 0x3F
}

pub fn tess_domain_raw(token: u32) -> u32 {
    (token >> 11) & 3
}

pub fn tess_partitioning_raw(token: u32) -> u32 {
    (token >> 11) & 7
}

pub fn tess_output_primitive_raw(token: u32) -> u32 {
    (token >> 11) & 7
}

pub fn globally_coherent(token: u32) -> bool {
    token & 0x0001_0000 != 0
}

pub fn custom_data_class_raw(token: u32) -> u32 {
    token >> 11
}

/// Typed-resource return type packed 4 bits per component in a trailing word.
pub fn resource_return_type_raw(component: u32, token: u32) -> u32 {
    debug_assert!(component < 4);
    (token >> (component * 4)) & 0xF
}

// --- extended opcode token accessors ----------------------------------------

pub fn extended_opcode_type_raw(token: u32) -> u32 {
    token & 0x3F
}

/// 4-bit signed texel offset from a sample-controls extension token.
pub fn immediate_address_offset(channel: AddressOffsetChannel, token: u32) -> i8 {
    let shift = match channel {
        AddressOffsetChannel::U => 9,
        AddressOffsetChannel::V => 13,
        AddressOffsetChannel::W => 17,
    };
    let nibble = ((token >> shift) & 0xF) as i8;
    // Sign-extend the 4-bit field.
    (nibble << 4) >> 4
}

pub fn extended_resource_dimension_raw(token: u32) -> u32 {
    (token >> 6) & 0x1F
}

pub fn extended_resource_return_type_raw(component: u32, token: u32) -> u32 {
    debug_assert!(component < 4);
    (token >> (6 + component * 4)) & 0xF
}

// --- dcl_interface trailing word ---------------------------------------------

pub fn interface_table_length(token: u32) -> u32 {
    token & 0xFFFF
}

pub fn interface_array_length(token: u32) -> u32 {
    (token >> 16) & 0xFFFF
}

// --- version token -----------------------------------------------------------

pub fn program_major_version(token: u32) -> u32 {
    (token >> 4) & 0xF
}

pub fn program_minor_version(token: u32) -> u32 {
    token & 0xF
}

pub fn program_type_raw(token: u32) -> u32 {
    (token >> 16) & 0xFFFF
}
