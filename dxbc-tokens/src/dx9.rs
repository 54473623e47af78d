//! Legacy SM1-SM3 ("DX9") token encodings.
//!
//! A legacy stream has no container: it starts with a version word whose top
//! half is the vertex- or pixel-shader signature, then a flat run of opcode
//! and parameter tokens terminated by [`END_TOKEN`].

/// Stream terminator token.
pub const END_TOKEN: u32 = 0x0000_FFFF;

/// Opcode value of an embedded comment block.
pub const COMMENT_OPCODE: u32 = 0xFFFE;

/// Legacy shader stage, from the version-word signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dx9ShaderType {
    Vertex,
    Pixel,
}

/// Signature test on the first word of a candidate legacy stream.
pub fn shader_type(version_token: u32) -> Option<Dx9ShaderType> {
    match version_token & 0xFFFF_0000 {
        0xFFFE_0000 => Some(Dx9ShaderType::Vertex),
        0xFFFF_0000 => Some(Dx9ShaderType::Pixel),
        _ => None,
    }
}

pub fn major_version(version_token: u32) -> u32 {
    (version_token >> 8) & 0xFF
}

pub fn minor_version(version_token: u32) -> u32 {
    version_token & 0xFF
}

/// Legacy opcode values (low 16 bits of an instruction token).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum Dx9Opcode {
    Nop = 0,
    Mov = 1,
    Add = 2,
    Sub = 3,
    Mad = 4,
    Mul = 5,
    Rcp = 6,
    Rsq = 7,
    Dp3 = 8,
    Dp4 = 9,
    Min = 10,
    Max = 11,
    Slt = 12,
    Sge = 13,
    Exp = 14,
    Log = 15,
    Lit = 16,
    Dst = 17,
    Lrp = 18,
    Frc = 19,
    Call = 25,
    CallNz = 26,
    Loop = 27,
    Ret = 28,
    EndLoop = 29,
    Label = 30,
    Dcl = 31,
    Pow = 32,
    Crs = 33,
    Sgn = 34,
    Abs = 35,
    Nrm = 36,
    SinCos = 37,
    Rep = 38,
    EndRep = 39,
    If = 40,
    IfC = 41,
    Else = 42,
    EndIf = 43,
    Break = 44,
    BreakC = 45,
    MovA = 46,
    DefB = 47,
    DefI = 48,
    TexCoord = 64,
    TexKill = 65,
    Tex = 66,
    ExpP = 78,
    LogP = 79,
    Cnd = 80,
    Def = 81,
    Cmp = 88,
    Dp2Add = 90,
    Dsx = 91,
    Dsy = 92,
    TexLdd = 93,
    SetP = 94,
    TexLdl = 95,
    BreakP = 96,
    Phase = 0xFFFD,
    Comment = 0xFFFE,
    End = 0xFFFF,
}

impl Dx9Opcode {
    pub fn from_u32(value: u32) -> Option<Self> {
        use Dx9Opcode::*;
        Some(match value {
            0 => Nop,
            1 => Mov,
            2 => Add,
            3 => Sub,
            4 => Mad,
            5 => Mul,
            6 => Rcp,
            7 => Rsq,
            8 => Dp3,
            9 => Dp4,
            10 => Min,
            11 => Max,
            12 => Slt,
            13 => Sge,
            14 => Exp,
            15 => Log,
            16 => Lit,
            17 => Dst,
            18 => Lrp,
            19 => Frc,
            25 => Call,
            26 => CallNz,
            27 => Loop,
            28 => Ret,
            29 => EndLoop,
            30 => Label,
            31 => Dcl,
            32 => Pow,
            33 => Crs,
            34 => Sgn,
            35 => Abs,
            36 => Nrm,
            37 => SinCos,
            38 => Rep,
            39 => EndRep,
            40 => If,
            41 => IfC,
            42 => Else,
            43 => EndIf,
            44 => Break,
            45 => BreakC,
            46 => MovA,
            47 => DefB,
            48 => DefI,
            64 => TexCoord,
            65 => TexKill,
            66 => Tex,
            78 => ExpP,
            79 => LogP,
            80 => Cnd,
            81 => Def,
            88 => Cmp,
            90 => Dp2Add,
            91 => Dsx,
            92 => Dsy,
            93 => TexLdd,
            94 => SetP,
            95 => TexLdl,
            96 => BreakP,
            0xFFFD => Phase,
            0xFFFE => Comment,
            0xFFFF => End,
            _ => return None,
        })
    }
}

/// Legacy register classes. The 5-bit value is split across two bit ranges
/// of a parameter token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum Dx9RegisterType {
    Temp = 0,
    Input = 1,
    Const = 2,
    /// Texture-coordinate register in pixel shaders, address register `a0`
    /// in vertex shaders.
    Texture = 3,
    RastOut = 4,
    AttrOut = 5,
    /// Texture-coordinate output pre-SM3, generic output `o#` in SM3.
    TexCrdOut = 6,
    ConstInt = 7,
    ColorOut = 8,
    DepthOut = 9,
    Sampler = 10,
    Const2 = 11,
    Const3 = 12,
    Const4 = 13,
    ConstBool = 14,
    Loop = 15,
    TempFloat16 = 16,
    MiscType = 17,
    Label = 18,
    Predicate = 19,
}

impl Dx9RegisterType {
    pub fn from_u32(value: u32) -> Option<Self> {
        use Dx9RegisterType::*;
        Some(match value {
            0 => Temp,
            1 => Input,
            2 => Const,
            3 => Texture,
            4 => RastOut,
            5 => AttrOut,
            6 => TexCrdOut,
            7 => ConstInt,
            8 => ColorOut,
            9 => DepthOut,
            10 => Sampler,
            11 => Const2,
            12 => Const3,
            13 => Const4,
            14 => ConstBool,
            15 => Loop,
            16 => TempFloat16,
            17 => MiscType,
            18 => Label,
            19 => Predicate,
            _ => return None,
        })
    }
}

/// `rastout` register indices (vertex shaders, pre-SM3).
pub const RASTOUT_POSITION: u32 = 0;
pub const RASTOUT_FOG: u32 = 1;
pub const RASTOUT_POINT_SIZE: u32 = 2;

/// Legacy source modifier ([27:24] of a source parameter token).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[repr(u32)]
pub enum Dx9SourceModifier {
    #[default]
    None = 0,
    Neg = 1,
    Bias = 2,
    BiasNeg = 3,
    Sign = 4,
    SignNeg = 5,
    Comp = 6,
    X2 = 7,
    X2Neg = 8,
    Dz = 9,
    Dw = 10,
    Abs = 11,
    AbsNeg = 12,
    Not = 13,
}

impl Dx9SourceModifier {
    pub fn from_u32(value: u32) -> Option<Self> {
        use Dx9SourceModifier::*;
        Some(match value {
            0 => None,
            1 => Neg,
            2 => Bias,
            3 => BiasNeg,
            4 => Sign,
            5 => SignNeg,
            6 => Comp,
            7 => X2,
            8 => X2Neg,
            9 => Dz,
            10 => Dw,
            11 => Abs,
            12 => AbsNeg,
            13 => Not,
            _ => return Option::None,
        })
    }
}

/// `dcl` semantic usage ([4:0] of the dcl token).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum Dx9Usage {
    #[default]
    Position = 0,
    BlendWeight = 1,
    BlendIndices = 2,
    Normal = 3,
    PointSize = 4,
    TexCoord = 5,
    Tangent = 6,
    Binormal = 7,
    TessFactor = 8,
    PositionT = 9,
    Color = 10,
    Fog = 11,
    Depth = 12,
    Sample = 13,
}

impl Dx9Usage {
    pub fn from_u32(value: u32) -> Option<Self> {
        use Dx9Usage::*;
        Some(match value {
            0 => Position,
            1 => BlendWeight,
            2 => BlendIndices,
            3 => Normal,
            4 => PointSize,
            5 => TexCoord,
            6 => Tangent,
            7 => Binormal,
            8 => TessFactor,
            9 => PositionT,
            10 => Color,
            11 => Fog,
            12 => Depth,
            13 => Sample,
            _ => return None,
        })
    }
}

/// Sampler texture type from a `dcl` token ([30:27]).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[repr(u32)]
pub enum Dx9TextureType {
    #[default]
    Unknown = 0,
    TwoD = 2,
    Cube = 3,
    Volume = 4,
}

impl Dx9TextureType {
    pub fn from_u32(value: u32) -> Option<Self> {
        match value {
            0 => Some(Self::Unknown),
            2 => Some(Self::TwoD),
            3 => Some(Self::Cube),
            4 => Some(Self::Volume),
            _ => None,
        }
    }
}

/// Comparison selector on `ifc`/`breakc` ([23:16] of the opcode token).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum Dx9Comparison {
    Gt = 1,
    Eq = 2,
    Ge = 3,
    Lt = 4,
    Ne = 5,
    Le = 6,
}

impl Dx9Comparison {
    pub fn from_u32(value: u32) -> Option<Self> {
        match value {
            1 => Some(Self::Gt),
            2 => Some(Self::Eq),
            3 => Some(Self::Ge),
            4 => Some(Self::Lt),
            5 => Some(Self::Ne),
            6 => Some(Self::Le),
            _ => None,
        }
    }
}

// --- token accessors ---------------------------------------------------------

pub fn opcode_raw(token: u32) -> u32 {
    token & 0xFFFF
}

/// Instruction length in parameter tokens (SM2+; zero on SM1 streams).
pub fn instruction_length(token: u32) -> u32 {
    (token >> 24) & 0xF
}

/// Comment block length in words, opcode token excluded.
pub fn comment_length(token: u32) -> u32 {
    (token >> 16) & 0x7FFF
}

pub fn comparison_raw(token: u32) -> u32 {
    (token >> 16) & 0xFF
}

pub fn register_number(param: u32) -> u32 {
    param & 0x7FF
}

/// Register class, reassembled from its split bit ranges.
pub fn register_type_raw(param: u32) -> u32 {
    ((param & 0x7000_0000) >> 28) | ((param & 0x0000_1800) >> 8)
}

pub fn has_relative_addressing(param: u32) -> bool {
    param & 0x2000 != 0
}

pub fn write_mask(param: u32) -> u32 {
    (param >> 16) & 0xF
}

pub fn dest_saturate(param: u32) -> bool {
    param & 0x0010_0000 != 0
}

pub fn swizzle_bits(param: u32) -> u32 {
    (param >> 16) & 0xFF
}

pub fn swizzle_source(param: u32, component: u32) -> u32 {
    debug_assert!(component < 4);
    (param >> (16 + 2 * component)) & 3
}

pub fn source_modifier_raw(param: u32) -> u32 {
    (param >> 24) & 0xF
}

pub fn dcl_usage_raw(token: u32) -> u32 {
    token & 0x1F
}

pub fn dcl_usage_index(token: u32) -> u32 {
    (token >> 16) & 0xF
}

pub fn dcl_texture_type_raw(token: u32) -> u32 {
    (token >> 27) & 0xF
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signature_detection() {
        assert_eq!(shader_type(0xFFFE_0300), Some(Dx9ShaderType::Vertex));
        assert_eq!(shader_type(0xFFFF_0300), Some(Dx9ShaderType::Pixel));
        assert_eq!(shader_type(0x4443_4258), None); // "XBCD"
        assert_eq!(major_version(0xFFFE_0300), 3);
        assert_eq!(minor_version(0xFFFE_0300), 0);
    }

    #[test]
    fn register_type_reassembly() {
        // Sampler (10): low bits 010 in [30:28], high bits 01 in [12:11].
        let param = 0x8000_0000 | (2 << 28) | (1 << 11) | 3;
        assert_eq!(register_type_raw(param), 10);
        assert_eq!(register_number(param), 3);
    }
}
