//! Token-level definitions for Direct3D shader bytecode.
//!
//! This crate is the bit-layout layer shared by the decoders: the opcode and
//! operand enums of the unified SM4/SM5 token format, named accessor
//! functions over raw 32-bit token words, and the legacy DX9 (SM1-SM3)
//! encodings. No allocation, no I/O; every accessor is a pure function of one
//! word.

pub mod dx9;
pub mod name;
pub mod opcode;
pub mod operand;
pub mod token;

pub use name::SpecialName;
pub use opcode::Opcode;
pub use operand::{
    ExtendedOperandType, IndexRepresentation, OperandModifier, OperandMinPrecision,
    OperandNumComponents, OperandSelectionMode, OperandType, SwizzleSource, IDENTITY_SWIZZLE,
};
pub use token::{
    AddressOffsetChannel, CbAccessPattern, CustomDataClass, ExtendedOpcodeType, GlobalFlags,
    InterpolationMode,
    Primitive, PrimitiveTopology, ResInfoReturnType, ResourceDimension, ResourceReturnType,
    ShaderType, SyncFlags, TessDomain, TessOutputPrimitive, TessPartitioning, TestBoolean,
};
