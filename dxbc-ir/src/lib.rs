//! Unified in-memory representation of a decoded shader.
//!
//! One IR covers both encodings: the SM4/SM5 token stream and the legacy
//! SM1-SM3 one decode into the same [`ShaderData`], so downstream consumers
//! never branch on the source format.

pub mod declaration;
pub mod instruction;
pub mod operand;
pub mod reflect;
pub mod shader;

pub use declaration::{Declaration, DeclPayload};
pub use instruction::Instruction;
pub use operand::{ComponentSelection, Immediates, Operand, OperandDataType, OperandIndex};
pub use reflect::{Dx9ConstantSpan, Dx9RegisterSet, ResourceBinding, ResourceBindingFlags, ResourceGroup, ShaderInfo};
pub use shader::{IndexedRange, PhaseKind, ShaderData, ShaderPhase, TextureSampler};
