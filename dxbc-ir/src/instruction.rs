use dxbc_tokens::dx9::Dx9Comparison;
use dxbc_tokens::{
    Opcode, ResInfoReturnType, ResourceDimension, ResourceReturnType, SyncFlags, TestBoolean,
};

use crate::operand::Operand;

/// A decoded executable instruction.
#[derive(Debug, Clone)]
pub struct Instruction {
    pub opcode: Opcode,
    /// Operand 0 is the destination when the opcode has one. `imul` and
    /// `udiv` carry two destinations; [`Self::first_src`] records where the
    /// sources start.
    pub operands: Vec<Operand>,
    /// Index of the first source operand.
    pub first_src: usize,
    pub saturate: bool,
    pub test_boolean: TestBoolean,
    /// Signed texel offsets (u, v, w) from a sample-controls extension.
    pub sample_offsets: Option<[i8; 3]>,
    /// Per-component return type from a resource-return-type extension.
    pub resource_return_types: Option<[ResourceReturnType; 4]>,
    /// Dimension from a resource-dim extension.
    pub resource_dimension: Option<ResourceDimension>,
    pub sync_flags: SyncFlags,
    pub resinfo_return_type: ResInfoReturnType,
    /// Function index within the interface for `fcall`.
    pub function_index: u32,
    /// Comparison carried over from legacy `ifc`/`breakc`/`cmp`; `None` for
    /// instructions decoded from the SM4/SM5 encoding.
    pub dx9_test: Option<Dx9Comparison>,
}

impl Instruction {
    pub fn new(opcode: Opcode) -> Self {
        Self {
            opcode,
            operands: Vec::new(),
            first_src: 1,
            saturate: false,
            test_boolean: TestBoolean::Zero,
            sample_offsets: None,
            resource_return_types: None,
            resource_dimension: None,
            sync_flags: SyncFlags::empty(),
            resinfo_return_type: ResInfoReturnType::Float,
            function_index: 0,
            dx9_test: None,
        }
    }

    pub fn sources(&self) -> &[Operand] {
        &self.operands[self.first_src.min(self.operands.len())..]
    }
}
