use dxbc_tokens::{
    CbAccessPattern, GlobalFlags, InterpolationMode, Opcode, Primitive, PrimitiveTopology,
    ResourceDimension, ResourceReturnType, TessDomain, TessOutputPrimitive, TessPartitioning,
};

use crate::operand::Operand;

/// Opcode-specific payload of a declaration. Keyed by the declaration's
/// opcode, so accessing the wrong member is unrepresentable.
#[derive(Debug, Clone, PartialEq)]
pub enum DeclPayload {
    /// Declarations whose operands say everything (`dcl_input`,
    /// `dcl_output_siv`, `dcl_stream`, ...).
    None,
    GlobalFlags(GlobalFlags),
    Resource {
        dimension: ResourceDimension,
        return_types: [ResourceReturnType; 4],
        /// Set later when a comparison-sampling instruction references this
        /// texture register.
        shadow: bool,
    },
    ConstantBuffer {
        access: CbAccessPattern,
    },
    Sampler {
        /// From the caller-supplied reflection bindings.
        comparison: bool,
    },
    IndexRange {
        register_count: u32,
    },
    OutputTopology(PrimitiveTopology),
    InputPrimitive(Primitive),
    MaxOutputVertexCount(u32),
    Interpolation(InterpolationMode),
    Temps(u32),
    IndexableTemp {
        register: u32,
        count: u32,
        num_components: u32,
    },
    ImmediateConstantBuffer {
        /// Constant vec4s, raw words.
        data: Vec<[u32; 4]>,
    },
    Interface {
        index: u32,
        array_length: u32,
        /// Function-table ids this interface slot can dispatch through.
        tables: Vec<u32>,
    },
    FunctionBody(u32),
    FunctionTable {
        index: u32,
        /// Function-body ids in table order.
        bodies: Vec<u32>,
    },
    InputControlPointCount(u32),
    OutputControlPointCount(u32),
    TessDomain(TessDomain),
    TessPartitioning(TessPartitioning),
    TessOutputPrimitive(TessOutputPrimitive),
    HsMaxTessFactor(f32),
    ForkPhaseInstanceCount(u32),
    JoinPhaseInstanceCount(u32),
    ThreadGroup([u32; 3]),
    UavTyped {
        dimension: ResourceDimension,
        return_types: [ResourceReturnType; 4],
        globally_coherent: bool,
    },
    UavRaw {
        globally_coherent: bool,
    },
    UavStructured {
        stride: u32,
        globally_coherent: bool,
    },
    TgsmRaw {
        byte_count: u32,
    },
    TgsmStructured {
        stride: u32,
        count: u32,
    },
    ResourceStructured {
        stride: u32,
    },
    GsInstanceCount(u32),
}

/// A decoded declaration: its opcode, its operands, and the payload the
/// opcode implies.
#[derive(Debug, Clone)]
pub struct Declaration {
    pub opcode: Opcode,
    pub operands: Vec<Operand>,
    pub payload: DeclPayload,
}

impl Declaration {
    pub fn new(opcode: Opcode) -> Self {
        Self {
            opcode,
            operands: Vec::new(),
            payload: DeclPayload::None,
        }
    }

    /// Register number of the first operand, the common case for lookups
    /// over a phase's declaration list.
    pub fn register(&self) -> Option<u32> {
        self.operands.first().map(|op| op.register_number)
    }
}
