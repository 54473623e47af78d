use std::collections::HashMap;

use dxbc_tokens::{Opcode, ShaderType};

use crate::declaration::Declaration;
use crate::instruction::Instruction;

/// Which part of a shader a phase instance belongs to. Non-hull shaders have
/// exactly one `Main` instance; hull shaders have one `HullGlobalDecls`
/// instance plus zero or more of each remaining kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PhaseKind {
    Main,
    HullGlobalDecls,
    ControlPoint,
    Fork,
    Join,
}

impl PhaseKind {
    /// Phase kind started by a hull phase marker opcode.
    pub fn from_marker(opcode: Opcode) -> Option<Self> {
        match opcode {
            Opcode::HsControlPointPhase => Some(Self::ControlPoint),
            Opcode::HsForkPhase => Some(Self::Fork),
            Opcode::HsJoinPhase => Some(Self::Join),
            _ => None,
        }
    }
}

/// One phase instance: its declarations in stream order, then its
/// instructions.
#[derive(Debug, Clone, Default)]
pub struct ShaderPhase {
    pub declarations: Vec<Declaration>,
    pub instructions: Vec<Instruction>,
}

/// Entry in the indexed input/output range tables built from
/// `dcl_index_range`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexedRange {
    /// First register of a relatively-addressed range.
    Root { count: u32 },
    /// Interior register of a range; its own declaration is suppressed in
    /// favour of the root's.
    Suppressed { root: u32 },
}

/// Sampler side of a texture binding recorded from sampling instructions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureSampler {
    /// `ld`/`ld_ms`: fetched without a sampler.
    Unsampled,
    Sampler(u32),
}

/// The decoded shader: phase instances plus the side tables downstream
/// backends consume.
#[derive(Debug)]
pub struct ShaderData {
    pub shader_type: ShaderType,
    pub major_version: u32,
    pub minor_version: u32,

    main: Vec<ShaderPhase>,
    hull_global: Vec<ShaderPhase>,
    control_point: Vec<ShaderPhase>,
    fork: Vec<ShaderPhase>,
    join: Vec<ShaderPhase>,

    /// Which opcodes appear anywhere in the shader.
    pub opcode_used: [bool; Opcode::COUNT],
    /// Bitmap of input registers referenced by any instruction operand.
    pub inputs_referenced: u64,
    pub indexed_inputs: HashMap<u32, IndexedRange>,
    pub indexed_outputs: HashMap<u32, IndexedRange>,
    /// Texture register -> sampler it is paired with. A texture pairs with
    /// at most one sampler per shader.
    pub texture_samplers: HashMap<u32, TextureSampler>,
    /// Function-table id -> function-body ids, from `dcl_function_table`.
    pub function_tables: HashMap<u32, Vec<u32>>,
    /// Function-table id -> interface slot it is reachable from.
    pub table_to_interface: HashMap<u32, u32>,
}

impl ShaderData {
    pub fn new(shader_type: ShaderType, major_version: u32, minor_version: u32) -> Self {
        Self {
            shader_type,
            major_version,
            minor_version,
            main: Vec::new(),
            hull_global: Vec::new(),
            control_point: Vec::new(),
            fork: Vec::new(),
            join: Vec::new(),
            opcode_used: [false; Opcode::COUNT],
            inputs_referenced: 0,
            indexed_inputs: HashMap::new(),
            indexed_outputs: HashMap::new(),
            texture_samplers: HashMap::new(),
            function_tables: HashMap::new(),
            table_to_interface: HashMap::new(),
        }
    }

    pub fn phases(&self, kind: PhaseKind) -> &[ShaderPhase] {
        match kind {
            PhaseKind::Main => &self.main,
            PhaseKind::HullGlobalDecls => &self.hull_global,
            PhaseKind::ControlPoint => &self.control_point,
            PhaseKind::Fork => &self.fork,
            PhaseKind::Join => &self.join,
        }
    }

    pub fn phases_mut(&mut self, kind: PhaseKind) -> &mut Vec<ShaderPhase> {
        match kind {
            PhaseKind::Main => &mut self.main,
            PhaseKind::HullGlobalDecls => &mut self.hull_global,
            PhaseKind::ControlPoint => &mut self.control_point,
            PhaseKind::Fork => &mut self.fork,
            PhaseKind::Join => &mut self.join,
        }
    }

    pub fn mark_opcode_used(&mut self, opcode: Opcode) {
        self.opcode_used[opcode as usize] = true;
    }

    pub fn mark_input_referenced(&mut self, register: u32) {
        if register < 64 {
            self.inputs_referenced |= 1 << register;
        }
    }

    pub fn input_referenced(&self, register: u32) -> bool {
        register < 64 && self.inputs_referenced & (1 << register) != 0
    }

    /// All phase instances in decode order, main first.
    pub fn all_phases(&self) -> impl Iterator<Item = (PhaseKind, &ShaderPhase)> {
        [
            PhaseKind::Main,
            PhaseKind::HullGlobalDecls,
            PhaseKind::ControlPoint,
            PhaseKind::Fork,
            PhaseKind::Join,
        ]
        .into_iter()
        .flat_map(move |kind| self.phases(kind).iter().map(move |phase| (kind, phase)))
    }
}
