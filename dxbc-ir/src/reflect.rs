//! Narrow reflection boundary.
//!
//! Parsing reflection chunks is out of scope; the decoder only needs a few
//! facts the container does not carry inline. Callers fill a [`ShaderInfo`]
//! from whatever reflection source they have.

use bitflags::bitflags;
use dxbc_tokens::ResourceReturnType;

/// Which namespace a resource binding lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceGroup {
    ConstantBuffer,
    Texture,
    Sampler,
    UnorderedAccessView,
}

bitflags! {
    /// D3D binding flags the decoder inspects.
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
    pub struct ResourceBindingFlags: u32 {
        const COMPARISON_SAMPLER = 1;
    }
}

/// One bind point from reflection.
#[derive(Debug, Clone)]
pub struct ResourceBinding {
    pub name: String,
    pub group: ResourceGroup,
    pub bind_point: u32,
    pub bind_count: u32,
    pub return_type: ResourceReturnType,
    pub flags: ResourceBindingFlags,
}

/// Register file of a legacy constant span.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Dx9RegisterSet {
    Bool,
    Int4,
    #[default]
    Float4,
}

/// A run of legacy constant registers of one register set, from the DX9
/// constant table.
#[derive(Debug, Clone, Copy)]
pub struct Dx9ConstantSpan {
    pub register_set: Dx9RegisterSet,
    pub start: u32,
    pub count: u32,
}

/// Caller-supplied reflection facts consulted during decode.
#[derive(Debug, Clone, Default)]
pub struct ShaderInfo {
    pub bindings: Vec<ResourceBinding>,
    pub dx9_constants: Vec<Dx9ConstantSpan>,
}

impl ShaderInfo {
    /// Look up the binding at a bind point within a group.
    pub fn binding(&self, group: ResourceGroup, bind_point: u32) -> Option<&ResourceBinding> {
        self.bindings.iter().find(|binding| {
            binding.group == group
                && bind_point >= binding.bind_point
                && bind_point < binding.bind_point + binding.bind_count.max(1)
        })
    }

    pub fn is_comparison_sampler(&self, bind_point: u32) -> bool {
        self.binding(ResourceGroup::Sampler, bind_point)
            .is_some_and(|binding| binding.flags.contains(ResourceBindingFlags::COMPARISON_SAMPLER))
    }

    /// Register set of a legacy constant register; float4 when the constant
    /// table does not cover it.
    pub fn dx9_register_set(&self, register: u32) -> Dx9RegisterSet {
        self.dx9_constants
            .iter()
            .find(|span| register >= span.start && register < span.start + span.count)
            .map(|span| span.register_set)
            .unwrap_or_default()
    }
}
