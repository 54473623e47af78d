//! Legacy SM1-SM3 decoder.
//!
//! Produces the same unified IR as the SM4/SM5 path. The stream carries no
//! declarations beyond `dcl`/`def`, so a first pass collects register usage
//! and immediate constants, declarations are synthesized from it, and a
//! second pass converts instructions. All state lives in [`Dx9Decoder`];
//! concurrent decodes are independent.

use std::collections::{BTreeMap, BTreeSet};

use log::{trace, warn};

use dxbc_ir::{
    ComponentSelection, Declaration, DeclPayload, Dx9RegisterSet, Immediates, Instruction,
    Operand, OperandDataType, OperandIndex, PhaseKind, ShaderData, ShaderInfo, ShaderPhase,
    TextureSampler,
};
use dxbc_tokens::dx9::{
    self, Dx9Comparison, Dx9Opcode, Dx9RegisterType, Dx9ShaderType, Dx9SourceModifier,
    Dx9TextureType, Dx9Usage,
};
use dxbc_tokens::{
    CbAccessPattern, Opcode, OperandModifier, OperandType, ResourceDimension, ResourceReturnType,
    ShaderType, SpecialName, SwizzleSource,
};

use crate::cursor::TokenCursor;
use crate::error::{DecodeError, Result};
use crate::inst::{bind_texture_to_sampler, update_operand_references};

/// Decode a legacy token stream. `Ok(None)` when the first word carries
/// neither shader signature.
pub fn decode_dx9(words: &[u32], info: &ShaderInfo) -> Result<Option<ShaderData>> {
    let Some(&version) = words.first() else {
        return Ok(None);
    };
    let Some(stage) = dx9::shader_type(version) else {
        return Ok(None);
    };
    let major = dx9::major_version(version);
    let minor = dx9::minor_version(version);
    trace!("legacy {stage:?} shader, model {major}.{minor}");

    let mut decoder = Dx9Decoder::new(stage, major, info);
    decoder.scan(words)?;

    let shader_type = match stage {
        Dx9ShaderType::Vertex => ShaderType::Vertex,
        Dx9ShaderType::Pixel => ShaderType::Pixel,
    };
    let mut shader = ShaderData::new(shader_type, major, minor);
    let mut phase = ShaderPhase::default();
    decoder.synthesize_declarations(&mut phase.declarations);
    decoder.convert(words, &mut shader, &mut phase)?;
    shader.phases_mut(PhaseKind::Main).push(phase);
    Ok(Some(shader))
}

/// A `dcl` token pair recorded by the first pass.
#[derive(Debug, Clone, Copy)]
struct Dx9Dcl {
    token: u32,
    param: u32,
}

struct Dx9Decoder<'a> {
    stage: Dx9ShaderType,
    major: u32,
    info: &'a ShaderInfo,
    dcls: Vec<Dx9Dcl>,
    /// def/defi constants by register: raw vec4 and its type.
    immediates: BTreeMap<u32, ([u32; 4], OperandDataType)>,
    /// defb constants by register.
    bool_immediates: BTreeMap<u32, u32>,
    max_temp: Option<u32>,
    max_const: Option<u32>,
    addr_temp: Option<u32>,
    loop_temp: Option<u32>,
    scratch_temp: Option<u32>,
    /// Total temp registers after the extra allocations above.
    temp_count: u32,
    /// Pre-SM3 output registers written, as (raw register type, number).
    outputs: BTreeSet<(u32, u32)>,
}

/// Read one instruction: opcode token plus its parameter words. Comments are
/// skipped here; `None` at the end token or end of stream.
fn split_instruction<'a>(cursor: &mut TokenCursor<'a>) -> Result<Option<(usize, u32, &'a [u32])>> {
    loop {
        if cursor.at_end() {
            return Ok(None);
        }
        let offset = cursor.position();
        let token = cursor.read()?;
        if token == dx9::END_TOKEN {
            return Ok(None);
        }
        let raw = dx9::opcode_raw(token);
        if raw == dx9::COMMENT_OPCODE {
            cursor.skip(dx9::comment_length(token) as usize)?;
            continue;
        }
        let count = match dx9::instruction_length(token) {
            // SM1 streams have no length field; parameter tokens are marked
            // by bit 31, and def/dcl carry raw payload words.
            0 => match Dx9Opcode::from_u32(raw) {
                Some(Dx9Opcode::Dcl) | Some(Dx9Opcode::DefB) => 2,
                Some(Dx9Opcode::Def) | Some(Dx9Opcode::DefI) => 5,
                _ => {
                    let mut scan = cursor.clone();
                    let mut n = 0;
                    while let Ok(word) = scan.read() {
                        if word & 0x8000_0000 == 0 {
                            break;
                        }
                        n += 1;
                    }
                    n
                }
            },
            len => len as usize,
        };
        let params = cursor.peek_slice(count)?;
        cursor.skip(count)?;
        return Ok(Some((offset, token, params)));
    }
}

/// Opcodes whose first parameter is a written destination register.
fn has_dest(opcode: Dx9Opcode) -> bool {
    use Dx9Opcode::*;
    matches!(
        opcode,
        Mov | Add | Sub | Mad | Mul | Rcp | Rsq | Dp3 | Dp4 | Min | Max | Slt | Sge | Exp | Log
            | Lit | Dst | Lrp | Frc | Pow | Crs | Sgn | Abs | Nrm | SinCos | MovA | Tex | TexLdl
            | TexLdd | Cnd | Cmp | Dp2Add | Dsx | Dsy | ExpP | LogP
    )
}

impl<'a> Dx9Decoder<'a> {
    fn new(stage: Dx9ShaderType, major: u32, info: &'a ShaderInfo) -> Self {
        Self {
            stage,
            major,
            info,
            dcls: Vec::new(),
            immediates: BTreeMap::new(),
            bool_immediates: BTreeMap::new(),
            max_temp: None,
            max_const: None,
            addr_temp: None,
            loop_temp: None,
            scratch_temp: None,
            temp_count: 0,
            outputs: BTreeSet::new(),
        }
    }

    fn register_type(&self, param: u32, offset: usize) -> Result<Dx9RegisterType> {
        let raw = dx9::register_type_raw(param);
        Dx9RegisterType::from_u32(raw).ok_or(DecodeError::InvalidDx9RegisterType {
            offset,
            value: raw,
        })
    }

    /// First pass: usage tables, immediate constants, temp/const high-water
    /// marks, written output registers.
    fn scan(&mut self, words: &[u32]) -> Result<()> {
        let mut addr_used = false;
        let mut loop_used = false;
        let mut scratch_used = false;

        let mut cursor = TokenCursor::new(words);
        cursor.skip(1)?;
        while let Some((offset, token, params)) = split_instruction(&mut cursor)? {
            let raw = dx9::opcode_raw(token);
            let Some(opcode) = Dx9Opcode::from_u32(raw) else {
                // The second pass reports it with the right offset.
                continue;
            };
            match opcode {
                Dx9Opcode::Dcl => {
                    if params.len() < 2 {
                        return Err(DecodeError::Truncated { offset });
                    }
                    self.dcls.push(Dx9Dcl {
                        token: params[0],
                        param: params[1],
                    });
                }
                Dx9Opcode::Def | Dx9Opcode::DefI => {
                    if params.len() < 5 {
                        return Err(DecodeError::Truncated { offset });
                    }
                    let data_type = if opcode == Dx9Opcode::Def {
                        OperandDataType::Float
                    } else {
                        OperandDataType::Int
                    };
                    let register = dx9::register_number(params[0]);
                    self.immediates
                        .insert(register, ([params[1], params[2], params[3], params[4]], data_type));
                    self.max_const = Some(self.max_const.map_or(register, |m| m.max(register)));
                }
                Dx9Opcode::DefB => {
                    if params.len() < 2 {
                        return Err(DecodeError::Truncated { offset });
                    }
                    self.bool_immediates
                        .insert(dx9::register_number(params[0]), params[1]);
                }
                _ => {
                    if matches!(opcode, Dx9Opcode::Pow | Dx9Opcode::Lrp | Dx9Opcode::Dp2Add) {
                        scratch_used = true;
                    }
                    for (i, &param) in params.iter().enumerate() {
                        let ty = self.register_type(param, offset)?;
                        let register = dx9::register_number(param);
                        match ty {
                            Dx9RegisterType::Temp => {
                                self.max_temp =
                                    Some(self.max_temp.map_or(register, |m| m.max(register)));
                            }
                            Dx9RegisterType::Const => {
                                self.max_const =
                                    Some(self.max_const.map_or(register, |m| m.max(register)));
                            }
                            Dx9RegisterType::Texture if self.stage == Dx9ShaderType::Vertex => {
                                addr_used = true;
                            }
                            Dx9RegisterType::Loop => loop_used = true,
                            Dx9RegisterType::RastOut
                            | Dx9RegisterType::AttrOut
                            | Dx9RegisterType::TexCrdOut
                            | Dx9RegisterType::ColorOut
                            | Dx9RegisterType::DepthOut
                                if i == 0 && has_dest(opcode) =>
                            {
                                self.outputs.insert((ty as u32, register));
                            }
                            _ => {}
                        }
                    }
                }
            }
        }

        let mut next = self.max_temp.map_or(0, |m| m + 1);
        if addr_used {
            self.addr_temp = Some(next);
            next += 1;
        }
        if loop_used {
            self.loop_temp = Some(next);
            next += 1;
        }
        if scratch_used {
            self.scratch_temp = Some(next);
            next += 1;
        }
        self.temp_count = next;
        Ok(())
    }

    // --- declaration synthesis ----------------------------------------------

    fn synthesize_declarations(&self, declarations: &mut Vec<Declaration>) {
        if self.temp_count > 0 {
            let mut decl = Declaration::new(Opcode::DclTemps);
            decl.payload = DeclPayload::Temps(self.temp_count);
            declarations.push(decl);
        }

        if let Some(max_const) = self.max_const {
            // The whole legacy constant file becomes one constant buffer.
            let mut operand = Operand::new(OperandType::ConstantBuffer);
            operand.num_components = 4;
            operand.register_number = max_const + 1;
            operand.indices = vec![
                OperandIndex::Immediate32(0),
                OperandIndex::Immediate32(max_const + 1),
            ];
            let mut decl = Declaration::new(Opcode::DclConstantBuffer);
            decl.operands.push(operand);
            decl.payload = DeclPayload::ConstantBuffer {
                access: CbAccessPattern::ImmediateIndexed,
            };
            declarations.push(decl);
        }

        for dcl in &self.dcls {
            self.synthesize_dcl(dcl, declarations);
        }

        for &(raw_type, register) in &self.outputs {
            let (ty, mapped, name) = self.map_output(raw_type, register);
            let mut decl = Declaration::new(Opcode::DclOutput);
            decl.operands.push(register_operand(ty, mapped, name));
            declarations.push(decl);
        }
    }

    fn synthesize_dcl(&self, dcl: &Dx9Dcl, declarations: &mut Vec<Declaration>) {
        let register = dx9::register_number(dcl.param);
        let raw_type = dx9::register_type_raw(dcl.param);
        let usage = Dx9Usage::from_u32(dx9::dcl_usage_raw(dcl.token)).unwrap_or_default();
        match Dx9RegisterType::from_u32(raw_type) {
            Some(Dx9RegisterType::Sampler) => {
                let texture_type =
                    Dx9TextureType::from_u32(dx9::dcl_texture_type_raw(dcl.token))
                        .unwrap_or_default();
                let dimension = match texture_type {
                    Dx9TextureType::Cube => ResourceDimension::TextureCube,
                    Dx9TextureType::Volume => ResourceDimension::Texture3D,
                    Dx9TextureType::Unknown | Dx9TextureType::TwoD => {
                        ResourceDimension::Texture2D
                    }
                };
                let mut resource = Declaration::new(Opcode::DclResource);
                resource.operands.push(register_operand(
                    OperandType::Resource,
                    register,
                    SpecialName::Undefined,
                ));
                resource.payload = DeclPayload::Resource {
                    dimension,
                    return_types: [ResourceReturnType::Float; 4],
                    shadow: false,
                };
                declarations.push(resource);

                let mut sampler = Declaration::new(Opcode::DclSampler);
                sampler.operands.push(register_operand(
                    OperandType::Sampler,
                    register,
                    SpecialName::Undefined,
                ));
                sampler.payload = DeclPayload::Sampler {
                    comparison: self.info.is_comparison_sampler(register),
                };
                declarations.push(sampler);
            }
            Some(Dx9RegisterType::Input) => {
                let mut decl = Declaration::new(Opcode::DclInput);
                decl.operands.push(register_operand(
                    OperandType::Input,
                    register,
                    SpecialName::Undefined,
                ));
                declarations.push(decl);
            }
            // Pixel-shader texture coordinates are plain inputs after the
            // colour registers.
            Some(Dx9RegisterType::Texture) if self.stage == Dx9ShaderType::Pixel => {
                let mut decl = Declaration::new(Opcode::DclInput);
                decl.operands.push(register_operand(
                    OperandType::Input,
                    PS_TEXCOORD_INPUT_BASE + register,
                    SpecialName::Undefined,
                ));
                declarations.push(decl);
            }
            // SM3 vertex output dcl (`dcl_position o0` and friends).
            Some(Dx9RegisterType::TexCrdOut) if self.major >= 3 => {
                let name = match usage {
                    Dx9Usage::Position => SpecialName::Position,
                    _ => SpecialName::Undefined,
                };
                let mut decl = Declaration::new(Opcode::DclOutput);
                decl.operands
                    .push(register_operand(OperandType::Output, register, name));
                declarations.push(decl);
            }
            Some(Dx9RegisterType::MiscType) => {
                // vPos / vFace.
                let (input, name) = misc_input(register);
                let mut decl = Declaration::new(Opcode::DclInput);
                decl.operands
                    .push(register_operand(OperandType::Input, input, name));
                declarations.push(decl);
            }
            other => {
                warn!("ignoring dcl of register type {other:?}");
            }
        }
    }

    fn map_output(&self, raw_type: u32, register: u32) -> (OperandType, u32, SpecialName) {
        match Dx9RegisterType::from_u32(raw_type) {
            Some(Dx9RegisterType::RastOut) => match register {
                dx9::RASTOUT_POSITION => (OperandType::Output, 0, SpecialName::Position),
                dx9::RASTOUT_FOG => (OperandType::Output, 1, SpecialName::Undefined),
                _ => (OperandType::Output, 2, SpecialName::Undefined),
            },
            Some(Dx9RegisterType::AttrOut) => (
                OperandType::Output,
                VS_ATTR_OUTPUT_BASE + register,
                SpecialName::Undefined,
            ),
            Some(Dx9RegisterType::TexCrdOut) if self.major < 3 => (
                OperandType::Output,
                VS_TEXCOORD_OUTPUT_BASE + register,
                SpecialName::Undefined,
            ),
            Some(Dx9RegisterType::DepthOut) => {
                (OperandType::OutputDepth, u32::MAX, SpecialName::Undefined)
            }
            // SM3 o# and pixel-shader colour outputs keep their number.
            _ => (OperandType::Output, register, SpecialName::Undefined),
        }
    }

    // --- operand construction -----------------------------------------------

    fn dest_operand(&self, param: u32, offset: usize) -> Result<Operand> {
        let ty = self.register_type(param, offset)?;
        let register = dx9::register_number(param);
        let (mapped_ty, mapped_reg, name) = match ty {
            Dx9RegisterType::Temp => (OperandType::Temp, register, SpecialName::Undefined),
            Dx9RegisterType::Texture => match self.stage {
                // a0 lives in a dedicated temp.
                Dx9ShaderType::Vertex => (
                    OperandType::Temp,
                    self.addr_temp.unwrap_or(0),
                    SpecialName::Undefined,
                ),
                // texkill names a coordinate register in its dest slot.
                Dx9ShaderType::Pixel => (
                    OperandType::Input,
                    PS_TEXCOORD_INPUT_BASE + register,
                    SpecialName::Undefined,
                ),
            },
            Dx9RegisterType::RastOut
            | Dx9RegisterType::AttrOut
            | Dx9RegisterType::TexCrdOut
            | Dx9RegisterType::ColorOut
            | Dx9RegisterType::DepthOut => self.map_output(ty as u32, register),
            other => {
                return Err(DecodeError::InvalidDx9RegisterType {
                    offset,
                    value: other as u32,
                });
            }
        };
        let mut operand = register_operand(mapped_ty, mapped_reg, name);
        if mapped_ty != OperandType::OutputDepth {
            operand.selection = ComponentSelection::Mask(dx9::write_mask(param));
        }
        Ok(operand)
    }

    /// Read one source parameter, consuming its relative-address token when
    /// present.
    fn src_operand(&self, params: &mut TokenCursor, offset: usize) -> Result<Operand> {
        let param = params.read()?;
        let relative = if dx9::has_relative_addressing(param) {
            Some(params.read()?)
        } else {
            None
        };
        let ty = self.register_type(param, offset)?;
        let register = dx9::register_number(param);
        let swizzle = ComponentSelection::Swizzle([
            SwizzleSource::from_u32(dx9::swizzle_source(param, 0)),
            SwizzleSource::from_u32(dx9::swizzle_source(param, 1)),
            SwizzleSource::from_u32(dx9::swizzle_source(param, 2)),
            SwizzleSource::from_u32(dx9::swizzle_source(param, 3)),
        ]);

        let mut operand = match ty {
            Dx9RegisterType::Temp => {
                register_operand(OperandType::Temp, register, SpecialName::Undefined)
            }
            Dx9RegisterType::Input => {
                register_operand(OperandType::Input, register, SpecialName::Undefined)
            }
            Dx9RegisterType::Texture => match self.stage {
                Dx9ShaderType::Pixel => register_operand(
                    OperandType::Input,
                    PS_TEXCOORD_INPUT_BASE + register,
                    SpecialName::Undefined,
                ),
                Dx9ShaderType::Vertex => register_operand(
                    OperandType::Temp,
                    self.addr_temp.unwrap_or(0),
                    SpecialName::Undefined,
                ),
            },
            Dx9RegisterType::Loop => register_operand(
                OperandType::Temp,
                self.loop_temp.unwrap_or(0),
                SpecialName::Undefined,
            ),
            Dx9RegisterType::MiscType => {
                let (input, name) = misc_input(register);
                register_operand(OperandType::Input, input, name)
            }
            Dx9RegisterType::Sampler => {
                register_operand(OperandType::Sampler, register, SpecialName::Undefined)
            }
            Dx9RegisterType::Const => {
                if let Some((words, data_type)) = self.immediates.get(&register) {
                    let mut operand = Operand::new(OperandType::Immediate32);
                    operand.num_components = 4;
                    operand.immediates = Immediates::Imm32(words.to_vec());
                    operand.data_type = *data_type;
                    operand.integer_immediate = *data_type == OperandDataType::Int;
                    operand
                } else {
                    self.constant_buffer_operand(register, relative)
                }
            }
            Dx9RegisterType::ConstInt => {
                if let Some((words, _)) = self.immediates.get(&register) {
                    let mut operand = Operand::new(OperandType::Immediate32);
                    operand.num_components = 4;
                    operand.immediates = Immediates::Imm32(words.to_vec());
                    operand.data_type = OperandDataType::Int;
                    operand.integer_immediate = true;
                    operand
                } else {
                    warn!("integer constant i{register} has no defi; reading as zero");
                    let mut operand = Operand::new(OperandType::Immediate32);
                    operand.num_components = 4;
                    operand.immediates = Immediates::Imm32(vec![0; 4]);
                    operand.data_type = OperandDataType::Int;
                    operand.integer_immediate = true;
                    operand
                }
            }
            Dx9RegisterType::ConstBool => {
                let value = self.bool_immediates.get(&register).copied().unwrap_or(0);
                let mut operand = Operand::new(OperandType::Immediate32);
                operand.num_components = 1;
                operand.immediates = Immediates::Imm32(vec![value]);
                operand.data_type = OperandDataType::Uint;
                operand.integer_immediate = true;
                operand
            }
            // Outputs readable pre-SM2 (e.g. texkill on a texture register)
            // fall back to their output mapping.
            Dx9RegisterType::RastOut
            | Dx9RegisterType::AttrOut
            | Dx9RegisterType::TexCrdOut
            | Dx9RegisterType::ColorOut
            | Dx9RegisterType::DepthOut => {
                let (mapped_ty, mapped_reg, name) = self.map_output(ty as u32, register);
                register_operand(mapped_ty, mapped_reg, name)
            }
            other => {
                return Err(DecodeError::InvalidDx9RegisterType {
                    offset,
                    value: other as u32,
                });
            }
        };

        if operand.num_components == 4 {
            operand.selection = swizzle;
        }

        operand.modifier = match Dx9SourceModifier::from_u32(dx9::source_modifier_raw(param)) {
            Some(Dx9SourceModifier::None) | None => OperandModifier::None,
            Some(Dx9SourceModifier::Neg) => OperandModifier::Neg,
            Some(Dx9SourceModifier::Abs) => OperandModifier::Abs,
            Some(Dx9SourceModifier::AbsNeg) => OperandModifier::AbsNeg,
            Some(other) => {
                warn!("unsupported legacy source modifier {other:?}, dropping");
                OperandModifier::None
            }
        };

        if let Some(rel) = relative
            && operand.ty != OperandType::ConstantBuffer
        {
            let address = self.address_operand(rel);
            if let Some(last) = operand.indices.last_mut() {
                *last = OperandIndex::Immediate32PlusRelative(register, Box::new(address));
            }
        }
        Ok(operand)
    }

    fn constant_buffer_operand(&self, register: u32, relative: Option<u32>) -> Operand {
        let mut operand = Operand::new(OperandType::ConstantBuffer);
        operand.num_components = 4;
        operand.register_number = register;
        operand.data_type = match self.info.dx9_register_set(register) {
            Dx9RegisterSet::Float4 => OperandDataType::Float,
            Dx9RegisterSet::Int4 => OperandDataType::Int,
            Dx9RegisterSet::Bool => OperandDataType::Uint,
        };
        let last = match relative {
            Some(rel) => OperandIndex::Immediate32PlusRelative(
                register,
                Box::new(self.address_operand(rel)),
            ),
            None => OperandIndex::Immediate32(register),
        };
        operand.indices = vec![OperandIndex::Immediate32(0), last];
        operand
    }

    /// The address register of a relative-addressed parameter, read through
    /// its dedicated temp.
    fn address_operand(&self, rel_token: u32) -> Operand {
        let raw_type = dx9::register_type_raw(rel_token);
        let temp = if Dx9RegisterType::from_u32(raw_type) == Some(Dx9RegisterType::Loop) {
            self.loop_temp.unwrap_or(0)
        } else {
            self.addr_temp.unwrap_or(0)
        };
        let mut operand = register_operand(OperandType::Temp, temp, SpecialName::Undefined);
        operand.selection = ComponentSelection::Select1(SwizzleSource::from_u32(
            dx9::swizzle_source(rel_token, 0),
        ));
        operand
    }

    fn scratch_dest(&self) -> Operand {
        let mut operand = register_operand(
            OperandType::Temp,
            self.scratch_temp.unwrap_or(0),
            SpecialName::Undefined,
        );
        operand.selection = ComponentSelection::Mask(0xF);
        operand
    }

    fn scratch_src(&self) -> Operand {
        register_operand(
            OperandType::Temp,
            self.scratch_temp.unwrap_or(0),
            SpecialName::Undefined,
        )
    }

    // --- instruction conversion ---------------------------------------------

    /// Second pass: convert every instruction, expanding the emulated ones.
    fn convert(
        &mut self,
        words: &[u32],
        shader: &mut ShaderData,
        phase: &mut ShaderPhase,
    ) -> Result<()> {
        let mut cursor = TokenCursor::new(words);
        cursor.skip(1)?;
        while let Some((offset, token, params)) = split_instruction(&mut cursor)? {
            let raw = dx9::opcode_raw(token);
            let opcode = Dx9Opcode::from_u32(raw).ok_or(DecodeError::UnsupportedDx9Opcode {
                offset,
                value: raw,
            })?;
            self.convert_one(opcode, token, params, offset, shader, phase)?;
        }
        for inst in &phase.instructions {
            for operand in &inst.operands {
                update_operand_references(shader, operand);
            }
        }
        for inst in &phase.instructions {
            shader.mark_opcode_used(inst.opcode);
        }
        Ok(())
    }

    /// Build one instruction with a destination and every remaining
    /// parameter as a source.
    fn arith(&self, opcode: Opcode, params: &[u32], offset: usize) -> Result<Instruction> {
        let mut cursor = TokenCursor::new(params);
        let mut inst = Instruction::new(opcode);
        let dest_param = cursor.read()?;
        inst.saturate = dx9::dest_saturate(dest_param);
        inst.operands.push(self.dest_operand(dest_param, offset)?);
        if dx9::has_relative_addressing(dest_param) {
            cursor.skip(1)?;
        }
        while !cursor.at_end() {
            inst.operands.push(self.src_operand(&mut cursor, offset)?);
        }
        Ok(inst)
    }

    /// Build a no-destination instruction from source parameters only.
    fn sources_only(&self, opcode: Opcode, params: &[u32], offset: usize) -> Result<Instruction> {
        let mut cursor = TokenCursor::new(params);
        let mut inst = Instruction::new(opcode);
        inst.first_src = 0;
        while !cursor.at_end() {
            inst.operands.push(self.src_operand(&mut cursor, offset)?);
        }
        Ok(inst)
    }

    fn convert_one(
        &mut self,
        opcode: Dx9Opcode,
        token: u32,
        params: &[u32],
        offset: usize,
        shader: &mut ShaderData,
        phase: &mut ShaderPhase,
    ) -> Result<()> {
        use Dx9Opcode::*;
        let out = &mut phase.instructions;
        match opcode {
            Dcl | Def | DefI | DefB | Phase | Comment | End => {}

            Nop => out.push(Instruction::new(Opcode::Nop)),
            Mov => out.push(self.arith(Opcode::Mov, params, offset)?),
            Add => out.push(self.arith(Opcode::Add, params, offset)?),
            Mad => out.push(self.arith(Opcode::Mad, params, offset)?),
            Mul => out.push(self.arith(Opcode::Mul, params, offset)?),
            Rcp => out.push(self.arith(Opcode::Rcp, params, offset)?),
            Rsq => out.push(self.arith(Opcode::Rsq, params, offset)?),
            Dp3 => out.push(self.arith(Opcode::Dp3, params, offset)?),
            Dp4 => out.push(self.arith(Opcode::Dp4, params, offset)?),
            Min => out.push(self.arith(Opcode::Min, params, offset)?),
            Max => out.push(self.arith(Opcode::Max, params, offset)?),
            Slt => out.push(self.arith(Opcode::Lt, params, offset)?),
            Sge => out.push(self.arith(Opcode::Ge, params, offset)?),
            Exp | ExpP => out.push(self.arith(Opcode::Exp, params, offset)?),
            Log | LogP => out.push(self.arith(Opcode::Log, params, offset)?),
            Frc => out.push(self.arith(Opcode::Frc, params, offset)?),
            Dsx => out.push(self.arith(Opcode::DerivRtx, params, offset)?),
            Dsy => out.push(self.arith(Opcode::DerivRty, params, offset)?),

            Abs => {
                let mut inst = self.arith(Opcode::Mov, params, offset)?;
                if let Some(src) = inst.operands.get_mut(1) {
                    src.modifier = OperandModifier::Abs;
                }
                out.push(inst);
            }

            // sub dest, a, b  =>  add dest, a, -b
            Sub => {
                let mut inst = self.arith(Opcode::Add, params, offset)?;
                if let Some(src) = inst.operands.get_mut(2) {
                    src.modifier = src.modifier.negated();
                }
                out.push(inst);
            }

            // nrm dest, src  =>  dp4 dest, src, src; rsq dest, dest
            Nrm => {
                let mut cursor = TokenCursor::new(params);
                let dest_param = cursor.read()?;
                let dest = self.dest_operand(dest_param, offset)?;
                let src = self.src_operand(&mut cursor, offset)?;

                let mut dp4 = Instruction::new(Opcode::Dp4);
                dp4.saturate = dx9::dest_saturate(dest_param);
                dp4.operands.push(dest.clone());
                dp4.operands.push(src.clone());
                dp4.operands.push(src);
                out.push(dp4);

                let mut rsq = Instruction::new(Opcode::Rsq);
                let mut dest_src = dest.clone();
                dest_src.selection = identity_swizzle();
                rsq.operands.push(dest);
                rsq.operands.push(dest_src);
                out.push(rsq);
            }

            // sincos dest.mask, src  =>  sincos sin_dest, cos_dest, src
            // where x holds cosine and y holds sine.
            SinCos => {
                let mut cursor = TokenCursor::new(params);
                let dest_param = cursor.read()?;
                let dest = self.dest_operand(dest_param, offset)?;
                let src = self.src_operand(&mut cursor, offset)?;
                let mask = dx9::write_mask(dest_param);

                let masked = |bit: u32| -> Operand {
                    if mask & bit != 0 {
                        let mut op = dest.clone();
                        op.selection = ComponentSelection::Mask(bit);
                        op
                    } else {
                        Operand::null()
                    }
                };
                let mut inst = Instruction::new(Opcode::SinCos);
                inst.saturate = dx9::dest_saturate(dest_param);
                inst.first_src = 2;
                inst.operands.push(masked(0x2));
                inst.operands.push(masked(0x1));
                inst.operands.push(src);
                out.push(inst);
            }

            // pow dest, x, y  =>  log t, x; mul t, t, y; exp dest, t
            Pow => {
                let mut cursor = TokenCursor::new(params);
                let dest_param = cursor.read()?;
                let dest = self.dest_operand(dest_param, offset)?;
                let x = self.src_operand(&mut cursor, offset)?;
                let y = self.src_operand(&mut cursor, offset)?;

                let mut log = Instruction::new(Opcode::Log);
                log.operands.push(self.scratch_dest());
                log.operands.push(x);
                out.push(log);

                let mut mul = Instruction::new(Opcode::Mul);
                mul.operands.push(self.scratch_dest());
                mul.operands.push(self.scratch_src());
                mul.operands.push(y);
                out.push(mul);

                let mut exp = Instruction::new(Opcode::Exp);
                exp.saturate = dx9::dest_saturate(dest_param);
                exp.operands.push(dest);
                exp.operands.push(self.scratch_src());
                out.push(exp);
            }

            // lrp dest, s, a, b  =>  add t, a, -b; mad dest, s, t, b
            Lrp => {
                let mut cursor = TokenCursor::new(params);
                let dest_param = cursor.read()?;
                let dest = self.dest_operand(dest_param, offset)?;
                let s = self.src_operand(&mut cursor, offset)?;
                let a = self.src_operand(&mut cursor, offset)?;
                let b = self.src_operand(&mut cursor, offset)?;

                let mut add = Instruction::new(Opcode::Add);
                add.operands.push(self.scratch_dest());
                add.operands.push(a);
                let mut neg_b = b.clone();
                neg_b.modifier = neg_b.modifier.negated();
                add.operands.push(neg_b);
                out.push(add);

                let mut mad = Instruction::new(Opcode::Mad);
                mad.saturate = dx9::dest_saturate(dest_param);
                mad.operands.push(dest);
                mad.operands.push(s);
                mad.operands.push(self.scratch_src());
                mad.operands.push(b);
                out.push(mad);
            }

            // dp2add dest, a, b, c  =>  dp2 t, a, b; add dest, t, c
            Dp2Add => {
                let mut cursor = TokenCursor::new(params);
                let dest_param = cursor.read()?;
                let dest = self.dest_operand(dest_param, offset)?;
                let a = self.src_operand(&mut cursor, offset)?;
                let b = self.src_operand(&mut cursor, offset)?;
                let c = self.src_operand(&mut cursor, offset)?;

                let mut dp2 = Instruction::new(Opcode::Dp2);
                dp2.operands.push(self.scratch_dest());
                dp2.operands.push(a);
                dp2.operands.push(b);
                out.push(dp2);

                let mut add = Instruction::new(Opcode::Add);
                add.saturate = dx9::dest_saturate(dest_param);
                add.operands.push(dest);
                add.operands.push(self.scratch_src());
                add.operands.push(c);
                out.push(add);
            }

            Cmp => {
                let mut inst = self.arith(Opcode::MovC, params, offset)?;
                inst.dx9_test = Some(Dx9Comparison::Ge);
                out.push(inst);
            }
            Cnd => {
                let mut inst = self.arith(Opcode::MovC, params, offset)?;
                inst.dx9_test = Some(Dx9Comparison::Gt);
                out.push(inst);
            }

            MovA => {
                let mut cursor = TokenCursor::new(params);
                let dest_param = cursor.read()?;
                let src = self.src_operand(&mut cursor, offset)?;
                let mut dest = register_operand(
                    OperandType::Temp,
                    self.addr_temp.unwrap_or(0),
                    SpecialName::Undefined,
                );
                dest.selection = ComponentSelection::Mask(dx9::write_mask(dest_param));
                let mut inst = Instruction::new(Opcode::Mov);
                inst.operands.push(dest);
                inst.operands.push(src);
                out.push(inst);
            }

            TexKill => {
                let mut cursor = TokenCursor::new(params);
                let mut operand = self.dest_operand(cursor.read()?, offset)?;
                operand.selection = identity_swizzle();
                let mut inst = Instruction::new(Opcode::Discard);
                inst.first_src = 0;
                inst.dx9_test = Some(Dx9Comparison::Lt);
                inst.operands.push(operand);
                out.push(inst);
            }

            Tex => {
                // The SM1 form (single texture-register parameter) is a
                // different instruction entirely.
                if self.major < 2 {
                    return Err(DecodeError::UnsupportedDx9Opcode {
                        offset,
                        value: opcode as u32,
                    });
                }
                let inst = self.sample(Opcode::Sample, params, offset, shader, 0)?;
                out.push(inst);
            }
            TexLdl => {
                let mut inst = self.sample(Opcode::SampleL, params, offset, shader, 0)?;
                // The LOD rides in the coordinate's w.
                let mut lod = inst.operands[1].clone();
                lod.selection = ComponentSelection::Swizzle([SwizzleSource::W; 4]);
                lod.modifier = OperandModifier::None;
                inst.operands.push(lod);
                out.push(inst);
            }
            TexLdd => {
                let inst = self.sample(Opcode::SampleD, params, offset, shader, 2)?;
                out.push(inst);
            }

            If => {
                let mut inst = self.sources_only(Opcode::If, params, offset)?;
                inst.test_boolean = dxbc_tokens::TestBoolean::NonZero;
                out.push(inst);
            }
            IfC => {
                let mut inst = self.sources_only(Opcode::If, params, offset)?;
                inst.dx9_test = comparison(token, offset)?;
                out.push(inst);
            }
            Else => out.push(Instruction::new(Opcode::Else)),
            EndIf => out.push(Instruction::new(Opcode::EndIf)),
            Break => out.push(Instruction::new(Opcode::Break)),
            BreakC => {
                let mut inst = self.sources_only(Opcode::BreakC, params, offset)?;
                inst.dx9_test = comparison(token, offset)?;
                out.push(inst);
            }
            Rep => out.push(self.sources_only(Opcode::Loop, params, offset)?),
            EndRep => out.push(Instruction::new(Opcode::EndLoop)),
            Loop => out.push(self.sources_only(Opcode::Loop, params, offset)?),
            EndLoop => out.push(Instruction::new(Opcode::EndLoop)),
            Ret => out.push(Instruction::new(Opcode::Ret)),
            Label => out.push(self.sources_only(Opcode::Label, params, offset)?),
            Call => out.push(self.sources_only(Opcode::Call, params, offset)?),
            CallNz => out.push(self.sources_only(Opcode::CallC, params, offset)?),

            other => {
                return Err(DecodeError::UnsupportedDx9Opcode {
                    offset,
                    value: other as u32,
                });
            }
        }
        Ok(())
    }

    /// Shared shape of the texture sampling opcodes: dest, coordinate,
    /// sampler, then `extra_srcs` more sources (gradients). The resource
    /// operand is synthesized from the sampler register.
    fn sample(
        &self,
        opcode: Opcode,
        params: &[u32],
        offset: usize,
        shader: &mut ShaderData,
        extra_srcs: usize,
    ) -> Result<Instruction> {
        let mut cursor = TokenCursor::new(params);
        let dest_param = cursor.read()?;
        let dest = self.dest_operand(dest_param, offset)?;
        let coord = self.src_operand(&mut cursor, offset)?;
        let sampler = self.src_operand(&mut cursor, offset)?;
        let register = sampler.register_number;

        bind_texture_to_sampler(shader, register, TextureSampler::Sampler(register))?;

        let mut resource =
            register_operand(OperandType::Resource, register, SpecialName::Undefined);
        resource.selection = identity_swizzle();

        let mut inst = Instruction::new(opcode);
        inst.saturate = dx9::dest_saturate(dest_param);
        inst.operands.push(dest);
        inst.operands.push(coord);
        inst.operands.push(resource);
        inst.operands.push(sampler);
        for _ in 0..extra_srcs {
            inst.operands.push(self.src_operand(&mut cursor, offset)?);
        }
        Ok(inst)
    }
}

const PS_TEXCOORD_INPUT_BASE: u32 = 2;
const VS_ATTR_OUTPUT_BASE: u32 = 3;
const VS_TEXCOORD_OUTPUT_BASE: u32 = 5;

fn misc_input(register: u32) -> (u32, SpecialName) {
    if register == 0 {
        (30, SpecialName::Position)
    } else {
        (31, SpecialName::IsFrontFace)
    }
}

fn identity_swizzle() -> ComponentSelection {
    ComponentSelection::Swizzle([
        SwizzleSource::X,
        SwizzleSource::Y,
        SwizzleSource::Z,
        SwizzleSource::W,
    ])
}

fn comparison(token: u32, offset: usize) -> Result<Option<Dx9Comparison>> {
    let raw = dx9::comparison_raw(token);
    Dx9Comparison::from_u32(raw)
        .map(Some)
        .ok_or(DecodeError::InvalidField {
            field: "legacy comparison",
            offset,
            value: raw,
        })
}

/// A plain register operand with a one-dimensional immediate index.
fn register_operand(ty: OperandType, register: u32, name: SpecialName) -> Operand {
    let mut operand = Operand::new(ty);
    operand.num_components = 4;
    operand.register_number = register;
    operand.special_name = name;
    if !matches!(ty, OperandType::OutputDepth | OperandType::Immediate32) && register != u32::MAX {
        operand.indices = vec![OperandIndex::Immediate32(register)];
    }
    if ty == OperandType::OutputDepth {
        operand.selection = ComponentSelection::Mask(0xF);
    }
    operand
}
