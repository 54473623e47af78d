//! SM4/SM5 instruction decoding.

use dxbc_ir::{
    Declaration, DeclPayload, Instruction, Operand, OperandDataType, ShaderData, TextureSampler,
};
use dxbc_tokens::token as tok;
use dxbc_tokens::{
    AddressOffsetChannel, ExtendedOpcodeType, Opcode, OperandMinPrecision, OperandType,
    ResourceDimension, ResourceReturnType,
};

use crate::cursor::TokenCursor;
use crate::error::{DecodeError, Result};
use crate::operand::decode_operand;

/// Operand count for each executable opcode, destination(s) included.
fn operand_count(opcode: Opcode) -> usize {
    use Opcode::*;
    match opcode {
        Break | Continue | Cut | Default | Else | Emit | EmitThenCut | EndIf | EndLoop
        | EndSwitch | Loop | Nop | Ret | Sync | Abort | DebugBreak | HsDecls
        | HsControlPointPhase | HsForkPhase | HsJoinPhase => 0,

        BreakC | Call | Case | ContinueC | Discard | If | Label | RetC | Switch | EmitStream
        | CutStream | EmitThenCutStream | InterfaceCall => 1,

        CallC | DerivRtx | DerivRty | DerivRtxCoarse | DerivRtxFine | DerivRtyCoarse
        | DerivRtyFine | Exp | Frc | FtoI | FtoU | ItoF | UtoF | Log | Mov | Not | INeg
        | RoundNe | RoundNi | RoundPi | RoundZ | Rcp | Rsq | Sqrt | SampleInfo | BufInfo
        | F32toF16 | F16toF32 | CountBits | FirstBitHi | FirstBitLo | FirstBitShi | BfRev
        | DMov | DtoF | FtoD | DRcp | DtoI | DtoU | ItoD | UtoD | EvalCentroid
        | ImmAtomicAlloc | ImmAtomicConsume => 2,

        Add | And | Div | Dp2 | Dp3 | Dp4 | Eq | Ge | IAdd | IEq | IGe | ILt | IMax | IMin
        | INe | IShl | IShr | Lt | Max | Min | Mul | Ne | Or | ULt | UGe | UMax | UMin
        | UShr | Xor | Ld | ResInfo | SinCos | SamplePos | DAdd | DMax | DMin | DMul | DEq
        | DGe | DLt | DNe | DDiv | EvalSnapped | EvalSampleIndex | LdUavTyped
        | StoreUavTyped | LdRaw | StoreRaw | AtomicAnd | AtomicOr | AtomicXor | AtomicIAdd
        | AtomicIMax | AtomicIMin | AtomicUMax | AtomicUMin => 3,

        IMad | IMul | Mad | MovC | UDiv | UMad | UMul | LdMs | Sample | Gather4 | Lod
        | UAddC | USubB | UBfe | IBfe | DMovC | DFma | Msad | LdStructured
        | StoreStructured | AtomicCmpStore | ImmAtomicIAdd | ImmAtomicAnd | ImmAtomicOr
        | ImmAtomicXor | ImmAtomicExch | ImmAtomicIMax | ImmAtomicIMin | ImmAtomicUMax
        | ImmAtomicUMin => 4,

        SampleC | SampleCLz | SampleL | SampleB | Gather4C | Gather4Po | Bfi | SwapC
        | ImmAtomicCmpExch => 5,

        SampleD | Gather4PoC => 6,

        // Declarations and reserved slots never reach the arity table.
        _ => 0,
    }
}

/// Index of the first source operand. `imul` and friends carry two
/// destinations; control-flow and stream opcodes carry none.
fn first_source(opcode: Opcode) -> usize {
    use Opcode::*;
    match opcode {
        IMul | UMul | UDiv | UAddC | USubB | SinCos | SwapC => 2,
        BreakC | Call | CallC | Case | ContinueC | CutStream | Discard | EmitStream
        | EmitThenCutStream | If | InterfaceCall | Label | RetC | Switch => 0,
        _ if operand_count(opcode) == 0 => 0,
        _ => 1,
    }
}

/// Where the texture and sampler operands sit for a resource-access opcode.
/// `None` in the sampler slot means the access is unsampled.
fn texture_sampler_slots(opcode: Opcode) -> Option<(usize, Option<usize>)> {
    use Opcode::*;
    match opcode {
        Ld | LdMs => Some((2, None)),
        Sample | SampleC | SampleCLz | SampleL | SampleD | SampleB | Gather4 | Gather4C => {
            Some((2, Some(3)))
        }
        Gather4Po | Gather4PoC => Some((3, Some(4))),
        _ => None,
    }
}

fn is_comparison_sample(opcode: Opcode) -> bool {
    matches!(
        opcode,
        Opcode::SampleC | Opcode::SampleCLz | Opcode::Gather4C | Opcode::Gather4PoC
    )
}

fn uses_boolean_test(opcode: Opcode) -> bool {
    matches!(
        opcode,
        Opcode::BreakC
            | Opcode::CallC
            | Opcode::ContinueC
            | Opcode::Discard
            | Opcode::If
            | Opcode::RetC
    )
}

/// Scan a phase's declarations for the texture register and flag it as a
/// shadow (comparison) texture.
fn mark_texture_as_shadow(declarations: &mut [Declaration], texture_register: u32) {
    for decl in declarations {
        if decl.opcode == Opcode::DclResource
            && decl.register() == Some(texture_register)
            && let DeclPayload::Resource { shadow, .. } = &mut decl.payload
        {
            *shadow = true;
        }
    }
}

/// Record a texture/sampler pairing; a texture pairs with at most one
/// sampler per shader.
pub(crate) fn bind_texture_to_sampler(
    shader: &mut ShaderData,
    texture: u32,
    requested: TextureSampler,
) -> Result<()> {
    match shader.texture_samplers.get(&texture) {
        Some(&bound) if bound != requested => Err(DecodeError::SamplerBindingConflict {
            texture,
            bound,
            requested,
        }),
        _ => {
            shader.texture_samplers.insert(texture, requested);
            Ok(())
        }
    }
}

/// Mark input registers referenced by an operand, recursing into relative
/// index sub-operands.
pub(crate) fn update_operand_references(shader: &mut ShaderData, operand: &Operand) {
    // Control-point reads index the register in their innermost dimension.
    if matches!(operand.ty, OperandType::Input | OperandType::InputControlPoint) {
        shader.mark_input_referenced(operand.register_number);
    }
    for index in &operand.indices {
        if let Some(relative) = index.relative() {
            update_operand_references(shader, relative);
        }
    }
}

fn decode_extensions(
    cursor: &mut TokenCursor,
    token0: u32,
    inst: &mut Instruction,
) -> Result<()> {
    let mut extended = tok::is_extended(token0);
    while extended {
        let offset = cursor.position();
        let ext = cursor.read()?;
        let raw = tok::extended_opcode_type_raw(ext);
        match ExtendedOpcodeType::from_u32(raw) {
            Some(ExtendedOpcodeType::SampleControls) => {
                inst.sample_offsets = Some([
                    tok::immediate_address_offset(AddressOffsetChannel::U, ext),
                    tok::immediate_address_offset(AddressOffsetChannel::V, ext),
                    tok::immediate_address_offset(AddressOffsetChannel::W, ext),
                ]);
            }
            Some(ExtendedOpcodeType::ResourceDim) => {
                let raw_dim = tok::extended_resource_dimension_raw(ext);
                inst.resource_dimension =
                    Some(ResourceDimension::from_u32(raw_dim).ok_or(DecodeError::InvalidField {
                        field: "resource dimension",
                        offset,
                        value: raw_dim,
                    })?);
            }
            Some(ExtendedOpcodeType::ResourceReturnType) => {
                let mut types = [ResourceReturnType::Unused; 4];
                for (comp, slot) in types.iter_mut().enumerate() {
                    let raw_ty = tok::extended_resource_return_type_raw(comp as u32, ext);
                    *slot =
                        ResourceReturnType::from_u32(raw_ty).ok_or(DecodeError::InvalidField {
                            field: "resource return type",
                            offset,
                            value: raw_ty,
                        })?;
                }
                inst.resource_return_types = Some(types);
            }
            Some(ExtendedOpcodeType::Empty) => {}
            None => {
                return Err(DecodeError::InvalidField {
                    field: "extended opcode type",
                    offset,
                    value: raw,
                });
            }
        }
        extended = tok::is_extended(ext);
    }
    Ok(())
}

/// Decode one instruction. `declarations` is the current phase's declaration
/// list, mutated when a comparison sample marks its texture as shadow.
pub fn decode_instruction(
    cursor: &mut TokenCursor,
    shader: &mut ShaderData,
    declarations: &mut [Declaration],
) -> Result<Instruction> {
    let offset = cursor.position();
    let token0 = cursor.read()?;
    let raw_opcode = tok::opcode_raw(token0);
    let opcode = Opcode::from_u32(raw_opcode).ok_or(DecodeError::InvalidOpcode {
        offset,
        value: raw_opcode,
    })?;
    if matches!(opcode, Opcode::Reserved0 | Opcode::Reserved1 | Opcode::Reserved2) {
        return Err(DecodeError::InvalidOpcode {
            offset,
            value: raw_opcode,
        });
    }

    let length = tok::instruction_length(token0);
    let end = offset + length as usize;
    if length == 0 {
        return Err(DecodeError::InvalidLength { offset, length });
    }

    let mut inst = Instruction::new(opcode);
    inst.saturate = tok::saturate(token0);
    inst.first_src = first_source(opcode);
    if uses_boolean_test(opcode) {
        inst.test_boolean = tok::test_boolean(token0);
    }
    match opcode {
        Opcode::ResInfo => {
            let raw = tok::resinfo_return_type_raw(token0);
            inst.resinfo_return_type =
                dxbc_tokens::ResInfoReturnType::from_u32(raw).ok_or(DecodeError::InvalidField {
                    field: "resinfo return type",
                    offset,
                    value: raw,
                })?;
        }
        Opcode::Sync => inst.sync_flags = tok::sync_flags(token0),
        _ => {}
    }

    decode_extensions(cursor, token0, &mut inst)?;

    // The fcall function index sits after any extension tokens.
    if opcode == Opcode::InterfaceCall {
        inst.function_index = cursor.read()?;
    }

    for _ in 0..operand_count(opcode) {
        inst.operands.push(decode_operand(cursor)?);
    }

    // `case` labels are integer literals however the stream typed them.
    if opcode == Opcode::Case
        && let Some(operand) = inst.operands.first_mut()
    {
        operand.integer_immediate = true;
        operand.data_type = OperandDataType::Int;
    }

    // A mov into an int/uint min-precision destination reinterprets an
    // immediate source as integral.
    if opcode == Opcode::Mov
        && let [dest, src] = inst.operands.as_mut_slice()
        && matches!(
            dest.min_precision,
            OperandMinPrecision::Sint16 | OperandMinPrecision::Uint16
        )
        && src.ty == OperandType::Immediate32
    {
        src.integer_immediate = true;
        src.data_type = if dest.min_precision == OperandMinPrecision::Sint16 {
            OperandDataType::Int
        } else {
            OperandDataType::Uint
        };
    }

    if let Some((texture_slot, sampler_slot)) = texture_sampler_slots(opcode) {
        let texture = inst.operands[texture_slot].register_number;
        let requested = match sampler_slot {
            Some(slot) => TextureSampler::Sampler(inst.operands[slot].register_number),
            None => TextureSampler::Unsampled,
        };
        bind_texture_to_sampler(shader, texture, requested)?;
        if is_comparison_sample(opcode) {
            mark_texture_as_shadow(declarations, texture);
        }
    }

    for operand in &inst.operands {
        update_operand_references(shader, operand);
    }
    shader.mark_opcode_used(opcode);

    if cursor.position() > end {
        return Err(DecodeError::InvalidLength { offset, length });
    }
    cursor.seek(end)?;
    Ok(inst)
}
