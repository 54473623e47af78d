mod common;

use common::*;
use dxbc_decode::decode_tokens;
use dxbc_ir::{DeclPayload, PhaseKind, ShaderInfo};
use dxbc_tokens::{Opcode, ShaderType};

#[test]
fn single_main_phase_for_non_hull_stages() {
    let words = program(ShaderType::Compute, &[op(Opcode::Ret, 1)]);
    let shader = decode_tokens(&words, &ShaderInfo::default()).unwrap();
    assert_eq!(shader.phases(PhaseKind::Main).len(), 1);
    assert!(shader.phases(PhaseKind::HullGlobalDecls).is_empty());
    assert!(shader.phases(PhaseKind::Fork).is_empty());
}

#[test]
fn hull_phases_split_at_markers() {
    let body = [
        // Global declaration block.
        op(Opcode::HsDecls, 1),
        op(Opcode::DclOutputControlPointCount, 1) | (4 << 11),
        op(Opcode::DclTemps, 2),
        1,
        // One control-point phase.
        op(Opcode::HsControlPointPhase, 1),
        op(Opcode::Ret, 1),
        // Two fork phases, the first with its own instance count.
        op(Opcode::HsForkPhase, 1),
        op(Opcode::DclHsForkPhaseInstanceCount, 2),
        2,
        op(Opcode::Ret, 1),
        op(Opcode::HsForkPhase, 1),
        op(Opcode::Ret, 1),
        // One join phase.
        op(Opcode::HsJoinPhase, 1),
        op(Opcode::Ret, 1),
    ];
    let words = program(ShaderType::Hull, &body);
    let shader = decode_tokens(&words, &ShaderInfo::default()).unwrap();

    let global = shader.phases(PhaseKind::HullGlobalDecls);
    assert_eq!(global.len(), 1);
    assert_eq!(global[0].declarations.len(), 3);
    assert!(global[0].instructions.is_empty());
    assert_eq!(
        global[0].declarations[1].payload,
        DeclPayload::OutputControlPointCount(4)
    );

    assert_eq!(shader.phases(PhaseKind::ControlPoint).len(), 1);

    let fork = shader.phases(PhaseKind::Fork);
    assert_eq!(fork.len(), 2);
    assert_eq!(fork[0].declarations.len(), 1);
    assert_eq!(
        fork[0].declarations[0].payload,
        DeclPayload::ForkPhaseInstanceCount(2)
    );
    assert_eq!(fork[0].instructions.len(), 1);
    assert!(fork[1].declarations.is_empty());
    assert_eq!(fork[1].instructions.len(), 1);

    let join = shader.phases(PhaseKind::Join);
    assert_eq!(join.len(), 1);
    assert_eq!(join[0].instructions[0].opcode, Opcode::Ret);
}

#[test]
fn all_phases_iterates_in_decode_order() {
    let body = [
        op(Opcode::HsDecls, 1),
        op(Opcode::HsForkPhase, 1),
        op(Opcode::Ret, 1),
        op(Opcode::HsJoinPhase, 1),
        op(Opcode::Ret, 1),
    ];
    let words = program(ShaderType::Hull, &body);
    let shader = decode_tokens(&words, &ShaderInfo::default()).unwrap();
    let kinds: Vec<_> = shader.all_phases().map(|(kind, _)| kind).collect();
    assert_eq!(
        kinds,
        vec![PhaseKind::HullGlobalDecls, PhaseKind::Fork, PhaseKind::Join]
    );
}
