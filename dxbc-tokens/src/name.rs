//! System-value name tokens (`dcl_*_siv`/`dcl_*_sgv` trailing word).

/// A system-value name attached to an operand by an SIV/SGV declaration.
///
/// The twelve tessellation-factor names all render as `tessFactor` in
/// listings, matching how the downstream backend treats them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum SpecialName {
    #[default]
    Undefined = 0,
    Position = 1,
    ClipDistance = 2,
    CullDistance = 3,
    RenderTargetArrayIndex = 4,
    ViewportArrayIndex = 5,
    VertexId = 6,
    PrimitiveId = 7,
    InstanceId = 8,
    IsFrontFace = 9,
    SampleIndex = 10,
    FinalQuadUEq0EdgeTessFactor = 11,
    FinalQuadVEq0EdgeTessFactor = 12,
    FinalQuadUEq1EdgeTessFactor = 13,
    FinalQuadVEq1EdgeTessFactor = 14,
    FinalQuadUInsideTessFactor = 15,
    FinalQuadVInsideTessFactor = 16,
    FinalTriUEq0EdgeTessFactor = 17,
    FinalTriVEq0EdgeTessFactor = 18,
    FinalTriWEq0EdgeTessFactor = 19,
    FinalTriInsideTessFactor = 20,
    FinalLineDetailTessFactor = 21,
    FinalLineDensityTessFactor = 22,
}

impl SpecialName {
    pub fn from_u32(value: u32) -> Option<Self> {
        use SpecialName::*;
        Some(match value {
            0 => Undefined,
            1 => Position,
            2 => ClipDistance,
            3 => CullDistance,
            4 => RenderTargetArrayIndex,
            5 => ViewportArrayIndex,
            6 => VertexId,
            7 => PrimitiveId,
            8 => InstanceId,
            9 => IsFrontFace,
            10 => SampleIndex,
            11 => FinalQuadUEq0EdgeTessFactor,
            12 => FinalQuadVEq0EdgeTessFactor,
            13 => FinalQuadUEq1EdgeTessFactor,
            14 => FinalQuadVEq1EdgeTessFactor,
            15 => FinalQuadUInsideTessFactor,
            16 => FinalQuadVInsideTessFactor,
            17 => FinalTriUEq0EdgeTessFactor,
            18 => FinalTriVEq0EdgeTessFactor,
            19 => FinalTriWEq0EdgeTessFactor,
            20 => FinalTriInsideTessFactor,
            21 => FinalLineDetailTessFactor,
            22 => FinalLineDensityTessFactor,
            _ => return None,
        })
    }

    /// Lower-camel label the code generator prints for this name.
    pub fn label(self) -> &'static str {
        use SpecialName::*;
        match self {
            Undefined => "undefined",
            Position => "position",
            ClipDistance => "clipDistance",
            CullDistance => "cullDistance",
            RenderTargetArrayIndex => "renderTargetArrayIndex",
            ViewportArrayIndex => "viewportArrayIndex",
            VertexId => "vertexID",
            PrimitiveId => "primitiveID",
            InstanceId => "instanceID",
            IsFrontFace => "isFrontFace",
            SampleIndex => "sampleIndex",
            _ => "tessFactor",
        }
    }
}
