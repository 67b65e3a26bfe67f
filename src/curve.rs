use crate::{
    core::FrameWindow,
    error::{VfxError, VfxResult},
};

/// Renderable attributes a curve can drive. The discriminants are the
/// persisted `curveAttribute` indices and must stay stable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[repr(u8)]
pub enum AttributeType {
    UvScrollX,
    UvScrollY,

    TranslationX,
    TranslationY,
    TranslationZ,

    RotationX,
    RotationY,
    RotationZ,

    ScaleX,
    ScaleY,
    ScaleZ,

    ColorR,
    ColorG,
    ColorB,
    ColorA,

    UvScaleX,
    UvScaleY,
}

impl AttributeType {
    pub const COUNT: usize = 17;

    pub const ALL: [AttributeType; Self::COUNT] = [
        Self::UvScrollX,
        Self::UvScrollY,
        Self::TranslationX,
        Self::TranslationY,
        Self::TranslationZ,
        Self::RotationX,
        Self::RotationY,
        Self::RotationZ,
        Self::ScaleX,
        Self::ScaleY,
        Self::ScaleZ,
        Self::ColorR,
        Self::ColorG,
        Self::ColorB,
        Self::ColorA,
        Self::UvScaleX,
        Self::UvScaleY,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    /// Persisted index back to a tag. Unknown indices (files written by a
    /// newer authoring build) resolve to `None`.
    pub fn from_index(index: i32) -> Option<Self> {
        usize::try_from(index)
            .ok()
            .and_then(|i| Self::ALL.get(i).copied())
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Self::UvScrollX => "UV Offset: X",
            Self::UvScrollY => "UV Offset: Y",
            Self::TranslationX => "Translation: X",
            Self::TranslationY => "Translation: Y",
            Self::TranslationZ => "Translation: Z",
            Self::RotationX => "Rotation: X",
            Self::RotationY => "Rotation: Y",
            Self::RotationZ => "Rotation: Z",
            Self::ScaleX => "Scale: X",
            Self::ScaleY => "Scale: Y",
            Self::ScaleZ => "Scale: Z",
            Self::ColorR => "Colour: R",
            Self::ColorG => "Colour: G",
            Self::ColorB => "Colour: B",
            Self::ColorA => "Colour: A",
            Self::UvScaleX => "UV Scale: X",
            Self::UvScaleY => "UV Scale: Y",
        }
    }

    /// Authoring default for the output range of a fresh curve.
    pub fn default_range(self) -> (f32, f32) {
        match self {
            Self::TranslationX | Self::TranslationY | Self::TranslationZ => (-1.0, 1.0),
            Self::RotationX | Self::RotationY | Self::RotationZ => (0.0, 360.0),
            Self::ScaleX | Self::ScaleY | Self::ScaleZ => (-1.0, 1.0),
            _ => (0.0, 1.0),
        }
    }
}

/// How values between two control points are blended.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum CurveProfile {
    /// Placeholder profile; a `None` curve is never evaluated.
    None,
    /// Step function: holds the lower point's value.
    Discrete,
    Linear,
    #[default]
    Smooth,
}

impl CurveProfile {
    pub fn from_index(index: i32) -> Option<Self> {
        match index {
            0 => Some(Self::None),
            1 => Some(Self::Discrete),
            2 => Some(Self::Linear),
            3 => Some(Self::Smooth),
            _ => None,
        }
    }

    pub fn index(self) -> i32 {
        match self {
            Self::None => 0,
            Self::Discrete => 1,
            Self::Linear => 2,
            Self::Smooth => 3,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CurvePoint {
    pub x: f32,
    pub y: f32,
}

/// One animation curve: control points sorted ascending by time, a blend
/// profile and an output range. Point y values are authored in `[0, 1]` and
/// remapped into `[min_value, max_value]` on evaluation.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CurveDataSet {
    pub attribute: AttributeType,
    pub profile: CurveProfile,
    pub min_value: f32,
    pub max_value: f32,
    pub points: Vec<CurvePoint>,
}

impl CurveDataSet {
    /// Fresh curve for an attribute, seeded with the authoring defaults for
    /// that attribute's output range and a single midpoint control point.
    pub fn new(attribute: AttributeType) -> Self {
        let (min_value, max_value) = attribute.default_range();
        Self {
            attribute,
            profile: CurveProfile::Smooth,
            min_value,
            max_value,
            points: vec![CurvePoint { x: 0.0, y: 0.5 }],
        }
    }

    pub fn validate(&self) -> VfxResult<()> {
        if self.points.is_empty() {
            return Err(VfxError::curve(format!(
                "curve '{}' has no control points",
                self.attribute.display_name()
            )));
        }
        if !self.points.windows(2).all(|w| w[0].x <= w[1].x) {
            return Err(VfxError::curve(format!(
                "curve '{}' points must be sorted ascending by time",
                self.attribute.display_name()
            )));
        }
        Ok(())
    }

    /// Samples the curve at a playback frame inside `window`.
    ///
    /// The frame is mapped linearly onto the curve's own time domain (the x
    /// range of its control points — authors may place points anywhere), the
    /// bracketing pair is blended by profile, and the raw `[0, 1]` value is
    /// remapped into `[min_value, max_value]`.
    ///
    /// Preconditions (guarded by `validate` at authoring/load time): at
    /// least one control point, `window.span() > 0`.
    pub fn evaluate(&self, frame: i32, window: FrameWindow) -> f32 {
        let (Some(first), Some(last)) = (self.points.first(), self.points.last()) else {
            return self.min_value;
        };

        let progress = (frame - window.start) as f32 / window.span() as f32;
        let time = first.x + (last.x - first.x) * progress;

        let mut lower = None;
        let mut upper = None;
        for (i, point) in self.points.iter().enumerate() {
            if point.x <= time {
                lower = Some(i);
            } else {
                upper = Some(i);
                break;
            }
        }

        let raw = match (lower, upper) {
            (None, Some(u)) => self.points[u].y,
            (Some(l), None) => self.points[l].y,
            (Some(l), Some(u)) => {
                let lo = self.points[l];
                let hi = self.points[u];
                let t = (time - lo.x) / (hi.x - lo.x);
                match self.profile {
                    CurveProfile::Linear => lo.y + (hi.y - lo.y) * t,
                    CurveProfile::Smooth => lo.y + (hi.y - lo.y) * smoothstep(t),
                    CurveProfile::Discrete | CurveProfile::None => lo.y,
                }
            }
            (None, None) => first.y,
        };

        self.min_value + (self.max_value - self.min_value) * raw
    }
}

fn smoothstep(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Per-timestamp mapping from attribute tag to an optional curve. Unset
/// attributes keep their defaults during expansion (identity transform,
/// white colour, no UV motion).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CurveSet {
    slots: [Option<CurveDataSet>; AttributeType::COUNT],
}

impl CurveSet {
    pub fn get(&self, attribute: AttributeType) -> Option<&CurveDataSet> {
        self.slots[attribute.index()].as_ref()
    }

    pub fn get_mut(&mut self, attribute: AttributeType) -> Option<&mut CurveDataSet> {
        self.slots[attribute.index()].as_mut()
    }

    /// Inserts `curve` under its own attribute tag, replacing any previous
    /// curve for that attribute.
    pub fn insert(&mut self, curve: CurveDataSet) -> Option<CurveDataSet> {
        self.slots[curve.attribute.index()].replace(curve)
    }

    pub fn remove(&mut self, attribute: AttributeType) -> Option<CurveDataSet> {
        self.slots[attribute.index()].take()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CurveDataSet> {
        self.slots.iter().filter_map(Option::as_ref)
    }

    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    pub fn validate(&self) -> VfxResult<()> {
        for curve in self.iter() {
            curve.validate()?;
        }
        Ok(())
    }
}
