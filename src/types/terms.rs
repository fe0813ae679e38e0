//! Controlled photography vocabularies and the normalized term set.
//!
//! Every field of [`ParsedTerms`] is a closed enum. A term serializes as its
//! canonical label (e.g. `"中景(MS)"`), which is also what the remote
//! service is instructed to answer with. Synonyms are the lookup keys the
//! term matcher and the response parser accept for a term.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::ShotTermsError;

/// Delimiter used when joining free-text fragments and prompt parts.
pub const FULLWIDTH_COMMA: &str = "，";

macro_rules! vocabulary {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $variant:ident => $label:literal [ $($syn:literal),* $(,)? ] ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $( $variant, )+
        }

        impl $name {
            /// Every term of this vocabulary, in display order.
            pub const ALL: &'static [$name] = &[ $( $name::$variant, )+ ];

            /// Canonical label, as persisted and displayed.
            pub fn label(&self) -> &'static str {
                match self {
                    $( Self::$variant => $label, )+
                }
            }

            /// Lower-case lookup keys for this term (canonical label included).
            pub fn synonyms(&self) -> &'static [&'static str] {
                match self {
                    $( Self::$variant => &[$label, $($syn),*], )+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        }

        impl FromStr for $name {
            type Err = ShotTermsError;

            fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
                Self::ALL
                    .iter()
                    .copied()
                    .find(|t| t.label() == s)
                    .ok_or_else(|| {
                        ShotTermsError::InvalidInput(format!(
                            "'{s}' is not a {} term",
                            stringify!($name)
                        ))
                    })
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
                serializer.serialize_str(self.label())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                s.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

vocabulary! {
    /// How much of the subject the frame holds.
    ShotSize {
        ExtremeLongShot => "大远景(ELS)" ["大远景", "extreme long shot", "extreme wide shot", "els", "ews"],
        LongShot => "远景(LS)" ["远景", "long shot", "wide shot", "wide", "ls", "ws"],
        FullShot => "全景(FS)" ["全景", "全身", "full shot", "full body", "fs"],
        MediumLongShot => "中远景(MLS)" ["中远景", "medium long shot", "medium full shot", "mls", "cowboy shot"],
        MediumShot => "中景(MS)" ["中景", "medium shot", "mid shot", "ms"],
        MediumCloseUp => "中近景(MCU)" ["中近景", "近景", "medium close-up", "medium close up", "mcu"],
        CloseUp => "特写(CU)" ["特写", "close-up", "close up", "closeup", "cu"],
        ExtremeCloseUp => "大特写(ECU)" ["大特写", "extreme close-up", "extreme close up", "ecu"],
    }
}

vocabulary! {
    /// Vertical camera position relative to the subject.
    AngleHeight {
        BirdsEye => "鸟瞰(Bird's Eye)" ["鸟瞰", "俯瞰", "bird's eye", "birds eye", "bird's-eye view", "overhead", "top down"],
        High => "高角度俯拍(High)" ["高角度俯拍", "俯拍", "高角度", "high angle", "high"],
        MildHigh => "轻微俯拍(Mild High)" ["轻微俯拍", "微俯拍", "微俯", "mild high", "slightly high", "slight high angle"],
        EyeLevel => "平视(Eye Level)" ["平视", "平拍", "eye level", "eye-level"],
        MildLow => "轻微仰拍(Mild Low)" ["轻微仰拍", "微仰拍", "微仰", "mild low", "slightly low", "slight low angle"],
        Low => "低角度仰拍(Low)" ["低角度仰拍", "仰拍", "低角度", "low angle", "low"],
        WormsEye => "虫视(Worm's Eye)" ["虫视", "极低角度", "worm's eye", "worms eye", "worm's-eye view"],
    }
}

vocabulary! {
    /// Horizontal camera position around the subject.
    AngleDirection {
        Front => "正面(Front)" ["正面", "front", "frontal", "front view"],
        ThreeQuarterFront => "3/4正面(3/4 Front)" ["3/4正面", "四分之三正面", "3/4 front", "three-quarter front", "three quarter"],
        Profile => "侧面(Profile)" ["侧面", "侧身", "profile", "side view", "side"],
        ThreeQuarterBack => "3/4背面(3/4 Back)" ["3/4背面", "四分之三背面", "3/4 back", "three-quarter back"],
        Back => "背面(Back)" ["背面", "背影", "back", "rear view", "from behind"],
    }
}

vocabulary! {
    /// Spatial perspective or point of view.
    Perspective {
        OnePoint => "一点透视(One-Point)" ["一点透视", "单点透视", "one-point perspective", "one point", "one-point"],
        TwoPoint => "两点透视(Two-Point)" ["两点透视", "two-point perspective", "two point", "two-point"],
        ThreePoint => "三点透视(Three-Point)" ["三点透视", "three-point perspective", "three point", "three-point"],
        PointOfView => "主观视角(POV)" ["主观视角", "第一人称", "pov", "point of view", "first person"],
        OverTheShoulder => "过肩视角(OTS)" ["过肩视角", "过肩", "over the shoulder", "over-the-shoulder", "ots"],
    }
}

vocabulary! {
    /// Lens family.
    LensType {
        UltraWide => "超广角(Ultra Wide)" ["超广角", "ultra wide", "ultra-wide", "ultrawide"],
        Wide => "广角(Wide)" ["广角", "wide angle", "wide-angle", "wide lens", "wide"],
        Normal => "标准镜头(Normal)" ["标准镜头", "标准", "normal lens", "standard lens", "50mm"],
        Telephoto => "长焦(Telephoto)" ["长焦", "远摄", "telephoto", "tele", "long lens"],
        Macro => "微距(Macro)" ["微距", "macro", "macro lens"],
        Fisheye => "鱼眼(Fisheye)" ["鱼眼", "fisheye", "fish-eye", "fish eye"],
    }
}

vocabulary! {
    /// Lighting setup or quality.
    Lighting {
        Natural => "自然光(Natural)" ["自然光", "natural light", "natural", "daylight"],
        FrontLight => "顺光(Front Light)" ["顺光", "正面光", "front light", "front lighting"],
        SideLight => "侧光(Side Light)" ["侧光", "side light", "side lighting", "side"],
        Backlight => "逆光(Backlight)" ["逆光", "背光", "backlight", "back light", "backlit", "rim light"],
        TopLight => "顶光(Top Light)" ["顶光", "top light", "overhead light"],
        Rembrandt => "伦勃朗光(Rembrandt)" ["伦勃朗光", "伦勃朗", "rembrandt", "rembrandt lighting"],
        GoldenHour => "黄金时刻(Golden Hour)" ["黄金时刻", "黄金时段", "golden hour", "magic hour"],
        HighKey => "高调(High Key)" ["高调", "高调光", "high key", "high-key"],
        LowKey => "低调(Low Key)" ["低调", "低调光", "low key", "low-key"],
    }
}

/// The six term-bearing fields of [`ParsedTerms`], in matcher priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    ShotSize,
    AngleHeight,
    AngleDirection,
    Perspective,
    LensType,
    Lighting,
}

impl Field {
    /// Fields in the fixed priority order used by the term matcher.
    pub const PRIORITY: [Field; 6] = [
        Field::ShotSize,
        Field::AngleHeight,
        Field::AngleDirection,
        Field::Perspective,
        Field::LensType,
        Field::Lighting,
    ];

    /// JSON key of this field in [`ParsedTerms`] and in the remote response.
    pub fn key(&self) -> &'static str {
        match self {
            Self::ShotSize => "shotSize",
            Self::AngleHeight => "angleHeight",
            Self::AngleDirection => "angleDirection",
            Self::Perspective => "perspective",
            Self::LensType => "lensType",
            Self::Lighting => "lighting",
        }
    }

    /// Canonical labels of every term of this field.
    pub fn labels(&self) -> Vec<&'static str> {
        match self {
            Self::ShotSize => ShotSize::ALL.iter().map(|t| t.label()).collect(),
            Self::AngleHeight => AngleHeight::ALL.iter().map(|t| t.label()).collect(),
            Self::AngleDirection => AngleDirection::ALL.iter().map(|t| t.label()).collect(),
            Self::Perspective => Perspective::ALL.iter().map(|t| t.label()).collect(),
            Self::LensType => LensType::ALL.iter().map(|t| t.label()).collect(),
            Self::Lighting => Lighting::ALL.iter().map(|t| t.label()).collect(),
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// A single controlled-vocabulary value, tagged with its field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Term {
    ShotSize(ShotSize),
    AngleHeight(AngleHeight),
    AngleDirection(AngleDirection),
    Perspective(Perspective),
    LensType(LensType),
    Lighting(Lighting),
}

impl Term {
    /// The field this term belongs to.
    pub fn field(&self) -> Field {
        match self {
            Self::ShotSize(_) => Field::ShotSize,
            Self::AngleHeight(_) => Field::AngleHeight,
            Self::AngleDirection(_) => Field::AngleDirection,
            Self::Perspective(_) => Field::Perspective,
            Self::LensType(_) => Field::LensType,
            Self::Lighting(_) => Field::Lighting,
        }
    }

    /// Canonical label of the wrapped term.
    pub fn label(&self) -> &'static str {
        match self {
            Self::ShotSize(t) => t.label(),
            Self::AngleHeight(t) => t.label(),
            Self::AngleDirection(t) => t.label(),
            Self::Perspective(t) => t.label(),
            Self::LensType(t) => t.label(),
            Self::Lighting(t) => t.label(),
        }
    }

    /// Every term of `field`, in display order.
    pub fn all_of(field: Field) -> Vec<Term> {
        match field {
            Field::ShotSize => ShotSize::ALL.iter().copied().map(Term::ShotSize).collect(),
            Field::AngleHeight => AngleHeight::ALL
                .iter()
                .copied()
                .map(Term::AngleHeight)
                .collect(),
            Field::AngleDirection => AngleDirection::ALL
                .iter()
                .copied()
                .map(Term::AngleDirection)
                .collect(),
            Field::Perspective => Perspective::ALL
                .iter()
                .copied()
                .map(Term::Perspective)
                .collect(),
            Field::LensType => LensType::ALL.iter().copied().map(Term::LensType).collect(),
            Field::Lighting => Lighting::ALL.iter().copied().map(Term::Lighting).collect(),
        }
    }

    /// Lookup keys of the wrapped term.
    pub fn synonyms(&self) -> &'static [&'static str] {
        match self {
            Self::ShotSize(t) => t.synonyms(),
            Self::AngleHeight(t) => t.synonyms(),
            Self::AngleDirection(t) => t.synonyms(),
            Self::Perspective(t) => t.synonyms(),
            Self::LensType(t) => t.synonyms(),
            Self::Lighting(t) => t.synonyms(),
        }
    }
}

/// Normalized output: one optional term per field, free-text remainder,
/// and a confidence in `[0, 1]`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedTerms {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shot_size: Option<ShotSize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub angle_height: Option<AngleHeight>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub angle_direction: Option<AngleDirection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub perspective: Option<Perspective>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lens_type: Option<LensType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lighting: Option<Lighting>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub confidence: f64,
}

impl ParsedTerms {
    /// Term currently set for `field`, if any.
    pub fn get(&self, field: Field) -> Option<Term> {
        match field {
            Field::ShotSize => self.shot_size.map(Term::ShotSize),
            Field::AngleHeight => self.angle_height.map(Term::AngleHeight),
            Field::AngleDirection => self.angle_direction.map(Term::AngleDirection),
            Field::Perspective => self.perspective.map(Term::Perspective),
            Field::LensType => self.lens_type.map(Term::LensType),
            Field::Lighting => self.lighting.map(Term::Lighting),
        }
    }

    /// Set the field `term` belongs to, only if it is still unset.
    ///
    /// Returns whether the term was stored.
    pub fn claim(&mut self, term: Term) -> bool {
        if self.get(term.field()).is_some() {
            return false;
        }
        match term {
            Term::ShotSize(t) => self.shot_size = Some(t),
            Term::AngleHeight(t) => self.angle_height = Some(t),
            Term::AngleDirection(t) => self.angle_direction = Some(t),
            Term::Perspective(t) => self.perspective = Some(t),
            Term::LensType(t) => self.lens_type = Some(t),
            Term::Lighting(t) => self.lighting = Some(t),
        }
        true
    }

    /// Set terms, in priority order.
    pub fn terms(&self) -> Vec<Term> {
        Field::PRIORITY
            .iter()
            .filter_map(|f| self.get(*f))
            .collect()
    }

    /// Return `self` with `confidence` clamped into `[0, 1]`.
    ///
    /// NaN becomes 0.
    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = if confidence.is_nan() {
            0.0
        } else {
            confidence.clamp(0.0, 1.0)
        };
        self
    }

    /// Normalized prompt text: set term labels in field order, then the
    /// description, joined by a full-width comma.
    pub fn to_prompt(&self) -> String {
        let mut parts: Vec<&str> = self.terms().iter().map(|t| t.label()).collect();
        if let Some(desc) = self.description.as_deref().map(str::trim)
            && !desc.is_empty()
        {
            parts.push(desc);
        }
        parts.join(FULLWIDTH_COMMA)
    }
}
