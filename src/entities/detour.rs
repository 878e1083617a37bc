use serde::{Deserialize, Serialize};

/// Qualitative fit of a candidate into the current route, derived from the
/// detour ratio.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetourLabel {
    Great,
    VeryGood,
    Normal,
    Bad,
    VeryBad,
    Unknown,
}

impl DetourLabel {
    pub fn from_ratio(ratio: Option<f64>) -> Self {
        match ratio {
            None => Self::Unknown,
            Some(r) if r.is_nan() => Self::Unknown,
            Some(r) if r <= 0.10 => Self::Great,
            Some(r) if r <= 0.25 => Self::VeryGood,
            Some(r) if r <= 0.50 => Self::Normal,
            Some(r) if r <= 1.00 => Self::Bad,
            Some(_) => Self::VeryBad,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Great => "great",
            Self::VeryGood => "very good",
            Self::Normal => "normal",
            Self::Bad => "bad",
            Self::VeryBad => "very bad",
            Self::Unknown => "",
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DetourResult {
    pub ratio: Option<f64>,
    pub label: DetourLabel,
}

impl DetourResult {
    pub fn from_ratio(ratio: Option<f64>) -> Self {
        let ratio = ratio.filter(|r| r.is_finite());
        Self {
            ratio,
            label: DetourLabel::from_ratio(ratio),
        }
    }

    pub fn unknown() -> Self {
        Self {
            ratio: None,
            label: DetourLabel::Unknown,
        }
    }

    pub fn is_unknown(&self) -> bool {
        self.ratio.is_none()
    }
}

#[test]
fn label_boundaries_test() {
    assert_eq!(DetourLabel::from_ratio(Some(0.0)), DetourLabel::Great);
    assert_eq!(DetourLabel::from_ratio(Some(0.10)), DetourLabel::Great);
    assert_eq!(DetourLabel::from_ratio(Some(0.1000001)), DetourLabel::VeryGood);
    assert_eq!(DetourLabel::from_ratio(Some(0.25)), DetourLabel::VeryGood);
    assert_eq!(DetourLabel::from_ratio(Some(0.50)), DetourLabel::Normal);
    assert_eq!(DetourLabel::from_ratio(Some(1.00)), DetourLabel::Bad);
    assert_eq!(DetourLabel::from_ratio(Some(1.0000001)), DetourLabel::VeryBad);
    assert_eq!(DetourLabel::from_ratio(None), DetourLabel::Unknown);
}

#[test]
fn unknown_label_is_empty_test() {
    assert_eq!(DetourLabel::Unknown.name(), "");
    assert_eq!(DetourLabel::VeryGood.name(), "very good");
}

#[test]
fn nan_ratio_is_unknown_test() {
    let result = DetourResult::from_ratio(Some(f64::NAN));
    assert!(result.is_unknown());
    assert_eq!(result.label, DetourLabel::Unknown);
}
