use serde::{Deserialize, Serialize, Serializer};
use std::cmp::Ordering;

/// 1-decimal rounding used for every percentage the gradebook reports:
/// `floor(10*x + 0.5) / 10`
pub fn round_off_1_decimal(x: f64) -> f64 {
    ((10.0 * x) + 0.5).floor() / 10.0
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Grade {
    #[serde(rename = "A+")]
    APlus,
    #[serde(rename = "A")]
    A,
    #[serde(rename = "B+")]
    BPlus,
    #[serde(rename = "B")]
    B,
    #[serde(rename = "C+")]
    CPlus,
    #[serde(rename = "C")]
    C,
    #[serde(rename = "F")]
    F,
}

/// Inclusive lower bounds, highest band first. Anything below the last
/// bound is an F.
const GRADE_BANDS: [(f64, Grade); 6] = [
    (90.0, Grade::APlus),
    (80.0, Grade::A),
    (70.0, Grade::BPlus),
    (60.0, Grade::B),
    (50.0, Grade::CPlus),
    (40.0, Grade::C),
];

impl Grade {
    /// All bands in display order (A+ first).
    pub const ALL: [Grade; 7] = [
        Grade::APlus,
        Grade::A,
        Grade::BPlus,
        Grade::B,
        Grade::CPlus,
        Grade::C,
        Grade::F,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Grade::APlus => "A+",
            Grade::A => "A",
            Grade::BPlus => "B+",
            Grade::B => "B",
            Grade::CPlus => "C+",
            Grade::C => "C",
            Grade::F => "F",
        }
    }

    /// F = 0 up to A+ = 6.
    pub fn rank(self) -> u8 {
        match self {
            Grade::APlus => 6,
            Grade::A => 5,
            Grade::BPlus => 4,
            Grade::B => 3,
            Grade::CPlus => 2,
            Grade::C => 1,
            Grade::F => 0,
        }
    }
}

impl Ord for Grade {
    fn cmp(&self, other: &Self) -> Ordering {
        self.rank().cmp(&other.rank())
    }
}

impl PartialOrd for Grade {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl std::fmt::Display for Grade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Total over f64. Out-of-range input is clamped to [0, 100]; NaN lands in F
/// because it fails every `>=` comparison.
pub fn grade_for_percent(percent: f64) -> Grade {
    let p = percent.clamp(0.0, 100.0);
    for (lower, grade) in GRADE_BANDS {
        if p >= lower {
            return grade;
        }
    }
    Grade::F
}

/// Percentage for one cell. `None` means the cell has no mark yet, which is
/// not the same thing as a score of zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Percentage {
    Scored(f64),
    Unscored,
}

pub const UNSCORED: &str = "unscored";

impl Percentage {
    pub fn from_score(score: Option<f64>, max_score: f64) -> Self {
        match score {
            Some(s) if max_score > 0.0 => {
                Percentage::Scored(round_off_1_decimal(s / max_score * 100.0))
            }
            _ => Percentage::Unscored,
        }
    }

    pub fn value(self) -> Option<f64> {
        match self {
            Percentage::Scored(p) => Some(p),
            Percentage::Unscored => None,
        }
    }

    pub fn grade(self) -> Option<Grade> {
        self.value().map(grade_for_percent)
    }
}

impl Serialize for Percentage {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Percentage::Scored(p) => serializer.serialize_f64(*p),
            Percentage::Unscored => serializer.serialize_str(UNSCORED),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AssessmentAverage {
    pub avg_percent: Option<f64>,
    pub scored_count: usize,
    pub unscored_count: usize,
}

/// Averages the scored cells of one assessment column. Unscored cells are
/// counted but excluded from the denominator.
pub fn assessment_average<I>(cells: I) -> AssessmentAverage
where
    I: IntoIterator<Item = Percentage>,
{
    let mut sum: f64 = 0.0;
    let mut scored_count: usize = 0;
    let mut unscored_count: usize = 0;

    for cell in cells {
        match cell {
            Percentage::Scored(p) => {
                scored_count += 1;
                sum += p;
            }
            Percentage::Unscored => {
                unscored_count += 1;
            }
        }
    }

    let avg_percent = if scored_count > 0 {
        Some(round_off_1_decimal(sum / (scored_count as f64)))
    } else {
        None
    };

    AssessmentAverage {
        avg_percent,
        scored_count,
        unscored_count,
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeCount {
    pub grade: Grade,
    pub count: usize,
}

/// Per-band counts in display order; every band is present even at zero.
pub fn grade_distribution<I>(cells: I) -> Vec<GradeCount>
where
    I: IntoIterator<Item = Percentage>,
{
    let mut counts = [0usize; 7];
    for g in cells.into_iter().filter_map(Percentage::grade) {
        counts[6 - g.rank() as usize] += 1;
    }
    Grade::ALL
        .iter()
        .zip(counts)
        .map(|(&grade, count)| GradeCount { grade, count })
        .collect()
}
