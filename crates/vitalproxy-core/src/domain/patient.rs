use serde::{Deserialize, Serialize};

/// Placeholder value the scorer's input schema requires for its target column.
pub const MORTALITY_PLACEHOLDER: &str = "0";

/// Patient feature record submitted to `/predict`.
///
/// Typing is the only validation applied: every field must be present and
/// deserialize to its declared type. Clinical plausibility is the scorer's
/// concern. Unknown extra fields are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientFeatures {
    pub age: i64,
    pub sex: String,
    pub bmi: f64,
    pub systolic_bp: i64,
    pub diastolic_bp: i64,
    pub glucose: f64,
    pub cholesterol: f64,
    pub creatinine: f64,
    pub diabetes: i64,
    pub hypertension: i64,
    pub diagnosis: String,
    pub readmission_30d: i64,
}

impl PatientFeatures {
    /// Wrap this record into the body the external scorer expects.
    pub fn to_scoring_payload(&self) -> ScoringRequestPayload<'_> {
        ScoringRequestPayload {
            features: ScoringFeatures {
                patient: self,
                mortality: MORTALITY_PLACEHOLDER,
            },
        }
    }
}

/// Outbound body: `{"features": {...patient fields, "mortality": "0"}}`.
#[derive(Debug, Serialize)]
pub struct ScoringRequestPayload<'a> {
    pub features: ScoringFeatures<'a>,
}

#[derive(Debug, Serialize)]
pub struct ScoringFeatures<'a> {
    #[serde(flatten)]
    pub patient: &'a PatientFeatures,
    pub mortality: &'static str,
}
