pub mod rank;
pub mod types;

pub use rank::{rank_by_magnitude, Explanation, DISPLAY_LIMIT};
pub use types::{AssessmentResult, Decision, MalformedResponse, RankedContribution, StoredAssessment};
