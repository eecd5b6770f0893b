use std::fmt;

use serde_json::Value;

/// The three token-gated operations a harvest needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Paginated list of candidates recommended to the logged-in interviewer.
    CandidateList,
    /// Original resume document for one application.
    ResumeDocument,
    /// Structured job description for one posting.
    JobDescription,
}

impl Operation {
    /// Resolution order used when a harvest starts.
    pub const ALL: [Operation; 3] = [
        Operation::CandidateList,
        Operation::ResumeDocument,
        Operation::JobDescription,
    ];
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::CandidateList => write!(f, "candidate list"),
            Operation::ResumeDocument => write!(f, "resume document"),
            Operation::JobDescription => write!(f, "job description"),
        }
    }
}

/// One row of the candidate list.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CandidateRecord {
    pub job_id: Option<String>,
    pub job_title: Option<String>,
    pub recruit_type: Option<String>,
    pub display_name: Option<String>,
    pub apply_id: Option<String>,
    pub resume_id: Option<String>,
}

impl CandidateRecord {
    /// Application and resume identifiers, when both are present.
    pub fn resume_ref(&self) -> Option<(&str, &str)> {
        match (self.apply_id.as_deref(), self.resume_id.as_deref()) {
            (Some(apply_id), Some(resume_id)) => Some((apply_id, resume_id)),
            _ => None,
        }
    }
}

/// One fetched page of the candidate list.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PageResult {
    /// Row count reported by the server, if it reported a usable one.
    pub total: Option<u64>,
    pub records: Vec<CandidateRecord>,
}

impl PageResult {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Terminal output unit of a harvest. Either document may be absent.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HarvestedItem {
    pub display_name: Option<String>,
    pub apply_id: String,
    pub resume_id: String,
    pub job_id: String,
    pub job_title: String,
    pub recruit_type: String,
    pub job_description: Option<Value>,
    pub resume: Option<Vec<u8>>,
}

impl HarvestedItem {
    pub fn new(
        record: CandidateRecord,
        job_description: Option<Value>,
        resume: Option<Vec<u8>>,
    ) -> Self {
        Self {
            display_name: record.display_name,
            apply_id: record.apply_id.unwrap_or_default(),
            resume_id: record.resume_id.unwrap_or_default(),
            job_id: record.job_id.unwrap_or_default(),
            job_title: record.job_title.unwrap_or_default(),
            recruit_type: record.recruit_type.unwrap_or_default(),
            job_description,
            resume,
        }
    }
}

/// Deduplicated per-job summary built from candidate records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionAggregate {
    pub job_id: String,
    pub job_title: String,
    pub recruit_type: String,
    pub qualification: String,
    pub responsibility: String,
}

impl PositionAggregate {
    /// Builds an aggregate from the first record seen for `job_id` and the
    /// job description fetched for it, if any.
    pub fn from_description(
        job_id: impl Into<String>,
        record: &CandidateRecord,
        description: Option<&Value>,
    ) -> Self {
        let text_field = |key: &str| {
            description
                .and_then(|jd| jd.get(key))
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        };
        Self {
            job_id: job_id.into(),
            job_title: record.job_title.clone().unwrap_or_default(),
            recruit_type: record.recruit_type.clone().unwrap_or_default(),
            qualification: text_field("serviceCondition"),
            responsibility: text_field("workContent"),
        }
    }
}
