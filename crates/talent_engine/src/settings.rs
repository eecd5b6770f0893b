use std::time::Duration;

use talent_core::Operation;

pub const DEFAULT_BASE_URL: &str = "https://www.wintalent.cn";

/// Wire constants and timeouts for one recruiting platform deployment.
#[derive(Debug, Clone)]
pub struct PlatformSettings {
    pub base_url: String,
    pub login_info_path: String,
    pub login_path: String,
    pub create_token_path: String,
    pub candidate_list_path: String,
    pub resume_path: String,
    pub job_description_path: String,
    pub session_cookie_name: String,
    /// Organisation path the candidate list is scoped to.
    pub current_code: String,
    /// Sent as `recruitType` when a record carries none.
    pub fallback_recruit_type: String,
    pub user_agent: String,
    pub connect_timeout: Duration,
    /// Metadata, login, token, list and job description calls.
    pub request_timeout: Duration,
    /// Resume downloads.
    pub download_timeout: Duration,
    pub max_resume_bytes: u64,
    pub retry: RetrySettings,
}

impl Default for PlatformSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            login_info_path: "/interviewer/loginInfo".to_string(),
            login_path: "/interviewer/login".to_string(),
            create_token_path: "/interviewer/common/createToken".to_string(),
            candidate_list_path: "/interviewer/interviewPlatform/screen/recommendToMe".to_string(),
            resume_path: "/interviewPlatform/getResumeOriginalInfo".to_string(),
            job_description_path: "/interviewer/common/data/showPostJD".to_string(),
            session_cookie_name: "SESSION".to_string(),
            current_code: "0/430400/430447/430448/430449".to_string(),
            fallback_recruit_type: "2".to_string(),
            user_agent: "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 \
                         (KHTML, like Gecko) Chrome/143.0.0.0 Safari/537.36"
                .to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            download_timeout: Duration::from_secs(60),
            max_resume_bytes: 50 * 1024 * 1024,
            retry: RetrySettings::default(),
        }
    }
}

impl PlatformSettings {
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Path handed to the token-issuing endpoint for `operation`.
    pub fn operation_path(&self, operation: Operation) -> &str {
        match operation {
            Operation::CandidateList => &self.candidate_list_path,
            Operation::ResumeDocument => &self.resume_path,
            Operation::JobDescription => &self.job_description_path,
        }
    }
}

/// Generic transport retry for throttling, server errors and dropped connections.
///
/// Authorization failures are never retried at this layer.
#[derive(Debug, Clone)]
pub struct RetrySettings {
    pub max_retries: u32,
    pub initial_backoff: Duration,
    pub retry_statuses: Vec<u16>,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_backoff: Duration::from_millis(500),
            retry_statuses: vec![429, 500, 502, 503, 504],
        }
    }
}

impl RetrySettings {
    /// No retries at all.
    pub fn disabled() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    /// Delay before retry number `attempt` (1-based): doubles each time.
    pub fn backoff(&self, attempt: u32) -> Duration {
        self.initial_backoff
            .saturating_mul(1u32 << attempt.saturating_sub(1).min(16))
    }
}
