//! Individual platform calls. Each maps one HTTP exchange onto typed values.

use reqwest::multipart::Form;
use reqwest::Response;
use serde::Deserialize;
use serde_json::Value;
use talent_core::{parse_page, value_to_string, PageResult};
use url::Url;

use crate::client::PlatformClient;
use crate::{FailureKind, FetchError};

const LOGIN_PAGE: &str = "/interviewer/login";
const SCREEN_PAGE: &str = "/interviewer/interviewPlatform/newpc/antPage/screen.html";
const RESUME_PAGE: &str = "/interviewer/interviewPlatform/newpc/jsp/resume/resumeInfo.html";

/// Login metadata: challenge, password key and cipher indicator.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginMetadata {
    #[serde(default)]
    time: Value,
    #[serde(default, rename = "interviewerPassKey")]
    pass_key: Value,
    #[serde(default, rename = "interviewerPassType")]
    pass_type: Value,
}

impl LoginMetadata {
    pub fn time_sign(&self) -> String {
        value_to_string(&self.time).unwrap_or_default()
    }

    pub fn encryption_key(&self) -> Option<String> {
        value_to_string(&self.pass_key)
    }

    pub fn cipher_indicator(&self) -> Option<String> {
        value_to_string(&self.pass_type)
    }
}

/// Query of one candidate-list page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    pub page_no: u32,
    pub page_size: u32,
    pub recommend_begin: Option<String>,
    pub recommend_end: Option<String>,
}

impl PlatformClient {
    /// Fetches login metadata for `corp_code`. Any non-200 status is an
    /// [`FailureKind::HttpStatus`]; an unparseable body is [`FailureKind::Decode`].
    pub async fn login_info(&self, corp_code: &str) -> Result<LoginMetadata, FetchError> {
        let mut url = self.endpoint(&self.settings().login_info_path)?;
        url.query_pairs_mut().append_pair("r", "0.123456789");
        let response = self
            .send(|| {
                self.with_referer(self.http().post(url.clone()), LOGIN_PAGE)
                    .form(&[("corpCode", corp_code)])
            })
            .await?;
        if response.status().as_u16() != 200 {
            return Err(FetchError::new(
                FailureKind::HttpStatus(response.status().as_u16()),
                "login metadata request failed",
            ));
        }
        response
            .json::<LoginMetadata>()
            .await
            .map_err(|err| FetchError::new(FailureKind::Decode, err.without_url().to_string()))
    }

    /// Submits the login form. The raw response is returned because success
    /// is judged by the cookie jar, not by the body.
    pub async fn submit_login(
        &self,
        corp_code: &str,
        username: &str,
        encrypted_password: &str,
        time_sign: &str,
    ) -> Result<Response, FetchError> {
        let url = self.endpoint(&self.settings().login_path)?;
        let form = [
            ("remremberMeInput", "true"),
            ("timeSign", time_sign),
            ("actycoStatus", ""),
            ("loginMode", ""),
            ("localeType", "1"),
            ("login-select", "1"),
            ("corpCode", corp_code),
            ("userName", username),
            ("password", encrypted_password),
            ("verifyCode", ""),
            ("phoneNum", ""),
            ("verification", ""),
            ("remremberMe", "true"),
        ];
        self.send(|| {
            self.with_referer(self.http().post(url.clone()), LOGIN_PAGE)
                .form(&form)
        })
        .await
    }

    /// Exchanges the session for a signed URL scoped to `operation_path`.
    /// Returns `Ok(None)` when the server answers without a `tokenUrl`.
    pub async fn issue_token(&self, operation_path: &str) -> Result<Option<Url>, FetchError> {
        let url = self.endpoint(&self.settings().create_token_path)?;
        let referer = format!(
            "{SCREEN_PAGE}?currentCode={}",
            self.settings().current_code
        );
        let response = self
            .send_checked(|| {
                let builder = self
                    .with_referer(self.http().post(url.clone()), &referer)
                    .form(&[("url", operation_path)]);
                PlatformClient::accept_json(builder)
            })
            .await?;
        let body = PlatformClient::json_body(response).await?;
        match body.get("tokenUrl").and_then(value_to_string) {
            Some(token_url) => self.endpoint(&token_url).map(Some),
            None => Ok(None),
        }
    }

    /// Fetches and parses one candidate-list page from a resolved list URL.
    pub async fn fetch_candidate_page(
        &self,
        url: Url,
        query: &ListQuery,
    ) -> Result<PageResult, FetchError> {
        let current_code = self.settings().current_code.clone();
        let response = self
            .send_checked(|| {
                let mut form = Form::new()
                    .text("isSearchButton", "true")
                    .text("currentCode", current_code.clone())
                    .text("currentPage", query.page_no.to_string())
                    .text("rowSize", query.page_size.to_string());
                if let Some(begin) = &query.recommend_begin {
                    form = form.text("recommendBeginTimeStr", begin.clone());
                }
                if let Some(end) = &query.recommend_end {
                    form = form.text("recommendEndTimeStr", end.clone());
                }
                let builder = self
                    .with_referer(self.http().post(url.clone()), SCREEN_PAGE)
                    .multipart(form);
                PlatformClient::accept_json(builder)
            })
            .await?;
        let body = PlatformClient::json_body(response).await?;
        Ok(parse_page(&body))
    }

    /// Downloads the original resume document from a resolved resume URL.
    pub async fn fetch_resume(
        &self,
        mut url: Url,
        apply_id: &str,
        resume_id: &str,
    ) -> Result<Vec<u8>, FetchError> {
        url.query_pairs_mut()
            .append_pair("lanType", "1")
            .append_pair("applyId", apply_id)
            .append_pair("resumeId", resume_id)
            .append_pair("showPdf", "true")
            .append_pair("fileType", "pdf");
        let timeout = self.settings().download_timeout;
        let response = self
            .send_checked(|| {
                let builder = self
                    .with_referer(self.http().get(url.clone()), RESUME_PAGE)
                    .timeout(timeout);
                PlatformClient::accept_json(builder)
            })
            .await?;
        self.bytes_body(response).await
    }

    /// Fetches a job description from a resolved JD URL, unmodified.
    pub async fn fetch_job_description(
        &self,
        url: Url,
        job_id: &str,
        recruit_type: Option<&str>,
    ) -> Result<Value, FetchError> {
        let recruit_type = recruit_type
            .unwrap_or(self.settings().fallback_recruit_type.as_str())
            .to_string();
        let response = self
            .send_checked(|| {
                let form = Form::new()
                    .text("postId", job_id.to_string())
                    .text("recruitType", recruit_type.clone());
                let builder = self
                    .with_referer(self.http().post(url.clone()), SCREEN_PAGE)
                    .multipart(form);
                PlatformClient::accept_json(builder)
            })
            .await?;
        PlatformClient::json_body(response).await
    }
}
