#![allow(dead_code)]

use std::time::Duration;

use serde_json::{json, Value};
use talent_engine::{PlatformSettings, RetrySettings};
use wiremock::matchers::{body_string_contains, method, path, query_param};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

pub const PASS_KEY: &str = "0123456789abcdef";
/// AES-128-ECB("secret-pass", PASS_KEY), hex.
pub const SECRET_PASS_CIPHERTEXT: &str = "163bf7d895f91390d986a8f65ee6d55a";

pub fn test_settings(server: &MockServer) -> PlatformSettings {
    talent_logging::initialize_for_tests();
    let mut settings = PlatformSettings::with_base_url(server.uri());
    settings.retry = RetrySettings {
        max_retries: 2,
        initial_backoff: Duration::from_millis(1),
        ..RetrySettings::default()
    };
    settings
}

pub async fn mount_login_info(server: &MockServer, body: Value) {
    Mock::given(method("POST"))
        .and(path("/interviewer/loginInfo"))
        .and(query_param("r", "0.123456789"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

pub fn login_info(pass_type: Value) -> Value {
    json!({
        "time": 1700000000123u64,
        "interviewerPassKey": PASS_KEY,
        "interviewerPassType": pass_type,
    })
}

pub async fn mount_login_success(server: &MockServer, session: &str) {
    Mock::given(method("POST"))
        .and(path("/interviewer/login"))
        .and(body_string_contains(SECRET_PASS_CIPHERTEXT))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Set-Cookie", format!("SESSION={session}; Path=/").as_str())
                .set_body_json(json!({ "status": "ok" })),
        )
        .mount(server)
        .await;
}

/// Token endpoint for the operation whose path contains `needle`.
pub async fn mount_token(server: &MockServer, needle: &str, token_url: &str) {
    Mock::given(method("POST"))
        .and(path("/interviewer/common/createToken"))
        .and(body_string_contains(needle))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "tokenUrl": token_url })))
        .mount(server)
        .await;
}

/// Mounts the three token endpoints, pointing at `/signed/list`,
/// `/signed/resume` and `/signed/jd`.
pub async fn mount_tokens(server: &MockServer) {
    mount_token(server, "recommendToMe", &format!("{}/signed/list", server.uri())).await;
    mount_token(server, "getResumeOriginalInfo", "/signed/resume").await;
    mount_token(server, "showPostJD", "/signed/jd").await;
}

pub fn row(job_id: &str, name: &str, apply_id: &str) -> Value {
    json!({
        "postId": job_id,
        "postName": format!("Job {job_id}"),
        "recruitType": 2,
        "name": name,
        "applyId": apply_id,
        "resumeId": format!("r-{apply_id}"),
    })
}

pub fn page(row_count: Option<u64>, rows: Vec<Value>) -> Value {
    json!({ "rowCount": row_count, "rowList": rows })
}

/// Extracts a text field from a multipart/form-data body.
pub fn multipart_field(body: &[u8], name: &str) -> Option<String> {
    let text = String::from_utf8_lossy(body);
    let marker = format!("name=\"{name}\"");
    let rest = &text[text.find(&marker)? + marker.len()..];
    let rest = &rest[rest.find("\r\n\r\n")? + 4..];
    Some(rest[..rest.find("\r\n")?].to_string())
}

/// Serves `pages` by their 1-based `currentPage`; later pages are empty.
/// Pages at or after `deny_from` answer 403.
pub struct PagedList {
    pub pages: Vec<Value>,
    pub deny_from: Option<u32>,
}

impl PagedList {
    pub fn new(pages: Vec<Value>) -> Self {
        Self {
            pages,
            deny_from: None,
        }
    }
}

impl Respond for PagedList {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let page_no: u32 = multipart_field(&request.body, "currentPage")
            .and_then(|n| n.parse().ok())
            .unwrap_or(0);
        if self.deny_from.is_some_and(|from| page_no >= from) {
            return ResponseTemplate::new(403);
        }
        let body = page_no
            .checked_sub(1)
            .and_then(|idx| self.pages.get(idx as usize).cloned())
            .unwrap_or_else(|| page(Some(0), Vec::new()));
        ResponseTemplate::new(200).set_body_json(body)
    }
}

pub async fn mount_list(server: &MockServer, list: PagedList) {
    Mock::given(method("POST"))
        .and(path("/signed/list"))
        .respond_with(list)
        .mount(server)
        .await;
}

pub fn pdf_bytes(apply_id: &str) -> Vec<u8> {
    format!("%PDF-1.7 resume {apply_id}").into_bytes()
}

pub async fn mount_resume(server: &MockServer, apply_id: &str) {
    Mock::given(method("GET"))
        .and(path("/signed/resume"))
        .and(query_param("applyId", apply_id))
        .and(query_param("fileType", "pdf"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(pdf_bytes(apply_id), "application/pdf"),
        )
        .mount(server)
        .await;
}

pub fn job_description(job_id: &str) -> Value {
    json!({
        "postId": job_id,
        "serviceCondition": format!("requirements of {job_id}"),
        "workContent": format!("duties of {job_id}"),
    })
}

pub async fn mount_job_description(server: &MockServer, job_id: &str) {
    Mock::given(method("POST"))
        .and(path("/signed/jd"))
        .and(body_string_contains(format!("\r\n\r\n{job_id}\r\n")))
        .respond_with(ResponseTemplate::new(200).set_body_json(job_description(job_id)))
        .mount(server)
        .await;
}

pub async fn requests_to(server: &MockServer, request_path: &str) -> usize {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|request| request.url.path() == request_path)
        .count()
}
