mod common;

use std::fs;

use common::*;
use pretty_assertions::assert_eq;
use talent_core::{HarvestOptions, ItemsPayload};
use talent_engine::{HarvestError, HarvestSession, Identity, PlatformSettings};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn options(page_size: u32) -> HarvestOptions {
    HarvestOptions {
        page_size,
        ..HarvestOptions::default()
    }
}

async fn session(settings: PlatformSettings, options: HarvestOptions) -> HarvestSession {
    HarvestSession::connect(
        settings,
        "corp-x",
        Identity::SessionToken("tok-1".into()),
        options,
    )
    .await
    .unwrap()
}

#[tokio::test]
async fn full_harvest_walks_pages_until_the_reported_total() {
    let server = MockServer::start().await;
    mount_tokens(&server).await;
    mount_list(
        &server,
        PagedList::new(vec![
            page(Some(3), vec![row("100703", "Li Lei", "1"), row("100704", "Han Meimei", "2")]),
            page(Some(3), vec![row("100703", "Wang Fang", "3")]),
        ]),
    )
    .await;
    for apply_id in ["1", "2", "3"] {
        mount_resume(&server, apply_id).await;
    }
    mount_job_description(&server, "100703").await;
    mount_job_description(&server, "100704").await;

    let mut harvest = session(test_settings(&server), options(2)).await;
    let items = harvest.harvest_all().await.unwrap();

    assert_eq!(
        items.iter().map(|i| i.apply_id.as_str()).collect::<Vec<_>>(),
        vec!["1", "2", "3"]
    );
    assert_eq!(items[2].resume.as_deref(), Some(pdf_bytes("3").as_slice()));
    assert_eq!(items[1].job_description, Some(job_description("100704")));
    assert_eq!(requests_to(&server, "/signed/list").await, 2);

    let payload = ItemsPayload::from_items(&items);
    assert_eq!(payload.total, 3);
}

#[tokio::test]
async fn empty_first_page_ends_the_harvest() {
    let server = MockServer::start().await;
    mount_tokens(&server).await;
    mount_list(&server, PagedList::new(Vec::new())).await;

    let mut harvest = session(test_settings(&server), options(10)).await;
    let items = harvest.harvest_all().await.unwrap();

    assert!(items.is_empty());
    assert_eq!(requests_to(&server, "/signed/list").await, 1);
}

#[tokio::test]
async fn page_cap_bounds_a_never_ending_list() {
    let server = MockServer::start().await;
    mount_tokens(&server).await;
    let pages = (1..=5)
        .map(|n| page(None, vec![row("100703", "Someone", &n.to_string())]))
        .collect();
    mount_list(&server, PagedList::new(pages)).await;

    let options = HarvestOptions {
        page_size: 1,
        max_pages: 2,
        ..HarvestOptions::default()
    };
    let mut harvest = session(test_settings(&server), options).await;
    let items = harvest.harvest_all().await.unwrap();

    assert_eq!(items.len(), 2);
    assert_eq!(requests_to(&server, "/signed/list").await, 2);
}

#[tokio::test]
async fn a_failed_resume_leaves_the_job_description_intact() {
    let server = MockServer::start().await;
    mount_tokens(&server).await;
    mount_list(
        &server,
        PagedList::new(vec![page(
            Some(2),
            vec![row("100703", "Li Lei", "1"), row("100703", "Han Meimei", "2")],
        )]),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/signed/resume"))
        .and(wiremock::matchers::query_param("applyId", "1"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    mount_resume(&server, "2").await;
    mount_job_description(&server, "100703").await;

    let mut harvest = session(test_settings(&server), options(10)).await;
    let items = harvest.harvest_all().await.unwrap();

    assert_eq!(items.len(), 2);
    assert!(items[0].resume.is_none());
    assert_eq!(items[0].job_description, Some(job_description("100703")));
    assert!(items[1].resume.is_some());
}

#[tokio::test]
async fn records_without_identifiers_skip_their_documents() {
    let server = MockServer::start().await;
    mount_tokens(&server).await;
    let bare = serde_json::json!({ "name": "Anonymous" });
    mount_list(&server, PagedList::new(vec![page(Some(1), vec![bare])])).await;

    let mut harvest = session(test_settings(&server), options(10)).await;
    let items = harvest.harvest_all().await.unwrap();

    assert_eq!(items.len(), 1);
    assert!(items[0].resume.is_none());
    assert!(items[0].job_description.is_none());
    assert_eq!(requests_to(&server, "/signed/resume").await, 0);
    assert_eq!(requests_to(&server, "/signed/jd").await, 0);
}

#[tokio::test]
async fn expired_list_token_is_recovered_mid_run() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/interviewer/common/createToken"))
        .and(wiremock::matchers::body_string_contains("recommendToMe"))
        .respond_with(ResponseTemplate::new(200).set_body_json(
            serde_json::json!({ "tokenUrl": "/signed/list-old" }),
        ))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    mount_tokens(&server).await;

    let pages = vec![
        page(None, vec![row("100703", "Li Lei", "1")]),
        page(None, vec![row("100703", "Han Meimei", "2")]),
    ];
    Mock::given(method("POST"))
        .and(path("/signed/list-old"))
        .respond_with(PagedList {
            pages: pages.clone(),
            deny_from: Some(2),
        })
        .mount(&server)
        .await;
    mount_list(&server, PagedList::new(pages)).await;

    let mut harvest = session(test_settings(&server), options(1)).await;
    let items = harvest.harvest_all().await.unwrap();

    assert_eq!(
        items.iter().map(|i| i.apply_id.as_str()).collect::<Vec<_>>(),
        vec!["1", "2"]
    );
    assert_eq!(requests_to(&server, "/signed/list-old").await, 2);
    assert_eq!(requests_to(&server, "/signed/list").await, 2);
}

#[tokio::test]
async fn expired_document_tokens_are_re_resolved_per_record() {
    let server = MockServer::start().await;
    mount_token(&server, "recommendToMe", "/signed/list").await;
    for (needle, stale) in [
        ("getResumeOriginalInfo", "/signed/resume-old"),
        ("showPostJD", "/signed/jd-old"),
    ] {
        Mock::given(method("POST"))
            .and(path("/interviewer/common/createToken"))
            .and(wiremock::matchers::body_string_contains(needle))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "tokenUrl": stale })),
            )
            .up_to_n_times(1)
            .mount(&server)
            .await;
    }
    mount_tokens(&server).await;
    Mock::given(method("GET"))
        .and(path("/signed/resume-old"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/signed/jd-old"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;
    mount_list(
        &server,
        PagedList::new(vec![page(Some(1), vec![row("100703", "Li Lei", "1")])]),
    )
    .await;
    mount_resume(&server, "1").await;
    mount_job_description(&server, "100703").await;

    let mut harvest = session(test_settings(&server), options(10)).await;
    let items = harvest.harvest_all().await.unwrap();

    assert_eq!(items[0].resume.as_deref(), Some(pdf_bytes("1").as_slice()));
    assert_eq!(items[0].job_description, Some(job_description("100703")));
    assert_eq!(requests_to(&server, "/signed/resume-old").await, 1);
    assert_eq!(requests_to(&server, "/signed/jd-old").await, 1);
    // Three tokens up front, then one fresh token per rejected operation.
    assert_eq!(harvest.endpoints().issued(), 5);
}

#[tokio::test]
async fn failing_list_page_aborts_the_harvest() {
    let server = MockServer::start().await;
    mount_tokens(&server).await;
    Mock::given(method("POST"))
        .and(path("/signed/list"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let mut harvest = session(test_settings(&server), options(10)).await;
    let err = harvest.harvest_all().await.unwrap_err();

    assert!(matches!(err, HarvestError::Network(_)));
    // One attempt plus two transport retries, and no token re-resolution.
    assert_eq!(requests_to(&server, "/signed/list").await, 3);
    assert_eq!(harvest.endpoints().issued(), 3);
}

#[tokio::test]
async fn list_denied_twice_is_fatal() {
    let server = MockServer::start().await;
    mount_tokens(&server).await;
    Mock::given(method("POST"))
        .and(path("/signed/list"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let mut harvest = session(test_settings(&server), options(10)).await;
    let err = harvest.harvest_all().await.unwrap_err();

    assert!(matches!(err, HarvestError::PermissionDenied { status: 403, .. }));
    assert_eq!(requests_to(&server, "/signed/list").await, 2);
}

#[tokio::test]
async fn unavailable_document_endpoints_do_not_stop_the_harvest() {
    let server = MockServer::start().await;
    mount_token(&server, "recommendToMe", "/signed/list").await;
    mount_list(
        &server,
        PagedList::new(vec![page(Some(1), vec![row("100703", "Li Lei", "1")])]),
    )
    .await;

    let mut harvest = session(test_settings(&server), options(10)).await;
    let items = harvest.harvest_all().await.unwrap();

    assert_eq!(items.len(), 1);
    assert!(items[0].resume.is_none());
    assert!(items[0].job_description.is_none());
}

#[tokio::test]
async fn single_page_reports_the_server_total() {
    let server = MockServer::start().await;
    mount_tokens(&server).await;
    mount_list(
        &server,
        PagedList::new(vec![
            page(Some(40), vec![row("100703", "Li Lei", "1")]),
            page(Some(40), vec![row("100704", "Han Meimei", "2")]),
        ]),
    )
    .await;
    mount_resume(&server, "2").await;
    mount_job_description(&server, "100704").await;

    let mut harvest = session(test_settings(&server), options(1)).await;
    let page = harvest.harvest_page(2).await.unwrap();

    assert_eq!(page.reported_total, Some(40));
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].apply_id, "2");
    assert_eq!(ItemsPayload::for_page(page.reported_total, &page.items).total, 40);
}

#[tokio::test]
async fn positions_describe_each_job_once() {
    let server = MockServer::start().await;
    mount_tokens(&server).await;
    mount_list(
        &server,
        PagedList::new(vec![
            page(None, vec![row("100703", "A", "1"), row("100704", "B", "2")]),
            page(None, vec![row("100703", "C", "3"), row("100705", "D", "4")]),
        ]),
    )
    .await;
    for job_id in ["100703", "100704", "100705"] {
        Mock::given(method("POST"))
            .and(path("/signed/jd"))
            .and(wiremock::matchers::body_string_contains(format!("\r\n\r\n{job_id}\r\n")))
            .respond_with(ResponseTemplate::new(200).set_body_json(job_description(job_id)))
            .expect(1)
            .mount(&server)
            .await;
    }

    let mut harvest = session(test_settings(&server), options(2)).await;
    let positions = harvest.aggregate_positions().await.unwrap();

    assert_eq!(
        positions.iter().map(|p| p.job_id.as_str()).collect::<Vec<_>>(),
        vec!["100703", "100704", "100705"]
    );
    assert_eq!(positions[0].qualification, "requirements of 100703");
    assert_eq!(positions[0].responsibility, "duties of 100703");
    assert_eq!(requests_to(&server, "/signed/resume").await, 0);
}

#[tokio::test]
async fn resumes_are_saved_under_stable_names() {
    let server = MockServer::start().await;
    mount_tokens(&server).await;
    mount_list(
        &server,
        PagedList::new(vec![page(
            Some(2),
            vec![row("100703", "Li Lei", "1"), row("100703", "Han Meimei", "2")],
        )]),
    )
    .await;
    mount_resume(&server, "1").await;

    let temp = TempDir::new().unwrap();
    let out = temp.path().join("out");
    let mut harvest = session(test_settings(&server), options(10)).await;
    let summary = harvest.save_resumes(&out).await.unwrap();

    assert_eq!(summary.written, 1);
    assert_eq!(summary.missing, 1);
    let saved = out.join(talent_engine::resume_filename(Some("Li Lei"), "1"));
    assert_eq!(fs::read(saved).unwrap(), pdf_bytes("1"));
    assert_eq!(requests_to(&server, "/signed/jd").await, 0);
}
