mod common;

use std::collections::BTreeMap;
use std::time::Duration;

use common::{ASSOCIATION_ID, Call, MockFsx, desired_model};
use dra_core::{Lifecycle, Tag};
use dra_provisioner::api::ApiError;
use dra_provisioner::handlers::create::create;
use dra_provisioner::{
    Action, HandlerErrorCode, HandlerRequest, OperationStatus, ProgressEvent, StabilizeConfig,
};

fn config() -> StabilizeConfig {
    StabilizeConfig {
        poll_interval: Duration::from_secs(5),
        max_wait: Duration::from_secs(60),
        invocation_budget: None,
    }
}

fn create_request() -> HandlerRequest {
    let mut request = HandlerRequest::new(Action::Create, desired_model());
    request.client_request_token = Some("token-1".into());
    request
}

fn created_request(mock: &MockFsx) -> dra_provisioner::api::CreateRequest {
    mock.calls()
        .into_iter()
        .find_map(|c| match c {
            Call::Create(req) => Some(req),
            _ => None,
        })
        .expect("create was called")
}

#[tokio::test(start_paused = true)]
async fn create_without_tags_or_s3_succeeds() {
    let mock = MockFsx::new();

    let event = create(&mock, &create_request(), &config()).await.unwrap();

    assert_eq!(event.status, OperationStatus::Success);
    let model = event.resource_model.expect("model returned");
    assert_eq!(model.association_id.as_deref(), Some(ASSOCIATION_ID));

    let sent = created_request(&mock);
    assert!(sent.tags.is_empty());
    assert_eq!(sent.s3, None);
    assert_eq!(sent.client_request_token.as_deref(), Some("token-1"));
    assert_eq!(mock.count(|c| matches!(c, Call::Create(_))), 1);
}

#[tokio::test(start_paused = true)]
async fn create_merges_resource_stack_and_system_tags() {
    let mock = MockFsx::new();
    let mut request = create_request();
    let mut desired = desired_model();
    desired.tags = Some(vec![Tag::new("Team", "storage")]);
    request.desired_resource_state = Some(desired);
    request.desired_resource_tags = Some(BTreeMap::from([
        ("Team".to_string(), "platform".to_string()),
        ("Env".to_string(), "prod".to_string()),
    ]));
    request.system_tags = Some(BTreeMap::from([(
        "aws:cloudformation:stack-name".to_string(),
        "my-stack".to_string(),
    )]));

    let event = create(&mock, &request, &config()).await.unwrap();
    assert_eq!(event.status, OperationStatus::Success);

    assert_eq!(
        created_request(&mock).tags,
        vec![
            Tag::new("Team", "storage"),
            Tag::new("Env", "prod"),
            Tag::new("aws:cloudformation:stack-name", "my-stack"),
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn create_polls_until_available() {
    let mock = MockFsx::new();
    mock.script_lifecycle(Lifecycle::Creating);
    mock.script_lifecycle(Lifecycle::Creating);

    let event = create(&mock, &create_request(), &config()).await.unwrap();

    assert_eq!(event.status, OperationStatus::Success);
    // Three stabilization polls plus the final read.
    assert_eq!(mock.describe_count(), 4);
}

#[tokio::test(start_paused = true)]
async fn create_fails_when_association_is_misconfigured() {
    let mock = MockFsx::new();
    mock.script_lifecycle(Lifecycle::Misconfigured);

    let event = create(&mock, &create_request(), &config()).await.unwrap();

    assert_eq!(event.status, OperationStatus::Failed);
    assert_eq!(event.error_code, Some(HandlerErrorCode::NotStabilized));
    assert!(event.message.unwrap().contains("MISCONFIGURED"));
}

#[tokio::test(start_paused = true)]
async fn create_times_out_when_association_never_settles() {
    let mock = MockFsx::new();
    for _ in 0..20 {
        mock.script_lifecycle(Lifecycle::Creating);
    }

    let event = create(&mock, &create_request(), &config()).await.unwrap();

    assert_eq!(event.status, OperationStatus::Failed);
    assert_eq!(event.error_code, Some(HandlerErrorCode::NotStabilized));
    // Polls at 0s, 5s, ... 60s.
    assert_eq!(mock.describe_count(), 13);
}

#[tokio::test(start_paused = true)]
async fn create_rejects_reserved_tag_keys_before_calling_the_service() {
    let mock = MockFsx::new();
    let mut request = create_request();
    let mut desired = desired_model();
    desired.tags = Some(vec![Tag::new("AWS:owner", "me")]);
    request.desired_resource_state = Some(desired);

    let event = create(&mock, &request, &config()).await.unwrap();

    assert_eq!(event.error_code, Some(HandlerErrorCode::InvalidRequest));
    assert!(event.message.unwrap().contains("tags.0.member.key"));
    assert!(mock.calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn create_translates_documented_service_errors() {
    let mock = MockFsx::new();
    mock.fail_create(ApiError::new("FileSystemNotFound", "no such file system"));

    let event = create(&mock, &create_request(), &config()).await.unwrap();

    assert_eq!(event.status, OperationStatus::Failed);
    assert_eq!(event.error_code, Some(HandlerErrorCode::NotFound));
}

#[tokio::test(start_paused = true)]
async fn create_propagates_unknown_service_errors() {
    let mock = MockFsx::new();
    mock.fail_create(ApiError::new("ThrottlingException", "slow down"));

    let err = create(&mock, &create_request(), &config()).await.unwrap_err();

    assert_eq!(err.code.as_deref(), Some("ThrottlingException"));
}

#[tokio::test(start_paused = true)]
async fn create_resumes_stabilization_without_creating_again() {
    let mock = MockFsx::new();
    for _ in 0..5 {
        mock.script_lifecycle(Lifecycle::Creating);
    }
    let config = StabilizeConfig {
        invocation_budget: Some(Duration::from_secs(10)),
        ..config()
    };

    let first = create(&mock, &create_request(), &config).await.unwrap();
    assert_eq!(first.status, OperationStatus::InProgress);
    assert!(!first.is_terminal());
    assert_eq!(first.callback_delay_seconds, 5);
    let ctx = first.callback_context.clone().expect("context handed back");
    assert!(ctx.stabilizing);
    assert_eq!(ctx.association_id.as_deref(), Some(ASSOCIATION_ID));

    let mut resumed = create_request();
    resumed.callback_context = Some(ctx);
    let second = create(&mock, &resumed, &config).await.unwrap();

    assert!(second.is_terminal());
    assert_eq!(second.status, OperationStatus::Success);
    assert_eq!(mock.count(|c| matches!(c, Call::Create(_))), 1);
}

#[test]
fn failure_event_serializes_for_the_host() {
    let event = ProgressEvent::failed(HandlerErrorCode::NotUpdatable, "nope");
    let json = serde_json::to_value(&event).unwrap();
    assert_eq!(json["status"], "FAILED");
    assert_eq!(json["errorCode"], "NotUpdatable");
    assert!(json.get("resourceModel").is_none());
}
