mod common;

use common::{ASSOCIATION_ID, MockFsx, available, found};
use dra_core::{Lifecycle, ResourceModel};
use dra_provisioner::api::{ApiError, DescribeResponse};
use dra_provisioner::handlers::read::read;
use dra_provisioner::{Action, HandlerErrorCode, HandlerRequest, OperationStatus, StabilizeConfig, dispatch};

fn read_request(id: Option<&str>) -> HandlerRequest {
    let model = ResourceModel {
        association_id: id.map(str::to_owned),
        ..ResourceModel::default()
    };
    HandlerRequest::new(Action::Read, model)
}

#[tokio::test]
async fn read_projects_the_remote_association() {
    let mock = MockFsx::with_current(available());

    let event = read(&mock, &read_request(Some(ASSOCIATION_ID))).await.unwrap();

    assert_eq!(event.status, OperationStatus::Success);
    assert_eq!(event.resource_model, Some(available().to_model()));
}

#[tokio::test]
async fn read_without_identifier_fails_without_remote_calls() {
    let mock = MockFsx::new();

    let event = read(&mock, &read_request(None)).await.unwrap();

    assert_eq!(event.error_code, Some(HandlerErrorCode::NotFound));
    assert_eq!(
        event.message.as_deref(),
        Some("Parameter 'AssociationId' must be provided.")
    );
    assert!(mock.calls().is_empty());
}

#[tokio::test]
async fn read_of_missing_association_fails_not_found() {
    let mock = MockFsx::new();

    let event = read(&mock, &read_request(Some(ASSOCIATION_ID))).await.unwrap();

    assert_eq!(event.error_code, Some(HandlerErrorCode::NotFound));
    assert_eq!(
        event.message.as_deref(),
        Some("Data repository association does not exist for: dra-0123456789abcdef0.")
    );
}

#[tokio::test]
async fn ambiguous_or_unrecognized_describe_is_not_found() {
    let mock = MockFsx::new();
    mock.script_describe(Ok(DescribeResponse {
        associations: vec![available(), available()],
        next_token: None,
    }));
    let mut odd = available();
    odd.lifecycle = Lifecycle::Unrecognized("SOMETHING_NEW".into());
    mock.script_describe(Ok(found(odd)));

    for _ in 0..2 {
        let event = read(&mock, &read_request(Some(ASSOCIATION_ID))).await.unwrap();
        assert_eq!(event.error_code, Some(HandlerErrorCode::NotFound));
    }
}

#[tokio::test]
async fn read_translates_service_not_found() {
    let mock = MockFsx::new();
    mock.script_describe(Err(ApiError::new(
        "DataRepositoryAssociationNotFound",
        "association not found",
    )));

    let event = read(&mock, &read_request(Some(ASSOCIATION_ID))).await.unwrap();

    assert_eq!(event.status, OperationStatus::Failed);
    assert_eq!(event.error_code, Some(HandlerErrorCode::NotFound));
}

#[tokio::test]
async fn dispatch_routes_by_action() {
    let mock = MockFsx::with_current(available());

    let event = dispatch(
        &mock,
        &read_request(Some(ASSOCIATION_ID)),
        &StabilizeConfig::default(),
    )
    .await
    .unwrap();

    assert_eq!(event.status, OperationStatus::Success);
    assert_eq!(mock.describe_count(), 1);
}

#[test]
fn request_deserializes_from_host_json() {
    let request: HandlerRequest = serde_json::from_str(
        r#"{
            "action": "READ",
            "desiredResourceState": { "AssociationId": "dra-0123456789abcdef0" },
            "callbackContext": { "cursor": 2, "stabilizing": true }
        }"#,
    )
    .unwrap();

    assert_eq!(request.action, Action::Read);
    assert_eq!(request.desired().identifier(), Some(ASSOCIATION_ID));
    let ctx = request.context();
    assert_eq!(ctx.cursor, 2);
    assert!(ctx.stabilizing);
    assert_eq!(ctx.waited_ms, 0);
}
