//! End-to-end lifecycle tests for azurerm_healthcare_service
//!
//! Drives the provider's handler against a mocked Resource Manager and
//! checks the request bodies sent and the state written back.

use std::time::Duration;

use cerulean_client::{ClientConfig, PollConfig};
use cerulean_core::provider::{Provider, ProviderError, ResourceHandler, import_passthrough};
use cerulean_core::resource::{ResourceData, ResourceState, Value};
use cerulean_provider_azurerm::{AzureRmProvider, ProviderConfig};
use serde_json::json;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SUBSCRIPTION: &str = "00000000-0000-0000-0000-000000000000";
const SERVICE_PATH: &str = "/subscriptions/00000000-0000-0000-0000-000000000000/resourceGroups/rg1/providers/Microsoft.HealthcareApis/services/fhir1";
const OBJECT_ID: &str = "11111111-1111-1111-1111-111111111111";

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn provider(server: &MockServer, config: ProviderConfig) -> AzureRmProvider {
    let client = ClientConfig::new(SUBSCRIPTION, "test-token")
        .unwrap()
        .with_endpoint(&server.uri())
        .unwrap()
        .with_retry_delay(Duration::from_millis(10))
        .with_poll(PollConfig {
            initial_interval: Duration::from_millis(10),
            max_interval: Duration::from_millis(50),
            multiplier: 2,
            timeout: Duration::from_secs(10),
        });
    AzureRmProvider::new(client, config).unwrap()
}

fn handler(provider: &AzureRmProvider) -> &dyn ResourceHandler {
    provider.resource("azurerm_healthcare_service").unwrap()
}

fn desired() -> ResourceState {
    ResourceState::new(cerulean_provider_azurerm::healthcare_service::healthcare_service_schema())
        .with_attribute("name", "fhir1")
        .with_attribute("resource_group_name", "rg1")
        .with_attribute("location", "West US 2")
        .with_attribute("access_policy_object_ids", Value::List(vec![Value::from(OBJECT_ID)]))
}

fn remote_service() -> serde_json::Value {
    json!({
        "id": SERVICE_PATH,
        "name": "fhir1",
        "type": "Microsoft.HealthcareApis/services",
        "location": "westus2",
        "kind": "fhir",
        "properties": {
            "provisioningState": "Succeeded",
            "accessPolicies": [{"objectId": OBJECT_ID}],
            "cosmosDbConfiguration": {"offerThroughput": 1000},
            "authenticationConfiguration": {},
            "corsConfiguration": {}
        }
    })
}

#[tokio::test]
async fn test_full_lifecycle() {
    init_logger();
    let server = MockServer::start().await;
    let provider = provider(&server, ProviderConfig::default());
    let handler = handler(&provider);
    let cancel = CancellationToken::new();
    let operation_url = format!("{}/operations/create1", server.uri());

    // Create: PUT answered with an async operation, then polled
    Mock::given(method("PUT"))
        .and(path(SERVICE_PATH))
        .and(query_param("api-version", "2019-09-16"))
        .and(body_json(json!({
            "location": "westus2",
            "kind": "fhir",
            "properties": {
                "accessPolicies": [{"objectId": OBJECT_ID}],
                "cosmosDbConfiguration": {"offerThroughput": 1000},
                "authenticationConfiguration": {},
                "corsConfiguration": {}
            }
        })))
        .respond_with(
            ResponseTemplate::new(201)
                .insert_header("Azure-AsyncOperation", operation_url.as_str())
                .set_body_json(remote_service()),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/operations/create1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "Succeeded"})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(SERVICE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(remote_service()))
        .mount(&server)
        .await;

    let mut data = desired();
    handler.create(&mut data, &cancel).await.unwrap();
    assert_eq!(data.id(), SERVICE_PATH);
    assert_eq!(data.get_string("location").as_deref(), Some("westus2"));
    assert_eq!(data.get_string("kind").as_deref(), Some("fhir"));
    assert_eq!(
        data.get_list("access_policy_object_ids"),
        vec![Value::from(OBJECT_ID)]
    );
    assert!(!data.attributes().contains_key("cors_configuration"));
    assert!(!data.attributes().contains_key("authentication_configuration"));

    // Delete: 202 with a Location header that completes on first poll
    server.reset().await;
    let location_url = format!("{}/operationResults/delete1", server.uri());
    Mock::given(method("DELETE"))
        .and(path(SERVICE_PATH))
        .respond_with(
            ResponseTemplate::new(202)
                .insert_header("Location", location_url.as_str())
                .insert_header("Retry-After", "0"),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/operationResults/delete1"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    handler.delete(&mut data, &cancel).await.unwrap();
    assert_eq!(data.id(), SERVICE_PATH);

    // Read after deletion clears the identifier
    server.reset().await;
    Mock::given(method("GET"))
        .and(path(SERVICE_PATH))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": {"code": "ResourceNotFound", "message": "gone"}
        })))
        .mount(&server)
        .await;

    handler.read(&mut data, &cancel).await.unwrap();
    assert_eq!(data.id(), "");
}

#[tokio::test]
async fn test_create_with_import_protection_fails_on_existing() {
    init_logger();
    let server = MockServer::start().await;
    let provider = provider(
        &server,
        ProviderConfig::default().with_import_protection(true),
    );

    Mock::given(method("GET"))
        .and(path(SERVICE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(remote_service()))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut data = desired();
    let err = handler(&provider)
        .create(&mut data, &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, ProviderError::AlreadyExists { .. }));
    assert!(err.to_string().contains(SERVICE_PATH));
    assert!(err.to_string().contains("azurerm_healthcare_service"));
    assert_eq!(data.id(), "");
}

#[tokio::test]
async fn test_failed_provisioning_surfaces_context() {
    init_logger();
    let server = MockServer::start().await;
    let provider = provider(&server, ProviderConfig::default());
    let operation_url = format!("{}/operations/failed", server.uri());

    Mock::given(method("PUT"))
        .and(path(SERVICE_PATH))
        .respond_with(
            ResponseTemplate::new(201)
                .insert_header("Azure-AsyncOperation", operation_url.as_str()),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/operations/failed"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "Failed",
            "error": {"code": "InvalidCosmosDbConfiguration", "message": "bad throughput"}
        })))
        .mount(&server)
        .await;

    let mut data = desired();
    let err = handler(&provider)
        .create(&mut data, &CancellationToken::new())
        .await
        .unwrap_err();

    let message = err.to_string();
    assert!(message.starts_with(
        "Error Creating/Updating Healthcare Service \"fhir1\" (Resource Group \"rg1\")"
    ));
    assert!(message.contains("InvalidCosmosDbConfiguration: bad throughput"));
    assert_eq!(data.id(), "");
}

#[tokio::test]
async fn test_import_passthrough() {
    init_logger();
    let server = MockServer::start().await;
    let provider = provider(&server, ProviderConfig::default());

    Mock::given(method("GET"))
        .and(path(SERVICE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(remote_service()))
        .mount(&server)
        .await;

    let mut data = ResourceState::new(handler(&provider).schema());
    import_passthrough(
        handler(&provider),
        SERVICE_PATH,
        &mut data,
        &CancellationToken::new(),
    )
    .await
    .unwrap();

    assert_eq!(data.id(), SERVICE_PATH);
    assert_eq!(data.get_string("name").as_deref(), Some("fhir1"));
    assert_eq!(data.get_int("cosmosdb_throughput"), Some(1000));
}
