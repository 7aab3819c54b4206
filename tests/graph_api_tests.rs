use entra_audit_tools::audit::roles::DirectoryLookup;
use entra_audit_tools::config::{Credentials, GraphEndpoints};
use entra_audit_tools::graph_api::{authenticate, GraphClient, GraphError};
use serde_json::json;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn credentials() -> Credentials {
    Credentials::from_options(Some("tenant-1"), Some("client-1"), Some("s3cret")).unwrap()
}

fn endpoints(server: &MockServer) -> GraphEndpoints {
    GraphEndpoints::from_options(Some(&server.uri()), Some(&server.uri()), 5)
}

#[tokio::test]
async fn test_authenticate_uses_client_credentials_grant() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/tenant-1/oauth2/v2.0/token"))
        .and(body_string_contains("grant_type=client_credentials"))
        .and(body_string_contains("client_id=client-1"))
        .and(body_string_contains("client_secret=s3cret"))
        .and(body_string_contains(
            "scope=https%3A%2F%2Fgraph.microsoft.com%2F.default",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token_type": "Bearer",
            "expires_in": 3599,
            "access_token": "issued-token"
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/users/user-1"))
        .and(header("authorization", "Bearer issued-token"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"id": "user-1", "displayName": "Ada Lovelace"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = authenticate(&credentials(), &endpoints(&server))
        .await
        .unwrap();
    let user = client.get_user("user-1").await.unwrap();
    assert_eq!(user.display_name.as_deref(), Some("Ada Lovelace"));
    assert!(user.mail.is_none());
}

#[tokio::test]
async fn test_authenticate_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/tenant-1/oauth2/v2.0/token"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": "invalid_client",
            "error_description": "AADSTS7000215: Invalid client secret provided."
        })))
        .mount(&server)
        .await;

    let err = authenticate(&credentials(), &endpoints(&server))
        .await
        .unwrap_err();
    assert!(matches!(err, GraphError::Authentication { .. }));
    assert!(err.to_string().contains("invalid_client"));
}

#[tokio::test]
async fn test_lookup_miss_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/servicePrincipals/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let client = GraphClient::new(&server.uri(), "t".to_string(), 5).unwrap();
    let err = client.get_service_principal("missing").await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_unauthorized_is_distinct_from_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/roleManagement/directory/roleDefinitions/role-1"))
        .respond_with(ResponseTemplate::new(401).set_body_string("InvalidAuthenticationToken"))
        .mount(&server)
        .await;

    let client = GraphClient::new(&server.uri(), "expired".to_string(), 5).unwrap();
    let err = client.get_role_definition("role-1").await.unwrap_err();
    assert!(!err.is_not_found());
    assert!(matches!(err, GraphError::Unauthorized { .. }));
}

#[tokio::test]
async fn test_malformed_body_is_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/auditLogs/directoryAudits"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>proxy error</html>"))
        .mount(&server)
        .await;

    let client = GraphClient::new(&server.uri(), "t".to_string(), 5).unwrap();
    let err = client.list_directory_audits("x").await.unwrap_err();
    assert!(matches!(err, GraphError::Decode { .. }));
}

#[tokio::test]
async fn test_unreachable_host_is_transport_error() {
    let client = GraphClient::new("http://127.0.0.1:9", "t".to_string(), 2).unwrap();
    let err = client.list_role_assignments().await.unwrap_err();
    assert!(matches!(err, GraphError::Transport { .. }));
}
