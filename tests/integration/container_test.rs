//! Integration tests for container management.

use loopback::prelude::*;

use crate::helpers::TestServer;

#[tokio::test]
async fn test_container_lifecycle() {
    let server = TestServer::start().await;
    let containers = server.registry.containers();

    containers.create_container("avatars").await.unwrap();
    containers.create_container("uploads").await.unwrap();

    let err = containers.create_container("uploads").await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Conflict);

    let names: Vec<String> = containers
        .all_containers()
        .await
        .unwrap()
        .iter()
        .map(|c| c.name().to_string())
        .collect();
    assert_eq!(names, vec!["avatars", "uploads"]);

    let uploads = containers.get_container("uploads").await.unwrap();
    containers.destroy_container(&uploads).await.unwrap();
    assert!(containers.get_container("uploads").await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn test_registry_reuses_file_repository() {
    let server = TestServer::start().await;
    let uploads = Container::new("uploads");
    let a = server.registry.files(&uploads);
    let b = server.registry.files(&uploads);
    assert!(a.ptr_eq(&b));
    assert!(server.base_url.ends_with("/api"));
}

#[tokio::test]
async fn test_unreachable_server_is_transport_error() {
    let config = ClientConfig {
        rest: loopback::RestConfig::with_base_url("http://127.0.0.1:9/api"),
        ..ClientConfig::default()
    };
    let registry = loopback::connect(&config).unwrap();
    let err = registry.containers().all_containers().await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Transport);
}
