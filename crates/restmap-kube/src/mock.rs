//! Mock API server helpers for tests.
//!
//! A [`MockServer`] stands in for the Kubernetes API over plain HTTP, and
//! [`client_for`] points a real `kube` client at it.

use kube::{Client, Config};
use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// A client for `server` with `default` as its namespace.
pub(crate) fn client_for(server: &MockServer) -> Client {
    let config = Config::new(server.uri().parse().expect("mock server uri"));
    Client::try_from(config).expect("mock client")
}

/// A `metav1.Status` failure body, as the API server sends with errors.
pub(crate) fn status(code: u16, reason: &str) -> ResponseTemplate {
    ResponseTemplate::new(code).set_body_json(json!({
        "kind": "Status",
        "apiVersion": "v1",
        "metadata": {},
        "status": "Failure",
        "message": format!("mock {reason}"),
        "reason": reason,
        "code": code,
    }))
}

/// An `APIResourceList` body; each resource is `(name, kind, namespaced)`.
pub(crate) fn resource_list(group_version: &str, resources: &[(&str, &str, bool)]) -> Value {
    let resources: Vec<Value> = resources
        .iter()
        .map(|(name, kind, namespaced)| {
            json!({
                "name": name,
                "singularName": "",
                "namespaced": namespaced,
                "kind": kind,
                "verbs": ["get", "list", "patch"],
            })
        })
        .collect();
    json!({
        "kind": "APIResourceList",
        "apiVersion": "v1",
        "groupVersion": group_version,
        "resources": resources,
    })
}

/// Serve `body` for discovery of `api_path` (`/api/v1`, `/apis/apps/v1`).
pub(crate) async fn serve_discovery(server: &MockServer, api_path: &str, body: Value) {
    Mock::given(method("GET"))
        .and(path(api_path))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}
