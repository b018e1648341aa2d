//! Controller resolver integration tests.

use std::sync::Arc;

use restmap::prelude::*;
use restmap_core::fixture::StaticDiscovery;

fn resolver() -> (Arc<StaticDiscovery>, ControllerRestMapper) {
    let discovery = Arc::new(StaticDiscovery::new().with_resource(
        "apps",
        "v1",
        "Deployment",
        "deployments",
        Scope::Namespaced,
    ));
    let cache = Arc::new(DiscoveryCache::new(Arc::clone(&discovery)));
    (discovery, ControllerRestMapper::new(cache))
}

fn assert_deployments(mapping: &RestMapping) {
    assert_eq!(mapping.gvk(), &GroupVersionKind::new("apps", "v1", "Deployment"));
    assert_eq!(
        mapping.resource(),
        &GroupVersionResource::new("apps", "v1", "deployments")
    );
    assert_eq!(mapping.scope(), Scope::Namespaced);
}

#[tokio::test]
async fn deployment_scenario() {
    let (_, mapper) = resolver();
    let deployment = GroupKind::new("apps", "Deployment");

    let mapping = mapper.resolve(&deployment, &["v1"]).await.unwrap();
    assert_deployments(&mapping);

    let mapping = mapper.resolve(&deployment, &["v1beta1", "v1"]).await.unwrap();
    assert_deployments(&mapping);

    let err = mapper
        .resolve(&GroupKind::new("apps", "Widget"), &["v1"])
        .await
        .unwrap_err();
    match err {
        MapperError::NoKindMatch {
            group_kind,
            searched_versions,
        } => {
            assert_eq!(group_kind.kind(), "Widget");
            assert_eq!(searched_versions, vec!["v1"]);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn resolve_prefers_first_served_version() {
    let (_, mapper) = resolver();

    let mapping = mapper
        .resolve(&GroupKind::new("apps", "Deployment"), &["v2", "v1"])
        .await
        .unwrap();
    assert_eq!(mapping.gvk().version(), "v1");

    let err = mapper
        .resolve(&GroupKind::new("apps", "Deployment"), &["v3", "v2"])
        .await
        .unwrap_err();
    assert!(err.is_no_match());
    assert!(err.to_string().contains("v3"));
}

#[tokio::test]
async fn resolve_through_trait_object() {
    let (discovery, mapper) = resolver();
    let mapper: Arc<dyn RestMapper> = Arc::new(mapper);

    assert_eq!(
        mapper.capabilities().iter().collect::<Vec<_>>(),
        vec![Operation::RestMapping]
    );

    let versions = vec!["v1".to_string()];
    let mapping = mapper
        .rest_mapping(&GroupKind::new("apps", "Deployment"), &versions)
        .await
        .unwrap();
    assert_deployments(&mapping);
    assert_eq!(discovery.fetch_count(), 1);
}

#[tokio::test]
async fn unsupported_operations_report_their_name() {
    let (_, mapper) = resolver();
    let gvr = GroupVersionResource::new("apps", "v1", "deployments");

    let err = mapper.kind_for(&gvr).await.unwrap_err();
    assert!(err.is_unsupported());
    assert!(err.to_string().contains("KindFor"));

    let err = mapper.resource_singularizer("deployments").unwrap_err();
    assert!(matches!(
        err,
        MapperError::Unsupported {
            operation: Operation::ResourceSingularizer
        }
    ));
}

#[tokio::test]
async fn resolvers_share_cached_discovery() {
    let discovery = Arc::new(
        StaticDiscovery::new()
            .with_resource("batch", "v1", "Job", "jobs", Scope::Namespaced)
            .with_resource("batch", "v1", "CronJob", "cronjobs", Scope::Namespaced),
    );
    let cache = Arc::new(DiscoveryCache::new(Arc::clone(&discovery)));
    let jobs = ControllerRestMapper::new(Arc::clone(&cache));
    let cronjobs = ControllerRestMapper::new(Arc::clone(&cache));

    jobs.resolve(&GroupKind::new("batch", "Job"), &["v1"])
        .await
        .unwrap();
    cronjobs
        .resolve(&GroupKind::new("batch", "CronJob"), &["v1"])
        .await
        .unwrap();

    assert_eq!(discovery.fetch_count(), 1);
    assert_eq!(cache.stats().hits(), 1);
}

#[tokio::test]
async fn plan_manifest_through_resolver() {
    let (_, mapper) = resolver();
    let manifest = "apiVersion: apps/v1\nkind: Deployment\nmetadata:\n  name: web\n";

    let planned = plan(&mapper, &ApplierOptions::new(manifest).namespace("prod"))
        .await
        .unwrap();
    assert_eq!(planned.len(), 1);
    assert_deployments(&planned[0].mapping);
    assert_eq!(planned[0].object.namespace(), Some("prod"));
}
