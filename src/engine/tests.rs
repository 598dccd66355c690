use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Duration;

use serde_json::json;

use super::{EnabledChecks, EngineBuilder, MX_MESSAGE, RECEIVE_MESSAGE, VerificationEngine};
use crate::disposable::StaticDenylist;
use crate::disposable::tests::{CountingStore, StubRemote};
use crate::dns::tests::StubResolver;
use crate::dns::{LookupFailure, MxRecord};
use crate::smtp_verify::tests::ScriptedConnector;

const KNOWN_IP: Ipv4Addr = Ipv4Addr::new(167, 172, 13, 163);

struct Harness {
    resolver: Arc<StubResolver>,
    store: Arc<CountingStore>,
    remote: Arc<StubRemote>,
    engine: VerificationEngine,
}

fn harness(resolver: StubResolver, store: CountingStore, remote: StubRemote) -> Harness {
    harness_with(resolver, store, remote, EnabledChecks::default(), |b| b)
}

fn harness_with(
    resolver: StubResolver,
    store: CountingStore,
    remote: StubRemote,
    checks: EnabledChecks,
    extra: impl FnOnce(EngineBuilder) -> EngineBuilder,
) -> Harness {
    let resolver = Arc::new(resolver);
    let store = Arc::new(store);
    let remote = Arc::new(remote);
    let builder = EngineBuilder::new()
        .checks(checks)
        .resolver(resolver.clone())
        .dns_timeout(Duration::from_millis(100))
        .store(store.clone())
        .remote(remote.clone())
        .denylist(Arc::new(StaticDenylist::from_iter(["yopmail.com"])))
        .known_ips([IpAddr::V4(KNOWN_IP)]);
    let engine = extra(builder).build().expect("engine builds with a stub resolver");
    Harness {
        resolver,
        store,
        remote,
        engine,
    }
}

fn one_mx(domain: &str) -> StubResolver {
    StubResolver::new().with_mx(domain, Ok(vec![MxRecord::new(10, format!("mx.{domain}"))]))
}

#[tokio::test]
async fn scenario_invalid_syntax_short_circuits() {
    let h = harness(StubResolver::new(), CountingStore::new(), StubRemote::new());

    let result = h.engine.verify("not-an-email").await;
    assert_eq!(
        serde_json::to_value(&result).unwrap(),
        json!({
            "is_disposable": false,
            "has_mx_records": false,
            "ip_address": null,
            "errors": {
                "syntax": "Invalid email syntax",
                "disposable_email": null,
                "mx_records": null
            }
        })
    );
    assert_eq!(h.resolver.mx_queries.load(Ordering::SeqCst), 0);
    assert_eq!(h.store.finds(), 0);
    assert_eq!(h.remote.calls(), 0);
}

#[tokio::test]
async fn scenario_store_hit_with_mx() {
    let h = harness(
        one_mx("mailinator.com"),
        CountingStore::with_domains(["mailinator.com"]),
        StubRemote::new(),
    );

    let result = h.engine.verify("user@mailinator.com").await;
    assert_eq!(
        serde_json::to_value(&result).unwrap(),
        json!({
            "is_disposable": true,
            "has_mx_records": true,
            "ip_address": null,
            "errors": {
                "syntax": null,
                "disposable_email": "Email is from a disposable email provider",
                "mx_records": null
            }
        })
    );
    assert_eq!(h.remote.calls(), 0);
}

#[tokio::test]
async fn scenario_remote_negative_without_mx() {
    let h = harness(
        StubResolver::new().with_mx("example.com", Ok(Vec::new())),
        CountingStore::new(),
        StubRemote::new().with_verdict("example.com", false),
    );

    let result = h.engine.verify("user@example.com").await;
    assert_eq!(
        serde_json::to_value(&result).unwrap(),
        json!({
            "is_disposable": false,
            "has_mx_records": false,
            "ip_address": null,
            "errors": {
                "syntax": null,
                "disposable_email": null,
                "mx_records": "Domain does not have valid MX records"
            }
        })
    );
    assert_eq!(h.remote.calls(), 1);
}

#[tokio::test]
async fn malformed_inputs_never_reach_the_network() {
    let h = harness(StubResolver::new(), CountingStore::new(), StubRemote::new());

    for input in ["", "   ", "plain", "user@", "@example.com", "a@b@c.com", "user@@x.io"] {
        let result = h.engine.verify(input).await;
        assert!(result.errors.syntax.is_some(), "{input:?} should fail syntax");
        assert!(!result.is_disposable && !result.has_mx_records);
        assert!(result.ip_address.is_none());
        assert!(result.errors.disposable_email.is_none());
        assert!(result.errors.mx_records.is_none());
    }
    assert_eq!(h.resolver.mx_queries.load(Ordering::SeqCst), 0);
    assert_eq!(h.store.finds(), 0);
}

#[tokio::test]
async fn second_verification_hits_cache() {
    let h = harness(
        one_mx("fresh-temp.io"),
        CountingStore::new(),
        StubRemote::new().with_verdict("fresh-temp.io", true),
    );

    assert!(h.engine.verify("a@fresh-temp.io").await.is_disposable);
    assert!(h.engine.verify("b@fresh-temp.io").await.is_disposable);
    assert_eq!(h.store.inserts(), 1);
    assert_eq!(h.remote.calls(), 1);
}

#[tokio::test]
async fn mx_present_means_no_mx_error() {
    let h = harness(
        StubResolver::new().with_mx(
            "example.org",
            Ok(vec![
                MxRecord::new(20, "mx2.example.org"),
                MxRecord::new(10, "mx1.example.org"),
            ]),
        ),
        CountingStore::new(),
        StubRemote::new(),
    );

    let result = h.engine.verify("someone@Example.ORG").await;
    assert!(result.has_mx_records);
    assert!(result.errors.mx_records.is_none());
    assert!(result.passed());
}

#[tokio::test]
async fn dns_failures_degrade_to_no_mx() {
    let transient = harness(
        StubResolver::new().with_mx(
            "example.com",
            Err(LookupFailure::Transient("SERVFAIL".into())),
        ),
        CountingStore::new(),
        StubRemote::new(),
    );
    let result = transient.engine.verify("user@example.com").await;
    assert!(!result.has_mx_records);
    assert_eq!(result.errors.mx_records.as_deref(), Some(MX_MESSAGE));

    let slow = harness(
        one_mx("example.com").with_delay(Duration::from_secs(5)),
        CountingStore::new(),
        StubRemote::new(),
    );
    let started = std::time::Instant::now();
    let result = slow.engine.verify("user@example.com").await;
    assert!(started.elapsed() < Duration::from_secs(2));
    assert!(!result.has_mx_records);
    assert_eq!(result.errors.mx_records.as_deref(), Some(MX_MESSAGE));
    assert!(result.ip_address.is_none());
}

#[tokio::test]
async fn concurrent_verifications_store_one_record() {
    let h = harness(
        one_mx("racy-temp.net"),
        CountingStore::new(),
        StubRemote::new()
            .with_verdict("racy-temp.net", true)
            .with_delay(Duration::from_millis(20)),
    );

    let (a, b) = tokio::join!(
        h.engine.verify("a@racy-temp.net"),
        h.engine.verify("b@racy-temp.net"),
    );
    assert!(a.is_disposable && b.is_disposable);
    assert_eq!(h.store.stored(), 1);
}

#[tokio::test]
async fn known_mail_host_ip_marks_disposable() {
    let h = harness(
        one_mx("new-burner.com").with_a("mail.new-burner.com", Ok(vec![KNOWN_IP])),
        CountingStore::new(),
        StubRemote::new(),
    );

    let result = h.engine.verify("x@new-burner.com").await;
    assert!(result.is_disposable);
    assert_eq!(result.ip_address, Some(KNOWN_IP));
}

#[tokio::test]
async fn builder_seeds_known_disposable_ip() {
    let engine = EngineBuilder::new()
        .resolver(Arc::new(
            one_mx("new-burner.com").with_a("mail.new-burner.com", Ok(vec![KNOWN_IP])),
        ))
        .dns_timeout(Duration::from_millis(100))
        .store(Arc::new(CountingStore::new()))
        .remote(Arc::new(StubRemote::new()))
        .build()
        .expect("engine builds with a stub resolver");

    let result = engine.verify("x@new-burner.com").await;
    assert!(result.is_disposable);
}

#[tokio::test]
async fn ip_used_for_gating_even_when_not_reported() {
    let checks = EnabledChecks {
        resolve_ip_address: false,
        ..EnabledChecks::default()
    };
    let h = harness_with(
        one_mx("new-burner.com").with_a("new-burner.com", Ok(vec![KNOWN_IP])),
        CountingStore::new(),
        StubRemote::new(),
        checks,
        |b| b,
    );

    let result = h.engine.verify("x@new-burner.com").await;
    assert!(result.is_disposable);
    assert!(result.ip_address.is_none());
}

#[tokio::test]
async fn disabled_layers_are_skipped() {
    let checks = EnabledChecks {
        use_static_list: false,
        use_remote_api: false,
        use_ip_gating: false,
        ..EnabledChecks::default()
    };
    let h = harness_with(
        one_mx("yopmail.com").with_a("mail.yopmail.com", Ok(vec![KNOWN_IP])),
        CountingStore::new(),
        StubRemote::new().with_verdict("yopmail.com", true),
        checks,
        |b| b,
    );

    let result = h.engine.verify("x@yopmail.com").await;
    assert!(!result.is_disposable);
    assert_eq!(result.ip_address, Some(KNOWN_IP));
    assert_eq!(h.remote.calls(), 0);
}

#[tokio::test]
async fn reachability_probe_reports_when_enabled() {
    let checks = EnabledChecks {
        use_reachability_probe: true,
        ..EnabledChecks::default()
    };
    let connector = Arc::new(ScriptedConnector::friendly());
    let h = harness_with(
        one_mx("example.com"),
        CountingStore::new(),
        StubRemote::new(),
        checks,
        |b| b.connector(connector.clone()),
    );

    let result = h.engine.verify("user@example.com").await;
    assert_eq!(result.can_receive_email, Some(true));
    assert_eq!(result.errors.receive_email, Some(None));
    assert_eq!(connector.hosts.lock().as_slice(), ["mx.example.com"]);
}

#[tokio::test]
async fn reachability_reuses_the_mx_answer() {
    let checks = EnabledChecks {
        use_reachability_probe: true,
        ..EnabledChecks::default()
    };
    let connector = Arc::new(ScriptedConnector::friendly());
    let h = harness_with(
        StubResolver::new().with_mx(
            "example.com",
            Ok(vec![
                MxRecord::new(20, "backup.example.com"),
                MxRecord::new(5, "primary.example.com"),
            ]),
        ),
        CountingStore::new(),
        StubRemote::new(),
        checks,
        |b| b.connector(connector.clone()),
    );

    let result = h.engine.verify("user@example.com").await;
    assert_eq!(result.can_receive_email, Some(true));
    assert_eq!(h.resolver.mx_queries.load(Ordering::SeqCst), 1);
    assert_eq!(connector.hosts.lock().as_slice(), ["primary.example.com"]);
}

#[tokio::test]
async fn unreachable_server_sets_receive_error() {
    let checks = EnabledChecks {
        use_reachability_probe: true,
        ..EnabledChecks::default()
    };
    let h = harness_with(
        one_mx("example.com"),
        CountingStore::new(),
        StubRemote::new(),
        checks,
        |b| b.connector(Arc::new(ScriptedConnector::refusing())),
    );

    let result = h.engine.verify("user@example.com").await;
    assert_eq!(result.can_receive_email, Some(false));
    assert_eq!(
        result.errors.receive_email,
        Some(Some(RECEIVE_MESSAGE.to_string()))
    );
    assert!(result.has_mx_records);
    assert!(!result.passed());
}

#[tokio::test]
async fn probe_is_off_by_default() {
    let connector = Arc::new(ScriptedConnector::friendly());
    let h = harness_with(
        one_mx("example.com"),
        CountingStore::new(),
        StubRemote::new(),
        EnabledChecks::default(),
        |b| b.connector(connector.clone()),
    );

    let result = h.engine.verify("user@example.com").await;
    assert!(result.can_receive_email.is_none());
    assert_eq!(connector.connects.load(Ordering::SeqCst), 0);
}
