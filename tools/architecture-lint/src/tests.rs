//! Rule-level checks over in-memory sources.

use rstest::rstest;

use super::*;

fn findings(file: &str, contents: &str) -> Vec<Finding> {
    match lint_sources(&[Source::new(file, contents)]) {
        Ok(()) => Vec::new(),
        Err(LintError::Findings(findings)) => findings,
        Err(err) => panic!("lint failed: {err}"),
    }
}

fn rules(file: &str, contents: &str) -> Vec<Rule> {
    findings(file, contents)
        .into_iter()
        .map(|finding| finding.rule)
        .collect()
}

#[rstest]
#[case::domain_to_adapter("domain/tap_manager.rs", "use crate::outbound::persistence::DbPool;")]
#[case::domain_to_web("domain/catalogue_service.rs", "use actix_web::web;")]
#[case::domain_to_hashing("domain/account_service.rs", "fn f() { argon2::Argon2::default(); }")]
#[case::inbound_to_outbound("inbound/http/pubs.rs", "use taplist::outbound::images::LocalImageStore;")]
#[case::inbound_to_storage("inbound/http/beers.rs", "use diesel::prelude::*;")]
#[case::outbound_to_inbound("outbound/images.rs", "use super::super::inbound::http::ApiResult;")]
#[case::outbound_to_web("outbound/persistence/pool.rs", "use actix_web::HttpResponse;")]
fn layer_imports_are_enforced(#[case] file: &str, #[case] contents: &str) {
    assert_eq!(rules(file, contents), vec![Rule::LayerImport]);
}

#[rstest]
#[case("inbound/http/pubs.rs", "use crate::domain::ports::TapCommand; use actix_web::web;")]
#[case("outbound/persistence/pool.rs", "use crate::domain::ports::EntityStore; use diesel::Connection;")]
#[case("domain/relationship_service.rs", "use super::ports::{EntityStore, TapCommand};")]
#[case("server/mod.rs", "use taplist::outbound::images::LocalImageStore; fn f() { x.push_relation(a); }")]
fn allowed_dependencies_pass(#[case] file: &str, #[case] contents: &str) {
    assert!(findings(file, contents).is_empty());
}

#[rstest]
#[case("inbound/http/state.rs", "use crate::domain::ports::EntityStore;")]
#[case("inbound/http/users.rs", "fn f(h: Arc<dyn crate::domain::ports::PasswordHasher>) {}")]
#[case("inbound/http/beers.rs", "struct S { images: InMemoryEntityStore<Beer> }")]
fn http_adapters_cannot_name_driven_ports(#[case] file: &str, #[case] contents: &str) {
    assert_eq!(rules(file, contents), vec![Rule::DrivenPort]);
}

#[rstest]
#[case::method("domain/catalogue_service.rs", "fn f(s: &S) { s.pubs.push_relation(id, rel); }")]
#[case::qualified("domain/account_service.rs", "fn f() { EntityStore::pull_relation(&*users, id, rel); }")]
#[case::handler("inbound/http/pubs.rs", "fn f() { state.pubs.push_relation(id, rel); }")]
fn relation_writes_outside_the_managers_are_flagged(
    #[case] file: &str,
    #[case] contents: &str,
) {
    assert_eq!(rules(file, contents), vec![Rule::RelationWrite]);
}

#[rstest]
#[case("domain/tap_manager.rs")]
#[case("domain/history_manager.rs")]
#[case("domain/beer_relationships.rs")]
#[case("domain/ports/in_memory_store.rs")]
#[case("outbound/persistence/diesel_user_store.rs")]
#[case("domain/relationship_service_tests.rs")]
fn managers_and_stores_may_write_relations(#[case] file: &str) {
    let contents = "fn f(s: &S) { s.store.push_relation(id, rel); s.store.pull_relation(id, rel); }";
    assert!(findings(file, contents).is_empty());
}

#[test]
fn cfg_test_modules_are_not_scanned() {
    let contents = r#"
        fn real() {}
        #[cfg(test)]
        mod tests {
            use crate::outbound::persistence::DbPool;
            use crate::domain::ports::InMemoryEntityStore;
            fn seed(s: &S) { s.push_relation(a, b); }
        }
    "#;
    assert!(findings("inbound/http/pubs.rs", contents).is_empty());
}

#[test]
fn findings_name_file_and_rule() {
    let found = findings("domain/catalogue_service.rs", "use cap_std::fs::Dir;");
    let [finding] = found.as_slice() else {
        panic!("expected one finding, got {found:?}");
    };
    assert_eq!(
        finding.to_string(),
        "domain/catalogue_service.rs: [layer-import] domain must not depend on `cap_std`"
    );
}

#[test]
fn unparsable_sources_are_errors() {
    let Err(err) = lint_sources(&[Source::new("domain/beer.rs", "fn {")]) else {
        panic!("broken source accepted");
    };
    assert!(matches!(err, LintError::Parse { .. }));
}
