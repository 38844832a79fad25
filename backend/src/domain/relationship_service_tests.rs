//! Tests for relationship orchestration.

use std::sync::atomic::{AtomicBool, Ordering};

use super::*;
use crate::domain::ports::{InMemoryEntityStore, StoreError};
use crate::domain::{EntityId, Error, ErrorCode, ImageDescriptor, PasswordHash, Role};
use rstest::{fixture, rstest};

/// Wraps the in-memory store and injects failures on demand.
struct FlakyStore<E: Entity> {
    inner: InMemoryEntityStore<E>,
    fail_reads: Option<StoreError>,
    fail_writes: Option<StoreError>,
    vanish_on_write: bool,
    wrote: AtomicBool,
}

impl<E: Entity> FlakyStore<E> {
    fn new(documents: impl IntoIterator<Item = E>) -> Self {
        Self {
            inner: InMemoryEntityStore::with_documents(documents),
            fail_reads: None,
            fail_writes: None,
            vanish_on_write: false,
            wrote: AtomicBool::new(false),
        }
    }

    fn failing_reads(mut self, err: StoreError) -> Self {
        self.fail_reads = Some(err);
        self
    }

    fn failing_writes(mut self, err: StoreError) -> Self {
        self.fail_writes = Some(err);
        self
    }

    fn vanishing_on_write(mut self) -> Self {
        self.vanish_on_write = true;
        self
    }

    fn was_written(&self) -> bool {
        self.wrote.load(Ordering::SeqCst)
    }

    fn check_write(&self) -> Result<bool, StoreError> {
        self.wrote.store(true, Ordering::SeqCst);
        match &self.fail_writes {
            Some(err) => Err(err.clone()),
            None => Ok(self.vanish_on_write),
        }
    }
}

#[async_trait]
impl<E: Entity> EntityStore<E> for FlakyStore<E> {
    async fn get_by_id(&self, id: E::Id) -> Result<Option<E>, StoreError> {
        if let Some(err) = &self.fail_reads {
            return Err(err.clone());
        }
        self.inner.get_by_id(id).await
    }

    async fn list(&self) -> Result<Vec<E>, StoreError> {
        self.inner.list().await
    }

    async fn create(&self, draft: E::Draft) -> Result<E, StoreError> {
        self.inner.create(draft).await
    }

    async fn update_by_id(&self, id: E::Id, patch: E::Patch) -> Result<Option<E>, StoreError> {
        self.inner.update_by_id(id, patch).await
    }

    async fn delete_by_id(&self, id: E::Id) -> Result<Option<E>, StoreError> {
        self.inner.delete_by_id(id).await
    }

    async fn find_by(&self, filter: E::Filter) -> Result<Vec<E>, StoreError> {
        self.inner.find_by(filter).await
    }

    async fn push_relation(
        &self,
        id: E::Id,
        relation: E::Relation,
    ) -> Result<Option<E>, StoreError> {
        if self.check_write()? {
            return Ok(None);
        }
        self.inner.push_relation(id, relation).await
    }

    async fn pull_relation(
        &self,
        id: E::Id,
        relation: E::Relation,
    ) -> Result<Option<E>, StoreError> {
        if self.check_write()? {
            return Ok(None);
        }
        self.inner.pull_relation(id, relation).await
    }
}

fn beer(name: &str) -> Beer {
    Beer {
        id: BeerId::random(),
        name: name.to_owned(),
        brewer: "Estrella Galicia".into(),
        style: "Lager".into(),
        alcohol: "5.5%".into(),
        image: ImageDescriptor::default(),
        author: UserId::random(),
        pubs: Vec::new(),
        tasted_by: Vec::new(),
    }
}

fn pub_with(taps: u32, beers: Vec<BeerId>) -> Pub {
    Pub {
        id: PubId::random(),
        name: "Taberna del Puerto".into(),
        logo: ImageDescriptor::default(),
        address: "Muelle 4".into(),
        owner: "Rosa".into(),
        taps,
        beers,
    }
}

#[fixture]
fn user() -> User {
    User {
        id: UserId::random(),
        name: "Carmen".into(),
        surname: "Ruiz".into(),
        age: 35,
        username: "carmen".into(),
        email: "carmen@example.com".into(),
        password_hash: PasswordHash::new("h"),
        role: Role::User,
        tasted: Vec::new(),
        visited: Vec::new(),
    }
}

type Stores = (
    Arc<FlakyStore<Beer>>,
    Arc<FlakyStore<Pub>>,
    Arc<FlakyStore<User>>,
);

type Service = RelationshipService<FlakyStore<Beer>, FlakyStore<Pub>, FlakyStore<User>>;

fn service(
    beers: FlakyStore<Beer>,
    pubs: FlakyStore<Pub>,
    users: FlakyStore<User>,
) -> (Service, Stores) {
    let beers = Arc::new(beers);
    let pubs = Arc::new(pubs);
    let users = Arc::new(users);
    let service = RelationshipService::new(
        Arc::clone(&beers),
        Arc::clone(&pubs),
        Arc::clone(&users),
    );
    (service, (beers, pubs, users))
}

async fn stored<E: Entity, S: EntityStore<E>>(store: &S, id: E::Id) -> E {
    store
        .get_by_id(id)
        .await
        .expect("store read")
        .expect("document exists")
}

#[tokio::test]
async fn adding_a_beer_to_a_pub_with_free_taps_links_both_sides() {
    let b1 = beer("Mahou Clásica");
    let p1 = pub_with(2, Vec::new());
    let (service, (beers, pubs, _)) = service(
        FlakyStore::new([b1.clone()]),
        FlakyStore::new([p1.clone()]),
        FlakyStore::new([]),
    );

    let outcome = service
        .add_beer_to_tap(p1.id, b1.id)
        .await
        .expect("beer fits");

    assert_eq!(outcome.primary.beers, vec![b1.id]);
    assert_eq!(outcome.consistency, Consistency::Synchronized);
    assert_eq!(
        outcome.related.map(|beer| beer.pubs),
        Some(vec![p1.id])
    );
    assert_eq!(stored(pubs.as_ref(), p1.id).await.beers, vec![b1.id]);
    assert_eq!(stored(beers.as_ref(), b1.id).await.pubs, vec![p1.id]);
}

#[tokio::test]
async fn full_pub_rejects_a_third_beer_without_writing() {
    let b3 = beer("Alhambra 1925");
    let p1 = pub_with(2, vec![BeerId::random(), BeerId::random()]);
    let (service, (beers, pubs, _)) = service(
        FlakyStore::new([b3.clone()]),
        FlakyStore::new([p1.clone()]),
        FlakyStore::new([]),
    );

    let err = service
        .add_beer_to_tap(p1.id, b3.id)
        .await
        .expect_err("no free taps");

    assert!(matches!(
        err,
        RelationshipError::CapacityExceeded { taps: 2, on_tap: 2, .. }
    ));
    assert!(!pubs.was_written());
    assert!(!beers.was_written());
    assert_eq!(stored(pubs.as_ref(), p1.id).await.beers.len(), 2);
}

#[tokio::test]
async fn beer_already_on_tap_is_a_duplicate() {
    let b1 = beer("Ambar Especial");
    let p1 = pub_with(5, vec![b1.id]);
    let (service, (_, pubs, _)) = service(
        FlakyStore::new([b1.clone()]),
        FlakyStore::new([p1.clone()]),
        FlakyStore::new([]),
    );

    let err = service
        .add_beer_to_tap(p1.id, b1.id)
        .await
        .expect_err("already on tap");

    assert_eq!(err.detail_code().as_deref(), Some("already_on_tap"));
    assert_eq!(stored(pubs.as_ref(), p1.id).await.beers, vec![b1.id]);
}

#[rstest]
#[tokio::test]
async fn removing_an_untasted_beer_leaves_history_unchanged(mut user: User) {
    let b1 = beer("Estrella Damm");
    let b2 = beer("Moritz");
    user.tasted = vec![b1.id];
    let (service, (_, _, users)) = service(
        FlakyStore::new([b1.clone(), b2.clone()]),
        FlakyStore::new([]),
        FlakyStore::new([user.clone()]),
    );

    let err = service
        .remove_tasted_beer(user.id, b2.id)
        .await
        .expect_err("never tasted");

    assert!(matches!(
        err,
        RelationshipError::Missing {
            relation: RelationKind::Tasted,
            ..
        }
    ));
    assert!(!users.was_written());
    assert_eq!(stored(users.as_ref(), user.id).await.tasted, vec![b1.id]);
}

#[tokio::test]
async fn missing_pub_is_reported_before_missing_beer() {
    let (service, _) = service(
        FlakyStore::new([]),
        FlakyStore::new([]),
        FlakyStore::new([]),
    );
    let pub_id = PubId::random();

    let err = service
        .add_beer_to_tap(pub_id, BeerId::random())
        .await
        .expect_err("nothing exists");

    match err {
        RelationshipError::NotFound { role, entity, .. } => {
            assert_eq!(role, EntityRole::Primary);
            assert_eq!(entity, EntityRef::new(EntityKind::Pub, pub_id));
        }
        other => panic!("expected primary not found, got {other:?}"),
    }
}

#[tokio::test]
async fn missing_beer_is_reported_as_related() {
    let p1 = pub_with(3, Vec::new());
    let (service, _) = service(
        FlakyStore::new([]),
        FlakyStore::new([p1.clone()]),
        FlakyStore::new([]),
    );

    let err = service
        .add_beer_to_tap(p1.id, BeerId::random())
        .await
        .expect_err("beer missing");

    assert!(matches!(
        err,
        RelationshipError::NotFound {
            role: EntityRole::Related,
            ..
        }
    ));
    assert_eq!(err.detail_code().as_deref(), Some("beer_not_found"));
}

#[tokio::test]
async fn add_then_remove_restores_both_sides() {
    let b1 = beer("Turia Märzen");
    let p1 = pub_with(1, Vec::new());
    let (service, (beers, pubs, _)) = service(
        FlakyStore::new([b1.clone()]),
        FlakyStore::new([p1.clone()]),
        FlakyStore::new([]),
    );

    service.add_beer_to_tap(p1.id, b1.id).await.expect("add");
    let outcome = service
        .remove_beer_from_tap(p1.id, b1.id)
        .await
        .expect("remove");

    assert!(outcome.primary.beers.is_empty());
    assert!(outcome.consistency.is_synchronized());
    assert!(stored(pubs.as_ref(), p1.id).await.beers.is_empty());
    assert!(stored(beers.as_ref(), b1.id).await.pubs.is_empty());
}

#[tokio::test]
async fn repeated_removal_keeps_failing_without_side_effects() {
    let b1 = beer("Keler 18");
    let p1 = pub_with(2, Vec::new());
    let (service, (_, pubs, _)) = service(
        FlakyStore::new([b1.clone()]),
        FlakyStore::new([p1.clone()]),
        FlakyStore::new([]),
    );

    for _ in 0..2 {
        let err = service
            .remove_beer_from_tap(p1.id, b1.id)
            .await
            .expect_err("not on tap");
        assert_eq!(err.detail_code().as_deref(), Some("not_on_tap"));
    }
    assert!(!pubs.was_written());
}

#[tokio::test]
async fn over_capacity_pub_sheds_beers_but_refuses_new_ones() {
    let on_tap = beer("Cruzcampo");
    let other = beer("Victoria");
    let p1 = pub_with(1, vec![on_tap.id, BeerId::random(), BeerId::random()]);
    let (service, _) = service(
        FlakyStore::new([on_tap.clone(), other.clone()]),
        FlakyStore::new([p1.clone()]),
        FlakyStore::new([]),
    );

    let removed = service
        .remove_beer_from_tap(p1.id, on_tap.id)
        .await
        .expect("removal allowed");
    assert_eq!(removed.primary.beers.len(), 2);

    let err = service
        .add_beer_to_tap(p1.id, other.id)
        .await
        .expect_err("still over capacity");
    assert!(matches!(err, RelationshipError::CapacityExceeded { .. }));
}

#[tokio::test]
async fn failed_back_reference_reports_partial_consistency() {
    let b1 = beer("La Virgen");
    let p1 = pub_with(2, Vec::new());
    let (service, (_, pubs, _)) = service(
        FlakyStore::new([b1.clone()]).failing_writes(StoreError::connection("reset")),
        FlakyStore::new([p1.clone()]),
        FlakyStore::new([]),
    );

    let outcome = service
        .add_beer_to_tap(p1.id, b1.id)
        .await
        .expect("primary write succeeded");

    assert_eq!(outcome.primary.beers, vec![b1.id]);
    assert!(outcome.related.is_none());
    match outcome.consistency {
        Consistency::Partial { entity, reason } => {
            assert_eq!(entity, EntityRef::new(EntityKind::Beer, b1.id));
            assert!(reason.contains("reset"), "reason was {reason}");
        }
        Consistency::Synchronized => panic!("expected partial consistency"),
    }
    assert_eq!(stored(pubs.as_ref(), p1.id).await.beers, vec![b1.id]);
}

#[rstest]
#[tokio::test]
async fn vanished_beer_during_tasting_reports_partial_consistency(user: User) {
    let b1 = beer("Arriaca");
    let (service, (_, _, users)) = service(
        FlakyStore::new([b1.clone()]).vanishing_on_write(),
        FlakyStore::new([]),
        FlakyStore::new([user.clone()]),
    );

    let outcome = service
        .add_tasted_beer(user.id, b1.id)
        .await
        .expect("user write succeeded");

    assert_eq!(outcome.consistency.as_str(), "partial");
    assert_eq!(stored(users.as_ref(), user.id).await.tasted, vec![b1.id]);
}

#[tokio::test]
async fn primary_write_failure_skips_the_back_reference() {
    let b1 = beer("Dorada");
    let p1 = pub_with(2, Vec::new());
    let (service, (beers, _, _)) = service(
        FlakyStore::new([b1.clone()]),
        FlakyStore::new([p1.clone()]).failing_writes(StoreError::query("deadlock")),
        FlakyStore::new([]),
    );

    let err = service
        .add_beer_to_tap(p1.id, b1.id)
        .await
        .expect_err("pub write fails");

    assert!(matches!(
        err,
        RelationshipError::Store {
            kind: EntityKind::Pub,
            ..
        }
    ));
    assert!(!beers.was_written());
}

#[rstest]
#[case(StoreError::connection("refused"), ErrorCode::ServiceUnavailable)]
#[case(StoreError::query("bad sql"), ErrorCode::InternalError)]
#[tokio::test]
async fn load_failures_map_to_domain_errors(
    #[case] failure: StoreError,
    #[case] expected: ErrorCode,
    user: User,
) {
    let (service, _) = service(
        FlakyStore::new([]),
        FlakyStore::new([]),
        FlakyStore::new([user.clone()]).failing_reads(failure),
    );

    let err = service
        .add_visited_pub(user.id, PubId::random())
        .await
        .expect_err("load fails");

    assert_eq!(Error::from(err).code(), expected);
}

#[rstest]
#[tokio::test]
async fn tasting_links_user_and_beer_symmetrically(user: User) {
    let b1 = beer("Zeta");
    let (service, (beers, _, users)) = service(
        FlakyStore::new([b1.clone()]),
        FlakyStore::new([]),
        FlakyStore::new([user.clone()]),
    );

    service
        .add_tasted_beer(user.id, b1.id)
        .await
        .expect("taste");
    assert_eq!(stored(users.as_ref(), user.id).await.tasted, vec![b1.id]);
    assert_eq!(stored(beers.as_ref(), b1.id).await.tasted_by, vec![user.id]);

    let err = service
        .add_tasted_beer(user.id, b1.id)
        .await
        .expect_err("second taste");
    assert_eq!(err.detail_code().as_deref(), Some("already_tasted"));

    service
        .remove_tasted_beer(user.id, b1.id)
        .await
        .expect("untaste");
    assert!(stored(users.as_ref(), user.id).await.tasted.is_empty());
    assert!(stored(beers.as_ref(), b1.id).await.tasted_by.is_empty());
}

#[rstest]
#[tokio::test]
async fn visits_touch_only_the_user(user: User) {
    let p1 = pub_with(1, Vec::new());
    let (service, (_, pubs, users)) = service(
        FlakyStore::new([]),
        FlakyStore::new([p1.clone()]),
        FlakyStore::new([user.clone()]),
    );

    let outcome = service
        .add_visited_pub(user.id, p1.id)
        .await
        .expect("visit");
    assert_eq!(outcome.primary.visited, vec![p1.id]);
    assert!(outcome.related.is_none());
    assert!(!pubs.was_written());

    let err = service
        .add_visited_pub(user.id, p1.id)
        .await
        .expect_err("second visit");
    assert_eq!(err.detail_code().as_deref(), Some("already_visited"));

    service
        .remove_visited_pub(user.id, p1.id)
        .await
        .expect("forget visit");
    assert!(stored(users.as_ref(), user.id).await.visited.is_empty());
}
