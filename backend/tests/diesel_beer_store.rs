//! Integration tests for `DieselBeerStore` against embedded PostgreSQL.

use rstest::{fixture, rstest};
use taplist::domain::ports::{EntityStore, StoreError};
use taplist::domain::{
    BeerDraft, BeerFilter, BeerId, BeerPatch, BeerRelation, EntityId, ImageDescriptor, PubId,
    UserId,
};
use taplist::outbound::persistence::DieselBeerStore;

mod support;

use support::{TestDatabase, test_database};

fn draft(name: &str, author: UserId) -> BeerDraft {
    BeerDraft {
        name: name.to_owned(),
        brewer: "Cervezas Alhambra".into(),
        style: "Lager".into(),
        alcohol: "6.4%".into(),
        image: ImageDescriptor {
            url: "/images/label.webp".into(),
            public_id: "label".into(),
            size: 4096,
            format: "webp".into(),
        },
        author,
    }
}

#[fixture]
fn database() -> Option<TestDatabase> {
    test_database()
}

#[rstest]
fn created_beers_keep_image_and_author(database: Option<TestDatabase>) {
    let Some(db) = database else { return };
    let store = DieselBeerStore::new(db.pool());
    let author = UserId::random();

    let created = db
        .run(store.create(draft("Reserva 1925", author)))
        .expect("create beer");
    let fetched = db
        .run(store.get_by_id(created.id))
        .expect("get beer")
        .expect("beer exists");

    assert_eq!(fetched, created);
    assert_eq!(fetched.author, author);
    assert_eq!(fetched.image.format, "webp");
    assert!(fetched.pubs.is_empty() && fetched.tasted_by.is_empty());
}

#[rstest]
fn missing_ids_read_as_none(database: Option<TestDatabase>) {
    let Some(db) = database else { return };
    let store = DieselBeerStore::new(db.pool());
    let unknown = BeerId::random();

    assert_eq!(db.run(store.get_by_id(unknown)).expect("get"), None);
    assert_eq!(
        db.run(store.pull_relation(unknown, BeerRelation::ServedAt(PubId::random())))
            .expect("pull"),
        None
    );
    assert_eq!(
        db.run(store.update_by_id(unknown, BeerPatch::default()))
            .expect("update"),
        None
    );
}

#[rstest]
fn duplicate_names_conflict(database: Option<TestDatabase>) {
    let Some(db) = database else { return };
    let store = DieselBeerStore::new(db.pool());
    db.run(store.create(draft("Mahou Cinco Estrellas", UserId::random())))
        .expect("first beer");

    let Err(err) = db.run(store.create(draft("Mahou Cinco Estrellas", UserId::random()))) else {
        panic!("second beer with the same name stored");
    };

    assert!(matches!(err, StoreError::Conflict { .. }), "got {err:?}");
}

#[rstest]
fn back_references_are_kept_per_relation(database: Option<TestDatabase>) {
    let Some(db) = database else { return };
    let store = DieselBeerStore::new(db.pool());
    let beer = db
        .run(store.create(draft("Estrella de Levante", UserId::random())))
        .expect("beer");
    let (bar, drinker) = (PubId::random(), UserId::random());

    db.run(store.push_relation(beer.id, BeerRelation::ServedAt(bar)))
        .expect("push served at");
    let linked = db
        .run(store.push_relation(beer.id, BeerRelation::TastedBy(drinker)))
        .expect("push tasted by")
        .expect("beer exists");
    assert_eq!(linked.pubs, vec![bar]);
    assert_eq!(linked.tasted_by, vec![drinker]);

    let served = db
        .run(store.find_by(BeerFilter::ServedAt(bar)))
        .expect("find served at");
    assert_eq!(served, vec![linked.clone()]);

    let unlinked = db
        .run(store.pull_relation(beer.id, BeerRelation::ServedAt(bar)))
        .expect("pull served at")
        .expect("beer exists");
    assert!(unlinked.pubs.is_empty());
    assert_eq!(unlinked.tasted_by, vec![drinker]);
}

#[rstest]
fn filters_match_plain_columns(database: Option<TestDatabase>) {
    let Some(db) = database else { return };
    let store = DieselBeerStore::new(db.pool());
    let author = UserId::random();
    let first = db.run(store.create(draft("Voll-Damm", author))).expect("beer");
    db.run(store.create(draft("Turia", UserId::random())))
        .expect("beer");

    let by_author = db
        .run(store.find_by(BeerFilter::Author(author)))
        .expect("find by author");
    let by_name = db
        .run(store.find_by(BeerFilter::Name("Voll-Damm".into())))
        .expect("find by name");

    assert_eq!(by_author, vec![first.clone()]);
    assert_eq!(by_name, vec![first]);
    assert_eq!(db.run(store.list()).expect("list").len(), 2);
}
