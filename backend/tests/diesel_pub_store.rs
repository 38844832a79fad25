//! Integration tests for `DieselPubStore` against embedded PostgreSQL.
//!
//! Set `SKIP_TEST_CLUSTER=1` to skip these suites where the embedded
//! cluster cannot start.

use futures_util::future::join_all;
use rstest::{fixture, rstest};
use taplist::domain::ports::{EntityStore, StoreError};
use taplist::domain::{
    BeerId, EntityId, ImageDescriptor, Pub, PubDraft, PubFilter, PubId, PubPatch, PubRelation,
};
use taplist::outbound::persistence::DieselPubStore;

mod support;

use support::{TestDatabase, test_database};

fn logo(public_id: &str) -> ImageDescriptor {
    ImageDescriptor {
        url: format!("/images/{public_id}.png"),
        public_id: public_id.to_owned(),
        size: 512,
        format: "png".into(),
    }
}

fn draft(name: &str, taps: u32) -> PubDraft {
    PubDraft {
        name: name.to_owned(),
        logo: logo(&name.to_lowercase().replace(' ', "-")),
        address: "Rúa do Vilar 40".into(),
        owner: "Carmela".into(),
        taps,
    }
}

#[fixture]
fn database() -> Option<TestDatabase> {
    test_database()
}

#[rstest]
fn created_pubs_read_back_unchanged(database: Option<TestDatabase>) {
    let Some(db) = database else { return };
    let store = DieselPubStore::new(db.pool());

    let created = db
        .run(store.create(draft("O Gato Negro", 6)))
        .expect("create pub");
    let fetched = db.run(store.get_by_id(created.id)).expect("get pub");

    assert_eq!(fetched.as_ref(), Some(&created));
    assert_eq!(created.taps, 6);
    assert!(created.beers.is_empty());
    assert_eq!(created.logo.public_id, "o-gato-negro");
}

#[rstest]
fn missing_ids_read_as_none(database: Option<TestDatabase>) {
    let Some(db) = database else { return };
    let store = DieselPubStore::new(db.pool());
    let unknown = PubId::random();

    assert_eq!(db.run(store.get_by_id(unknown)).expect("get"), None);
    assert_eq!(db.run(store.delete_by_id(unknown)).expect("delete"), None);
    assert_eq!(
        db.run(store.push_relation(unknown, PubRelation::OnTap(BeerId::random())))
            .expect("push"),
        None
    );
    let patch = PubPatch {
        taps: Some(2),
        ..PubPatch::default()
    };
    assert_eq!(db.run(store.update_by_id(unknown, patch)).expect("update"), None);
}

#[rstest]
fn duplicate_names_conflict(database: Option<TestDatabase>) {
    let Some(db) = database else { return };
    let store = DieselPubStore::new(db.pool());
    db.run(store.create(draft("Bar Orellana", 4)))
        .expect("first pub");

    let Err(err) = db.run(store.create(draft("Bar Orellana", 2))) else {
        panic!("second pub with the same name stored");
    };

    assert!(matches!(err, StoreError::Conflict { .. }), "got {err:?}");
    assert!(err.to_string().contains("name"));
    assert_eq!(db.run(store.list()).expect("list").len(), 1);
}

#[rstest]
fn tap_lists_grow_and_shrink_in_place(database: Option<TestDatabase>) {
    let Some(db) = database else { return };
    let store = DieselPubStore::new(db.pool());
    let pub_ = db.run(store.create(draft("Taberna Lino", 3))).expect("pub");
    let (lager, stout) = (BeerId::random(), BeerId::random());

    db.run(store.push_relation(pub_.id, PubRelation::OnTap(lager)))
        .expect("push lager");
    let after_push = db
        .run(store.push_relation(pub_.id, PubRelation::OnTap(stout)))
        .expect("push stout")
        .expect("pub exists");
    assert_eq!(after_push.beers, vec![lager, stout]);

    let serving = db
        .run(store.find_by(PubFilter::Serving(stout)))
        .expect("find serving");
    assert_eq!(serving.iter().map(|p| p.id).collect::<Vec<_>>(), vec![pub_.id]);

    let after_pull = db
        .run(store.pull_relation(pub_.id, PubRelation::OnTap(lager)))
        .expect("pull lager")
        .expect("pub exists");
    assert_eq!(after_pull.beers, vec![stout]);
    assert!(
        db.run(store.find_by(PubFilter::Serving(lager)))
            .expect("find serving")
            .is_empty()
    );
}

#[rstest]
fn pulls_remove_every_copy_of_an_id(database: Option<TestDatabase>) {
    let Some(db) = database else { return };
    let store = DieselPubStore::new(db.pool());
    let pub_ = db.run(store.create(draft("Casa Pepa", 4))).expect("pub");
    let beer = BeerId::random();
    for _ in 0..2 {
        db.run(store.push_relation(pub_.id, PubRelation::OnTap(beer)))
            .expect("push");
    }

    let pulled = db
        .run(store.pull_relation(pub_.id, PubRelation::OnTap(beer)))
        .expect("pull")
        .expect("pub exists");

    assert!(pulled.beers.is_empty());
}

#[rstest]
fn concurrent_pushes_all_land(database: Option<TestDatabase>) {
    let Some(db) = database else { return };
    let store = DieselPubStore::new(db.pool());
    let pub_ = db.run(store.create(draft("A Reitoria", 16))).expect("pub");
    let beers: Vec<BeerId> = (0..8).map(|_| BeerId::random()).collect();

    let results = db.run(join_all(
        beers
            .iter()
            .map(|beer| store.push_relation(pub_.id, PubRelation::OnTap(*beer))),
    ));
    assert!(results.iter().all(|result| matches!(result, Ok(Some(_)))));

    let stored = db
        .run(store.get_by_id(pub_.id))
        .expect("get")
        .expect("pub exists");
    let mut on_tap = stored.beers;
    let mut expected = beers;
    on_tap.sort();
    expected.sort();
    assert_eq!(on_tap, expected);
}

#[rstest]
fn patches_and_deletes_return_documents(database: Option<TestDatabase>) {
    let Some(db) = database else { return };
    let store = DieselPubStore::new(db.pool());
    let pub_ = db.run(store.create(draft("Bodega Sur", 5))).expect("pub");

    let patch = PubPatch {
        taps: Some(1),
        owner: Some("Xoán".into()),
        ..PubPatch::default()
    };
    let patched: Pub = db
        .run(store.update_by_id(pub_.id, patch))
        .expect("update")
        .expect("pub exists");
    assert_eq!((patched.taps, patched.owner.as_str()), (1, "Xoán"));

    let deleted = db
        .run(store.delete_by_id(pub_.id))
        .expect("delete")
        .expect("pub existed");
    assert_eq!(deleted, patched);
    assert_eq!(db.run(store.get_by_id(pub_.id)).expect("get"), None);
}
