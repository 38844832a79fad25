//! Tests for the catalogue service.

use std::path::{Path, PathBuf};

use super::*;
use crate::domain::ports::{ImageStoreError, InMemoryEntityStore, MockImageStore};
use crate::domain::{EntityId, ErrorCode, ImageDescriptor};
use mockall::predicate::eq;
use rstest::{fixture, rstest};

type Service =
    CatalogueService<InMemoryEntityStore<Beer>, InMemoryEntityStore<Pub>, MockImageStore>;

fn descriptor(public_id: &str) -> ImageDescriptor {
    ImageDescriptor {
        url: format!("/images/{public_id}.png"),
        public_id: public_id.to_owned(),
        size: 2048,
        format: "png".into(),
    }
}

fn uploading(public_id: &'static str) -> MockImageStore {
    let mut images = MockImageStore::new();
    images
        .expect_upload_image()
        .times(1)
        .returning(move |_| Ok(descriptor(public_id)));
    images
}

fn service_with(
    beers: Vec<Beer>,
    pubs: Vec<Pub>,
    images: MockImageStore,
) -> (Service, Arc<InMemoryEntityStore<Beer>>, Arc<InMemoryEntityStore<Pub>>) {
    let beers = Arc::new(InMemoryEntityStore::with_documents(beers));
    let pubs = Arc::new(InMemoryEntityStore::with_documents(pubs));
    let service = CatalogueService::new(Arc::clone(&beers), Arc::clone(&pubs), Arc::new(images));
    (service, beers, pubs)
}

#[fixture]
fn new_beer() -> NewBeer {
    NewBeer {
        name: "Mahou Maestra".into(),
        brewer: "Mahou".into(),
        style: "Dunkel".into(),
        alcohol: "7.5%".into(),
        image_path: PathBuf::from("/tmp/uploads/maestra.png"),
    }
}

#[fixture]
fn new_pub() -> NewPub {
    NewPub {
        name: "El Tigre".into(),
        address: "Calle Infantas 30".into(),
        owner: "Paco".into(),
        taps: 4,
        logo_path: PathBuf::from("/tmp/uploads/tigre.png"),
    }
}

fn stored_beer(name: &str) -> Beer {
    Beer {
        id: BeerId::random(),
        name: name.to_owned(),
        brewer: "Damm".into(),
        style: "Lager".into(),
        alcohol: "4.8%".into(),
        image: descriptor("existing"),
        author: UserId::random(),
        pubs: Vec::new(),
        tasted_by: Vec::new(),
    }
}

#[rstest]
#[tokio::test]
async fn create_beer_uploads_image_and_records_author(new_beer: NewBeer) {
    let author = UserId::random();
    let mut images = MockImageStore::new();
    images
        .expect_upload_image()
        .with(eq(Path::new("/tmp/uploads/maestra.png").to_path_buf()))
        .times(1)
        .returning(|_| Ok(descriptor("label-1")));
    let (service, beers, _) = service_with(Vec::new(), Vec::new(), images);

    let beer = service
        .create_beer(author, new_beer)
        .await
        .expect("beer created");

    assert_eq!(beer.author, author);
    assert_eq!(beer.image.public_id, "label-1");
    assert!(beer.pubs.is_empty());
    assert_eq!(beers.list().await.expect("list").len(), 1);
}

#[rstest]
#[tokio::test]
async fn duplicate_beer_name_conflicts_before_upload(new_beer: NewBeer) {
    let mut images = MockImageStore::new();
    images.expect_upload_image().never();
    let (service, _, _) = service_with(vec![stored_beer("Mahou Maestra")], Vec::new(), images);

    let err = service
        .create_beer(UserId::random(), new_beer)
        .await
        .expect_err("name taken");

    assert_eq!(err.code(), ErrorCode::Conflict);
}

#[rstest]
#[tokio::test]
async fn blank_fields_are_rejected(mut new_beer: NewBeer) {
    new_beer.style = "  ".into();
    let mut images = MockImageStore::new();
    images.expect_upload_image().never();
    let (service, _, _) = service_with(Vec::new(), Vec::new(), images);

    let err = service
        .create_beer(UserId::random(), new_beer)
        .await
        .expect_err("blank style");

    assert_eq!(err.code(), ErrorCode::InvalidRequest);
    assert_eq!(
        err.details().and_then(|d| d.get("field")).and_then(|v| v.as_str()),
        Some("style")
    );
}

#[rstest]
#[case(MAX_TAPS, true)]
#[case(MAX_TAPS + 1, false)]
#[case(u32::MAX, false)]
#[tokio::test]
async fn tap_counts_must_fit_the_store(
    mut new_pub: NewPub,
    #[case] taps: u32,
    #[case] accepted: bool,
) {
    new_pub.taps = taps;
    let mut images = MockImageStore::new();
    images
        .expect_upload_image()
        .times(usize::from(accepted))
        .returning(|_| Ok(descriptor("logo-1")));
    let (service, _, pubs) = service_with(Vec::new(), Vec::new(), images);

    let result = service.create_pub(new_pub).await;

    if accepted {
        assert_eq!(result.expect("pub created").taps, MAX_TAPS);
    } else {
        let err = result.expect_err("too many taps");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
        assert_eq!(
            err.details().and_then(|d| d.get("field")).and_then(|v| v.as_str()),
            Some("taps")
        );
        assert!(pubs.list().await.expect("list").is_empty());
    }
}

#[rstest]
#[tokio::test]
async fn unreadable_upload_is_an_invalid_request(new_pub: NewPub) {
    let mut images = MockImageStore::new();
    images
        .expect_upload_image()
        .returning(|_| Err(ImageStoreError::source("no such file")));
    let (service, _, pubs) = service_with(Vec::new(), Vec::new(), images);

    let err = service.create_pub(new_pub).await.expect_err("upload fails");

    assert_eq!(err.code(), ErrorCode::InvalidRequest);
    assert!(pubs.list().await.expect("list").is_empty());
}

#[rstest]
#[tokio::test]
async fn create_pub_starts_with_empty_tap_list(new_pub: NewPub) {
    let (service, _, _) = service_with(Vec::new(), Vec::new(), uploading("logo-1"));

    let pub_ = service.create_pub(new_pub).await.expect("pub created");

    assert_eq!(pub_.taps, 4);
    assert!(pub_.beers.is_empty());
    assert_eq!(pub_.logo.public_id, "logo-1");
}

#[tokio::test]
async fn get_pub_skips_dangling_beer_references() {
    let served = stored_beer("Estrella de Levante");
    let pub_ = Pub {
        id: PubId::random(),
        name: "La Mar".into(),
        logo: descriptor("logo"),
        address: "Paseo 1".into(),
        owner: "Lola".into(),
        taps: 3,
        beers: vec![served.id, BeerId::random()],
    };
    let (service, _, _) = service_with(
        vec![served.clone()],
        vec![pub_.clone()],
        MockImageStore::new(),
    );

    let details = service.get_pub(pub_.id).await.expect("pub exists");

    assert_eq!(details.beers, vec![served]);
    assert_eq!(details.pub_.beers.len(), 2);
}

#[tokio::test]
async fn delete_beer_returns_document_and_discards_image() {
    let beer = stored_beer("Pilsen");
    let mut images = MockImageStore::new();
    images
        .expect_delete_image()
        .with(eq("existing"))
        .times(1)
        .returning(|_| Ok(()));
    let (service, beers, _) = service_with(vec![beer.clone()], Vec::new(), images);

    let deleted = service.delete_beer(beer.id).await.expect("deleted");

    assert_eq!(deleted, beer);
    assert!(beers.get_by_id(beer.id).await.expect("get").is_none());
}

#[tokio::test]
async fn image_cleanup_failures_do_not_fail_deletion() {
    let beer = stored_beer("Ambar Export");
    let mut images = MockImageStore::new();
    images
        .expect_delete_image()
        .returning(|_| Err(ImageStoreError::storage("read-only")));
    let (service, _, _) = service_with(vec![beer.clone()], Vec::new(), images);

    assert!(service.delete_beer(beer.id).await.is_ok());
}

#[rstest]
#[case::beer(true)]
#[case::pub_(false)]
#[tokio::test]
async fn deleting_unknown_ids_is_not_found(#[case] beer: bool) {
    let (service, _, _) = service_with(Vec::new(), Vec::new(), MockImageStore::new());

    let code = if beer {
        service.delete_beer(BeerId::random()).await.map(|_| ())
    } else {
        service.delete_pub(PubId::random()).await.map(|_| ())
    }
    .expect_err("unknown id")
    .code();

    assert_eq!(code, ErrorCode::NotFound);
}
