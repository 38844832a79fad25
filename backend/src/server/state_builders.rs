//! Wire entity stores, adapters and domain services into [`HttpState`].

use std::sync::Arc;

use taplist::domain::ports::{EntityStore, InMemoryEntityStore};
use taplist::domain::{
    Beer, CatalogueService, Pub, RelationshipService, User, UserAccountService,
};
use taplist::inbound::http::state::HttpState;
use taplist::outbound::images::LocalImageStore;
use taplist::outbound::persistence::{DbPool, DieselBeerStore, DieselPubStore, DieselUserStore};
use taplist::outbound::security::Argon2PasswordHasher;

use super::ServerConfig;

/// One store per collection, chosen once at startup.
#[derive(Clone)]
pub(crate) struct Stores {
    pub beers: Arc<dyn EntityStore<Beer>>,
    pub pubs: Arc<dyn EntityStore<Pub>>,
    pub users: Arc<dyn EntityStore<User>>,
}

impl Stores {
    pub fn postgres(pool: &DbPool) -> Self {
        Self {
            beers: Arc::new(DieselBeerStore::new(pool.clone())),
            pubs: Arc::new(DieselPubStore::new(pool.clone())),
            users: Arc::new(DieselUserStore::new(pool.clone())),
        }
    }

    pub fn in_memory() -> Self {
        Self {
            beers: Arc::new(InMemoryEntityStore::<Beer>::new()),
            pubs: Arc::new(InMemoryEntityStore::<Pub>::new()),
            users: Arc::new(InMemoryEntityStore::<User>::new()),
        }
    }

    fn for_config(config: &ServerConfig) -> Self {
        config
            .db_pool
            .as_ref()
            .map_or_else(Self::in_memory, Self::postgres)
    }
}

/// Build handler state over `stores`.
pub(crate) fn http_state_over(
    stores: Stores,
    images: LocalImageStore,
    allow_admin_signup: bool,
) -> HttpState {
    let Stores { beers, pubs, users } = stores;
    let catalogue = Arc::new(CatalogueService::new(
        Arc::clone(&beers),
        Arc::clone(&pubs),
        Arc::new(images),
    ));
    let relationships = Arc::new(RelationshipService::new(
        Arc::clone(&beers),
        Arc::clone(&pubs),
        Arc::clone(&users),
    ));
    let accounts = Arc::new(UserAccountService::new(
        users,
        beers,
        pubs,
        Arc::new(Argon2PasswordHasher::default()),
    ));

    HttpState::new(
        accounts,
        catalogue.clone(),
        catalogue,
        relationships.clone(),
        relationships,
    )
    .with_admin_signup(allow_admin_signup)
}

pub(crate) fn build_http_state(config: &ServerConfig) -> HttpState {
    http_state_over(
        Stores::for_config(config),
        config.images.clone(),
        config.allow_admin_signup,
    )
}
