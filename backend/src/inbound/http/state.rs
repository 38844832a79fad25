//! Shared HTTP adapter state.
//!
//! Handlers receive this via `web::Data` and only see driving ports, so they
//! can be exercised against mocks without any store behind them.

use std::sync::Arc;

use crate::domain::ports::{
    AccountService, CatalogueCommand, CatalogueQuery, HistoryCommand, TapCommand,
};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub accounts: Arc<dyn AccountService>,
    pub catalogue: Arc<dyn CatalogueCommand>,
    pub catalogue_query: Arc<dyn CatalogueQuery>,
    pub taps: Arc<dyn TapCommand>,
    pub history: Arc<dyn HistoryCommand>,
    /// Let anonymous callers register with the admin role.
    pub allow_admin_signup: bool,
}

impl HttpState {
    /// Bundle the driving ports.
    ///
    /// # Examples
    /// ```no_run
    /// use std::sync::Arc;
    ///
    /// use taplist::domain::ports::InMemoryEntityStore;
    /// use taplist::domain::{
    ///     Beer, CatalogueService, Pub, RelationshipService, User, UserAccountService,
    /// };
    /// use taplist::inbound::http::state::HttpState;
    /// use taplist::outbound::images::LocalImageStore;
    /// use taplist::outbound::security::Argon2PasswordHasher;
    ///
    /// let beers = Arc::new(InMemoryEntityStore::<Beer>::default());
    /// let pubs = Arc::new(InMemoryEntityStore::<Pub>::default());
    /// let users = Arc::new(InMemoryEntityStore::<User>::default());
    /// let images = Arc::new(
    ///     LocalImageStore::open("uploads", "public/images", "/images").expect("image dirs"),
    /// );
    /// let catalogue = Arc::new(CatalogueService::new(beers.clone(), pubs.clone(), images));
    /// let relationships = Arc::new(RelationshipService::new(
    ///     beers.clone(),
    ///     pubs.clone(),
    ///     users.clone(),
    /// ));
    /// let accounts = Arc::new(UserAccountService::new(
    ///     users,
    ///     beers,
    ///     pubs,
    ///     Arc::new(Argon2PasswordHasher::default()),
    /// ));
    /// let state = HttpState::new(
    ///     accounts,
    ///     catalogue.clone(),
    ///     catalogue,
    ///     relationships.clone(),
    ///     relationships,
    /// );
    /// let _taps = state.taps.clone();
    /// ```
    pub fn new(
        accounts: Arc<dyn AccountService>,
        catalogue: Arc<dyn CatalogueCommand>,
        catalogue_query: Arc<dyn CatalogueQuery>,
        taps: Arc<dyn TapCommand>,
        history: Arc<dyn HistoryCommand>,
    ) -> Self {
        Self {
            accounts,
            catalogue,
            catalogue_query,
            taps,
            history,
            allow_admin_signup: false,
        }
    }

    /// Open or close admin self-registration.
    #[must_use]
    pub fn with_admin_signup(mut self, allow: bool) -> Self {
        self.allow_admin_signup = allow;
        self
    }
}
