use std::sync::Arc;

use tokio::sync::{Mutex, watch};

use crate::callback::{self, RedirectResponse};
use crate::claims::extract_delegated_tokens;
use crate::config::ProviderConfig;
use crate::error::{Error, ProviderError};
use crate::provider::{BrowserWindow, ClientFactory, IdentityProvider, LoginOptions, LogoutOptions};
use crate::session::{Session, SessionPhase};
use crate::store::SessionStore;
use crate::types::ClaimNamespace;

/// Drives the sign-in lifecycle against the identity provider and publishes
/// the result to a [`SessionStore`].
///
/// Every operation holds the controller lock from start to finish, so a
/// `login`/`logout` issued while `initialize` is in flight waits for it.
///
/// ```rust,ignore
/// let store = SessionStore::new();
/// let controller = SessionController::new(ProviderConfig::from_env()?, factory, store.clone())
///     .with_window(Arc::new(window));
///
/// // Application startup, and again after every return from the provider.
/// controller.initialize().await?;
/// if !store.is_authenticated() {
///     controller.login(controller.login_options()).await?;
/// }
/// ```
pub struct SessionController<F: ClientFactory> {
    config: ProviderConfig,
    factory: F,
    store: SessionStore,
    window: Option<Arc<dyn BrowserWindow>>,
    client: Mutex<Option<F::Client>>,
    phase: watch::Sender<SessionPhase>,
}

impl<F: ClientFactory> SessionController<F> {
    /// Create a controller with no browser window attached.
    ///
    /// Until [`with_window`](Self::with_window) is called, `initialize` is a
    /// no-op (server-side rendering, tests).
    #[must_use]
    pub fn new(config: ProviderConfig, factory: F, store: SessionStore) -> Self {
        let (phase, _rx) = watch::channel(SessionPhase::Unknown);
        Self {
            config,
            factory,
            store,
            window: None,
            client: Mutex::new(None),
            phase,
        }
    }

    #[must_use]
    pub fn with_window(mut self, window: Arc<dyn BrowserWindow>) -> Self {
        self.window = Some(window);
        self
    }

    #[must_use]
    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    #[must_use]
    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// Latest published session.
    #[must_use]
    pub fn session(&self) -> Session {
        self.store.read()
    }

    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        *self.phase.borrow()
    }

    #[must_use]
    pub fn subscribe_phase(&self) -> watch::Receiver<SessionPhase> {
        self.phase.subscribe()
    }

    /// Whether a provider client exists. Waits for any in-flight operation.
    pub async fn is_initialized(&self) -> bool {
        self.client.lock().await.is_some()
    }

    /// Login options for the configured connection, requesting offline access.
    #[must_use]
    pub fn login_options(&self) -> LoginOptions {
        LoginOptions::from_config(&self.config)
    }

    /// Bring the session in line with the provider.
    ///
    /// Obtains the client, completes an authorization response present in
    /// the URL (then strips the query string), and publishes either the
    /// signed-in session or the signed-out one. This is also where a login
    /// redirect resumes. Without a browser window it returns `Ok(())` and
    /// changes nothing.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ProviderInit`] if the client cannot be created, the
    /// redirect cannot be processed, or the session cannot be loaded. The
    /// signed-out session is published in that case.
    pub async fn initialize(&self) -> Result<(), Error> {
        let Some(window) = self.window.as_deref() else {
            tracing::debug!("No browser window; skipping session initialization");
            return Ok(());
        };

        let mut slot = self.client.lock().await;
        match self.run_initialize(window, &mut slot).await {
            Ok(session) => {
                self.publish(session);
                Ok(())
            }
            Err(e) => {
                tracing::error!(error = %e, "Session initialization failed");
                self.publish(Session::signed_out());
                Err(e)
            }
        }
    }

    async fn run_initialize(
        &self,
        window: &dyn BrowserWindow,
        slot: &mut Option<F::Client>,
    ) -> Result<Session, Error> {
        let client = match slot.take() {
            Some(client) => slot.insert(client),
            None => {
                let client = self
                    .factory
                    .create(&self.config)
                    .await
                    .map_err(init_error("client construction"))?;
                tracing::debug!(domain = %self.config.domain(), "Identity provider client created");
                slot.insert(client)
            }
        };

        let location = window.location();
        match callback::detect(&location) {
            Some(RedirectResponse::Authorization { .. }) => {
                self.set_phase(SessionPhase::RedirectPending);
                let handled = client.handle_redirect_callback().await;
                // Stripped even on failure so a reload never replays the callback.
                window.replace_location(&callback::strip_query(&location));
                handled.map_err(init_error("redirect callback"))?;
                tracing::info!("Authorization redirect processed");
            }
            Some(RedirectResponse::Error {
                error, description, ..
            }) => {
                self.set_phase(SessionPhase::RedirectPending);
                window.replace_location(&callback::strip_query(&location));
                tracing::warn!(error = %error, description = ?description, "Provider returned an error redirect");
                return Err(Error::ProviderInit {
                    stage: "redirect callback",
                    source: Box::new(Error::RedirectError {
                        error,
                        description: description.unwrap_or_else(|| "Unknown error".into()),
                    }),
                });
            }
            None => {}
        }

        let authenticated = client
            .is_authenticated()
            .await
            .map_err(init_error("authentication check"))?;
        if !authenticated {
            return Ok(Session::signed_out());
        }

        load_session(&*client, self.config.claim_namespace())
            .await
            .map_err(init_error("profile load"))
    }

    /// Send the browser to the provider.
    ///
    /// Returns once navigation has started; the phase becomes
    /// [`SessionPhase::RedirectPending`] and the flow completes in the next
    /// [`initialize`](Self::initialize) after the browser comes back.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotInitialized`] before a client exists, or
    /// [`Error::Provider`] if the provider rejects the request.
    pub async fn login(&self, options: LoginOptions) -> Result<(), Error> {
        let slot = self.client.lock().await;
        let client = slot.as_ref().ok_or(Error::NotInitialized)?;

        tracing::info!(connection = %options.connection, "Starting login redirect");
        client
            .login_with_redirect(options)
            .await
            .map_err(|source| Error::Provider {
                operation: "login",
                source,
            })?;

        self.set_phase(SessionPhase::RedirectPending);
        Ok(())
    }

    /// Sign out at the provider and clear the local session.
    ///
    /// The signed-out session is published even when the provider call
    /// fails or no client exists.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotInitialized`] if no client exists, or
    /// [`Error::Provider`] if the provider logout failed.
    pub async fn logout(&self) -> Result<(), Error> {
        let slot = self.client.lock().await;

        let result = match slot.as_ref() {
            Some(client) => client
                .logout(LogoutOptions::new(self.config.app_origin()))
                .await
                .map_err(|source| Error::Provider {
                    operation: "logout",
                    source,
                }),
            None => Err(Error::NotInitialized),
        };

        if let Err(e) = &result {
            tracing::warn!(error = %e, "Provider logout failed; clearing local session anyway");
        }
        self.publish(Session::signed_out());
        result
    }

    fn publish(&self, session: Session) {
        let phase = if session.is_authenticated() {
            SessionPhase::Authenticated
        } else {
            SessionPhase::Unauthenticated
        };
        tracing::debug!(user_id = ?session.user_id(), ?phase, "Session updated");
        self.store.replace(session);
        self.set_phase(phase);
    }

    fn set_phase(&self, phase: SessionPhase) {
        self.phase.send_replace(phase);
    }
}

/// Fetch the profile and delegated tokens and build the signed-in session.
async fn load_session<C: IdentityProvider>(
    client: &C,
    namespace: &ClaimNamespace,
) -> Result<Session, ProviderError> {
    let profile = client
        .get_user()
        .await?
        .ok_or("provider reported an authenticated session without a user profile")?;
    let claims = client.get_id_token_claims().await?;
    let tokens = extract_delegated_tokens(claims.as_ref(), namespace);

    if tokens.access_token().is_none() {
        tracing::warn!(
            namespace = %namespace,
            no_delegated_claims = tokens.is_empty(),
            "Delegated access token missing from identity token claims"
        );
    } else {
        tracing::info!("Delegated access token retrieved");
    }
    if tokens.refresh_token().is_some() {
        tracing::info!("Delegated refresh token retrieved");
    }

    Ok(Session::signed_in(profile, tokens))
}

fn init_error(stage: &'static str) -> impl FnOnce(ProviderError) -> Error {
    move |source| Error::ProviderInit { stage, source }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex as StdMutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use serde_json::json;
    use url::Url;

    use super::*;
    use crate::types::{ClaimSet, Profile, TokenPair};

    type Log = Arc<StdMutex<Vec<&'static str>>>;

    #[derive(Default)]
    struct ProviderState {
        authenticated: bool,
        profile: Option<Profile>,
        claims: Option<ClaimSet>,
        fail_callback: bool,
        fail_logout: bool,
        login_options: Option<LoginOptions>,
        logout_options: Option<LogoutOptions>,
        phase_rx: Option<watch::Receiver<SessionPhase>>,
        phase_during_callback: Option<SessionPhase>,
    }

    #[derive(Clone, Default)]
    struct FakeProvider {
        state: Arc<StdMutex<ProviderState>>,
        log: Log,
    }

    impl FakeProvider {
        fn record(&self, call: &'static str) {
            self.log.lock().unwrap().push(call);
        }

        fn signed_in(self) -> Self {
            {
                let mut state = self.state.lock().unwrap();
                state.authenticated = true;
                state.profile = Some(ada());
            }
            self
        }

        fn with_claims(self, claims: serde_json::Value) -> Self {
            self.state.lock().unwrap().claims = Some(ClaimSet::try_from(claims).unwrap());
            self
        }
    }

    impl IdentityProvider for FakeProvider {
        async fn is_authenticated(&self) -> Result<bool, ProviderError> {
            self.record("is_authenticated");
            tokio::task::yield_now().await;
            Ok(self.state.lock().unwrap().authenticated)
        }

        async fn get_user(&self) -> Result<Option<Profile>, ProviderError> {
            self.record("get_user");
            Ok(self.state.lock().unwrap().profile.clone())
        }

        async fn get_id_token_claims(&self) -> Result<Option<ClaimSet>, ProviderError> {
            self.record("get_id_token_claims");
            Ok(self.state.lock().unwrap().claims.clone())
        }

        async fn login_with_redirect(&self, options: LoginOptions) -> Result<(), ProviderError> {
            self.record("login_with_redirect");
            self.state.lock().unwrap().login_options = Some(options);
            Ok(())
        }

        async fn handle_redirect_callback(&self) -> Result<(), ProviderError> {
            self.record("handle_redirect_callback");
            let mut state = self.state.lock().unwrap();
            let phase = state.phase_rx.as_ref().map(|rx| *rx.borrow());
            state.phase_during_callback = phase;
            if state.fail_callback {
                return Err("invalid_grant".into());
            }
            state.authenticated = true;
            state.profile = Some(ada());
            Ok(())
        }

        async fn logout(&self, options: LogoutOptions) -> Result<(), ProviderError> {
            self.record("logout");
            let mut state = self.state.lock().unwrap();
            state.logout_options = Some(options);
            if state.fail_logout {
                return Err("network unreachable".into());
            }
            state.authenticated = false;
            Ok(())
        }
    }

    struct FakeFactory {
        provider: FakeProvider,
        created: Arc<AtomicUsize>,
        fail: bool,
    }

    impl ClientFactory for FakeFactory {
        type Client = FakeProvider;

        async fn create(&self, _config: &ProviderConfig) -> Result<FakeProvider, ProviderError> {
            self.created.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err("unknown tenant".into());
            }
            Ok(self.provider.clone())
        }
    }

    struct FakeWindow {
        url: StdMutex<Url>,
        log: Log,
        phase_rx: StdMutex<Option<watch::Receiver<SessionPhase>>>,
        phases_at_replace: StdMutex<Vec<SessionPhase>>,
    }

    impl FakeWindow {
        fn url(&self) -> String {
            self.url.lock().unwrap().to_string()
        }
    }

    impl BrowserWindow for FakeWindow {
        fn location(&self) -> Url {
            self.url.lock().unwrap().clone()
        }

        fn replace_location(&self, url: &Url) {
            self.log.lock().unwrap().push("replace_location");
            if let Some(rx) = self.phase_rx.lock().unwrap().as_ref() {
                self.phases_at_replace.lock().unwrap().push(*rx.borrow());
            }
            *self.url.lock().unwrap() = url.clone();
        }
    }

    struct Harness {
        controller: SessionController<FakeFactory>,
        provider: FakeProvider,
        window: Arc<FakeWindow>,
        created: Arc<AtomicUsize>,
    }

    impl Harness {
        fn calls(&self) -> Vec<&'static str> {
            self.provider.log.lock().unwrap().clone()
        }
    }

    fn ada() -> Profile {
        Profile::new("google-oauth2|1001")
            .with_name("Ada Lovelace")
            .with_email("ada@example.com")
    }

    fn test_config() -> ProviderConfig {
        ProviderConfig::new(
            "tenant.example.com",
            "client-1",
            "https://app.example".parse().unwrap(),
        )
    }

    fn harness(provider: FakeProvider, url: &str) -> Harness {
        build(provider, url, false)
    }

    fn build(provider: FakeProvider, url: &str, fail_factory: bool) -> Harness {
        let created = Arc::new(AtomicUsize::new(0));
        let window = Arc::new(FakeWindow {
            url: StdMutex::new(url.parse().unwrap()),
            log: provider.log.clone(),
            phase_rx: StdMutex::new(None),
            phases_at_replace: StdMutex::new(Vec::new()),
        });
        let factory = FakeFactory {
            provider: provider.clone(),
            created: created.clone(),
            fail: fail_factory,
        };
        let controller = SessionController::new(test_config(), factory, SessionStore::new())
            .with_window(window.clone());
        Harness {
            controller,
            provider,
            window,
            created,
        }
    }

    #[tokio::test]
    async fn no_window_is_a_silent_noop() {
        let created = Arc::new(AtomicUsize::new(0));
        let factory = FakeFactory {
            provider: FakeProvider::default().signed_in(),
            created: created.clone(),
            fail: false,
        };
        let controller = SessionController::new(test_config(), factory, SessionStore::new());

        controller.initialize().await.unwrap();

        assert_eq!(controller.session(), Session::signed_out());
        assert_eq!(controller.phase(), SessionPhase::Unknown);
        assert_eq!(created.load(Ordering::SeqCst), 0);
        assert!(!controller.is_initialized().await);
    }

    #[tokio::test]
    async fn plain_load_signed_out() {
        let h = harness(FakeProvider::default(), "https://app.example/");

        h.controller.initialize().await.unwrap();

        assert_eq!(h.controller.session(), Session::signed_out());
        assert_eq!(h.controller.phase(), SessionPhase::Unauthenticated);
        assert_eq!(h.calls(), vec!["is_authenticated"]);
        assert!(h.controller.is_initialized().await);
    }

    #[tokio::test]
    async fn redirect_is_processed_before_auth_check() {
        let provider = FakeProvider::default()
            .with_claims(json!({ "https://syllabusy.app/google_access_token": "tok123" }));
        let h = harness(provider, "https://app.example/callback?code=abc&state=xyz");

        h.controller.initialize().await.unwrap();

        assert_eq!(h.window.url(), "https://app.example/callback");
        assert_eq!(
            h.calls(),
            vec![
                "handle_redirect_callback",
                "replace_location",
                "is_authenticated",
                "get_user",
                "get_id_token_claims",
            ]
        );

        let session = h.controller.session();
        assert!(session.is_authenticated());
        assert_eq!(session.profile(), Some(&ada()));
        assert_eq!(
            session.delegated_tokens(),
            Some(&TokenPair::new(Some("tok123".into()), None))
        );
        assert_eq!(h.controller.phase(), SessionPhase::Authenticated);
    }

    #[tokio::test]
    async fn phase_is_redirect_pending_while_callback_runs() {
        let h = harness(FakeProvider::default(), "https://app.example/?code=abc&state=xyz");
        let mut rx = h.controller.subscribe_phase();
        h.provider.state.lock().unwrap().phase_rx = Some(h.controller.subscribe_phase());

        h.controller.initialize().await.unwrap();

        assert_eq!(
            h.provider.state.lock().unwrap().phase_during_callback,
            Some(SessionPhase::RedirectPending)
        );
        assert_eq!(h.controller.phase(), SessionPhase::Authenticated);
        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), SessionPhase::Authenticated);
    }

    #[tokio::test]
    async fn code_without_state_is_not_a_redirect() {
        let h = harness(FakeProvider::default(), "https://app.example/?code=abc");

        h.controller.initialize().await.unwrap();

        assert!(!h.calls().contains(&"handle_redirect_callback"));
        assert_eq!(h.window.url(), "https://app.example/?code=abc");
        assert!(!h.controller.session().is_authenticated());
    }

    #[tokio::test]
    async fn reinitialize_with_cached_session_is_stable() {
        let provider = FakeProvider::default().signed_in().with_claims(json!({
            "https://syllabusy.app/google_access_token": "at",
            "https://syllabusy.app/google_refresh_token": "rt",
        }));
        let h = harness(provider, "https://app.example/courses");

        h.controller.initialize().await.unwrap();
        let first = h.controller.session();
        h.controller.initialize().await.unwrap();
        let second = h.controller.session();

        assert!(first.is_authenticated());
        assert!(second.is_authenticated());
        assert_eq!(first.profile(), second.profile());
        assert_eq!(first, second);
        assert_eq!(h.created.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn authenticated_without_custom_claims_is_not_an_error() {
        let h = harness(FakeProvider::default().signed_in(), "https://app.example/");

        h.controller.initialize().await.unwrap();

        let session = h.controller.session();
        assert!(session.is_authenticated());
        assert!(session.delegated_tokens().is_some_and(TokenPair::is_empty));
    }

    #[tokio::test]
    async fn factory_failure_leaves_session_signed_out() {
        let h = build(FakeProvider::default(), "https://app.example/", true);

        let err = h.controller.initialize().await.unwrap_err();

        assert!(matches!(err, Error::ProviderInit { stage: "client construction", .. }));
        assert_eq!(h.controller.session(), Session::signed_out());
        assert_eq!(h.controller.phase(), SessionPhase::Unauthenticated);
        assert!(matches!(
            h.controller.login(h.controller.login_options()).await,
            Err(Error::NotInitialized)
        ));
    }

    #[tokio::test]
    async fn failed_callback_still_cleans_url() {
        let provider = FakeProvider::default();
        provider.state.lock().unwrap().fail_callback = true;
        let h = harness(provider, "https://app.example/?code=stale&state=xyz");

        let err = h.controller.initialize().await.unwrap_err();

        assert!(matches!(err, Error::ProviderInit { stage: "redirect callback", .. }));
        assert_eq!(h.window.url(), "https://app.example/");
        assert!(!h.calls().contains(&"is_authenticated"));
        assert_eq!(h.controller.session(), Session::signed_out());
    }

    #[tokio::test]
    async fn error_redirect_fails_initialization() {
        let h = harness(
            FakeProvider::default(),
            "https://app.example/?error=access_denied&error_description=denied&state=xyz",
        );

        let err = h.controller.initialize().await.unwrap_err();

        let Error::ProviderInit { stage, source } = err else {
            panic!("expected ProviderInit");
        };
        assert_eq!(stage, "redirect callback");
        assert!(source.to_string().contains("access_denied"));
        assert_eq!(h.window.url(), "https://app.example/");
        assert_eq!(h.calls(), vec!["replace_location"]);
    }

    #[tokio::test]
    async fn error_redirect_is_pending_until_url_is_cleaned() {
        let h = harness(
            FakeProvider::default(),
            "https://app.example/?error=login_required&state=xyz",
        );
        *h.window.phase_rx.lock().unwrap() = Some(h.controller.subscribe_phase());

        h.controller.initialize().await.unwrap_err();

        assert_eq!(
            *h.window.phases_at_replace.lock().unwrap(),
            vec![SessionPhase::RedirectPending]
        );
        assert_eq!(h.controller.phase(), SessionPhase::Unauthenticated);
    }

    #[tokio::test]
    async fn missing_profile_is_an_init_error() {
        let provider = FakeProvider::default();
        provider.state.lock().unwrap().authenticated = true;
        let h = harness(provider, "https://app.example/");

        let err = h.controller.initialize().await.unwrap_err();

        assert!(matches!(err, Error::ProviderInit { stage: "profile load", .. }));
        assert_eq!(h.controller.session(), Session::signed_out());
    }

    #[tokio::test]
    async fn login_before_initialize_fails() {
        let h = harness(FakeProvider::default(), "https://app.example/");

        let result = h.controller.login(h.controller.login_options()).await;

        assert!(matches!(result, Err(Error::NotInitialized)));
        assert!(h.calls().is_empty());
    }

    #[tokio::test]
    async fn login_redirects_with_offline_consent() {
        let h = harness(FakeProvider::default(), "https://app.example/");
        h.controller.initialize().await.unwrap();

        h.controller.login(h.controller.login_options()).await.unwrap();

        assert_eq!(h.controller.phase(), SessionPhase::RedirectPending);
        let options = h.provider.state.lock().unwrap().login_options.clone().unwrap();
        assert_eq!(options.connection, "google-oauth2");
        assert_eq!(options.access_type.as_deref(), Some("offline"));
        assert_eq!(options.prompt.as_deref(), Some("consent"));
        assert!(!h.controller.session().is_authenticated());
    }

    #[tokio::test]
    async fn login_waits_for_inflight_initialize() {
        let h = harness(FakeProvider::default(), "https://app.example/");

        let (init, login) = tokio::join!(
            h.controller.initialize(),
            h.controller.login(h.controller.login_options()),
        );

        init.unwrap();
        login.unwrap();
        assert_eq!(h.calls(), vec!["is_authenticated", "login_with_redirect"]);
        assert_eq!(h.controller.phase(), SessionPhase::RedirectPending);
    }

    #[tokio::test]
    async fn logout_clears_session_and_returns_to_origin() {
        let provider = FakeProvider::default()
            .signed_in()
            .with_claims(json!({ "https://syllabusy.app/google_access_token": "at" }));
        let h = harness(provider, "https://app.example/courses");
        h.controller.initialize().await.unwrap();
        assert!(h.controller.session().is_authenticated());

        h.controller.logout().await.unwrap();

        assert_eq!(h.controller.session(), Session::signed_out());
        assert_eq!(h.controller.phase(), SessionPhase::Unauthenticated);
        let options = h.provider.state.lock().unwrap().logout_options.clone().unwrap();
        assert_eq!(options.return_to, "https://app.example");
    }

    #[tokio::test]
    async fn logout_clears_locally_when_provider_fails() {
        let provider = FakeProvider::default().signed_in();
        provider.state.lock().unwrap().fail_logout = true;
        let h = harness(provider, "https://app.example/");
        h.controller.initialize().await.unwrap();

        let err = h.controller.logout().await.unwrap_err();

        assert!(matches!(err, Error::Provider { operation: "logout", .. }));
        assert_eq!(h.controller.session(), Session::signed_out());
    }

    #[tokio::test]
    async fn logout_without_client_still_clears() {
        let h = harness(FakeProvider::default(), "https://app.example/");

        let result = h.controller.logout().await;

        assert!(matches!(result, Err(Error::NotInitialized)));
        assert_eq!(h.controller.session(), Session::signed_out());
        assert_eq!(h.controller.phase(), SessionPhase::Unauthenticated);
    }

    #[tokio::test]
    async fn store_subscribers_see_sign_in() {
        let h = harness(FakeProvider::default().signed_in(), "https://app.example/");
        let mut rx = h.controller.store().subscribe();

        h.controller.initialize().await.unwrap();

        rx.changed().await.unwrap();
        assert!(rx.borrow_and_update().is_authenticated());
    }

    /// Records the level of every event and whether it carries a `user_id` field.
    struct LevelRecorder(Arc<StdMutex<Vec<(tracing::Level, bool)>>>);

    impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for LevelRecorder {
        fn on_event(&self, event: &tracing::Event<'_>, _ctx: tracing_subscriber::layer::Context<'_, S>) {
            let meta = event.metadata();
            self.0
                .lock()
                .unwrap()
                .push((*meta.level(), meta.fields().field("user_id").is_some()));
        }
    }

    #[tokio::test]
    async fn user_id_is_only_logged_at_debug() {
        use tracing_subscriber::layer::SubscriberExt;

        let events = Arc::new(StdMutex::new(Vec::new()));
        let subscriber = tracing_subscriber::registry().with(LevelRecorder(events.clone()));
        let _guard = tracing::subscriber::set_default(subscriber);

        let h = harness(FakeProvider::default().signed_in(), "https://app.example/");
        h.controller.initialize().await.unwrap();
        h.controller.logout().await.unwrap();

        let events = events.lock().unwrap();
        let with_user_id: Vec<_> = events.iter().filter(|(_, has_id)| *has_id).collect();
        assert!(!with_user_id.is_empty());
        assert!(with_user_id.iter().all(|(level, _)| *level == tracing::Level::DEBUG));
    }
}
