//! Refresh orchestrator
//!
//! One long-lived loop owns the active [`Cycle`]. A cycle either lists the
//! user's PRs or, without usable credentials, offers the device flow setup.
//! On every trigger (timer tick, finished authentication, manual refresh)
//! the loop cancels the active cycle, waits for its task to finish, and only
//! then starts the next one:
//!
//! ```text
//!           ┌──────────── timer / refresh / auth completed ───────────┐
//!           ▼                                                         │
//!   ┌──────────────┐  credentials   ┌─────────┐   ok    ┌────────────┐ │
//!   │ start cycle  │ ─────────────► │ listing │ ──────► │ displaying │─┤
//!   └──────────────┘                └─────────┘         └────────────┘ │
//!           │ none                    │ 401    │ error                 │
//!           ▼                         ▼        ▼                       │
//!   ┌──────────────┐  GitHub setup ┌────────┐ cooldown                 │
//!   │ setup entries│ ◄──────────── │  Idle  │                          │
//!   └──────────────┘               └────────┘                          │
//!           │ device flow ok ──────────────────────────────────────────┘
//! ```
//!
//! The entry selector sits behind an async mutex that the cycle holds for
//! its whole lifetime, and every display mutation checks the cycle's token
//! first. A superseded cycle therefore can't touch the menu once the next
//! one has started.

use crate::aggregator::PrAggregator;
use crate::desktop::Desktop;
use crate::device_flow::{AuthError, DeviceAuthFlow, DeviceFlowSettings};
use crate::menu::{present, EntryAction, MenuPlan, MenuSurface, FETCHING_LABEL, FETCH_FAILED_LABEL};
use crate::selector::{EntrySelector, Selection};
use gh_client::{ApiError, GitHubClient, OAuthClient, OctocrabClient};
use gh_pr_config::{AppConfig, CredentialStore, Credentials};
use log::{debug, error, info, warn};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

/// Builds an authenticated REST client from stored credentials
pub trait ClientFactory: Send + Sync {
    fn client_for(&self, credentials: &Credentials) -> Result<Arc<dyn GitHubClient>, ApiError>;
}

/// Factory for octocrab clients against the configured API root
#[derive(Debug, Clone)]
pub struct OctocrabClientFactory {
    base_url: String,
    timeout: Duration,
}

impl OctocrabClientFactory {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            base_url: base_url.into(),
            timeout,
        }
    }
}

impl ClientFactory for OctocrabClientFactory {
    fn client_for(&self, credentials: &Credentials) -> Result<Arc<dyn GitHubClient>, ApiError> {
        let client = OctocrabClient::with_token(&credentials.token, &self.base_url, self.timeout)?;
        Ok(Arc::new(client))
    }
}

/// Collaborators used by every cycle
#[derive(Clone)]
pub struct Services {
    pub store: Arc<dyn CredentialStore>,
    pub desktop: Arc<dyn Desktop>,
    pub menu: Arc<dyn MenuSurface>,
    pub oauth: Arc<dyn OAuthClient>,
    pub clients: Arc<dyn ClientFactory>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshSettings {
    /// Time between two scheduled refreshes
    pub refresh_interval: Duration,
    /// How long a failed listing keeps its cycle before giving up
    pub fetch_error_cooldown: Duration,
    /// Delay between two processed notifications
    pub notification_pacing: Duration,
    pub device_flow: DeviceFlowSettings,
}

impl RefreshSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            refresh_interval: config.refresh_interval(),
            fetch_error_cooldown: config.fetch_error_cooldown(),
            notification_pacing: config.notification_pacing(),
            device_flow: DeviceFlowSettings::from_config(config),
        }
    }
}

/// Why a cycle was started
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshReason {
    Startup,
    Timer,
    AuthCompleted,
    Manual,
}

/// Cloneable trigger to restart the active cycle
#[derive(Debug, Clone)]
pub struct RefreshHandle {
    tx: mpsc::UnboundedSender<RefreshReason>,
}

impl RefreshHandle {
    /// Request a new cycle; false once the orchestrator has stopped
    pub fn refresh(&self, reason: RefreshReason) -> bool {
        self.tx.send(reason).is_ok()
    }
}

/// A running cycle and the means to stop it
struct Cycle {
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl Cycle {
    /// Cancel and wait until the cycle's task has stopped
    async fn teardown(self) {
        self.cancel.cancel();
        if let Err(e) = self.task.await {
            if e.is_panic() {
                error!("Refresh cycle panicked: {}", e);
            }
        }
    }
}

/// State shared between the loop and its cycles
struct CycleContext {
    services: Services,
    settings: RefreshSettings,
    selector: Mutex<EntrySelector>,
    refresh: RefreshHandle,
    shutdown: CancellationToken,
}

/// A running device flow, polled alongside the entry selector
type AuthFuture<'a> = Pin<Box<dyn Future<Output = Result<Credentials, AuthError>> + Send + 'a>>;

/// How a listing attempt ended
enum Listing {
    Done,
    NeedsSetup,
}

pub struct RefreshOrchestrator {
    context: Arc<CycleContext>,
    refresh_rx: mpsc::UnboundedReceiver<RefreshReason>,
}

impl RefreshOrchestrator {
    /// Create the orchestrator; cancelling `shutdown` stops [`run`](Self::run)
    pub fn new(services: Services, settings: RefreshSettings, shutdown: CancellationToken) -> Self {
        let (tx, refresh_rx) = mpsc::unbounded_channel();
        let context = CycleContext {
            services,
            settings,
            selector: Mutex::new(EntrySelector::new()),
            refresh: RefreshHandle { tx },
            shutdown,
        };
        Self {
            context: Arc::new(context),
            refresh_rx,
        }
    }

    pub fn refresh_handle(&self) -> RefreshHandle {
        self.context.refresh.clone()
    }

    /// Drive cycles until shutdown
    pub async fn run(mut self) {
        let period = self
            .context
            .settings
            .refresh_interval
            .max(Duration::from_millis(1));
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately
        ticker.tick().await;

        let shutdown = self.context.shutdown.clone();
        let mut reason = RefreshReason::Startup;
        loop {
            let cycle = self.start_cycle(reason);

            let next = tokio::select! {
                _ = shutdown.cancelled() => None,
                _ = ticker.tick() => Some(RefreshReason::Timer),
                Some(reason) = self.refresh_rx.recv() => Some(reason),
            };

            cycle.teardown().await;

            match next {
                Some(next) => {
                    if next != RefreshReason::Timer {
                        ticker.reset();
                    }
                    reason = next;
                }
                None => break,
            }
        }
        info!("Refresh loop stopped");
    }

    fn start_cycle(&self, reason: RefreshReason) -> Cycle {
        info!("Starting refresh cycle ({:?})", reason);
        let cancel = self.context.shutdown.child_token();
        let context = self.context.clone();
        let task = tokio::spawn({
            let cancel = cancel.clone();
            async move { context.run_cycle(&cancel).await }
        });
        Cycle { cancel, task }
    }
}

impl CycleContext {
    async fn run_cycle(&self, cancel: &CancellationToken) {
        let mut selector = self.selector.lock().await;
        if cancel.is_cancelled() {
            return;
        }

        let listing = if self.services.store.exists() {
            self.list(cancel, &mut selector).await
        } else {
            Listing::NeedsSetup
        };

        if let Listing::NeedsSetup = listing {
            self.setup(cancel, &mut selector).await;
        }
        debug!("Refresh cycle finished");
    }

    async fn list(&self, cancel: &CancellationToken, selector: &mut EntrySelector) -> Listing {
        let credentials = match self.services.store.load() {
            Ok(credentials) => credentials,
            Err(e) => {
                warn!("Could not load credentials: {:#}", e);
                return Listing::NeedsSetup;
            }
        };

        let Ok(actions) = present(
            self.services.menu.as_ref(),
            cancel,
            selector,
            MenuPlan::status(FETCHING_LABEL),
        ) else {
            return Listing::Done;
        };

        let result = match self.services.clients.client_for(&credentials) {
            Ok(client) => {
                let aggregator =
                    PrAggregator::new(client.as_ref(), self.settings.notification_pacing);
                self.interact(cancel, selector, &actions, aggregator.list_user_prs(cancel))
                    .await
            }
            Err(e) => Some(Err(e.into())),
        };

        let error = match result {
            None => return Listing::Done,
            Some(Ok(prs)) => {
                let Ok(actions) =
                    present(self.services.menu.as_ref(), cancel, selector, MenuPlan::listing(&prs))
                else {
                    return Listing::Done;
                };
                self.interact(cancel, selector, &actions, std::future::pending::<()>())
                    .await;
                return Listing::Done;
            }
            Some(Err(e)) => e,
        };

        if error.is_unauthorized() {
            warn!("Stored token was rejected, asking for setup");
            return Listing::NeedsSetup;
        }
        if cancel.is_cancelled() {
            return Listing::Done;
        }

        error!("Could not fetch PRs: {}", error);
        let Ok(actions) = present(
            self.services.menu.as_ref(),
            cancel,
            selector,
            MenuPlan::status(FETCH_FAILED_LABEL),
        ) else {
            return Listing::Done;
        };
        let cooldown = tokio::time::sleep(self.settings.fetch_error_cooldown);
        if self.interact(cancel, selector, &actions, cooldown).await.is_some() {
            // The status stays up until the next trigger, Quit included
            debug!("Fetch error cooldown elapsed, waiting for the next refresh");
            self.interact(cancel, selector, &actions, std::future::pending::<()>())
                .await;
        }
        Listing::Done
    }

    /// Offer setup, run the device flow when asked to
    async fn setup(&self, cancel: &CancellationToken, selector: &mut EntrySelector) {
        let Ok(actions) = present(self.services.menu.as_ref(), cancel, selector, MenuPlan::setup())
        else {
            return;
        };

        let flow = DeviceAuthFlow::new(
            self.services.oauth.clone(),
            self.services.store.clone(),
            self.services.desktop.clone(),
            self.settings.device_flow.clone(),
        );
        let mut auth: Option<AuthFuture<'_>> = None;

        loop {
            tokio::select! {
                _ = cancel.cancelled() => return,
                result = next_output(&mut auth) => {
                    auth = None;
                    match result {
                        Ok(_) => {
                            info!("GitHub setup completed");
                            self.refresh.refresh(RefreshReason::AuthCompleted);
                            return;
                        }
                        Err(e) => {
                            if let Some((title, message)) = e.dialog() {
                                self.services.desktop.show_error(title, &message);
                            }
                        }
                    }
                }
                selection = selector.select_first() => {
                    match selected(&actions, selection) {
                        Some(EntryAction::StartSetup) if auth.is_none() => {
                            info!("Starting GitHub setup");
                            auth = Some(Box::pin(flow.authenticate(cancel)));
                        }
                        Some(EntryAction::StartSetup) => debug!("GitHub setup already running"),
                        Some(action) => self.perform(action),
                        None => {}
                    }
                }
            }
        }
    }

    /// Run `fut` while serving entry clicks, `None` if the cycle was canceled
    async fn interact<F: Future>(
        &self,
        cancel: &CancellationToken,
        selector: &mut EntrySelector,
        actions: &[EntryAction],
        fut: F,
    ) -> Option<F::Output> {
        tokio::pin!(fut);
        loop {
            tokio::select! {
                _ = cancel.cancelled() => return None,
                out = &mut fut => return Some(out),
                selection = selector.select_first() => {
                    if let Some(action) = selected(actions, selection) {
                        self.perform(action);
                    }
                }
            }
        }
    }

    fn perform(&self, action: &EntryAction) {
        match action {
            EntryAction::Quit => {
                info!("Quit selected");
                self.shutdown.cancel();
            }
            EntryAction::Open(pr) => {
                if let Err(e) = self.services.desktop.open_url(&pr.url) {
                    self.services
                        .desktop
                        .show_error("Error opening the browser", &e.to_string());
                }
            }
            EntryAction::StartSetup => debug!("Setup entry outside of setup"),
        }
    }
}

fn selected(actions: &[EntryAction], selection: Selection) -> Option<&EntryAction> {
    match selection {
        Selection::Entry(index) => actions.get(index),
        Selection::Invalid => None,
    }
}

/// Await the future in `slot`, or never complete when there is none
async fn next_output<F: Future + Unpin>(slot: &mut Option<F>) -> F::Output {
    match slot {
        Some(fut) => fut.await,
        None => std::future::pending().await,
    }
}
