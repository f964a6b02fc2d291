//! Application controller
//!
//! [`App`] is the single owner of the tip store and the session. Every
//! mutation goes through `&mut App`; work that finishes later (rating
//! confirmations, tips broadcast by other instances) comes back as an
//! [`AppEvent`] and is applied by [`App::handle_event`]. Failures never
//! escape an action: they become the store's error banner.

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::auth::IdentityVerifier;
use crate::broadcast::{TipBroadcast, TipSubscription};
use crate::error::{user_message, FairfareError, Result, UserAction};
use crate::models::{GoogleUser, NewTip, Tip, TipId};
use crate::providers::Geocoder;
use crate::rating::{PendingRating, RatingOutcome};
use crate::remote::TipSource;
use crate::session::{SessionContext, SlotStore};
use crate::store::TipStore;

/// Completion delivered back to the controller
#[derive(Debug)]
pub enum AppEvent {
    /// The remote answered a rating change
    RatingSettled {
        pending: PendingRating,
        result: Result<()>,
    },
    /// Another instance published a tip
    TipReceived(Tip),
}

/// What applying an [`AppEvent`] did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventOutcome {
    Rating(RatingOutcome),
    TipMerged { tip_id: TipId, inserted: bool },
}

/// External collaborators of the controller
#[derive(Clone)]
pub struct AppServices {
    pub source: Arc<dyn TipSource>,
    pub verifier: Arc<dyn IdentityVerifier>,
    pub broadcast: Arc<dyn TipBroadcast>,
    pub slots: Arc<dyn SlotStore>,
    /// Used to place new tips on the map; optional
    pub geocoder: Option<Arc<dyn Geocoder>>,
}

/// Owner of all client-side state
pub struct App {
    store: TipStore,
    session: SessionContext,
    services: AppServices,
    search_term: String,
    loading: bool,
    subscription: Option<TipSubscription>,
    events_tx: mpsc::UnboundedSender<AppEvent>,
    events_rx: mpsc::UnboundedReceiver<AppEvent>,
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("tips", &self.store.len())
            .field("authenticated", &self.session.is_authenticated())
            .field("channel", &self.services.broadcast.channel_name())
            .finish()
    }
}

impl App {
    /// Create a controller. The broadcast subscription is opened here so
    /// tips published from now on are not missed; forwarding starts in
    /// [`start`](Self::start).
    pub fn new(services: AppServices) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let subscription = Some(services.broadcast.subscribe());
        Self {
            store: TipStore::new(),
            session: SessionContext::anonymous(),
            services,
            search_term: String::new(),
            loading: false,
            subscription,
            events_tx,
            events_rx,
        }
    }

    /// Restore the session, load the tips and start listening for
    /// broadcasts. Returns whether the tips loaded.
    pub async fn start(&mut self) -> bool {
        self.restore_session();
        self.listen_for_broadcasts();
        self.load_tips().await
    }

    /// Restore the persisted session (fail-closed)
    pub fn restore_session(&mut self) {
        self.session = match SessionContext::restore(self.services.slots.as_ref()) {
            Ok(session) => session,
            Err(e) => {
                tracing::warn!("Could not read the stored session: {:#}", e);
                SessionContext::anonymous()
            }
        };
    }

    fn listen_for_broadcasts(&mut self) {
        let Some(mut subscription) = self.subscription.take() else {
            return;
        };
        let tx = self.events_tx.clone();
        let channel = self.services.broadcast.channel_name().to_string();
        tokio::spawn(async move {
            use futures::StreamExt;
            while let Some(tip) = subscription.next().await {
                tracing::debug!(tip_id = tip.id, channel = %channel, "Received broadcast tip");
                if tx.send(AppEvent::TipReceived(tip)).is_err() {
                    break;
                }
            }
        });
    }

    /// Fetch the full collection. On failure the banner is set and the
    /// current collection is kept.
    pub async fn load_tips(&mut self) -> bool {
        self.loading = true;
        let result = self.services.source.fetch_all().await;
        self.loading = false;

        match result {
            Ok(tips) => {
                tracing::info!(count = tips.len(), "Loaded tips");
                self.store.load(tips);
                true
            }
            Err(e) => {
                tracing::error!("Failed to load tips: {:#}", e);
                self.store.set_error(user_message(UserAction::LoadTips, &e));
                false
            }
        }
    }

    /// Exchange a sign-in credential for a persisted session
    pub async fn login(&mut self, credential: &str) -> bool {
        match self.try_login(credential).await {
            Ok(session) => {
                self.session = session;
                true
            }
            Err(e) => {
                tracing::error!("Authentication failed: {:#}", e);
                self.store.set_error(user_message(UserAction::Login, &e));
                false
            }
        }
    }

    async fn try_login(&self, credential: &str) -> Result<SessionContext> {
        let identity = self.services.verifier.verify(credential).await?;
        SessionContext::establish(self.services.slots.as_ref(), identity.user, identity.token)
    }

    /// Sign out and clear both persisted slots
    pub fn logout(&mut self) {
        if let Err(e) = self.session.teardown(self.services.slots.as_ref()) {
            tracing::warn!("Failed to clear stored session: {:#}", e);
        }
    }

    /// Create a tip, publish it to other instances and prepend it locally
    pub async fn submit_tip(&mut self, new_tip: NewTip) -> Option<Tip> {
        match self.try_submit(new_tip).await {
            Ok(tip) => Some(tip),
            Err(e) => {
                tracing::error!("Failed to add tip: {:#}", e);
                self.store.set_error(user_message(UserAction::SubmitTip, &e));
                None
            }
        }
    }

    async fn try_submit(&mut self, new_tip: NewTip) -> Result<Tip> {
        self.session.require()?;
        new_tip.validate()?;

        let coordinates = match &self.services.geocoder {
            Some(geocoder) => match geocoder.geocode(&new_tip.origin).await {
                Ok(coordinates) => coordinates,
                Err(e) => {
                    tracing::warn!("Geocoding {:?} failed: {:#}", new_tip.origin, e);
                    None
                }
            },
            None => None,
        };

        let tip = self
            .services
            .source
            .create(&new_tip, coordinates, &self.session)
            .await?;

        if let Err(e) = self.services.broadcast.publish(&tip) {
            tracing::warn!(tip_id = tip.id, "Failed to broadcast new tip: {:#}", e);
        }
        self.store.insert_created(tip.clone());
        tracing::info!(tip_id = tip.id, "Tip added");
        Ok(tip)
    }

    /// Apply a rating change now and confirm it in the background.
    ///
    /// The confirmation arrives later as [`AppEvent::RatingSettled`].
    pub fn rate(&mut self, tip_id: TipId, delta: i64) -> bool {
        let Some(pending) = self.begin_rating(tip_id, delta) else {
            return false;
        };

        let source = Arc::clone(&self.services.source);
        let session = self.session.clone();
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            let result = source.update_rating(pending.tip_id(), pending.delta(), &session).await;
            if tx.send(AppEvent::RatingSettled { pending, result }).is_err() {
                tracing::warn!("Rating confirmed after the application closed");
            }
        });
        true
    }

    /// Apply a rating change and wait for its confirmation
    pub async fn rate_and_confirm(&mut self, tip_id: TipId, delta: i64) -> Option<RatingOutcome> {
        let pending = self.begin_rating(tip_id, delta)?;
        let result = self
            .services
            .source
            .update_rating(pending.tip_id(), pending.delta(), &self.session)
            .await;
        Some(self.settle_rating(pending, result))
    }

    fn begin_rating(&mut self, tip_id: TipId, delta: i64) -> Option<PendingRating> {
        match self.store.begin_rating(tip_id, delta) {
            Ok(pending) => Some(pending),
            Err(e) => {
                tracing::warn!(tip_id, delta, "Rating not applied: {:#}", e);
                self.store.set_error(user_message(UserAction::Rate, &e));
                None
            }
        }
    }

    fn settle_rating(&mut self, pending: PendingRating, result: Result<()>) -> RatingOutcome {
        let tip_id = pending.tip_id();
        match result {
            Ok(()) => {
                self.store.commit_rating(&pending);
                RatingOutcome::Confirmed {
                    tip_id,
                    author: pending.author().to_string(),
                    reward: pending.reward(),
                }
            }
            Err(e) => {
                tracing::error!(tip_id, "Failed to update rating: {:#}", e);
                let message = user_message(UserAction::Rate, &e);
                self.store.rollback_rating(pending);
                self.store.set_error(message.clone());
                RatingOutcome::RolledBack { tip_id, message }
            }
        }
    }

    /// Apply one completion
    pub fn handle_event(&mut self, event: AppEvent) -> EventOutcome {
        match event {
            AppEvent::RatingSettled { pending, result } => {
                EventOutcome::Rating(self.settle_rating(pending, result))
            }
            AppEvent::TipReceived(tip) => {
                let tip_id = tip.id;
                let inserted = self.store.merge_broadcast(tip);
                EventOutcome::TipMerged { tip_id, inserted }
            }
        }
    }

    /// Wait for the next completion and apply it
    pub async fn next_event(&mut self) -> Option<EventOutcome> {
        let event = self.events_rx.recv().await?;
        Some(self.handle_event(event))
    }

    /// Apply every completion that is already waiting
    pub fn drain_events(&mut self) -> Vec<EventOutcome> {
        let mut outcomes = Vec::new();
        while let Ok(event) = self.events_rx.try_recv() {
            outcomes.push(self.handle_event(event));
        }
        outcomes
    }

    /// Set the search term used by [`visible_tips`](Self::visible_tips)
    pub fn set_search(&mut self, term: impl Into<String>) {
        self.search_term = term.into();
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    /// Tips matching the current search term
    pub fn visible_tips(&self) -> Vec<&Tip> {
        self.store.filter(&self.search_term)
    }

    /// Activate a tip (marker click). Returns its index in the collection.
    pub fn select(&mut self, tip_id: TipId) -> Option<usize> {
        self.store.select(tip_id)
    }

    /// Sign in state; submission needs an authenticated session
    pub fn current_user(&self) -> Option<&GoogleUser> {
        self.session.profile()
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    pub fn store(&self) -> &TipStore {
        &self.store
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Current error banner
    pub fn error(&self) -> Option<&str> {
        self.store.error()
    }

    pub fn dismiss_error(&mut self) {
        self.store.clear_error();
    }
}

/// Reject an empty credential before it reaches a verifier
pub fn check_credential(credential: &str) -> Result<&str> {
    let credential = credential.trim();
    if credential.is_empty() {
        return Err(FairfareError::Validation("credential cannot be empty".to_string()).into());
    }
    Ok(credential)
}
