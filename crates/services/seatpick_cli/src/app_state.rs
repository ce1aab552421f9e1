// --- File: crates/services/seatpick_cli/src/app_state.rs ---
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

use seatpick_booking::{
    BookingListViewModel, BookingOrchestrator, BookingSettings, CacheConsistencyManager,
    CancellationFlow, HttpReservationBackend, SpaceDirectory, ViewCache,
};
use seatpick_common::services::{ConfirmationGate, Notifier, PaymentGateway, ReservationBackend};
use seatpick_common::{ApiClient, FileCredentialStore, SeatpickError, SessionContext};
use seatpick_config::AppConfig;
use seatpick_payment::GatewayPaymentAdapter;

use crate::console::{ConsoleNotifier, TerminalGate};

/// Everything one run of the client shares between commands.
#[derive(Clone)]
pub struct AppState {
    pub session: Arc<SessionContext>,
    pub backend: Arc<dyn ReservationBackend>,
    pub gate: Arc<dyn ConfirmationGate>,
    pub notifier: Arc<dyn Notifier>,
    pub cache: Arc<ViewCache>,
    pub orchestrator: Arc<BookingOrchestrator>,
}

/// Builder for AppState. The confirmation gate defaults to asking on the terminal.
pub struct AppStateBuilder {
    config: Arc<AppConfig>,
    gate: Option<Arc<dyn ConfirmationGate>>,
}

impl AppStateBuilder {
    pub fn new(config: Arc<AppConfig>) -> Self {
        Self { config, gate: None }
    }

    pub fn with_gate(mut self, gate: Arc<dyn ConfirmationGate>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn build(self) -> Result<AppState, SeatpickError> {
        let config = self.config;
        let session = Arc::new(open_session(&config)?);
        let client = ApiClient::from_config(&config.api, session.clone())?;
        let backend: Arc<dyn ReservationBackend> = Arc::new(HttpReservationBackend::new(client));
        let payments: Arc<dyn PaymentGateway> =
            Arc::new(GatewayPaymentAdapter::from_config(&config)?);
        let gate = self
            .gate
            .unwrap_or_else(|| Arc::new(TerminalGate) as Arc<dyn ConfirmationGate>);
        let notifier: Arc<dyn Notifier> = Arc::new(ConsoleNotifier);

        let cache = ViewCache::new();
        let orchestrator = Arc::new(BookingOrchestrator::new(
            backend.clone(),
            payments,
            gate.clone(),
            notifier.clone(),
            CacheConsistencyManager::new(cache.clone()),
            BookingSettings::from_config(&config),
        ));

        Ok(AppState {
            session,
            backend,
            gate,
            notifier,
            cache,
            orchestrator,
        })
    }
}

fn open_session(config: &AppConfig) -> Result<SessionContext, SeatpickError> {
    match &config.session.credential_file {
        Some(file) => {
            let path = PathBuf::from(file);
            info!("credentials stored in {}", path.display());
            SessionContext::with_store(Arc::new(FileCredentialStore::new(path)))
        }
        None => {
            warn!("no credential file configured, the session ends with this process");
            Ok(SessionContext::in_memory())
        }
    }
}

impl AppState {
    pub fn builder(config: Arc<AppConfig>) -> AppStateBuilder {
        AppStateBuilder::new(config)
    }

    pub fn spaces(&self) -> SpaceDirectory {
        SpaceDirectory::new(self.backend.clone(), self.cache.clone())
    }

    pub fn bookings(&self) -> BookingListViewModel {
        BookingListViewModel::new(self.backend.clone(), self.cache.clone())
    }

    pub fn cancellation(&self) -> CancellationFlow {
        CancellationFlow::new(
            self.backend.clone(),
            self.cache.clone(),
            self.gate.clone(),
            self.notifier.clone(),
        )
    }

    /// Fails fast for commands that need a bearer credential.
    pub fn require_login(&self) -> Result<(), SeatpickError> {
        if self.session.is_logged_in() {
            Ok(())
        } else {
            Err(SeatpickError::AuthError(
                "not logged in, run `seatpick login` first".to_string(),
            ))
        }
    }
}
