//! The dashboard's emergency button.
//!
//! Pressing the button renders the message template and hands it to one
//! [`Transport`] per enabled channel. Deliveries run concurrently and race a
//! [`CancelToken`]. The button state is published on a `watch` channel so a
//! UI can follow `Ready -> Sending -> Sent -> Ready`.
//!
//! Runs natively on tokio and in the browser on `setTimeout` timers (see
//! [`crate::runtime`]). Browser transports are not `Send`, so the
//! [`Transport`] futures only carry a `Send` bound natively.

use std::pin::pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::future::{self, Either};
use thiserror::Error;
use tokio::sync::watch;
use tracing::{info, instrument, warn};

use crate::config::AppConfig;
use crate::contacts::Contact;
use crate::notify::{Notice, Notifier};
use crate::runtime;
use crate::settings::SettingsRecord;
use crate::template::{render_message, Location};

/// How long the success notice stays up, matching the reset delay default.
const SUCCESS_NOTICE_DURATION: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Channel {
    Sms,
    WhatsApp,
}

impl Channel {
    pub const ALL: [Channel; 2] = [Channel::Sms, Channel::WhatsApp];

    pub fn label(self) -> &'static str {
        match self {
            Channel::Sms => "SMS",
            Channel::WhatsApp => "WhatsApp",
        }
    }

    pub fn is_enabled(self, record: &SettingsRecord) -> bool {
        match self {
            Channel::Sms => record.send_sms,
            Channel::WhatsApp => record.send_whatsapp,
        }
    }
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DashboardState {
    #[default]
    Ready,
    Sending,
    Sent,
}

impl DashboardState {
    pub fn as_str(self) -> &'static str {
        match self {
            DashboardState::Ready => "ready",
            DashboardState::Sending => "sending",
            DashboardState::Sent => "sent",
        }
    }
}

/// What a transport is asked to deliver.
#[derive(Debug, Clone, PartialEq)]
pub struct Alert {
    /// Rendered message, `[location]` already substituted.
    pub message: String,
    pub recipients: Vec<Contact>,
    pub location: Option<Location>,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("gateway rejected the alert: {0}")]
    Rejected(String),

    #[error("gateway unavailable: {0}")]
    Unavailable(String),
}

/// A delivery gateway for one channel.
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
pub trait Transport: Send + Sync {
    fn channel(&self) -> Channel;

    async fn deliver(&self, alert: &Alert) -> Result<(), TransportError>;
}

/// Stands in for a real gateway: waits a fixed delay, then reports success.
#[derive(Debug, Clone)]
pub struct SimulatedTransport {
    channel: Channel,
    delay: Duration,
}

impl SimulatedTransport {
    pub fn new(channel: Channel, delay: Duration) -> Self {
        Self { channel, delay }
    }
}

#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
impl Transport for SimulatedTransport {
    fn channel(&self) -> Channel {
        self.channel
    }

    async fn deliver(&self, alert: &Alert) -> Result<(), TransportError> {
        runtime::sleep(self.delay).await;
        info!(
            channel = %self.channel,
            recipients = alert.recipients.len(),
            "simulated delivery"
        );
        Ok(())
    }
}

/// Cloneable cancellation flag. Every clone observes the same `cancel()`.
#[derive(Debug, Clone)]
pub struct CancelToken {
    tx: Arc<watch::Sender<bool>>,
    rx: watch::Receiver<bool>,
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

impl CancelToken {
    pub fn new() -> Self {
        let (tx, rx) = watch::channel(false);
        Self {
            tx: Arc::new(tx),
            rx,
        }
    }

    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once [`cancel`](Self::cancel) has been called on any clone.
    pub async fn cancelled(&self) {
        let mut rx = self.rx.clone();
        let closed = rx.wait_for(|cancelled| *cancelled).await.is_err();
        if closed {
            // Unreachable while `self` holds a sender; never resolve.
            std::future::pending::<()>().await;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelOutcome {
    pub channel: Channel,
    pub result: Result<(), TransportError>,
}

impl ChannelOutcome {
    pub fn is_delivered(&self) -> bool {
        self.result.is_ok()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DispatchReport {
    pub message: String,
    /// Contacts the alert was addressed to. Zero when none are configured.
    pub recipients: usize,
    /// One entry per enabled channel, ordered by channel. Empty when both
    /// toggles are off.
    pub outcomes: Vec<ChannelOutcome>,
}

impl DispatchReport {
    pub fn delivered(&self) -> impl Iterator<Item = Channel> + '_ {
        self.outcomes
            .iter()
            .filter(|o| o.is_delivered())
            .map(|o| o.channel)
    }

    pub fn failed(&self) -> impl Iterator<Item = &ChannelOutcome> {
        self.outcomes.iter().filter(|o| !o.is_delivered())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SendError {
    #[error("an alert is already being sent")]
    AlreadySending,

    #[error("no transport registered for {0}")]
    NoTransport(Channel),

    #[error("sending was cancelled")]
    Cancelled,

    #[error("every channel failed")]
    AllChannelsFailed(Vec<ChannelOutcome>),
}

/// Puts the button back to `Ready` unless disarmed, so a trigger future
/// dropped mid-send does not leave it stuck in `Sending`.
struct SendingGuard<'a> {
    state: &'a watch::Sender<DashboardState>,
    armed: bool,
}

impl<'a> SendingGuard<'a> {
    fn new(state: &'a watch::Sender<DashboardState>) -> Self {
        Self { state, armed: true }
    }

    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for SendingGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.state.send_replace(DashboardState::Ready);
        }
    }
}

/// Drives the emergency button.
pub struct Dispatcher {
    transports: Vec<Arc<dyn Transport>>,
    notifier: Arc<dyn Notifier>,
    success_reset: Duration,
    minimum_send_time: Duration,
    state: Arc<watch::Sender<DashboardState>>,
    generation: Arc<AtomicU64>,
}

impl Dispatcher {
    pub fn new(notifier: Arc<dyn Notifier>, success_reset: Duration) -> Self {
        let (state, _) = watch::channel(DashboardState::Ready);
        Self {
            transports: Vec::new(),
            notifier,
            success_reset,
            minimum_send_time: Duration::ZERO,
            state: Arc::new(state),
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Simulated SMS and WhatsApp gateways timed from `config`. Every send
    /// stays in `Sending` for the configured delay, even with nothing to
    /// deliver.
    pub fn simulated(config: &AppConfig, notifier: Arc<dyn Notifier>) -> Self {
        Channel::ALL.into_iter().fold(
            Self::new(notifier, config.success_reset())
                .with_minimum_send_time(config.send_delay()),
            |dispatcher, channel| {
                dispatcher.with_transport(Arc::new(SimulatedTransport::new(
                    channel,
                    config.send_delay(),
                )))
            },
        )
    }

    /// Keeps the button in `Sending` for at least `duration` per send.
    pub fn with_minimum_send_time(mut self, duration: Duration) -> Self {
        self.minimum_send_time = duration;
        self
    }

    /// Registers `transport`, replacing any earlier one for the same channel.
    pub fn with_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        let channel = transport.channel();
        self.transports.retain(|t| t.channel() != channel);
        self.transports.push(transport);
        self
    }

    pub fn state(&self) -> DashboardState {
        *self.state.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<DashboardState> {
        self.state.subscribe()
    }

    /// Sends the alert described by `record`.
    ///
    /// Refused while another send is in flight. An empty contact list or two
    /// disabled toggles still complete; the report shows what went out. On
    /// success the state becomes `Sent` and returns to `Ready` after the
    /// reset delay, unless a newer trigger has happened by then. Every
    /// failure path returns to `Ready`, including dropping the future.
    #[instrument(skip_all, fields(contacts = record.contacts.len()))]
    pub async fn trigger(
        &self,
        record: &SettingsRecord,
        location: Option<Location>,
        cancel: &CancelToken,
    ) -> Result<DispatchReport, SendError> {
        let started = self.state.send_if_modified(|state| {
            if *state == DashboardState::Sending {
                return false;
            }
            *state = DashboardState::Sending;
            true
        });
        if !started {
            return Err(SendError::AlreadySending);
        }
        let guard = SendingGuard::new(&self.state);
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        let result = self.send(record, location, cancel).await;
        match &result {
            Ok(report) => {
                info!(delivered = report.delivered().count(), "alert sent");
                self.state.send_replace(DashboardState::Sent);
                guard.disarm();
                self.notifier.notify(
                    Notice::info(
                        "✅ SOS Alerts Sent Successfully",
                        "Emergency contacts have been notified with your location.",
                    )
                    .with_duration(SUCCESS_NOTICE_DURATION),
                );
                self.schedule_reset(generation);
            }
            Err(e) => {
                warn!(error = %e, "alert not sent");
                drop(guard);
                if *e != SendError::Cancelled {
                    self.notifier.notify(
                        Notice::destructive(
                            "❌ SOS Alert Failed",
                            format!("Unable to send emergency alerts: {}. Please try again.", e),
                        )
                        .with_duration(SUCCESS_NOTICE_DURATION),
                    );
                }
            }
        }
        result
    }

    async fn send(
        &self,
        record: &SettingsRecord,
        location: Option<Location>,
        cancel: &CancelToken,
    ) -> Result<DispatchReport, SendError> {
        if cancel.is_cancelled() {
            return Err(SendError::Cancelled);
        }
        if record.contacts.is_empty() {
            warn!("no emergency contacts configured; alert reaches nobody");
        }
        let channels: Vec<Channel> = Channel::ALL
            .into_iter()
            .filter(|c| c.is_enabled(record))
            .collect();
        if channels.is_empty() {
            warn!("SMS and WhatsApp are both turned off; nothing is delivered");
        }
        let transports = channels
            .iter()
            .map(|&channel| {
                self.transports
                    .iter()
                    .find(|t| t.channel() == channel)
                    .cloned()
                    .ok_or(SendError::NoTransport(channel))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let alert = Alert {
            message: render_message(&record.message, location),
            recipients: record.contacts.iter().cloned().collect(),
            location,
        };

        let deliveries = future::join_all(transports.iter().map(|transport| {
            let alert = &alert;
            async move {
                ChannelOutcome {
                    channel: transport.channel(),
                    result: transport.deliver(alert).await,
                }
            }
        }));
        let work = future::join(deliveries, runtime::sleep(self.minimum_send_time));

        // Losing the race drops the deliveries still in flight.
        let mut outcomes = match future::select(pin!(work), pin!(cancel.cancelled())).await {
            Either::Left(((outcomes, ()), _)) => outcomes,
            Either::Right(((), _)) => return Err(SendError::Cancelled),
        };
        outcomes.sort_by_key(|o| o.channel);

        if !outcomes.is_empty() && outcomes.iter().all(|o| !o.is_delivered()) {
            return Err(SendError::AllChannelsFailed(outcomes));
        }
        Ok(DispatchReport {
            recipients: alert.recipients.len(),
            message: alert.message,
            outcomes,
        })
    }

    fn schedule_reset(&self, generation: u64) {
        let state = Arc::clone(&self.state);
        let current = Arc::clone(&self.generation);
        let delay = self.success_reset;
        runtime::spawn_detached(async move {
            runtime::sleep(delay).await;
            if current.load(Ordering::SeqCst) != generation {
                return;
            }
            state.send_if_modified(|state| {
                if *state != DashboardState::Sent {
                    return false;
                }
                *state = DashboardState::Ready;
                true
            });
        });
    }
}
