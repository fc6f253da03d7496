use crate::credentials::CredentialStore;
use crate::host::{HostPlayer, HostTrack, HostUi};
use crate::pipeline::StatsPipeline;
use crate::settings::SettingsForm;
use crate::types::{Credentials, TrackIdentity};
use crate::widget::{RenderTicket, StatsWidget};
use crate::Result;
use chrono::Utc;
use std::cell::RefCell;
use std::rc::Rc;

/// What happened to a track change or refresh request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderOutcome {
    /// Statistics were resolved and rendered
    Rendered,
    /// The track was already shown; nothing was done
    Unchanged,
    /// The host had no track data or no container for the statistics
    Skipped,
    /// A newer track change superseded this one before it finished
    Stale,
}

/// Connects host track changes to the resolution pipeline and the widget.
///
/// Credentials are read from the store once, at construction, and replaced
/// only through [`StatsController::save_settings`]. Widget state is only
/// borrowed between awaits, so several resolutions may be in flight on the
/// same thread; the widget discards all but the newest.
pub struct StatsController<U: HostUi> {
    ui: U,
    pipeline: StatsPipeline,
    store: Box<dyn CredentialStore>,
    credentials: RefCell<Credentials>,
    widget: RefCell<StatsWidget<U::View>>,
    last_track: RefCell<Option<HostTrack>>,
}

impl<U: HostUi> StatsController<U> {
    pub fn new(ui: U, pipeline: StatsPipeline, store: Box<dyn CredentialStore>) -> Self {
        let credentials = store.get();
        Self {
            ui,
            pipeline,
            store,
            credentials: RefCell::new(credentials),
            widget: RefCell::new(StatsWidget::new()),
            last_track: RefCell::new(None),
        }
    }

    pub fn credentials(&self) -> Credentials {
        self.credentials.borrow().clone()
    }

    pub fn ui(&self) -> &U {
        &self.ui
    }

    /// Handle a track change notification from the host.
    pub async fn on_track_change(&self, track: &HostTrack) -> RenderOutcome {
        let Some(identity) = track.identity() else {
            log::debug!("No track data available, skipping update");
            return RenderOutcome::Skipped;
        };

        let ticket = {
            let mut widget = self.widget.borrow_mut();
            let already_shown = widget
                .current()
                .is_some_and(|key| key.uri == identity.uri);

            let ticket = widget.begin(&identity, || self.ui.mount_stats_view());
            if ticket.is_none() && already_shown {
                return RenderOutcome::Unchanged;
            }

            // The track is current now even if no view could be mounted.
            *self.last_track.borrow_mut() = Some(track.clone());
            match ticket {
                Some(ticket) => ticket,
                None => return RenderOutcome::Skipped,
            }
        };

        self.resolve_and_commit(ticket, identity, track).await
    }

    /// Store new settings and immediately re-resolve the current track.
    ///
    /// Blank form fields keep their stored values.
    pub async fn save_settings(&self, form: &SettingsForm) -> Result<RenderOutcome> {
        self.store.set(&form.credentials())?;
        *self.credentials.borrow_mut() = self.store.get();
        log::info!("Settings saved");

        Ok(self.refresh().await)
    }

    /// Resolve the current track again, regardless of whether it changed.
    pub async fn refresh(&self) -> RenderOutcome {
        let Some(track) = self.last_track.borrow().clone() else {
            return RenderOutcome::Unchanged;
        };
        let Some(identity) = track.identity() else {
            return RenderOutcome::Skipped;
        };

        let ticket = self
            .widget
            .borrow_mut()
            .refresh(|| self.ui.mount_stats_view());
        match ticket {
            Some(ticket) => self.resolve_and_commit(ticket, identity, &track).await,
            None => RenderOutcome::Skipped,
        }
    }

    async fn resolve_and_commit(
        &self,
        ticket: RenderTicket,
        identity: TrackIdentity,
        track: &HostTrack,
    ) -> RenderOutcome {
        let credentials = self.credentials();
        let stats = self
            .pipeline
            .resolve(&identity, track.album.as_ref(), &credentials)
            .await;

        if self.widget.borrow_mut().commit(&ticket, &stats, Utc::now()) {
            log::debug!("Stats updated for {}", identity.uri);
            RenderOutcome::Rendered
        } else {
            RenderOutcome::Stale
        }
    }
}

/// Drive a controller from a host's track change notifications.
///
/// Waits for the host to become ready, handles the track already playing, then
/// spawns one local task per notification so a slow lookup never delays the
/// next track. Must be called inside a [`tokio::task::LocalSet`]. Returns once
/// the host stops producing notifications and every started resolution has
/// settled.
pub async fn run<U, H>(mut host: H, controller: Rc<StatsController<U>>) -> Result<()>
where
    U: HostUi + 'static,
    U::View: 'static,
    H: HostPlayer,
{
    host.ready().await?;
    log::info!("Host ready, listening for track changes");

    let mut in_flight = Vec::new();

    if let Some(track) = host.current_track() {
        let controller = Rc::clone(&controller);
        in_flight.push(tokio::task::spawn_local(async move {
            controller.on_track_change(&track).await
        }));
    }

    while let Some(track) = host.next_track_change().await {
        in_flight.retain(|handle: &tokio::task::JoinHandle<RenderOutcome>| !handle.is_finished());

        let controller = Rc::clone(&controller);
        in_flight.push(tokio::task::spawn_local(async move {
            controller.on_track_change(&track).await
        }));
    }

    for outcome in futures::future::join_all(in_flight).await {
        if let Err(e) = outcome {
            log::warn!("Stats task failed: {e}");
        }
    }

    log::info!("Host closed, stopping");
    Ok(())
}
