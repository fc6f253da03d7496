use crate::format::format_stats_line;
use crate::host::StatsView;
use crate::types::{TrackIdentity, TrackStats};
use chrono::{DateTime, Utc};

/// Identity of the track the widget currently shows.
///
/// The generation increases on every track change and every forced refresh,
/// so two resolutions of the same URI can still be told apart.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TrackKey {
    pub uri: String,
    pub generation: u64,
}

/// Proof that a resolution was started for a given [`TrackKey`].
///
/// A ticket is only honoured by [`StatsWidget::commit`] while its key is still
/// the widget's current key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderTicket {
    key: TrackKey,
}

impl RenderTicket {
    pub fn key(&self) -> &TrackKey {
        &self.key
    }
}

/// The statistics node and the track it belongs to.
///
/// Track changes for the URI already shown are ignored. Any other change
/// replaces the current key, removes the old node and mounts a fresh one
/// showing the loading message. Results arriving for an older key are
/// discarded, so skipping tracks faster than the network answers never shows
/// a previous track's statistics.
///
/// # Examples
///
/// ```rust
/// use chrono::Utc;
/// use song_stats::{ReleaseDate, ScrobbleStats, StatsView, StatsWidget, TrackIdentity, TrackStats};
///
/// #[derive(Default)]
/// struct Line(String);
///
/// impl StatsView for Line {
///     fn show_loading(&mut self) {}
///     fn render(&mut self, line: &str) { self.0 = line.to_string(); }
///     fn remove(&mut self) {}
/// }
///
/// let mut widget = StatsWidget::new();
/// let a = widget.begin(&TrackIdentity::new("X", "A", "uri:a"), || Some(Line::default())).unwrap();
/// let b = widget.begin(&TrackIdentity::new("X", "B", "uri:b"), || Some(Line::default())).unwrap();
///
/// let stats = TrackStats { scrobble: ScrobbleStats::new(0, None), release: ReleaseDate::Unknown };
/// assert!(!widget.commit(&a, &stats, Utc::now()));
/// assert!(widget.commit(&b, &stats, Utc::now()));
/// ```
#[derive(Debug)]
pub struct StatsWidget<V> {
    current: Option<TrackKey>,
    view: Option<V>,
}

impl<V> Default for StatsWidget<V> {
    fn default() -> Self {
        Self {
            current: None,
            view: None,
        }
    }
}

impl<V: StatsView> StatsWidget<V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<&TrackKey> {
        self.current.as_ref()
    }

    pub fn view(&self) -> Option<&V> {
        self.view.as_ref()
    }

    pub fn is_current(&self, ticket: &RenderTicket) -> bool {
        self.current.as_ref() == Some(&ticket.key)
    }

    /// Start showing a new track.
    ///
    /// Returns `None` without touching anything when `identity` is the track
    /// already shown. Also returns `None` when no node could be mounted; the
    /// track still becomes current, so the next change retries.
    pub fn begin<F>(&mut self, identity: &TrackIdentity, mount: F) -> Option<RenderTicket>
    where
        F: FnOnce() -> Option<V>,
    {
        if self
            .current
            .as_ref()
            .is_some_and(|key| key.uri == identity.uri)
        {
            log::debug!("Same track as before ({}), skipping", identity.uri);
            return None;
        }

        self.advance(identity.uri.clone(), mount)
    }

    /// Resolve the current track again, e.g. after the settings changed.
    pub fn refresh<F>(&mut self, mount: F) -> Option<RenderTicket>
    where
        F: FnOnce() -> Option<V>,
    {
        let uri = self.current.as_ref()?.uri.clone();
        self.advance(uri, mount)
    }

    /// Render `stats` if `ticket` still refers to the current track.
    ///
    /// Returns whether anything was rendered.
    pub fn commit(&mut self, ticket: &RenderTicket, stats: &TrackStats, now: DateTime<Utc>) -> bool {
        if !self.is_current(ticket) {
            log::debug!(
                "Discarding stale stats for {} (generation {})",
                ticket.key.uri,
                ticket.key.generation
            );
            return false;
        }

        match self.view.as_mut() {
            Some(view) => {
                view.render(&format_stats_line(stats, now));
                true
            }
            None => false,
        }
    }

    fn advance<F>(&mut self, uri: String, mount: F) -> Option<RenderTicket>
    where
        F: FnOnce() -> Option<V>,
    {
        let generation = self.current.as_ref().map_or(1, |key| key.generation + 1);
        let key = TrackKey { uri, generation };
        self.current = Some(key.clone());

        if let Some(mut old) = self.view.take() {
            old.remove();
        }

        let Some(mut view) = mount() else {
            log::debug!("Stats container not found, skipping {}", key.uri);
            return None;
        };
        view.show_loading();
        self.view = Some(view);

        Some(RenderTicket { key })
    }
}
