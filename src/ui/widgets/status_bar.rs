//! Status bar widget.

use chrono::{DateTime, Utc};
use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};

use crate::state::{DataSource, Store, View};
use crate::ui::{Theme, format};

const SPINNER: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
const ASCII_SPINNER: [&str; 4] = ["|", "/", "-", "\\"];

/// What the status bar reports about the data on screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedStatus {
    pub loading: bool,
    pub source: Option<DataSource>,
    pub last_updated: Option<DateTime<Utc>>,
}

impl FeedStatus {
    /// Status of the feed behind the current view.
    pub fn of(store: &Store) -> Self {
        match store.app.current_view {
            View::Trending => {
                let feed = &store.trending.feed;
                Self {
                    loading: feed.loading,
                    source: feed.data().map(|d| d.source),
                    last_updated: feed.last_updated,
                }
            }
            View::Search => Self {
                loading: store.search.loading,
                source: store.search.source,
                last_updated: None,
            },
            View::Detail => {
                let details = &store.detail.details;
                let history = &store.detail.history;
                Self {
                    loading: details.loading || history.loading,
                    source: details.data().map(|d| d.source),
                    last_updated: details.last_updated,
                }
            }
        }
    }
}

/// Status bar widget.
pub struct StatusBar;

impl StatusBar {
    /// Render the status bar.
    pub fn render(frame: &mut Frame, area: Rect, store: &Store, theme: &Theme) {
        let status = FeedStatus::of(store);
        let bullet = if theme.unicode { "●" } else { "*" };

        let connection = if store.app.offline {
            Span::styled(format!("{bullet} Offline"), Style::default().fg(theme.error))
        } else if store.app.was_offline {
            Span::styled(
                format!("{bullet} Online, using cached data"),
                Style::default().fg(theme.warning),
            )
        } else {
            Span::styled(format!("{bullet} Online"), Style::default().fg(theme.success))
        };

        let source = match status.source {
            Some(DataSource::Live) => Span::styled(" Live ", Style::default().fg(theme.success)),
            Some(DataSource::Mock) => Span::styled(" Mock data ", Style::default().fg(theme.warning)),
            None => Span::raw(""),
        };

        let refreshing = if status.loading {
            Span::styled(
                format!(" {} Refreshing ", spinner_frame(theme.unicode)),
                Style::default()
                    .fg(theme.accent)
                    .add_modifier(Modifier::ITALIC),
            )
        } else {
            Span::raw("")
        };

        let auto = if store.app.auto_refresh {
            Span::raw("")
        } else {
            Span::styled(" Paused ", Style::default().fg(theme.warning))
        };

        let mut spans = vec![
            Span::styled(
                " stockwatch ",
                Style::default()
                    .fg(theme.primary)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw("| "),
            connection,
            Span::raw(" |"),
            source,
            auto,
            refreshing,
        ];

        let updated = Span::styled(
            format!(" Updated: {} ", format::last_updated(status.last_updated)),
            theme.muted(),
        );

        // Right-align the timestamp.
        let left_len: usize = spans.iter().map(|s| s.content.chars().count()).sum();
        let right_len = updated.content.chars().count();
        let padding = usize::from(area.width).saturating_sub(left_len + right_len);
        spans.push(Span::raw(" ".repeat(padding)));
        spans.push(updated);

        let paragraph = Paragraph::new(Line::from(spans))
            .style(Style::default().fg(theme.foreground).bg(theme.selection));

        frame.render_widget(paragraph, area);
    }
}

fn spinner_frame(unicode: bool) -> &'static str {
    let step = (Utc::now().timestamp_millis() / 100).unsigned_abs() as usize;
    if unicode {
        SPINNER[step % SPINNER.len()]
    } else {
        ASCII_SPINNER[step % ASCII_SPINNER.len()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::refresh::RefreshState;
    use crate::state::{Action, Fetched};
    use pretty_assertions::assert_eq;
    use tokio::sync::mpsc;

    #[test]
    fn test_feed_status_follows_view() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut store = crate::state::Store::new(tx);
        let now = Utc::now();
        store.reduce(Action::TrendingUpdated(RefreshState {
            data: Some(Fetched::mock(Vec::new())),
            loading: false,
            last_updated: Some(now),
            ..RefreshState::default()
        }));

        let status = FeedStatus::of(&store);
        assert_eq!(status.source, Some(DataSource::Mock));
        assert_eq!(status.last_updated, Some(now));
        assert!(!status.loading);

        store.reduce(Action::SetView(View::Search));
        assert_eq!(FeedStatus::of(&store).source, None);
    }
}
