//! TUI widgets.

mod help;
mod notifications;
mod search_panel;
mod status_bar;
mod stock_chart;
mod stock_details;
mod tab_bar;
mod trending_grid;

pub use help::{HelpPanel, hint_line};
pub use notifications::{render_error, render_toasts};
pub use search_panel::SearchPanel;
pub use status_bar::{FeedStatus, StatusBar};
pub use stock_chart::StockChart;
pub use stock_details::StockDetailsPanel;
pub use tab_bar::TabBar;
pub use trending_grid::TrendingGrid;
