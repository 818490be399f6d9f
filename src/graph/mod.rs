/// Interactive pane groups and the panel that owns them

pub mod draw;
pub mod events;
pub mod graph_set;
pub mod history;
pub mod image_view;
pub mod interaction;
pub mod layout;
pub mod link;
pub mod panel;
pub mod selection;
pub mod widget;

#[cfg(test)]
pub(crate) mod test_support;

pub use graph_set::{GraphSet, ShiftMode, ZoomRequest};
pub use interaction::{InteractionState, LinkRequest, PanelNotice};
pub use layout::{FracPosition, LinkMode};
pub use panel::{Panel, PanelKey};
pub use widget::WidgetKind;
