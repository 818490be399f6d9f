pub mod scale_data;
pub mod view_data;

pub use scale_data::ScaleData;
pub use view_data::{ScaleTarget, ViewData};
