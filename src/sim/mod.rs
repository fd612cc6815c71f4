mod collision;

pub use collision::{Placement, check_figure};
