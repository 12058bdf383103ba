use crate::config::LayoutConfig;
use crate::document::Vec3;

/// Places vehicle `vehicle_number` on a fixed-width grid relative to `base`.
///
/// Row `r`, column `c` of the zero-based relative index lands at
/// `(c * item_spacing, 0, r * row_spacing)`.
/// Numbers below `base` clamp to index 0; `SceneBuilder` refuses them before
/// they reach the grid.
pub fn grid_position(layout: &LayoutConfig, vehicle_number: u64, base: u64) -> Vec3 {
    let relative_index = vehicle_number.saturating_sub(base);
    let row_capacity = u64::from(layout.row_capacity.max(1));
    let column = relative_index % row_capacity;
    let row = relative_index / row_capacity;

    [
        positive_zero(column as f64 * layout.item_spacing),
        0.0,
        positive_zero(row as f64 * layout.row_spacing),
    ]
}

// 0 * -15.0 is -0.0, which would serialize as "-0.0".
fn positive_zero(value: f64) -> f64 {
    value + 0.0
}

pub fn tag_position(layout: &LayoutConfig, body: Vec3) -> Vec3 {
    [body[0], body[1] + layout.tag_height, body[2]]
}
