pub mod building;
pub mod grid_map;
pub mod math;
pub mod town;
