pub mod anchor;
pub mod hit;
pub mod string;
pub mod theme;

pub use anchor::{anchor_points, resolve};
pub use hit::{HitTarget, hit_test};
pub use string::string_path;
pub use theme::BoardTheme;
