/// Offline figure rendering for melscope: heatmap, axes, colorbar, text.

pub mod axis;
pub mod canvas;
pub mod figure;
pub mod font;

pub use figure::Figure;
