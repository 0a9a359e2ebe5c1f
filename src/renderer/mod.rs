//! SVG rendering of an arranged scene
//!
//! Widgets become labelled boxes with CSS classes derived from their widget
//! class; connector lines are drawn underneath.

pub mod config;
pub mod svg;

pub use config::SvgConfig;
pub use svg::render_svg;
