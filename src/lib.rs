//! LUCID map layout - positions and connects widgets described by a YAML map
//!
//! This library provides the loader, instantiator, layout engine and SVG
//! renderer for declarative device maps.
//!
//! # Example
//!
//! ```rust
//! use lucid_map::render;
//!
//! let svg = render(r#"
//! components:
//!   pump: {class: Pump}
//!   tank: {class: Tank}
//! layout:
//!   - horizontal: [pump, tank]
//! "#).unwrap();
//! assert!(svg.contains("<svg"));
//! ```

pub mod catalog;
pub mod error;
pub mod layout;
pub mod parser;
pub mod renderer;
pub mod scene;
pub mod template;

pub use catalog::{Catalog, CatalogError};
pub use error::LoadError;
pub use layout::{arrange, ArrangedMap, LayoutConfig, LayoutError};
pub use parser::{load_map, Document, Macros};
pub use renderer::{render_svg, SvgConfig};
pub use scene::{HeadlessScene, Scene, ShapeId, Widget};
pub use template::{instantiate_document, InstantiateError, WidgetFactory};

use std::fmt::Write as _;

use thiserror::Error;

/// Errors that can occur during the render pipeline
#[derive(Debug, Error)]
pub enum MapError {
    #[error("load error: {0}")]
    Load(#[from] LoadError),

    #[error("{0}")]
    Instantiate(#[from] InstantiateError),

    #[error("layout error: {0}")]
    Layout(#[from] LayoutError),

    /// Shapes overlap and overlaps were denied
    #[error("overlapping shapes: {}", .0.join("; "))]
    Overlap(Vec<String>),
}

/// Configuration for the complete render pipeline
#[derive(Debug, Clone, Default)]
pub struct RenderConfig {
    pub layout: LayoutConfig,
    pub svg: SvgConfig,
    /// Widget classes used to build the scene
    pub catalog: Catalog,
    /// Outermost macro scope
    pub macros: Macros,
    /// Fail instead of rendering when shapes overlap
    pub deny_overlaps: bool,
    /// Debug mode: print positions and draw connector placeholders
    pub debug: bool,
}

impl RenderConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_layout(mut self, config: LayoutConfig) -> Self {
        self.layout = config;
        self
    }

    pub fn with_svg(mut self, config: SvgConfig) -> Self {
        self.svg = config;
        self
    }

    pub fn with_catalog(mut self, catalog: Catalog) -> Self {
        self.catalog = catalog;
        self
    }

    /// Add a macro to the outermost scope
    pub fn with_macro(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.macros.insert(key.into(), value.into());
        self
    }

    pub fn with_deny_overlaps(mut self, deny: bool) -> Self {
        self.deny_overlaps = deny;
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }
}

/// Instantiate `document` with `factory` and arrange the widgets in `scene`
pub fn arrange_document<Sc, F>(
    document: &Document,
    factory: &mut F,
    scene: &mut Sc,
    macros: &Macros,
    config: &LayoutConfig,
) -> Result<ArrangedMap<Sc::Shape>, MapError>
where
    Sc: Scene,
    F: WidgetFactory<Widget = Sc::Widget>,
{
    let map = instantiate_document(document, factory, macros, "")?;
    Ok(arrange(scene, map, config)?)
}

/// Load a YAML map and arrange it in a fresh headless scene
pub fn build_scene(
    source: &str,
    config: &RenderConfig,
) -> Result<(HeadlessScene, ArrangedMap<ShapeId>), MapError> {
    let document = load_map(source)?;
    let mut catalog = config.catalog.clone();
    let mut scene = HeadlessScene::new();
    let arranged = arrange_document(
        &document,
        &mut catalog,
        &mut scene,
        &config.macros,
        &config.layout,
    )?;

    if config.deny_overlaps && !arranged.is_valid() {
        return Err(MapError::Overlap(
            arranged.collisions.iter().map(ToString::to_string).collect(),
        ));
    }
    Ok((scene, arranged))
}

/// One line per widget: name, class, x, y, width, height
pub fn format_positions(scene: &HeadlessScene) -> String {
    let mut out = String::new();
    for (_, item) in scene.items() {
        let _ = writeln!(
            out,
            "{} {} {} {} {} {}",
            item.name,
            item.widget.class,
            item.position.x,
            item.position.y,
            item.widget.size.width,
            item.widget.size.height
        );
    }
    out
}

/// Render a YAML map to SVG with default configuration
pub fn render(source: &str) -> Result<String, MapError> {
    render_with_config(source, RenderConfig::default())
}

/// Render a YAML map to SVG with custom configuration
///
/// # Example
///
/// ```rust
/// use lucid_map::{render_with_config, LayoutConfig, RenderConfig};
///
/// let config = RenderConfig::new()
///     .with_layout(LayoutConfig::default().with_min_spacing(10.0))
///     .with_macro("kind", "Valve");
///
/// let svg = render_with_config("components: {v: {class: '${kind}'}}", config).unwrap();
/// assert!(svg.contains("lucid-class-Valve"));
/// ```
pub fn render_with_config(source: &str, config: RenderConfig) -> Result<String, MapError> {
    let (scene, _) = build_scene(source, &config)?;

    if config.debug {
        eprintln!("=== Layout Debug ===");
        eprint!("{}", format_positions(&scene));
        eprintln!("====================");
    }

    let svg_config = config.svg.clone().with_debug(config.debug || config.svg.debug);
    Ok(render_svg(&scene, &svg_config))
}
