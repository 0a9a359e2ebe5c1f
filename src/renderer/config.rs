//! Configuration for SVG rendering

/// How an arranged map is drawn
#[derive(Debug, Clone)]
pub struct SvgConfig {
    /// Blank border around the scene bounds
    pub margin: f64,

    /// Emit the `<?xml ...?>` declaration
    pub xml_declaration: bool,

    /// Write everything on a single line
    pub compact: bool,

    /// Prepended to every CSS class the renderer emits
    pub class_prefix: String,

    /// Caption size for widget labels, in scene units
    pub font_size: f64,

    /// Draw connector placeholders and caption every widget with its name
    pub debug: bool,
}

impl Default for SvgConfig {
    fn default() -> Self {
        Self {
            margin: 20.0,
            xml_declaration: true,
            compact: false,
            class_prefix: "lucid-".to_string(),
            font_size: 12.0,
            debug: false,
        }
    }
}

impl SvgConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_margin(mut self, margin: f64) -> Self {
        self.margin = margin;
        self
    }

    /// Leave out the XML declaration, e.g. when inlining into HTML
    pub fn embedded(mut self) -> Self {
        self.xml_declaration = false;
        self
    }

    pub fn with_compact(mut self, compact: bool) -> Self {
        self.compact = compact;
        self
    }

    pub fn with_class_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.class_prefix = prefix.into();
        self
    }

    pub fn with_font_size(mut self, size: f64) -> Self {
        self.font_size = size;
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// CSS class name for `kind`, carrying the configured prefix
    pub fn class(&self, kind: &str) -> String {
        format!("{}{}", self.class_prefix, kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SvgConfig::default();
        assert_eq!(config.margin, 20.0);
        assert!(config.xml_declaration);
        assert!(!config.compact);
        assert_eq!(config.class("widget"), "lucid-widget");
        assert!(!config.debug);
    }

    #[test]
    fn test_builders() {
        let config = SvgConfig::new()
            .with_margin(4.0)
            .embedded()
            .with_class_prefix("")
            .with_font_size(9.0)
            .with_debug(true);

        assert_eq!(config.margin, 4.0);
        assert!(!config.xml_declaration);
        assert_eq!(config.class("label"), "label");
        assert_eq!(config.font_size, 9.0);
        assert!(config.debug);
    }
}
