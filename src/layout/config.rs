//! Configuration for the layout engine

/// Configuration options for layout computation
#[derive(Debug, Clone)]
pub struct LayoutConfig {
    /// Gap kept between neighbouring shapes along the placement axis
    pub min_spacing: f64,

    /// Run the overlap check after layout and connection
    pub validate: bool,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            min_spacing: 30.0,
            validate: true,
        }
    }
}

impl LayoutConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the spacing between neighbouring shapes
    pub fn with_min_spacing(mut self, spacing: f64) -> Self {
        self.min_spacing = spacing;
        self
    }

    /// Enable or disable the post-layout overlap check
    pub fn with_validate(mut self, validate: bool) -> Self {
        self.validate = validate;
        self
    }
}
