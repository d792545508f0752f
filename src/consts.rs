// Floating point comparisons
pub const FEQ_EPSILON: f64 = 0.0001;

// Offset used against self-intersection ("shadow acne") and for rejecting
// rays parallel to a plane.
pub const EPSILON: f64 = 0.0001;

// Maximum recursion depth for mirror reflections
pub const REFLECTION_RECURSION_DEPTH: usize = 3;

// Material defaults
pub const DEFAULT_AMBIENT: f64 = 0.05;
pub const DEFAULT_DIFFUSE: f64 = 1.0;
pub const DEFAULT_SPECULAR: f64 = 1.0;
pub const DEFAULT_SHININESS: f64 = 50.0;

// Runtime parameters
pub const CANVAS_WIDTH: usize = 400;
pub const CANVAS_HEIGHT: usize = 300;
pub const OUT_FILE: &str = "./out.ppm";

// How often (in percent) render progress is reported
pub const PROGRESS_STEP: usize = 10;
