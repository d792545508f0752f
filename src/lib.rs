pub mod consts;
pub mod error;
pub mod config;

pub mod vector;
pub mod color;
pub mod ray;

pub mod pattern;
pub mod geometry;
pub mod intersect;
pub mod light;
pub mod world;

pub mod camera;
pub mod context;
pub mod render;
pub mod frame;

pub mod scene;

use consts::FEQ_EPSILON;

pub fn feq(left: f64, right: f64) -> bool {
    (left - right).abs() < FEQ_EPSILON
}
