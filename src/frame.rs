use std::fs::File;
use std::io::{ self, BufWriter, Write };
use std::path::Path;

use crate::color::Color;

/// A frame buffer of rendered pixels.
///
/// Row 0 is the top of the image. Once a frame is rendered the buffer can be
/// handed to an encoder, either as raw bytes (`to_rgb8`) or written straight
/// to a PPM file.
#[derive(Clone, Default, Debug, PartialEq)]
pub struct FrameBuffer {
    /// The width of the frame, in pixels.
    pub width: usize,

    /// The height of the frame, in pixels.
    pub height: usize,

    /// The pixels of the frame, stored row-major as a flattened vector.
    pixels: Vec<Color>,
}

impl FrameBuffer {
    /// Creates a black frame with specified width and height.
    pub fn new(width: usize, height: usize) -> FrameBuffer {
        FrameBuffer {
            width,
            height,
            pixels: vec![Color::black(); width * height]
        }
    }

    /// Writes a color to a location in the frame.
    ///
    /// Out-of-bounds pixels are ignored. `x` is the column and `y` the row,
    /// both zero-indexed from the top left.
    ///
    /// ```
    /// # use whitted::color::Color;
    /// # use whitted::frame::FrameBuffer;
    /// let purple = Color::rgb(1.0, 0.0, 1.0);
    /// let mut frame = FrameBuffer::new(8, 8);
    /// frame.write_pixel(4, 2, &purple);
    /// assert_eq!(frame.read_pixel(4, 2).unwrap(), purple);
    /// ```
    pub fn write_pixel(&mut self, x: usize, y: usize, pixel: &Color) {
        if x >= self.width || y >= self.height {
            return;
        }

        self.pixels[(y * self.width) + x] = *pixel;
    }

    /// Reads a color from a location in the frame, or `None` if out of
    /// bounds.
    pub fn read_pixel(&self, x: usize, y: usize) -> Option<Color> {
        if x >= self.width || y >= self.height {
            return None
        }

        Some(self.pixels[(y * self.width) + x])
    }

    /// All pixels, row-major from the top left.
    pub fn pixels_mut(&mut self) -> &mut [Color] {
        &mut self.pixels
    }

    /// The pixels as 8-bit RGB triples, row-major from the top left.
    pub fn to_rgb8(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.pixels.len() * 3);

        for p in &self.pixels {
            let c = p.clamp();
            bytes.extend_from_slice(&[to_byte(c.r), to_byte(c.g), to_byte(c.b)]);
        }

        bytes
    }

    /// Saves the frame to a plain (P3) PPM file.
    pub fn save_ppm(&self, path: &Path) -> io::Result<()> {
        let mut out = BufWriter::new(File::create(path)?);
        self.write_ppm(&mut out)?;
        out.flush()
    }

    /// Writes the frame as plain PPM.
    ///
    /// Lines in the PPM output are kept within 70 columns. If a value would
    /// cross the 70 column mark, it is moved to the next line.
    pub fn write_ppm<W: Write>(&self, out: &mut W) -> io::Result<()> {
        // PPM header: magic, dimensions, maximum color value
        writeln!(out, "P3")?;
        writeln!(out, "{} {}", self.width, self.height)?;
        writeln!(out, "255")?;

        let mut col = 0;
        for value in self.to_rgb8() {
            let s = value.to_string();

            if col == 0 {
                write!(out, "{}", s)?;
                col = s.len();
            } else if col + 1 + s.len() > 70 {
                write!(out, "\n{}", s)?;
                col = s.len();
            } else {
                write!(out, " {}", s)?;
                col += 1 + s.len();
            }
        }

        // Terminate the PPM file with a newline
        writeln!(out)
    }
}

fn to_byte(v: f64) -> u8 {
    (v * 255.0).round() as u8
}

#[test]
fn new_frame_is_black() {
    let f = FrameBuffer::new(10, 20);

    assert_eq!(f.width, 10);
    assert_eq!(f.height, 20);
    assert_eq!(f.read_pixel(9, 19), Some(Color::black()));
    assert_eq!(f.read_pixel(10, 0), None);
}

#[test]
fn out_of_range_colors_are_clamped_to_bytes() {
    let mut f = FrameBuffer::new(2, 1);
    f.write_pixel(0, 0, &Color::rgb(1.5, 0.0, 0.5));
    f.write_pixel(1, 0, &Color::rgb(-0.5, 0.0, 1.0));

    assert_eq!(f.to_rgb8(), vec![255, 0, 128, 0, 0, 255]);
}

#[test]
fn ppm_header_and_line_wrapping() {
    let mut f = FrameBuffer::new(10, 2);
    for y in 0..2 {
        for x in 0..10 {
            f.write_pixel(x, y, &Color::rgb(1.0, 0.8, 0.6));
        }
    }

    let mut out = Vec::new();
    f.write_ppm(&mut out).unwrap();
    let text = String::from_utf8(out).unwrap();
    let lines: Vec<&str> = text.lines().collect();

    assert_eq!(&lines[..3], &["P3", "10 2", "255"]);
    assert!(lines[3..].iter().all(|l| l.len() <= 70));
    assert!(lines[3].starts_with("255 204 153 255 204 153"));
    assert!(text.ends_with('\n'));

    let values = lines[3..].iter()
        .flat_map(|l| l.split_whitespace())
        .count();
    assert_eq!(values, 10 * 2 * 3);
}

#[test]
fn save_ppm_to_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("frame.ppm");

    let mut f = FrameBuffer::new(3, 2);
    f.write_pixel(1, 1, &Color::white());
    f.save_ppm(&path).unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.starts_with("P3\n3 2\n255\n"));
    assert_eq!(text.split_whitespace().filter(|v| *v == "255").count(), 4);
}
