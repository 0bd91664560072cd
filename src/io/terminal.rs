//! Terminal presentation: images as 24-bit colour half blocks, answers from stdin

use crate::io::error::{GmiError, Result, file_system};
use crate::session::assets::Asset;
use crate::session::runner::{Presenter, ResponseSource};
use image::imageops::FilterType;
use image::{Rgba, RgbaImage};
use std::fmt::Write as _;
use std::io::{BufRead, Write};
use std::path::Path;

const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";
const RESET: &str = "\x1b[0m";

/// Render an image with one `▀` per column and two pixel rows per text row
///
/// The upper pixel becomes the foreground colour, the lower pixel the background.
/// Transparent pixels are blended onto black.
pub fn render_half_blocks(image: &RgbaImage) -> String {
    let rows: Vec<Vec<[u8; 3]>> = image
        .rows()
        .map(|row| row.map(|pixel| on_black(*pixel)).collect())
        .collect();

    let mut out = String::new();
    for pair in rows.chunks(2) {
        let (upper, lower) = match pair {
            [upper, lower] => (upper, Some(lower)),
            [upper] => (upper, None),
            _ => continue,
        };
        for (column, top) in upper.iter().enumerate() {
            let [tr, tg, tb] = *top;
            let [br, bg, bb] = lower
                .and_then(|row| row.get(column).copied())
                .unwrap_or([0, 0, 0]);
            let _ = write!(out, "\x1b[38;2;{tr};{tg};{tb}m\x1b[48;2;{br};{bg};{bb}m▀");
        }
        out.push_str(RESET);
        out.push('\n');
    }
    out
}

fn on_black(pixel: Rgba<u8>) -> [u8; 3] {
    let [r, g, b, a] = pixel.0;
    let scale = |channel: u8| ((u16::from(channel) * u16::from(a)) / 255) as u8;
    [scale(r), scale(g), scale(b)]
}

/// Decode and shrink an image to fit `columns` by `rows` text cells
///
/// # Errors
///
/// Returns an error if the image cannot be opened or decoded; the format is taken from
/// the file contents when they are recognized
pub fn load_for_terminal(path: &Path, columns: u32, rows: u32) -> Result<RgbaImage> {
    let image = image::ImageReader::open(path)
        .and_then(image::ImageReader::with_guessed_format)
        .map_err(file_system(path, "open image"))?
        .decode()
        .map_err(|source| GmiError::ImageDecode {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(image
        .resize(columns, rows * 2, FilterType::Triangle)
        .to_rgba8())
}

/// Writes prompts and rendered images to a terminal
pub struct TerminalPresenter<W: Write> {
    out: W,
    columns: u32,
    rows: u32,
}

impl<W: Write> TerminalPresenter<W> {
    /// Create a presenter drawing images at most `columns` wide and `rows` tall
    pub const fn new(out: W, columns: u32, rows: u32) -> Self {
        Self { out, columns, rows }
    }

    fn emit(&mut self, text: &str) -> Result<()> {
        self.out
            .write_all(text.as_bytes())
            .and_then(|()| self.out.flush())
            .map_err(file_system(Path::new("<terminal>"), "write"))
    }
}

impl<W: Write> Presenter for TerminalPresenter<W> {
    fn show_message(&mut self, text: &str) -> Result<()> {
        self.emit(&format!("{text}\n"))
    }

    fn show_image(&mut self, asset: &Asset, index: usize, total: usize) -> Result<()> {
        let image = load_for_terminal(&asset.path, self.columns, self.rows)?;
        let frame = format!(
            "{CLEAR_SCREEN}Image {index} of {total}\n{}left (a) or right (d)? ",
            render_half_blocks(&image)
        );
        self.emit(&frame)
    }
}

/// Reads answers line by line from any buffered reader, usually stdin
pub struct LineResponses<R: BufRead> {
    input: R,
}

impl<R: BufRead> LineResponses<R> {
    /// Wrap a reader
    pub const fn new(input: R) -> Self {
        Self { input }
    }
}

impl<R: BufRead> ResponseSource for LineResponses<R> {
    fn read_line(&mut self) -> Result<Option<String>> {
        let mut line = String::new();
        let read = self
            .input
            .read_line(&mut line)
            .map_err(file_system(Path::new("<stdin>"), "read"))?;
        Ok((read > 0).then_some(line))
    }
}
