//! # OLED Render Module
//!
//! Paints the cursor and the selected border on a 1-bit panel. The panel is
//! anything `embedded-graphics` can draw on plus a way to push the finished
//! frame out; on the board that is the SSD1306 in buffered graphics mode.
//!
//! ```text
//! BorderStyle::None    BorderStyle::Thin      BorderStyle::Thick
//! (no frame)           1px at the edge        1px, inset by 2px
//! ```
//!
//! Every call redraws the full frame, so it is safe to run on every control
//! cycle.

use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{PrimitiveStyle, Rectangle};

use crate::constants::display;
use crate::mapping::{ScreenGeometry, ScreenPosition};
use crate::toggle::BorderStyle;

/// A monochrome draw target with an explicit frame flush.
pub trait Panel: DrawTarget<Color = BinaryColor> {
    type FlushError;

    /// Transmit the whole frame buffer to the panel.
    fn flush_frame(&mut self) -> Result<(), Self::FlushError>;
}

/// Why a frame did not make it to the panel.
#[derive(Debug, PartialEq, Eq)]
pub enum RenderError<D, F> {
    Draw(D),
    Flush(F),
}

/// Render seam used by the control loop. `()` is the headless variant.
pub trait Viewport {
    /// Show a frame; returns `false` when it could not be delivered.
    fn show(&mut self, position: ScreenPosition, border: BorderStyle) -> bool;
}

impl Viewport for () {
    fn show(&mut self, _position: ScreenPosition, _border: BorderStyle) -> bool {
        true
    }
}

/// Border rectangle for a style, or `None` when no frame is drawn.
pub fn border_rect(style: BorderStyle, geometry: &ScreenGeometry) -> Option<Rectangle> {
    let size = Size::new(geometry.width, geometry.height);
    match style {
        BorderStyle::None => None,
        BorderStyle::Thin => Some(Rectangle::new(Point::zero(), size)),
        BorderStyle::Thick => {
            let inset = display::THICK_BORDER_INSET;
            Some(Rectangle::new(
                Point::new(inset as i32, inset as i32),
                Size::new(
                    size.width.saturating_sub(2 * inset),
                    size.height.saturating_sub(2 * inset),
                ),
            ))
        }
    }
}

/// Clear, draw border and cursor, flush.
pub fn render<P: Panel>(
    panel: &mut P,
    geometry: &ScreenGeometry,
    position: ScreenPosition,
    border: BorderStyle,
) -> Result<(), RenderError<P::Error, P::FlushError>> {
    draw_frame(panel, geometry, position, border).map_err(RenderError::Draw)?;
    panel.flush_frame().map_err(RenderError::Flush)
}

fn draw_frame<D>(
    target: &mut D,
    geometry: &ScreenGeometry,
    position: ScreenPosition,
    border: BorderStyle,
) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor>,
{
    target.clear(BinaryColor::Off)?;

    if let Some(rect) = border_rect(border, geometry) {
        rect.into_styled(PrimitiveStyle::with_stroke(BinaryColor::On, 1))
            .draw(target)?;
    }

    let side = geometry.cursor_size;
    Rectangle::new(Point::new(position.x, position.y), Size::new(side, side))
        .into_styled(PrimitiveStyle::with_fill(BinaryColor::On))
        .draw(target)
}

/// Panel plus geometry, as seen by the control loop.
pub struct Screen<P> {
    panel: P,
    geometry: ScreenGeometry,
}

impl<P: Panel> Screen<P> {
    pub fn new(panel: P, geometry: ScreenGeometry) -> Self {
        Self { panel, geometry }
    }

    pub fn panel(&self) -> &P {
        &self.panel
    }
}

impl<P: Panel> Viewport for Screen<P> {
    fn show(&mut self, position: ScreenPosition, border: BorderStyle) -> bool {
        render(&mut self.panel, &self.geometry, position, border).is_ok()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use core::convert::Infallible;

    pub(crate) const WIDTH: usize = display::SCREEN_WIDTH as usize;
    pub(crate) const HEIGHT: usize = display::SCREEN_HEIGHT as usize;

    /// In-memory 128x64 panel.
    pub(crate) struct FrameBuffer {
        pub pixels: [[bool; WIDTH]; HEIGHT],
        pub flushes: usize,
        pub fail_flush: bool,
    }

    impl FrameBuffer {
        pub fn new() -> Self {
            Self {
                pixels: [[false; WIDTH]; HEIGHT],
                flushes: 0,
                fail_flush: false,
            }
        }

        pub fn get(&self, x: usize, y: usize) -> bool {
            self.pixels[y][x]
        }

        pub fn lit(&self) -> usize {
            self.pixels.iter().flatten().filter(|p| **p).count()
        }
    }

    impl OriginDimensions for FrameBuffer {
        fn size(&self) -> Size {
            Size::new(WIDTH as u32, HEIGHT as u32)
        }
    }

    impl DrawTarget for FrameBuffer {
        type Color = BinaryColor;
        type Error = Infallible;

        fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
        where
            I: IntoIterator<Item = Pixel<Self::Color>>,
        {
            for Pixel(point, color) in pixels {
                if (0..WIDTH as i32).contains(&point.x) && (0..HEIGHT as i32).contains(&point.y) {
                    self.pixels[point.y as usize][point.x as usize] = color.is_on();
                }
            }
            Ok(())
        }
    }

    impl Panel for FrameBuffer {
        type FlushError = ();

        fn flush_frame(&mut self) -> Result<(), ()> {
            if self.fail_flush {
                return Err(());
            }
            self.flushes += 1;
            Ok(())
        }
    }

    fn center() -> ScreenPosition {
        ScreenPosition { x: 60, y: 28 }
    }

    #[test]
    fn cursor_is_a_filled_square() {
        let geometry = ScreenGeometry::default();
        let mut fb = FrameBuffer::new();

        render(&mut fb, &geometry, center(), BorderStyle::None).unwrap();

        assert_eq!(fb.lit(), 64);
        assert!(fb.get(60, 28) && fb.get(67, 35) && fb.get(63, 31));
        assert!(!fb.get(68, 28) && !fb.get(60, 36));
        assert_eq!(fb.flushes, 1);
    }

    #[test]
    fn thin_border_hugs_the_edge() {
        let geometry = ScreenGeometry::default();
        let mut fb = FrameBuffer::new();

        render(&mut fb, &geometry, center(), BorderStyle::Thin).unwrap();

        assert!(fb.get(0, 0) && fb.get(127, 0) && fb.get(0, 63) && fb.get(127, 63));
        assert!(!fb.get(2, 2));
        // perimeter of 128x64 plus the cursor
        assert_eq!(fb.lit(), 2 * 128 + 2 * 62 + 64);
    }

    #[test]
    fn thick_border_is_inset() {
        let geometry = ScreenGeometry::default();
        let mut fb = FrameBuffer::new();

        render(&mut fb, &geometry, center(), BorderStyle::Thick).unwrap();

        assert!(!fb.get(0, 0) && !fb.get(1, 1));
        assert!(fb.get(2, 2) && fb.get(125, 2) && fb.get(2, 61) && fb.get(125, 61));
        assert!(!fb.get(126, 62));
    }

    #[test]
    fn every_frame_starts_from_blank() {
        let geometry = ScreenGeometry::default();
        let mut fb = FrameBuffer::new();

        render(&mut fb, &geometry, ScreenPosition { x: 0, y: 0 }, BorderStyle::Thin).unwrap();
        render(&mut fb, &geometry, center(), BorderStyle::None).unwrap();

        assert!(!fb.get(0, 0));
        assert!(!fb.get(127, 63));
        assert_eq!(fb.lit(), 64);
        assert_eq!(fb.flushes, 2);
    }

    #[test]
    fn cursor_at_far_corner_stays_on_panel() {
        let geometry = ScreenGeometry::default();
        let mut fb = FrameBuffer::new();
        let corner = ScreenPosition {
            x: geometry.x_extent(),
            y: geometry.y_extent(),
        };

        render(&mut fb, &geometry, corner, BorderStyle::None).unwrap();

        assert_eq!(fb.lit(), 64);
        assert!(fb.get(127, 63));
    }

    #[test]
    fn flush_failure_is_reported() {
        let mut screen = Screen::new(
            FrameBuffer {
                fail_flush: true,
                ..FrameBuffer::new()
            },
            ScreenGeometry::default(),
        );

        assert!(!screen.show(center(), BorderStyle::Thin));
        assert_eq!(
            render(
                &mut FrameBuffer {
                    fail_flush: true,
                    ..FrameBuffer::new()
                },
                &ScreenGeometry::default(),
                center(),
                BorderStyle::None
            ),
            Err(RenderError::Flush(()))
        );
    }

    #[test]
    fn no_border_for_none() {
        assert_eq!(border_rect(BorderStyle::None, &ScreenGeometry::default()), None);
    }
}
