//! # Cent Meter Widget
//!
//! Horizontal tuning meter: a needle over a -50..+50 cent scale, green
//! when the reading is in tune.

use iced::widget::canvas::{self, Geometry, Path, Stroke};
use iced::widget::container;
use iced::{Color, Element, Point, Rectangle, Renderer, Size, Theme, mouse};

/// The meter spans -50 to +50 cents.
const METER_RANGE: f32 = 50.0;

/// Tick positions in cents.
const TICKS: [f32; 5] = [-50.0, -25.0, 0.0, 25.0, 50.0];

pub struct CentMeter {
    /// Current cent deviation (None if nothing has been heard yet)
    cents: Option<i32>,
    in_tune_cents: i32,
}

impl CentMeter {
    pub fn new(cents: Option<i32>, in_tune_cents: i32) -> Self {
        Self { cents, in_tune_cents }
    }

    pub fn view(self) -> Element<'static, crate::Message> {
        container(
            canvas::Canvas::new(self)
                .width(iced::Length::Fill)
                .height(iced::Length::Fixed(80.0)),
        )
        .into()
    }
}

/// Horizontal needle position for `cents`, clamped to the meter.
pub fn needle_x(cents: f32, width: f32) -> f32 {
    (cents.clamp(-METER_RANGE, METER_RANGE) + METER_RANGE) / (2.0 * METER_RANGE) * width
}

impl<Message> canvas::Program<Message> for CentMeter {
    type State = ();

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> Vec<Geometry> {
        let mut frame = canvas::Frame::new(renderer, bounds.size());

        let background = Path::rectangle(Point::ORIGIN, bounds.size());
        frame.fill(&background, Color::from_rgb8(0x1A, 0x1A, 0x1A));

        for tick in TICKS {
            let x = needle_x(tick, bounds.width);
            let length = if tick == 0.0 { bounds.height * 0.4 } else { bounds.height * 0.25 };
            let line = Path::line(
                Point::new(x, bounds.height),
                Point::new(x, bounds.height - length),
            );
            frame.stroke(
                &line,
                Stroke::default()
                    .with_width(2.0)
                    .with_color(Color { a: 0.3, ..Color::WHITE }),
            );
        }

        if let Some(cents) = self.cents {
            let x = needle_x(cents as f32, bounds.width);
            let color = if cents.abs() < self.in_tune_cents {
                super::GREEN
            } else {
                super::NEEDLE
            };
            let needle = Path::rectangle(Point::new(x - 3.0, 0.0), Size::new(6.0, bounds.height));
            frame.fill(&needle, color);
        }

        vec![frame.into_geometry()]
    }
}
