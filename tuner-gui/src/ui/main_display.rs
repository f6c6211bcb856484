//! # Main Display Module
//!
//! Layout of the tuner window: note readout, cent meter, cents badge,
//! start/stop control and the reference string panel.

use iced::widget::{Space, button, column, container, row, text};
use iced::{Alignment, Background, Border, Color, Element, Length};

use super::{cent_meter::CentMeter, string_panel};
use crate::{AppDisplayData, Message};

/// Creates the complete main application view
pub fn create_main_view(data: &AppDisplayData) -> Element<'static, Message> {
    let in_tune = data
        .pitch
        .as_ref()
        .is_some_and(|p| p.is_in_tune(data.in_tune_cents));

    let mut content = column![
        text("Guitar Tuner").size(28),
        create_note_panel(data, in_tune),
        CentMeter::new(data.pitch.as_ref().map(|p| p.cents), data.in_tune_cents).view(),
        create_cents_badge(data, in_tune),
        create_listen_button(data.listening),
        Space::with_height(10),
        string_panel::create_string_panel(data),
    ]
    .spacing(16)
    .padding(20)
    .max_width(520)
    .align_x(Alignment::Center);

    if let Some(status) = &data.status {
        content = content.push(text(status.clone()).size(14).color(super::RED));
    }

    container(content)
        .width(Length::Fill)
        .height(Length::Fill)
        .center_x(Length::Fill)
        .center_y(Length::Fill)
        .into()
}

/// Large note name with its octave and the measured frequency underneath.
fn create_note_panel(data: &AppDisplayData, in_tune: bool) -> Element<'static, Message> {
    let (note, octave, frequency) = match &data.pitch {
        Some(p) => (
            p.note_name.to_string(),
            p.octave.to_string(),
            format!("{:.1} Hz", p.frequency),
        ),
        None => ("-".to_string(), String::new(), "-- Hz".to_string()),
    };
    let note_color = if in_tune { super::GREEN } else { Color::WHITE };

    column![
        row![
            text(note).size(96).color(note_color),
            text(octave).size(32).color(super::MUTED),
        ]
        .align_y(Alignment::End),
        text(frequency).size(18).color(super::MUTED),
    ]
    .align_x(Alignment::Center)
    .into()
}

/// Formats the cents pill, e.g. "+12 cents". "Ready" before the first reading.
pub fn cents_label(cents: Option<i32>) -> String {
    match cents {
        Some(c) if c > 0 => format!("+{} cents", c),
        Some(c) => format!("{} cents", c),
        None => "Ready".to_string(),
    }
}

fn create_cents_badge(data: &AppDisplayData, in_tune: bool) -> Element<'static, Message> {
    let accent = if in_tune { super::GREEN } else { super::MUTED };
    let tint = if in_tune {
        Color { a: 0.1, ..super::GREEN }
    } else {
        Color::TRANSPARENT
    };

    container(text(cents_label(data.pitch.as_ref().map(|p| p.cents))).size(18))
        .padding([4, 16])
        .style(move |_theme| container::Style {
            background: Some(Background::Color(tint)),
            text_color: Some(accent),
            border: Border {
                color: accent,
                width: 1.0,
                radius: 12.0.into(),
            },
            ..container::Style::default()
        })
        .into()
}

fn create_listen_button(listening: bool) -> Element<'static, Message> {
    let (label, message, background, text_color) = if listening {
        (
            "Stop Tuner",
            Message::StopListening,
            Color { a: 0.15, ..super::RED },
            super::RED,
        )
    } else {
        ("Start Tuner", Message::StartListening, Color::WHITE, Color::BLACK)
    };

    button(container(text(label).size(18)).center_x(Length::Fill))
        .width(Length::Fill)
        .padding([14, 20])
        .style(move |_theme, _status| button::Style {
            background: Some(Background::Color(background)),
            text_color,
            border: Border {
                color: text_color,
                width: if listening { 1.0 } else { 0.0 },
                radius: 28.0.into(),
            },
            ..button::Style::default()
        })
        .on_press(message)
        .into()
}
