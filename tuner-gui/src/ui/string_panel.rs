//! # Reference String Panel
//!
//! Six buttons, one per open string. A button lights up when the live
//! reading lands on its note, and pressing it plays the reference tone.

use iced::widget::{button, column, row, text};
use iced::{Alignment, Background, Border, Color, Element, Length};
use tuner_core::SymbolicPitch;
use tuner_core::tuning::{self, GUITAR_STRINGS, GuitarString, StringMatch};

use crate::{AppDisplayData, Message};

pub fn create_string_panel(data: &AppDisplayData) -> Element<'static, Message> {
    let buttons = GUITAR_STRINGS
        .iter()
        .enumerate()
        .fold(row![].spacing(8), |panel, (index, string)| {
            panel.push(make_string_button(index, string, data))
        });

    let mut panel = column![buttons].spacing(8).align_x(Alignment::Center);
    if let Some(string) = data.selected_string.and_then(|i| GUITAR_STRINGS.get(i)) {
        panel = panel.push(
            text(reference_label(string, data.pitch.as_ref()))
                .size(14)
                .color(super::PURPLE),
        );
    }
    panel.into()
}

/// Target of the selected string, plus how far the live reading is from it.
pub fn reference_label(string: &GuitarString, pitch: Option<&SymbolicPitch>) -> String {
    let target = format!("{} target {:.2} Hz", string.label(), string.frequency);
    match pitch {
        Some(p) => format!(
            "{}, reading {:+.1} cents",
            target,
            tuning::cents_between(p.frequency, string.frequency)
        ),
        None => target,
    }
}

/// Text colour and background tint for a string button.
pub fn string_colors(state: StringMatch, selected: bool) -> (Color, Color) {
    let accent = match state {
        StringMatch::Exact => super::GREEN,
        StringMatch::Matched => super::ORANGE,
        StringMatch::Idle if selected => super::PURPLE,
        StringMatch::Idle => return (super::MUTED, Color::TRANSPARENT),
    };
    (accent, Color { a: 0.15, ..accent })
}

fn make_string_button(
    index: usize,
    string: &GuitarString,
    data: &AppDisplayData,
) -> Element<'static, Message> {
    let state = tuning::match_string(string, data.pitch.as_ref(), data.in_tune_cents);
    let (accent, tint) = string_colors(state, data.selected_string == Some(index));

    let label = column![
        text(string.note).size(20),
        text(string.octave.to_string()).size(12),
    ]
    .align_x(Alignment::Center)
    .width(Length::Fill);

    button(label)
        .width(Length::Fill)
        .padding([10, 0])
        .style(move |_theme, _status| button::Style {
            background: Some(Background::Color(tint)),
            text_color: accent,
            border: Border {
                color: accent,
                width: 1.0,
                radius: 8.0.into(),
            },
            ..button::Style::default()
        })
        .on_press(Message::StringSelected(index))
        .into()
}
