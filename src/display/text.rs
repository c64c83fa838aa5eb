/*
 *  display/text.rs
 *
 *  rascode - triple screen status panels
 *  (c) 2025-26 rascode contributors
 *
 *  Line-oriented text rendering shared by all panels
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

use embedded_graphics::{
    mono_font::{
        ascii::{FONT_5X8, FONT_6X10},
        MonoFont, MonoTextStyle,
    },
    prelude::*,
    text::{Baseline, Text},
};

use crate::display::traits::{ColorDepth, DisplayCapabilities};

/// Font used for line rendering on a panel.
///
/// The LCD needs 42 columns in 240 px, the OLEDs take the taller 6x10.
pub fn font_for(caps: &DisplayCapabilities) -> &'static MonoFont<'static> {
    match caps.color_depth {
        ColorDepth::Rgb565 => &FONT_5X8,
        ColorDepth::Monochrome => &FONT_6X10,
    }
}

/// Cut `s` to at most `max` characters (not bytes).
pub fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((i, _)) => &s[..i],
        None => s,
    }
}

/// Draw `lines` left-aligned, line `i` at `y = i * line_height`.
///
/// Stops at the first line whose top would be at or below the bottom edge.
/// Returns how many lines were drawn.
pub fn draw_lines<D>(
    target: &mut D,
    lines: &[String],
    line_height: u32,
    max_chars: usize,
    font: &MonoFont<'_>,
    fg: D::Color,
) -> Result<usize, D::Error>
where
    D: DrawTarget,
{
    let height = target.bounding_box().size.height;
    let style = MonoTextStyle::new(font, fg);

    let mut drawn = 0;
    for (i, line) in lines.iter().enumerate() {
        let y = i as u32 * line_height;
        if y >= height {
            break;
        }
        let text = truncate_chars(line, max_chars);
        Text::with_baseline(text, Point::new(0, y as i32), style, Baseline::Top).draw(target)?;
        drawn += 1;
    }
    Ok(drawn)
}
