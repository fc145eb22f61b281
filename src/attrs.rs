// SPDX-License-Identifier: MIT OR Apache-2.0

use core::hash::{Hash, Hasher};

use smol_str::SmolStr;

/// Text color, stored as `0xAARRGGBB`
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Color(pub u32);

impl Color {
    pub const BLACK: Self = Self::rgb(0x00, 0x00, 0x00);
    pub const TRANSPARENT: Self = Self(0);

    /// Create new color with red, green, and blue components
    #[inline]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::rgba(r, g, b, 0xFF)
    }

    /// Create new color with red, green, blue, and alpha components
    #[inline]
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self(((a as u32) << 24) | ((r as u32) << 16) | ((g as u32) << 8) | (b as u32))
    }

    /// Get the red component
    #[inline]
    pub fn r(&self) -> u8 {
        ((self.0 & 0x00_FF_00_00) >> 16) as u8
    }

    /// Get the green component
    #[inline]
    pub fn g(&self) -> u8 {
        ((self.0 & 0x00_00_FF_00) >> 8) as u8
    }

    /// Get the blue component
    #[inline]
    pub fn b(&self) -> u8 {
        (self.0 & 0x00_00_00_FF) as u8
    }

    /// Get the alpha component
    #[inline]
    pub fn a(&self) -> u8 {
        ((self.0 & 0xFF_00_00_00) >> 24) as u8
    }
}

bitflags::bitflags! {
    /// Style bits of a [`Typeface`]
    #[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
    #[repr(transparent)]
    pub struct TypefaceStyle: u8 {
        const BOLD = 1;
        const ITALIC = 2;
    }
}

/// A font family plus style, resolved by the shaping backend
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Typeface {
    pub family: SmolStr,
    pub style: TypefaceStyle,
}

impl Typeface {
    pub fn new(family: &str) -> Self {
        Self {
            family: SmolStr::new(family),
            style: TypefaceStyle::empty(),
        }
    }

    pub fn sans_serif() -> Self {
        Self::new("sans-serif")
    }

    pub fn serif() -> Self {
        Self::new("serif")
    }

    pub fn monospace() -> Self {
        Self::new("monospace")
    }

    /// The default family with the given style applied
    pub fn default_from_style(style: TypefaceStyle) -> Self {
        Self::sans_serif().style(style)
    }

    pub fn style(mut self, style: TypefaceStyle) -> Self {
        self.style = style;
        self
    }
}

/// Shadow layer drawn below the text
#[derive(Clone, Copy, Debug, Default)]
pub struct Shadow {
    pub radius: f32,
    pub dx: f32,
    pub dy: f32,
    pub color: Color,
}

impl PartialEq for Shadow {
    fn eq(&self, other: &Self) -> bool {
        self.radius.to_bits() == other.radius.to_bits()
            && self.dx.to_bits() == other.dx.to_bits()
            && self.dy.to_bits() == other.dy.to_bits()
            && self.color == other.color
    }
}

impl Eq for Shadow {}

impl Hash for Shadow {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.radius.to_bits().hash(state);
        self.dx.to_bits().hash(state);
        self.dy.to_bits().hash(state);
        self.color.hash(state);
    }
}

/// Colors selected by drawable state.
///
/// A state set entry that is positive must be present in the drawable state, a negative entry
/// must be absent. The first matching entry wins; an empty state set matches everything.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct ColorStateList {
    states: Vec<(Vec<i32>, Color)>,
    default_color: Color,
}

impl ColorStateList {
    /// A list holding a single color for every state
    pub fn value_of(color: Color) -> Self {
        Self {
            states: Vec::new(),
            default_color: color,
        }
    }

    pub fn new(states: Vec<(Vec<i32>, Color)>, default_color: Color) -> Self {
        Self {
            states,
            default_color,
        }
    }

    pub fn default_color(&self) -> Color {
        self.default_color
    }

    pub fn is_stateful(&self) -> bool {
        !self.states.is_empty()
    }

    pub fn color_for_state(&self, drawable_state: &[i32], fallback: Color) -> Color {
        self.states
            .iter()
            .find(|(states, _)| state_set_matches(states, drawable_state))
            .map_or(fallback, |(_, color)| *color)
    }
}

fn state_set_matches(states: &[i32], drawable_state: &[i32]) -> bool {
    states.iter().all(|&state| {
        if state >= 0 {
            drawable_state.contains(&state)
        } else {
            state
                .checked_neg()
                .is_some_and(|state| !drawable_state.contains(&state))
        }
    })
}

/// The paint context of a layout: every style value that can change glyph output
#[derive(Clone, Debug)]
pub struct TextStyle {
    pub text_size: f32,
    pub color: Color,
    pub color_state: Option<ColorStateList>,
    pub link_color: Color,
    pub typeface: Option<Typeface>,
    pub shadow: Shadow,
    /// Letter spacing in ems
    pub letter_spacing: f32,
    pub density: f32,
    pub drawable_state: Vec<i32>,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self::new()
    }
}

impl TextStyle {
    pub fn new() -> Self {
        Self {
            text_size: 12.0,
            color: Color::BLACK,
            color_state: None,
            link_color: Color::TRANSPARENT,
            typeface: None,
            shadow: Shadow::default(),
            letter_spacing: 0.0,
            density: 1.0,
            drawable_state: Vec::new(),
        }
    }

    pub fn text_size(mut self, text_size: f32) -> Self {
        self.text_size = text_size;
        self
    }

    pub fn color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn typeface(mut self, typeface: Typeface) -> Self {
        self.typeface = Some(typeface);
        self
    }

    pub fn letter_spacing(mut self, letter_spacing: f32) -> Self {
        self.letter_spacing = letter_spacing;
        self
    }

    pub fn density(mut self, density: f32) -> Self {
        self.density = density;
        self
    }
}

impl PartialEq for TextStyle {
    fn eq(&self, other: &Self) -> bool {
        self.text_size.to_bits() == other.text_size.to_bits()
            && self.color == other.color
            && self.color_state == other.color_state
            && self.link_color == other.link_color
            && self.typeface == other.typeface
            && self.shadow == other.shadow
            && self.letter_spacing.to_bits() == other.letter_spacing.to_bits()
            && self.density.to_bits() == other.density.to_bits()
            && self.drawable_state == other.drawable_state
    }
}

impl Eq for TextStyle {}

impl Hash for TextStyle {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.text_size.to_bits().hash(state);
        self.color.hash(state);
        self.color_state.hash(state);
        self.link_color.hash(state);
        self.typeface.hash(state);
        self.shadow.hash(state);
        self.letter_spacing.to_bits().hash(state);
        self.density.to_bits().hash(state);
        self.drawable_state.hash(state);
    }
}
