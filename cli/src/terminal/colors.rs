use colored::Color;

pub const PRIMARY: Color = Color::TrueColor { r: 129, g: 199, b: 132 };
pub const ACCENT: Color = Color::TrueColor { r: 255, g: 183, b: 77 };
pub const SEPARATOR: Color = Color::BrightBlack;
pub const TEXT_DEFAULT: Color = Color::White;
pub const IPV4_ADDR: Color = Color::TrueColor { r: 100, g: 181, b: 246 };
pub const FAILURE: Color = Color::Red;
