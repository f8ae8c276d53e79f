pub use ab_glyph::PxScale;
pub use image::Rgb;
pub use plotters::prelude::RGBColor;

pub const B_BLACK: RGBColor = RGBColor(22, 26, 30);
pub const B_GRID: RGBColor = RGBColor(38, 42, 46);
// Series
pub const ACTUAL: RGBColor = RGBColor(255, 215, 0);
pub const MODEL: RGBColor = RGBColor(77, 255, 77);
pub const ACCURACY: RGBColor = RGBColor(0, 210, 255);
pub const POINT_FILL: RGBColor = RGBColor(255, 255, 255);
// Threshold band
pub const HIGH_BAND: RGBColor = RGBColor(255 / 2, 77 / 2, 77 / 2);
pub const LOW_BAND: RGBColor = RGBColor(77 / 2, 255 / 2, 77 / 2);
// Axis
pub const AXIS_SCALE: PxScale = PxScale { x: 16.0, y: 16.0 };
pub const AXIS_COLOR: Rgb<u8> = Rgb([161, 161, 161]);
pub const AXIS_ACCURACY_COLOR: Rgb<u8> = Rgb([77, 255, 77]);
// Label
pub const LABEL_SCALE: PxScale = PxScale { x: 14.0, y: 14.0 };
pub const LABEL_BG_COLOR: Rgb<u8> = Rgb([22, 26, 30]);
pub const ACTUAL_LABEL: Rgb<u8> = Rgb([ACTUAL.0, ACTUAL.1, ACTUAL.2]);
pub const MODEL_LABEL: Rgb<u8> = Rgb([MODEL.0, MODEL.1, MODEL.2]);
pub const ACCURACY_LABEL: Rgb<u8> = Rgb([ACCURACY.0, ACCURACY.1, ACCURACY.2]);
// Point
pub const POINT_RADIUS: i32 = 3;

