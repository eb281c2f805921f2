use crate::core::zone::Zone;

/// Fill alpha of graded zones
const ZONE_ALPHA: u8 = 0x70;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const TRANSPARENT: Rgba = Rgba::new(0, 0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// KML color, `aabbggrr`.
    pub fn to_kml_hex(&self) -> String {
        format!("{:02x}{:02x}{:02x}{:02x}", self.a, self.b, self.g, self.r)
    }

    /// CSS color without alpha, `#rrggbb`.
    pub fn to_css_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    pub fn opacity(&self) -> f64 {
        f64::from(self.a) / 255.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ZoneStyle {
    pub id: String,
    pub fill: Rgba,
    pub outline_width: f64,
}

impl ZoneStyle {
    pub fn for_zone(zone: Zone, grades: u32) -> Self {
        let fill = match zone {
            Zone::Graded(i) => zone_color(i, grades),
            Zone::Denied => Rgba::TRANSPARENT,
        };
        Self {
            id: zone.style_id(),
            fill,
            outline_width: 0.0,
        }
    }

    /// Invisible style of the sampled-area outline.
    pub fn boundary() -> Self {
        Self {
            id: "boundary".to_string(),
            fill: Rgba::TRANSPARENT,
            outline_width: 1.0,
        }
    }
}

/// Green to yellow to red ramp over `grades` zones.
pub fn zone_color(index: u32, grades: u32) -> Rgba {
    let t = if grades <= 1 {
        0.0
    } else {
        f64::from(index.min(grades - 1)) / f64::from(grades - 1)
    };
    let p = 2.0 * t;

    let (r, g) = if p <= 1.0 {
        ((255.0 * p).round() as u8, 0xFF)
    } else {
        (0xFF, (255.0 * (2.0 - p)).round() as u8)
    };
    Rgba::new(r, g, 0, ZONE_ALPHA)
}

/// Denied style followed by one style per graded zone.
pub fn zone_styles(grades: u32) -> Vec<ZoneStyle> {
    std::iter::once(Zone::Denied)
        .chain((0..grades).map(Zone::Graded))
        .map(|zone| ZoneStyle::for_zone(zone, grades))
        .collect()
}
