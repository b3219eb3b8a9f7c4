use std::sync::Arc;

/// Value of the single extra byte-wide field a point may carry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtraValue {
    /// Name of the field, shared by all the points of a document
    pub name: Arc<str>,
    pub value: u8,
}

/// One decoded point
#[derive(Debug, Clone, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    /// The `rgb` field, as stored: `0x00RRGGBB`
    pub color_packed: Option<u32>,
    pub extra: Option<ExtraValue>,
}

impl Point {
    pub fn xyz(&self) -> [f32; 3] {
        [self.x, self.y, self.z]
    }

    /// Unpacks the color into its (r, g, b) components
    pub fn rgb(&self) -> Option<(u8, u8, u8)> {
        self.color_packed.map(|c| {
            (
                ((c >> 16) & 0xFF) as u8,
                ((c >> 8) & 0xFF) as u8,
                (c & 0xFF) as u8,
            )
        })
    }

    pub fn extra_value(&self) -> Option<u8> {
        self.extra.as_ref().map(|e| e.value)
    }
}
