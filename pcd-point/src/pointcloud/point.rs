use std::fmt;
use std::mem;

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

use crate::pointcloud::field::{FieldDatatype, FieldDescriptor, FieldReflect};

// Binary layout shared with container internals, file I/O and viewers:
//   0..16   data     x, y, z, homogeneous w
//   16..20  rgba     packed color, a<<24 | r<<16 | g<<8 | b
//   20..36  data_c   auxiliary scalars, data_c[0] is confidence_ratio
//   36..48  padding  explicit, so the record has no uninitialized bytes
// Size and alignment are multiples of 16 so contiguous buffers of records
// can be processed with vector instructions.
#[repr(C, align(16))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawConfidencePoint {
    pub data: [f32; 4],
    pub rgba: u32,
    pub data_c: [f32; 4],
    _pad: [u32; 3],
}

unsafe impl Zeroable for RawConfidencePoint {}
unsafe impl Pod for RawConfidencePoint {}

const _: () = assert!(mem::size_of::<RawConfidencePoint>() == 48);
const _: () = assert!(mem::size_of::<RawConfidencePoint>() % 16 == 0);
const _: () = assert!(mem::align_of::<RawConfidencePoint>() % 16 == 0);
const _: () = assert!(mem::size_of::<ConfidencePoint>() == mem::size_of::<RawConfidencePoint>());

/// One sample of a dense point cloud: position, packed RGBA color and a
/// confidence ratio nominally in [0, 1]. The ratio is stored as given,
/// never clamped or range-checked. The homogeneous coordinate is 1.0 for
/// every instance so a record can be fed to 4x4 affine transforms as-is.
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "PointRepr", into = "PointRepr")]
pub struct ConfidencePoint {
    raw: RawConfidencePoint,
}

unsafe impl Zeroable for ConfidencePoint {}
unsafe impl Pod for ConfidencePoint {}

const OPAQUE_BLACK: u32 = 0xff << 24;

impl ConfidencePoint {
    pub fn new(x: f32, y: f32, z: f32, r: u8, g: u8, b: u8, confidence_ratio: f32) -> Self {
        let rgba = OPAQUE_BLACK | (r as u32) << 16 | (g as u32) << 8 | b as u32;
        Self {
            raw: RawConfidencePoint {
                data: [x, y, z, 1.0],
                rgba,
                data_c: [confidence_ratio, 0.0, 0.0, 0.0],
                _pad: [0; 3],
            },
        }
    }

    pub fn from_confidence(confidence_ratio: f32) -> Self {
        Self::new(0.0, 0.0, 0.0, 0, 0, 0, confidence_ratio)
    }

    pub fn from_color(r: u8, g: u8, b: u8) -> Self {
        Self::new(0.0, 0.0, 0.0, r, g, b, 1.0)
    }

    pub fn from_position(x: f32, y: f32, z: f32) -> Self {
        Self::new(x, y, z, 0, 0, 0, 1.0)
    }

    pub fn xyz_rgb(x: f32, y: f32, z: f32, r: u8, g: u8, b: u8) -> Self {
        Self::new(x, y, z, r, g, b, 1.0)
    }

    pub fn x(&self) -> f32 {
        self.raw.data[0]
    }

    pub fn y(&self) -> f32 {
        self.raw.data[1]
    }

    pub fn z(&self) -> f32 {
        self.raw.data[2]
    }

    /// Fourth position coordinate, 1.0 for every live record.
    pub fn homogeneous(&self) -> f32 {
        self.raw.data[3]
    }

    pub fn set_position(&mut self, x: f32, y: f32, z: f32) {
        self.raw.data[0] = x;
        self.raw.data[1] = y;
        self.raw.data[2] = z;
    }

    pub fn rgba(&self) -> u32 {
        self.raw.rgba
    }

    /// Replaces the whole packed color word, alpha included.
    pub fn set_rgba(&mut self, rgba: u32) {
        self.raw.rgba = rgba;
    }

    /// Sets the color channels and forces alpha to opaque.
    pub fn set_rgb(&mut self, r: u8, g: u8, b: u8) {
        self.raw.rgba = OPAQUE_BLACK | (r as u32) << 16 | (g as u32) << 8 | b as u32;
    }

    pub fn r(&self) -> u8 {
        (self.raw.rgba >> 16) as u8
    }

    pub fn g(&self) -> u8 {
        (self.raw.rgba >> 8) as u8
    }

    pub fn b(&self) -> u8 {
        self.raw.rgba as u8
    }

    pub fn a(&self) -> u8 {
        (self.raw.rgba >> 24) as u8
    }

    pub fn confidence_ratio(&self) -> f32 {
        self.raw.data_c[0]
    }

    pub fn set_confidence_ratio(&mut self, confidence_ratio: f32) {
        self.raw.data_c[0] = confidence_ratio;
    }

    pub fn as_raw(&self) -> &RawConfidencePoint {
        &self.raw
    }

    pub fn to_raw(self) -> RawConfidencePoint {
        self.raw
    }
}

impl Default for ConfidencePoint {
    fn default() -> Self {
        Self::from_confidence(1.0)
    }
}

/// Bridge from the plain aggregate handed back by container internals.
///
/// Precondition: the source must actually carry this record's layout. No
/// integrity check is performed on position, color or confidence; the copy
/// takes the packed color word verbatim (alpha included) and forces the
/// homogeneous coordinate back to 1.0.
impl From<RawConfidencePoint> for ConfidencePoint {
    fn from(raw: RawConfidencePoint) -> Self {
        Self {
            raw: RawConfidencePoint {
                data: [raw.data[0], raw.data[1], raw.data[2], 1.0],
                rgba: raw.rgba,
                data_c: [raw.data_c[0], 0.0, 0.0, 0.0],
                _pad: [0; 3],
            },
        }
    }
}

impl fmt::Display for ConfidencePoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}, {}, {} - {}, {}, {}, {} - {})",
            self.x(),
            self.y(),
            self.z(),
            self.r(),
            self.g(),
            self.b(),
            self.a(),
            self.confidence_ratio()
        )
    }
}

impl fmt::Debug for ConfidencePoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfidencePoint")
            .field("x", &self.x())
            .field("y", &self.y())
            .field("z", &self.z())
            .field("rgba", &self.rgba())
            .field("confidence_ratio", &self.confidence_ratio())
            .finish()
    }
}

// Named-field form used for serde, mirroring the reflected field set.
#[derive(Serialize, Deserialize)]
#[serde(rename = "ConfidencePoint")]
struct PointRepr {
    x: f32,
    y: f32,
    z: f32,
    rgba: u32,
    confidence_ratio: f32,
}

impl From<ConfidencePoint> for PointRepr {
    fn from(point: ConfidencePoint) -> Self {
        Self {
            x: point.x(),
            y: point.y(),
            z: point.z(),
            rgba: point.rgba(),
            confidence_ratio: point.confidence_ratio(),
        }
    }
}

impl From<PointRepr> for ConfidencePoint {
    fn from(repr: PointRepr) -> Self {
        let mut point = Self::from_position(repr.x, repr.y, repr.z);
        point.set_rgba(repr.rgba);
        point.set_confidence_ratio(repr.confidence_ratio);
        point
    }
}

static FIELDS: [FieldDescriptor; 5] = [
    FieldDescriptor {
        name: "x",
        datatype: FieldDatatype::Float32,
        count: 1,
        offset: mem::offset_of!(RawConfidencePoint, data) as u32,
    },
    FieldDescriptor {
        name: "y",
        datatype: FieldDatatype::Float32,
        count: 1,
        offset: mem::offset_of!(RawConfidencePoint, data) as u32 + 4,
    },
    FieldDescriptor {
        name: "z",
        datatype: FieldDatatype::Float32,
        count: 1,
        offset: mem::offset_of!(RawConfidencePoint, data) as u32 + 8,
    },
    FieldDescriptor {
        name: "rgba",
        datatype: FieldDatatype::UInt32,
        count: 1,
        offset: mem::offset_of!(RawConfidencePoint, rgba) as u32,
    },
    FieldDescriptor {
        name: "confidence_ratio",
        datatype: FieldDatatype::Float32,
        count: 1,
        offset: mem::offset_of!(RawConfidencePoint, data_c) as u32,
    },
];

impl FieldReflect for ConfidencePoint {
    fn fields() -> &'static [FieldDescriptor] {
        &FIELDS
    }
}
