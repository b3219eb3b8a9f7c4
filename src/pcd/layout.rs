//! Resolution of the byte position of each field within a row.

use std::sync::Arc;

use log::debug;

use crate::pcd::header::{FieldKind, FieldSpec, Header};
use crate::PcdError;

const GEOMETRY_FIELDS: [&str; 3] = ["x", "y", "z"];

/// The extra byte-wide field of a layout
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtraField {
    pub name: Arc<str>,
    pub offset: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ResolvedField {
    name: String,
    offset: usize,
    width: usize,
}

/// Where each field of a row lives.
///
/// Only rows of the following shape can be turned into points:
///
/// - `x`, `y`, `z` declared one after the other, each a single float32,
/// - optionally a 4 bytes wide `rgb` field,
/// - optionally one more field, 1 byte wide.
///
/// These may be declared in any order, as long as `x`, `y` and `z` stay together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldLayout {
    fields: Vec<ResolvedField>,
    row_stride: usize,
    geometry_offset: usize,
    color_offset: Option<usize>,
    extra: Option<ExtraField>,
}

impl FieldLayout {
    pub fn resolve(header: &Header) -> crate::Result<Self> {
        let mut offset = 0usize;
        let fields = header
            .fields()
            .iter()
            .map(|f| {
                let resolved = ResolvedField {
                    name: f.name().to_string(),
                    offset,
                    width: f.width() as usize,
                };
                offset += resolved.width;
                resolved
            })
            .collect::<Vec<_>>();

        let mut layout = Self {
            fields,
            row_stride: offset,
            geometry_offset: 0,
            color_offset: None,
            extra: None,
        };
        layout.geometry_offset = layout.field_offset(GEOMETRY_FIELDS[0])?;
        let x_index = layout
            .fields
            .iter()
            .position(|f| f.name == GEOMETRY_FIELDS[0])
            .unwrap_or_default();
        check_geometry(&header.fields()[x_index..])?;

        let others = header
            .fields()
            .iter()
            .zip(layout.fields.iter())
            .enumerate()
            .filter(|(i, _)| *i < x_index || *i >= x_index + GEOMETRY_FIELDS.len())
            .map(|(_, pair)| pair);

        let mut extra = None;
        for (spec, resolved) in others {
            if spec.kind() == FieldKind::PackedColor && layout.color_offset.is_none() {
                layout.color_offset = Some(resolved.offset);
                continue;
            }
            if extra.is_some() {
                return Err(PcdError::UnsupportedSchema(format!(
                    "at most one field besides x, y, z and rgb is supported, found {:?} and {:?}",
                    extra.as_ref().map(|e: &ExtraField| e.name.to_string()).unwrap_or_default(),
                    spec.name()
                )));
            }
            if resolved.width != 1 {
                return Err(PcdError::UnsupportedSchema(format!(
                    "field {:?} is {} bytes wide, only 1 byte wide extra fields are supported",
                    spec.name(),
                    resolved.width
                )));
            }
            extra = Some(ExtraField {
                name: Arc::from(spec.name()),
                offset: resolved.offset,
            });
        }
        layout.extra = extra;

        debug!(
            "Resolved layout: stride {}, xyz at {}, rgb at {:?}, extra {:?}",
            layout.row_stride,
            layout.geometry_offset,
            layout.color_offset,
            layout.extra.as_ref().map(|e| (&*e.name, e.offset))
        );
        Ok(layout)
    }

    /// Number of bytes of one row
    pub fn row_stride(&self) -> usize {
        self.row_stride
    }

    /// Offset of the field named `name` within a row
    pub fn field_offset(&self, name: &str) -> crate::Result<usize> {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .map(|f| f.offset)
            .ok_or_else(|| PcdError::UnknownField(name.to_string()))
    }

    /// Offset of `x`, `y` and `z` follow it at +4 and +8
    pub fn geometry_offset(&self) -> usize {
        self.geometry_offset
    }

    pub fn color_offset(&self) -> Option<usize> {
        self.color_offset
    }

    pub fn extra(&self) -> Option<&ExtraField> {
        self.extra.as_ref()
    }

    /// Whether rows are exactly `x y z` or `x y z rgb`
    pub(crate) fn has_only_geometry_and_color(&self) -> bool {
        self.extra.is_none()
            && self.geometry_offset == 0
            && match self.color_offset {
                Some(offset) => offset == 12 && self.row_stride == 16,
                None => self.row_stride == 12,
            }
    }
}

/// `fields` starts at `x`
fn check_geometry(fields: &[FieldSpec]) -> crate::Result<()> {
    let contiguous = fields.len() >= GEOMETRY_FIELDS.len()
        && fields
            .iter()
            .zip(GEOMETRY_FIELDS.iter())
            .all(|(f, name)| f.name() == *name && f.kind() == FieldKind::F32 && f.count() == 1);
    if contiguous {
        Ok(())
    } else {
        let declared = fields
            .iter()
            .take(GEOMETRY_FIELDS.len())
            .map(FieldSpec::name)
            .collect::<Vec<_>>();
        Err(PcdError::UnsupportedSchema(format!(
            "x, y and z must be consecutive single float32 fields, found {:?}",
            declared
        )))
    }
}
