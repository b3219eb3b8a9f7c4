#![allow(dead_code)]
use std::collections::HashMap;

use byteorder::{LittleEndian, WriteBytesExt};

/// Declaration of one field, as written in the header
#[derive(Clone, Copy)]
pub struct Field {
    pub name: &'static str,
    pub size: u32,
    pub ty: char,
    pub count: u32,
}

pub const XYZ: [Field; 3] = [
    Field { name: "x", size: 4, ty: 'F', count: 1 },
    Field { name: "y", size: 4, ty: 'F', count: 1 },
    Field { name: "z", size: 4, ty: 'F', count: 1 },
];

pub const RGB: Field = Field { name: "rgb", size: 4, ty: 'U', count: 1 };

pub fn header_text(fields: &[Field], points: u32, data: &str, line_ending: &str) -> String {
    let lines = vec![
        "# .PCD v0.7 - Point Cloud Data file format".to_string(),
        "VERSION 0.7".to_string(),
        format!("FIELDS {}", join(fields, |f| f.name.to_string())),
        format!("SIZE {}", join(fields, |f| f.size.to_string())),
        format!("TYPE {}", join(fields, |f| f.ty.to_string())),
        format!("COUNT {}", join(fields, |f| f.count.to_string())),
        format!("WIDTH {}", points),
        "HEIGHT 1".to_string(),
        "VIEWPOINT 0 0 0 1 0 0 0".to_string(),
        format!("POINTS {}", points),
        format!("DATA {}", data),
    ];
    let mut text = lines.join(line_ending);
    text.push_str(line_ending);
    text
}

fn join<F: Fn(&Field) -> String>(fields: &[Field], f: F) -> String {
    fields.iter().map(f).collect::<Vec<_>>().join(" ")
}

/// A deterministic cloud with a color per point
pub fn sample_cloud(n: usize) -> Vec<(f32, f32, f32, u32)> {
    (0..n)
        .map(|i| {
            let t = i as f32 * 0.25;
            (t.sin() * 10.0, t.cos() * 10.0, (i % 17) as f32, 0x00FF_0000 | (i as u32 & 0xFFFF))
        })
        .collect()
}

pub fn interleaved_payload(points: &[(f32, f32, f32, u32)], with_color: bool) -> Vec<u8> {
    let mut out = Vec::new();
    for &(x, y, z, rgb) in points {
        out.write_f32::<LittleEndian>(x).unwrap();
        out.write_f32::<LittleEndian>(y).unwrap();
        out.write_f32::<LittleEndian>(z).unwrap();
        if with_color {
            out.write_u32::<LittleEndian>(rgb).unwrap();
        }
    }
    out
}

pub fn planar_payload(points: &[(f32, f32, f32, u32)], with_color: bool) -> Vec<u8> {
    let mut out = Vec::new();
    for p in points {
        out.write_f32::<LittleEndian>(p.0).unwrap();
    }
    for p in points {
        out.write_f32::<LittleEndian>(p.1).unwrap();
    }
    for p in points {
        out.write_f32::<LittleEndian>(p.2).unwrap();
    }
    if with_color {
        for p in points {
            out.write_u32::<LittleEndian>(p.3).unwrap();
        }
    }
    out
}

/// A whole `DATA binary` file
pub fn binary_file(points: &[(f32, f32, f32, u32)], with_color: bool) -> Vec<u8> {
    let fields = fields_for(with_color);
    let mut bytes = header_text(&fields, points.len() as u32, "binary", "\n").into_bytes();
    bytes.extend_from_slice(&interleaved_payload(points, with_color));
    bytes
}

/// A whole `DATA binary_compressed` file
pub fn compressed_file(points: &[(f32, f32, f32, u32)], with_color: bool) -> Vec<u8> {
    let fields = fields_for(with_color);
    let mut bytes =
        header_text(&fields, points.len() as u32, "binary_compressed", "\n").into_bytes();
    let planes = planar_payload(points, with_color);
    let stream = lzf_compress(&planes);
    bytes.write_u32::<LittleEndian>(stream.len() as u32).unwrap();
    bytes.write_u32::<LittleEndian>(planes.len() as u32).unwrap();
    bytes.extend_from_slice(&stream);
    bytes
}

fn fields_for(with_color: bool) -> Vec<Field> {
    let mut fields = XYZ.to_vec();
    if with_color {
        fields.push(RGB);
    }
    fields
}

const MAX_LITERAL: usize = 32;
const MAX_OFFSET: usize = 1 << 13;
const MAX_MATCH: usize = 7 + 255 + 2;

/// Greedy LZF compressor, used to produce streams mixing literal runs and
/// back-references of every size.
pub fn lzf_compress(input: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(input.len() + input.len() / MAX_LITERAL + 1);
    let mut literals: Vec<u8> = Vec::with_capacity(MAX_LITERAL);
    let mut last_seen: HashMap<[u8; 3], usize> = HashMap::new();

    let flush = |literals: &mut Vec<u8>, out: &mut Vec<u8>| {
        if !literals.is_empty() {
            out.push((literals.len() - 1) as u8);
            out.extend_from_slice(literals);
            literals.clear();
        }
    };

    let mut i = 0;
    while i < input.len() {
        let candidate = if i + 3 <= input.len() {
            let key = [input[i], input[i + 1], input[i + 2]];
            let candidate = last_seen.insert(key, i);
            candidate.filter(|&c| i - c <= MAX_OFFSET)
        } else {
            None
        };

        if let Some(c) = candidate {
            let mut len = 3;
            while i + len < input.len() && len < MAX_MATCH && input[c + len] == input[i + len] {
                len += 1;
            }
            flush(&mut literals, &mut out);
            let offset = i - c - 1;
            let encoded_len = len - 2;
            if encoded_len < 7 {
                out.push(((encoded_len << 5) | (offset >> 8)) as u8);
            } else {
                out.push(((7 << 5) | (offset >> 8)) as u8);
                out.push((encoded_len - 7) as u8);
            }
            out.push((offset & 0xFF) as u8);
            for j in i + 1..(i + len).min(input.len().saturating_sub(2)) {
                last_seen.insert([input[j], input[j + 1], input[j + 2]], j);
            }
            i += len;
        } else {
            literals.push(input[i]);
            if literals.len() == MAX_LITERAL {
                flush(&mut literals, &mut out);
            }
            i += 1;
        }
    }
    flush(&mut literals, &mut out);
    out
}
