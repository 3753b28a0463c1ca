//    Copyright 2018 Manuel Reinhardt
//
//    Licensed under the Apache License, Version 2.0 (the "License");
//    you may not use this file except in compliance with the License.
//    You may obtain a copy of the License at
//
//        http://www.apache.org/licenses/LICENSE-2.0
//
//    Unless required by applicable law or agreed to in writing, software
//    distributed under the License is distributed on an "AS IS" BASIS,
//    WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//    See the License for the specific language governing permissions and
//    limitations under the License.

//! CFF DICT reader/writer (`spec.md` §4.4.3-4): an operand-operator stream
//! keyed by a one- or two-byte operator. Grounded in the integer encoding
//! table and BCD real encoding from the teacher's
//! `cff/dictionary_deserializer.rs`, reworked from a serde `Deserializer`
//! into a plain `HashMap`-backed reader/writer since this crate's DICT
//! values are consumed positionally (`charstrings`, `private = [size, off]`)
//! rather than through a derived struct.

use std::collections::BTreeMap;

use nom::{be_i16, be_i32, be_u8};

use crate::error::ParserError;

/// A DICT operator: one byte (0..=21, excluding the 12 escape) or a 12-escape
/// two-byte pair. Encoded as a single `u16` key so the dict can use a plain
/// ordered map: short operators keep their byte value, long operators are
/// offset by 1200 (comfortably above the 0..=21 short range).
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Operator(pub u16);

impl Operator {
    pub const fn short(b0: u8) -> Operator {
        Operator(b0 as u16)
    }

    pub const fn long(b1: u8) -> Operator {
        Operator(1200 + b1 as u16)
    }
}

pub const VERSION: Operator = Operator::short(0);
pub const NOTICE: Operator = Operator::short(1);
pub const FULL_NAME: Operator = Operator::short(2);
pub const FAMILY_NAME: Operator = Operator::short(3);
pub const WEIGHT: Operator = Operator::short(4);
pub const FONT_BBOX: Operator = Operator::short(5);
pub const UNIQUE_ID: Operator = Operator::short(13);
pub const CHARSET: Operator = Operator::short(15);
pub const ENCODING: Operator = Operator::short(16);
pub const CHAR_STRINGS: Operator = Operator::short(17);
pub const PRIVATE: Operator = Operator::short(18);
pub const SUBRS: Operator = Operator::short(19);
pub const DEFAULT_WIDTH_X: Operator = Operator::short(20);
pub const NOMINAL_WIDTH_X: Operator = Operator::short(21);
pub const COPYRIGHT: Operator = Operator::long(0);
pub const IS_FIXED_PITCH: Operator = Operator::long(1);
pub const ITALIC_ANGLE: Operator = Operator::long(2);
pub const UNDERLINE_POSITION: Operator = Operator::long(3);
pub const UNDERLINE_THICKNESS: Operator = Operator::long(4);
pub const CHARSTRING_TYPE: Operator = Operator::long(6);
pub const FONT_MATRIX: Operator = Operator::long(7);
pub const STROKE_WIDTH: Operator = Operator::long(8);
pub const ROS: Operator = Operator::long(30);
pub const FD_ARRAY: Operator = Operator::long(36);
pub const FD_SELECT: Operator = Operator::long(37);

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Operand {
    Integer(i32),
    Real(f64),
}

impl Operand {
    pub fn as_i32(self) -> i32 {
        match self {
            Operand::Integer(i) => i,
            Operand::Real(f) => f as i32,
        }
    }

    pub fn as_f64(self) -> f64 {
        match self {
            Operand::Integer(i) => i as f64,
            Operand::Real(f) => f,
        }
    }
}

/// A parsed DICT: operator -> operand list, in first-seen order preserved by
/// the underlying `BTreeMap`'s key order (stable across reader and writer).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dict(BTreeMap<Operator, Vec<Operand>>);

impl Dict {
    pub fn get(&self, op: Operator) -> Option<&[Operand]> {
        self.0.get(&op).map(|v| v.as_slice())
    }

    pub fn get_int(&self, op: Operator) -> Option<i32> {
        self.get(op)?.last().map(|o| o.as_i32())
    }

    pub fn get_ints(&self, op: Operator) -> Option<Vec<i32>> {
        self.get(op).map(|v| v.iter().map(|o| o.as_i32()).collect())
    }

    /// `private = [size, offset]`, per §4.4.3.
    pub fn get_private(&self) -> Option<(usize, usize)> {
        let v = self.get(PRIVATE)?;
        if v.len() < 2 {
            return None;
        }
        Some((v[0].as_i32() as usize, v[1].as_i32() as usize))
    }

    pub fn set(&mut self, op: Operator, operands: Vec<Operand>) {
        self.0.insert(op, operands);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Operator, &Vec<Operand>)> {
        self.0.iter()
    }
}

named!(parse_operator<&[u8], Operator>,
    switch!(be_u8,
        12 => map!(be_u8, Operator::long) |
        x @ 0...21 => value!(Operator::short(x))
    )
);

const REAL_NIBBLES: [&str; 16] = [
    "0", "1", "2", "3", "4", "5", "6", "7", "8", "9", ".", "E", "E-", "", "-", "",
];

fn parse_real(input: &[u8]) -> Result<(&[u8], f64), ParserError> {
    let mut text = String::new();
    let mut pos = 0usize;
    loop {
        let byte = *input.get(pos).ok_or_else(ParserError::truncated)?;
        pos += 1;
        let high = (byte >> 4) & 0xF;
        let low = byte & 0xF;
        if high == 0xF {
            break;
        }
        text.push_str(REAL_NIBBLES[high as usize]);
        if low == 0xF {
            break;
        }
        text.push_str(REAL_NIBBLES[low as usize]);
    }
    let value = text.parse().unwrap_or(0.0);
    Ok((&input[pos..], value))
}

fn parse_operand(input: &[u8]) -> Result<(&[u8], Operand), ParserError> {
    let b0 = *input.get(0).ok_or_else(ParserError::truncated)?;
    let rest = &input[1..];
    match b0 {
        28 => {
            let (rest, v) = be_i16(rest).map_err(|e: nom::Err<&[u8]>| -> ParserError { e.into() })?;
            Ok((rest, Operand::Integer(v as i32)))
        }
        29 => {
            let (rest, v) = be_i32(rest).map_err(|e: nom::Err<&[u8]>| -> ParserError { e.into() })?;
            Ok((rest, Operand::Integer(v)))
        }
        30 => {
            let (rest, v) = parse_real(rest)?;
            Ok((rest, Operand::Real(v)))
        }
        32..=246 => Ok((rest, Operand::Integer(b0 as i32 - 139))),
        247..=250 => {
            let b1 = *rest.get(0).ok_or_else(ParserError::truncated)?;
            Ok((&rest[1..], Operand::Integer((b0 as i32 - 247) * 256 + b1 as i32 + 108)))
        }
        251..=254 => {
            let b1 = *rest.get(0).ok_or_else(ParserError::truncated)?;
            Ok((&rest[1..], Operand::Integer(-(b0 as i32 - 251) * 256 - b1 as i32 - 108)))
        }
        other => Err(ParserError::corrupt(format!("cff DICT operand byte {}", other))),
    }
}

/// Scan an operand-operator stream into a `Dict` (`spec.md` §4.4.3).
pub fn parse_dict(data: &[u8]) -> Result<Dict, ParserError> {
    let mut dict = Dict::default();
    let mut operands = Vec::new();
    let mut rest = data;

    while !rest.is_empty() {
        let b0 = rest[0];
        if b0 <= 21 {
            let (next, op) = parse_operator(rest).map_err(|e: nom::Err<&[u8]>| -> ParserError { e.into() })?;
            dict.set(op, std::mem::take(&mut operands));
            rest = next;
        } else {
            let (next, operand) = parse_operand(rest)?;
            operands.push(operand);
            rest = next;
        }
    }
    Ok(dict)
}

fn write_integer(out: &mut Vec<u8>, v: i32) {
    match v {
        -107..=107 => out.push((v + 139) as u8),
        108..=1131 => {
            let v = v - 108;
            out.push(247 + (v >> 8) as u8);
            out.push((v & 0xFF) as u8);
        }
        -1131..=-108 => {
            let v = -v - 108;
            out.push(251 + (v >> 8) as u8);
            out.push((v & 0xFF) as u8);
        }
        -32768..=32767 => {
            out.push(28);
            out.extend_from_slice(&(v as i16).to_be_bytes());
        }
        _ => {
            out.push(29);
            out.extend_from_slice(&v.to_be_bytes());
        }
    }
}

fn write_real(out: &mut Vec<u8>, v: f64) {
    out.push(30);
    let text = format!("{}", v);
    let mut nibbles: Vec<u8> = Vec::with_capacity(text.len() + 1);
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        let nibble = match c {
            '0'..='9' => c as u8 - b'0',
            '.' => 0xA,
            '-' => {
                if chars.peek() == None {
                    0xE
                } else {
                    0xE
                }
            }
            'e' | 'E' => {
                if chars.peek() == Some(&'-') {
                    chars.next();
                    0xC
                } else {
                    chars.next(); // consume the leading '+' nom emits, if any
                    0xB
                }
            }
            _ => continue,
        };
        nibbles.push(nibble);
    }
    nibbles.push(0xF);
    if nibbles.len() % 2 != 0 {
        nibbles.push(0xF);
    }
    for pair in nibbles.chunks(2) {
        out.push((pair[0] << 4) | pair[1]);
    }
}

fn write_operand(out: &mut Vec<u8>, operand: &Operand) {
    match *operand {
        Operand::Integer(v) => write_integer(out, v),
        Operand::Real(v) => write_real(out, v),
    }
}

fn write_operator(out: &mut Vec<u8>, op: Operator) {
    if op.0 >= 1200 {
        out.push(12);
        out.push((op.0 - 1200) as u8);
    } else {
        out.push(op.0 as u8);
    }
}

/// Serialize a `Dict` back to a DICT byte stream (`spec.md` §4.4.4).
pub fn write_dict(dict: &Dict) -> Vec<u8> {
    let mut out = Vec::new();
    for (op, operands) in dict.iter() {
        for operand in operands {
            write_operand(&mut out, operand);
        }
        write_operator(&mut out, *op);
    }
    out
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parses_small_integers() {
        assert_eq!(parse_operand(&[0x8b]).unwrap().1, Operand::Integer(0));
        assert_eq!(parse_operand(&[0xef]).unwrap().1, Operand::Integer(100));
        assert_eq!(parse_operand(&[0x27]).unwrap().1, Operand::Integer(-100));
    }

    #[test]
    fn parses_medium_and_large_integers() {
        assert_eq!(parse_operand(&[0xfa, 0x7c]).unwrap().1, Operand::Integer(1000));
        assert_eq!(parse_operand(&[0xfe, 0x7c]).unwrap().1, Operand::Integer(-1000));
        assert_eq!(parse_operand(&[0x1c, 0x27, 0x10]).unwrap().1, Operand::Integer(10000));
        assert_eq!(
            parse_operand(&[0x1d, 0x00, 0x01, 0x86, 0xa0]).unwrap().1,
            Operand::Integer(100000)
        );
    }

    #[test]
    fn parses_real_operand() {
        let (_, v) = parse_operand(&[0x1e, 0xe2, 0xa2, 0x5f]).unwrap();
        assert_eq!(v, Operand::Real(-2.25));
    }

    #[test]
    fn roundtrips_integer_encoding() {
        for v in [0, 100, -100, 1000, -1000, 10000, -10000, 100000, -100000] {
            let mut out = Vec::new();
            write_integer(&mut out, v);
            let (rest, parsed) = parse_operand(&out).unwrap();
            assert!(rest.is_empty());
            assert_eq!(parsed.as_i32(), v);
        }
    }

    #[test]
    fn parses_two_entry_dict() {
        let data = [0x8b, 0x1c, 0xd8, 0xf0, 0x0c, 0x00, 0x1c, 0xd8, 0xf0, 0x00];
        let dict = parse_dict(&data).unwrap();
        assert_eq!(dict.get_ints(COPYRIGHT), Some(vec![0, -10000]));
        assert_eq!(dict.get_int(VERSION), Some(-10000));
    }

    #[test]
    fn private_operand_pair_decodes_as_size_offset() {
        let mut data = Vec::new();
        write_integer(&mut data, 100); // size
        write_integer(&mut data, 2000); // offset
        write_operator(&mut data, PRIVATE);
        let dict = parse_dict(&data).unwrap();
        assert_eq!(dict.get_private(), Some((100, 2000)));
    }
}
