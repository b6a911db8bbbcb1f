//! Plutus data encoding/decoding utilities
//!
//! Datums and redeemers are Plutus data serialized as CBOR:
//! - Integers: major types 0/1, bignums as tags 2/3
//! - Byte strings: major type 2, chunked into 64-byte pieces when longer
//! - Lists: indefinite-length arrays (empty list is `0x80`)
//! - Constructors: tags 121..=127 and 1280..=1400, tag 102 otherwise
//!
//! Maps are not part of the subset used by this workspace.

use std::fmt;

use blake2::digest::consts::{U28, U32};
use blake2::digest::Digest;
use blake2::Blake2b;
use serde::de::{self, Deserializer};
use serde::ser::{SerializeStruct, Serializer};
use serde::{Deserialize, Serialize};
use vault_core::{DatumHash, TxError};

const MAJOR_UINT: u8 = 0;
const MAJOR_NINT: u8 = 1;
const MAJOR_BYTES: u8 = 2;
const MAJOR_ARRAY: u8 = 4;
const MAJOR_TAG: u8 = 6;

const BREAK: u8 = 0xff;
const MAX_CHUNK: usize = 64;
const MAX_DEPTH: usize = 64;

/// blake2b-224, used for key and script hashes
pub fn blake2b_224(data: &[u8]) -> [u8; 28] {
    let mut hasher = Blake2b::<U28>::new();
    hasher.update(data);
    let mut out = [0u8; 28];
    out.copy_from_slice(&hasher.finalize());
    out
}

/// blake2b-256, used for datum and transaction hashes
pub fn blake2b_256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Blake2b::<U32>::new();
    hasher.update(data);
    let mut out = [0u8; 32];
    out.copy_from_slice(&hasher.finalize());
    out
}

/// Plutus data value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlutusData {
    Constr { tag: u64, fields: Vec<PlutusData> },
    Int(i128),
    Bytes(Vec<u8>),
    List(Vec<PlutusData>),
}

impl PlutusData {
    pub fn bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self::Bytes(bytes.into())
    }

    /// Byte string holding the UTF-8 bytes of `text`
    pub fn utf8(text: &str) -> Self {
        Self::Bytes(text.as_bytes().to_vec())
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Bytes(b) => Some(b),
            _ => None,
        }
    }

    pub fn to_cbor(&self) -> Vec<u8> {
        let mut out = Vec::new();
        self.encode(&mut out);
        out
    }

    pub fn to_cbor_hex(&self) -> String {
        hex::encode(self.to_cbor())
    }

    /// Datum hash: blake2b-256 of the CBOR encoding
    pub fn hash(&self) -> DatumHash {
        DatumHash::from_array(blake2b_256(&self.to_cbor()))
    }

    pub fn from_cbor(bytes: &[u8]) -> Result<Self, TxError> {
        let mut decoder = Decoder::new(bytes);
        let value = decoder.decode_item(0)?;
        if decoder.pos != bytes.len() {
            return Err(invalid(format!(
                "{} trailing bytes after datum",
                bytes.len() - decoder.pos
            )));
        }
        Ok(value)
    }

    pub fn from_cbor_hex(hex_str: &str) -> Result<Self, TxError> {
        let bytes = hex::decode(hex_str.trim()).map_err(|e| invalid(format!("bad hex: {}", e)))?;
        Self::from_cbor(&bytes)
    }

    fn encode(&self, out: &mut Vec<u8>) {
        match self {
            Self::Int(n) => encode_int(*n, out),
            Self::Bytes(b) => encode_bytes(b, out),
            Self::List(items) => encode_list(items, out),
            Self::Constr { tag, fields } => match constr_cbor_tag(*tag) {
                Some(cbor_tag) => {
                    write_header(out, MAJOR_TAG, cbor_tag);
                    encode_list(fields, out);
                }
                None => {
                    write_header(out, MAJOR_TAG, 102);
                    write_header(out, MAJOR_ARRAY, 2);
                    write_header(out, MAJOR_UINT, *tag);
                    encode_list(fields, out);
                }
            },
        }
    }

    fn from_json(value: &serde_json::Value) -> Result<Self, String> {
        match value {
            serde_json::Value::String(s) => hex::decode(s)
                .map(Self::Bytes)
                .map_err(|e| format!("byte string must be hex: {}", e)),
            serde_json::Value::Number(n) => n
                .as_i64()
                .map(|v| Self::Int(v as i128))
                .or_else(|| n.as_u64().map(|v| Self::Int(v as i128)))
                .ok_or_else(|| format!("unsupported number {}", n)),
            serde_json::Value::Array(items) => items
                .iter()
                .map(Self::from_json)
                .collect::<Result<Vec<_>, _>>()
                .map(Self::List),
            serde_json::Value::Object(map) => {
                let tag = map
                    .get("alternative")
                    .and_then(|v| v.as_u64())
                    .ok_or("constructor needs an 'alternative'")?;
                let fields = match map.get("fields") {
                    Some(serde_json::Value::Array(items)) => items
                        .iter()
                        .map(Self::from_json)
                        .collect::<Result<Vec<_>, _>>()?,
                    _ => return Err("constructor needs a 'fields' array".to_string()),
                };
                Ok(Self::Constr { tag, fields })
            }
            other => Err(format!("unsupported plutus data {}", other)),
        }
    }
}

impl fmt::Display for PlutusData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_cbor_hex())
    }
}

/// Serialized in the JSON shape browser SDKs accept as `Data`: byte strings
/// as hex, integers as numbers, lists as arrays, constructors as
/// `{alternative, fields}`.
impl Serialize for PlutusData {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Bytes(b) => serializer.serialize_str(&hex::encode(b)),
            Self::Int(n) => serializer.serialize_i128(*n),
            Self::List(items) => serializer.collect_seq(items),
            Self::Constr { tag, fields } => {
                let mut st = serializer.serialize_struct("Constr", 2)?;
                st.serialize_field("alternative", tag)?;
                st.serialize_field("fields", fields)?;
                st.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for PlutusData {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        Self::from_json(&value).map_err(de::Error::custom)
    }
}

/// Strip one CBOR byte-string layer, if `data` is exactly one byte string.
pub fn unwrap_cbor_bytes(data: &[u8]) -> Option<Vec<u8>> {
    match PlutusData::from_cbor(data) {
        Ok(PlutusData::Bytes(inner)) => Some(inner),
        _ => None,
    }
}

/// Wrap `data` in one CBOR byte-string layer.
pub fn wrap_cbor_bytes(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len() + 9);
    // Script bytes are a single definite-length string, never chunked
    write_header(&mut out, MAJOR_BYTES, data.len() as u64);
    out.extend_from_slice(data);
    out
}

fn invalid(message: impl Into<String>) -> TxError {
    TxError::InvalidDatum {
        message: message.into(),
    }
}

fn constr_cbor_tag(alternative: u64) -> Option<u64> {
    match alternative {
        0..=6 => Some(121 + alternative),
        7..=127 => Some(1280 + alternative - 7),
        _ => None,
    }
}

fn write_header(out: &mut Vec<u8>, major: u8, arg: u64) {
    let m = major << 5;
    if arg < 24 {
        out.push(m | arg as u8);
    } else if arg <= u8::MAX as u64 {
        out.push(m | 24);
        out.push(arg as u8);
    } else if arg <= u16::MAX as u64 {
        out.push(m | 25);
        out.extend_from_slice(&(arg as u16).to_be_bytes());
    } else if arg <= u32::MAX as u64 {
        out.push(m | 26);
        out.extend_from_slice(&(arg as u32).to_be_bytes());
    } else {
        out.push(m | 27);
        out.extend_from_slice(&arg.to_be_bytes());
    }
}

fn encode_bytes(bytes: &[u8], out: &mut Vec<u8>) {
    if bytes.len() <= MAX_CHUNK {
        write_header(out, MAJOR_BYTES, bytes.len() as u64);
        out.extend_from_slice(bytes);
    } else {
        out.push((MAJOR_BYTES << 5) | 31);
        for chunk in bytes.chunks(MAX_CHUNK) {
            write_header(out, MAJOR_BYTES, chunk.len() as u64);
            out.extend_from_slice(chunk);
        }
        out.push(BREAK);
    }
}

fn encode_list(items: &[PlutusData], out: &mut Vec<u8>) {
    if items.is_empty() {
        write_header(out, MAJOR_ARRAY, 0);
        return;
    }
    out.push((MAJOR_ARRAY << 5) | 31);
    for item in items {
        item.encode(out);
    }
    out.push(BREAK);
}

fn encode_int(n: i128, out: &mut Vec<u8>) {
    if n >= 0 {
        if n <= u64::MAX as i128 {
            write_header(out, MAJOR_UINT, n as u64);
        } else {
            write_header(out, MAJOR_TAG, 2);
            encode_bytes(&minimal_be_bytes(n as u128), out);
        }
    } else {
        let magnitude = -1 - n;
        if magnitude <= u64::MAX as i128 {
            write_header(out, MAJOR_NINT, magnitude as u64);
        } else {
            write_header(out, MAJOR_TAG, 3);
            encode_bytes(&minimal_be_bytes(magnitude as u128), out);
        }
    }
}

fn minimal_be_bytes(value: u128) -> Vec<u8> {
    let bytes = value.to_be_bytes();
    let first = bytes.iter().position(|&b| b != 0).unwrap_or(bytes.len() - 1);
    bytes[first..].to_vec()
}

struct Decoder<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Decoder<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn next_byte(&mut self) -> Result<u8, TxError> {
        let b = *self
            .data
            .get(self.pos)
            .ok_or_else(|| invalid("unexpected end of input"))?;
        self.pos += 1;
        Ok(b)
    }

    fn peek(&self) -> Option<u8> {
        self.data.get(self.pos).copied()
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8], TxError> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|end| *end <= self.data.len())
            .ok_or_else(|| invalid("length exceeds input"))?;
        let slice = &self.data[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    /// Returns (major type, argument); `None` marks indefinite length.
    fn read_header(&mut self) -> Result<(u8, Option<u64>), TxError> {
        let initial = self.next_byte()?;
        let major = initial >> 5;
        let info = initial & 0x1f;
        let arg = match info {
            0..=23 => Some(info as u64),
            24 => Some(self.next_byte()? as u64),
            25 => {
                let b = self.take(2)?;
                Some(u16::from_be_bytes([b[0], b[1]]) as u64)
            }
            26 => {
                let b = self.take(4)?;
                Some(u32::from_be_bytes([b[0], b[1], b[2], b[3]]) as u64)
            }
            27 => {
                let b = self.take(8)?;
                let mut buf = [0u8; 8];
                buf.copy_from_slice(b);
                Some(u64::from_be_bytes(buf))
            }
            31 if matches!(major, MAJOR_BYTES | MAJOR_ARRAY) => None,
            _ => {
                return Err(invalid(format!(
                    "unsupported additional info {} for major type {}",
                    info, major
                )))
            }
        };
        Ok((major, arg))
    }

    fn decode_item(&mut self, depth: usize) -> Result<PlutusData, TxError> {
        if depth > MAX_DEPTH {
            return Err(invalid("datum nested too deeply"));
        }
        let (major, arg) = self.read_header()?;
        match (major, arg) {
            (MAJOR_UINT, Some(n)) => Ok(PlutusData::Int(n as i128)),
            (MAJOR_NINT, Some(n)) => Ok(PlutusData::Int(-1 - n as i128)),
            (MAJOR_BYTES, len) => self.read_bytes_body(len).map(PlutusData::Bytes),
            (MAJOR_ARRAY, len) => self.read_list_body(len, depth).map(PlutusData::List),
            (MAJOR_TAG, Some(tag)) => self.decode_tagged(tag, depth),
            (major, _) => Err(invalid(format!("unsupported major type {}", major))),
        }
    }

    fn read_bytes_body(&mut self, len: Option<u64>) -> Result<Vec<u8>, TxError> {
        match len {
            Some(len) => Ok(self.take(len as usize)?.to_vec()),
            None => {
                let mut out = Vec::new();
                loop {
                    if self.peek() == Some(BREAK) {
                        self.pos += 1;
                        return Ok(out);
                    }
                    match self.read_header()? {
                        (MAJOR_BYTES, Some(chunk_len)) => {
                            out.extend_from_slice(self.take(chunk_len as usize)?)
                        }
                        _ => return Err(invalid("byte string chunk expected")),
                    }
                }
            }
        }
    }

    fn read_list_body(
        &mut self,
        len: Option<u64>,
        depth: usize,
    ) -> Result<Vec<PlutusData>, TxError> {
        let mut items = Vec::new();
        match len {
            Some(len) => {
                for _ in 0..len {
                    items.push(self.decode_item(depth + 1)?);
                }
            }
            None => loop {
                if self.peek() == Some(BREAK) {
                    self.pos += 1;
                    break;
                }
                items.push(self.decode_item(depth + 1)?);
            },
        }
        Ok(items)
    }

    fn read_fields(&mut self, depth: usize) -> Result<Vec<PlutusData>, TxError> {
        match self.decode_item(depth + 1)? {
            PlutusData::List(fields) => Ok(fields),
            _ => Err(invalid("constructor fields must be a list")),
        }
    }

    fn decode_tagged(&mut self, tag: u64, depth: usize) -> Result<PlutusData, TxError> {
        match tag {
            121..=127 => Ok(PlutusData::Constr {
                tag: tag - 121,
                fields: self.read_fields(depth)?,
            }),
            1280..=1400 => Ok(PlutusData::Constr {
                tag: tag - 1280 + 7,
                fields: self.read_fields(depth)?,
            }),
            102 => match self.decode_item(depth + 1)? {
                PlutusData::List(mut pair) if pair.len() == 2 => {
                    let fields = match pair.pop() {
                        Some(PlutusData::List(fields)) => fields,
                        _ => return Err(invalid("constructor fields must be a list")),
                    };
                    match pair.pop() {
                        Some(PlutusData::Int(alt)) if alt >= 0 && alt <= u64::MAX as i128 => {
                            Ok(PlutusData::Constr {
                                tag: alt as u64,
                                fields,
                            })
                        }
                        _ => Err(invalid("constructor alternative must be an unsigned int")),
                    }
                }
                _ => Err(invalid("tag 102 expects a two-element array")),
            },
            2 | 3 => {
                let (major, len) = self.read_header()?;
                if major != MAJOR_BYTES {
                    return Err(invalid("bignum payload must be a byte string"));
                }
                let bytes = self.read_bytes_body(len)?;
                if bytes.len() > 16 {
                    return Err(invalid("bignum exceeds 128 bits"));
                }
                let mut buf = [0u8; 16];
                buf[16 - bytes.len()..].copy_from_slice(&bytes);
                let magnitude = u128::from_be_bytes(buf);
                if magnitude > i128::MAX as u128 {
                    return Err(invalid("bignum exceeds 128 bits"));
                }
                let magnitude = magnitude as i128;
                Ok(PlutusData::Int(if tag == 2 { magnitude } else { -1 - magnitude }))
            }
            other => Err(invalid(format!("unsupported tag {}", other))),
        }
    }
}
