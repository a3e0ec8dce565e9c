//! Shared test helpers: a conforming decoder for the binary COPY stream.

#![allow(dead_code)]
#![allow(clippy::unwrap_used)]

/// One decoded row of the bulk-copy stream.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedRow {
    pub seed_value: i64,
    pub seed_type: i32,
    pub digest: [u8; 32],
    pub hilbert_high: i64,
    pub hilbert_low: i64,
    pub ewkb_type: u32,
    pub srid: u32,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub m: f64,
}

struct Cursor<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn take(&mut self, n: usize) -> &'a [u8] {
        let slice = &self.bytes[self.pos..self.pos + n];
        self.pos += n;
        slice
    }

    fn u16_be(&mut self) -> u16 {
        u16::from_be_bytes(self.take(2).try_into().unwrap())
    }

    fn i32_be(&mut self) -> i32 {
        i32::from_be_bytes(self.take(4).try_into().unwrap())
    }

    fn i64_be(&mut self) -> i64 {
        i64::from_be_bytes(self.take(8).try_into().unwrap())
    }

    fn u32_le(&mut self) -> u32 {
        u32::from_le_bytes(self.take(4).try_into().unwrap())
    }

    fn f64_le(&mut self) -> f64 {
        f64::from_le_bytes(self.take(8).try_into().unwrap())
    }
}

/// Decode one complete stream: signature block, rows, trailer.
///
/// Panics on any framing violation, which is the point: the encoder must
/// produce streams a conforming reader accepts.
pub fn decode_stream(bytes: &[u8]) -> Vec<DecodedRow> {
    let mut cursor = Cursor { bytes, pos: 0 };

    assert_eq!(cursor.take(11), &b"PGCOPY\n\xff\r\n\0"[..], "stream signature");
    assert_eq!(cursor.i32_be(), 0, "flags field");
    assert_eq!(cursor.i32_be(), 0, "header extension length");

    let mut rows = Vec::new();
    loop {
        let field_count = cursor.u16_be();
        if field_count == 0xFFFF {
            break;
        }
        assert_eq!(field_count, 6, "fields per row");

        assert_eq!(cursor.i32_be(), 8);
        let seed_value = cursor.i64_be();

        assert_eq!(cursor.i32_be(), 4);
        let seed_type = cursor.i32_be();

        assert_eq!(cursor.i32_be(), 32);
        let digest: [u8; 32] = cursor.take(32).try_into().unwrap();

        assert_eq!(cursor.i32_be(), 8);
        let hilbert_high = cursor.i64_be();

        assert_eq!(cursor.i32_be(), 8);
        let hilbert_low = cursor.i64_be();

        assert_eq!(cursor.i32_be(), 41);
        assert_eq!(cursor.take(1)[0], 0x01, "EWKB little-endian marker");
        let ewkb_type = cursor.u32_le();
        let srid = cursor.u32_le();
        let x = cursor.f64_le();
        let y = cursor.f64_le();
        let z = cursor.f64_le();
        let m = cursor.f64_le();

        rows.push(DecodedRow {
            seed_value,
            seed_type,
            digest,
            hilbert_high,
            hilbert_low,
            ewkb_type,
            srid,
            x,
            y,
            z,
            m,
        });
    }

    assert_eq!(cursor.pos, bytes.len(), "no bytes after the trailer");
    rows
}
