use anyhow::{bail, ensure, Context, Result};
use std::collections::BTreeMap;
use std::str::FromStr;

/// Value of erased flash, used to pad gaps and partial pages.
pub const ERASED: u8 = 0xFF;

/// Widest address span an image may cover, far beyond any AVR's flash.
pub const MAX_SPAN: u32 = 1 << 20;

/// One record (line) of an Intel HEX file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Record {
    /// Type 00.
    Data { offset: u16, bytes: Vec<u8> },
    /// Type 01.
    EndOfFile,
    /// Type 02: following offsets are relative to `segment << 4`.
    ExtendedSegmentAddress(u16),
    /// Type 03, ignored.
    StartSegmentAddress,
    /// Type 04: following offsets are relative to `upper << 16`.
    ExtendedLinearAddress(u16),
    /// Type 05, ignored.
    StartLinearAddress,
}

impl FromStr for Record {
    type Err = anyhow::Error;

    fn from_str(line: &str) -> Result<Self> {
        let digits = line.strip_prefix(':').context("missing start code ':'")?;
        let raw = decode_hex_bytes(digits)?;
        ensure!(raw.len() >= 5, "record too short");

        let (body, checksum) = raw.split_at(raw.len() - 1);
        let sum = body.iter().fold(checksum[0], |acc, &b| acc.wrapping_add(b));
        ensure!(sum == 0, "checksum mismatch");

        let count = body[0] as usize;
        let offset = u16::from_be_bytes([body[1], body[2]]);
        let data = &body[4..];
        ensure!(
            data.len() == count,
            "expected {} data bytes, got {}",
            count,
            data.len()
        );

        let word = || -> Result<u16> {
            ensure!(count == 2, "address record must carry 2 bytes");
            Ok(u16::from_be_bytes([data[0], data[1]]))
        };

        Ok(match body[3] {
            0x00 => Record::Data {
                offset,
                bytes: data.to_vec(),
            },
            0x01 => Record::EndOfFile,
            0x02 => Record::ExtendedSegmentAddress(word()?),
            0x03 => Record::StartSegmentAddress,
            0x04 => Record::ExtendedLinearAddress(word()?),
            0x05 => Record::StartLinearAddress,
            other => bail!("unsupported record type 0x{:02X}", other),
        })
    }
}

/// A flat firmware image starting at `base`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    pub base: u32,
    pub bytes: Vec<u8>,
}

impl Image {
    /// Parse an Intel HEX file. Gaps between data records are filled with
    /// [`ERASED`]; a later record overwrites an earlier one at the same address.
    pub fn parse(text: &str) -> Result<Image> {
        let mut memory: BTreeMap<u32, u8> = BTreeMap::new();
        let mut upper: u32 = 0;

        for (index, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let record: Record = line
                .parse()
                .with_context(|| format!("line {}", index + 1))?;

            match record {
                Record::Data { offset, bytes } => {
                    // the first address past the record has to fit, so `end()` can't overflow
                    let end = offset as u32 + bytes.len() as u32;
                    if upper.checked_add(end).is_none() {
                        bail!("line {}: address overflow", index + 1);
                    }
                    let start = upper + offset as u32;
                    for (i, byte) in bytes.into_iter().enumerate() {
                        memory.insert(start + i as u32, byte);
                    }
                }
                Record::EndOfFile => break,
                Record::ExtendedSegmentAddress(segment) => upper = (segment as u32) << 4,
                Record::ExtendedLinearAddress(high) => upper = (high as u32) << 16,
                Record::StartSegmentAddress | Record::StartLinearAddress => {}
            }
        }

        let (Some((&first, _)), Some((&last, _))) =
            (memory.first_key_value(), memory.last_key_value())
        else {
            bail!("no data records in HEX file");
        };
        ensure!(
            last - first < MAX_SPAN,
            "data spans 0x{:X}..=0x{:X}, more than {} bytes",
            first,
            last,
            MAX_SPAN
        );

        let mut bytes = vec![ERASED; (last - first + 1) as usize];
        for (address, byte) in memory {
            bytes[(address - first) as usize] = byte;
        }
        Ok(Image { base: first, bytes })
    }

    /// First address past the image.
    pub fn end(&self) -> u32 {
        self.base + self.bytes.len() as u32
    }

    /// Split into page-aligned blocks of exactly `size` bytes, padding the
    /// first and last with [`ERASED`].
    pub fn pages(&self, size: usize) -> Vec<(u32, Vec<u8>)> {
        let size32 = size as u32;
        let mut address = self.base - self.base % size32;
        let mut pages = Vec::new();

        while address < self.end() {
            let mut page = vec![ERASED; size];
            for (i, slot) in page.iter_mut().enumerate() {
                let at = address + i as u32;
                if at >= self.base && at < self.end() {
                    *slot = self.bytes[(at - self.base) as usize];
                }
            }
            pages.push((address, page));
            address += size32;
        }
        pages
    }
}

fn decode_hex_bytes(hex: &str) -> Result<Vec<u8>> {
    if hex.len() % 2 != 0 {
        bail!("odd number of hex characters");
    }
    (0..hex.len())
        .step_by(2)
        .map(|i| {
            hex.get(i..i + 2)
                .and_then(|pair| u8::from_str_radix(pair, 16).ok())
                .with_context(|| format!("invalid hex at position {}", i))
        })
        .collect()
}
