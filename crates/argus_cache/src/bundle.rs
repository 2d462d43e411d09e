//! The binary container format for a file's generated flow-IR units.
//!
//! All units generated for one source file are packed into a single
//! self-describing blob stored under the file's cache key. The layout is
//! little-endian throughout: `entryCount:u32`, then per entry
//! `nameLen:u32, nameBytes:UTF-8, contentLen:u32, contentBytes`. An empty
//! bundle encodes as `entryCount=0` and nothing else.
//!
//! Decoding tracks an explicit cursor and bounds-checks every read, so a
//! truncated or garbled blob yields [`CacheError::Corrupted`] instead of a
//! partial bundle or an out-of-range access.

use std::collections::HashSet;

use crate::error::CacheError;

/// One generated flow-IR unit: a named byte payload.
///
/// The name is a relative path unique within the bundle. It disambiguates
/// units belonging to the same source file; it is validated before any real
/// filesystem interaction, never written verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IrUnit {
    /// Relative-path name, unique within the bundle.
    pub name: String,

    /// Serialized unit content.
    pub content: Vec<u8>,
}

/// An ordered collection of the flow-IR units generated for one file.
///
/// Built either by the current analysis (to be persisted at end of run) or
/// by decoding a cached blob (to be replayed into the working output). An
/// empty bundle is valid and distinct from "no cache entry".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnitBundle {
    units: Vec<IrUnit>,
}

impl UnitBundle {
    /// Creates an empty bundle.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a unit, validating its name and rejecting duplicates.
    pub fn push(
        &mut self,
        name: impl Into<String>,
        content: impl Into<Vec<u8>>,
    ) -> Result<(), CacheError> {
        let name = name.into();
        if let Some(reason) = unit_name_problem(&name) {
            return Err(CacheError::InvalidUnitName { name, reason });
        }
        if self.units.iter().any(|u| u.name == name) {
            return Err(CacheError::DuplicateUnitName { name });
        }
        self.units.push(IrUnit {
            name,
            content: content.into(),
        });
        Ok(())
    }

    /// Returns the units in insertion order.
    pub fn units(&self) -> &[IrUnit] {
        &self.units
    }

    /// Returns the number of units in the bundle.
    pub fn len(&self) -> usize {
        self.units.len()
    }

    /// Returns `true` if the bundle holds no units.
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Encodes the bundle into the self-describing binary entry format.
    pub fn encode(&self) -> Result<Vec<u8>, CacheError> {
        let count = length_field(self.units.len(), "entry count")?;

        let total: usize = self
            .units
            .iter()
            .map(|u| 8 + u.name.len() + u.content.len())
            .sum();
        let mut out = Vec::with_capacity(4 + total);
        out.extend_from_slice(&count.to_le_bytes());

        for unit in &self.units {
            let name = unit.name.as_bytes();
            let name_len = length_field(name.len(), "unit name")?;
            out.extend_from_slice(&name_len.to_le_bytes());
            out.extend_from_slice(name);

            let content_len = length_field(unit.content.len(), "unit content")?;
            out.extend_from_slice(&content_len.to_le_bytes());
            out.extend_from_slice(&unit.content);
        }

        Ok(out)
    }

    /// Decodes a stored blob back into a bundle.
    ///
    /// Fails with [`CacheError::Corrupted`] on any structural inconsistency:
    /// truncation, a length field exceeding the remaining buffer, trailing
    /// bytes, a non-UTF-8 or unsafe name, or a duplicate name. A malformed
    /// blob is never partially accepted.
    pub fn decode(bytes: &[u8]) -> Result<Self, CacheError> {
        let mut reader = Reader::new(bytes);
        let count = reader.read_u32("entry count")?;

        let mut units = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();

        for _ in 0..count {
            let name_len = reader.read_u32("unit name length")? as usize;
            let name_bytes = reader.read_bytes(name_len, "unit name")?;
            let name = std::str::from_utf8(name_bytes)
                .map_err(|_| corrupted("unit name is not valid UTF-8"))?;
            if let Some(reason) = unit_name_problem(name) {
                return Err(CacheError::Corrupted {
                    reason: format!("unsafe unit name '{name}': {reason}"),
                });
            }
            if !seen.insert(name.to_string()) {
                return Err(CacheError::Corrupted {
                    reason: format!("duplicate unit name '{name}'"),
                });
            }

            let content_len = reader.read_u32("unit content length")? as usize;
            let content = reader.read_bytes(content_len, "unit content")?.to_vec();

            units.push(IrUnit {
                name: name.to_string(),
                content,
            });
        }

        if reader.remaining() != 0 {
            return Err(CacheError::Corrupted {
                reason: format!("{} trailing byte(s) after last entry", reader.remaining()),
            });
        }

        Ok(Self { units })
    }
}

/// Checks that a unit name is a safe relative path.
///
/// Returns a description of the problem, or `None` for a valid name. Valid
/// names are non-empty `/`-separated relative paths whose components are
/// non-empty and free of `.`/`..`, backslashes, colons, and NUL bytes.
pub(crate) fn unit_name_problem(name: &str) -> Option<&'static str> {
    if name.is_empty() {
        return Some("name is empty");
    }
    if name.contains('\0') {
        return Some("name contains a NUL byte");
    }
    if name.contains('\\') {
        return Some("name contains a backslash");
    }
    if name.contains(':') {
        return Some("name contains a colon");
    }
    if name.starts_with('/') {
        return Some("name is an absolute path");
    }
    for component in name.split('/') {
        if component.is_empty() {
            return Some("name contains an empty path component");
        }
        if component == "." || component == ".." {
            return Some("path traversal component");
        }
    }
    None
}

fn length_field(len: usize, what: &str) -> Result<u32, CacheError> {
    u32::try_from(len).map_err(|_| CacheError::Serialization {
        reason: format!("{what} length {len} exceeds u32 range"),
    })
}

fn corrupted(reason: impl Into<String>) -> CacheError {
    CacheError::Corrupted {
        reason: reason.into(),
    }
}

/// Bounds-checked cursor over a stored blob.
struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    fn read_u32(&mut self, what: &str) -> Result<u32, CacheError> {
        let bytes = self.read_bytes(4, what)?;
        // read_bytes guarantees exactly 4 bytes here
        let mut raw = [0u8; 4];
        raw.copy_from_slice(bytes);
        Ok(u32::from_le_bytes(raw))
    }

    fn read_bytes(&mut self, len: usize, what: &str) -> Result<&'a [u8], CacheError> {
        let end = self
            .pos
            .checked_add(len)
            .ok_or_else(|| corrupted(format!("{what} length overflows the buffer")))?;
        if end > self.buf.len() {
            return Err(corrupted(format!(
                "truncated {what}: need {len} byte(s), {} remaining",
                self.remaining()
            )));
        }
        let bytes = &self.buf[self.pos..end];
        self.pos = end;
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_bundle() -> UnitBundle {
        let mut bundle = UnitBundle::new();
        bundle.push("flow/entry0.ir", b"first unit".to_vec()).unwrap();
        bundle.push("flow/entry1.ir", b"second".to_vec()).unwrap();
        bundle.push("taint/summary.ir", vec![0u8, 1, 2, 255]).unwrap();
        bundle
    }

    #[test]
    fn roundtrip_preserves_order_and_content() {
        let bundle = sample_bundle();
        let blob = bundle.encode().unwrap();
        let decoded = UnitBundle::decode(&blob).unwrap();
        assert_eq!(decoded, bundle);
        let names: Vec<&str> = decoded.units().iter().map(|u| u.name.as_str()).collect();
        assert_eq!(names, ["flow/entry0.ir", "flow/entry1.ir", "taint/summary.ir"]);
    }

    #[test]
    fn empty_bundle_is_four_zero_bytes() {
        let blob = UnitBundle::new().encode().unwrap();
        assert_eq!(blob, vec![0u8, 0, 0, 0]);
        let decoded = UnitBundle::decode(&blob).unwrap();
        assert!(decoded.is_empty());
    }

    #[test]
    fn empty_content_unit_roundtrips() {
        let mut bundle = UnitBundle::new();
        bundle.push("empty.ir", Vec::new()).unwrap();
        let decoded = UnitBundle::decode(&bundle.encode().unwrap()).unwrap();
        assert_eq!(decoded.len(), 1);
        assert!(decoded.units()[0].content.is_empty());
    }

    #[test]
    fn encoding_is_little_endian() {
        let mut bundle = UnitBundle::new();
        bundle.push("a", b"xy".to_vec()).unwrap();
        let blob = bundle.encode().unwrap();
        // count=1, nameLen=1, 'a', contentLen=2, "xy"
        assert_eq!(
            blob,
            vec![1, 0, 0, 0, 1, 0, 0, 0, b'a', 2, 0, 0, 0, b'x', b'y']
        );
    }

    #[test]
    fn truncation_anywhere_is_corruption() {
        let blob = sample_bundle().encode().unwrap();
        for cut in 0..blob.len() {
            let result = UnitBundle::decode(&blob[..cut]);
            assert!(
                matches!(result, Err(CacheError::Corrupted { .. })),
                "truncation at {cut} must be detected"
            );
        }
    }

    #[test]
    fn oversized_name_length_is_corruption() {
        let mut blob = sample_bundle().encode().unwrap();
        // First name length field sits right after the entry count.
        blob[4..8].copy_from_slice(&u32::MAX.to_le_bytes());
        assert!(matches!(
            UnitBundle::decode(&blob),
            Err(CacheError::Corrupted { .. })
        ));
    }

    #[test]
    fn oversized_content_length_is_corruption() {
        let mut bundle = UnitBundle::new();
        bundle.push("a.ir", b"data".to_vec()).unwrap();
        let mut blob = bundle.encode().unwrap();
        // Content length field: count(4) + nameLen(4) + name(4)
        blob[12..16].copy_from_slice(&0x4000_0000u32.to_le_bytes());
        assert!(matches!(
            UnitBundle::decode(&blob),
            Err(CacheError::Corrupted { .. })
        ));
    }

    #[test]
    fn trailing_bytes_are_corruption() {
        let mut blob = sample_bundle().encode().unwrap();
        blob.push(0);
        let err = UnitBundle::decode(&blob).unwrap_err();
        assert!(err.to_string().contains("trailing"));
    }

    #[test]
    fn duplicate_names_in_blob_are_corruption() {
        let mut blob = Vec::new();
        blob.extend_from_slice(&2u32.to_le_bytes());
        for _ in 0..2 {
            blob.extend_from_slice(&4u32.to_le_bytes());
            blob.extend_from_slice(b"same");
            blob.extend_from_slice(&1u32.to_le_bytes());
            blob.push(7);
        }
        let err = UnitBundle::decode(&blob).unwrap_err();
        assert!(err.to_string().contains("duplicate"));
    }

    #[test]
    fn non_utf8_name_is_corruption() {
        let mut blob = Vec::new();
        blob.extend_from_slice(&1u32.to_le_bytes());
        blob.extend_from_slice(&2u32.to_le_bytes());
        blob.extend_from_slice(&[0xff, 0xfe]);
        blob.extend_from_slice(&0u32.to_le_bytes());
        let err = UnitBundle::decode(&blob).unwrap_err();
        assert!(err.to_string().contains("UTF-8"));
    }

    #[test]
    fn traversal_name_in_blob_is_corruption() {
        let mut blob = Vec::new();
        blob.extend_from_slice(&1u32.to_le_bytes());
        let name = b"../../etc/passwd";
        blob.extend_from_slice(&(name.len() as u32).to_le_bytes());
        blob.extend_from_slice(name);
        blob.extend_from_slice(&0u32.to_le_bytes());
        let err = UnitBundle::decode(&blob).unwrap_err();
        assert!(matches!(err, CacheError::Corrupted { .. }));
        assert!(err.to_string().contains("unsafe unit name"));
    }

    #[test]
    fn garbage_never_panics() {
        // Byte soup with plausible-looking prefixes must all fail cleanly.
        let samples: [&[u8]; 6] = [
            b"",
            b"\x01",
            b"\xff\xff\xff\xff",
            b"\x01\x00\x00\x00\xff\xff\xff\xff",
            b"\x02\x00\x00\x00\x01\x00\x00\x00a\x00\x00\x00\x00",
            b"\x00\x00\x00\x00\x00",
        ];
        for sample in samples {
            assert!(UnitBundle::decode(sample).is_err());
        }
    }

    #[test]
    fn push_rejects_invalid_names() {
        let mut bundle = UnitBundle::new();
        for bad in ["", "/abs.ir", "a/../b.ir", "a//b.ir", "a\\b.ir", "c:d.ir", "."] {
            assert!(
                matches!(
                    bundle.push(bad, Vec::new()),
                    Err(CacheError::InvalidUnitName { .. })
                ),
                "name '{bad}' must be rejected"
            );
        }
        assert!(bundle.is_empty());
    }

    #[test]
    fn push_rejects_duplicates() {
        let mut bundle = UnitBundle::new();
        bundle.push("dup.ir", b"a".to_vec()).unwrap();
        assert!(matches!(
            bundle.push("dup.ir", b"b".to_vec()),
            Err(CacheError::DuplicateUnitName { .. })
        ));
        assert_eq!(bundle.len(), 1);
    }

    #[test]
    fn nested_relative_names_are_accepted() {
        let mut bundle = UnitBundle::new();
        bundle.push("a/b/c/deep.ir", b"ok".to_vec()).unwrap();
        bundle.push("plain.ir", b"ok".to_vec()).unwrap();
        assert_eq!(bundle.len(), 2);
    }
}
