//! PE feature extraction.
//!
//! Each executable → fixed vector of `FEATURE_DIM` values:
//! - Byte histogram (256, normalised to sum 1)
//! - Byte-entropy histogram (256 = 16 entropy bins x 16 nibble bins,
//!   2048-byte windows stepped by 1024, normalised to sum 1)
//! - General (10): file size, image size, debug, libraries, exports present,
//!   relocations, resources, signature, TLS, COFF symbols
//! - Header (8): timestamp, machine, characteristics, subsystem,
//!   DLL characteristics, image / linker / OS major versions
//! - Sections (6): count, zero-size, unnamed, executable, writable,
//!   max section entropy
//! - Imports/exports (2): imported and exported function counts
//!
//! Buffers are expected to have passed the `MZ` check already.

use goblin::pe::section_table::{IMAGE_SCN_MEM_EXECUTE, IMAGE_SCN_MEM_WRITE};
use goblin::pe::PE;
use thiserror::Error;

const NUM_BINS: usize = 256;
const ENTROPY_WINDOW: usize = 2048;
const ENTROPY_STEP: usize = 1024;
const NIBBLE_BINS: usize = 16;

const GENERAL_DIM: usize = 10;
const HEADER_DIM: usize = 8;
const SECTION_DIM: usize = 6;
const IMPORT_EXPORT_DIM: usize = 2;

pub const FEATURE_DIM: usize =
    NUM_BINS + NUM_BINS + GENERAL_DIM + HEADER_DIM + SECTION_DIM + IMPORT_EXPORT_DIM;

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("malformed PE structure: {0}")]
    Malformed(String),

    #[error("section {name:?} is truncated: raw data ends at {end}, file is {len} bytes")]
    TruncatedSection { name: String, end: u64, len: usize },
}

/// Fixed-length numeric summary of one executable. Produced per request.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector(Vec<f32>);

impl FeatureVector {
    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }
}

/// Parse `bytes` as a PE image and summarise it. Deterministic and pure.
pub fn extract_features(bytes: &[u8]) -> Result<FeatureVector, ExtractionError> {
    let pe = PE::parse(bytes).map_err(|e| ExtractionError::Malformed(e.to_string()))?;
    check_section_bounds(&pe, bytes.len())?;

    let mut features = Vec::with_capacity(FEATURE_DIM);
    features.extend_from_slice(&byte_histogram(bytes));
    features.extend_from_slice(&byte_entropy_histogram(bytes));
    features.extend_from_slice(&general_features(&pe, bytes.len()));
    features.extend_from_slice(&header_features(&pe));
    features.extend_from_slice(&section_features(&pe, bytes));
    features.push(pe.imports.len() as f32);
    features.push(pe.exports.len() as f32);

    debug_assert_eq!(features.len(), FEATURE_DIM);
    Ok(FeatureVector(features))
}

fn section_name(section: &goblin::pe::section_table::SectionTable) -> String {
    section.name().unwrap_or_default().to_string()
}

fn check_section_bounds(pe: &PE, len: usize) -> Result<(), ExtractionError> {
    for section in &pe.sections {
        let end = u64::from(section.pointer_to_raw_data) + u64::from(section.size_of_raw_data);
        if section.size_of_raw_data > 0 && end > len as u64 {
            return Err(ExtractionError::TruncatedSection {
                name: section_name(section),
                end,
                len,
            });
        }
    }
    Ok(())
}

/// Normalised byte-value histogram (256 bins, sums to 1).
fn byte_histogram(data: &[u8]) -> [f32; NUM_BINS] {
    let mut counts = [0u64; NUM_BINS];
    for &b in data {
        counts[b as usize] += 1;
    }

    let mut result = [0.0f32; NUM_BINS];
    let total = data.len() as f32;
    if total > 0.0 {
        for (out, &c) in result.iter_mut().zip(&counts) {
            *out = c as f32 / total;
        }
    }
    result
}

/// Shannon entropy of a count table, in bits.
fn entropy(counts: &[u32], total: u32) -> f32 {
    if total == 0 {
        return 0.0;
    }
    let total = total as f32;
    counts
        .iter()
        .filter(|&&c| c > 0)
        .map(|&c| {
            let p = c as f32 / total;
            -p * p.log2()
        })
        .sum()
}

/// Joint histogram of (window entropy, byte high nibble), 16x16 bins.
fn byte_entropy_histogram(data: &[u8]) -> [f32; NUM_BINS] {
    let mut hist = [0.0f32; NUM_BINS];

    let mut add_window = |window: &[u8]| {
        let mut nibbles = [0u32; NIBBLE_BINS];
        for &b in window {
            nibbles[(b >> 4) as usize] += 1;
        }
        // Nibble entropy is at most 4 bits, so x4 spans the 16 rows
        let h = entropy(&nibbles, window.len() as u32) * 4.0;
        let bin = (h as usize).min(NIBBLE_BINS - 1);
        for (i, &c) in nibbles.iter().enumerate() {
            hist[bin * NIBBLE_BINS + i] += c as f32;
        }
    };

    if data.len() < ENTROPY_WINDOW {
        add_window(data);
    } else {
        let mut start = 0;
        while start + ENTROPY_WINDOW <= data.len() {
            add_window(&data[start..start + ENTROPY_WINDOW]);
            start += ENTROPY_STEP;
        }
    }

    let total: f32 = hist.iter().sum();
    if total > 0.0 {
        for v in &mut hist {
            *v /= total;
        }
    }
    hist
}

fn flag(b: bool) -> f32 {
    if b {
        1.0
    } else {
        0.0
    }
}

fn general_features(pe: &PE, len: usize) -> [f32; GENERAL_DIM] {
    let coff = &pe.header.coff_header;
    let (image_size, relocs, resources, signature, tls) = match &pe.header.optional_header {
        Some(opt) => {
            let dirs = &opt.data_directories;
            (
                opt.windows_fields.size_of_image as f32,
                dirs.get_base_relocation_table().is_some(),
                dirs.get_resource_table().is_some(),
                dirs.get_certificate_table().is_some(),
                dirs.get_tls_table().is_some(),
            )
        }
        None => (0.0, false, false, false, false),
    };

    [
        len as f32,
        image_size,
        flag(pe.debug_data.is_some()),
        pe.libraries.len() as f32,
        flag(!pe.exports.is_empty()),
        flag(relocs),
        flag(resources),
        flag(signature),
        flag(tls),
        coff.number_of_symbol_table as f32,
    ]
}

fn header_features(pe: &PE) -> [f32; HEADER_DIM] {
    let coff = &pe.header.coff_header;
    let mut out = [0.0f32; HEADER_DIM];
    out[0] = coff.time_date_stamp as f32;
    out[1] = coff.machine as f32;
    out[2] = coff.characteristics as f32;

    if let Some(opt) = &pe.header.optional_header {
        let win = &opt.windows_fields;
        out[3] = win.subsystem as f32;
        out[4] = win.dll_characteristics as f32;
        out[5] = win.major_image_version as f32;
        out[6] = opt.standard_fields.major_linker_version as f32;
        out[7] = win.major_operating_system_version as f32;
    }
    out
}

fn section_features(pe: &PE, data: &[u8]) -> [f32; SECTION_DIM] {
    let mut zero_size = 0usize;
    let mut unnamed = 0usize;
    let mut executable = 0usize;
    let mut writable = 0usize;
    let mut max_entropy = 0.0f32;

    for section in &pe.sections {
        if section.size_of_raw_data == 0 {
            zero_size += 1;
        }
        if section_name(section).trim_matches('\0').is_empty() {
            unnamed += 1;
        }
        if section.characteristics & IMAGE_SCN_MEM_EXECUTE != 0 {
            executable += 1;
        }
        if section.characteristics & IMAGE_SCN_MEM_WRITE != 0 {
            writable += 1;
        }

        let start = section.pointer_to_raw_data as usize;
        let end = start.saturating_add(section.size_of_raw_data as usize);
        if let Some(raw) = data.get(start..end) {
            let mut counts = [0u32; NUM_BINS];
            for &b in raw {
                counts[b as usize] += 1;
            }
            max_entropy = max_entropy.max(entropy(&counts, raw.len() as u32));
        }
    }

    [
        pe.sections.len() as f32,
        zero_size as f32,
        unnamed as f32,
        executable as f32,
        writable as f32,
        max_entropy,
    ]
}
