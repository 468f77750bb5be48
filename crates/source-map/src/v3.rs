//! Source Map Revision 3 encoding.

use crate::{LineIndex, SourceMap};
use serde::Serialize;

const BASE64: &[u8; 64] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";

/// A v3 source map ready to be serialized as JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSourceMap {
    pub version: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    pub sources: Vec<String>,
    pub sources_content: Vec<Option<String>>,
    pub names: Vec<String>,
    pub mappings: String,
}

impl RawSourceMap {
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

impl SourceMap {
    /// Encodes the mappings between `original` and `generated` as a v3 map
    /// with a single source.
    ///
    /// Verbatim chunks get a segment at every generated line they cover;
    /// rewritten chunks get one segment at their start. Columns are byte
    /// columns.
    pub fn to_v3(&self, original: &str, generated: &str, source_name: &str) -> RawSourceMap {
        let original_lines = LineIndex::new(original);
        let generated_lines = LineIndex::new(generated);
        let mut encoder = MappingsEncoder::default();

        for mapping in self.mappings() {
            let Some(generated_pos) = generated_lines.line_col(mapping.generated.start) else {
                continue;
            };
            let Some(original_pos) = original_lines.line_col(mapping.original.start) else {
                continue;
            };
            encoder.segment(generated_pos.line, generated_pos.col, original_pos.line, original_pos.col);

            if !mapping.is_verbatim() {
                continue;
            }
            let chunk = mapping.generated.slice(generated);
            for (idx, _) in chunk.match_indices('\n') {
                if idx + 1 == chunk.len() {
                    break;
                }
                let delta = text_size::TextSize::from((idx + 1) as u32);
                let (Some(line_gen), Some(line_orig)) = (
                    generated_lines.line_col(mapping.generated.start + delta),
                    original_lines.line_col(mapping.original.start + delta),
                ) else {
                    continue;
                };
                encoder.segment(line_gen.line, line_gen.col, line_orig.line, line_orig.col);
            }
        }

        RawSourceMap {
            version: 3,
            file: None,
            sources: vec![source_name.to_string()],
            sources_content: vec![Some(original.to_string())],
            names: Vec::new(),
            mappings: encoder.finish(),
        }
    }
}

#[derive(Debug, Default)]
struct MappingsEncoder {
    out: String,
    line: u32,
    line_has_segment: bool,
    prev_generated_col: i64,
    prev_original_line: i64,
    prev_original_col: i64,
}

impl MappingsEncoder {
    /// Segments must arrive in generated order.
    fn segment(&mut self, gen_line: u32, gen_col: u32, orig_line: u32, orig_col: u32) {
        while self.line < gen_line {
            self.out.push(';');
            self.line += 1;
            self.line_has_segment = false;
            self.prev_generated_col = 0;
        }
        if self.line_has_segment {
            self.out.push(',');
        }

        encode_vlq(&mut self.out, i64::from(gen_col) - self.prev_generated_col);
        // Always the first (and only) source.
        encode_vlq(&mut self.out, 0);
        encode_vlq(&mut self.out, i64::from(orig_line) - self.prev_original_line);
        encode_vlq(&mut self.out, i64::from(orig_col) - self.prev_original_col);

        self.prev_generated_col = i64::from(gen_col);
        self.prev_original_line = i64::from(orig_line);
        self.prev_original_col = i64::from(orig_col);
        self.line_has_segment = true;
    }

    fn finish(self) -> String {
        self.out
    }
}

/// Appends the base64 VLQ encoding of `value`.
fn encode_vlq(out: &mut String, value: i64) {
    let mut vlq = if value < 0 {
        ((-value) << 1) | 1
    } else {
        value << 1
    };

    loop {
        let mut digit = vlq & 0b1_1111;
        vlq >>= 5;
        if vlq > 0 {
            digit |= 0b10_0000;
        }
        out.push(BASE64[digit as usize] as char);
        if vlq == 0 {
            break;
        }
    }
}
