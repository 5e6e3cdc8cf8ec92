//! Category name normalization and the persisted mapping table
//!
//! Human-readable Vietnamese category names are normalized into stable,
//! filesystem-safe keys. The mapping from key back to the original and an
//! uppercase display form is persisted as a sorted CSV so the downstream
//! summarizer can reverse the normalization.

use crate::{CrawlError, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Normalized keys are capped at this many characters
const MAX_KEY_CHARS: usize = 50;

/// One row of the persisted mapping table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingEntry {
    pub original_name: String,
    pub display_name: String,
}

/// Normalizes category names and owns the persisted mapping table
///
/// Normalization is pure and deterministic; the registry is first-write-wins
/// so the same key always resolves to the pair already on record.
pub struct CategoryMapper {
    path: PathBuf,
    entries: BTreeMap<String, MappingEntry>,
}

/// Normalizes a category name into a stable, filesystem-safe key
///
/// Lowercase, Vietnamese diacritics stripped (including the `đ` digraph),
/// non-alphanumeric runs folded to single underscores, capped at
/// 50 characters. `"Chính trị"` becomes `"chinh_tri"`.
pub fn normalize(original: &str) -> String {
    let mut key = String::new();
    let mut last_was_underscore = true; // suppress a leading underscore

    for c in original.to_lowercase().chars() {
        let c = fold_diacritic(c);
        if c.is_ascii_alphanumeric() {
            key.push(c);
            last_was_underscore = false;
        } else if !last_was_underscore {
            key.push('_');
            last_was_underscore = true;
        }
    }

    while key.ends_with('_') {
        key.pop();
    }

    key.chars().take(MAX_KEY_CHARS).collect()
}

/// Maps a lowercased Vietnamese character to its unaccented base letter
fn fold_diacritic(c: char) -> char {
    match c {
        'à' | 'á' | 'ả' | 'ã' | 'ạ' | 'ă' | 'ằ' | 'ắ' | 'ẳ' | 'ẵ' | 'ặ' | 'â' | 'ầ'
        | 'ấ' | 'ẩ' | 'ẫ' | 'ậ' => 'a',
        'è' | 'é' | 'ẻ' | 'ẽ' | 'ẹ' | 'ê' | 'ề' | 'ế' | 'ể' | 'ễ' | 'ệ' => 'e',
        'ì' | 'í' | 'ỉ' | 'ĩ' | 'ị' => 'i',
        'ò' | 'ó' | 'ỏ' | 'õ' | 'ọ' | 'ô' | 'ồ' | 'ố' | 'ổ' | 'ỗ' | 'ộ' | 'ơ' | 'ờ'
        | 'ớ' | 'ở' | 'ỡ' | 'ợ' => 'o',
        'ù' | 'ú' | 'ủ' | 'ũ' | 'ụ' | 'ư' | 'ừ' | 'ứ' | 'ử' | 'ữ' | 'ự' => 'u',
        'ỳ' | 'ý' | 'ỷ' | 'ỹ' | 'ỵ' => 'y',
        'đ' => 'd',
        _ => c,
    }
}

impl CategoryMapper {
    /// Creates a mapper backed by the given CSV file, merging existing rows
    ///
    /// Rows already on disk win over anything registered later with the same
    /// key (first-write-wins across processes).
    pub fn load(path: &Path) -> Result<Self> {
        let mut mapper = Self {
            path: path.to_path_buf(),
            entries: BTreeMap::new(),
        };

        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            mapper.merge_csv(&content)?;
            tracing::info!(
                "loaded {} category mappings from {}",
                mapper.entries.len(),
                path.display()
            );
        }

        Ok(mapper)
    }

    /// Normalizes a name, auto-registering it on first sight
    ///
    /// Registration stores the original and its uppercase display form; an
    /// already-registered key is left untouched.
    pub fn normalized_name(&mut self, original: &str) -> String {
        let key = normalize(original);

        self.entries.entry(key.clone()).or_insert_with(|| {
            tracing::debug!("registering category mapping: {} -> {}", original, key);
            MappingEntry {
                original_name: original.to_string(),
                display_name: original.to_uppercase(),
            }
        });

        key
    }

    /// Human-presentable uppercase form for a normalized key
    pub fn display_name(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(|e| e.display_name.as_str())
    }

    /// Original name for a normalized key
    pub fn original_name(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(|e| e.original_name.as_str())
    }

    /// Writes the whole table, sorted by normalized key, to the CSV file
    pub fn save(&self) -> Result<()> {
        let mut out = String::from("normalized_name,original_name,display_name\n");

        for (key, entry) in &self.entries {
            out.push_str(&csv_field(key));
            out.push(',');
            out.push_str(&csv_field(&entry.original_name));
            out.push(',');
            out.push_str(&csv_field(&entry.display_name));
            out.push('\n');
        }

        std::fs::write(&self.path, out)?;
        Ok(())
    }

    /// Merges rows from CSV content; existing in-memory keys are kept
    fn merge_csv(&mut self, content: &str) -> Result<()> {
        for (number, fields) in parse_csv_records(content).into_iter().enumerate().skip(1) {
            if fields.len() == 1 && fields[0].trim().is_empty() {
                continue;
            }

            if fields.len() != 3 {
                return Err(CrawlError::Storage(format!(
                    "malformed mapping row {} in {}: expected 3 fields, got {}",
                    number + 1,
                    self.path.display(),
                    fields.len()
                )));
            }

            self.entries
                .entry(fields[0].clone())
                .or_insert_with(|| MappingEntry {
                    original_name: fields[1].clone(),
                    display_name: fields[2].clone(),
                });
        }
        Ok(())
    }

    /// Number of registered mappings
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Quotes a CSV field when it contains a delimiter, quote, or newline
fn csv_field(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Splits CSV content into records, honoring quoted fields
///
/// A newline inside a quoted field belongs to the field, not the record, so
/// everything [`csv_field`] quotes on the way out parses back in.
fn parse_csv_records(content: &str) -> Vec<Vec<String>> {
    let mut records = Vec::new();
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = content.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes => {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    field.push('"');
                } else {
                    in_quotes = false;
                }
            }
            '"' => in_quotes = true,
            ',' if !in_quotes => {
                fields.push(std::mem::take(&mut field));
            }
            '\n' if !in_quotes => {
                fields.push(std::mem::take(&mut field));
                records.push(std::mem::take(&mut fields));
            }
            '\r' if !in_quotes => {}
            _ => field.push(c),
        }
    }

    if !field.is_empty() || !fields.is_empty() {
        fields.push(field);
        records.push(fields);
    }

    records
}
