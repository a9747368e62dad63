// Line-oriented edit operations with indentation inference.
//
// Indices are positions into the function's current source lines; negative
// indices count from the end (-1 is the last line). Pairs are applied in
// descending resolved order so later operations do not shift earlier ones.

use std::collections::BTreeMap;

use crate::runtime::FuncId;

use super::{engine::Patcher, PatchError};

/// Keywords that open an indented block; a line added right below one is
/// indented one unit deeper.
const BLOCK_KEYWORDS: [&str; 11] = [
    "class", "def", "elif", "else", "except", "finally", "for", "if", "try", "while", "with",
];

impl Patcher {
    /// Replace lines by index; a `None` payload deletes the line. Replaced
    /// lines keep their original indentation.
    pub fn replace_lines(
        &self,
        id: FuncId,
        replacements: &[(isize, Option<&str>)],
    ) -> Result<bool, PatchError> {
        let pre = self.source(id)?;
        let mut lines = split(&pre);
        let pairs = sort_index_pairs(lines.len(), replacements, "replacement")?;
        for (n, payload) in pairs {
            match payload {
                None => {
                    lines.remove(n);
                }
                Some(text) => {
                    let indent = leading_ws(&lines[n]).to_string();
                    lines[n] = format!("{indent}{}", text.trim_start());
                }
            }
        }
        self.commit_lines(id, &pre, lines)
    }

    /// Single-line replacement.
    pub fn replace_line(&self, id: FuncId, index: isize, text: &str) -> Result<bool, PatchError> {
        self.replace_lines(id, &[(index, Some(text))])
    }

    /// Insert lines by index (`after` shifts each insertion below its
    /// index). A payload with no leading whitespace of its own has its
    /// indentation inferred from the surrounding context.
    pub fn add_lines(
        &self,
        id: FuncId,
        additions: &[(isize, &str)],
        after: bool,
    ) -> Result<bool, PatchError> {
        let pre = self.source(id)?;
        let mut lines = split(&pre);
        let owned: Vec<(isize, Option<&str>)> =
            additions.iter().map(|(n, t)| (*n, Some(*t))).collect();
        let pairs = sort_index_pairs(lines.len(), &owned, "addition")?;
        for (mut n, payload) in pairs {
            let text = payload.unwrap_or_default();
            if after {
                n += 1;
            }
            if n == 0 {
                lines.insert(0, text.trim_start().to_string());
            } else if leading_ws(text).is_empty() {
                let indent = block_indent(&lines, n);
                lines.insert(n, format!("{indent}{text}"));
            } else {
                lines.insert(n, text.to_string());
            }
        }
        self.commit_lines(id, &pre, lines)
    }

    /// Single-line addition.
    pub fn add_line(
        &self,
        id: FuncId,
        index: isize,
        text: &str,
        after: bool,
    ) -> Result<bool, PatchError> {
        self.add_lines(id, &[(index, text)], after)
    }

    /// Delete lines by index.
    pub fn delete_lines(&self, id: FuncId, indices: &[isize]) -> Result<bool, PatchError> {
        let replacements: Vec<(isize, Option<&str>)> =
            indices.iter().map(|n| (*n, None)).collect();
        self.replace_lines(id, &replacements)
    }

    /// Single-line deletion.
    pub fn delete_line(&self, id: FuncId, index: isize) -> Result<bool, PatchError> {
        self.delete_lines(id, &[index])
    }

    /// Insert a multi-line block at one position. Every block line gets the
    /// same inferred indent prefix, so relative indentation within the block
    /// is preserved. Distinct dedenting blocks must be added separately.
    pub fn add_block(
        &self,
        id: FuncId,
        index: isize,
        block: &str,
        after: bool,
    ) -> Result<bool, PatchError> {
        let pre = self.source(id)?;
        let mut lines = split(&pre);
        let count = lines.len() as isize;
        let resolved = if index < 0 { index + count } else { index };
        if resolved < 0 || resolved >= count {
            return Err(PatchError::BadEdit {
                what: "addition",
                detail: format!("invalid index {index}"),
            });
        }
        let n = resolved as usize + usize::from(after);
        let indent = block_indent(&lines, n);
        for line in block.lines().rev() {
            lines.insert(n, format!("{indent}{line}"));
        }
        self.commit_lines(id, &pre, lines)
    }

    fn commit_lines(
        &self,
        id: FuncId,
        pre: &str,
        lines: Vec<String>,
    ) -> Result<bool, PatchError> {
        let mut new_source = lines.join("\n");
        if pre.ends_with('\n') {
            new_source.push('\n');
        }
        self.install_inner(id, &new_source, true)?;
        Ok(new_source != pre)
    }
}

fn split(source: &str) -> Vec<String> {
    source.lines().map(str::to_string).collect()
}

fn leading_ws(line: &str) -> &str {
    &line[..line.len() - line.trim_start().len()]
}

/// Validate an index/payload list and return it resolved and sorted in
/// descending index order.
fn sort_index_pairs<'a>(
    count: usize,
    pairs: &[(isize, Option<&'a str>)],
    what: &'static str,
) -> Result<Vec<(usize, Option<&'a str>)>, PatchError> {
    let mut resolved: BTreeMap<usize, Option<&str>> = BTreeMap::new();
    for (index, payload) in pairs {
        let n = if *index < 0 {
            index + count as isize
        } else {
            *index
        };
        if n < 0 || n >= count as isize {
            return Err(PatchError::BadEdit {
                what,
                detail: format!("invalid index {index}"),
            });
        }
        let n = n as usize;
        if resolved.contains_key(&n) {
            return Err(PatchError::BadEdit {
                what,
                detail: format!("double index {index}"),
            });
        }
        resolved.insert(n, *payload);
    }
    Ok(resolved.into_iter().rev().collect())
}

/// Indentation for a line inserted at position `n`: scan upward over blank
/// and comment-only lines to the nearest effective line, take its indent,
/// and go one unit deeper when it opens a block.
fn block_indent(lines: &[String], n: usize) -> String {
    let mut m = n;
    while m > 0 {
        m -= 1;
        let code = strip_trailing_comment(&lines[m]);
        if code.trim().is_empty() {
            continue;
        }
        let indent = leading_ws(code);
        let token = first_token(code);
        return if BLOCK_KEYWORDS.contains(&token) {
            format!("{indent}{}", indent_unit(lines))
        } else {
            indent.to_string()
        };
    }
    String::new()
}

fn strip_trailing_comment(line: &str) -> &str {
    match line.find('#') {
        Some(pos) => line[..pos].trim_end(),
        None => line.trim_end(),
    }
}

fn first_token(line: &str) -> &str {
    let text = line.trim_start();
    let end = text
        .find(|c: char| !c.is_alphanumeric() && c != '_')
        .unwrap_or(text.len());
    &text[..end]
}

/// One indentation unit, measured empirically from the tail of the source:
/// the net indent increase between the last two non-empty, non-comment-only
/// lines. Survives tabs and unusual widths.
fn indent_unit(lines: &[String]) -> String {
    let (mut prev, mut new) = (0usize, 0usize);
    let mut below = String::new();
    let mut current = String::new();
    let mut n = lines.len() as isize - 1;
    while prev <= new && n >= 0 {
        below = std::mem::replace(&mut current, lines[n as usize].clone());
        let indent_len = leading_ws(&current).len();
        prev = new;
        new = if !current.trim().is_empty() && !current.trim_start().starts_with('#') {
            indent_len
        } else {
            prev
        };
        n -= 1;
    }
    below.get(new..prev).unwrap_or("").to_string()
}
