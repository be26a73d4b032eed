//! Unified diffs between original and reformatted documents.

use colored::Colorize;

/// Number of unchanged lines shown around each change.
pub const DEFAULT_CONTEXT: usize = 3;

/// Produces a unified diff between two strings.
///
/// Lines are split on `\n` only, so a change in the number of trailing
/// newlines shows up in the diff. Returns an empty string when the inputs
/// are equal.
pub fn unified_diff(old: &str, new: &str, old_label: &str, new_label: &str, context: usize) -> String {
    if old == new {
        return String::new();
    }

    let old_lines: Vec<&str> = old.split('\n').collect();
    let new_lines: Vec<&str> = new.split('\n').collect();

    let mut hunks = collect_hunks(&old_lines, &new_lines, context);

    if hunks.is_empty() {
        return String::new();
    }

    let mut output = Vec::new();
    output.push(format!("--- {}", old_label));
    output.push(format!("+++ {}", new_label));

    for hunk in &mut hunks {
        output.push(format!(
            "@@ -{} +{} @@",
            range(hunk.old_start, hunk.old_count),
            range(hunk.new_start, hunk.new_count),
        ));
        output.append(&mut hunk.lines);
    }

    output.join("\n")
}

/// Formats a hunk range the way `diff -u` does.
fn range(start: usize, count: usize) -> String {
    match count {
        0 => format!("{},0", start),
        1 => format!("{}", start + 1),
        _ => format!("{},{}", start + 1, count),
    }
}

/// Colours a unified diff for terminal display.
pub fn colour_diff(diff: &str) -> String {
    diff.split('\n')
        .map(|line| {
            if line.starts_with("+++") || line.starts_with("---") {
                line.bold().to_string()
            } else if line.starts_with("@@") {
                line.cyan().to_string()
            } else if line.starts_with('+') {
                line.green().to_string()
            } else if line.starts_with('-') {
                line.red().to_string()
            } else {
                line.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

struct DiffHunk {
    old_start: usize,
    old_count: usize,
    new_start: usize,
    new_count: usize,
    lines: Vec<String>,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Edit {
    Keep(usize, usize),
    Insert(usize, usize),
    Remove(usize, usize),
}

impl Edit {
    fn positions(self) -> (usize, usize) {
        match self {
            Edit::Keep(i, j) | Edit::Insert(i, j) | Edit::Remove(i, j) => (i, j),
        }
    }
}

fn lcs_table(old: &[&str], new: &[&str]) -> Vec<Vec<usize>> {
    let m = old.len();
    let n = new.len();
    let mut table = vec![vec![0usize; n + 1]; m + 1];

    for i in 1..=m {
        for j in 1..=n {
            if old[i - 1] == new[j - 1] {
                table[i][j] = table[i - 1][j - 1] + 1;
            } else {
                table[i][j] = table[i - 1][j].max(table[i][j - 1]);
            }
        }
    }

    table
}

/// Builds the edit script. The common prefix and suffix are kept as-is so
/// the LCS table only spans the changed middle of the documents.
fn edit_script(old: &[&str], new: &[&str]) -> Vec<Edit> {
    let prefix = old.iter().zip(new).take_while(|(a, b)| a == b).count();
    let suffix = old[prefix..]
        .iter()
        .rev()
        .zip(new[prefix..].iter().rev())
        .take_while(|(a, b)| a == b)
        .count();
    let old_mid = &old[prefix..old.len() - suffix];
    let new_mid = &new[prefix..new.len() - suffix];
    let lcs = lcs_table(old_mid, new_mid);

    let mut middle = Vec::new();
    let mut i = old_mid.len();
    let mut j = new_mid.len();

    while i > 0 || j > 0 {
        if i > 0 && j > 0 && old_mid[i - 1] == new_mid[j - 1] {
            middle.push(Edit::Keep(prefix + i - 1, prefix + j - 1));
            i -= 1;
            j -= 1;
        } else if j > 0 && (i == 0 || lcs[i][j - 1] >= lcs[i - 1][j]) {
            middle.push(Edit::Insert(prefix + i, prefix + j - 1));
            j -= 1;
        } else {
            middle.push(Edit::Remove(prefix + i - 1, prefix + j));
            i -= 1;
        }
    }
    middle.reverse();

    let mut edits: Vec<Edit> = (0..prefix).map(|k| Edit::Keep(k, k)).collect();
    edits.append(&mut middle);
    edits.extend((0..suffix).map(|k| Edit::Keep(old.len() - suffix + k, new.len() - suffix + k)));
    edits
}

fn collect_hunks(old: &[&str], new: &[&str], context: usize) -> Vec<DiffHunk> {
    let edits = edit_script(old, new);

    let change_indices: Vec<usize> = edits
        .iter()
        .enumerate()
        .filter(|(_, edit)| !matches!(edit, Edit::Keep(..)))
        .map(|(idx, _)| idx)
        .collect();

    let Some(&first) = change_indices.first() else {
        return Vec::new();
    };

    // Merge changes whose context windows touch.
    let mut groups: Vec<(usize, usize)> = Vec::new();
    let (mut group_start, mut group_end) = (first, first);
    for &ci in &change_indices[1..] {
        if ci - group_end <= 2 * context {
            group_end = ci;
        } else {
            groups.push((group_start, group_end));
            group_start = ci;
            group_end = ci;
        }
    }
    groups.push((group_start, group_end));

    groups
        .into_iter()
        .map(|(gs, ge)| {
            let window = &edits[gs.saturating_sub(context)..(ge + context + 1).min(edits.len())];
            let (old_start, new_start) = window[0].positions();
            let mut hunk = DiffHunk {
                old_start,
                old_count: 0,
                new_start,
                new_count: 0,
                lines: Vec::new(),
            };

            for edit in window {
                match *edit {
                    Edit::Keep(i, _) => {
                        hunk.lines.push(format!(" {}", old[i]));
                        hunk.old_count += 1;
                        hunk.new_count += 1;
                    }
                    Edit::Remove(i, _) => {
                        hunk.lines.push(format!("-{}", old[i]));
                        hunk.old_count += 1;
                    }
                    Edit::Insert(_, j) => {
                        hunk.lines.push(format!("+{}", new[j]));
                        hunk.new_count += 1;
                    }
                }
            }

            hunk
        })
        .collect()
}
