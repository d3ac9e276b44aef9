use crate::model::Step;

/// Split free-text instructions into individual sentences.
///
/// Numbered lists ("1. Chop... 2. Fry...") are split on their numbers;
/// anything else is split on line breaks and periods. Every step ends with
/// exactly one period.
pub fn parse_instructions(instructions: &str) -> Vec<String> {
    let bytes = instructions.as_bytes();
    let markers = numbered_markers(bytes);
    let numbered = markers.iter().any(|(start, _)| at_line_start(bytes, *start));

    let pieces: Vec<&str> = if numbered {
        let mut pieces = Vec::with_capacity(markers.len() + 1);
        let mut cursor = 0;
        for (start, end) in &markers {
            pieces.push(&instructions[cursor..*start]);
            cursor = *end;
        }
        pieces.push(&instructions[cursor..]);
        pieces
    } else {
        instructions.split(['\n', '\r', '.']).collect()
    };

    pieces
        .into_iter()
        .map(str::trim)
        .filter(|piece| !piece.is_empty())
        .map(|piece| format!("{}.", piece.strip_suffix('.').unwrap_or(piece).trim_end()))
        .collect()
}

/// Number the parsed sentences as steps, starting at 1
pub fn to_steps(instructions: &str) -> Vec<Step> {
    parse_instructions(instructions)
        .into_iter()
        .enumerate()
        .map(|(index, description)| Step {
            order: index as u32 + 1,
            title: None,
            description,
        })
        .collect()
}

// (start, end) byte ranges of "<digits>.<whitespace>" markers that begin a
// line or follow the end of a previous sentence
fn numbered_markers(bytes: &[u8]) -> Vec<(usize, usize)> {
    let mut markers = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i].is_ascii_digit() && (at_line_start(bytes, i) || after_sentence(bytes, i)) {
            if let Some(end) = marker_end(bytes, i) {
                markers.push((i, end));
                i = end;
                continue;
            }
        }
        i += 1;
    }
    markers
}

fn marker_end(bytes: &[u8], start: usize) -> Option<usize> {
    let mut j = start;
    while j < bytes.len() && bytes[j].is_ascii_digit() {
        j += 1;
    }
    if j >= bytes.len() || bytes[j] != b'.' {
        return None;
    }
    j += 1;
    let whitespace_start = j;
    while j < bytes.len() && bytes[j].is_ascii_whitespace() {
        j += 1;
    }
    (j > whitespace_start).then_some(j)
}

fn at_line_start(bytes: &[u8], i: usize) -> bool {
    i == 0 || matches!(bytes[i - 1], b'\n' | b'\r')
}

fn after_sentence(bytes: &[u8], i: usize) -> bool {
    if i == 0 || !bytes[i - 1].is_ascii_whitespace() {
        return false;
    }
    bytes[..i]
        .iter()
        .rev()
        .find(|b| !b.is_ascii_whitespace())
        .map_or(true, |b| *b == b'.')
}
