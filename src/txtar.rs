/*!
 * Minimal txtar codec
 *
 * A txtar archive is an optional free-form comment followed by files, each
 * introduced by a `-- name --` marker line and holding the raw bytes up to
 * the next marker.
 */

/// A single archived file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct File {
    /// Name as written in the marker line
    pub name: String,
    /// File content
    pub data: Vec<u8>,
}

/// A txtar archive
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Archive {
    /// Text before the first marker
    pub comment: Vec<u8>,
    /// Files in order
    pub files: Vec<File>,
}

const MARKER_START: &[u8] = b"-- ";
const MARKER_END: &[u8] = b" --";

/// Framing bytes charged for a file named `name`
///
/// The marker line plus one newline that may be appended after the content.
pub fn entry_overhead(name: &str) -> u64 {
    (MARKER_START.len() + name.len() + MARKER_END.len() + 1 + 1) as u64
}

/// Serialize an archive
pub fn format(archive: &Archive) -> Vec<u8> {
    let mut out = Vec::new();
    push_fixed_newline(&mut out, &archive.comment);
    for file in &archive.files {
        out.extend_from_slice(MARKER_START);
        out.extend_from_slice(file.name.as_bytes());
        out.extend_from_slice(MARKER_END);
        out.push(b'\n');
        push_fixed_newline(&mut out, &file.data);
    }
    out
}

/// Parse an archive; never fails, anything before the first marker is comment
pub fn parse(data: &[u8]) -> Archive {
    let mut archive = Archive::default();
    let (comment, mut name, mut rest) = find_marker(data);
    archive.comment = comment.to_vec();

    while let Some(current) = name {
        let (body, next_name, after) = find_marker(rest);
        archive.files.push(File {
            name: current,
            data: body.to_vec(),
        });
        name = next_name;
        rest = after;
    }

    archive
}

fn push_fixed_newline(out: &mut Vec<u8>, data: &[u8]) {
    out.extend_from_slice(data);
    if !data.is_empty() && !data.ends_with(b"\n") {
        out.push(b'\n');
    }
}

/// Split `data` at the first marker line: (before, marker name, after)
fn find_marker(data: &[u8]) -> (&[u8], Option<String>, &[u8]) {
    let mut offset = 0;
    while offset < data.len() {
        let line_end = data[offset..]
            .iter()
            .position(|&b| b == b'\n')
            .map(|i| offset + i + 1)
            .unwrap_or(data.len());
        if let Some(name) = marker_name(&data[offset..line_end]) {
            return (&data[..offset], Some(name), &data[line_end..]);
        }
        offset = line_end;
    }
    (data, None, &[])
}

fn marker_name(line: &[u8]) -> Option<String> {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    let line = line.strip_suffix(b"\r").unwrap_or(line);
    let inner = line.strip_prefix(MARKER_START)?.strip_suffix(MARKER_END)?;
    let name = String::from_utf8_lossy(inner).to_string();
    if name.trim().is_empty() {
        None
    } else {
        Some(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(name: &str, data: &str) -> File {
        File {
            name: name.to_string(),
            data: data.as_bytes().to_vec(),
        }
    }

    #[test]
    fn test_format_layout() {
        let archive = Archive {
            comment: Vec::new(),
            files: vec![file("a.txt", "hello"), file("dir/b.txt", "line\n"), file("empty", "")],
        };
        assert_eq!(
            String::from_utf8(format(&archive)).unwrap(),
            "-- a.txt --\nhello\n-- dir/b.txt --\nline\n-- empty --\n"
        );
    }

    #[test]
    fn test_overhead_covers_framing() {
        let archive = Archive {
            comment: Vec::new(),
            files: vec![file("a.txt", "hello")],
        };
        assert_eq!(format(&archive).len() as u64, 5 + entry_overhead("a.txt"));
    }

    #[test]
    fn test_parse_with_comment() {
        let archive = parse(b"notes\n-- a --\nA\n-- b --\nB1\nB2\n");
        assert_eq!(archive.comment, b"notes\n");
        assert_eq!(archive.files, vec![file("a", "A\n"), file("b", "B1\nB2\n")]);
    }

    #[test]
    fn test_parse_ignores_non_markers() {
        let archive = parse(b"-- a --\n--b--\n-- --\nx");
        assert_eq!(archive.files, vec![file("a", "--b--\n-- --\nx")]);
    }

    #[test]
    fn test_names_keep_surrounding_spaces() {
        let archive = Archive {
            comment: Vec::new(),
            files: vec![file(" padded name.txt ", "x\n")],
        };
        let text = format(&archive);
        assert_eq!(text, b"--  padded name.txt  --\nx\n");
        assert_eq!(parse(&text), archive);
    }

    #[test]
    fn test_parse_format_agree() {
        let archive = Archive {
            comment: b"c\n".to_vec(),
            files: vec![file("x/y.rs", "fn main() {}\n"), file("z", "")],
        };
        assert_eq!(parse(&format(&archive)), archive);
    }
}
