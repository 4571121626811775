use super::classify::opening_delimiter;
use super::scanner::{strip_indent, LineCursor};

/// Extract the documentation string that starts on the cursor's next line.
///
/// The candidate must sit at exactly `indent` spaces and open with `'''` or
/// `"""`. When it does not, nothing is consumed and `None` is returned: there
/// is simply no docstring here. A string left open at end of input yields the
/// text gathered so far and an exhausted cursor.
pub fn extract_docstring(cursor: &mut LineCursor<'_>, indent: usize) -> Option<String> {
    let candidate = cursor.peek()?;
    if candidate.verbatim || candidate.indent() != indent {
        return None;
    }
    let (delim, body) = opening_delimiter(candidate.text)?;
    cursor.next_line();

    let first = &candidate.text[body..];
    if let Some(end) = first.find(delim.as_str()) {
        return Some(first[..end].trim().to_string());
    }

    let mut text = first.to_string();
    while let Some(line) = cursor.next_line() {
        let content = strip_indent(line.text, indent);
        match content.find(delim.as_str()) {
            Some(end) => {
                let last = &content[..end];
                if !last.is_empty() {
                    text.push('\n');
                    text.push_str(last);
                }
                return Some(text.trim().to_string());
            }
            None => {
                text.push('\n');
                text.push_str(content);
            }
        }
    }
    Some(text.trim().to_string())
}
