//! Terminal utilities for title setting and interactive input

use std::io::{BufRead, IsTerminal, Write};

/// Sets the terminal title to the specified text
pub fn set_terminal_title(title: &str) {
    if !std::io::stdout().is_terminal() {
        return;
    }
    // ANSI escape sequence to set terminal title
    print!("\x1b]0;{}\x07", title);
}

/// Sets the terminal title and ensures it's flushed to the terminal
pub fn set_terminal_title_and_flush(title: &str) {
    set_terminal_title(title);
    // Flush stdout - ignore errors as this is non-critical
    let _ = std::io::stdout().flush();
}

/// Prints `question` and reads one line from `input`
///
/// Returns `None` at end of input so callers can treat a closed stdin as "no".
pub fn prompt_line(question: &str, input: &mut impl BufRead) -> std::io::Result<Option<String>> {
    print!("{question}");
    std::io::stdout().flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

/// Asks a yes/no question; anything but `y`/`yes` is a no
pub fn confirm(question: &str, input: &mut impl BufRead) -> std::io::Result<bool> {
    let answer = prompt_line(&format!("{question} [y/N] "), input)?;
    Ok(matches!(
        answer.as_deref().map(str::to_lowercase).as_deref(),
        Some("y") | Some("yes")
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_prompt_line_trims_input() {
        let mut input = Cursor::new("  1 3 \n");
        assert_eq!(prompt_line("? ", &mut input).unwrap().as_deref(), Some("1 3"));
    }

    #[test]
    fn test_prompt_line_end_of_input() {
        let mut input = Cursor::new("");
        assert_eq!(prompt_line("? ", &mut input).unwrap(), None);
    }

    #[test]
    fn test_confirm_accepts_only_yes() {
        assert!(confirm("go", &mut Cursor::new("Y\n")).unwrap());
        assert!(confirm("go", &mut Cursor::new("yes\n")).unwrap());
        assert!(!confirm("go", &mut Cursor::new("\n")).unwrap());
        assert!(!confirm("go", &mut Cursor::new("nope\n")).unwrap());
    }
}
