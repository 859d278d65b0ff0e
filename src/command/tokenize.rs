// Command tokenizer - split a command string into an argument vector

/// Split a shell-like command string into an argument vector.
///
/// A double quote toggles quoting; an unquoted space is a token boundary.
/// Quote characters are stripped from emitted tokens, and empty tokens from
/// consecutive boundaries are discarded. No escape sequences are honored; an
/// unmatched quote leaves the rest of the string as part of the final token.
pub fn tokenize(command: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for c in command.chars() {
        if c == '"' {
            in_quotes = !in_quotes;
            current.push(c);
        } else if c == ' ' && !in_quotes {
            flush(&mut tokens, &mut current);
        } else {
            current.push(c);
        }
    }

    flush(&mut tokens, &mut current);

    tokens
}

fn flush(tokens: &mut Vec<String>, current: &mut String) {
    let trimmed = current.trim();
    if !trimmed.is_empty() {
        tokens.push(trimmed.replace('"', ""));
    }
    current.clear();
}
