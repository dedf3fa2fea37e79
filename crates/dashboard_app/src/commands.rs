/// One parsed line of user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserCommand {
    List,
    Refresh,
    /// 1-based index into the currently rendered document list.
    Open(usize),
    Close,
    Upload(String),
    Ask(String),
    Retry,
    Chain(String),
    Back,
    Dismiss,
    Help,
    Quit,
}

/// Parse a raw input line. Empty lines yield nothing; anything else either
/// parses or produces an error string to show the user.
pub fn parse_line(line: &str) -> Option<Result<UserCommand, String>> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    let (verb, rest) = match line.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (line, ""),
    };
    let command = match verb {
        "list" | "ls" => UserCommand::List,
        "refresh" | "r" => UserCommand::Refresh,
        "open" | "o" => {
            return Some(match rest.parse::<usize>() {
                Ok(index) if index >= 1 => Ok(UserCommand::Open(index)),
                _ => Err("usage: open <number>".to_string()),
            });
        }
        "close" => UserCommand::Close,
        "upload" | "u" => {
            if rest.is_empty() {
                return Some(Err("usage: upload <path to .txt file>".to_string()));
            }
            UserCommand::Upload(rest.to_string())
        }
        "ask" | "a" => {
            if rest.is_empty() {
                return Some(Err("usage: ask <question>".to_string()));
            }
            UserCommand::Ask(rest.to_string())
        }
        "retry" => UserCommand::Retry,
        "chain" => {
            if rest.is_empty() {
                return Some(Err("usage: chain <sentence hash>".to_string()));
            }
            UserCommand::Chain(rest.to_string())
        }
        "back" => UserCommand::Back,
        "dismiss" => UserCommand::Dismiss,
        "help" | "h" | "?" => UserCommand::Help,
        "quit" | "q" | "exit" => UserCommand::Quit,
        other => return Some(Err(format!("unknown command: {other} (try 'help')"))),
    };
    Some(Ok(command))
}

pub const HELP_TEXT: &str = "\
commands:
  list                show the document list
  refresh             reload the document list from the server
  open <n>            select document n from the list
  close               clear the selection
  upload <path>       upload a .txt file
  ask <question>      ask about the selected document
  retry               re-trigger processing for the selected document
  chain <hash>        show the processing history for a referenced sentence
  back                close the sentence detail
  dismiss             dismiss the current notification
  quit                exit";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbs_and_aliases_parse() {
        assert_eq!(parse_line("list"), Some(Ok(UserCommand::List)));
        assert_eq!(parse_line("ls"), Some(Ok(UserCommand::List)));
        assert_eq!(parse_line("open 3"), Some(Ok(UserCommand::Open(3))));
        assert_eq!(
            parse_line("upload ./notes.txt"),
            Some(Ok(UserCommand::Upload("./notes.txt".to_string())))
        );
        assert_eq!(
            parse_line("ask what is this about?"),
            Some(Ok(UserCommand::Ask("what is this about?".to_string())))
        );
        assert_eq!(parse_line("q"), Some(Ok(UserCommand::Quit)));
    }

    #[test]
    fn empty_lines_are_ignored() {
        assert_eq!(parse_line(""), None);
        assert_eq!(parse_line("   "), None);
    }

    #[test]
    fn bad_input_reports_usage() {
        assert!(matches!(parse_line("open zero"), Some(Err(_))));
        assert!(matches!(parse_line("open 0"), Some(Err(_))));
        assert!(matches!(parse_line("upload"), Some(Err(_))));
        assert!(matches!(parse_line("warble"), Some(Err(_))));
    }
}
