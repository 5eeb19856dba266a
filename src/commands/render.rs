use crate::commands::CopyCommand;
use crate::config::CopyToolConfig;

/// Turns copy commands into invocations of the configured copy tool.
#[derive(Debug, Clone)]
pub struct CommandRenderer {
    tool: CopyToolConfig,
}

impl CommandRenderer {
    pub fn new(tool: CopyToolConfig) -> Self {
        Self { tool }
    }

    /// Program followed by its arguments, unquoted, ready to be spawned.
    pub fn tokens(&self, command: &CopyCommand) -> Vec<String> {
        let mut tokens = vec![self.tool.executable.clone()];
        if command.recursive {
            tokens.extend(self.tool.recursive_flags.iter().cloned());
        }
        tokens.extend(self.tool.common_flags.iter().cloned());
        push_argument(&mut tokens, &self.tool.source_flag, &command.source);
        push_argument(&mut tokens, &self.tool.destination_flag, &command.destination);
        tokens
    }

    /// One command line for a shell or batch script.
    pub fn render(&self, command: &CopyCommand) -> String {
        self.tokens(command)
            .iter()
            .map(|token| quote_spaces(token))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// An empty flag means the tool takes the value positionally.
fn push_argument(tokens: &mut Vec<String>, flag: &str, value: &str) {
    if !flag.is_empty() {
        tokens.push(flag.to_string());
    }
    tokens.push(value.to_string());
}

/// Wraps tokens containing a space in double quotes.
fn quote_spaces(token: &str) -> String {
    if token.contains(' ') {
        format!("\"{token}\"")
    } else {
        token.to_string()
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn copy(source: &str, destination: &str, recursive: bool) -> CopyCommand {
        CopyCommand {
            source: source.to_string(),
            destination: destination.to_string(),
            recursive,
        }
    }

    #[test]
    fn directory_copy_renders_the_recursive_flag() {
        let renderer = CommandRenderer::new(CopyToolConfig::default());
        assert_eq!(
            renderer.render(&copy("Z:photos\\2020", "I:files\\photos\\2020", true)),
            "\"C:\\Program Files\\HPE\\LTFS\\ltfscopy.exe\" --recursive --preservetime --verbose \
             -s Z:photos\\2020 -d I:files\\photos\\2020"
        );
    }

    #[test]
    fn file_copy_omits_the_recursive_flag() {
        let renderer = CommandRenderer::new(CopyToolConfig::default());
        let tokens = renderer.tokens(&copy("Z:photos\\a.jpg", "I:files\\photos", false));
        assert_eq!(
            &tokens[1..],
            &["--preservetime", "--verbose", "-s", "Z:photos\\a.jpg", "-d", "I:files\\photos"]
        );
    }

    #[rstest]
    #[case("plain", "plain")]
    #[case("with space", "\"with space\"")]
    #[case("", "")]
    fn quotes_only_tokens_with_spaces(#[case] token: &str, #[case] expected: &str) {
        assert_eq!(quote_spaces(token), expected);
    }

    #[test]
    fn custom_tool_without_flags() {
        let renderer = CommandRenderer::new(CopyToolConfig {
            executable: "cp".to_string(),
            recursive_flags: vec!["-R".to_string()],
            common_flags: vec!["-p".to_string()],
            source_flag: String::new(),
            destination_flag: String::new(),
        });
        assert_eq!(
            renderer.render(&copy("/src/my dir", "/dst/my dir", true)),
            "cp -R -p \"/src/my dir\" \"/dst/my dir\""
        );
    }
}
