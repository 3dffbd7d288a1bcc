use crate::error::ProcessError;
use derive_builder::Builder;
use serde::{Deserialize, Serialize};

/// Join a command line with single spaces
///
/// No quoting or escaping is applied, so arguments containing spaces are not
/// preserved as single arguments by platforms that re-split the string.
/// Callers that need shell-safe quoting should quote each part before joining.
pub fn join_command_line<S: AsRef<str>>(parts: &[S]) -> String {
    let len = parts.iter().map(|p| p.as_ref().len() + 1).sum::<usize>();
    let mut joined = String::with_capacity(len.saturating_sub(1));

    for (i, part) in parts.iter().enumerate() {
        if i != 0 {
            joined.push(' ');
        }
        joined.push_str(part.as_ref());
    }

    joined
}

/// Program and arguments for a child process
#[derive(Default, Debug, Clone, PartialEq, Eq, Builder, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[builder(
    setter(into),
    build_fn(validate = "Self::validate", error = "ProcessError")
)]
pub struct CommandLine {
    pub program: String,
    #[builder(default)]
    #[builder(setter(custom))]
    #[serde(default)]
    pub args: Vec<String>,
}

impl CommandLine {
    pub fn builder() -> CommandLineBuilder {
        CommandLineBuilder::default()
    }

    /// Build from a sequence whose first element is the program
    pub fn from_parts<S: AsRef<str>>(parts: &[S]) -> Result<Self, ProcessError> {
        let (program, args) = parts
            .split_first()
            .ok_or_else(|| ProcessError::InvalidCommandLine("command line is empty".to_string()))?;

        CommandLine::builder()
            .program(program.as_ref())
            .args(args.iter().map(AsRef::as_ref))
            .build()
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// The program followed by its arguments
    pub fn parts(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.program.as_str()).chain(self.args.iter().map(String::as_str))
    }

    /// The single string handed to platforms that launch from a flat command line
    pub fn joined(&self) -> String {
        join_command_line(&self.parts().collect::<Vec<_>>())
    }
}

impl std::fmt::Display for CommandLine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.joined())
    }
}

impl CommandLineBuilder {
    pub fn args<S: ToString, I: IntoIterator<Item = S>>(&mut self, iter: I) -> &mut Self {
        let args: Vec<String> = iter.into_iter().map(|s| s.to_string()).collect();
        self.args = Some(args);
        self
    }

    pub fn arg<S: ToString>(&mut self, arg: S) -> &mut Self {
        self.args.get_or_insert_with(Vec::new).push(arg.to_string());
        self
    }

    fn validate(&self) -> Result<(), ProcessError> {
        match &self.program {
            Some(program) if program.is_empty() => Err(ProcessError::InvalidCommandLine(
                "program must not be empty".to_string(),
            )),
            Some(program) if program.contains('\0') => Err(ProcessError::InvalidCommandLine(
                "program must not contain NUL".to_string(),
            )),
            _ => Ok(()),
        }
    }
}

impl From<derive_builder::UninitializedFieldError> for ProcessError {
    fn from(e: derive_builder::UninitializedFieldError) -> Self {
        ProcessError::InvalidCommandLine(format!("`{}` must be set", e.field_name()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_join_single_element() {
        assert_eq!(join_command_line(&["echo"]), "echo");
    }

    #[test]
    fn test_join_is_naive() {
        let joined = join_command_line(&["printf", "%s\n", "two words", ""]);
        assert_eq!(joined, "printf %s\n two words ");
    }

    #[test]
    fn test_join_empty_sequence() {
        let parts: [&str; 0] = [];
        assert_eq!(join_command_line(&parts), "");
    }

    #[test]
    fn test_builder() {
        let command = CommandLine::builder()
            .program("echo")
            .args(["hello", "world"])
            .build()
            .unwrap();

        assert_eq!(command.program(), "echo");
        assert_eq!(command.args(), ["hello", "world"]);
        assert_eq!(command.joined(), "echo hello world");
        assert_eq!(command.to_string(), "echo hello world");
    }

    #[test]
    fn test_builder_arg_appends() {
        let command = CommandLine::builder()
            .program("sh")
            .arg("-c")
            .arg("exit 3")
            .build()
            .unwrap();

        assert_eq!(command.args(), ["-c", "exit 3"]);
        assert_eq!(command.parts().collect::<Vec<_>>(), ["sh", "-c", "exit 3"]);
    }

    #[test]
    fn test_builder_validation() {
        let err = CommandLine::builder().build().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidCommandLine);
        assert!(err.to_string().contains("program"));

        let err = CommandLine::builder().program("").build().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidCommandLine);
    }

    #[test]
    fn test_from_parts() {
        let command = CommandLine::from_parts(&["cat"]).unwrap();
        assert_eq!(command.program(), "cat");
        assert!(command.args().is_empty());
        assert_eq!(command.joined(), "cat");

        let empty: Vec<String> = Vec::new();
        let err = CommandLine::from_parts(&empty).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidCommandLine);
    }

    #[test]
    fn test_deserialize_from_config() {
        let command: CommandLine =
            serde_json::from_str(r#"{"program":"sort","args":["-r"]}"#).unwrap();
        assert_eq!(command.joined(), "sort -r");

        let command: CommandLine = serde_json::from_str(r#"{"program":"true"}"#).unwrap();
        assert!(command.args().is_empty());
    }
}
