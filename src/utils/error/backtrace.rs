use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema, Default)]
pub struct Backtrace {
    /// A collection of frames representing the backtrace.
    pub frames: Vec<Frame>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Frame {
    /// Name of the function or method.
    pub name: Option<String>,

    /// Path to the source file.
    pub filename: Option<PathBuf>,

    /// Line number in the source file.
    pub lineno: Option<u32>,

    /// Column number in the source file.
    pub colno: Option<u32>,
}

impl Backtrace {
    fn parse(raw: &str) -> Self {
        let mut frames = Vec::new();
        let lines: Vec<&str> = raw.lines().collect();
        let mut i = 0;

        while (i + 1) < lines.len() {
            let Some(name_line) = lines.get(i) else {
                i += 1;
                continue;
            };
            let Some(location_line) = lines.get(i + 1) else {
                i += 1;
                continue;
            };

            if let Some((frame_num, name)) = name_line.split_once(": ") {
                if frame_num.trim().parse::<usize>().is_err() {
                    i += 1;
                    continue;
                }

                let location = location_line.trim_start();
                if !location.starts_with("at ") {
                    i += 1;
                    continue;
                }

                let location = &location[3..].trim();
                let mut parts = location.rsplitn(3, ':');
                let colno = parts.next().and_then(|s| s.parse::<u32>().ok());
                let lineno = parts.next().and_then(|s| s.parse::<u32>().ok());
                let filename = parts.next().map(PathBuf::from);

                frames.push(Frame {
                    name: Some(name.trim().to_string()),
                    filename,
                    lineno,
                    colno,
                });

                i += 2;
            } else {
                i += 1;
            }
        }

        Self { frames }
    }
}

impl From<std::backtrace::Backtrace> for Backtrace {
    fn from(backtrace: std::backtrace::Backtrace) -> Self {
        Self::parse(&format!("{backtrace}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backtrace_parse() {
        let backtrace_str = r#"
            0: nimbletools_core::utils::error::Error::new
                at ./src/utils/error/error_impl.rs:47:29
            1: some::module::Error::from
                at ./src/utils/error/error_impl.rs:115:17
            2: core::ops::function::FnOnce::call_once
                at /some/path/to/rust/lib.rs:250:5
        "#;

        assert_eq!(
            Backtrace::parse(backtrace_str).frames,
            vec![
                Frame {
                    name: Some("nimbletools_core::utils::error::Error::new".to_string()),
                    filename: Some(PathBuf::from("./src/utils/error/error_impl.rs")),
                    lineno: Some(47),
                    colno: Some(29),
                },
                Frame {
                    name: Some("some::module::Error::from".to_string()),
                    filename: Some(PathBuf::from("./src/utils/error/error_impl.rs")),
                    lineno: Some(115),
                    colno: Some(17),
                },
                Frame {
                    name: Some("core::ops::function::FnOnce::call_once".to_string()),
                    filename: Some(PathBuf::from("/some/path/to/rust/lib.rs")),
                    lineno: Some(250),
                    colno: Some(5),
                }
            ]
        );
    }

    #[test]
    fn test_backtrace_parse_empty() {
        assert!(Backtrace::parse("not a backtrace").frames.is_empty());
    }
}
