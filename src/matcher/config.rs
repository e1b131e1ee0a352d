use crate::error::ConfigError;
use std::path::PathBuf;
use std::str::FromStr;

/// Where match lines come from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineSourceKind {
    /// Spawn the matcher and read its stdout
    Process,
    /// Read already-produced matcher output from our own stdin
    Stdin,
}

impl FromStr for LineSourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "process" => Ok(LineSourceKind::Process),
            "stdin" => Ok(LineSourceKind::Stdin),
            other => Err(format!("unknown line source {:?} (expected process or stdin)", other)),
        }
    }
}

/// Invocation of the external pattern matcher
#[derive(Debug, Clone, PartialEq)]
pub struct MatcherCommand {
    pub program: String,
    pub patterns: PathBuf,
    pub input: String,
    pub target: String,
}

impl MatcherCommand {
    /// Build from the two positional CLI arguments (program name excluded)
    pub fn from_args(program: &str, patterns: PathBuf, args: &[String]) -> Result<Self, ConfigError> {
        let input = args
            .first()
            .ok_or_else(|| ConfigError::MissingArgument("input path".to_string()))?;
        let target = args
            .get(1)
            .ok_or_else(|| ConfigError::MissingArgument("target path".to_string()))?;

        Ok(Self {
            program: program.to_string(),
            patterns,
            input: input.clone(),
            target: target.clone(),
        })
    }

    /// Matcher arguments, including its fixed buffer and tuning flags
    pub fn args(&self) -> Vec<String> {
        let mut args = vec!["-p".to_string(), self.patterns.display().to_string()];
        args.extend(["-f".to_string(), self.input.clone()]);
        args.extend(
            ["-B", "4096", "-D", "0", "-L", "1024", "-G", "8192", "-w", "1", "-v"]
                .iter()
                .map(|s| s.to_string()),
        );
        args.push(self.target.clone());
        args
    }
}
