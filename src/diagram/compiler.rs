use std::process::Stdio;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

use crate::config::DiagramConfig;
use crate::error::{DiagramCompileError, ExitCode};

use super::{DiagramStyle, DiagramTheme};

/// Turns diagram source into SVG markup.
///
/// Implementations may fail for any attempt; the caller treats failure as a
/// normal outcome and shows a placeholder.
#[async_trait]
pub trait DiagramCompiler: Send + Sync {
    async fn compile(
        &self,
        source: &str,
        theme: DiagramTheme,
        style: &DiagramStyle,
    ) -> Result<String, DiagramCompileError>;
}

/// Runs an external command that reads diagram source on stdin and writes SVG
/// to stdout (`mmdr -i -` by default).
#[derive(Debug, Clone)]
pub struct CommandCompiler {
    program: String,
    args: Vec<String>,
}

impl CommandCompiler {
    pub fn new(program: impl Into<String>, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    pub fn from_config(config: &DiagramConfig) -> Self {
        Self::new(config.command.clone(), config.args.iter().cloned())
    }

    pub fn program(&self) -> &str {
        &self.program
    }
}

#[async_trait]
impl DiagramCompiler for CommandCompiler {
    async fn compile(
        &self,
        source: &str,
        theme: DiagramTheme,
        style: &DiagramStyle,
    ) -> Result<String, DiagramCompileError> {
        let spawn_error = |message: String| DiagramCompileError::Spawn {
            program: self.program.clone(),
            message,
        };
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|err| spawn_error(err.to_string()))?;
        debug!(program = %self.program, theme = theme.tag(), "spawned diagram compiler");

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| spawn_error("stdin was not captured".to_string()))?;
        let input = format!("{}\n{}\n", style.init_directive(theme), source);
        let write = async move {
            let result = stdin.write_all(input.as_bytes()).await;
            drop(stdin);
            result
        };
        let (written, output) = tokio::join!(write, child.wait_with_output());
        let output = output.map_err(|err| spawn_error(err.to_string()))?;

        if !output.status.success() {
            return Err(DiagramCompileError::Exit {
                status: ExitCode(output.status.code()),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        // A compiler that exits cleanly without reading all of stdin still
        // counts if it produced a diagram.
        if let Err(err) = written {
            debug!(error = %err, "diagram compiler closed stdin early");
        }
        let svg = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if !svg.contains("<svg") {
            return Err(DiagramCompileError::EmptyOutput);
        }
        Ok(svg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_program_is_a_spawn_error() {
        let compiler = CommandCompiler::new("slidr-no-such-compiler", ["-i", "-"]);
        let err = compiler
            .compile("graph LR\n A --> B", DiagramTheme::Neutral, &DiagramStyle::default())
            .await
            .unwrap_err();
        assert!(matches!(err, DiagramCompileError::Spawn { ref program, .. } if program == "slidr-no-such-compiler"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn stdout_svg_is_returned() {
        let compiler = CommandCompiler::new(
            "sh",
            ["-c", "cat >/dev/null; printf '<svg xmlns=\"http://www.w3.org/2000/svg\"></svg>'"],
        );
        let svg = compiler
            .compile("graph LR\n A --> B", DiagramTheme::Dark, &DiagramStyle::default())
            .await
            .expect("compiles");
        assert!(svg.starts_with("<svg"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn source_is_prefixed_with_init_directive() {
        let compiler = CommandCompiler::new("sh", ["-c", "head -n 1 >&2; exit 3"]);
        let err = compiler
            .compile("graph LR\n A --> B", DiagramTheme::Dark, &DiagramStyle::default())
            .await
            .unwrap_err();
        let DiagramCompileError::Exit { status, stderr } = err else {
            panic!("expected exit error, got {err:?}");
        };
        assert_eq!(status, ExitCode(Some(3)));
        assert!(stderr.starts_with("%%{init:"));
        assert!(stderr.contains(r#""theme":"dark""#));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn output_without_svg_is_rejected() {
        let compiler = CommandCompiler::new("sh", ["-c", "cat >/dev/null; echo nothing"]);
        let err = compiler
            .compile("graph LR", DiagramTheme::Default, &DiagramStyle::default())
            .await
            .unwrap_err();
        assert_eq!(err, DiagramCompileError::EmptyOutput);
    }
}
