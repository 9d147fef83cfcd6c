//! External generator invocation.
//!
//! Both the schema expander and the client generator are configured as
//! command templates such as `swagger-codegen generate -i {input} -o {output}`.
//! The program is resolved on `PATH`, run with inherited stdio, and its
//! outputs are polled until they exist and stop growing.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;
use tokio::time::Instant;

use crate::error::{Error, Result};

const INPUT_PLACEHOLDER: &str = "{input}";
const OUTPUT_PLACEHOLDER: &str = "{output}";

/// A command line with its placeholders filled in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl GeneratorCommand {
    /// Split `template` on whitespace and substitute `{input}` and `{output}`
    pub fn render(template: &str, input: &Path, output: &Path) -> Result<Self> {
        let input = input.display().to_string();
        let output = output.display().to_string();
        let mut words = template.split_whitespace().map(|word| {
            word.replace(INPUT_PLACEHOLDER, &input)
                .replace(OUTPUT_PLACEHOLDER, &output)
        });

        let program = words
            .next()
            .ok_or_else(|| Error::Config(format!("empty generator command template '{template}'")))?;
        Ok(Self {
            program,
            args: words.collect(),
        })
    }

    /// Command line as it would be typed in a shell
    pub fn display(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Run to completion with inherited stdio
    pub async fn run(&self, work_dir: &Path) -> Result<()> {
        let program = which::which(&self.program).map_err(|e| Error::GeneratorFailed {
            command: self.display(),
            status: format!("executable not found on PATH ({e})"),
        })?;

        log::info!("Running {}", self.display());
        let status = Command::new(&program)
            .args(&self.args)
            .current_dir(work_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .await
            .map_err(|e| Error::io(program.clone(), e))?;

        if !status.success() {
            return Err(Error::GeneratorFailed {
                command: self.display(),
                status: status.to_string(),
            });
        }
        Ok(())
    }
}

/// How long to wait for generator output and how often to look.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitPolicy {
    pub timeout: Duration,
    pub interval: Duration,
}

impl WaitPolicy {
    pub fn new(timeout: Duration, interval: Duration) -> Self {
        Self { timeout, interval }
    }
}

/// Wait until every path exists with a size unchanged across two polls
pub async fn wait_for_outputs(paths: &[PathBuf], policy: WaitPolicy) -> Result<()> {
    let deadline = Instant::now() + policy.timeout;
    let mut previous: Option<Vec<u64>> = None;

    loop {
        let current = current_sizes(paths).await;
        match (&previous, &current) {
            (Some(before), Ok(now)) if before == now => {
                log::debug!("Generated files settled: {}", paths.len());
                return Ok(());
            }
            _ => {}
        }

        if Instant::now() >= deadline {
            let pending = match &current {
                Err(missing) => missing.clone(),
                Ok(_) => paths.first().cloned().unwrap_or_default(),
            };
            return Err(Error::GenerationTimeout {
                path: pending,
                seconds: policy.timeout.as_secs(),
            });
        }

        previous = current.ok();
        tokio::time::sleep(policy.interval).await;
    }
}

/// Sizes of all paths, or the first one that is missing
async fn current_sizes(paths: &[PathBuf]) -> std::result::Result<Vec<u64>, PathBuf> {
    let mut sizes = Vec::with_capacity(paths.len());
    for path in paths {
        match tokio::fs::metadata(path).await {
            Ok(meta) if meta.is_file() => sizes.push(meta.len()),
            _ => return Err(path.clone()),
        }
    }
    Ok(sizes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast() -> WaitPolicy {
        WaitPolicy::new(Duration::from_millis(300), Duration::from_millis(20))
    }

    #[test]
    fn render_substitutes_placeholders() {
        let cmd = GeneratorCommand::render(
            "openapi-sdkgen.sh generate -g cli -i {input} -o {output} --additional-properties initialize=true",
            Path::new("./swagger/swagger.json"),
            Path::new("/tmp/out"),
        )
        .unwrap();
        assert_eq!(cmd.program, "openapi-sdkgen.sh");
        assert_eq!(
            cmd.args,
            [
                "generate",
                "-g",
                "cli",
                "-i",
                "./swagger/swagger.json",
                "-o",
                "/tmp/out",
                "--additional-properties",
                "initialize=true"
            ]
        );
        assert!(cmd.display().starts_with("openapi-sdkgen.sh generate -g cli"));
    }

    #[test]
    fn render_rejects_empty_template() {
        let err = GeneratorCommand::render("   ", Path::new("a"), Path::new("b")).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[tokio::test]
    async fn missing_program_is_reported() {
        let cmd = GeneratorCommand {
            program: "definitely-not-a-real-generator-binary".to_string(),
            args: Vec::new(),
        };
        let dir = tempfile::tempdir().unwrap();
        let err = cmd.run(dir.path()).await.unwrap_err();
        assert!(matches!(err, Error::GeneratorFailed { .. }));
    }

    #[tokio::test]
    async fn existing_outputs_settle() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("commands.go");
        std::fs::write(&file, "package x\n").unwrap();
        wait_for_outputs(&[file], fast()).await.unwrap();
    }

    #[tokio::test]
    async fn missing_output_times_out() {
        let dir = tempfile::tempdir().unwrap();
        let present = dir.path().join("present.go");
        let missing = dir.path().join("missing.go");
        std::fs::write(&present, "package x\n").unwrap();

        let err = wait_for_outputs(&[present, missing.clone()], fast())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::GenerationTimeout { ref path, .. } if *path == missing));
    }

    #[tokio::test]
    async fn late_output_is_picked_up() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("late.go");
        let writer = {
            let file = file.clone();
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(60)).await;
                tokio::fs::write(&file, "package x\n").await.unwrap();
            })
        };
        wait_for_outputs(&[file], fast()).await.unwrap();
        writer.await.unwrap();
    }
}
