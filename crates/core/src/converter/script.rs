//! Script-based image converter implementation.

use async_trait::async_trait;
use regex_lite::Regex;
use std::collections::VecDeque;
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tracing::{debug, info};

use crate::progress::{ProgressBus, Stage};

use super::config::ConverterConfig;
use super::error::ConverterError;
use super::traits::{ConversionJob, Converter};

/// Environment variable naming the tool's own scratch workspace.
const TOOL_WORKSPACE_ENV: &str = "IMAGE_WORK_DIR";

/// Session progress at which the convert stage completes.
const CONVERT_DONE_PROGRESS: f32 = 95.0;

/// Lines of diagnostic output kept for failure detail.
const STDERR_TAIL_LINES: usize = 20;

/// Console markers the assembly script prints at its milestones.
const MARKER_FILES_LOCATED: &str = "update files located";
const MARKER_TOOL_INVOKED: &str = "genisoimage";
const MARKER_FINISHED: &str = "image created";

/// A milestone recognized in the assembly tool's output.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum AssemblyMarker {
    /// The tool found the downloaded update files.
    FilesLocated,
    /// The inner image-mastering tool has been invoked.
    ToolInvoked,
    /// Numeric mastering percentage from the diagnostic stream.
    Percent(f32),
    /// The tool reported the image as written.
    Finished,
}

/// Classifies one line of tool output.
///
/// Milestone markers are recognized on either stream; numeric percentages
/// only on the diagnostic stream, where the mastering tool writes them.
pub(crate) fn parse_output_line(line: &str, from_stderr: bool) -> Option<AssemblyMarker> {
    if line.contains(MARKER_FILES_LOCATED) {
        return Some(AssemblyMarker::FilesLocated);
    }
    if line.contains(MARKER_TOOL_INVOKED) {
        return Some(AssemblyMarker::ToolInvoked);
    }
    if line.contains(MARKER_FINISHED) {
        return Some(AssemblyMarker::Finished);
    }
    if from_stderr && line.contains('%') {
        let re = Regex::new(r"(\d+(?:\.\d+)?)%").ok()?;
        let caps = re.captures(line)?;
        if let Ok(percent) = caps.get(1)?.as_str().parse::<f32>() {
            return Some(AssemblyMarker::Percent(percent));
        }
    }
    None
}

/// Maps a raw mastering percentage into the session progress window.
///
/// The numeric part of the convert stage owns the `[80, 95]` slice.
pub(crate) fn map_assembly_percent(percent: f32) -> f32 {
    (80.0 + percent * 0.15).clamp(80.0, CONVERT_DONE_PROGRESS)
}

/// Script-based image converter implementation.
///
/// Runs the external assembly script with the session working directory as
/// both input and current directory, and watches both output streams for
/// progress milestones.
pub struct ScriptConverter {
    config: ConverterConfig,
}

impl ScriptConverter {
    /// Creates a new converter with the given configuration.
    pub fn new(config: ConverterConfig) -> Self {
        Self { config }
    }

    /// Creates a converter with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(ConverterConfig::default())
    }

    fn emit_marker(events: &ProgressBus, marker: AssemblyMarker) {
        match marker {
            AssemblyMarker::FilesLocated => {
                events.stage(Stage::Convert, "update files located, building image", 80.0);
            }
            AssemblyMarker::ToolInvoked => {
                events.stage(Stage::Convert, "assembling image", 85.0);
            }
            AssemblyMarker::Percent(percent) => {
                events.stage(
                    Stage::Convert,
                    format!("building image... {:.1}%", percent),
                    map_assembly_percent(percent),
                );
            }
            AssemblyMarker::Finished => {
                events.stage(Stage::Convert, "assembly finished", CONVERT_DONE_PROGRESS);
            }
        }
    }
}

#[async_trait]
impl Converter for ScriptConverter {
    fn name(&self) -> &str {
        "assembly-script"
    }

    async fn assemble(
        &self,
        job: &ConversionJob,
        events: &ProgressBus,
    ) -> Result<(), ConverterError> {
        // Fail before spawning anything when the tool is not installed.
        let script = &self.config.script_path;
        if !tokio::fs::try_exists(script).await.unwrap_or(false) {
            return Err(ConverterError::ToolMissing {
                path: script.clone(),
            });
        }

        info!(
            "starting image assembly for session {} -> {}",
            job.session_id,
            job.output_path.display()
        );

        let mut child = Command::new(&self.config.shell_path)
            .arg(script)
            .arg(&job.work_dir)
            .arg(&job.output_path)
            .current_dir(&job.work_dir)
            .env(TOOL_WORKSPACE_ENV, &self.config.tool_work_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        let stdout = child.stdout.take().expect("stdout should be captured");
        let stderr = child.stderr.take().expect("stderr should be captured");

        let mut stdout_lines = BufReader::new(stdout).lines();
        let mut stderr_lines = BufReader::new(stderr).lines();
        let mut stdout_done = false;
        let mut stderr_done = false;
        let mut stderr_tail: VecDeque<String> = VecDeque::with_capacity(STDERR_TAIL_LINES);

        while !(stdout_done && stderr_done) {
            tokio::select! {
                line = stdout_lines.next_line(), if !stdout_done => match line {
                    Ok(Some(line)) => {
                        debug!("assembly stdout: {}", line);
                        if let Some(marker) = parse_output_line(&line, false) {
                            Self::emit_marker(events, marker);
                        }
                    }
                    _ => stdout_done = true,
                },
                line = stderr_lines.next_line(), if !stderr_done => match line {
                    Ok(Some(line)) => {
                        debug!("assembly stderr: {}", line);
                        if stderr_tail.len() == STDERR_TAIL_LINES {
                            stderr_tail.pop_front();
                        }
                        stderr_tail.push_back(line.clone());
                        if let Some(marker) = parse_output_line(&line, true) {
                            Self::emit_marker(events, marker);
                        }
                    }
                    _ => stderr_done = true,
                },
            }
        }

        let status = child.wait().await?;

        if status.success() {
            events.stage(Stage::Convert, "image assembly complete", CONVERT_DONE_PROGRESS);
            Ok(())
        } else {
            let detail = stderr_tail.into_iter().collect::<Vec<_>>().join("\n");
            Err(ConverterError::failed(
                status.code().unwrap_or(-1),
                if detail.is_empty() {
                    None
                } else {
                    Some(detail)
                },
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::WireEvent;
    use std::path::{Path, PathBuf};

    fn write_script(dir: &Path, body: &str) -> PathBuf {
        let path = dir.join("assembly.sh");
        std::fs::write(&path, format!("#!/usr/bin/env bash\n{}\n", body)).unwrap();
        path
    }

    fn job(dir: &Path) -> ConversionJob {
        ConversionJob {
            session_id: "test-session".to_string(),
            work_dir: dir.to_path_buf(),
            output_path: dir.join("out.iso"),
        }
    }

    #[test]
    fn test_parse_milestone_markers() {
        assert_eq!(
            parse_output_line("update files located in work dir", false),
            Some(AssemblyMarker::FilesLocated)
        );
        assert_eq!(
            parse_output_line("running genisoimage -udf -o out.iso", false),
            Some(AssemblyMarker::ToolInvoked)
        );
        assert_eq!(
            parse_output_line("image created at /tmp/out.iso", false),
            Some(AssemblyMarker::Finished)
        );
        assert_eq!(parse_output_line("copying boot files", false), None);
    }

    #[test]
    fn test_parse_percent_only_on_stderr() {
        assert_eq!(
            parse_output_line("17.0% done, estimate finish in 40s", true),
            Some(AssemblyMarker::Percent(17.0))
        );
        assert_eq!(
            parse_output_line("17.0% done, estimate finish in 40s", false),
            None
        );
        assert_eq!(
            parse_output_line("42% done", true),
            Some(AssemblyMarker::Percent(42.0))
        );
    }

    #[test]
    fn test_markers_win_over_percent() {
        // A line carrying both a marker and a percentage classifies as the
        // marker, matching the milestone precedence.
        assert_eq!(
            parse_output_line("genisoimage 17.0% done", true),
            Some(AssemblyMarker::ToolInvoked)
        );
    }

    #[test]
    fn test_map_assembly_percent() {
        assert!((map_assembly_percent(17.0) - 82.55).abs() < 1e-4);
        assert_eq!(map_assembly_percent(0.0), 80.0);
        assert_eq!(map_assembly_percent(100.0), 95.0);
        assert_eq!(map_assembly_percent(200.0), 95.0);
    }

    #[tokio::test]
    async fn test_assemble_missing_tool_fails_fast() {
        let dir = tempfile::tempdir().unwrap();
        let converter = ScriptConverter::new(
            ConverterConfig::default().with_script_path(dir.path().join("no-such-script")),
        );
        let (bus, _rx) = ProgressBus::channel();

        let err = converter.assemble(&job(dir.path()), &bus).await.unwrap_err();
        assert!(matches!(err, ConverterError::ToolMissing { .. }));
    }

    #[tokio::test]
    async fn test_assemble_tracks_output_markers() {
        let dir = tempfile::tempdir().unwrap();
        let script = write_script(
            dir.path(),
            r#"echo "update files located"
sleep 0.1
echo "17.0% done, estimate finish in 40s" 1>&2
sleep 0.1
echo "image created""#,
        );

        let converter =
            ScriptConverter::new(ConverterConfig::default().with_script_path(script));
        let (bus, mut rx) = ProgressBus::channel();

        converter.assemble(&job(dir.path()), &bus).await.unwrap();

        let mut progresses = Vec::new();
        while let Ok(WireEvent::Progress { progress, .. }) = rx.try_recv() {
            progresses.push(progress);
        }

        assert_eq!(progresses[0], 80.0);
        assert!((progresses[1] - 82.55).abs() < 1e-4);
        assert_eq!(progresses.last().copied(), Some(CONVERT_DONE_PROGRESS));
        // Monotonic throughout.
        assert!(progresses.windows(2).all(|w| w[0] <= w[1]));
    }

    #[tokio::test]
    async fn test_assemble_failure_carries_exit_code() {
        let dir = tempfile::tempdir().unwrap();
        let script = write_script(
            dir.path(),
            r#"echo "mkisofs: no space left on device" 1>&2
exit 2"#,
        );

        let converter =
            ScriptConverter::new(ConverterConfig::default().with_script_path(script));
        let (bus, _rx) = ProgressBus::channel();

        let err = converter.assemble(&job(dir.path()), &bus).await.unwrap_err();
        match err {
            ConverterError::Failed { exit_code, detail } => {
                assert_eq!(exit_code, 2);
                assert!(detail.unwrap().contains("no space left"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
