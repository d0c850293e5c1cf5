use crate::tools::ToolError;
use log::warn;
use std::io::Read;
use std::process::{Child, Command, Output, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// 執行外部程式並等待結束
///
/// 超過 `timeout` 或收到中斷訊號時終止子程序。
/// stdout/stderr 由背景執行緒讀取，避免管線緩衝區塞滿造成子程序卡住。
pub fn run_with_timeout(
    mut command: Command,
    timeout: Duration,
    shutdown_signal: &AtomicBool,
) -> Result<Output, ToolError> {
    let program = command.get_program().to_string_lossy().to_string();

    command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    let mut child = command.spawn().map_err(|source| ToolError::Spawn {
        program: program.clone(),
        source,
    })?;

    let stdout_reader = spawn_pipe_reader(child.stdout.take());
    let stderr_reader = spawn_pipe_reader(child.stderr.take());
    let started = Instant::now();

    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) => {}
            Err(e) => {
                kill_child(&mut child, &program);
                return Err(ToolError::Io(e));
            }
        }

        if shutdown_signal.load(Ordering::SeqCst) {
            kill_child(&mut child, &program);
            return Err(ToolError::Cancelled { program });
        }

        if started.elapsed() >= timeout {
            kill_child(&mut child, &program);
            return Err(ToolError::Timeout {
                program,
                timeout_secs: timeout.as_secs(),
            });
        }

        thread::sleep(POLL_INTERVAL);
    };

    Ok(Output {
        status,
        stdout: join_reader(stdout_reader),
        stderr: join_reader(stderr_reader),
    })
}

/// 非零結束碼轉為 `ToolError::Failed`
pub fn ensure_success(program: &str, output: &Output) -> Result<(), ToolError> {
    if output.status.success() {
        return Ok(());
    }

    Err(ToolError::Failed {
        program: program.to_string(),
        code: output.status.code(),
        stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
    })
}

fn spawn_pipe_reader<R: Read + Send + 'static>(pipe: Option<R>) -> Option<JoinHandle<Vec<u8>>> {
    pipe.map(|mut pipe| {
        thread::spawn(move || {
            let mut buffer = Vec::new();
            let _ = pipe.read_to_end(&mut buffer);
            buffer
        })
    })
}

fn join_reader(handle: Option<JoinHandle<Vec<u8>>>) -> Vec<u8> {
    handle
        .and_then(|h| h.join().ok())
        .unwrap_or_default()
}

fn kill_child(child: &mut Child, program: &str) {
    if let Err(e) = child.kill() {
        warn!("無法終止 {program} [{}]: {e}", child.id());
    }
    let _ = child.wait();
}
