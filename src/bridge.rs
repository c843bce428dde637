use crate::state::parse_screen_state;
use crate::{Error, UnlockOptions};
use cfg_if::cfg_if;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::debug;

cfg_if! {
    if #[cfg(target_os = "windows")] {
        pub(crate) const DEFAULT_PROGRAM: &str = "adb.exe";
    } else {
        pub(crate) const DEFAULT_PROGRAM: &str = "adb";
    }
}

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Android key codes injected during an unlock.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyCode {
    /// `KEYCODE_POWER`, wakes the screen.
    Wake,
    /// `KEYCODE_MENU`, dismisses an insecure keyguard.
    Menu,
}

impl KeyCode {
    /// Numeric code passed to `input keyevent`.
    pub fn code(self) -> u32 {
        match self {
            KeyCode::Wake => 26,
            KeyCode::Menu => 82,
        }
    }
}

/// Access to a device through some bridge tool.
pub trait DeviceBridge {
    /// Current screen state, or `Ok(None)` if the diagnostics carry no state line.
    fn screen_state(&self, serial: &str) -> Result<Option<String>, Error>;

    /// Inject a single key event.
    fn send_key_event(&self, serial: &str, key: KeyCode) -> Result<(), Error>;
}

/// [`DeviceBridge`] backed by the `adb` executable.
#[derive(Clone, Debug)]
pub struct Adb {
    program: PathBuf,
    query_timeout: Duration,
}

impl Adb {
    /// Bridge using `options.program` and `options.query_timeout`.
    pub fn new(options: &UnlockOptions) -> Self {
        Self {
            program: options.program.clone(),
            query_timeout: options.query_timeout,
        }
    }

    fn output(&self, args: &[&str], timeout: Option<Duration>) -> Result<String, Error> {
        debug!("running {} {}", self.program.display(), args.join(" "));

        let child = Command::new(&self.program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| match e.kind() {
                io::ErrorKind::NotFound => Error::NotFound(self.program.display().to_string()),
                _ => Error::Io(e),
            })?;

        let (status, stdout, stderr) = match timeout {
            Some(timeout) => wait_with_timeout(child, timeout)?,
            None => {
                let output = child.wait_with_output()?;
                (output.status, output.stdout, output.stderr)
            }
        };

        if !status.success() {
            return Err(Error::Exit {
                status: status.to_string(),
                stderr: String::from_utf8_lossy(&stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&stdout).into_owned())
    }
}

impl DeviceBridge for Adb {
    fn screen_state(&self, serial: &str) -> Result<Option<String>, Error> {
        let stdout = self.output(
            &["-s", serial, "shell", "dumpsys", "nfc"],
            Some(self.query_timeout),
        )?;
        Ok(parse_screen_state(&stdout))
    }

    fn send_key_event(&self, serial: &str, key: KeyCode) -> Result<(), Error> {
        let code = key.code().to_string();
        self.output(&["-s", serial, "shell", "input", "keyevent", code.as_str()], None)?;
        Ok(())
    }
}

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> JoinHandle<Vec<u8>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut pipe) = pipe {
            let _ = pipe.read_to_end(&mut buf);
        }
        buf
    })
}

fn wait_with_timeout(
    mut child: Child,
    timeout: Duration,
) -> Result<(ExitStatus, Vec<u8>, Vec<u8>), Error> {
    // Drain both pipes so a chatty child cannot block on a full pipe buffer.
    let stdout = drain(child.stdout.take());
    let stderr = drain(child.stderr.take());

    let start = Instant::now();
    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) => {
                if start.elapsed() >= timeout {
                    let _ = child.kill();
                    let _ = child.wait();
                    // Readers are left detached: a forked adb server may still hold the pipes.
                    return Err(Error::Timeout(timeout));
                }
                thread::sleep(POLL_INTERVAL);
            }
            Err(e) => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(Error::Io(e));
            }
        }
    };

    let stdout = stdout.join().unwrap_or_default();
    let stderr = stderr.join().unwrap_or_default();
    Ok((status, stdout, stderr))
}
