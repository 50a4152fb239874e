use std::io::Write;
use std::sync::{Arc, Mutex};

/// Delivers a committed glyph to whatever holds input focus. Fire-and-forget.
pub trait EmitSink: Send + Sync {
    fn emit(&self, glyph: &str);
}

/// Types the glyph into the foreground window as synthesized Unicode keystrokes.
#[derive(Debug, Default, Clone, Copy)]
pub struct ForegroundKeystrokeSink;

impl EmitSink for ForegroundKeystrokeSink {
    fn emit(&self, glyph: &str) {
        #[cfg(target_os = "windows")]
        {
            if let Err(error) = send_unicode_keystrokes(glyph) {
                log::warn!("foreground emission failed: {error}");
            }
        }

        #[cfg(not(target_os = "windows"))]
        {
            log::debug!("foreground emission unsupported on this platform glyph={glyph}");
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutSink;

impl EmitSink for StdoutSink {
    fn emit(&self, glyph: &str) {
        let mut stdout = std::io::stdout().lock();
        if let Err(error) = writeln!(stdout, "{glyph}").and_then(|_| stdout.flush()) {
            log::warn!("stdout emission failed: {error}");
        }
    }
}

/// Keeps every emitted glyph. Clones share the same record.
#[derive(Debug, Default, Clone)]
pub struct RecordingSink {
    emitted: Arc<Mutex<Vec<String>>>,
}

impl RecordingSink {
    pub fn emitted(&self) -> Vec<String> {
        self.emitted
            .lock()
            .map(|emitted| emitted.clone())
            .unwrap_or_default()
    }
}

impl EmitSink for RecordingSink {
    fn emit(&self, glyph: &str) {
        if let Ok(mut emitted) = self.emitted.lock() {
            emitted.push(glyph.to_string());
        }
    }
}

#[cfg(target_os = "windows")]
fn send_unicode_keystrokes(glyph: &str) -> Result<(), String> {
    use windows_sys::Win32::UI::Input::KeyboardAndMouse::{
        SendInput, INPUT, INPUT_0, INPUT_KEYBOARD, KEYBDINPUT, KEYEVENTF_KEYUP, KEYEVENTF_UNICODE,
    };

    let mut inputs = Vec::new();
    for unit in glyph.encode_utf16() {
        for flags in [KEYEVENTF_UNICODE, KEYEVENTF_UNICODE | KEYEVENTF_KEYUP] {
            inputs.push(INPUT {
                r#type: INPUT_KEYBOARD,
                Anonymous: INPUT_0 {
                    ki: KEYBDINPUT {
                        wVk: 0,
                        wScan: unit,
                        dwFlags: flags,
                        time: 0,
                        dwExtraInfo: 0,
                    },
                },
            });
        }
    }
    if inputs.is_empty() {
        return Ok(());
    }

    let sent = unsafe {
        SendInput(
            inputs.len() as u32,
            inputs.as_ptr(),
            std::mem::size_of::<INPUT>() as i32,
        )
    };
    if sent as usize != inputs.len() {
        return Err(format!(
            "SendInput accepted {sent} of {} events",
            inputs.len()
        ));
    }
    Ok(())
}
