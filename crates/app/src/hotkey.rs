//! System-wide trigger key
//!
//! A low-level keyboard hook runs on its own thread. It suppresses the
//! trigger key and turns key presses into [`GateSignal`]s for the UI thread.

use crossbeam_channel::{Receiver, Sender};

/// Print Screen
pub const VK_SNAPSHOT: u32 = 0x2C;
pub const VK_ESCAPE: u32 = 0x1B;

/// Signal from the hook thread to the UI thread
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateSignal {
    OpenSession,
    Cancel,
}

/// What the hook does with a key after the gate has seen it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyDisposition {
    Suppress,
    PassThrough,
}

/// Decides which keys become signals
pub struct HotkeyGate {
    trigger: u32,
    trigger_held: bool,
    signals: Sender<GateSignal>,
    wake: Box<dyn Fn() + Send>,
}

impl HotkeyGate {
    /// `wake` is called after every signal so the UI thread drains the channel
    pub fn new<W>(trigger: u32, signals: Sender<GateSignal>, wake: W) -> Self
    where
        W: Fn() + Send + 'static,
    {
        Self {
            trigger,
            trigger_held: false,
            signals,
            wake: Box::new(wake),
        }
    }

    pub fn on_key_down(&mut self, vk: u32) -> KeyDisposition {
        if vk == self.trigger {
            // Held keys repeat key-down without a key-up in between
            if !self.trigger_held {
                self.trigger_held = true;
                self.send(GateSignal::OpenSession);
            }
            return KeyDisposition::Suppress;
        }

        if vk == VK_ESCAPE {
            self.send(GateSignal::Cancel);
        }
        KeyDisposition::PassThrough
    }

    pub fn on_key_up(&mut self, vk: u32) -> KeyDisposition {
        if vk == self.trigger {
            self.trigger_held = false;
            return KeyDisposition::Suppress;
        }
        KeyDisposition::PassThrough
    }

    fn send(&self, signal: GateSignal) {
        log::debug!("Hotkey signal {:?}", signal);
        if self.signals.send(signal).is_err() {
            log::warn!("Signal receiver is gone, dropping {:?}", signal);
            return;
        }
        (self.wake)();
    }
}

/// Empty the channel while a selection is on screen
///
/// Returns true if any of the drained signals was a cancel. Triggers are
/// dropped so none is left to reopen a session afterwards.
pub fn drain_cancel(signals: &Receiver<GateSignal>) -> bool {
    signals
        .try_iter()
        .fold(false, |cancel, signal| cancel | (signal == GateSignal::Cancel))
}

#[cfg(windows)]
pub use hook::{install, HookHandle};

#[cfg(windows)]
mod hook {
    use super::{HotkeyGate, KeyDisposition};
    use anyhow::{anyhow, Context};
    use once_cell::sync::OnceCell;
    use parking_lot::Mutex;
    use std::sync::Arc;
    use std::thread::{self, JoinHandle};
    use windows::Win32::Foundation::{HINSTANCE, LPARAM, LRESULT, WPARAM};
    use windows::Win32::System::LibraryLoader::GetModuleHandleW;
    use windows::Win32::System::Threading::GetCurrentThreadId;
    use windows::Win32::UI::WindowsAndMessaging::{
        CallNextHookEx, DispatchMessageW, GetMessageW, PostThreadMessageW, SetWindowsHookExW,
        TranslateMessage, UnhookWindowsHookEx, HHOOK, KBDLLHOOKSTRUCT, MSG, WH_KEYBOARD_LL,
        WM_KEYDOWN, WM_KEYUP, WM_QUIT, WM_SYSKEYDOWN, WM_SYSKEYUP,
    };

    // Low-level hook callbacks carry no user data
    static GATE: OnceCell<Mutex<HotkeyGate>> = OnceCell::new();

    /// Running hook thread
    pub struct HookHandle {
        thread_id: Arc<Mutex<Option<u32>>>,
        worker: Option<JoinHandle<()>>,
    }

    impl HookHandle {
        /// Unhook and join the hook thread
        pub fn stop(mut self) {
            self.shutdown();
        }

        fn shutdown(&mut self) {
            if let Some(id) = self.thread_id.lock().take() {
                unsafe {
                    let _ = PostThreadMessageW(id, WM_QUIT, WPARAM(0), LPARAM(0));
                }
            }
            if let Some(worker) = self.worker.take() {
                let _ = worker.join();
            }
        }
    }

    impl Drop for HookHandle {
        fn drop(&mut self) {
            self.shutdown();
        }
    }

    /// Install the keyboard hook on a dedicated thread
    ///
    /// Only one gate can be installed per process.
    pub fn install(gate: HotkeyGate) -> anyhow::Result<HookHandle> {
        GATE.set(Mutex::new(gate))
            .map_err(|_| anyhow!("Keyboard hook is already installed"))?;

        let thread_id = Arc::new(Mutex::new(None));
        let (ready_tx, ready_rx) = crossbeam_channel::bounded::<Result<(), String>>(1);

        let thread_id_slot = thread_id.clone();
        let worker = thread::Builder::new()
            .name("hotkey-hook".into())
            .spawn(move || unsafe {
                let hook = match install_hook() {
                    Ok(hook) => hook,
                    Err(err) => {
                        let _ = ready_tx.send(Err(err.to_string()));
                        return;
                    }
                };
                *thread_id_slot.lock() = Some(GetCurrentThreadId());
                let _ = ready_tx.send(Ok(()));

                let mut msg = MSG::default();
                while GetMessageW(&mut msg, None, 0, 0).as_bool() {
                    let _ = TranslateMessage(&msg);
                    DispatchMessageW(&msg);
                }

                let _ = UnhookWindowsHookEx(hook);
                log::info!("Keyboard hook removed");
            })
            .context("Failed to spawn hook thread")?;

        ready_rx
            .recv()
            .context("Hook thread exited during startup")?
            .map_err(|err| anyhow!("SetWindowsHookExW failed: {}", err))?;

        log::info!("Keyboard hook installed");
        Ok(HookHandle {
            thread_id,
            worker: Some(worker),
        })
    }

    unsafe fn install_hook() -> windows::core::Result<HHOOK> {
        let hmodule = GetModuleHandleW(None)?;
        SetWindowsHookExW(WH_KEYBOARD_LL, Some(keyboard_proc), HINSTANCE(hmodule.0), 0)
    }

    fn dispatch(message: u32, vk: u32) -> KeyDisposition {
        let Some(gate) = GATE.get() else {
            return KeyDisposition::PassThrough;
        };
        let mut gate = gate.lock();
        match message {
            WM_KEYDOWN | WM_SYSKEYDOWN => gate.on_key_down(vk),
            WM_KEYUP | WM_SYSKEYUP => gate.on_key_up(vk),
            _ => KeyDisposition::PassThrough,
        }
    }

    unsafe extern "system" fn keyboard_proc(code: i32, wparam: WPARAM, lparam: LPARAM) -> LRESULT {
        if code >= 0 {
            let info = &*(lparam.0 as *const KBDLLHOOKSTRUCT);
            let vk = info.vkCode;
            let message = wparam.0 as u32;

            let disposition = std::panic::catch_unwind(|| dispatch(message, vk))
                .unwrap_or_else(|_| {
                    log::error!("Keyboard hook panicked on key {:#x}, passing it through", vk);
                    KeyDisposition::PassThrough
                });

            if disposition == KeyDisposition::Suppress {
                return LRESULT(1);
            }
        }
        CallNextHookEx(HHOOK::default(), code, wparam, lparam)
    }
}
