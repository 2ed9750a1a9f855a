//! Windows pointer device
//!
//! Raw motion arrives through a `WH_MOUSE_LL` hook installed on a dedicated
//! message-loop thread. The hook procedure has no user-data parameter, so it
//! reaches subscribers through a registry owned by this adapter. The hook is
//! installed with the first subscription and removed with the last one.

use crate::capture::device::{MoveHandler, PointerDevice, PointerError, PointerResult, SubscriptionId};
use crate::capture::input::types::{CursorPoint, MoveEvent, ScreenBounds};
use crate::capture::registry::HookRegistry;
use once_cell::sync::Lazy;
use parking_lot::Mutex as ParkingMutex;
use std::sync::mpsc;
use std::sync::Arc;
use std::thread::JoinHandle;
use windows::Win32::Foundation::{HWND, LPARAM, LRESULT, POINT, WPARAM};
use windows::Win32::System::Threading::{
    GetCurrentThread, GetCurrentThreadId, SetThreadPriority, THREAD_PRIORITY_TIME_CRITICAL,
};
use windows::Win32::UI::WindowsAndMessaging::{
    CallNextHookEx, DispatchMessageW, GetCursorPos, GetMessageW, GetSystemMetrics,
    PostThreadMessageW, SetCursorPos, SetWindowsHookExW, TranslateMessage, UnhookWindowsHookEx,
    HC_ACTION, LLMHF_INJECTED, MSG, MSLLHOOKSTRUCT, SM_CXSCREEN, SM_CYSCREEN, WH_MOUSE_LL,
    WM_MOUSEMOVE, WM_QUIT,
};

/// Subscribers reachable from the hook procedure
static HOOK_REGISTRY: Lazy<HookRegistry> = Lazy::new(HookRegistry::new);

/// The message-loop thread owning the installed hook, if any
static HOOK_THREAD: Lazy<ParkingMutex<Option<HookThread>>> = Lazy::new(|| ParkingMutex::new(None));

struct HookThread {
    thread_id: u32,
    handle: JoinHandle<()>,
}

unsafe extern "system" fn low_level_mouse_proc(code: i32, wparam: WPARAM, lparam: LPARAM) -> LRESULT {
    if code == HC_ACTION as i32 && wparam.0 as u32 == WM_MOUSEMOVE {
        let data = &*(lparam.0 as *const MSLLHOOKSTRUCT);
        let event = MoveEvent {
            position: CursorPoint::new(data.pt.x, data.pt.y),
            injected: data.flags & LLMHF_INJECTED != 0,
        };
        if HOOK_REGISTRY.dispatch(&event).is_suppressed() {
            return LRESULT(1);
        }
    }
    CallNextHookEx(None, code, wparam, lparam)
}

/// Install the hook on a new thread and pump its messages until `WM_QUIT`.
/// Returns once installation has succeeded or failed.
fn spawn_hook_thread() -> PointerResult<HookThread> {
    let (tx, rx) = mpsc::channel::<Result<u32, String>>();

    let handle = std::thread::Builder::new()
        .name("pointer-hook".to_string())
        .spawn(move || {
            let hook = match unsafe { SetWindowsHookExW(WH_MOUSE_LL, Some(low_level_mouse_proc), None, 0) } {
                Ok(hook) => hook,
                Err(e) => {
                    let _ = tx.send(Err(e.to_string()));
                    return;
                }
            };
            let _ = tx.send(Ok(unsafe { GetCurrentThreadId() }));
            tracing::debug!("Low-level mouse hook installed");

            // Low-level hooks are only called while this thread pumps messages
            let mut msg = MSG::default();
            loop {
                let result = unsafe { GetMessageW(&mut msg, HWND(std::ptr::null_mut()), 0, 0) };
                // 0 is WM_QUIT, -1 is an error
                if result.0 <= 0 {
                    break;
                }
                unsafe {
                    let _ = TranslateMessage(&msg);
                    DispatchMessageW(&msg);
                }
            }

            unsafe {
                let _ = UnhookWindowsHookEx(hook);
            }
            tracing::debug!("Low-level mouse hook removed");
        })?;

    match rx.recv() {
        Ok(Ok(thread_id)) => Ok(HookThread { thread_id, handle }),
        Ok(Err(message)) => {
            let _ = handle.join();
            Err(PointerError::HookInstall(message))
        }
        Err(_) => {
            let _ = handle.join();
            Err(PointerError::HookInstall("hook thread exited early".to_string()))
        }
    }
}

fn stop_hook_thread(thread: HookThread) {
    let posted = unsafe { PostThreadMessageW(thread.thread_id, WM_QUIT, WPARAM(0), LPARAM(0)) };
    if let Err(e) = posted {
        tracing::warn!("Failed to post WM_QUIT to hook thread: {}", e);
        return;
    }
    if thread.handle.join().is_err() {
        tracing::error!("Hook thread panicked");
    }
}

#[derive(Debug, Default)]
pub struct WindowsPointerDevice;

impl WindowsPointerDevice {
    pub fn new() -> Self {
        Self
    }
}

impl PointerDevice for WindowsPointerDevice {
    fn cursor_position(&self) -> PointerResult<CursorPoint> {
        let mut point = POINT::default();
        unsafe { GetCursorPos(&mut point) }.map_err(|e| PointerError::ReadFailed(e.to_string()))?;
        Ok(CursorPoint::new(point.x, point.y))
    }

    fn set_cursor_position(&self, point: CursorPoint) -> PointerResult<()> {
        unsafe { SetCursorPos(point.x, point.y) }.map_err(|e| PointerError::WriteFailed(e.to_string()))
    }

    fn screen_bounds(&self) -> PointerResult<ScreenBounds> {
        let (width, height) = unsafe { (GetSystemMetrics(SM_CXSCREEN), GetSystemMetrics(SM_CYSCREEN)) };
        if width <= 0 || height <= 0 {
            return Err(PointerError::PlatformError(format!(
                "GetSystemMetrics reported a {}x{} screen",
                width, height
            )));
        }
        Ok(ScreenBounds::new(width as u32, height as u32))
    }

    fn subscribe(&self, handler: Arc<dyn MoveHandler>) -> PointerResult<SubscriptionId> {
        let mut thread = HOOK_THREAD.lock();
        let (id, _) = HOOK_REGISTRY.register(handler);

        if thread.is_none() {
            match spawn_hook_thread() {
                Ok(spawned) => *thread = Some(spawned),
                Err(e) => {
                    let _ = HOOK_REGISTRY.unregister(id);
                    return Err(e);
                }
            }
        }
        Ok(id)
    }

    fn unsubscribe(&self, id: SubscriptionId) -> PointerResult<()> {
        let mut thread = HOOK_THREAD.lock();
        let now_empty = HOOK_REGISTRY.unregister(id)?;

        if now_empty {
            if let Some(running) = thread.take() {
                stop_hook_thread(running);
            }
        }
        Ok(())
    }

    fn elevate_current_thread(&self) {
        if let Err(e) = unsafe { SetThreadPriority(GetCurrentThread(), THREAD_PRIORITY_TIME_CRITICAL) } {
            tracing::warn!("Failed to raise smoothing thread priority: {}", e);
        }
    }
}
