//! macOS clipboard backend using NSPasteboard

use super::{ClipboardError, ClipboardService};
use async_trait::async_trait;
use cocoa::base::{id, nil};
use cocoa::foundation::{NSAutoreleasePool, NSString};
use objc::{class, msg_send, sel, sel_impl};
use std::ffi::CStr;
use std::os::raw::c_char;

/// NSPasteboard type constant for plain text
const NS_PASTEBOARD_TYPE_STRING: &str = "public.utf8-plain-text";

/// General pasteboard backend
pub struct PasteboardClipboard {
    pasteboard: id,
}

impl PasteboardClipboard {
    pub fn new() -> Result<Self, ClipboardError> {
        unsafe {
            let pasteboard: id = msg_send![class!(NSPasteboard), generalPasteboard];
            if pasteboard == nil {
                return Err(ClipboardError::Platform(
                    "Failed to get general pasteboard".to_string(),
                ));
            }

            Ok(Self { pasteboard })
        }
    }

    /// Must be called inside an autorelease pool
    unsafe fn string_type() -> id {
        NSString::alloc(nil)
            .init_str(NS_PASTEBOARD_TYPE_STRING)
            .autorelease()
    }

    unsafe fn read_string(&self) -> Option<String> {
        let pool = NSAutoreleasePool::new(nil);

        let string_data: id = msg_send![self.pasteboard, stringForType: Self::string_type()];
        if string_data == nil {
            let _: () = msg_send![pool, drain];
            return None;
        }

        let utf8_ptr: *const c_char = msg_send![string_data, UTF8String];
        if utf8_ptr.is_null() {
            let _: () = msg_send![pool, drain];
            return None;
        }

        let result = CStr::from_ptr(utf8_ptr).to_string_lossy().into_owned();

        let _: () = msg_send![pool, drain];
        Some(result)
    }
}

#[async_trait]
impl ClipboardService for PasteboardClipboard {
    async fn change_count(&self) -> i64 {
        unsafe { msg_send![self.pasteboard, changeCount] }
    }

    async fn read_text(&self) -> Result<Option<String>, ClipboardError> {
        Ok(unsafe { self.read_string() })
    }

    async fn write_text(&self, text: &str) -> Result<(), ClipboardError> {
        unsafe {
            let pool = NSAutoreleasePool::new(nil);

            let _: i64 = msg_send![self.pasteboard, clearContents];
            let string = NSString::alloc(nil).init_str(text).autorelease();
            let success: bool =
                msg_send![self.pasteboard, setString: string forType: Self::string_type()];

            let _: () = msg_send![pool, drain];
            if !success {
                return Err(ClipboardError::Platform(
                    "Failed to write text to pasteboard".to_string(),
                ));
            }
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "macOS (NSPasteboard)"
    }
}

// Safety: NSPasteboard is thread-safe according to Apple documentation
unsafe impl Send for PasteboardClipboard {}
unsafe impl Sync for PasteboardClipboard {}
