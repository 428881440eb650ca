//! Bounded log ring, mirrored to the console and persisted for the dashboard's
//! diagnostics view.
//!
//! `tracing` events from the engine land here through [`init_tracing`].

use std::cell::RefCell;
use std::io;

use js_sys::{Array, Object, Reflect};
use tracing_subscriber::fmt::MakeWriter;
use wasm_bindgen::JsValue;

use crate::chrome;

const LOG_LIMIT: usize = 40;
const LOG_KEY: &str = "spacesLog";

thread_local! {
    static LOG: RefCell<Vec<String>> = const { RefCell::new(Vec::new()) };
}

pub fn push_log(line: &str) {
    web_sys::console::log_1(&JsValue::from_str(line));
    LOG.with(|log| {
        let mut vec = log.borrow_mut();
        vec.push(line.to_string());
        if vec.len() > LOG_LIMIT {
            let excess = vec.len() - LOG_LIMIT;
            vec.drain(0..excess);
        }
        persist_log(&vec);
    });
}

fn persist_log(lines: &[String]) {
    let array = Array::new();
    for line in lines {
        array.push(&JsValue::from_str(line));
    }
    let obj = Object::new();
    let _ = Reflect::set(&obj, &JsValue::from_str(LOG_KEY), &array);
    // Fire and forget; a lost log write is not worth surfacing.
    let _ = chrome::storage_local_set(&obj);
}

/// One formatted event; pushed to the ring when the formatter drops it.
pub struct LineWriter(Vec<u8>);

impl io::Write for LineWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for LineWriter {
    fn drop(&mut self) {
        let line = String::from_utf8_lossy(&self.0);
        let line = line.trim_end();
        if !line.is_empty() {
            push_log(line);
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RingWriter;

impl<'a> MakeWriter<'a> for RingWriter {
    type Writer = LineWriter;

    fn make_writer(&'a self) -> Self::Writer {
        LineWriter(Vec::new())
    }
}

/// Routes `tracing` output at info and above into the ring.
///
/// No timestamps: `SystemTime` panics on wasm32-unknown-unknown.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_writer(RingWriter)
        .with_max_level(tracing::Level::INFO)
        .without_time()
        .with_ansi(false)
        .with_target(true)
        .compact()
        .try_init();
}
