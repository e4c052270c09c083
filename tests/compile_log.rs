//! Error-level logging of shader compile failures.
//!
//! Installs a capturing logger, so it lives in its own test binary.

use std::sync::{Mutex, Once};

use gfx_facade::{BackendType, RenderError, Renderer, RendererConfig};

static RECORDS: Mutex<Vec<(log::Level, String)>> = Mutex::new(Vec::new());
static INSTALL: Once = Once::new();

struct Capture;

impl log::Log for Capture {
    fn enabled(&self, _metadata: &log::Metadata) -> bool {
        true
    }

    fn log(&self, record: &log::Record) {
        if let Ok(mut records) = RECORDS.lock() {
            records.push((record.level(), format!("{}", record.args())));
        }
    }

    fn flush(&self) {}
}

fn install() {
    INSTALL.call_once(|| {
        log::set_logger(&Capture).expect("no other logger in this binary");
        log::set_max_level(log::LevelFilter::Trace);
    });
}

fn errors() -> Vec<String> {
    RECORDS
        .lock()
        .unwrap()
        .iter()
        .filter(|(level, _)| *level == log::Level::Error)
        .map(|(_, message)| message.clone())
        .collect()
}

#[test]
fn test_failed_compile_logs_diagnostic_once() {
    install();
    let mut renderer = Renderer::new(RendererConfig::default().with_backend(BackendType::Headless));
    assert!(renderer.init());

    let shader = renderer.create_shader().unwrap();
    let before = errors().len();
    let output = renderer.compile_shader(shader, "@vertex fn vs_main( {");
    assert_eq!(output.result, Err(RenderError::Internal));
    assert!(!output.log.is_empty());

    let logged = errors();
    assert_eq!(logged.len(), before + 1, "{:#?}", &logged[before..]);
    assert!(logged[before].contains(&output.log));
}
