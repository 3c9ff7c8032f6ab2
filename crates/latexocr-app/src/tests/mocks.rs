//! In-memory stand-ins for the platform services.

use std::collections::VecDeque;
use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use latexocr_core::ports::{ClipboardSink, HotkeyBinder, RegionSelector, ScreenCapture};
use latexocr_ocr::{OcrSettings, Transcriber};
use latexocr_preview::PreviewPort;
use latexocr_types::{
    CaptureError, CapturedImage, ClipboardError, HotkeyError, OcrError, PreviewError, ScreenInfo,
    Selection, SelectionRect,
};
use tokio::sync::watch;

pub fn sample_image() -> CapturedImage {
    CapturedImage {
        width: 4,
        height: 2,
        rgba: vec![255; 4 * 2 * 4],
    }
}

pub struct FixedSelector {
    pub selection: Option<Selection>,
}

impl FixedSelector {
    pub fn selecting() -> Self {
        Self {
            selection: Some(Selection {
                rect: SelectionRect::from_points((10, 10), (50, 30)),
                screen: ScreenInfo {
                    id: 1,
                    x: 0,
                    y: 0,
                    width: 1920,
                    height: 1080,
                    scale_factor: 1.0,
                },
            }),
        }
    }

    pub fn cancelling() -> Self {
        Self { selection: None }
    }
}

#[async_trait]
impl RegionSelector for FixedSelector {
    async fn select(&self) -> Option<Selection> {
        self.selection
    }
}

#[derive(Default)]
pub struct FakeCapture {
    pub loaded: Mutex<Vec<String>>,
    /// Returned by every screen capture instead of an image
    pub failure: Option<CaptureError>,
}

impl FakeCapture {
    pub fn failing(error: CaptureError) -> Self {
        Self {
            failure: Some(error),
            ..Self::default()
        }
    }
}

impl ScreenCapture for FakeCapture {
    fn capture(&self, _selection: &Selection) -> Result<CapturedImage, CaptureError> {
        match &self.failure {
            Some(error) => Err(error.clone()),
            None => Ok(sample_image()),
        }
    }

    fn load_file(&self, path: &Path) -> Result<CapturedImage, CaptureError> {
        self.loaded
            .lock()
            .unwrap()
            .push(path.display().to_string());
        Ok(sample_image())
    }
}

/// Replies in order, each after its delay
#[derive(Default)]
pub struct ScriptedTranscriber {
    replies: Mutex<VecDeque<(Duration, Result<String, OcrError>)>>,
    pub calls: AtomicUsize,
}

impl ScriptedTranscriber {
    pub fn replying(replies: Vec<(Duration, Result<String, OcrError>)>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transcriber for ScriptedTranscriber {
    async fn transcribe(
        &self,
        _image: &CapturedImage,
        _settings: &OcrSettings,
    ) -> Result<String, OcrError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let reply = self.replies.lock().unwrap().pop_front();
        match reply {
            Some((delay, outcome)) => {
                tokio::time::sleep(delay).await;
                outcome
            }
            None => Err(OcrError::InvalidResponse("no scripted reply".to_string())),
        }
    }
}

#[derive(Default)]
pub struct RecordingHotkeys {
    pub chords: Mutex<Vec<String>>,
    pub fail: bool,
}

#[async_trait]
impl HotkeyBinder for RecordingHotkeys {
    async fn rebind(&self, chord: &str) -> Result<(), HotkeyError> {
        if self.fail {
            return Err(HotkeyError::Register("already taken".to_string()));
        }
        self.chords.lock().unwrap().push(chord.to_string());
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryClipboard {
    pub text: Mutex<Option<String>>,
}

impl MemoryClipboard {
    pub fn contents(&self) -> Option<String> {
        self.text.lock().unwrap().clone()
    }
}

impl ClipboardSink for MemoryClipboard {
    fn set_text(&self, text: &str) -> Result<(), ClipboardError> {
        *self.text.lock().unwrap() = Some(text.to_string());
        Ok(())
    }
}

/// Renderer that loads when told to and answers MathML queries from a script
pub struct FakePreview {
    ready: watch::Sender<bool>,
    pub pushes: Mutex<Vec<String>>,
    pub mathml: Mutex<Option<String>>,
}

impl FakePreview {
    pub fn new() -> Self {
        let (ready, _) = watch::channel(false);
        Self {
            ready,
            pushes: Mutex::new(Vec::new()),
            mathml: Mutex::new(None),
        }
    }

    pub fn set_ready(&self) {
        self.ready.send_replace(true);
    }

    pub fn pushes(&self) -> Vec<String> {
        self.pushes.lock().unwrap().clone()
    }
}

#[async_trait]
impl PreviewPort for FakePreview {
    async fn push(&self, latex: &str) -> Result<(), PreviewError> {
        self.pushes.lock().unwrap().push(latex.to_string());
        Ok(())
    }

    async fn query_mathml(&self, _latex: &str, _timeout: Duration) -> Option<String> {
        self.mathml.lock().unwrap().clone()
    }

    fn is_alive(&self) -> bool {
        true
    }

    fn is_ready(&self) -> bool {
        *self.ready.borrow()
    }

    async fn wait_ready(&self) -> bool {
        let mut ready = self.ready.subscribe();
        ready.wait_for(|ready| *ready).await.is_ok()
    }

    async fn bring_to_front(&self) -> Result<(), PreviewError> {
        Ok(())
    }

    async fn close(&self) {}
}
