// Opens the camera on its own thread and keeps the newest frame ready for the tick loop.
// The render loop never waits on the device: it takes whatever frame arrived last,
// already stretched to the window size and packed as 0x00RRGGBB.

use crate::config::CameraConfig;
use crate::draw::{draw_text_scaled, text_width};
use crate::error::Error;
use crate::types::FrameBuffer;

use image::imageops::{self, FilterType};
use image::RgbImage;
use nokhwa::{
    Camera,
    pixel_format::RgbFormat,
    utils::{
        CameraFormat, CameraIndex, FrameFormat, RequestedFormat, RequestedFormatType, Resolution,
    },
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{error, info, warn};

/// Consecutive frame errors before the feed gives up.
const MAX_FRAME_FAILURES: u32 = 30;

/// How long closing the window waits for the capture thread.
const SHUTDOWN_WAIT: Duration = Duration::from_millis(500);

/// A small wrapper around nokhwa::Camera.
pub struct CameraCapture {
    cam: Camera,
    width: u32,
    height: u32,
}

impl CameraCapture {
    /// Open the device and start streaming at (or near) the requested format.
    pub fn new(config: &CameraConfig) -> Result<Self, Error> {
        let idx = CameraIndex::Index(config.index);

        let fmt = CameraFormat::new(
            Resolution::new(config.width, config.height),
            FrameFormat::YUYV, // uncompressed; cheap to convert to RGB
            config.fps,
        );
        let req = RequestedFormat::new::<RgbFormat>(RequestedFormatType::Closest(fmt));

        let mut cam = Camera::new(idx, req)
            .map_err(|e| Error::CameraInit(format!("Create camera: {e}")))?;
        cam.open_stream()
            .map_err(|e| Error::CameraInit(format!("Open stream: {e}")))?;

        // The stream may pick a slightly different resolution.
        let actual = cam.resolution();
        Ok(Self { cam, width: actual.width(), height: actual.height() })
    }

    /// Block until the next frame and decode it to RGB.
    pub fn next_rgb(&mut self) -> Result<RgbImage, Error> {
        let frame = self
            .cam
            .frame()
            .map_err(|e| Error::CameraFrame(format!("Fetch frame: {e}")))?;
        let decoded = frame
            .decode_image::<RgbFormat>()
            .map_err(|e| Error::CameraFrame(format!("Decode RGB: {e}")))?;
        let (w, h) = (decoded.width(), decoded.height());
        RgbImage::from_raw(w, h, decoded.into_raw())
            .ok_or_else(|| Error::CameraFrame(format!("Decoded buffer does not fit {w}x{h}")))
    }

    pub fn resolution(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

/// Stretch an RGB image to `width` x `height` and pack it for the window.
pub fn to_frame_buffer(img: &RgbImage, width: usize, height: usize) -> FrameBuffer {
    let resized;
    let src = if img.width() as usize == width && img.height() as usize == height {
        img
    } else {
        resized = imageops::resize(img, width as u32, height as u32, FilterType::Nearest);
        &resized
    };

    let pixels = src
        .pixels()
        .map(|p| ((p[0] as u32) << 16) | ((p[1] as u32) << 8) | p[2] as u32)
        .collect();
    FrameBuffer { width, height, pixels }
}

/// Dark frame with a centered message, shown when there is no video to put under the mask.
pub fn placeholder_frame(width: usize, height: usize, message: &str) -> FrameBuffer {
    let mut fb = FrameBuffer::filled(width, height, 0x00_30_30_30);
    let scale = 3;
    let x = (width as i32 - text_width(message, scale) as i32) / 2;
    let y = (height as i32 - 7 * scale as i32) / 2;
    draw_text_scaled(&mut fb, x, y, message, 0x00_C0_C0_C0, scale);
    fb
}

struct Shared {
    latest: Mutex<Option<FrameBuffer>>,
    target: Mutex<(usize, usize)>,
    running: AtomicBool,
    failed: AtomicBool,
}

/// Handle to the background capture thread.
pub struct CameraFeed {
    shared: Arc<Shared>,
    thread: Option<JoinHandle<()>>,
}

impl CameraFeed {
    /// Start capturing; frames are delivered at `width` x `height`.
    pub fn spawn(config: CameraConfig, width: usize, height: usize) -> Self {
        let shared = Arc::new(Shared {
            latest: Mutex::new(None),
            target: Mutex::new((width, height)),
            running: AtomicBool::new(true),
            failed: AtomicBool::new(false),
        });

        let worker = Arc::clone(&shared);
        let thread = thread::Builder::new()
            .name("camera".into())
            .spawn(move || capture_loop(&config, &worker));
        let thread = match thread {
            Ok(handle) => Some(handle),
            Err(e) => {
                error!("Failed to start camera thread: {e}");
                shared.failed.store(true, Ordering::SeqCst);
                None
            }
        };

        Self { shared, thread }
    }

    /// The newest frame, if one arrived since the last call.
    pub fn take_latest(&self) -> Option<FrameBuffer> {
        self.shared.latest.lock().ok()?.take()
    }

    pub fn set_target_size(&self, width: usize, height: usize) {
        if let Ok(mut target) = self.shared.target.lock() {
            *target = (width, height);
        }
    }

    /// True once the device could not be opened or stopped delivering frames.
    pub fn has_failed(&self) -> bool {
        self.shared.failed.load(Ordering::SeqCst)
    }
}

impl Drop for CameraFeed {
    fn drop(&mut self) {
        self.shared.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.thread.take() {
            if !join_within(handle, SHUTDOWN_WAIT) {
                // A driver stuck in frame() must not keep the window from closing.
                warn!("camera thread still busy after {:?}, detaching it", SHUTDOWN_WAIT);
            }
        }
    }
}

/// Join `handle` if it finishes within `timeout`; otherwise drop it, detaching the thread.
fn join_within(handle: JoinHandle<()>, timeout: Duration) -> bool {
    let deadline = Instant::now() + timeout;
    while !handle.is_finished() {
        if Instant::now() >= deadline {
            return false;
        }
        thread::sleep(Duration::from_millis(5));
    }
    let _ = handle.join();
    true
}

fn capture_loop(config: &CameraConfig, shared: &Shared) {
    let mut cam = match CameraCapture::new(config) {
        Ok(cam) => cam,
        Err(e) => {
            error!("{e}");
            shared.failed.store(true, Ordering::SeqCst);
            return;
        }
    };
    let (w, h) = cam.resolution();
    info!(index = config.index, width = w, height = h, "camera streaming");

    let mut failures = 0;
    while shared.running.load(Ordering::SeqCst) {
        let img = match cam.next_rgb() {
            Ok(img) => {
                failures = 0;
                img
            }
            Err(e) => {
                failures += 1;
                warn!(failures, "{e}");
                if failures >= MAX_FRAME_FAILURES {
                    error!("Camera stopped delivering frames");
                    shared.failed.store(true, Ordering::SeqCst);
                    return;
                }
                continue;
            }
        };

        let (tw, th) = match shared.target.lock() {
            Ok(target) => *target,
            Err(_) => return,
        };
        let fb = to_frame_buffer(&img, tw, th);
        if let Ok(mut slot) = shared.latest.lock() {
            *slot = Some(fb);
        }
    }
}
