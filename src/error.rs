// Every variant states *where* things went wrong.
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Window init error: {0}")]
    WindowInit(String),   // Creating the window failed

    #[error("Window update error: {0}")]
    WindowUpdate(String), // Updating the window buffer failed

    #[error("Camera init error: {0}")]
    CameraInit(String),   // Opening/starting the camera failed

    #[error("Camera frame error: {0}")]
    CameraFrame(String),  // Grabbing/decoding a frame failed

    #[error("Mask is {mask_w}x{mask_h} but the screen is {screen_w}x{screen_h}")]
    MaskSize {                // Compositing a mask onto a differently sized frame
        mask_w: usize,
        mask_h: usize,
        screen_w: usize,
        screen_h: usize,
    },

    #[error("Failed to read config file {path:?}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path:?}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
