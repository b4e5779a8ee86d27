//! WebAssembly exports for the browser player
//!
//! `initStreamer` / `nextSamples` work on a single session slot because the
//! page calls them without a handle. `NoiseSession` is the handle-based
//! alternative and validates its parameters.

use std::cell::RefCell;

use wasm_bindgen::prelude::*;

use crate::audio::buffer::{interleave_f32, StereoFrame};
use crate::audio::signals::{BrownNoiseStreamer, FrameSource};
use crate::host::HostSession;

thread_local! {
    // wasm32 is single-threaded
    static SESSION: RefCell<HostSession> = RefCell::new(HostSession::new());
}

/// Create (or replace) the page's streamer. Parameters are not validated.
#[wasm_bindgen(js_name = initStreamer)]
pub fn init_streamer(damping: f64, gain: f64, step_size: f64) {
    SESSION.with(|session| session.borrow_mut().init(damping, gain, step_size));
}

/// Next `frame_count` frames as an interleaved Float32Array of length `frame_count * 2`
#[wasm_bindgen(js_name = nextSamples)]
pub fn next_samples(frame_count: u32) -> Vec<f32> {
    SESSION.with(|session| session.borrow_mut().next_samples(frame_count as usize))
}

#[wasm_bindgen]
pub struct NoiseSession {
    streamer: BrownNoiseStreamer,
    scratch: Vec<StereoFrame>,
}

#[wasm_bindgen]
impl NoiseSession {
    /// Throws with the validation message on out-of-range parameters
    #[wasm_bindgen(constructor)]
    pub fn new(damping: f64, gain: f64, step_size: f64) -> Result<NoiseSession, JsError> {
        let streamer = BrownNoiseStreamer::create(damping, gain, step_size)?;
        Ok(Self {
            streamer,
            scratch: Vec::new(),
        })
    }

    #[wasm_bindgen(js_name = nextSamples)]
    pub fn next_samples(&mut self, frame_count: u32) -> Vec<f32> {
        self.scratch.resize(frame_count as usize, StereoFrame::silence());
        self.streamer.fill_buffer(&mut self.scratch);
        interleave_f32(&self.scratch)
    }
}
