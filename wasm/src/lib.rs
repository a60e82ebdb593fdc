use csave_core::{csave_records, Record, Session, SessionConfig, RENDER_QUANTUM};
use js_sys::{Array, Float32Array};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

/// Session handle for an AudioWorklet `process()` loop
///
/// Records are collected first, then `start()` validates everything and
/// builds the session. Until a session starts successfully, `process`
/// reports exhaustion so the host can drop the node without hearing noise.
#[wasm_bindgen]
pub struct WasmSession {
    config: SessionConfig,
    records: Vec<Record>,
    session: Session,
    scratch: Vec<f32>,
}

#[wasm_bindgen]
impl WasmSession {
    #[wasm_bindgen(constructor)]
    pub fn new(sample_rate: f64, symbol_rate: f64) -> WasmSession {
        WasmSession {
            config: SessionConfig::new(sample_rate, symbol_rate),
            records: Vec::new(),
            session: Session::exhausted(),
            scratch: vec![0.0; RENDER_QUANTUM],
        }
    }

    /// Append a record: `preamble` seconds of leader, then `bytes`
    #[wasm_bindgen(js_name = addRecord)]
    pub fn add_record(&mut self, preamble: f64, bytes: &[u8]) {
        self.records.push(Record::new(preamble, bytes.to_vec()));
    }

    /// Replace the records with the CSAVE header and data layout
    #[wasm_bindgen(js_name = useCsaveProgram)]
    pub fn use_csave_program(&mut self, data: &[u8]) {
        self.records = csave_records(data).to_vec();
    }

    /// Validate the configuration and begin a fresh session
    pub fn start(&mut self) -> Result<(), JsValue> {
        let session = Session::configure(self.config, self.records.clone())
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        self.scratch.resize(self.config.block_size, 0.0);
        self.session = session;
        Ok(())
    }

    /// Fill every `Float32Array` in `channels` with the next block
    ///
    /// Returns `false` once the stream is exhausted.
    pub fn process(&mut self, channels: &Array) -> Result<bool, JsValue> {
        let mut len = usize::MAX;
        for channel in channels.iter() {
            let channel = channel
                .dyn_ref::<Float32Array>()
                .ok_or_else(|| JsValue::from_str("output channel is not a Float32Array"))?;
            len = len.min(channel.length() as usize);
        }
        if channels.length() == 0 {
            len = self.config.block_size;
        }
        if self.scratch.len() < len {
            self.scratch.resize(len, 0.0);
        }

        let before = self.session.samples_rendered();
        let more = self.session.render_mono(&mut self.scratch[..len]);
        let rendered = (self.session.samples_rendered() - before) as usize;

        // Only the rendered prefix is copied so the rest of the block keeps its contents
        for channel in channels.iter() {
            channel
                .unchecked_into::<Float32Array>()
                .subarray(0, rendered as u32)
                .copy_from(&self.scratch[..rendered]);
        }
        Ok(more)
    }

    /// Fill one mono block in place; see `process`
    #[wasm_bindgen(js_name = processMono)]
    pub fn process_mono(&mut self, output: &mut [f32]) -> bool {
        self.session.render_mono(output)
    }

    #[wasm_bindgen(js_name = totalSamples)]
    pub fn total_samples(&self) -> f64 {
        self.session.total_samples() as f64
    }

    #[wasm_bindgen(js_name = samplesRendered)]
    pub fn samples_rendered(&self) -> f64 {
        self.session.samples_rendered() as f64
    }

    #[wasm_bindgen(js_name = isDone)]
    pub fn is_done(&self) -> bool {
        self.session.is_done()
    }
}
