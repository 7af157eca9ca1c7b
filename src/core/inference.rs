//! ONNX Runtime session wrapper for the PGNet forward pass.
//!
//! The model artifact is loaded once at startup into a small pool of
//! sessions that are shared read-only for the process lifetime. A forward
//! pass produces exactly four output heads; their export order is a fixed
//! contract, but after load every access goes through the names captured
//! from the session so a runtime-side reordering cannot silently shift the
//! roles.

use crate::core::errors::{OcrError, OcrResult};
use crate::core::Tensor4D;
use ndarray::ArrayView4;
use ort::session::Session;
use ort::value::TensorRef;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use tracing::{debug, info};

/// Role of one PGNet output head.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputRole {
    /// Per-pixel offsets from the center line to the top and bottom borders
    /// (4 channels).
    Border,
    /// Per-pixel character-class logits (dictionary size + 1 blank channels).
    CharLogits,
    /// Per-pixel reading-direction vector (2 channels).
    Direction,
    /// Per-pixel text/no-text probability (1 channel).
    Score,
}

impl OutputRole {
    /// The order in which the four heads appear in the ONNX export.
    pub const EXPORT_ORDER: [OutputRole; 4] = [
        OutputRole::Border,
        OutputRole::CharLogits,
        OutputRole::Direction,
        OutputRole::Score,
    ];

    /// Short name used in logs and error messages.
    pub fn as_str(self) -> &'static str {
        match self {
            OutputRole::Border => "border",
            OutputRole::CharLogits => "char",
            OutputRole::Direction => "direction",
            OutputRole::Score => "score",
        }
    }
}

/// The four raw output tensors of one forward pass, keyed by role.
///
/// Each tensor is spatially aligned to the resized input grid at one quarter
/// of its resolution.
#[derive(Debug)]
pub struct RawOutput {
    /// Border-offset map, `[1, 4, H/4, W/4]`.
    pub border: Tensor4D,
    /// Character logits, `[1, C, H/4, W/4]`.
    pub char_logits: Tensor4D,
    /// Reading-direction map, `[1, 2, H/4, W/4]`.
    pub direction: Tensor4D,
    /// Text score map, `[1, 1, H/4, W/4]`.
    pub score: Tensor4D,
}

/// A pool of ONNX Runtime sessions over the PGNet artifact.
///
/// Weights are read-only after load; concurrent callers round-robin over the
/// pool, each session guarded by its own mutex.
pub struct PGNetSession {
    sessions: Vec<Mutex<Session>>,
    next_idx: AtomicUsize,
    input_name: String,
    /// Output tensor names captured at load, indexed like
    /// [`OutputRole::EXPORT_ORDER`].
    output_names: [String; 4],
    model_path: PathBuf,
}

impl std::fmt::Debug for PGNetSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PGNetSession")
            .field("sessions", &self.sessions.len())
            .field("input_name", &self.input_name)
            .field("output_names", &self.output_names)
            .field("model_path", &self.model_path)
            .finish()
    }
}

impl PGNetSession {
    /// Loads the model artifact into a pool of `pool_size` sessions.
    ///
    /// The path is checked eagerly so a missing artifact fails with
    /// [`OcrError::ModelNotFound`] instead of an opaque runtime error.
    ///
    /// # Errors
    ///
    /// Returns an error if the artifact is missing, cannot be parsed by the
    /// runtime, or does not expose exactly one input and four outputs.
    pub fn load(model_path: impl AsRef<Path>, pool_size: usize) -> OcrResult<Self> {
        let path = model_path.as_ref();
        if !path.exists() {
            return Err(OcrError::model_not_found(path));
        }

        let pool_size = pool_size.max(1);
        let mut sessions = Vec::with_capacity(pool_size);
        for _ in 0..pool_size {
            let session = Session::builder().and_then(|b| b.commit_from_file(path))?;
            sessions.push(Mutex::new(session));
        }

        let (input_name, output_names) = {
            let session = sessions[0]
                .lock()
                .map_err(|_| OcrError::invalid_input("session lock poisoned during load"))?;
            let input_name = session
                .inputs
                .first()
                .map(|i| i.name.clone())
                .ok_or_else(|| OcrError::config_error("model exposes no input tensor"))?;
            let names: Vec<String> = session.outputs.iter().map(|o| o.name.clone()).collect();
            if names.len() != 4 {
                return Err(OcrError::config_error(format!(
                    "expected 4 output heads (border, char, direction, score), model has {}",
                    names.len()
                )));
            }
            let output_names = [
                names[0].clone(),
                names[1].clone(),
                names[2].clone(),
                names[3].clone(),
            ];
            (input_name, output_names)
        };

        info!(
            model = %path.display(),
            pool = pool_size,
            input = %input_name,
            "loaded PGNet session"
        );

        Ok(Self {
            sessions,
            next_idx: AtomicUsize::new(0),
            input_name,
            output_names,
            model_path: path.to_path_buf(),
        })
    }

    /// Returns the path the model was loaded from.
    pub fn model_path(&self) -> &Path {
        &self.model_path
    }

    /// Executes one deterministic forward pass.
    ///
    /// # Arguments
    ///
    /// * `x` - The preprocessed input tensor, `[1, 3, H, W]`.
    ///
    /// # Errors
    ///
    /// Returns [`OcrError::Inference`] if the runtime fails, or
    /// [`OcrError::InvalidInput`] if an output head does not come back as a
    /// 4-D float tensor.
    pub fn predict(&self, x: &Tensor4D) -> OcrResult<RawOutput> {
        let input_tensor = TensorRef::from_array_view(x.view())
            .map_err(|e| OcrError::inference("failed to convert input tensor", e))?;
        let inputs = ort::inputs![self.input_name.as_str() => input_tensor];

        let idx = self.next_idx.fetch_add(1, Ordering::Relaxed) % self.sessions.len();
        let mut session = self.sessions[idx]
            .lock()
            .map_err(|_| OcrError::invalid_input("session lock poisoned"))?;
        debug!(session = idx, shape = ?x.shape(), "running forward pass");

        let outputs = session
            .run(inputs)
            .map_err(|e| OcrError::inference("forward pass failed", e))?;

        let extract = |idx: usize, role: OutputRole| -> OcrResult<Tensor4D> {
            let name = self.output_names[idx].as_str();
            let (shape, data) = outputs[name].try_extract_tensor::<f32>().map_err(|e| {
                OcrError::inference(
                    format!("failed to extract '{}' output as f32", role.as_str()),
                    e,
                )
            })?;
            tensor4_from_parts(shape, data, role)
        };

        Ok(RawOutput {
            border: extract(0, OutputRole::Border)?,
            char_logits: extract(1, OutputRole::CharLogits)?,
            direction: extract(2, OutputRole::Direction)?,
            score: extract(3, OutputRole::Score)?,
        })
    }
}

/// Rebuilds an owned 4-D tensor from the runtime's shape and data slices.
fn tensor4_from_parts(shape: &[i64], data: &[f32], role: OutputRole) -> OcrResult<Tensor4D> {
    if shape.len() != 4 {
        return Err(OcrError::invalid_input(format!(
            "'{}' head: expected a 4-D tensor, got {}-D with shape {:?}",
            role.as_str(),
            shape.len(),
            shape
        )));
    }
    let dims = (
        shape[0] as usize,
        shape[1] as usize,
        shape[2] as usize,
        shape[3] as usize,
    );
    let expected_len = dims.0 * dims.1 * dims.2 * dims.3;
    if data.len() != expected_len {
        return Err(OcrError::invalid_input(format!(
            "'{}' head: data size mismatch, expected {} elements, got {}",
            role.as_str(),
            expected_len,
            data.len()
        )));
    }
    let view = ArrayView4::from_shape(dims, data).map_err(OcrError::Tensor)?;
    Ok(view.to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_artifact_fails_before_session_build() {
        let err = PGNetSession::load("/nonexistent/pgnet.onnx", 1).unwrap_err();
        assert!(matches!(err, OcrError::ModelNotFound { .. }));
    }

    #[test]
    fn tensor_rebuild_rejects_wrong_rank() {
        let err = tensor4_from_parts(&[1, 2, 3], &[0.0; 6], OutputRole::Score).unwrap_err();
        assert!(matches!(err, OcrError::InvalidInput { .. }));
    }

    #[test]
    fn tensor_rebuild_rejects_size_mismatch() {
        let err = tensor4_from_parts(&[1, 1, 2, 2], &[0.0; 3], OutputRole::Border).unwrap_err();
        assert!(matches!(err, OcrError::InvalidInput { .. }));
    }

    #[test]
    fn tensor_rebuild_roundtrip() {
        let data = [1.0, 2.0, 3.0, 4.0];
        let t = tensor4_from_parts(&[1, 1, 2, 2], &data, OutputRole::Score).unwrap();
        assert_eq!(t.shape(), &[1, 1, 2, 2]);
        assert_eq!(t[[0, 0, 1, 1]], 4.0);
    }
}
