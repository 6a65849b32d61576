//! Constants used throughout the inference pipeline.
//!
//! Class ordering, model input geometry and the numeric guards used by the
//! post-processing stages all live here so that the runtime adapter, the
//! uncertainty estimator and the explanation generator agree on them.

/// Anatomical plane labels, in the order the model emits its logits.
pub const PLANE_LABELS: [&str; 6] = ["Abdominal", "Brain", "Cervix", "Femur", "Other", "Thorax"];

/// Number of classes the model scores.
pub const NUM_CLASSES: usize = PLANE_LABELS.len();

/// The input shape (height, width) expected by the classification model.
pub const MODEL_INPUT_SHAPE: (u32, u32) = (224, 224);

/// Number of colour channels in the model input tensor.
pub const MODEL_INPUT_CHANNELS: usize = 3;

/// Scale applied to 8-bit channel values so that tensors land in [0, 1].
pub const PIXEL_SCALE: f32 = 1.0 / 255.0;

/// Guard added inside the logarithm of the predictive entropy.
pub const ENTROPY_EPSILON: f64 = 1e-10;

/// Tolerance used when validating that a distribution sums to one.
pub const PROBABILITY_SUM_TOLERANCE: f64 = 1e-6;

/// Standard deviation of the synthetic attention blob, in image-fraction units.
pub const SALIENCY_SIGMA: f64 = 0.2;

/// Alpha gain applied to saliency intensity in [0, 1].
pub const SALIENCY_ALPHA_GAIN: f64 = 200.0;

/// Upper bound on overlay alpha (about 70% opacity).
pub const SALIENCY_MAX_ALPHA: f64 = 180.0;

/// Attention centre used when a class id has no entry in the centre table.
pub const DEFAULT_ATTENTION_CENTER: (f64, f64) = (0.5, 0.5);

/// Default location of the exported classifier.
pub const DEFAULT_MODEL_PATH: &str = "assets/models/fetal_plane_mobilenetv3.onnx";

/// Default URL prefix of the HTTP surface.
pub const DEFAULT_API_PREFIX: &str = "/v1";

/// Default listening address of the HTTP surface.
pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:8000";

/// Default cap on uploaded image size.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Service display name reported by the metadata endpoint.
pub const DEFAULT_PROJECT_NAME: &str = "Fetal Plane Explorer";

/// Browser origins allowed to call the API by default.
pub const DEFAULT_CORS_ORIGINS: [&str; 2] = ["http://localhost:3000", "http://localhost:8000"];
